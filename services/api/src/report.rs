//! Offline report generation for the `report` subcommand.

use std::fs;

use deal_engine::config::AppConfig;
use deal_engine::listing::Listing;
use deal_engine::matching::generate_report;
use deal_engine::storage::{JsonMandateStore, MandateStore, StorageError};
use serde_json::json;

use crate::cli::ReportArgs;
use crate::error::AppError;

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let store_path = match args.store {
        Some(path) => path,
        None => AppConfig::load()?
            .storage
            .mandate_store_path
            .ok_or_else(|| {
                AppError::InvalidInput(
                    "no mandate store configured: pass --store or set DEAL_STORE_PATH".to_string(),
                )
            })?,
    };

    let store = JsonMandateStore::open(&store_path)?;
    let mandate = store
        .get(&args.mandate_id)?
        .ok_or(StorageError::NotFound(args.mandate_id))?;

    let raw = fs::read_to_string(&args.listings)?;
    let listings: Vec<Listing> = serde_json::from_str(&raw)
        .map_err(|err| AppError::InvalidInput(format!("invalid listings file: {err}")))?;

    let report = generate_report(&listings, &mandate, None);

    let output = if args.full {
        serde_json::to_value(&report)?
    } else {
        json!({
            "mandate_id": report.mandate_id,
            "mandate_name": report.mandate_name,
            "generated_at": report.generated_at,
            "total_listings": report.total_listings,
            "counts": {
                "pursue": report.pursue_count(),
                "consider": report.consider_count(),
                "watch": report.watch_count(),
                "pass": report.pass_count(),
                "actionable": report.actionable_count(),
            },
            "headlines": report
                .recommendations
                .iter()
                .map(|rec| json!({
                    "listing_id": rec.listing_id,
                    "action": rec.action.label(),
                    "priority_rank": rec.priority_rank,
                    "headline": rec.headline,
                }))
                .collect::<Vec<_>>(),
        })
    };

    println!("{:#}", output);
    Ok(())
}
