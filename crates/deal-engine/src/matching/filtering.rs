//! Hard-criteria filtering of listings against a mandate.
//!
//! Each rule is an independent predicate; a listing passes when no rule
//! fails. Rules with missing data treat the check as passing so incomplete
//! listings are never filtered out on data they do not carry.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::listing::{Condition, Listing, Tenure};
use crate::mandate::{prefix_match, Mandate};

/// A filter rule returns a failure message, or `None` when the listing
/// passes the check.
pub type FilterRule = fn(&Listing, &Mandate) -> Option<String>;

/// Outcome of filtering a single listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterResult {
    pub listing_id: String,
    pub passed: bool,
    pub failed_rules: Vec<String>,
}

fn asset_class_rule(listing: &Listing, mandate: &Mandate) -> Option<String> {
    if mandate.accepts_asset_class(listing.asset_class) {
        None
    } else {
        Some(format!(
            "Asset class '{}' not in mandate",
            listing.asset_class.label()
        ))
    }
}

fn location_rule(listing: &Listing, mandate: &Mandate) -> Option<String> {
    let geo = &mandate.geographic;
    let region = listing.region();
    let postcode_area = listing.postcode_area();

    if geo.exclude_regions.iter().any(|r| r == region) {
        return Some(format!("Region '{region}' excluded"));
    }
    if prefix_match(&postcode_area, &geo.exclude_postcodes) {
        return Some(format!("Postcode '{postcode_area}' excluded"));
    }

    if geo.is_unrestricted() {
        return None;
    }

    let region_ok = geo.regions.is_empty() || geo.regions.iter().any(|r| r == region);
    let postcode_ok = geo.postcodes.is_empty() || prefix_match(&postcode_area, &geo.postcodes);

    if region_ok || postcode_ok {
        None
    } else {
        Some(format!(
            "Location '{region}/{postcode_area}' not in mandate criteria"
        ))
    }
}

fn price_rule(listing: &Listing, mandate: &Mandate) -> Option<String> {
    let fin = &mandate.financial;
    let price = listing.asking_price();

    if let Some(min) = fin.min_deal_size {
        if price < min {
            return Some(format!("Price £{price} below minimum £{min}"));
        }
    }
    if let Some(max) = fin.max_deal_size {
        if price > max {
            return Some(format!("Price £{price} above maximum £{max}"));
        }
    }
    None
}

fn yield_rule(listing: &Listing, mandate: &Mandate) -> Option<String> {
    let min_yield = mandate.financial.min_yield?;
    // Missing yield data passes through to scoring rather than filtering.
    let listing_yield = listing.gross_yield()?;

    if listing_yield < min_yield {
        Some(format!(
            "Yield {listing_yield:.1}% below minimum {min_yield:.1}%"
        ))
    } else {
        None
    }
}

fn tenure_rule(listing: &Listing, mandate: &Mandate) -> Option<String> {
    let prop = &mandate.property;

    if prop.freehold_only
        && !matches!(listing.tenure, Tenure::Freehold | Tenure::ShareOfFreehold)
    {
        return Some("Freehold required but property is leasehold".to_string());
    }

    if let Some(min_lease) = prop.min_lease_years {
        if listing.tenure == Tenure::Leasehold {
            if let Some(remaining) = listing.financial.lease_years_remaining {
                if remaining < min_lease {
                    return Some(format!(
                        "Lease {remaining} years below minimum {min_lease}"
                    ));
                }
            }
        }
    }
    None
}

fn unit_count_rule(listing: &Listing, mandate: &Mandate) -> Option<String> {
    let prop = &mandate.property;
    let units = listing.property_details.unit_count;

    if let Some(min) = prop.min_units {
        if units < min {
            return Some(format!("Unit count {units} below minimum {min}"));
        }
    }
    if let Some(max) = prop.max_units {
        if units > max {
            return Some(format!("Unit count {units} above maximum {max}"));
        }
    }
    None
}

fn sqft_rule(listing: &Listing, mandate: &Mandate) -> Option<String> {
    let prop = &mandate.property;
    let sqft = listing.property_details.total_sqft?;

    if let Some(min) = prop.min_sqft {
        if sqft < min {
            return Some(format!("Size {sqft} sqft below minimum {min}"));
        }
    }
    if let Some(max) = prop.max_sqft {
        if sqft > max {
            return Some(format!("Size {sqft} sqft above maximum {max}"));
        }
    }
    None
}

fn condition_rule(listing: &Listing, mandate: &Mandate) -> Option<String> {
    let prop = &mandate.property;
    match listing.property_details.condition {
        Condition::Development if !prop.accept_development => {
            Some("Development opportunities not accepted".to_string())
        }
        Condition::LightRefurb | Condition::HeavyRefurb if !prop.accept_refurbishment => {
            Some("Refurbishment opportunities not accepted".to_string())
        }
        Condition::Turnkey if !prop.accept_turnkey => {
            Some("Turnkey properties not accepted".to_string())
        }
        _ => None,
    }
}

/// Rule chain applied in order by [`filter_listing`].
pub const DEFAULT_RULES: &[FilterRule] = &[
    asset_class_rule,
    location_rule,
    price_rule,
    yield_rule,
    tenure_rule,
    unit_count_rule,
    sqft_rule,
    condition_rule,
];

/// Apply the rule chain to one listing. With `fail_fast` the evaluation
/// stops at the first failing rule; otherwise all failure reasons are
/// collected. Pass/fail is identical in both modes.
pub fn filter_listing(
    listing: &Listing,
    mandate: &Mandate,
    rules: Option<&[FilterRule]>,
    fail_fast: bool,
) -> FilterResult {
    let active = rules.unwrap_or(DEFAULT_RULES);
    let mut failed_rules = Vec::new();

    for rule in active {
        if let Some(reason) = rule(listing, mandate) {
            failed_rules.push(reason);
            if fail_fast {
                break;
            }
        }
    }

    FilterResult {
        listing_id: listing.listing_id.clone(),
        passed: failed_rules.is_empty(),
        failed_rules,
    }
}

/// Reduce a listing set to those passing every rule.
pub fn filter_listings(listings: &[Listing], mandate: &Mandate) -> Vec<Listing> {
    listings
        .iter()
        .filter(|listing| filter_listing(listing, mandate, None, true).passed)
        .cloned()
        .collect()
}

/// Filter with full per-listing failure detail (fail-fast disabled).
pub fn filter_listings_detailed(
    listings: &[Listing],
    mandate: &Mandate,
) -> (Vec<Listing>, Vec<FilterResult>) {
    let mut passed = Vec::new();
    let mut results = Vec::with_capacity(listings.len());

    for listing in listings {
        let result = filter_listing(listing, mandate, None, false);
        if result.passed {
            passed.push(listing.clone());
        }
        results.push(result);
    }

    (passed, results)
}

/// Aggregate statistics over a batch of filter results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub failure_reasons: BTreeMap<String, usize>,
}

pub fn filter_summary(results: &[FilterResult]) -> FilterSummary {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();

    let mut failure_reasons: BTreeMap<String, usize> = BTreeMap::new();
    for result in results {
        for reason in &result.failed_rules {
            let key = reason
                .split_whitespace()
                .next()
                .unwrap_or("Unknown")
                .to_string();
            *failure_reasons.entry(key).or_default() += 1;
        }
    }

    FilterSummary {
        total,
        passed,
        failed: total - passed,
        pass_rate: if total > 0 {
            passed as f64 / total as f64 * 100.0
        } else {
            0.0
        },
        failure_reasons,
    }
}
