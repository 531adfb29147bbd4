//! Rejection evaluation with machine-readable codes.
//!
//! Each rule produces a structured reason carrying a severity (hard rules
//! disqualify outright, soft rules flag concerns), an explanation, and a
//! remedy describing what would need to change for the deal to clear.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::listing::{Condition, Listing, Tenure};
use crate::mandate::Mandate;

/// Category a rejection reason belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCategory {
    Price,
    Location,
    Yield,
    AssetClass,
    Property,
    Tenure,
    Risk,
    DataQuality,
}

/// Hard rejections disqualify; soft rejections are negotiable concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionSeverity {
    Hard,
    Soft,
}

/// A single structured rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionReason {
    pub category: RejectionCategory,
    pub severity: RejectionSeverity,
    /// Machine-readable code, e.g. `PRICE_EXCEEDS_MAX`.
    pub code: &'static str,
    pub title: &'static str,
    pub explanation: String,
    pub remedy: String,
}

/// Complete rejection assessment for a listing-mandate pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionResult {
    pub listing_id: String,
    pub mandate_id: String,
    /// True when at least one hard rejection applies.
    pub rejected: bool,
    pub reasons: Vec<RejectionReason>,
}

impl RejectionResult {
    pub fn hard_rejections(&self) -> Vec<&RejectionReason> {
        self.reasons
            .iter()
            .filter(|r| r.severity == RejectionSeverity::Hard)
            .collect()
    }

    pub fn soft_rejections(&self) -> Vec<&RejectionReason> {
        self.reasons
            .iter()
            .filter(|r| r.severity == RejectionSeverity::Soft)
            .collect()
    }
}

/// A rejection rule returns a reason, or `None` when the check clears.
pub type RejectionRule = fn(&Listing, &Mandate) -> Option<RejectionReason>;

fn check_asset_class_mismatch(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    if mandate.asset_classes.is_empty() || mandate.accepts_asset_class(listing.asset_class) {
        return None;
    }
    let accepted: Vec<&str> = mandate.asset_classes.iter().map(|ac| ac.label()).collect();
    Some(RejectionReason {
        category: RejectionCategory::AssetClass,
        severity: RejectionSeverity::Hard,
        code: "ASSET_CLASS_MISMATCH",
        title: "Asset class not accepted",
        explanation: format!(
            "Asset class '{}' is not in mandate-accepted classes: {}.",
            listing.asset_class.label(),
            accepted.join(", ")
        ),
        remedy: "This asset class cannot be considered under the current mandate.".to_string(),
    })
}

fn check_location_excluded(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    let geo = &mandate.geographic;
    let region = listing.region();
    let postcode = listing.postcode_area();

    if geo.exclude_regions.iter().any(|r| r == region) {
        return Some(RejectionReason {
            category: RejectionCategory::Location,
            severity: RejectionSeverity::Hard,
            code: "REGION_EXCLUDED",
            title: "Region excluded",
            explanation: format!("Region '{region}' is explicitly excluded from this mandate."),
            remedy: "This location cannot be considered under the current mandate terms."
                .to_string(),
        });
    }

    for excluded in &geo.exclude_postcodes {
        if postcode
            .to_ascii_uppercase()
            .starts_with(&excluded.to_ascii_uppercase())
        {
            return Some(RejectionReason {
                category: RejectionCategory::Location,
                severity: RejectionSeverity::Hard,
                code: "POSTCODE_EXCLUDED",
                title: "Postcode excluded",
                explanation: format!(
                    "Postcode '{postcode}' falls within excluded area '{excluded}'."
                ),
                remedy: "This location cannot be considered under the current mandate terms."
                    .to_string(),
            });
        }
    }

    None
}

fn check_price_too_high(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    let max_size = mandate.financial.max_deal_size?;
    let price = listing.asking_price();
    if price <= max_size {
        return None;
    }

    let excess_pct = (price - max_size) as f64 / max_size as f64 * 100.0;
    Some(RejectionReason {
        category: RejectionCategory::Price,
        severity: if excess_pct > 20.0 {
            RejectionSeverity::Hard
        } else {
            RejectionSeverity::Soft
        },
        code: "PRICE_EXCEEDS_MAX",
        title: "Price exceeds maximum",
        explanation: format!(
            "Asking price £{price} exceeds mandate maximum of £{max_size} by {excess_pct:.0}%."
        ),
        remedy: format!(
            "Price would need to reduce to £{max_size} or below ({excess_pct:.0}% reduction required)."
        ),
    })
}

fn check_price_too_low(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    let min_size = mandate.financial.min_deal_size?;
    let price = listing.asking_price();
    if price >= min_size {
        return None;
    }

    let shortfall_pct = (min_size - price) as f64 / min_size as f64 * 100.0;
    Some(RejectionReason {
        category: RejectionCategory::Price,
        severity: if shortfall_pct > 30.0 {
            RejectionSeverity::Hard
        } else {
            RejectionSeverity::Soft
        },
        code: "PRICE_BELOW_MIN",
        title: "Price below minimum",
        explanation: format!(
            "Asking price £{price} is below mandate minimum of £{min_size} by {shortfall_pct:.0}%."
        ),
        remedy: "Deal too small for mandate - consider aggregating with adjacent opportunities."
            .to_string(),
    })
}

fn check_yield_insufficient(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    let min_yield = mandate.financial.min_yield?;
    let listing_yield = listing.gross_yield()?;
    if listing_yield >= min_yield {
        return None;
    }

    let shortfall = min_yield - listing_yield;
    Some(RejectionReason {
        category: RejectionCategory::Yield,
        severity: if shortfall > 2.0 {
            RejectionSeverity::Hard
        } else {
            RejectionSeverity::Soft
        },
        code: "YIELD_BELOW_MIN",
        title: "Yield below minimum",
        explanation: format!(
            "Gross yield of {listing_yield:.1}% is below mandate minimum of {min_yield:.1}% (shortfall: {shortfall:.1}pp)."
        ),
        remedy: format!(
            "Would require price reduction of ~{:.0}% to achieve target yield, or rent increase.",
            shortfall / listing_yield * 100.0
        ),
    })
}

fn check_tenure_unacceptable(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    let prop = &mandate.property;

    if prop.freehold_only
        && !matches!(listing.tenure, Tenure::Freehold | Tenure::ShareOfFreehold)
    {
        return Some(RejectionReason {
            category: RejectionCategory::Tenure,
            severity: RejectionSeverity::Hard,
            code: "FREEHOLD_REQUIRED",
            title: "Freehold required",
            explanation: format!(
                "Mandate requires freehold, but property is {}.",
                listing.tenure.label()
            ),
            remedy: "Cannot proceed unless freehold is acquired or mandate terms are amended."
                .to_string(),
        });
    }

    if let Some(min_lease) = prop.min_lease_years {
        if listing.tenure == Tenure::Leasehold {
            if let Some(remaining) = listing.financial.lease_years_remaining {
                if remaining < min_lease {
                    return Some(RejectionReason {
                        category: RejectionCategory::Tenure,
                        severity: if remaining < 80 {
                            RejectionSeverity::Hard
                        } else {
                            RejectionSeverity::Soft
                        },
                        code: "LEASE_TOO_SHORT",
                        title: "Lease too short",
                        explanation: format!(
                            "Lease has {remaining} years remaining, below mandate minimum of {min_lease} years."
                        ),
                        remedy: format!(
                            "Would require lease extension of at least {} years before acquisition.",
                            min_lease - remaining
                        ),
                    });
                }
            }
        }
    }

    None
}

fn check_condition_unacceptable(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    let prop = &mandate.property;
    let condition = listing.property_details.condition;

    if condition == Condition::Development && !prop.accept_development {
        return Some(RejectionReason {
            category: RejectionCategory::Property,
            severity: RejectionSeverity::Hard,
            code: "DEVELOPMENT_NOT_ACCEPTED",
            title: "Development not accepted",
            explanation: "Property requires development, which is not accepted under this mandate."
                .to_string(),
            remedy: "Mandate does not permit development risk. Consider alternative mandates with development appetite."
                .to_string(),
        });
    }

    if matches!(condition, Condition::LightRefurb | Condition::HeavyRefurb)
        && !prop.accept_refurbishment
    {
        return Some(RejectionReason {
            category: RejectionCategory::Property,
            severity: RejectionSeverity::Soft,
            code: "REFURB_NOT_ACCEPTED",
            title: "Refurbishment not accepted",
            explanation: format!(
                "Property requires {}, which is not preferred under this mandate.",
                condition.label()
            ),
            remedy: "Consider if works can be minimized or if mandate can accommodate limited refurbishment."
                .to_string(),
        });
    }

    None
}

fn check_location_outside_target(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    let geo = &mandate.geographic;
    if geo.is_unrestricted() {
        return None;
    }

    let region = listing.region();
    let postcode = listing.postcode_area();

    let region_match = geo.regions.is_empty() || geo.regions.iter().any(|r| r == region);
    let postcode_match = geo.postcodes.is_empty()
        || geo.postcodes.iter().any(|pc| {
            postcode
                .to_ascii_uppercase()
                .starts_with(&pc.to_ascii_uppercase())
        });

    if region_match || postcode_match {
        return None;
    }

    let mut target_areas: Vec<&str> = geo.regions.iter().map(String::as_str).collect();
    target_areas.extend(geo.postcodes.iter().map(String::as_str));
    let shown: Vec<&str> = target_areas.into_iter().take(5).collect();

    Some(RejectionReason {
        category: RejectionCategory::Location,
        severity: RejectionSeverity::Soft,
        code: "LOCATION_NOT_TARGET",
        title: "Outside target location",
        explanation: format!(
            "Location '{region}/{postcode}' is not within mandate target areas: {}.",
            shown.join(", ")
        ),
        remedy: "Mandate would need to be amended to include this location, or deal presented as exception."
            .to_string(),
    })
}

fn check_unit_count(listing: &Listing, mandate: &Mandate) -> Option<RejectionReason> {
    let prop = &mandate.property;
    let units = listing.property_details.unit_count;

    if let Some(min) = prop.min_units {
        if units < min {
            return Some(RejectionReason {
                category: RejectionCategory::Property,
                severity: RejectionSeverity::Soft,
                code: "UNITS_BELOW_MIN",
                title: "Too few units",
                explanation: format!(
                    "Property has {units} units, below mandate minimum of {min}."
                ),
                remedy: "Consider aggregating with adjacent properties or presenting as exception for smaller lot."
                    .to_string(),
            });
        }
    }

    if let Some(max) = prop.max_units {
        if units > max {
            return Some(RejectionReason {
                category: RejectionCategory::Property,
                severity: RejectionSeverity::Soft,
                code: "UNITS_ABOVE_MAX",
                title: "Too many units",
                explanation: format!(
                    "Property has {units} units, above mandate maximum of {max}."
                ),
                remedy: "Consider partial acquisition or presenting as exception for larger lot."
                    .to_string(),
            });
        }
    }

    None
}

fn check_data_quality(listing: &Listing, _mandate: &Mandate) -> Option<RejectionReason> {
    let mut missing = Vec::new();

    if listing.address.postcode.is_empty() {
        missing.push("postcode");
    }
    if listing.address.region.is_empty() {
        missing.push("region");
    }
    if listing.financial.asking_price == 0 {
        missing.push("valid price");
    }
    if listing.property_details.condition == Condition::Unknown {
        missing.push("property condition");
    }

    if missing.is_empty() {
        return None;
    }

    Some(RejectionReason {
        category: RejectionCategory::DataQuality,
        severity: RejectionSeverity::Soft,
        code: "MISSING_DATA",
        title: "Incomplete data",
        explanation: format!(
            "Missing essential data: {}. Cannot fully assess against mandate.",
            missing.join(", ")
        ),
        remedy: "Obtain missing information before proceeding with formal assessment.".to_string(),
    })
}

/// All rejection rules in evaluation order.
pub const REJECTION_RULES: &[RejectionRule] = &[
    check_asset_class_mismatch,
    check_location_excluded,
    check_price_too_high,
    check_price_too_low,
    check_yield_insufficient,
    check_tenure_unacceptable,
    check_condition_unacceptable,
    check_location_outside_target,
    check_unit_count,
    check_data_quality,
];

/// Evaluate all rejection criteria for a listing-mandate pair.
///
/// With `stop_on_hard` the evaluation truncates after the first hard
/// rejection; the `rejected` flag is unaffected by truncation.
pub fn evaluate_rejection(
    listing: &Listing,
    mandate: &Mandate,
    rules: Option<&[RejectionRule]>,
    stop_on_hard: bool,
) -> RejectionResult {
    let active = rules.unwrap_or(REJECTION_RULES);
    let mut reasons = Vec::new();

    for rule in active {
        if let Some(reason) = rule(listing, mandate) {
            let is_hard = reason.severity == RejectionSeverity::Hard;
            reasons.push(reason);
            if stop_on_hard && is_hard {
                break;
            }
        }
    }

    let rejected = reasons
        .iter()
        .any(|r| r.severity == RejectionSeverity::Hard);

    RejectionResult {
        listing_id: listing.listing_id.clone(),
        mandate_id: mandate.mandate_id.clone(),
        rejected,
        reasons,
    }
}

/// Summary statistics over a batch of rejection results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionSummary {
    pub total: usize,
    pub rejected: usize,
    pub passed: usize,
    pub rejection_rate: f64,
    /// Top five codes by frequency.
    pub top_rejection_reasons: Vec<(String, usize)>,
}

pub fn rejection_summary(results: &[RejectionResult]) -> RejectionSummary {
    let total = results.len();
    let rejected = results.iter().filter(|r| r.rejected).count();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for result in results {
        for reason in &result.reasons {
            *counts.entry(reason.code).or_default() += 1;
        }
    }

    let mut top: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(code, count)| (code.to_string(), count))
        .collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(5);

    RejectionSummary {
        total,
        rejected,
        passed: total - rejected,
        rejection_rate: if total > 0 {
            rejected as f64 / total as f64 * 100.0
        } else {
            0.0
        },
        top_rejection_reasons: top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{Address, FinancialDetails, ListingStatus, PropertyDetails};
    use crate::mandate::{
        AssetClass, DealCriteria, FinancialCriteria, GeographicCriteria, InvestorType,
        PropertyCriteria, RiskProfile, ScoringWeights,
    };

    fn mandate() -> Mandate {
        Mandate {
            mandate_id: "MAND-001".to_string(),
            investor_name: "Test".to_string(),
            investor_type: InvestorType::Institutional,
            asset_classes: vec![AssetClass::Residential],
            risk_profile: RiskProfile::CorePlus,
            geographic: GeographicCriteria {
                regions: vec!["Greater London".to_string()],
                exclude_postcodes: vec!["E2".to_string()],
                ..GeographicCriteria::default()
            },
            financial: FinancialCriteria {
                min_deal_size: Some(500_000),
                max_deal_size: Some(5_000_000),
                min_yield: Some(5.0),
                ..FinancialCriteria::default()
            },
            property: PropertyCriteria::default(),
            deal_criteria: DealCriteria::default(),
            scoring_weights: ScoringWeights::default(),
            is_active: true,
            priority: 1,
            notes: String::new(),
        }
    }

    fn listing() -> Listing {
        Listing {
            listing_id: "L-1".to_string(),
            source: "manual".to_string(),
            source_url: String::new(),
            asset_class: AssetClass::Residential,
            tenure: Tenure::Freehold,
            address: Address {
                region: "Greater London".to_string(),
                postcode: "SW1A 1AA".to_string(),
                ..Address::default()
            },
            financial: FinancialDetails {
                asking_price: 2_000_000,
                gross_yield: Some(6.0),
                ..FinancialDetails::default()
            },
            property_details: PropertyDetails {
                condition: Condition::Turnkey,
                ..PropertyDetails::default()
            },
            title: String::new(),
            description: String::new(),
            images: Vec::new(),
            agent_name: String::new(),
            agent_phone: String::new(),
            listed_date: None,
            scraped_at: None,
            status: ListingStatus::Active,
        }
    }

    fn reason_codes(result: &RejectionResult) -> Vec<&str> {
        result.reasons.iter().map(|r| r.code).collect()
    }

    #[test]
    fn clean_listing_has_no_reasons() {
        let result = evaluate_rejection(&listing(), &mandate(), None, false);
        assert!(!result.rejected);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn large_price_excess_is_hard_rejection() {
        // £8.5M against a £5M maximum is a 70% excess.
        let mut expensive = listing();
        expensive.financial.asking_price = 8_500_000;
        let result = evaluate_rejection(&expensive, &mandate(), None, false);
        assert!(result.rejected);
        let reason = &result.reasons[0];
        assert_eq!(reason.code, "PRICE_EXCEEDS_MAX");
        assert_eq!(reason.severity, RejectionSeverity::Hard);
        assert!(reason.explanation.contains("70%"));
    }

    #[test]
    fn small_price_excess_is_soft() {
        let mut slightly_over = listing();
        slightly_over.financial.asking_price = 5_500_000; // 10% over
        let result = evaluate_rejection(&slightly_over, &mandate(), None, false);
        assert!(!result.rejected);
        assert_eq!(result.reasons[0].severity, RejectionSeverity::Soft);
    }

    #[test]
    fn yield_shortfall_severity_tracks_magnitude() {
        let m = mandate();
        let mut marginal = listing();
        marginal.financial.gross_yield = Some(4.0); // 1.0pp short
        let result = evaluate_rejection(&marginal, &m, None, false);
        assert_eq!(result.reasons[0].severity, RejectionSeverity::Soft);

        let mut weak = listing();
        weak.financial.gross_yield = Some(2.0); // 3.0pp short
        let result = evaluate_rejection(&weak, &m, None, false);
        assert_eq!(result.reasons[0].severity, RejectionSeverity::Hard);
        assert!(result.rejected);
    }

    #[test]
    fn excluded_postcode_is_hard() {
        let mut excluded = listing();
        excluded.address.postcode = "E2 7DG".to_string();
        excluded.address.region = "Greater London".to_string();
        let result = evaluate_rejection(&excluded, &mandate(), None, false);
        assert!(result.rejected);
        assert!(reason_codes(&result).contains(&"POSTCODE_EXCLUDED"));
    }

    #[test]
    fn stop_on_hard_truncates_but_keeps_verdict() {
        let mut bad = listing();
        bad.asset_class = AssetClass::Retail;
        bad.financial.asking_price = 10_000_000;
        bad.financial.gross_yield = Some(1.0);
        let m = mandate();

        let truncated = evaluate_rejection(&bad, &m, None, true);
        let full = evaluate_rejection(&bad, &m, None, false);

        assert!(truncated.rejected);
        assert!(full.rejected);
        assert_eq!(truncated.reasons.len(), 1);
        assert!(full.reasons.len() > 1);
        assert_eq!(truncated.reasons[0].code, "ASSET_CLASS_MISMATCH");
    }

    #[test]
    fn missing_data_flags_each_field() {
        let mut sparse = listing();
        sparse.address.postcode = String::new();
        sparse.financial.asking_price = 0;
        sparse.property_details.condition = Condition::Unknown;
        // Clear yield so the derived price of zero does not trip other rules first.
        sparse.financial.gross_yield = Some(6.0);
        let result = evaluate_rejection(&sparse, &mandate(), None, false);
        let data_reason = result
            .reasons
            .iter()
            .find(|r| r.code == "MISSING_DATA")
            .expect("data quality reason");
        assert!(data_reason.explanation.contains("postcode"));
        assert!(data_reason.explanation.contains("valid price"));
        assert!(data_reason.explanation.contains("property condition"));
        assert_eq!(data_reason.severity, RejectionSeverity::Soft);
    }

    #[test]
    fn summary_ranks_codes_by_frequency() {
        let m = mandate();
        let mut over = listing();
        over.financial.asking_price = 8_500_000;
        let mut over2 = over.clone();
        over2.listing_id = "L-2".to_string();
        let clean = listing();

        let results: Vec<RejectionResult> = [over, over2, clean]
            .iter()
            .map(|l| evaluate_rejection(l, &m, None, false))
            .collect();
        let summary = rejection_summary(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rejected, 2);
        assert_eq!(
            summary.top_rejection_reasons[0],
            ("PRICE_EXCEEDS_MAX".to_string(), 2)
        );
    }
}
