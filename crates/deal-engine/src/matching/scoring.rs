//! Multi-factor scoring of listings against mandates.
//!
//! Ten weighted factors across five categories produce a 0-100 score with a
//! letter grade. Every factor carries its raw score, the weight applied, and
//! an explanation string, so a score is always auditable.

use serde::{Deserialize, Serialize};

use crate::listing::{Condition, Listing, Tenure};
use crate::mandate::{prefix_match, Mandate, RiskProfile, ScoringWeights};

/// Category a scoring factor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Location,
    Price,
    Yield,
    Property,
    Risk,
}

/// Letter grade bands over the 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchGrade {
    A,
    B,
    C,
    D,
    F,
}

impl MatchGrade {
    pub fn from_score(score: f64) -> MatchGrade {
        if score >= 90.0 {
            MatchGrade::A
        } else if score >= 75.0 {
            MatchGrade::B
        } else if score >= 60.0 {
            MatchGrade::C
        } else if score >= 40.0 {
            MatchGrade::D
        } else {
            MatchGrade::F
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MatchGrade::A => "A",
            MatchGrade::B => "B",
            MatchGrade::C => "C",
            MatchGrade::D => "D",
            MatchGrade::F => "F",
        }
    }
}

/// One scored factor with its contribution and explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFactor {
    pub category: ScoreCategory,
    pub name: &'static str,
    /// Raw factor score in `[0.0, 1.0]`.
    pub score: f64,
    pub weight: f64,
    pub weighted_score: f64,
    pub explanation: String,
}

impl ScoreFactor {
    fn new(
        category: ScoreCategory,
        name: &'static str,
        score: f64,
        weight: f64,
        explanation: String,
    ) -> ScoreFactor {
        ScoreFactor {
            category,
            name,
            score,
            weight,
            weighted_score: score * weight,
            explanation,
        }
    }
}

/// Complete scoring result for one listing against one mandate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub listing_id: String,
    pub mandate_id: String,
    /// Normalized total in `[0.0, 100.0]`, after any hard-filter penalty.
    pub total_score: f64,
    pub match_grade: MatchGrade,
    pub factors: Vec<ScoreFactor>,
    pub passes_hard_filters: bool,
    pub disqualification_reasons: Vec<String>,
}

impl ScoringResult {
    /// A viable match passes the hard filters and clears the floor score.
    pub fn is_match(&self) -> bool {
        self.passes_hard_filters && self.total_score >= 40.0
    }
}

fn score_location(listing: &Listing, mandate: &Mandate, weights: &ScoringWeights) -> Vec<ScoreFactor> {
    let geo = &mandate.geographic;
    let region = listing.region();
    let postcode_area = listing.postcode_area();

    let (region_score, region_explanation) = if geo.regions.is_empty() {
        (1.0, "No region restrictions".to_string())
    } else if geo.regions.iter().any(|r| r == region) {
        (1.0, format!("Region '{region}' matches mandate"))
    } else if geo.exclude_regions.iter().any(|r| r == region) {
        (0.0, format!("Region '{region}' is excluded"))
    } else {
        (0.3, format!("Region '{region}' not in preferred list"))
    };

    let (postcode_score, postcode_explanation) = if geo.postcodes.is_empty() {
        (1.0, "No postcode restrictions".to_string())
    } else if prefix_match(&postcode_area, &geo.postcodes) {
        (1.0, format!("Postcode '{postcode_area}' matches mandate"))
    } else if prefix_match(&postcode_area, &geo.exclude_postcodes) {
        (0.0, format!("Postcode '{postcode_area}' is excluded"))
    } else {
        (0.5, format!("Postcode '{postcode_area}' not in preferred list"))
    };

    vec![
        ScoreFactor::new(
            ScoreCategory::Location,
            "region_match",
            region_score,
            weights.location_region,
            region_explanation,
        ),
        ScoreFactor::new(
            ScoreCategory::Location,
            "postcode_match",
            postcode_score,
            weights.location_postcode,
            postcode_explanation,
        ),
    ]
}

fn score_price(listing: &Listing, mandate: &Mandate, weights: &ScoringWeights) -> Vec<ScoreFactor> {
    let fin = &mandate.financial;
    let price = listing.asking_price();

    let (price_score, price_explanation) = match (fin.min_deal_size, fin.max_deal_size) {
        (Some(min), Some(max)) => {
            if price >= min && price <= max {
                // Mid-range positions score highest.
                let range_position = (price - min) as f64 / (max - min).max(1) as f64;
                (
                    1.0 - (0.5 - range_position).abs() * 0.4,
                    format!("Price £{price} within range £{min}-£{max}"),
                )
            } else if price < min {
                let shortfall = (min - price) as f64 / min as f64;
                (
                    (0.5 - shortfall).max(0.0),
                    format!("Price £{price} below minimum £{min}"),
                )
            } else {
                let excess = (price - max) as f64 / max as f64;
                (
                    (0.5 - excess).max(0.0),
                    format!("Price £{price} above maximum £{max}"),
                )
            }
        }
        (Some(min), None) => {
            if price >= min {
                (1.0, format!("Price £{price} meets minimum £{min}"))
            } else {
                let shortfall = (min - price) as f64 / min as f64;
                (
                    (0.7 - shortfall).max(0.0),
                    format!("Price £{price} below minimum £{min}"),
                )
            }
        }
        (None, Some(max)) => {
            if price <= max {
                (1.0, format!("Price £{price} within maximum £{max}"))
            } else {
                let excess = (price - max) as f64 / max as f64;
                (
                    (0.5 - excess).max(0.0),
                    format!("Price £{price} above maximum £{max}"),
                )
            }
        }
        (None, None) => (1.0, "No price constraints".to_string()),
    };

    let (psf_score, psf_explanation) = match (fin.max_price_psf, listing.financial.price_per_sqft) {
        (Some(cap), Some(psf)) => {
            if psf <= cap {
                (1.0, format!("Price/sqft £{psf:.0} within max £{cap:.0}"))
            } else {
                let excess = (psf - cap) / cap;
                (
                    (0.8 - excess).max(0.0),
                    format!("Price/sqft £{psf:.0} above max £{cap:.0}"),
                )
            }
        }
        _ => (1.0, "Price per sq ft not evaluated".to_string()),
    };

    vec![
        ScoreFactor::new(
            ScoreCategory::Price,
            "price_range",
            price_score,
            weights.price_range,
            price_explanation,
        ),
        ScoreFactor::new(
            ScoreCategory::Price,
            "price_psf",
            psf_score,
            weights.price_psf,
            psf_explanation,
        ),
    ]
}

fn score_yield(listing: &Listing, mandate: &Mandate, weights: &ScoringWeights) -> Vec<ScoreFactor> {
    let fin = &mandate.financial;
    let listing_yield = listing.gross_yield();

    let (min_score, min_explanation) = match (fin.min_yield, listing_yield) {
        (Some(_), None) => (0.5, "Yield data not available".to_string()),
        (Some(min), Some(y)) if y >= min => {
            (1.0, format!("Yield {y:.1}% meets minimum {min:.1}%"))
        }
        (Some(min), Some(y)) => {
            let shortfall = (min - y) / min;
            (
                (0.7 - shortfall).max(0.0),
                format!("Yield {y:.1}% below minimum {min:.1}%"),
            )
        }
        (None, _) => (1.0, "No minimum yield requirement".to_string()),
    };

    let (target_score, target_explanation) = match (fin.target_yield, listing_yield) {
        (Some(_), None) => (0.5, "Yield data not available".to_string()),
        (Some(target), Some(y)) if y >= target => {
            let excess = (y - target) / target;
            (
                (0.9 + excess * 0.2).min(1.0),
                format!("Yield {y:.1}% meets/exceeds target {target:.1}%"),
            )
        }
        (Some(target), Some(y)) => {
            let shortfall = (target - y) / target;
            (
                (0.9 - shortfall).max(0.3),
                format!("Yield {y:.1}% below target {target:.1}%"),
            )
        }
        (None, _) => (1.0, "No target yield specified".to_string()),
    };

    vec![
        ScoreFactor::new(
            ScoreCategory::Yield,
            "yield_minimum",
            min_score,
            weights.yield_minimum,
            min_explanation,
        ),
        ScoreFactor::new(
            ScoreCategory::Yield,
            "yield_target",
            target_score,
            weights.yield_target,
            target_explanation,
        ),
    ]
}

fn score_property(listing: &Listing, mandate: &Mandate, weights: &ScoringWeights) -> Vec<ScoreFactor> {
    let prop = &mandate.property;
    let details = &listing.property_details;

    let (size_score, size_explanation) = if prop.min_units.is_some() || prop.max_units.is_some() {
        let units = details.unit_count;
        if prop.min_units.is_some_and(|min| units < min) {
            (
                0.5,
                format!(
                    "Unit count {units} below minimum {}",
                    prop.min_units.unwrap_or(0)
                ),
            )
        } else if prop.max_units.is_some_and(|max| units > max) {
            (
                0.5,
                format!(
                    "Unit count {units} above maximum {}",
                    prop.max_units.unwrap_or(0)
                ),
            )
        } else {
            (1.0, format!("Unit count {units} within requirements"))
        }
    } else {
        (1.0, "No unit count requirements".to_string())
    };

    let (condition_score, condition_explanation) = match details.condition {
        Condition::Turnkey if prop.accept_turnkey => {
            (1.0, "Turnkey property accepted".to_string())
        }
        Condition::Turnkey => (0.3, "Turnkey not preferred".to_string()),
        Condition::LightRefurb | Condition::HeavyRefurb if prop.accept_refurbishment => {
            (1.0, "Refurbishment opportunity accepted".to_string())
        }
        Condition::LightRefurb | Condition::HeavyRefurb => {
            (0.3, "Refurbishment not preferred".to_string())
        }
        Condition::Development if prop.accept_development => {
            (1.0, "Development opportunity accepted".to_string())
        }
        Condition::Development => (0.2, "Development not accepted".to_string()),
        Condition::Unknown => (0.7, "Condition unknown".to_string()),
    };

    let (tenure_score, tenure_explanation) = if prop.freehold_only {
        match listing.tenure {
            Tenure::Freehold => (1.0, "Freehold as required".to_string()),
            Tenure::ShareOfFreehold => {
                (0.8, "Share of freehold (close to requirement)".to_string())
            }
            _ => (0.2, "Leasehold but freehold required".to_string()),
        }
    } else if let (Some(min_lease), Tenure::Leasehold) = (prop.min_lease_years, listing.tenure) {
        match listing.financial.lease_years_remaining {
            None => (0.6, "Lease length unknown".to_string()),
            Some(remaining) if remaining >= min_lease => (
                1.0,
                format!("Lease {remaining} years meets minimum {min_lease}"),
            ),
            Some(remaining) => (
                0.4,
                format!("Lease {remaining} years below minimum {min_lease}"),
            ),
        }
    } else {
        (1.0, "Tenure acceptable".to_string())
    };

    vec![
        ScoreFactor::new(
            ScoreCategory::Property,
            "property_size",
            size_score,
            weights.property_size,
            size_explanation,
        ),
        ScoreFactor::new(
            ScoreCategory::Property,
            "property_condition",
            condition_score,
            weights.property_condition,
            condition_explanation,
        ),
        ScoreFactor::new(
            ScoreCategory::Property,
            "property_tenure",
            tenure_score,
            weights.property_tenure,
            tenure_explanation,
        ),
    ]
}

/// Risk level the physical condition implies.
pub(crate) const fn implied_risk(condition: Condition) -> RiskProfile {
    match condition {
        Condition::Turnkey => RiskProfile::Core,
        Condition::LightRefurb | Condition::Unknown => RiskProfile::CorePlus,
        Condition::HeavyRefurb => RiskProfile::ValueAdd,
        Condition::Development => RiskProfile::Opportunistic,
    }
}

fn score_risk(listing: &Listing, mandate: &Mandate, weights: &ScoringWeights) -> Vec<ScoreFactor> {
    let implied = implied_risk(listing.property_details.condition);
    let mandate_risk = mandate.risk_profile;
    let level_diff = implied.ordinal() - mandate_risk.ordinal();

    let (risk_score, explanation) = match level_diff {
        0 => (
            1.0,
            format!("Risk profile matches ({})", mandate_risk.label()),
        ),
        1 => (
            0.7,
            format!(
                "Slightly higher risk ({}) than mandate ({})",
                implied.label(),
                mandate_risk.label()
            ),
        ),
        -1 => (
            0.8,
            format!(
                "Slightly lower risk ({}) than mandate ({})",
                implied.label(),
                mandate_risk.label()
            ),
        ),
        d if d > 1 => (
            0.3,
            format!(
                "Significantly higher risk ({}) than mandate ({})",
                implied.label(),
                mandate_risk.label()
            ),
        ),
        _ => (
            0.6,
            format!(
                "Lower risk ({}) than mandate ({})",
                implied.label(),
                mandate_risk.label()
            ),
        ),
    };

    vec![ScoreFactor::new(
        ScoreCategory::Risk,
        "risk_profile",
        risk_score,
        weights.risk_profile,
        explanation,
    )]
}

/// Score a listing against a mandate.
///
/// The mandate's own weights drive the score unless an explicit override is
/// supplied. Hard-filter failures (asset class, excluded location) do not
/// stop scoring; they apply a 0.3 multiplier to the fully computed total.
pub fn score_listing(
    listing: &Listing,
    mandate: &Mandate,
    weights: Option<&ScoringWeights>,
) -> ScoringResult {
    let active = weights.unwrap_or(&mandate.scoring_weights);

    let mut disqualification_reasons = Vec::new();

    if !mandate.accepts_asset_class(listing.asset_class) {
        disqualification_reasons.push(format!(
            "Asset class '{}' not accepted by mandate",
            listing.asset_class.label()
        ));
    }
    if !mandate.accepts_location(listing.region(), &listing.postcode_area()) {
        disqualification_reasons.push(format!(
            "Location '{}/{}' excluded by mandate",
            listing.region(),
            listing.postcode_area()
        ));
    }
    let passes_hard_filters = disqualification_reasons.is_empty();

    let mut factors = Vec::with_capacity(10);
    factors.extend(score_location(listing, mandate, active));
    factors.extend(score_price(listing, mandate, active));
    factors.extend(score_yield(listing, mandate, active));
    factors.extend(score_property(listing, mandate, active));
    factors.extend(score_risk(listing, mandate, active));

    let total_weighted: f64 = factors.iter().map(|f| f.weighted_score).sum();
    let total_weight: f64 = factors.iter().map(|f| f.weight).sum();

    let mut total_score = if total_weight > 0.0 {
        total_weighted / total_weight * 100.0
    } else {
        0.0
    };

    if !passes_hard_filters {
        total_score *= 0.3;
    }

    ScoringResult {
        listing_id: listing.listing_id.clone(),
        mandate_id: mandate.mandate_id.clone(),
        total_score,
        match_grade: MatchGrade::from_score(total_score),
        factors,
        passes_hard_filters,
        disqualification_reasons,
    }
}

/// Score a batch of listings, dropping results below `min_score` and
/// ordering the rest by score descending.
pub fn score_listings(listings: &[Listing], mandate: &Mandate, min_score: f64) -> Vec<ScoringResult> {
    let mut results: Vec<ScoringResult> = listings
        .iter()
        .map(|listing| score_listing(listing, mandate, None))
        .filter(|result| result.total_score >= min_score)
        .collect();

    results.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{Address, FinancialDetails, ListingStatus, PropertyDetails};
    use crate::mandate::{
        AssetClass, DealCriteria, FinancialCriteria, GeographicCriteria, InvestorType,
        PropertyCriteria,
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
                postcodes: vec!["SW".to_string()],
                ..GeographicCriteria::default()
            },
            financial: FinancialCriteria {
                min_deal_size: Some(500_000),
                max_deal_size: Some(5_000_000),
                min_yield: Some(5.0),
                target_yield: Some(7.0),
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
                asking_price: 2_750_000,
                gross_yield: Some(8.5),
                ..FinancialDetails::default()
            },
            property_details: PropertyDetails {
                condition: Condition::LightRefurb,
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

    fn factor<'a>(result: &'a ScoringResult, name: &str) -> &'a ScoreFactor {
        result
            .factors
            .iter()
            .find(|f| f.name == name)
            .expect("factor present")
    }

    #[test]
    fn strong_match_scores_high_with_both_yield_factors_near_full() {
        let result = score_listing(&listing(), &mandate(), None);
        assert!(result.passes_hard_filters);
        assert!(result.total_score >= 75.0);
        assert!(result.total_score <= 100.0);
        // 8.5% against a 5.0% minimum and 7.0% target.
        assert!(factor(&result, "yield_minimum").score >= 0.9);
        assert!(factor(&result, "yield_target").score >= 0.9);
        assert!(matches!(result.match_grade, MatchGrade::A | MatchGrade::B));
    }

    #[test]
    fn score_stays_within_bounds() {
        let mut worst = listing();
        worst.asset_class = AssetClass::Hospitality;
        worst.address.region = "Wales".to_string();
        worst.address.postcode = "CF10 1AA".to_string();
        worst.financial.asking_price = 50_000_000;
        worst.financial.gross_yield = Some(0.5);
        worst.property_details.condition = Condition::Development;
        let result = score_listing(&worst, &mandate(), None);
        assert!(result.total_score >= 0.0);
        assert!(result.total_score <= 100.0);
    }

    #[test]
    fn hard_filter_failure_applies_penalty_not_zero() {
        let mut wrong_class = listing();
        wrong_class.asset_class = AssetClass::Retail;

        let clean = score_listing(&listing(), &mandate(), None);
        let penalized = score_listing(&wrong_class, &mandate(), None);

        assert!(!penalized.passes_hard_filters);
        assert_eq!(penalized.disqualification_reasons.len(), 1);
        assert!(penalized.total_score > 0.0);
        assert!(penalized.total_score < clean.total_score * 0.5);
        assert!(!penalized.is_match());
    }

    #[test]
    fn grade_breakpoints() {
        assert_eq!(MatchGrade::from_score(90.0), MatchGrade::A);
        assert_eq!(MatchGrade::from_score(89.9), MatchGrade::B);
        assert_eq!(MatchGrade::from_score(75.0), MatchGrade::B);
        assert_eq!(MatchGrade::from_score(60.0), MatchGrade::C);
        assert_eq!(MatchGrade::from_score(40.0), MatchGrade::D);
        assert_eq!(MatchGrade::from_score(39.9), MatchGrade::F);
    }

    #[test]
    fn mid_range_price_beats_edge_of_range() {
        let m = mandate();
        let mut edge = listing();
        edge.financial.asking_price = 500_000;
        let mid = listing();

        let mid_factor_score = factor(&score_listing(&mid, &m, None), "price_range").score;
        let edge_factor_score = factor(&score_listing(&edge, &m, None), "price_range").score;
        assert!(mid_factor_score > edge_factor_score);
    }

    #[test]
    fn missing_yield_scores_half_on_both_yield_factors() {
        let mut no_yield = listing();
        no_yield.financial.gross_yield = None;
        no_yield.financial.current_rent = None;
        let result = score_listing(&no_yield, &mandate(), None);
        assert_eq!(factor(&result, "yield_minimum").score, 0.5);
        assert_eq!(factor(&result, "yield_target").score, 0.5);
    }

    #[test]
    fn explicit_weights_override_mandate_weights() {
        let heavy_yield = ScoringWeights {
            yield_minimum: 0.9,
            ..ScoringWeights::default()
        };
        let result = score_listing(&listing(), &mandate(), Some(&heavy_yield));
        assert_eq!(factor(&result, "yield_minimum").weight, 0.9);
    }

    #[test]
    fn batch_scoring_sorts_descending_and_applies_cutoff() {
        let m = mandate();
        let good = listing();
        let mut poor = listing();
        poor.listing_id = "L-2".to_string();
        poor.asset_class = AssetClass::Hospitality;
        poor.address.region = "Wales".to_string();
        poor.address.postcode = "CF10".to_string();
        poor.financial.gross_yield = Some(1.0);

        let results = score_listings(&[poor.clone(), good.clone()], &m, 0.0);
        assert_eq!(results.len(), 2);
        assert!(results[0].total_score >= results[1].total_score);
        assert_eq!(results[0].listing_id, "L-1");

        let cut = score_listings(&[poor, good], &m, 70.0);
        assert_eq!(cut.len(), 1);
    }

    #[test]
    fn risk_alignment_rewards_exact_match() {
        let m = mandate(); // core_plus
        let aligned = listing(); // light refurb -> core_plus
        let mut risky = listing();
        risky.property_details.condition = Condition::Development; // opportunistic

        let aligned_score = factor(&score_listing(&aligned, &m, None), "risk_profile").score;
        let risky_score = factor(&score_listing(&risky, &m, None), "risk_profile").score;
        assert_eq!(aligned_score, 1.0);
        assert_eq!(risky_score, 0.3);
    }
}
