//! Conviction assessment layered on top of the numeric score.
//!
//! Rule-based factors capture the qualitative signals the weighted score
//! flattens (yield buffer, price positioning, tenure security, and so on).
//! The final confidence blends the numeric score with the factor evidence
//! and bands into a conviction level using the mandate's thresholds.

use serde::{Deserialize, Serialize};

use crate::listing::{Condition, Listing, Tenure};
use crate::mandate::Mandate;
use crate::matching::scoring::ScoringResult;

/// Conviction band for a deal match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvictionLevel {
    High,
    Medium,
    Low,
    /// Does not meet minimum criteria.
    None,
}

impl ConvictionLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ConvictionLevel::High => "high",
            ConvictionLevel::Medium => "medium",
            ConvictionLevel::Low => "low",
            ConvictionLevel::None => "none",
        }
    }
}

/// Individual factor contributing to the conviction assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvictionFactor {
    pub name: &'static str,
    pub met: bool,
    pub weight: f64,
    pub reason: String,
}

impl ConvictionFactor {
    fn met(name: &'static str, weight: f64, reason: String) -> ConvictionFactor {
        ConvictionFactor {
            name,
            met: true,
            weight,
            reason,
        }
    }

    fn unmet(name: &'static str, weight: f64, reason: String) -> ConvictionFactor {
        ConvictionFactor {
            name,
            met: false,
            weight,
            reason,
        }
    }
}

/// Complete conviction assessment for one listing-mandate match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvictionAssessment {
    pub listing_id: String,
    pub mandate_id: String,
    pub level: ConvictionLevel,
    /// Blended confidence in `[0.0, 1.0]`.
    pub confidence_score: f64,
    pub positive_factors: Vec<ConvictionFactor>,
    pub negative_factors: Vec<ConvictionFactor>,
    pub neutral_factors: Vec<ConvictionFactor>,
    pub summary: String,
    pub recommendation: String,
}

fn assess_price(listing: &Listing, mandate: &Mandate, factors: &mut Vec<ConvictionFactor>) {
    let fin = &mandate.financial;
    let price = listing.asking_price();

    if let (Some(min), Some(max)) = (fin.min_deal_size, fin.max_deal_size) {
        let range_size = max.saturating_sub(min);
        let position = if range_size > 0 {
            (price as f64 - min as f64) / range_size as f64
        } else {
            0.5
        };

        if (0.2..=0.8).contains(&position) {
            factors.push(ConvictionFactor::met(
                "price_positioning",
                0.15,
                format!(
                    "Price £{price} well-positioned in mandate range (position: {:.0}%)",
                    position * 100.0
                ),
            ));
        } else if position < 0.2 {
            factors.push(ConvictionFactor::met(
                "price_positioning",
                0.10,
                format!("Price £{price} at lower end of range - potential value opportunity"),
            ));
        } else {
            factors.push(ConvictionFactor::unmet(
                "price_positioning",
                0.10,
                format!("Price £{price} at upper end of range - less headroom"),
            ));
        }
    }

    if let (Some(psf), Some(cap)) = (listing.financial.price_per_sqft, fin.max_price_psf) {
        if psf <= cap * 0.85 {
            factors.push(ConvictionFactor::met(
                "price_psf_value",
                0.10,
                format!("Price/sqft £{psf:.0} significantly below max £{cap:.0}"),
            ));
        } else if psf <= cap {
            factors.push(ConvictionFactor::met(
                "price_psf_value",
                0.05,
                format!("Price/sqft £{psf:.0} within acceptable range"),
            ));
        }
    }
}

fn assess_yield(listing: &Listing, mandate: &Mandate, factors: &mut Vec<ConvictionFactor>) {
    let fin = &mandate.financial;

    let Some(listing_yield) = listing.gross_yield() else {
        factors.push(ConvictionFactor::unmet(
            "yield_data",
            0.15,
            "No yield data available - requires manual assessment".to_string(),
        ));
        return;
    };

    if let Some(min_yield) = fin.min_yield {
        let buffer = listing_yield - min_yield;
        if buffer >= 2.0 {
            factors.push(ConvictionFactor::met(
                "yield_buffer",
                0.20,
                format!(
                    "Yield {listing_yield:.1}% exceeds minimum by {buffer:.1}pp - strong buffer"
                ),
            ));
        } else if buffer >= 1.0 {
            factors.push(ConvictionFactor::met(
                "yield_buffer",
                0.15,
                format!(
                    "Yield {listing_yield:.1}% exceeds minimum by {buffer:.1}pp - adequate buffer"
                ),
            ));
        } else if buffer >= 0.0 {
            factors.push(ConvictionFactor::met(
                "yield_buffer",
                0.05,
                format!("Yield {listing_yield:.1}% meets minimum but limited buffer"),
            ));
        } else {
            factors.push(ConvictionFactor::unmet(
                "yield_buffer",
                0.20,
                format!("Yield {listing_yield:.1}% below minimum {min_yield:.1}%"),
            ));
        }
    }

    if let Some(target) = fin.target_yield {
        if listing_yield >= target {
            factors.push(ConvictionFactor::met(
                "yield_target",
                0.15,
                format!("Yield {listing_yield:.1}% meets/exceeds target {target:.1}%"),
            ));
        }
    }
}

fn assess_location(listing: &Listing, mandate: &Mandate, factors: &mut Vec<ConvictionFactor>) {
    let geo = &mandate.geographic;
    let region = listing.region();
    let postcode = listing.postcode_area();

    if geo.regions.iter().any(|r| r == region) {
        factors.push(ConvictionFactor::met(
            "region_match",
            0.15,
            format!("Region '{region}' explicitly targeted by mandate"),
        ));
    } else if geo.regions.is_empty() {
        factors.push(ConvictionFactor::met(
            "region_match",
            0.05,
            "No region restrictions - location acceptable".to_string(),
        ));
    }

    if !geo.postcodes.is_empty() {
        let exact = geo
            .postcodes
            .iter()
            .any(|pc| postcode.eq_ignore_ascii_case(pc));
        let prefix = geo
            .postcodes
            .iter()
            .any(|pc| postcode.to_ascii_uppercase().starts_with(&pc.to_ascii_uppercase()));

        if exact {
            factors.push(ConvictionFactor::met(
                "postcode_match",
                0.15,
                format!("Postcode '{postcode}' exactly matches mandate target"),
            ));
        } else if prefix {
            factors.push(ConvictionFactor::met(
                "postcode_match",
                0.10,
                format!("Postcode '{postcode}' within targeted area"),
            ));
        }
    }
}

fn assess_property(listing: &Listing, mandate: &Mandate, factors: &mut Vec<ConvictionFactor>) {
    let prop = &mandate.property;
    let details = &listing.property_details;

    if let (Some(min_units), Some(max_units)) = (prop.min_units, prop.max_units) {
        let units = details.unit_count;
        if units >= min_units && units <= max_units {
            let range_size = max_units - min_units;
            if range_size > 0 {
                let position = (units - min_units) as f64 / range_size as f64;
                if (0.2..=0.8).contains(&position) {
                    factors.push(ConvictionFactor::met(
                        "unit_count",
                        0.10,
                        format!("Unit count ({units}) in optimal range for mandate"),
                    ));
                } else {
                    factors.push(ConvictionFactor::met(
                        "unit_count",
                        0.05,
                        format!("Unit count ({units}) acceptable but at edge of range"),
                    ));
                }
            }
        }
    }

    match details.condition {
        Condition::Turnkey if prop.accept_turnkey => {
            factors.push(ConvictionFactor::met(
                "condition_fit",
                0.15,
                "Turnkey property - immediate income potential".to_string(),
            ));
        }
        Condition::LightRefurb if prop.accept_refurbishment => {
            factors.push(ConvictionFactor::met(
                "condition_fit",
                0.12,
                "Light refurb opportunity - value-add potential with limited risk".to_string(),
            ));
        }
        Condition::HeavyRefurb if prop.accept_refurbishment => {
            factors.push(ConvictionFactor::met(
                "condition_fit",
                0.08,
                "Heavy refurb - significant value-add but execution risk".to_string(),
            ));
        }
        Condition::Development if prop.accept_development => {
            factors.push(ConvictionFactor::met(
                "condition_fit",
                0.05,
                "Development opportunity - high potential but high risk".to_string(),
            ));
        }
        Condition::Unknown => {
            factors.push(ConvictionFactor::unmet(
                "condition_fit",
                0.10,
                "Property condition unknown - requires inspection".to_string(),
            ));
        }
        _ => {}
    }

    if details.has_tenants {
        factors.push(ConvictionFactor::met(
            "income_status",
            0.10,
            "Property tenanted - immediate income stream".to_string(),
        ));
    }
}

fn assess_tenure(listing: &Listing, factors: &mut Vec<ConvictionFactor>) {
    match listing.tenure {
        Tenure::Freehold => {
            factors.push(ConvictionFactor::met(
                "tenure_security",
                0.10,
                "Freehold tenure - maximum security".to_string(),
            ));
        }
        Tenure::ShareOfFreehold => {
            factors.push(ConvictionFactor::met(
                "tenure_security",
                0.08,
                "Share of freehold - good security".to_string(),
            ));
        }
        Tenure::Leasehold => match listing.financial.lease_years_remaining {
            Some(remaining) if remaining >= 125 => {
                factors.push(ConvictionFactor::met(
                    "tenure_security",
                    0.08,
                    format!("Long leasehold ({remaining} years) - acceptable security"),
                ));
            }
            Some(remaining) if remaining >= 80 => {
                factors.push(ConvictionFactor::met(
                    "tenure_security",
                    0.05,
                    format!("Medium leasehold ({remaining} years) - may need extension"),
                ));
            }
            Some(remaining) => {
                factors.push(ConvictionFactor::unmet(
                    "tenure_security",
                    0.10,
                    format!("Short leasehold ({remaining} years) - extension required"),
                ));
            }
            None => {}
        },
        _ => {}
    }
}

fn generate_summary(
    level: ConvictionLevel,
    positive: &[ConvictionFactor],
    negative: &[ConvictionFactor],
    scoring_result: &ScoringResult,
) -> String {
    let grade = scoring_result.match_grade.label();
    let score = scoring_result.total_score;
    match level {
        ConvictionLevel::High => {
            let mut summary = format!("Strong match ({grade} grade, {score:.0}/100). ");
            if !positive.is_empty() {
                let mut ranked: Vec<&ConvictionFactor> = positive.iter().collect();
                ranked.sort_by(|a, b| {
                    b.weight
                        .partial_cmp(&a.weight)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                let top: Vec<&str> = ranked.iter().take(2).map(|f| f.reason.as_str()).collect();
                summary.push_str(&format!("Key strengths: {}.", top.join("; ")));
            }
            summary
        }
        ConvictionLevel::Medium => {
            let mut summary = format!("Moderate match ({grade} grade, {score:.0}/100). ");
            if !positive.is_empty() {
                summary.push_str(&format!("{} positive factors identified. ", positive.len()));
            }
            if !negative.is_empty() {
                summary.push_str(&format!("{} areas require attention.", negative.len()));
            }
            summary
        }
        ConvictionLevel::Low => {
            let mut summary = format!("Marginal match ({grade} grade, {score:.0}/100). ");
            if !negative.is_empty() {
                let concerns: Vec<&str> =
                    negative.iter().take(2).map(|f| f.reason.as_str()).collect();
                summary.push_str(&format!("Concerns: {}.", concerns.join("; ")));
            }
            summary
        }
        ConvictionLevel::None => {
            let mut summary = "Does not meet minimum criteria. ".to_string();
            if !scoring_result.disqualification_reasons.is_empty() {
                let reasons: Vec<&str> = scoring_result
                    .disqualification_reasons
                    .iter()
                    .take(2)
                    .map(String::as_str)
                    .collect();
                summary.push_str(&format!("Disqualified: {}.", reasons.join("; ")));
            }
            summary
        }
    }
}

const fn generate_recommendation(level: ConvictionLevel) -> &'static str {
    match level {
        ConvictionLevel::High => {
            "RECOMMEND: Proceed to detailed due diligence and investor presentation"
        }
        ConvictionLevel::Medium => "CONSIDER: Review with investment committee, clarify open items",
        ConvictionLevel::Low => "WATCH: Monitor for price reduction or changed circumstances",
        ConvictionLevel::None => "PASS: Does not meet mandate criteria",
    }
}

/// Assess conviction for a listing-mandate match.
///
/// Confidence blends the numeric score with the factor evidence (70/30)
/// when hard filters pass; a hard-filter failure forces the level to NONE
/// and scales confidence down to 30% of the factor evidence alone.
pub fn assess_conviction(
    listing: &Listing,
    mandate: &Mandate,
    scoring_result: &ScoringResult,
) -> ConvictionAssessment {
    let deal = &mandate.deal_criteria;

    let mut all_factors = Vec::new();
    assess_price(listing, mandate, &mut all_factors);
    assess_yield(listing, mandate, &mut all_factors);
    assess_location(listing, mandate, &mut all_factors);
    assess_property(listing, mandate, &mut all_factors);
    assess_tenure(listing, &mut all_factors);

    let mut positive = Vec::new();
    let mut negative = Vec::new();
    let mut neutral = Vec::new();
    for factor in &all_factors {
        if !factor.met {
            negative.push(factor.clone());
        } else if factor.weight >= 0.10 {
            positive.push(factor.clone());
        } else {
            neutral.push(factor.clone());
        }
    }

    let total_weight: f64 = all_factors.iter().map(|f| f.weight).sum();
    let met_weight: f64 = all_factors.iter().filter(|f| f.met).map(|f| f.weight).sum();
    let factor_confidence = met_weight / if total_weight > 0.0 { total_weight } else { 1.0 };

    let final_confidence = if scoring_result.passes_hard_filters {
        (scoring_result.total_score / 100.0) * 0.7 + factor_confidence * 0.3
    } else {
        factor_confidence * 0.3
    };

    let level = if !scoring_result.passes_hard_filters {
        ConvictionLevel::None
    } else if final_confidence >= deal.high_conviction_threshold {
        ConvictionLevel::High
    } else if final_confidence >= deal.medium_conviction_threshold {
        ConvictionLevel::Medium
    } else if final_confidence >= deal.low_conviction_threshold {
        ConvictionLevel::Low
    } else {
        ConvictionLevel::None
    };

    let summary = generate_summary(level, &positive, &negative, scoring_result);

    ConvictionAssessment {
        listing_id: listing.listing_id.clone(),
        mandate_id: mandate.mandate_id.clone(),
        level,
        confidence_score: final_confidence,
        positive_factors: positive,
        negative_factors: negative,
        neutral_factors: neutral,
        summary,
        recommendation: generate_recommendation(level).to_string(),
    }
}

/// Group assessments by conviction level, each group ordered by confidence
/// descending. All four levels are present in the result.
pub fn rank_by_conviction(
    assessments: Vec<ConvictionAssessment>,
) -> Vec<(ConvictionLevel, Vec<ConvictionAssessment>)> {
    let mut ranked: Vec<(ConvictionLevel, Vec<ConvictionAssessment>)> = vec![
        (ConvictionLevel::High, Vec::new()),
        (ConvictionLevel::Medium, Vec::new()),
        (ConvictionLevel::Low, Vec::new()),
        (ConvictionLevel::None, Vec::new()),
    ];

    for assessment in assessments {
        if let Some((_, group)) = ranked.iter_mut().find(|(level, _)| *level == assessment.level) {
            group.push(assessment);
        }
    }

    for (_, group) in &mut ranked {
        group.sort_by(|a, b| {
            b.confidence_score
                .partial_cmp(&a.confidence_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    ranked
}
