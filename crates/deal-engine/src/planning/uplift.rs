//! Value uplift estimation from development type and constraints.
//!
//! Base ranges reflect general market observation, not guarantees; the
//! estimate always states its assumptions and caveats.

use crate::planning::{PlanningContext, PrecedentType, UpliftConfidence, UpliftEstimate};

/// Typical uplift percentages (low, mid, high) per development type.
const fn base_range(proposed: PrecedentType) -> (f64, f64, f64) {
    match proposed {
        PrecedentType::ExtensionRear => (5.0, 10.0, 15.0),
        PrecedentType::ExtensionSide => (8.0, 12.0, 18.0),
        PrecedentType::ExtensionLoft => (10.0, 15.0, 22.0),
        PrecedentType::ExtensionBasement => (12.0, 20.0, 30.0),
        PrecedentType::ConversionResidential => (15.0, 25.0, 40.0),
        PrecedentType::ConversionHmo => (20.0, 35.0, 50.0),
        PrecedentType::ConversionFlats => (25.0, 40.0, 60.0),
        PrecedentType::ChangeOfUse => (10.0, 20.0, 35.0),
        PrecedentType::NewBuild => (30.0, 50.0, 80.0),
        PrecedentType::DemolitionRebuild => (25.0, 45.0, 70.0),
        PrecedentType::Subdivision => (20.0, 35.0, 55.0),
        PrecedentType::PermittedDevelopment => (5.0, 8.0, 12.0),
        PrecedentType::Other => (3.0, 7.0, 12.0),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Estimate the potential value uplift from planning permission.
///
/// Constraint modifiers compound additively and are floored so the adjusted
/// range never drops below 10% of the base.
pub fn estimate_uplift(
    context: &PlanningContext,
    current_value: u64,
    precedent_approval_rate: Option<f64>,
) -> UpliftEstimate {
    let (low, mid, high) = base_range(context.proposed_type);

    let mut total_modifier = 0.0f64;
    let mut assumptions = Vec::new();
    let mut caveats = Vec::new();

    if context.listed_building {
        match context.listed_grade.to_uppercase().as_str() {
            "I" => {
                total_modifier -= 0.8;
                caveats.push("Grade I listing severely limits development scope".to_string());
            }
            "II*" => {
                total_modifier -= 0.6;
                caveats.push("Grade II* listing significantly constrains works".to_string());
            }
            _ => {
                total_modifier -= 0.5;
                caveats.push("Listed building status limits alteration scope".to_string());
            }
        }
    }

    if context.conservation_area {
        total_modifier -= 0.2;
        caveats.push("Conservation area requires sympathetic design".to_string());
    }
    if context.green_belt {
        total_modifier -= 0.4;
        caveats.push("Green Belt severely restricts development".to_string());
    }
    if context.article_4_direction {
        total_modifier -= 0.15;
        caveats.push("Article 4 removes permitted development rights".to_string());
    }
    if context.flood_zone == 3 {
        total_modifier -= 0.25;
        caveats.push("Flood Zone 3 adds cost and complexity".to_string());
    }
    if context.tenure.eq_ignore_ascii_case("leasehold") {
        total_modifier -= 0.1;
        caveats.push("Leasehold: freeholder may share in uplift".to_string());
    }

    if context.plot_size_sqft.is_some_and(|s| s > 5000) {
        total_modifier += 0.15;
        assumptions.push("Large plot provides development flexibility".to_string());
    }
    if context.tenure.eq_ignore_ascii_case("freehold") {
        total_modifier += 0.05;
        assumptions.push("Freehold ownership gives full control".to_string());
    }

    let pd_suitable = context.has_pd_rights()
        && matches!(
            context.proposed_type,
            PrecedentType::ExtensionRear
                | PrecedentType::ExtensionLoft
                | PrecedentType::PermittedDevelopment
        );
    if pd_suitable {
        total_modifier += 0.1;
        assumptions.push("Permitted development may reduce planning risk".to_string());
    }

    if precedent_approval_rate.is_some_and(|rate| rate >= 75.0) {
        total_modifier += 0.1;
        assumptions.push("Strong local precedent for similar developments".to_string());
    }

    let modifier = (1.0 + total_modifier).max(0.1);
    let adjusted_low = low * modifier;
    let adjusted_mid = mid * modifier;
    let adjusted_high = high * modifier;

    let confidence = calculate_confidence(context, precedent_approval_rate);

    caveats.extend([
        "Estimates based on general market assumptions".to_string(),
        "Actual uplift depends on quality of execution".to_string(),
        "Build costs not deducted from uplift figures".to_string(),
        "Market conditions may vary".to_string(),
    ]);

    UpliftEstimate {
        percent_low: round1(adjusted_low),
        percent_mid: round1(adjusted_mid),
        percent_high: round1(adjusted_high),
        value_low: (current_value as f64 * adjusted_low / 100.0) as u64,
        value_mid: (current_value as f64 * adjusted_mid / 100.0) as u64,
        value_high: (current_value as f64 * adjusted_high / 100.0) as u64,
        confidence,
        assumptions,
        caveats,
    }
}

fn calculate_confidence(
    context: &PlanningContext,
    precedent_approval_rate: Option<f64>,
) -> UpliftConfidence {
    let mut score = 50;

    if let Some(rate) = precedent_approval_rate {
        if rate >= 80.0 {
            score += 20;
        } else if rate >= 60.0 {
            score += 10;
        }
    }
    if context.proposed_type == PrecedentType::PermittedDevelopment {
        score += 15;
    }
    if context.tenure.eq_ignore_ascii_case("freehold") {
        score += 5;
    }
    if context.listed_building {
        score -= 20;
    }
    if context.green_belt {
        score -= 15;
    }
    if context.nearby_precedents.is_empty() {
        score -= 10;
    }

    if score >= 65 {
        UpliftConfidence::High
    } else if score >= 40 {
        UpliftConfidence::Medium
    } else {
        UpliftConfidence::Low
    }
}

/// The (low, high) absolute value range for a proposed development.
pub fn uplift_value_range(context: &PlanningContext, current_value: u64) -> (u64, u64) {
    let estimate = estimate_uplift(context, current_value, None);
    (estimate.value_low, estimate.value_high)
}
