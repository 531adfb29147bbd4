//! Combines precedent, feasibility, and uplift analysis into the overall
//! planning potential score and assessment.

use chrono::Utc;

use crate::planning::feasibility::{assess_feasibility, FeasibilityResult};
use crate::planning::precedent::{analyze_precedents, calculate_precedent_score, PrecedentAnalysis};
use crate::planning::uplift::estimate_uplift;
use crate::planning::{
    PlanningAssessment, PlanningContext, PlanningError, PlanningLabel, PlanningScore,
    UpliftEstimate, DISCLAIMER,
};

const EXCEPTIONAL_THRESHOLD: u8 = 80;
const STRONG_THRESHOLD: u8 = 60;
const MEDIUM_THRESHOLD: u8 = 40;

const PRECEDENT_WEIGHT: f64 = 0.35;
const FEASIBILITY_WEIGHT: f64 = 0.40;
const UPLIFT_WEIGHT: f64 = 0.25;

/// Weighted combination of the three component scores.
///
/// The uplift component treats a 30% mid-point estimate as a full 100.
pub fn calculate_planning_score(
    precedent_score: u8,
    feasibility_score: u8,
    uplift_percent_mid: f64,
) -> PlanningScore {
    let uplift_score = ((uplift_percent_mid / 30.0 * 100.0) as u32).min(100) as u8;

    let weighted = f64::from(precedent_score) * PRECEDENT_WEIGHT
        + f64::from(feasibility_score) * FEASIBILITY_WEIGHT
        + f64::from(uplift_score) * UPLIFT_WEIGHT;
    let score = weighted as u8;

    let label = if score >= EXCEPTIONAL_THRESHOLD {
        PlanningLabel::Exceptional
    } else if score >= STRONG_THRESHOLD {
        PlanningLabel::Strong
    } else if score >= MEDIUM_THRESHOLD {
        PlanningLabel::Medium
    } else {
        PlanningLabel::Low
    };

    PlanningScore {
        score,
        label,
        precedent_score,
        feasibility_score,
        uplift_score,
    }
}

/// Generate a complete planning potential assessment.
///
/// The main entry point for the planning engine. `current_value` must be
/// positive; uplift figures are computed against it.
pub fn planning_assessment(
    context: &PlanningContext,
    current_value: u64,
) -> Result<PlanningAssessment, PlanningError> {
    if current_value == 0 {
        return Err(PlanningError::MissingCurrentValue);
    }

    let precedent_analysis = analyze_precedents(context);
    let precedent_score = calculate_precedent_score(context);

    let feasibility = assess_feasibility(context);

    let uplift = estimate_uplift(context, current_value, precedent_analysis.approval_rate);

    let planning_score =
        calculate_planning_score(precedent_score, feasibility.score, uplift.percent_mid);

    let rationale = build_rationale(
        planning_score,
        &precedent_analysis,
        &feasibility,
        &uplift,
    );

    let mut positive_factors: Vec<String> = feasibility
        .positive_factors
        .iter()
        .map(|(_, description)| description.clone())
        .collect();
    let mut negative_factors: Vec<String> = feasibility
        .negative_factors
        .iter()
        .map(|(_, description)| description.clone())
        .collect();

    if let Some(rate) = precedent_analysis.approval_rate {
        if rate >= 70.0 {
            positive_factors.push(format!("High local approval rate ({rate:.0}%)"));
        } else if rate < 40.0 {
            negative_factors.push(format!("Low local approval rate ({rate:.0}%)"));
        }
    }
    if uplift.percent_mid >= 20.0 {
        positive_factors.push(format!(
            "Strong uplift potential ({:.0}%)",
            uplift.percent_mid
        ));
    }

    let mut recommendations = feasibility.recommendations.clone();

    for blocker in feasibility.blockers.iter().rev() {
        negative_factors.insert(0, format!("BLOCKER: {blocker}"));
    }

    recommendations.push(
        if planning_score.score >= EXCEPTIONAL_THRESHOLD {
            "Strong planning potential - consider engaging planning consultant for pre-application"
        } else if planning_score.score >= STRONG_THRESHOLD {
            "Good planning potential - research local plan policies and consider pre-application advice"
        } else if planning_score.score >= MEDIUM_THRESHOLD {
            "Moderate planning potential - thorough due diligence recommended before purchase"
        } else {
            "Limited planning potential - factor into valuation and do not over-pay for perceived upside"
        }
        .to_string(),
    );

    positive_factors.truncate(5);
    negative_factors.truncate(5);
    recommendations.truncate(5);

    Ok(PlanningAssessment {
        planning_score,
        uplift_estimate: uplift,
        rationale,
        positive_factors,
        negative_factors,
        recommendations,
        assessed_at: Utc::now(),
        disclaimer: DISCLAIMER,
    })
}

fn build_rationale(
    planning_score: PlanningScore,
    precedent_analysis: &PrecedentAnalysis,
    feasibility: &FeasibilityResult,
    uplift: &UpliftEstimate,
) -> Vec<String> {
    let mut rationale = vec![format!(
        "Overall planning potential assessed as {} ({}/100).",
        planning_score.label.label().to_uppercase(),
        planning_score.score
    )];

    if let Some(rate) = precedent_analysis.approval_rate {
        rationale.push(format!(
            "Precedent analysis: {rate:.0}% approval rate ({} recent approvals, {} refusals).",
            precedent_analysis.recent_approvals, precedent_analysis.recent_refusals
        ));
    } else {
        rationale.push("No relevant planning precedents found in provided data.".to_string());
    }

    rationale.extend(precedent_analysis.insights.iter().take(2).cloned());

    if feasibility.blockers.is_empty() {
        rationale.push(format!(
            "Feasibility score: {}/100 based on property constraints.",
            feasibility.score
        ));
    } else {
        rationale.push(format!(
            "IMPORTANT: {} significant constraint(s) identified that may block development.",
            feasibility.blockers.len()
        ));
    }

    rationale.push(format!(
        "Estimated uplift: {:.0}%-{:.0}% ({} confidence).",
        uplift.percent_low,
        uplift.percent_high,
        uplift.confidence.label()
    ));

    if uplift.value_mid > 0 {
        rationale.push(format!(
            "Potential value add: {}-{} GBP.",
            uplift.value_low, uplift.value_high
        ));
    }

    rationale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{PlanningPrecedent, PrecedentType};
    use chrono::Duration;

    fn precedent(reference: &str, approved: bool) -> PlanningPrecedent {
        PlanningPrecedent {
            reference: reference.to_string(),
            address: String::new(),
            postcode: String::new(),
            precedent_type: PrecedentType::ExtensionRear,
            description: String::new(),
            approved,
            decision_date: Some(Utc::now() - Duration::days(400)),
            recency_years: None,
            distance_meters: Some(150.0),
            similarity_score: 0.8,
            conditions: Vec::new(),
            refusal_reasons: Vec::new(),
        }
    }

    fn favorable_context() -> PlanningContext {
        PlanningContext {
            property_type: "house_detached".to_string(),
            tenure: "freehold".to_string(),
            proposed_type: PrecedentType::ExtensionRear,
            nearby_precedents: vec![
                precedent("A", true),
                precedent("B", true),
                precedent("C", true),
            ],
            ..PlanningContext::default()
        }
    }

    #[test]
    fn zero_current_value_is_an_error() {
        let result = planning_assessment(&favorable_context(), 0);
        assert!(matches!(result, Err(PlanningError::MissingCurrentValue)));
    }

    #[test]
    fn favorable_context_scores_strong_with_no_blockers() {
        let assessment = planning_assessment(&favorable_context(), 800_000).expect("assessment");
        assert!(assessment.planning_score.score >= 60);
        assert!(!assessment
            .negative_factors
            .iter()
            .any(|f| f.starts_with("BLOCKER")));
        assert_eq!(assessment.disclaimer, DISCLAIMER);
        assert!(assessment.uplift_estimate.value_mid > 0);
    }

    #[test]
    fn grade_one_listing_caps_the_combined_score() {
        let mut ctx = favorable_context();
        ctx.listed_building = true;
        ctx.listed_grade = "I".to_string();
        let assessment = planning_assessment(&ctx, 800_000).expect("assessment");
        assert!(assessment.planning_score.feasibility_score <= 20);
        assert!(assessment.planning_score.score <= 40);
        assert!(assessment.negative_factors[0].starts_with("BLOCKER:"));
    }

    #[test]
    fn uplift_component_saturates_at_thirty_percent_mid() {
        let score = calculate_planning_score(50, 50, 45.0);
        assert_eq!(score.uplift_score, 100);
        let modest = calculate_planning_score(50, 50, 15.0);
        assert_eq!(modest.uplift_score, 50);
    }

    #[test]
    fn label_bands() {
        assert_eq!(calculate_planning_score(100, 100, 30.0).label, PlanningLabel::Exceptional);
        assert_eq!(calculate_planning_score(60, 60, 18.0).label, PlanningLabel::Strong);
        assert_eq!(calculate_planning_score(40, 45, 12.0).label, PlanningLabel::Medium);
        assert_eq!(calculate_planning_score(10, 20, 3.0).label, PlanningLabel::Low);
    }

    #[test]
    fn rationale_reports_precedent_and_uplift_summaries() {
        let assessment = planning_assessment(&favorable_context(), 800_000).expect("assessment");
        assert!(assessment.rationale[0].contains("Overall planning potential"));
        assert!(assessment
            .rationale
            .iter()
            .any(|r| r.contains("approval rate")));
        assert!(assessment
            .rationale
            .iter()
            .any(|r| r.contains("Estimated uplift")));
    }
}
