//! Recommendation synthesis: scoring, conviction, and rejection analysis
//! combined into a single actionable output per listing-mandate pair.
//!
//! When a planning context is supplied the assessment enriches the headline,
//! rationale, next steps, and risks; a planning failure degrades silently so
//! the core recommendation always comes back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::listing::Listing;
use crate::mandate::Mandate;
use crate::matching::conviction::{assess_conviction, ConvictionAssessment, ConvictionLevel};
use crate::matching::rejection::{evaluate_rejection, RejectionResult};
use crate::matching::scoring::{score_listing, ScoringResult};
use crate::planning::{planning_assessment, PlanningAssessment, PlanningContext};

/// Recommended action for a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    /// Strong recommendation to proceed.
    Pursue,
    /// Worth reviewing with caveats.
    Consider,
    /// Monitor for changes.
    Watch,
    /// Do not pursue.
    Pass,
}

impl RecommendationAction {
    pub const fn label(self) -> &'static str {
        match self {
            RecommendationAction::Pursue => "pursue",
            RecommendationAction::Consider => "consider",
            RecommendationAction::Watch => "watch",
            RecommendationAction::Pass => "pass",
        }
    }

    const fn rank(self) -> u32 {
        match self {
            RecommendationAction::Pursue => 1,
            RecommendationAction::Consider => 2,
            RecommendationAction::Watch => 3,
            RecommendationAction::Pass => 4,
        }
    }
}

/// Complete recommendation for a listing-mandate match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealRecommendation {
    pub listing_id: String,
    pub mandate_id: String,
    pub action: RecommendationAction,
    /// Lower is higher priority.
    pub priority_rank: u32,
    pub scoring: ScoringResult,
    pub conviction: ConvictionAssessment,
    pub rejection: RejectionResult,
    pub headline: String,
    pub rationale: String,
    pub next_steps: Vec<String>,
    pub risks: Vec<String>,
    pub planning: Option<PlanningAssessment>,
    pub generated_at: DateTime<Utc>,
}

impl DealRecommendation {
    pub fn is_actionable(&self) -> bool {
        matches!(
            self.action,
            RecommendationAction::Pursue | RecommendationAction::Consider
        )
    }

    pub fn has_planning_upside(&self) -> bool {
        self.planning
            .as_ref()
            .is_some_and(|p| p.planning_score.score >= 60)
    }
}

fn determine_action(
    scoring: &ScoringResult,
    conviction: &ConvictionAssessment,
    rejection: &RejectionResult,
    mandate: &Mandate,
) -> RecommendationAction {
    let deal = &mandate.deal_criteria;

    if rejection.rejected {
        return RecommendationAction::Pass;
    }

    if conviction.level == ConvictionLevel::High
        && scoring.total_score >= deal.pursue_score_threshold
    {
        return RecommendationAction::Pursue;
    }

    if conviction.level == ConvictionLevel::Medium {
        return RecommendationAction::Consider;
    }
    if conviction.level == ConvictionLevel::High
        && scoring.total_score >= deal.consider_score_threshold
    {
        return RecommendationAction::Consider;
    }

    if conviction.level == ConvictionLevel::Low
        && scoring.passes_hard_filters
        && scoring.total_score >= deal.min_overall_score
    {
        return RecommendationAction::Watch;
    }

    RecommendationAction::Pass
}

/// Priority within the action band tracks the score; mandate priority breaks
/// ties between mandates.
fn calculate_priority(
    action: RecommendationAction,
    scoring: &ScoringResult,
    mandate: &Mandate,
) -> u32 {
    let score_adjustment = ((100.0 - scoring.total_score) / 10.0) as u32;
    let mandate_factor = u32::from(mandate.priority.saturating_sub(1));
    action.rank() * 100 + score_adjustment * 10 + mandate_factor
}

fn generate_headline(
    listing: &Listing,
    action: RecommendationAction,
    scoring: &ScoringResult,
    conviction: &ConvictionAssessment,
) -> String {
    match action {
        RecommendationAction::Pursue => format!(
            "STRONG MATCH: {} ({} grade, {} conviction)",
            listing.title,
            scoring.match_grade.label(),
            conviction.level.label()
        ),
        RecommendationAction::Consider => format!(
            "REVIEW: {} - {:.0}/100 score, {} conviction",
            listing.title,
            scoring.total_score,
            conviction.level.label()
        ),
        RecommendationAction::Watch => {
            format!("MONITOR: {} - potential if conditions change", listing.title)
        }
        RecommendationAction::Pass => {
            format!("PASS: {} - does not meet criteria", listing.title)
        }
    }
}

fn generate_rationale(
    action: RecommendationAction,
    scoring: &ScoringResult,
    conviction: &ConvictionAssessment,
    rejection: &RejectionResult,
    mandate: &Mandate,
) -> String {
    let deal = &mandate.deal_criteria;
    let score = scoring.total_score;

    match action {
        RecommendationAction::Pursue => {
            let reasons: Vec<&str> = conviction
                .positive_factors
                .iter()
                .take(2)
                .map(|f| f.reason.as_str())
                .collect();
            format!(
                "Strong alignment with mandate criteria. Score {score:.0}/100 exceeds pursue threshold ({:.0}). {}",
                deal.pursue_score_threshold,
                reasons.join(". ")
            )
        }
        RecommendationAction::Consider => {
            let threshold_info = format!(
                " Score {score:.0}/100 meets consider threshold ({:.0}).",
                deal.consider_score_threshold
            );
            let soft = rejection.soft_rejections();
            if soft.is_empty() {
                format!("{}{threshold_info}", conviction.summary)
            } else {
                let concerns: Vec<&str> = soft.iter().take(2).map(|r| r.title).collect();
                format!(
                    "{}{threshold_info} Concerns to address: {}.",
                    conviction.summary,
                    concerns.join(", ")
                )
            }
        }
        RecommendationAction::Watch => {
            let threshold_info = format!(
                " Score {score:.0}/100 above minimum ({:.0}) but below consider threshold ({:.0}).",
                deal.min_overall_score, deal.consider_score_threshold
            );
            let issues: Vec<&str> = conviction
                .negative_factors
                .iter()
                .take(2)
                .map(|f| f.reason.as_str())
                .collect();
            if issues.is_empty() {
                format!(
                    "Marginal fit with current criteria.{threshold_info} Monitor for price or condition changes."
                )
            } else {
                format!("Marginal fit.{threshold_info} Issues: {}", issues.join(". "))
            }
        }
        RecommendationAction::Pass => {
            let hard = rejection.hard_rejections();
            if hard.is_empty() {
                format!(
                    "Does not meet minimum mandate criteria. Score {score:.0}/100 below minimum threshold ({:.0}).",
                    deal.min_overall_score
                )
            } else {
                let reasons: Vec<&str> = hard.iter().take(2).map(|r| r.title).collect();
                format!("Rejected due to: {}.", reasons.join(", "))
            }
        }
    }
}

fn generate_next_steps(
    action: RecommendationAction,
    listing: &Listing,
    conviction: &ConvictionAssessment,
    rejection: &RejectionResult,
) -> Vec<String> {
    let mut steps = Vec::new();

    match action {
        RecommendationAction::Pursue => {
            steps.push("Request detailed property information pack".to_string());
            steps.push("Schedule site visit / virtual tour".to_string());
            steps.push("Prepare investment committee memo".to_string());
            if listing.property_details.has_tenants {
                steps.push("Request tenancy schedule and rent roll".to_string());
            }
        }
        RecommendationAction::Consider => {
            for reason in rejection.soft_rejections().iter().take(2) {
                steps.push(format!("Investigate: {}", reason.remedy));
            }
            steps.push("Gather additional due diligence information".to_string());
            steps.push("Assess if concerns can be mitigated".to_string());
        }
        RecommendationAction::Watch => {
            steps.push("Set price alert for this listing".to_string());
            steps.push("Monitor for status changes (price reduction, etc.)".to_string());
            if !conviction.negative_factors.is_empty() {
                steps.push("Re-evaluate if market conditions change".to_string());
            }
        }
        RecommendationAction::Pass => {}
    }

    steps
}

fn generate_risks(conviction: &ConvictionAssessment, rejection: &RejectionResult) -> Vec<String> {
    let mut risks: Vec<String> = conviction
        .negative_factors
        .iter()
        .map(|f| f.reason.clone())
        .collect();

    for reason in rejection.soft_rejections() {
        risks.push(format!("{}: {}", reason.title, reason.explanation));
    }

    risks.truncate(5);
    risks
}

fn enhance_with_planning(
    planning: &PlanningAssessment,
    action: RecommendationAction,
    headline: &mut String,
    rationale: &mut String,
    next_steps: &mut Vec<String>,
    risks: &mut Vec<String>,
) {
    let score = &planning.planning_score;
    let uplift = &planning.uplift_estimate;

    if score.score >= 70 {
        headline.push_str(&format!(
            " | PLANNING UPSIDE: {}",
            score.label.label().to_uppercase()
        ));
    }

    if score.score >= 60 {
        rationale.push_str(&format!(
            " Planning potential: {} ({}/100) with estimated {:.0}%-{:.0}% uplift.",
            score.label.label(),
            score.score,
            uplift.percent_low,
            uplift.percent_high
        ));
    }

    if matches!(
        action,
        RecommendationAction::Pursue | RecommendationAction::Consider
    ) {
        if let Some(first) = planning.recommendations.first() {
            next_steps.push(format!("Planning: {first}"));
        }
    }

    for negative in planning.negative_factors.iter().take(2) {
        if negative.starts_with("BLOCKER:") {
            risks.insert(0, format!("Planning: {negative}"));
        } else {
            risks.push(format!("Planning: {negative}"));
        }
    }
}

/// Generate a complete recommendation for a listing-mandate pair.
///
/// Runs scoring, conviction, and rejection analysis, then synthesizes the
/// action using the mandate's thresholds. A supplied planning context adds
/// upside analysis; a strong planning score (>= 70) boosts priority.
pub fn generate_recommendation(
    listing: &Listing,
    mandate: &Mandate,
    planning_context: Option<&PlanningContext>,
) -> DealRecommendation {
    let scoring = score_listing(listing, mandate, None);
    let conviction = assess_conviction(listing, mandate, &scoring);
    let rejection = evaluate_rejection(listing, mandate, None, false);

    let action = determine_action(&scoring, &conviction, &rejection, mandate);
    let mut priority = calculate_priority(action, &scoring, mandate);

    let mut headline = generate_headline(listing, action, &scoring, &conviction);
    let mut rationale = generate_rationale(action, &scoring, &conviction, &rejection, mandate);
    let mut next_steps = generate_next_steps(action, listing, &conviction, &rejection);
    let mut risks = generate_risks(&conviction, &rejection);

    let planning = planning_context.and_then(|context| {
        match planning_assessment(context, listing.asking_price()) {
            Ok(assessment) => {
                enhance_with_planning(
                    &assessment,
                    action,
                    &mut headline,
                    &mut rationale,
                    &mut next_steps,
                    &mut risks,
                );
                if assessment.planning_score.score >= 70 {
                    priority = priority.saturating_sub(50).max(1);
                }
                Some(assessment)
            }
            Err(error) => {
                debug!(listing_id = %listing.listing_id, %error, "planning assessment skipped");
                None
            }
        }
    });

    DealRecommendation {
        listing_id: listing.listing_id.clone(),
        mandate_id: mandate.mandate_id.clone(),
        action,
        priority_rank: priority,
        scoring,
        conviction,
        rejection,
        headline,
        rationale,
        next_steps,
        risks,
        planning,
        generated_at: Utc::now(),
    }
}

/// Generate recommendations for a batch of listings, sorted by priority
/// rank ascending (best first). Planning contexts are matched by listing id.
pub fn generate_recommendations(
    listings: &[Listing],
    mandate: &Mandate,
    planning_contexts: Option<&std::collections::HashMap<String, PlanningContext>>,
) -> Vec<DealRecommendation> {
    let mut recommendations: Vec<DealRecommendation> = listings
        .iter()
        .map(|listing| {
            let context = planning_contexts.and_then(|map| map.get(&listing.listing_id));
            generate_recommendation(listing, mandate, context)
        })
        .collect();

    recommendations.sort_by_key(|r| r.priority_rank);
    recommendations
}

/// Filter to only actionable recommendations.
pub fn actionable_recommendations(
    recommendations: &[DealRecommendation],
) -> Vec<&DealRecommendation> {
    recommendations.iter().filter(|r| r.is_actionable()).collect()
}

/// Summary report of recommendations for a mandate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub mandate_id: String,
    pub mandate_name: String,
    pub generated_at: DateTime<Utc>,
    pub total_listings: usize,
    pub recommendations: Vec<DealRecommendation>,
}

impl RecommendationReport {
    pub fn pursue_count(&self) -> usize {
        self.count(RecommendationAction::Pursue)
    }

    pub fn consider_count(&self) -> usize {
        self.count(RecommendationAction::Consider)
    }

    pub fn watch_count(&self) -> usize {
        self.count(RecommendationAction::Watch)
    }

    pub fn pass_count(&self) -> usize {
        self.count(RecommendationAction::Pass)
    }

    pub fn actionable_count(&self) -> usize {
        self.pursue_count() + self.consider_count()
    }

    fn count(&self, action: RecommendationAction) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.action == action)
            .count()
    }
}

/// Generate a complete recommendation report for a mandate.
pub fn generate_report(
    listings: &[Listing],
    mandate: &Mandate,
    planning_contexts: Option<&std::collections::HashMap<String, PlanningContext>>,
) -> RecommendationReport {
    let recommendations = generate_recommendations(listings, mandate, planning_contexts);

    RecommendationReport {
        mandate_id: mandate.mandate_id.clone(),
        mandate_name: mandate.investor_name.clone(),
        generated_at: Utc::now(),
        total_listings: listings.len(),
        recommendations,
    }
}
