//! Precedent analysis: how the area's planning history bears on the
//! proposed development.

use std::collections::HashMap;

use serde::Serialize;

use crate::planning::{PlanningContext, PlanningPrecedent};

/// Minimum similarity for a precedent to be considered relevant.
pub const MIN_SIMILARITY_THRESHOLD: f64 = 0.3;

/// Filter precedents to those relevant to the proposed development,
/// sorted by relevance descending.
///
/// Relevance drops precedents older than ten years or further than 1km,
/// then weights similarity by type match, recency, and proximity.
pub fn relevant_precedents(
    context: &PlanningContext,
    min_similarity: f64,
) -> Vec<&PlanningPrecedent> {
    let mut relevant: Vec<(&PlanningPrecedent, f64)> = Vec::new();

    for precedent in &context.nearby_precedents {
        if precedent.similarity_score < min_similarity {
            continue;
        }
        if precedent.age_years().is_some_and(|age| age > 10.0) {
            continue;
        }
        if precedent.distance_meters.is_some_and(|d| d > 1000.0) {
            continue;
        }

        let type_match = precedent.precedent_type == context.proposed_type;
        relevant.push((precedent, relevance(precedent, type_match)));
    }

    relevant.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    relevant.into_iter().map(|(p, _)| p).collect()
}

fn relevance(precedent: &PlanningPrecedent, type_match: bool) -> f64 {
    let mut score = precedent.similarity_score;

    if type_match {
        score *= 1.5;
    }
    if let Some(age) = precedent.age_years() {
        let recency_factor = (1.0 - age / 10.0).max(0.0);
        score *= 0.5 + 0.5 * recency_factor;
    }
    if let Some(distance) = precedent.distance_meters {
        let distance_factor = (1.0 - distance / 1000.0).max(0.0);
        score *= 0.5 + 0.5 * distance_factor;
    }

    score
}

/// Aggregated view over the relevant precedents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecedentAnalysis {
    /// Percentage of relevant applications approved, `None` with no data.
    pub approval_rate: Option<f64>,
    /// Approvals decided within the last three years.
    pub recent_approvals: usize,
    pub recent_refusals: usize,
    pub common_conditions: Vec<String>,
    pub common_refusal_reasons: Vec<String>,
    pub insights: Vec<String>,
}

/// Analyze the relevant precedents for approval statistics, recurring
/// conditions and refusal reasons, and human-readable insights.
pub fn analyze_precedents(context: &PlanningContext) -> PrecedentAnalysis {
    let relevant = relevant_precedents(context, MIN_SIMILARITY_THRESHOLD);

    if relevant.is_empty() {
        return PrecedentAnalysis {
            approval_rate: None,
            recent_approvals: 0,
            recent_refusals: 0,
            common_conditions: Vec::new(),
            common_refusal_reasons: Vec::new(),
            insights: vec!["No relevant planning precedents found in the area.".to_string()],
        };
    }

    let approved: Vec<&&PlanningPrecedent> = relevant.iter().filter(|p| p.approved).collect();
    let refused: Vec<&&PlanningPrecedent> = relevant.iter().filter(|p| !p.approved).collect();
    let approval_rate = approved.len() as f64 / relevant.len() as f64 * 100.0;

    let recent_approvals = approved
        .iter()
        .filter(|p| p.age_years().is_some_and(|age| age <= 3.0))
        .count();
    let recent_refusals = refused
        .iter()
        .filter(|p| p.age_years().is_some_and(|age| age <= 3.0))
        .count();

    let all_conditions: Vec<&String> = approved.iter().flat_map(|p| &p.conditions).collect();
    let all_refusal_reasons: Vec<&String> =
        refused.iter().flat_map(|p| &p.refusal_reasons).collect();

    let common_conditions = most_common(&all_conditions, 3);
    let common_refusal_reasons = most_common(&all_refusal_reasons, 3);

    let insights = generate_insights(
        context,
        &relevant,
        approval_rate,
        &common_conditions,
        &common_refusal_reasons,
    );

    PrecedentAnalysis {
        approval_rate: Some(approval_rate),
        recent_approvals,
        recent_refusals,
        common_conditions,
        common_refusal_reasons,
        insights,
    }
}

fn most_common(items: &[&String], n: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.trim().to_lowercase()).or_default() += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.into_iter().take(n).map(|(item, _)| item).collect()
}

fn generate_insights(
    context: &PlanningContext,
    relevant: &[&PlanningPrecedent],
    approval_rate: f64,
    common_conditions: &[String],
    common_refusal_reasons: &[String],
) -> Vec<String> {
    let mut insights = Vec::new();

    if approval_rate >= 80.0 {
        insights.push(format!(
            "High approval rate ({approval_rate:.0}%) for similar applications in this area suggests a planning-friendly environment."
        ));
    } else if approval_rate >= 60.0 {
        insights.push(format!(
            "Moderate approval rate ({approval_rate:.0}%) indicates reasonable prospects with appropriate design."
        ));
    } else if approval_rate >= 40.0 {
        insights.push(format!(
            "Mixed approval rate ({approval_rate:.0}%) suggests careful attention to local planning policies is required."
        ));
    } else {
        insights.push(format!(
            "Low approval rate ({approval_rate:.0}%) indicates challenging planning environment. Professional advice strongly recommended."
        ));
    }

    let type_matches: Vec<&&PlanningPrecedent> = relevant
        .iter()
        .filter(|p| p.precedent_type == context.proposed_type)
        .collect();
    if !type_matches.is_empty() {
        let type_approved = type_matches.iter().filter(|p| p.approved).count();
        insights.push(format!(
            "Found {} precedents for {} applications, {} approved.",
            type_matches.len(),
            context.proposed_type.label(),
            type_approved
        ));
    }

    let recent: Vec<&&PlanningPrecedent> = relevant
        .iter()
        .filter(|p| p.age_years().is_some_and(|age| age <= 2.0))
        .collect();
    if !recent.is_empty() {
        let recent_approved = recent.iter().filter(|p| p.approved).count();
        if recent_approved == recent.len() {
            insights.push(format!(
                "All {} recent applications (last 2 years) were approved, suggesting current favorable policy.",
                recent.len()
            ));
        } else if recent_approved == 0 {
            insights.push(format!(
                "All {} recent applications were refused. Review current local plan policies carefully.",
                recent.len()
            ));
        }
    }

    if !common_conditions.is_empty() {
        insights.push(format!(
            "Common conditions applied: {}. Budget for compliance.",
            common_conditions.join(", ")
        ));
    }
    if !common_refusal_reasons.is_empty() {
        insights.push(format!(
            "Common refusal reasons: {}. Address these in any application.",
            common_refusal_reasons.join(", ")
        ));
    }

    insights
}

/// Precedent-based score (0-100); no relevant data scores a neutral 50.
pub fn calculate_precedent_score(context: &PlanningContext) -> u8 {
    let relevant = relevant_precedents(context, MIN_SIMILARITY_THRESHOLD);

    if relevant.is_empty() {
        return 50;
    }

    let approved_count = relevant.iter().filter(|p| p.approved).count();
    let approval_rate = approved_count as f64 / relevant.len() as f64;
    let mut score = (approval_rate * 60.0) as i32;

    let type_approvals = relevant
        .iter()
        .filter(|p| p.precedent_type == context.proposed_type && p.approved)
        .count() as i32;
    if type_approvals > 0 {
        score += (type_approvals * 5).min(20);
    }

    let recent_approvals = relevant
        .iter()
        .filter(|p| p.approved && p.age_years().is_some_and(|age| age <= 3.0))
        .count() as i32;
    if recent_approvals > 0 {
        score += (recent_approvals * 3).min(15);
    }

    let recent_refusals = relevant
        .iter()
        .filter(|p| !p.approved && p.age_years().is_some_and(|age| age <= 3.0))
        .count() as i32;
    if recent_refusals > 0 {
        score -= (recent_refusals * 5).min(20);
    }

    let close_approvals = relevant
        .iter()
        .filter(|p| p.approved && p.distance_meters.is_some_and(|d| d <= 100.0))
        .count() as i32;
    if close_approvals > 0 {
        score += (close_approvals * 5).min(10);
    }

    score.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::PrecedentType;
    use chrono::{Duration, Utc};

    fn precedent(reference: &str, approved: bool, years_ago: i64) -> PlanningPrecedent {
        PlanningPrecedent {
            reference: reference.to_string(),
            address: String::new(),
            postcode: String::new(),
            precedent_type: PrecedentType::ExtensionRear,
            description: String::new(),
            approved,
            decision_date: Some(Utc::now() - Duration::days(years_ago * 365)),
            recency_years: None,
            distance_meters: Some(200.0),
            similarity_score: 0.8,
            conditions: Vec::new(),
            refusal_reasons: Vec::new(),
        }
    }

    fn context(precedents: Vec<PlanningPrecedent>) -> PlanningContext {
        PlanningContext {
            proposed_type: PrecedentType::ExtensionRear,
            nearby_precedents: precedents,
            ..PlanningContext::default()
        }
    }

    #[test]
    fn stale_distant_and_dissimilar_precedents_are_dropped() {
        let mut old = precedent("OLD", true, 12);
        old.decision_date = Some(Utc::now() - Duration::days(12 * 366));
        let mut far = precedent("FAR", true, 1);
        far.distance_meters = Some(1500.0);
        let mut vague = precedent("VAGUE", true, 1);
        vague.similarity_score = 0.1;
        let keep = precedent("KEEP", true, 1);

        let ctx = context(vec![old, far, vague, keep]);
        let relevant = relevant_precedents(&ctx, MIN_SIMILARITY_THRESHOLD);
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].reference, "KEEP");
    }

    #[test]
    fn type_matches_rank_above_other_types() {
        let same_type = precedent("SAME", true, 2);
        let mut other_type = precedent("OTHER", true, 2);
        other_type.precedent_type = PrecedentType::ConversionFlats;

        let ctx = context(vec![other_type, same_type]);
        let relevant = relevant_precedents(&ctx, MIN_SIMILARITY_THRESHOLD);
        assert_eq!(relevant[0].reference, "SAME");
    }

    #[test]
    fn no_precedents_scores_neutral_fifty() {
        let ctx = context(Vec::new());
        assert_eq!(calculate_precedent_score(&ctx), 50);
        let analysis = analyze_precedents(&ctx);
        assert_eq!(analysis.approval_rate, None);
        assert_eq!(analysis.insights.len(), 1);
    }

    #[test]
    fn strong_approval_history_scores_high() {
        let ctx = context(vec![
            precedent("A", true, 1),
            precedent("B", true, 2),
            precedent("C", true, 2),
        ]);
        let score = calculate_precedent_score(&ctx);
        // 60 approval + 15 type bonus + 9 recency = 84.
        assert!(score >= 80);
    }

    #[test]
    fn recent_refusals_drag_the_score_down() {
        let approved = context(vec![precedent("A", true, 1), precedent("B", true, 1)]);
        let mixed = context(vec![
            precedent("A", true, 1),
            precedent("B", false, 1),
            precedent("C", false, 1),
        ]);
        assert!(calculate_precedent_score(&mixed) < calculate_precedent_score(&approved));
    }

    #[test]
    fn analysis_surfaces_common_refusal_reasons() {
        let mut refused1 = precedent("R1", false, 1);
        refused1.refusal_reasons = vec!["Overdevelopment".to_string()];
        let mut refused2 = precedent("R2", false, 2);
        refused2.refusal_reasons = vec!["overdevelopment ".to_string(), "Highway safety".to_string()];
        let mut approved = precedent("A1", true, 1);
        approved.conditions = vec!["Materials to match".to_string()];

        let analysis = analyze_precedents(&context(vec![refused1, refused2, approved]));
        assert_eq!(analysis.common_refusal_reasons[0], "overdevelopment");
        assert_eq!(analysis.common_conditions[0], "materials to match");
        assert_eq!(analysis.recent_approvals, 1);
        assert_eq!(analysis.recent_refusals, 2);
    }
}
