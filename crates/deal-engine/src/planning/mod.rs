//! Planning upside analysis from caller-supplied constraint and precedent
//! data.
//!
//! The engine is deliberately heuristic: precedent history, feasibility
//! constraints, and an uplift estimate combine into a 0-100 planning
//! potential score. Every assessment carries the legal disclaimer verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod feasibility;
pub mod precedent;
pub mod score;
pub mod uplift;

pub use feasibility::{assess_feasibility, FeasibilityFactor, FeasibilityResult};
pub use precedent::{
    analyze_precedents, calculate_precedent_score, relevant_precedents, PrecedentAnalysis,
};
pub use score::{calculate_planning_score, planning_assessment};
pub use uplift::estimate_uplift;

/// Types of planning precedent and proposed development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecedentType {
    ExtensionRear,
    ExtensionSide,
    ExtensionLoft,
    ExtensionBasement,
    ConversionResidential,
    ConversionHmo,
    ConversionFlats,
    ChangeOfUse,
    NewBuild,
    DemolitionRebuild,
    Subdivision,
    PermittedDevelopment,
    Other,
}

impl PrecedentType {
    pub const fn label(self) -> &'static str {
        match self {
            PrecedentType::ExtensionRear => "extension_rear",
            PrecedentType::ExtensionSide => "extension_side",
            PrecedentType::ExtensionLoft => "extension_loft",
            PrecedentType::ExtensionBasement => "extension_basement",
            PrecedentType::ConversionResidential => "conversion_residential",
            PrecedentType::ConversionHmo => "conversion_hmo",
            PrecedentType::ConversionFlats => "conversion_flats",
            PrecedentType::ChangeOfUse => "change_of_use",
            PrecedentType::NewBuild => "new_build",
            PrecedentType::DemolitionRebuild => "demolition_rebuild",
            PrecedentType::Subdivision => "subdivision",
            PrecedentType::PermittedDevelopment => "permitted_development",
            PrecedentType::Other => "other",
        }
    }
}

/// Banded planning potential label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningLabel {
    /// 80-100.
    Exceptional,
    /// 60-79.
    Strong,
    /// 40-59.
    Medium,
    /// 0-39.
    Low,
}

impl PlanningLabel {
    pub const fn label(self) -> &'static str {
        match self {
            PlanningLabel::Exceptional => "exceptional",
            PlanningLabel::Strong => "strong",
            PlanningLabel::Medium => "medium",
            PlanningLabel::Low => "low",
        }
    }
}

/// A historical planning decision near the subject property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningPrecedent {
    /// Planning application reference.
    pub reference: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default = "default_precedent_type")]
    pub precedent_type: PrecedentType,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub approved: bool,
    #[serde(default)]
    pub decision_date: Option<DateTime<Utc>>,
    /// Alternative to `decision_date` for sources that only report age.
    #[serde(default)]
    pub recency_years: Option<f64>,
    /// Distance from the subject property.
    #[serde(default)]
    pub distance_meters: Option<f64>,
    /// How similar the works are to the proposed development, 0-1.
    #[serde(default = "default_similarity")]
    pub similarity_score: f64,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub refusal_reasons: Vec<String>,
}

fn default_precedent_type() -> PrecedentType {
    PrecedentType::Other
}

fn default_true() -> bool {
    true
}

fn default_similarity() -> f64 {
    0.5
}

impl PlanningPrecedent {
    /// Years since the decision, or `None` when undated. A dated decision
    /// takes precedence over a supplied `recency_years`.
    pub fn age_years(&self) -> Option<f64> {
        self.decision_date
            .map(|date| (Utc::now() - date).num_days() as f64 / 365.25)
            .or(self.recency_years)
    }
}

/// Input describing a property's planning situation. Everything is optional
/// so partial data still yields an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningContext {
    /// e.g. "house_terraced", "flat".
    pub property_type: String,
    /// "freehold" or "leasehold".
    pub tenure: String,
    pub current_sqft: Option<u32>,
    pub plot_size_sqft: Option<u32>,
    pub num_floors: Option<u32>,
    pub year_built: Option<u32>,
    pub conservation_area: bool,
    pub listed_building: bool,
    /// "I", "II*", or "II".
    pub listed_grade: String,
    /// Removes permitted development rights.
    pub article_4_direction: bool,
    pub green_belt: bool,
    /// 1 (low risk) to 3 (high risk).
    pub flood_zone: u8,
    pub tree_preservation_orders: bool,
    pub postcode: String,
    pub local_authority: String,
    pub nearby_precedents: Vec<PlanningPrecedent>,
    pub proposed_type: PrecedentType,
}

impl Default for PrecedentType {
    fn default() -> Self {
        PrecedentType::Other
    }
}

impl Default for PlanningContext {
    fn default() -> Self {
        Self {
            property_type: String::new(),
            tenure: String::new(),
            current_sqft: None,
            plot_size_sqft: None,
            num_floors: None,
            year_built: None,
            conservation_area: false,
            listed_building: false,
            listed_grade: String::new(),
            article_4_direction: false,
            green_belt: false,
            flood_zone: 1,
            tree_preservation_orders: false,
            postcode: String::new(),
            local_authority: String::new(),
            nearby_precedents: Vec::new(),
            proposed_type: PrecedentType::Other,
        }
    }
}

impl PlanningContext {
    /// Permitted development rights survive unless removed by listing,
    /// Article 4, or the property being a flat or maisonette.
    pub fn has_pd_rights(&self) -> bool {
        !self.listed_building
            && !self.article_4_direction
            && !matches!(self.property_type.to_lowercase().as_str(), "flat" | "maisonette")
    }
}

/// Estimated value uplift, expressed as ranges to reflect uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpliftEstimate {
    pub percent_low: f64,
    pub percent_mid: f64,
    pub percent_high: f64,
    pub value_low: u64,
    pub value_mid: u64,
    pub value_high: u64,
    pub confidence: UpliftConfidence,
    pub assumptions: Vec<String>,
    pub caveats: Vec<String>,
}

/// Confidence band for an uplift estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpliftConfidence {
    High,
    Medium,
    Low,
}

impl UpliftConfidence {
    pub const fn label(self) -> &'static str {
        match self {
            UpliftConfidence::High => "high",
            UpliftConfidence::Medium => "medium",
            UpliftConfidence::Low => "low",
        }
    }
}

/// Combined planning potential score with its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanningScore {
    /// 0-100.
    pub score: u8,
    pub label: PlanningLabel,
    pub precedent_score: u8,
    pub feasibility_score: u8,
    pub uplift_score: u8,
}

pub const DISCLAIMER: &str = "This assessment is indicative only and based on heuristics and \
provided precedent data. It does not constitute professional planning \
advice and should not be relied upon for investment decisions. \
Always consult a qualified planning consultant before making any \
planning applications or purchase decisions based on planning potential.";

/// Complete planning potential assessment, the engine's main output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningAssessment {
    pub planning_score: PlanningScore,
    pub uplift_estimate: UpliftEstimate,
    pub rationale: Vec<String>,
    pub positive_factors: Vec<String>,
    pub negative_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub assessed_at: DateTime<Utc>,
    pub disclaimer: &'static str,
}

impl PlanningAssessment {
    pub fn summary(&self) -> String {
        let score = &self.planning_score;
        let uplift = &self.uplift_estimate;

        let mut parts = vec![
            format!(
                "Planning Potential: {} ({}/100)",
                score.label.label().to_uppercase(),
                score.score
            ),
            format!(
                "Estimated Uplift: {:.0}%-{:.0}%",
                uplift.percent_low, uplift.percent_high
            ),
        ];

        if !self.positive_factors.is_empty() {
            let top: Vec<&str> = self
                .positive_factors
                .iter()
                .take(2)
                .map(String::as_str)
                .collect();
            parts.push(format!("Key Positives: {}", top.join(", ")));
        }
        if !self.negative_factors.is_empty() {
            let top: Vec<&str> = self
                .negative_factors
                .iter()
                .take(2)
                .map(String::as_str)
                .collect();
            parts.push(format!("Key Concerns: {}", top.join(", ")));
        }

        parts.join(" | ")
    }
}

/// Errors from the planning engine.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("current value must be positive for uplift estimation")]
    MissingCurrentValue,
}
