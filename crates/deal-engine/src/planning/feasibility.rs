//! Feasibility assessment from planning constraints.
//!
//! Starts from a neutral base of 70 and walks the constraint list, logging
//! each factor as positive, negative, or neutral. Blockers cap the score
//! at 20 regardless of everything else.

use serde::Serialize;

use crate::planning::{PlanningContext, PrecedentType};

/// Factors affecting planning feasibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeasibilityFactor {
    ListedBuilding,
    ConservationArea,
    GreenBelt,
    FloodZone,
    Article4Direction,
    TreePreservationOrders,
    PropertyType,
    Tenure,
    PlotSize,
    PermittedDevelopmentRights,
}

/// Result of the feasibility assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityResult {
    /// 0-100.
    pub score: u8,
    pub positive_factors: Vec<(FeasibilityFactor, String)>,
    pub negative_factors: Vec<(FeasibilityFactor, String)>,
    pub neutral_factors: Vec<(FeasibilityFactor, String)>,
    /// Constraints that make development very unlikely.
    pub blockers: Vec<String>,
    pub recommendations: Vec<String>,
}

struct FactorLog {
    score: i32,
    positive: Vec<(FeasibilityFactor, String)>,
    negative: Vec<(FeasibilityFactor, String)>,
    neutral: Vec<(FeasibilityFactor, String)>,
    blockers: Vec<String>,
    recommendations: Vec<String>,
}

impl FactorLog {
    fn positive(&mut self, factor: FeasibilityFactor, description: &str, delta: i32) {
        self.positive.push((factor, description.to_string()));
        self.score += delta;
    }

    fn negative(&mut self, factor: FeasibilityFactor, description: &str, delta: i32) {
        self.negative.push((factor, description.to_string()));
        self.score += delta;
    }

    fn neutral(&mut self, factor: FeasibilityFactor, description: String, delta: i32) {
        self.neutral.push((factor, description));
        self.score += delta;
    }

    fn blocker(&mut self, description: &str) {
        self.blockers.push(description.to_string());
    }

    fn recommend(&mut self, text: &str) {
        self.recommendations.push(text.to_string());
    }
}

/// Assess planning feasibility from the known constraints.
pub fn assess_feasibility(context: &PlanningContext) -> FeasibilityResult {
    let mut log = FactorLog {
        score: 70,
        positive: Vec::new(),
        negative: Vec::new(),
        neutral: Vec::new(),
        blockers: Vec::new(),
        recommendations: Vec::new(),
    };

    assess_listed_building(context, &mut log);
    assess_conservation_area(context, &mut log);
    assess_green_belt(context, &mut log);
    assess_flood_zone(context, &mut log);
    assess_article_4(context, &mut log);
    assess_tpo(context, &mut log);
    assess_property_type(context, &mut log);
    assess_tenure(context, &mut log);
    assess_plot_size(context, &mut log);
    assess_pd_rights(context, &mut log);

    let mut score = log.score.clamp(0, 100) as u8;
    if !log.blockers.is_empty() {
        score = score.min(20);
    }

    FeasibilityResult {
        score,
        positive_factors: log.positive,
        negative_factors: log.negative,
        neutral_factors: log.neutral,
        blockers: log.blockers,
        recommendations: log.recommendations,
    }
}

fn assess_listed_building(context: &PlanningContext, log: &mut FactorLog) {
    if !context.listed_building {
        log.positive(
            FeasibilityFactor::ListedBuilding,
            "Property is not listed - no heritage constraints",
            5,
        );
        return;
    }

    // Unspecified grade is treated as Grade II.
    match context.listed_grade.to_uppercase().as_str() {
        "I" => {
            log.blocker(
                "Grade I listed building - development extremely unlikely without exceptional circumstances",
            );
            log.negative(
                FeasibilityFactor::ListedBuilding,
                "Grade I listed building - highest level of protection",
                -40,
            );
            log.recommend(
                "Grade I listing: Consult Historic England and specialist heritage architect before any works",
            );
        }
        "II*" => {
            log.negative(
                FeasibilityFactor::ListedBuilding,
                "Grade II* listed building - significant heritage constraints",
                -25,
            );
            log.recommend(
                "Grade II* listing: Any alterations require Listed Building Consent and must preserve character",
            );
        }
        _ => {
            log.negative(
                FeasibilityFactor::ListedBuilding,
                "Grade II listed building - heritage constraints apply",
                -15,
            );
            log.recommend(
                "Grade II listing: Internal works may be possible with sympathetic design. Consult conservation officer.",
            );
        }
    }
}

fn assess_conservation_area(context: &PlanningContext, log: &mut FactorLog) {
    if !context.conservation_area {
        log.positive(
            FeasibilityFactor::ConservationArea,
            "Not in conservation area - standard planning rules apply",
            3,
        );
        return;
    }

    log.negative(
        FeasibilityFactor::ConservationArea,
        "Located in conservation area - design must preserve character",
        -10,
    );
    log.recommend(
        "Conservation area: Extensions should match existing materials and respect local character. Pre-application advice recommended.",
    );
}

fn assess_green_belt(context: &PlanningContext, log: &mut FactorLog) {
    if !context.green_belt {
        return;
    }

    log.negative(
        FeasibilityFactor::GreenBelt,
        "Property in Green Belt - very limited development potential",
        0,
    );

    match context.proposed_type {
        PrecedentType::NewBuild | PrecedentType::DemolitionRebuild | PrecedentType::Subdivision => {
            log.blocker(
                "Green Belt location: New buildings are inappropriate development and very unlikely to be approved",
            );
            log.score -= 40;
        }
        PrecedentType::ExtensionRear
        | PrecedentType::ExtensionSide
        | PrecedentType::ExtensionLoft => {
            log.recommend(
                "Green Belt: Limited extensions may be acceptable if not disproportionate. Check local plan policies.",
            );
            log.score -= 20;
        }
        _ => {
            log.recommend(
                "Green Belt: Development must demonstrate very special circumstances. Professional planning advice essential.",
            );
            log.score -= 25;
        }
    }
}

fn assess_flood_zone(context: &PlanningContext, log: &mut FactorLog) {
    match context.flood_zone {
        1 => log.positive(
            FeasibilityFactor::FloodZone,
            "Flood Zone 1 - lowest flood risk",
            2,
        ),
        2 => {
            log.neutral(
                FeasibilityFactor::FloodZone,
                "Flood Zone 2 - medium flood risk, may need FRA".to_string(),
                -5,
            );
            log.recommend(
                "Flood Zone 2: Flood Risk Assessment likely required for significant development",
            );
        }
        _ => {
            log.negative(
                FeasibilityFactor::FloodZone,
                "Flood Zone 3 - high flood risk, Sequential Test required",
                -15,
            );
            log.recommend(
                "Flood Zone 3: Sequential and Exception Tests required. Flood mitigation measures will be needed.",
            );
        }
    }
}

fn assess_article_4(context: &PlanningContext, log: &mut FactorLog) {
    if !context.article_4_direction {
        return;
    }

    log.negative(
        FeasibilityFactor::Article4Direction,
        "Article 4 Direction in place - permitted development rights removed",
        -10,
    );
    log.recommend(
        "Article 4: Planning permission required for works that would normally be permitted development. Check scope of direction.",
    );
}

fn assess_tpo(context: &PlanningContext, log: &mut FactorLog) {
    if !context.tree_preservation_orders {
        return;
    }

    log.negative(
        FeasibilityFactor::TreePreservationOrders,
        "Tree Preservation Orders on site may constrain development",
        -5,
    );
    log.recommend("TPO: Arboricultural survey recommended. Tree works require council consent.");
}

fn assess_property_type(context: &PlanningContext, log: &mut FactorLog) {
    let prop_type = context.property_type.to_lowercase();
    let proposed = context.proposed_type;

    let is_extension = matches!(
        proposed,
        PrecedentType::ExtensionLoft | PrecedentType::ExtensionRear | PrecedentType::ExtensionSide
    );

    if (prop_type.contains("house") || prop_type.contains("bungalow")) && is_extension {
        log.positive(
            FeasibilityFactor::PropertyType,
            "House/bungalow suitable for extension works",
            5,
        );
        return;
    }

    if prop_type == "flat"
        && (is_extension || proposed == PrecedentType::ExtensionBasement)
    {
        log.negative(
            FeasibilityFactor::PropertyType,
            "Flat - limited scope for physical extension",
            -15,
        );
        log.recommend(
            "Flat: Extensions typically not possible. Consider internal reconfiguration or change of use.",
        );
        return;
    }

    if prop_type.contains("terraced") && proposed == PrecedentType::ExtensionSide {
        log.negative(
            FeasibilityFactor::PropertyType,
            "Terraced property - no scope for side extension",
            -20,
        );
        return;
    }

    log.neutral(
        FeasibilityFactor::PropertyType,
        format!("Property type: {prop_type}"),
        0,
    );
}

fn assess_tenure(context: &PlanningContext, log: &mut FactorLog) {
    match context.tenure.to_lowercase().as_str() {
        "freehold" => log.positive(
            FeasibilityFactor::Tenure,
            "Freehold - full control over development decisions",
            3,
        ),
        "leasehold" => {
            log.negative(
                FeasibilityFactor::Tenure,
                "Leasehold - freeholder consent required for alterations",
                -10,
            );
            log.recommend(
                "Leasehold: Check lease terms for alteration clauses. Freeholder consent will be needed alongside planning.",
            );
        }
        _ => log.neutral(
            FeasibilityFactor::Tenure,
            "Tenure not specified".to_string(),
            0,
        ),
    }
}

fn assess_plot_size(context: &PlanningContext, log: &mut FactorLog) {
    let Some(plot_size) = context.plot_size_sqft else {
        log.neutral(
            FeasibilityFactor::PlotSize,
            "Plot size unknown".to_string(),
            0,
        );
        return;
    };

    if let Some(current_sqft) = context.current_sqft {
        if plot_size > 0 {
            let ratio = current_sqft as f64 / plot_size as f64;
            if ratio < 0.3 {
                log.positive(
                    FeasibilityFactor::PlotSize,
                    &format!(
                        "Large plot relative to building ({:.0}% coverage) - good extension potential",
                        ratio * 100.0
                    ),
                    10,
                );
                return;
            }
            if ratio > 0.6 {
                log.negative(
                    FeasibilityFactor::PlotSize,
                    &format!("High plot coverage ({:.0}%) - limited room for extension", ratio * 100.0),
                    -10,
                );
                log.recommend(
                    "High plot coverage: Loft conversion or basement may be only expansion options",
                );
                return;
            }
        }
    }

    if plot_size > 5000 {
        log.positive(
            FeasibilityFactor::PlotSize,
            &format!("Large plot ({plot_size} sqft) offers development flexibility"),
            5,
        );
    } else if plot_size < 1000 {
        log.neutral(
            FeasibilityFactor::PlotSize,
            format!("Compact plot ({plot_size} sqft)"),
            -3,
        );
    }
}

fn assess_pd_rights(context: &PlanningContext, log: &mut FactorLog) {
    if !context.has_pd_rights() {
        return;
    }

    let pd_suitable = matches!(
        context.proposed_type,
        PrecedentType::ExtensionRear
            | PrecedentType::ExtensionLoft
            | PrecedentType::PermittedDevelopment
    );
    if pd_suitable {
        log.positive(
            FeasibilityFactor::PermittedDevelopmentRights,
            "Permitted development rights may apply - check limits",
            8,
        );
        log.recommend(
            "PD rights: Rear extensions up to 3m (attached) or 4m (detached) may not need planning permission. Verify with council.",
        );
    }
}
