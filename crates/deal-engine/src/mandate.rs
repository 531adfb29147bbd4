use serde::{Deserialize, Serialize};

/// Asset classes a mandate may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Residential,
    Commercial,
    MixedUse,
    Industrial,
    Retail,
    Office,
    Hospitality,
    StudentHousing,
    SeniorLiving,
    #[serde(rename = "build_to_rent")]
    BuildToRent,
    Hmo,
}

impl AssetClass {
    pub const fn label(self) -> &'static str {
        match self {
            AssetClass::Residential => "residential",
            AssetClass::Commercial => "commercial",
            AssetClass::MixedUse => "mixed_use",
            AssetClass::Industrial => "industrial",
            AssetClass::Retail => "retail",
            AssetClass::Office => "office",
            AssetClass::Hospitality => "hospitality",
            AssetClass::StudentHousing => "student_housing",
            AssetClass::SeniorLiving => "senior_living",
            AssetClass::BuildToRent => "build_to_rent",
            AssetClass::Hmo => "hmo",
        }
    }
}

/// Classification of the investing entity behind a mandate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorType {
    Institutional,
    FamilyOffice,
    PrivateEquity,
    Reit,
    Hnwi,
    PensionFund,
    Insurance,
    SovereignWealth,
    Other,
}

/// Risk appetite, ordered from most conservative to most speculative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    Core,
    CorePlus,
    ValueAdd,
    Opportunistic,
}

impl RiskProfile {
    /// Position on the ordered risk scale, used for alignment scoring.
    pub const fn ordinal(self) -> i8 {
        match self {
            RiskProfile::Core => 0,
            RiskProfile::CorePlus => 1,
            RiskProfile::ValueAdd => 2,
            RiskProfile::Opportunistic => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskProfile::Core => "core",
            RiskProfile::CorePlus => "core_plus",
            RiskProfile::ValueAdd => "value_add",
            RiskProfile::Opportunistic => "opportunistic",
        }
    }
}

/// Geographic targeting: include lists plus explicit exclusions.
///
/// Postcode entries are outward-code prefixes ("SW1", "EC"); matching is
/// case-insensitive prefix matching against the listing's outward code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographicCriteria {
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub postcodes: Vec<String>,
    #[serde(default)]
    pub exclude_regions: Vec<String>,
    #[serde(default)]
    pub exclude_postcodes: Vec<String>,
}

impl GeographicCriteria {
    pub fn is_unrestricted(&self) -> bool {
        self.regions.is_empty() && self.postcodes.is_empty()
    }
}

/// Financial parameters. `None` means the bound is not configured, which is
/// distinct from a zero bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialCriteria {
    #[serde(default)]
    pub min_deal_size: Option<u64>,
    #[serde(default)]
    pub max_deal_size: Option<u64>,
    #[serde(default)]
    pub total_allocation: Option<u64>,
    #[serde(default)]
    pub min_yield: Option<f64>,
    #[serde(default)]
    pub target_yield: Option<f64>,
    #[serde(default)]
    pub min_irr: Option<f64>,
    #[serde(default)]
    pub target_irr: Option<f64>,
    #[serde(default)]
    pub max_ltv: Option<f64>,
    #[serde(default)]
    pub preferred_ltv: Option<f64>,
    #[serde(default)]
    pub max_price_psf: Option<f64>,
}

/// Property-level requirements and acceptance flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyCriteria {
    #[serde(default)]
    pub min_units: Option<u32>,
    #[serde(default)]
    pub max_units: Option<u32>,
    #[serde(default)]
    pub min_sqft: Option<u32>,
    #[serde(default)]
    pub max_sqft: Option<u32>,
    #[serde(default)]
    pub min_bedrooms: Option<u32>,
    #[serde(default)]
    pub max_bedrooms: Option<u32>,
    #[serde(default = "default_true")]
    pub accept_refurbishment: bool,
    #[serde(default)]
    pub accept_development: bool,
    #[serde(default = "default_true")]
    pub accept_turnkey: bool,
    #[serde(default)]
    pub freehold_only: bool,
    #[serde(default)]
    pub min_lease_years: Option<u32>,
    #[serde(default)]
    pub preferred_property_types: Vec<String>,
}

impl Default for PropertyCriteria {
    fn default() -> Self {
        Self {
            min_units: None,
            max_units: None,
            min_sqft: None,
            max_sqft: None,
            min_bedrooms: None,
            max_bedrooms: None,
            accept_refurbishment: true,
            accept_development: false,
            accept_turnkey: true,
            freehold_only: false,
            min_lease_years: None,
            preferred_property_types: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Configurable thresholds driving the recommendation decision table and
/// conviction banding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealCriteria {
    pub min_bmv_percent: Option<f64>,
    pub min_overall_score: f64,
    pub pursue_score_threshold: f64,
    pub consider_score_threshold: f64,
    pub max_days_on_market: Option<u32>,
    pub prefer_fresh_listings: bool,
    pub fresh_listing_days: u32,
    pub high_conviction_threshold: f64,
    pub medium_conviction_threshold: f64,
    pub low_conviction_threshold: f64,
}

impl Default for DealCriteria {
    fn default() -> Self {
        Self {
            min_bmv_percent: None,
            min_overall_score: 40.0,
            pursue_score_threshold: 75.0,
            consider_score_threshold: 60.0,
            max_days_on_market: None,
            prefer_fresh_listings: true,
            fresh_listing_days: 14,
            high_conviction_threshold: 0.80,
            medium_conviction_threshold: 0.60,
            low_conviction_threshold: 0.40,
        }
    }
}

/// Per-mandate weighting of the ten scoring factors.
///
/// Weights nominally sum to 1.0. The scoring engine divides by the weight
/// actually applied, so an unnormalized set still produces a 0-100 score;
/// [`ScoringWeights::normalize`] is available for callers that want canonical
/// proportions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub location_region: f64,
    pub location_postcode: f64,
    pub price_range: f64,
    pub price_psf: f64,
    pub yield_minimum: f64,
    pub yield_target: f64,
    pub property_size: f64,
    pub property_condition: f64,
    pub property_tenure: f64,
    pub risk_profile: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            location_region: 0.15,
            location_postcode: 0.10,
            price_range: 0.20,
            price_psf: 0.05,
            yield_minimum: 0.15,
            yield_target: 0.10,
            property_size: 0.05,
            property_condition: 0.10,
            property_tenure: 0.05,
            risk_profile: 0.05,
        }
    }
}

impl ScoringWeights {
    pub fn total_weight(&self) -> f64 {
        self.location_region
            + self.location_postcode
            + self.price_range
            + self.price_psf
            + self.yield_minimum
            + self.yield_target
            + self.property_size
            + self.property_condition
            + self.property_tenure
            + self.risk_profile
    }

    /// Returns a copy rescaled so the weights sum to 1.0. Relative
    /// proportions are preserved; an all-zero set is returned unchanged.
    pub fn normalize(&self) -> ScoringWeights {
        let total = self.total_weight();
        if total == 0.0 {
            return self.clone();
        }
        let factor = 1.0 / total;
        ScoringWeights {
            location_region: self.location_region * factor,
            location_postcode: self.location_postcode * factor,
            price_range: self.price_range * factor,
            price_psf: self.price_psf * factor,
            yield_minimum: self.yield_minimum * factor,
            yield_target: self.yield_target * factor,
            property_size: self.property_size * factor,
            property_condition: self.property_condition * factor,
            property_tenure: self.property_tenure * factor,
            risk_profile: self.risk_profile * factor,
        }
    }
}

/// An investor's standing criteria for acceptable deals.
///
/// Mandates are created and persisted by the storage collaborator; the
/// evaluation pipeline treats them as immutable inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mandate {
    pub mandate_id: String,
    pub investor_name: String,
    pub investor_type: InvestorType,
    /// Empty set means all asset classes are accepted.
    #[serde(default)]
    pub asset_classes: Vec<AssetClass>,
    #[serde(default = "default_risk_profile")]
    pub risk_profile: RiskProfile,
    #[serde(default)]
    pub geographic: GeographicCriteria,
    #[serde(default)]
    pub financial: FinancialCriteria,
    #[serde(default)]
    pub property: PropertyCriteria,
    #[serde(default)]
    pub deal_criteria: DealCriteria,
    #[serde(default)]
    pub scoring_weights: ScoringWeights,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// 1 = highest priority.
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub notes: String,
}

fn default_risk_profile() -> RiskProfile {
    RiskProfile::CorePlus
}

fn default_priority() -> u8 {
    1
}

impl Mandate {
    pub fn accepts_asset_class(&self, asset_class: AssetClass) -> bool {
        self.asset_classes.is_empty() || self.asset_classes.contains(&asset_class)
    }

    /// Exclusions win over inclusions; with no inclusions configured every
    /// non-excluded location is accepted, otherwise a region or postcode
    /// match suffices.
    pub fn accepts_location(&self, region: &str, postcode_area: &str) -> bool {
        let geo = &self.geographic;

        if geo.exclude_regions.iter().any(|r| r == region) {
            return false;
        }
        if prefix_match(postcode_area, &geo.exclude_postcodes) {
            return false;
        }

        if geo.is_unrestricted() {
            return true;
        }

        let region_match = geo.regions.is_empty() || geo.regions.iter().any(|r| r == region);
        let postcode_match = geo.postcodes.is_empty() || prefix_match(postcode_area, &geo.postcodes);

        region_match || postcode_match
    }

    pub fn accepts_price(&self, price: u64) -> bool {
        if let Some(min) = self.financial.min_deal_size {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.financial.max_deal_size {
            if price > max {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive prefix match of a postcode outward code against a list
/// of mandate prefixes.
pub(crate) fn prefix_match(postcode_area: &str, prefixes: &[String]) -> bool {
    let area = postcode_area.to_ascii_uppercase();
    prefixes
        .iter()
        .any(|prefix| area.starts_with(&prefix.to_ascii_uppercase()))
}
