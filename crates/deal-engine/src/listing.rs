use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mandate::AssetClass;

/// Specific property type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    HouseDetached,
    HouseSemi,
    HouseTerraced,
    Flat,
    Maisonette,
    Bungalow,
    Land,
    CommercialUnit,
    OfficeSpace,
    RetailUnit,
    Warehouse,
    MixedUseBuilding,
    DevelopmentSite,
    Hmo,
    BlockOfFlats,
    Other,
}

/// Property tenure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenure {
    Freehold,
    Leasehold,
    ShareOfFreehold,
    Commonhold,
    Unknown,
}

impl Tenure {
    pub const fn label(self) -> &'static str {
        match self {
            Tenure::Freehold => "freehold",
            Tenure::Leasehold => "leasehold",
            Tenure::ShareOfFreehold => "share_of_freehold",
            Tenure::Commonhold => "commonhold",
            Tenure::Unknown => "unknown",
        }
    }
}

/// Lifecycle status of the listing at its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    UnderOffer,
    SoldStc,
    Sold,
    Withdrawn,
}

/// Assessed condition of the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Turnkey,
    LightRefurb,
    HeavyRefurb,
    Development,
    Unknown,
}

impl Condition {
    pub const fn label(self) -> &'static str {
        match self {
            Condition::Turnkey => "turnkey",
            Condition::LightRefurb => "light refurb",
            Condition::HeavyRefurb => "heavy refurb",
            Condition::Development => "development",
            Condition::Unknown => "unknown",
        }
    }
}

/// Property address. The outward code derived from the postcode is the unit
/// of geographic matching throughout the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "UK".to_string()
}

impl Address {
    /// Outward code of the postcode, uppercased ("SW1A 1AA" -> "SW1A").
    pub fn postcode_area(&self) -> String {
        self.postcode
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_uppercase()
    }
}

/// Financial details. Optional fields mean the data was not published, not
/// that the value is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialDetails {
    /// Asking price in GBP.
    pub asking_price: u64,
    #[serde(default)]
    pub price_qualifier: String,
    /// Annual rent in GBP, when tenanted or advertised.
    #[serde(default)]
    pub current_rent: Option<u64>,
    #[serde(default)]
    pub gross_yield: Option<f64>,
    #[serde(default)]
    pub price_per_sqft: Option<f64>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub ground_rent: Option<u64>,
    #[serde(default)]
    pub service_charge: Option<u64>,
    #[serde(default)]
    pub lease_years_remaining: Option<u32>,
}

impl Default for FinancialDetails {
    fn default() -> Self {
        Self {
            asking_price: 0,
            price_qualifier: String::new(),
            current_rent: None,
            gross_yield: None,
            price_per_sqft: None,
            price_per_unit: None,
            ground_rent: None,
            service_charge: None,
            lease_years_remaining: None,
        }
    }
}

/// Physical property details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDetails {
    pub property_type: PropertyType,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub reception_rooms: Option<u32>,
    pub total_sqft: Option<u32>,
    pub unit_count: u32,
    pub condition: Condition,
    pub epc_rating: String,
    pub parking: bool,
    pub garden: bool,
    pub has_tenants: bool,
}

impl Default for PropertyDetails {
    fn default() -> Self {
        Self {
            property_type: PropertyType::Other,
            bedrooms: None,
            bathrooms: None,
            reception_rooms: None,
            total_sqft: None,
            unit_count: 1,
            condition: Condition::Unknown,
            epc_rating: String::new(),
            parking: false,
            garden: false,
            has_tenants: false,
        }
    }
}

/// A candidate property for sale, matched against investor mandates.
/// Immutable for the duration of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: String,
    /// Originating feed, e.g. "rightmove", "zoopla", "manual".
    pub source: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default = "default_asset_class")]
    pub asset_class: AssetClass,
    #[serde(default = "default_tenure")]
    pub tenure: Tenure,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub financial: FinancialDetails,
    #[serde(default)]
    pub property_details: PropertyDetails,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub agent_phone: String,
    #[serde(default)]
    pub listed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scraped_at: Option<DateTime<Utc>>,
    #[serde(default = "default_status")]
    pub status: ListingStatus,
}

fn default_asset_class() -> AssetClass {
    AssetClass::Residential
}

fn default_tenure() -> Tenure {
    Tenure::Unknown
}

fn default_status() -> ListingStatus {
    ListingStatus::Active
}

impl Listing {
    pub fn postcode_area(&self) -> String {
        self.address.postcode_area()
    }

    pub fn region(&self) -> &str {
        &self.address.region
    }

    pub fn asking_price(&self) -> u64 {
        self.financial.asking_price
    }

    /// Published gross yield, or one derived from current rent and asking
    /// price when the feed omitted it.
    pub fn gross_yield(&self) -> Option<f64> {
        if let Some(published) = self.financial.gross_yield {
            return Some(published);
        }
        match (self.financial.current_rent, self.financial.asking_price) {
            (Some(rent), price) if rent > 0 && price > 0 => {
                Some(rent as f64 / price as f64 * 100.0)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postcode_area_is_outward_code() {
        let address = Address {
            postcode: "sw1a 1aa".to_string(),
            ..Address::default()
        };
        assert_eq!(address.postcode_area(), "SW1A");

        let empty = Address::default();
        assert_eq!(empty.postcode_area(), "");
    }

    #[test]
    fn gross_yield_prefers_published_value() {
        let mut listing = sample();
        listing.financial.gross_yield = Some(6.2);
        listing.financial.current_rent = Some(10_000);
        assert_eq!(listing.gross_yield(), Some(6.2));
    }

    #[test]
    fn gross_yield_derived_from_rent_when_missing() {
        let mut listing = sample();
        listing.financial.gross_yield = None;
        listing.financial.asking_price = 500_000;
        listing.financial.current_rent = Some(30_000);
        let derived = listing.gross_yield().expect("derived yield");
        assert!((derived - 6.0).abs() < 1e-9);
    }

    #[test]
    fn gross_yield_absent_without_rent_data() {
        let mut listing = sample();
        listing.financial.gross_yield = None;
        listing.financial.current_rent = None;
        assert_eq!(listing.gross_yield(), None);
    }

    #[test]
    fn listing_deserializes_with_snake_case_enums() {
        let json = r#"{
            "listing_id": "L-1",
            "source": "manual",
            "asset_class": "build_to_rent",
            "tenure": "share_of_freehold",
            "financial": { "asking_price": 1200000 },
            "property_details": { "condition": "light_refurb" }
        }"#;
        let listing: Listing = serde_json::from_str(json).expect("deserializes");
        assert_eq!(listing.asset_class, AssetClass::BuildToRent);
        assert_eq!(listing.tenure, Tenure::ShareOfFreehold);
        assert_eq!(listing.property_details.condition, Condition::LightRefurb);
        assert_eq!(listing.status, ListingStatus::Active);
    }

    fn sample() -> Listing {
        Listing {
            listing_id: "L-100".to_string(),
            source: "manual".to_string(),
            source_url: String::new(),
            asset_class: AssetClass::Residential,
            tenure: Tenure::Freehold,
            address: Address::default(),
            financial: FinancialDetails {
                asking_price: 750_000,
                ..FinancialDetails::default()
            },
            property_details: PropertyDetails::default(),
            title: "Sample".to_string(),
            description: String::new(),
            images: Vec::new(),
            agent_name: String::new(),
            agent_phone: String::new(),
            listed_date: None,
            scraped_at: None,
            status: ListingStatus::Active,
        }
    }
}
