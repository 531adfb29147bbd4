//! End-to-end coverage of the matching pipeline: filtering, scoring,
//! conviction, rejection, and recommendation synthesis working together.

use deal_engine::listing::{
    Address, Condition, FinancialDetails, Listing, ListingStatus, PropertyDetails, Tenure,
};
use deal_engine::mandate::{
    AssetClass, DealCriteria, FinancialCriteria, GeographicCriteria, InvestorType, Mandate,
    PropertyCriteria, RiskProfile, ScoringWeights,
};
use deal_engine::matching::{
    assess_conviction, evaluate_rejection, filter_listing, generate_recommendation,
    score_listing, ConvictionLevel, MatchGrade, RecommendationAction, RejectionSeverity,
};

fn london_mandate() -> Mandate {
    Mandate {
        mandate_id: "MAND-LON-01".to_string(),
        investor_name: "Sterling Capital Partners".to_string(),
        investor_type: InvestorType::Institutional,
        asset_classes: vec![AssetClass::Residential],
        risk_profile: RiskProfile::CorePlus,
        geographic: GeographicCriteria {
            regions: vec!["Greater London".to_string()],
            postcodes: vec!["SW".to_string(), "SE".to_string()],
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

fn sw_listing(price: u64, gross_yield: Option<f64>) -> Listing {
    Listing {
        listing_id: "L-SW-1".to_string(),
        source: "manual".to_string(),
        source_url: String::new(),
        asset_class: AssetClass::Residential,
        tenure: Tenure::Freehold,
        address: Address {
            region: "Greater London".to_string(),
            postcode: "SW11 4AB".to_string(),
            ..Address::default()
        },
        financial: FinancialDetails {
            asking_price: price,
            gross_yield,
            ..FinancialDetails::default()
        },
        property_details: PropertyDetails {
            condition: Condition::Turnkey,
            has_tenants: true,
            ..PropertyDetails::default()
        },
        title: "Freehold residential block, Battersea".to_string(),
        description: String::new(),
        images: Vec::new(),
        agent_name: String::new(),
        agent_phone: String::new(),
        listed_date: None,
        scraped_at: None,
        status: ListingStatus::Active,
    }
}

fn variants() -> Vec<Listing> {
    let mut listings = vec![
        sw_listing(2_750_000, Some(8.5)),
        sw_listing(8_500_000, Some(6.0)),
        sw_listing(400_000, None),
        sw_listing(2_000_000, Some(3.0)),
    ];
    let mut wrong_class = sw_listing(2_000_000, Some(6.0));
    wrong_class.asset_class = AssetClass::Retail;
    listings.push(wrong_class);
    let mut off_patch = sw_listing(2_000_000, Some(6.0));
    off_patch.address.region = "North West".to_string();
    off_patch.address.postcode = "M1 1AA".to_string();
    listings.push(off_patch);
    listings
}

#[test]
fn fail_fast_filtering_agrees_with_exhaustive_filtering() {
    let mandate = london_mandate();
    for listing in variants() {
        let fast = filter_listing(&listing, &mandate, None, true);
        let full = filter_listing(&listing, &mandate, None, false);
        assert_eq!(
            fast.passed,
            full.failed_rules.is_empty(),
            "disagreement on {}",
            listing.listing_id
        );
        assert_eq!(fast.passed, full.passed);
    }
}

#[test]
fn scores_stay_in_bounds_and_grades_step_at_breakpoints() {
    let mandate = london_mandate();
    let mut graded: Vec<(f64, MatchGrade)> = Vec::new();

    for listing in variants() {
        let result = score_listing(&listing, &mandate, None);
        assert!(
            (0.0..=100.0).contains(&result.total_score),
            "score out of range: {}",
            result.total_score
        );
        assert_eq!(result.match_grade, MatchGrade::from_score(result.total_score));
        graded.push((result.total_score, result.match_grade));
    }

    // MatchGrade orders A before F, so a higher score must never produce a
    // grade that sorts after a lower score's grade.
    graded.sort_by(|a, b| a.0.total_cmp(&b.0));
    for pair in graded.windows(2) {
        assert!(pair[1].1 <= pair[0].1);
    }

    assert_eq!(MatchGrade::from_score(90.0), MatchGrade::A);
    assert_eq!(MatchGrade::from_score(89.9), MatchGrade::B);
    assert_eq!(MatchGrade::from_score(75.0), MatchGrade::B);
    assert_eq!(MatchGrade::from_score(60.0), MatchGrade::C);
    assert_eq!(MatchGrade::from_score(40.0), MatchGrade::D);
    assert_eq!(MatchGrade::from_score(39.9), MatchGrade::F);
}

#[test]
fn failing_hard_filters_forces_conviction_to_none() {
    let mandate = london_mandate();
    let mut listing = sw_listing(2_750_000, Some(8.5));
    listing.asset_class = AssetClass::Retail;

    let scoring = score_listing(&listing, &mandate, None);
    assert!(!scoring.passes_hard_filters);

    let conviction = assess_conviction(&listing, &mandate, &scoring);
    assert_eq!(conviction.level, ConvictionLevel::None);
}

#[test]
fn overpriced_listing_gets_hard_rejection_and_pass() {
    let mandate = london_mandate();
    let listing = sw_listing(8_500_000, Some(6.0));

    let rejection = evaluate_rejection(&listing, &mandate, None, false);
    assert!(rejection.rejected);
    let price_reason = rejection
        .reasons
        .iter()
        .find(|r| r.code == "PRICE_EXCEEDS_MAX")
        .expect("price rejection present");
    assert_eq!(price_reason.severity, RejectionSeverity::Hard);
    assert!(price_reason.explanation.contains("70%"));

    let recommendation = generate_recommendation(&listing, &mandate, None);
    assert_eq!(recommendation.action, RecommendationAction::Pass);
}

#[test]
fn high_yield_listing_scores_well_on_both_yield_factors() {
    let mandate = london_mandate();
    let listing = sw_listing(2_750_000, Some(8.5));

    let result = score_listing(&listing, &mandate, None);
    let yield_min = result
        .factors
        .iter()
        .find(|f| f.name == "yield_minimum")
        .expect("minimum yield factor");
    let yield_target = result
        .factors
        .iter()
        .find(|f| f.name == "yield_target")
        .expect("target yield factor");

    assert!(yield_min.score >= 0.9);
    assert!(yield_target.score >= 0.9);
    assert!(matches!(result.match_grade, MatchGrade::A | MatchGrade::B));
}

#[test]
fn recommendation_is_deterministic_for_identical_inputs() {
    let mandate = london_mandate();
    for listing in variants() {
        let first = generate_recommendation(&listing, &mandate, None);
        let second = generate_recommendation(&listing, &mandate, None);
        assert_eq!(first.action, second.action);
        assert_eq!(first.priority_rank, second.priority_rank);
        assert_eq!(first.headline, second.headline);
        assert_eq!(first.rationale, second.rationale);
    }
}

#[test]
fn strong_listing_travels_the_whole_pipeline_to_pursue() {
    let mandate = london_mandate();
    let listing = sw_listing(2_750_000, Some(8.5));

    assert!(filter_listing(&listing, &mandate, None, false).passed);
    let scoring = score_listing(&listing, &mandate, None);
    assert!(scoring.total_score >= mandate.deal_criteria.pursue_score_threshold);

    let conviction = assess_conviction(&listing, &mandate, &scoring);
    assert_eq!(conviction.level, ConvictionLevel::High);

    let rejection = evaluate_rejection(&listing, &mandate, None, false);
    assert!(!rejection.rejected);

    let recommendation = generate_recommendation(&listing, &mandate, None);
    assert_eq!(recommendation.action, RecommendationAction::Pursue);
    assert!(recommendation.headline.starts_with("STRONG MATCH"));
    assert!(!recommendation.next_steps.is_empty());
}
