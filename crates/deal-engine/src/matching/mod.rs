//! The deal evaluation pipeline: filtering, scoring, conviction, rejection,
//! and recommendation synthesis. Every stage is a pure function of
//! `(Listing, Mandate)` and produces reason strings alongside its numbers.

pub mod conviction;
pub mod filtering;
pub mod recommendation;
pub mod rejection;
pub mod scoring;

pub use conviction::{
    assess_conviction, rank_by_conviction, ConvictionAssessment, ConvictionFactor, ConvictionLevel,
};
pub use filtering::{
    filter_listing, filter_listings, filter_listings_detailed, filter_summary, FilterResult,
    FilterSummary,
};
pub use recommendation::{
    actionable_recommendations, generate_recommendation, generate_recommendations, generate_report,
    DealRecommendation, RecommendationAction, RecommendationReport,
};
pub use rejection::{
    evaluate_rejection, rejection_summary, RejectionCategory, RejectionReason, RejectionResult,
    RejectionSeverity, RejectionSummary,
};
pub use scoring::{score_listing, score_listings, MatchGrade, ScoreFactor, ScoringResult};
