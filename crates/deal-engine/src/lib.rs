//! Deterministic engine matching property listings against investor capital
//! mandates.
//!
//! The pipeline is pure and explainable end to end: filtering, multi-factor
//! scoring, conviction assessment, rejection analysis, and recommendation
//! synthesis all produce reason strings alongside every number. The optional
//! planning module estimates the value impact of latent development rights
//! from precedent and constraint data supplied by the caller.

pub mod config;
pub mod listing;
pub mod mandate;
pub mod matching;
pub mod planning;
pub mod review;
pub mod storage;
pub mod telemetry;
