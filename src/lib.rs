//! Lead Qualifier - business qualification service
//!
//! Finds businesses of a given industry around a location, merges duplicate
//! listings, enriches each one with place details, and grades it on a 0-100
//! scale. Businesses at or above the grade threshold are returned ranked by
//! score, as JSON or CSV.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    haversine_distance, merge_listings, run_analysis, similarity_ratio, AnalysisError, AnalysisReport,
    AnalysisRequest, Collaborators, ExportColumn, Grader, QualificationPipeline, QualificationReport,
    ReportSink, ReviewCriteria,
};
pub use models::{BusinessDetails, GradedBusiness, GradingWeights, LatLng, RawListing, ReviewRecord};
