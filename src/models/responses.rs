use serde::{Deserialize, Serialize};
use crate::models::domain::{GradedBusiness, LatLng};

/// Response for the analyze endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub run_id: String,
    pub base_location: LatLng,
    pub fetched: usize,
    pub unique: usize,
    pub skipped: usize,
    pub discarded: usize,
    pub cancelled: bool,
    pub businesses: Vec<GradedBusiness>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
