use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::GradingWeights;

/// Request to analyze businesses around a location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1))]
    pub location: String,
    #[validate(length(min = 1))]
    pub industry: String,
    #[validate(range(min = 1, max = 50))]
    #[serde(alias = "max_results", rename = "maxResults")]
    pub max_results: Option<u16>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(alias = "grade_threshold", rename = "gradeThreshold")]
    pub grade_threshold: Option<f64>,
    #[serde(default)]
    pub weights: Option<GradingWeights>,
    /// CSV column labels; all columns when absent
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}
