use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::collaborators::{
    Geocoder, PlaceDetailsSource, PlacesError, PlacesSearch, ReachabilityProber, ReportSink,
};
use crate::core::dedup::merge_listings;
use crate::core::export::ExportColumn;
use crate::core::pipeline::{PipelineOptions, QualificationPipeline, QualificationReport};
use crate::core::reviews::ReviewCriteria;
use crate::core::scoring::Grader;
use crate::models::{GradingWeights, LatLng};

/// Hard cap on listings fetched per analysis
pub const MAX_RESULTS_CAP: usize = 50;

/// Errors that stop an analysis before or instead of grading
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("At least one CSV column must be selected")]
    NoColumns,

    #[error("Geocoding failed for location '{location}': {source}")]
    Geocoding {
        location: String,
        #[source]
        source: PlacesError,
    },
}

/// Everything one analysis run needs from the caller
///
/// Built fresh for every run; nothing is shared between runs.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub location: String,
    pub industry: String,
    pub max_results: usize,
    pub grade_threshold: f64,
    pub weights: GradingWeights,
    pub review_criteria: ReviewCriteria,
    pub columns: Vec<ExportColumn>,
    pub radius_m: u32,
    pub max_distance_km: f64,
    pub politeness_delay: Duration,
}

impl AnalysisRequest {
    pub fn new(location: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            industry: industry.into(),
            max_results: 10,
            grade_threshold: 50.0,
            weights: GradingWeights::default(),
            review_criteria: ReviewCriteria::default(),
            columns: ExportColumn::ALL.to_vec(),
            radius_m: 50_000,
            max_distance_km: 50.0,
            politeness_delay: Duration::from_secs(1),
        }
    }

    /// Reject configurations the pipeline must never run with
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.location.trim().is_empty() {
            return Err(AnalysisError::MissingInput("location"));
        }
        if self.industry.trim().is_empty() {
            return Err(AnalysisError::MissingInput("industry"));
        }
        if self.columns.is_empty() {
            return Err(AnalysisError::NoColumns);
        }
        if self.max_results == 0 || self.max_results > MAX_RESULTS_CAP {
            return Err(AnalysisError::InvalidInput(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_RESULTS_CAP, self.max_results
            )));
        }
        if let Some((name, weight)) = self.weights.first_invalid() {
            return Err(AnalysisError::InvalidInput(format!(
                "weight '{}' must be a non-negative number, got {}",
                name, weight
            )));
        }
        self.review_criteria.validate().map_err(AnalysisError::InvalidInput)?;
        if !(0.0..=100.0).contains(&self.grade_threshold) {
            return Err(AnalysisError::InvalidInput(format!(
                "grade_threshold must be between 0 and 100, got {}",
                self.grade_threshold
            )));
        }
        Ok(())
    }
}

/// Upstream collaborators for a run
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub geocoder: &'a dyn Geocoder,
    pub search: &'a dyn PlacesSearch,
    pub details: &'a dyn PlaceDetailsSource,
    pub prober: &'a dyn ReachabilityProber,
}

/// Outcome of a completed analysis
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub base_location: LatLng,
    /// Listings returned by the search
    pub fetched: usize,
    /// Listings left after deduplication
    pub unique: usize,
    pub report: QualificationReport,
}

/// Geocode, search, deduplicate and qualify businesses for one request
///
/// Fails only on invalid configuration or when the location cannot be
/// geocoded. A failed search is treated as zero results, so callers can tell
/// "nothing qualified" apart from "could not run".
pub async fn run_analysis(
    collaborators: Collaborators<'_>,
    request: &AnalysisRequest,
    sink: &mut dyn ReportSink,
    cancel: &CancellationToken,
) -> Result<AnalysisReport, AnalysisError> {
    request.validate()?;

    let base_location = collaborators
        .geocoder
        .resolve(&request.location)
        .await
        .map_err(|source| AnalysisError::Geocoding {
            location: request.location.clone(),
            source,
        })?;

    tracing::info!(
        "Searching for '{}' in '{}' within {} km for up to {} business(es)...",
        request.industry,
        request.location,
        request.radius_m as f64 / 1000.0,
        request.max_results
    );

    let listings = match collaborators
        .search
        .search(&request.industry, base_location, request.radius_m, request.max_results)
        .await
    {
        Ok(listings) => listings,
        Err(e) => {
            tracing::warn!("Places search failed, continuing with no listings: {}", e);
            Vec::new()
        }
    };

    let fetched = listings.len();
    let unique_listings = merge_listings(listings);
    let unique = unique_listings.len();
    tracing::info!("Fetched {} listing(s), {} unique after deduplication", fetched, unique);

    let grader = Grader::new(
        vec![request.industry.to_lowercase()],
        request.max_distance_km,
        base_location,
    )
    .with_weights(request.weights)
    .with_review_criteria(request.review_criteria);

    let options = PipelineOptions {
        grade_threshold: request.grade_threshold,
        politeness_delay: request.politeness_delay,
    };

    let pipeline = QualificationPipeline::new(
        collaborators.details,
        collaborators.prober,
        grader,
        options,
    );
    let report = pipeline.run(&unique_listings, sink, cancel).await;

    Ok(AnalysisReport {
        base_location,
        fetched,
        unique,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_is_valid() {
        assert!(AnalysisRequest::new("Sydney, Australia", "painter").validate().is_ok());
    }

    #[test]
    fn test_blank_inputs_rejected() {
        let request = AnalysisRequest::new("  ", "painter");
        assert!(matches!(request.validate(), Err(AnalysisError::MissingInput("location"))));

        let request = AnalysisRequest::new("Sydney", "");
        assert!(matches!(request.validate(), Err(AnalysisError::MissingInput("industry"))));
    }

    #[test]
    fn test_no_columns_rejected() {
        let mut request = AnalysisRequest::new("Sydney", "painter");
        request.columns.clear();
        assert!(matches!(request.validate(), Err(AnalysisError::NoColumns)));
    }

    #[test]
    fn test_max_results_bounds() {
        let mut request = AnalysisRequest::new("Sydney", "painter");
        request.max_results = 0;
        assert!(matches!(request.validate(), Err(AnalysisError::InvalidInput(_))));

        request.max_results = 51;
        assert!(matches!(request.validate(), Err(AnalysisError::InvalidInput(_))));

        request.max_results = 50;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_or_nan_weights_rejected() {
        let mut request = AnalysisRequest::new("Sydney", "painter");
        request.weights.rating = -100.0;
        assert!(matches!(request.validate(), Err(AnalysisError::InvalidInput(msg)) if msg.contains("rating")));

        request.weights.rating = f64::NAN;
        assert!(matches!(request.validate(), Err(AnalysisError::InvalidInput(_))));

        request.weights.rating = 0.0;
        assert!(request.validate().is_ok());
    }
}
