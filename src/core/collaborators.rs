//! Seams between the qualification core and the outside world.
//!
//! The HTTP implementations live in `crate::services`; tests substitute
//! in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BusinessDetails, GradedBusiness, LatLng, RawListing};

/// Errors returned by upstream places/geocoding providers
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Request denied: {0}. Check the API key and that billing is enabled")]
    RequestDenied(String),

    #[error("Upstream returned status {status}: {message}")]
    Status { status: String, message: String },

    #[error("No results for: {0}")]
    NoResults(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Resolves free-text locations to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, location: &str) -> Result<LatLng, PlacesError>;
}

/// Keyword search for places around a center point
#[async_trait]
pub trait PlacesSearch: Send + Sync {
    /// Returns at most `max_results` listings, paginating as needed
    async fn search(
        &self,
        keyword: &str,
        center: LatLng,
        radius_m: u32,
        max_results: usize,
    ) -> Result<Vec<RawListing>, PlacesError>;
}

/// Fetches enriched details for a single place
#[async_trait]
pub trait PlaceDetailsSource: Send + Sync {
    async fn fetch(&self, place_id: &str) -> Result<BusinessDetails, PlacesError>;
}

#[async_trait]
impl<T: PlaceDetailsSource + ?Sized> PlaceDetailsSource for Arc<T> {
    async fn fetch(&self, place_id: &str) -> Result<BusinessDetails, PlacesError> {
        (**self).fetch(place_id).await
    }
}

/// Checks whether a website answers
#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// Observer for incremental pipeline output
///
/// Every method has a no-op default so sinks implement only what they render.
pub trait ReportSink: Send {
    /// Called after each listing, whatever its outcome
    fn on_progress(&mut self, _processed: usize, _total: usize) {}

    /// Called when a business clears the grade threshold
    fn on_row(&mut self, _row: &GradedBusiness, _report_so_far: &[GradedBusiness]) {}

    /// Called once with the final, sorted report
    fn on_complete(&mut self, _report: &[GradedBusiness]) {}
}

/// Sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ReportSink for NoopSink {}

/// Sink that reports progress through `tracing`
#[derive(Debug, Clone)]
pub struct LoggingSink {
    run_id: String,
}

impl LoggingSink {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self { run_id: run_id.into() }
    }
}

impl ReportSink for LoggingSink {
    fn on_progress(&mut self, processed: usize, total: usize) {
        tracing::info!("[{}] Processing business {} of {}...", self.run_id, processed, total);
    }

    fn on_row(&mut self, row: &GradedBusiness, report_so_far: &[GradedBusiness]) {
        tracing::debug!(
            "[{}] Qualified {} (score {:.1}, {:.2} km), {} so far",
            self.run_id,
            row.name,
            row.score,
            row.distance_km,
            report_so_far.len()
        );
    }

    fn on_complete(&mut self, report: &[GradedBusiness]) {
        tracing::info!("[{}] Processing complete: {} qualifying business(es)", self.run_id, report.len());
    }
}
