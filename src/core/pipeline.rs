use std::cmp::Ordering;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::collaborators::{PlaceDetailsSource, ReachabilityProber, ReportSink};
use crate::core::scoring::Grader;
use crate::models::{GradedBusiness, RawListing};

/// Knobs for one pipeline run
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Minimum score to be reported (inclusive)
    pub grade_threshold: f64,
    /// Pause after every details call, to stay under upstream rate limits
    pub politeness_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            grade_threshold: 50.0,
            politeness_delay: Duration::from_secs(1),
        }
    }
}

/// Terminal state of a single listing
#[derive(Debug, Clone, PartialEq)]
pub enum ListingOutcome {
    /// Enrichment produced no details; never graded
    Skipped,
    /// Graded below the threshold
    Discarded { score: f64 },
    /// Graded at or above the threshold
    Reported(GradedBusiness),
}

/// Result of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct QualificationReport {
    /// Qualifying businesses, best first
    pub rows: Vec<GradedBusiness>,
    /// Number of listings handed to the pipeline
    pub total: usize,
    pub skipped: usize,
    pub discarded: usize,
    /// Set when the run stopped early; `rows` holds what was finished
    pub cancelled: bool,
}

impl QualificationReport {
    pub fn processed(&self) -> usize {
        self.skipped + self.discarded + self.rows.len()
    }
}

/// Enrich, grade, filter and rank unique listings
///
/// # Pipeline Stages
/// 1. Enrichment via the place details source
/// 2. Website reachability probe (reported, not scored)
/// 3. Grading
/// 4. Threshold filter
/// 5. Ranking by score, then distance
///
/// Listings are processed one at a time. A listing whose enrichment fails is
/// skipped without affecting the rest of the run.
pub struct QualificationPipeline<'a> {
    details: &'a dyn PlaceDetailsSource,
    prober: &'a dyn ReachabilityProber,
    grader: Grader,
    options: PipelineOptions,
}

impl<'a> QualificationPipeline<'a> {
    pub fn new(
        details: &'a dyn PlaceDetailsSource,
        prober: &'a dyn ReachabilityProber,
        grader: Grader,
        options: PipelineOptions,
    ) -> Self {
        Self {
            details,
            prober,
            grader,
            options,
        }
    }

    pub fn grader(&self) -> &Grader {
        &self.grader
    }

    /// Run every listing through the pipeline
    ///
    /// The sink sees progress after each listing and every qualifying row as
    /// it is found. Cancellation is checked between listings; a cancelled run
    /// still returns its finished rows, ranked.
    pub async fn run(
        &self,
        listings: &[RawListing],
        sink: &mut dyn ReportSink,
        cancel: &CancellationToken,
    ) -> QualificationReport {
        let total = listings.len();
        let mut report = QualificationReport {
            total,
            ..Default::default()
        };

        for (idx, listing) in listings.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!("Qualification cancelled after {} of {} listings", idx, total);
                report.cancelled = true;
                break;
            }

            match self.process(listing, cancel).await {
                ListingOutcome::Skipped => report.skipped += 1,
                ListingOutcome::Discarded { score } => {
                    tracing::debug!(
                        "Discarding {} with score {:.1} (threshold {:.1})",
                        listing.name,
                        score,
                        self.options.grade_threshold
                    );
                    report.discarded += 1;
                }
                ListingOutcome::Reported(row) => {
                    report.rows.push(row);
                    if let Some(row) = report.rows.last() {
                        sink.on_row(row, &report.rows);
                    }
                }
            }

            sink.on_progress(idx + 1, total);
        }

        rank(&mut report.rows);
        sink.on_complete(&report.rows);

        report
    }

    /// Take one listing from fetched to its terminal state
    pub async fn process(&self, listing: &RawListing, cancel: &CancellationToken) -> ListingOutcome {
        let fetched = self.details.fetch(&listing.place_id).await;
        self.pause(cancel).await;

        let details = match fetched {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    "Skipping {} ({}): failed to fetch place details: {}",
                    listing.name,
                    listing.place_id,
                    e
                );
                return ListingOutcome::Skipped;
            }
        };

        let website_accessible = match details.website.as_deref() {
            Some(url) => self.prober.is_reachable(url).await,
            None => false,
        };

        let (score, distance_km) = self.grader.grade(&details);
        if score < self.options.grade_threshold {
            return ListingOutcome::Discarded { score };
        }

        ListingOutcome::Reported(GradedBusiness {
            name: listing.name.clone(),
            address: listing.vicinity.clone(),
            place_id: listing.place_id.clone(),
            details,
            score,
            distance_km,
            website_accessible,
        })
    }

    async fn pause(&self, cancel: &CancellationToken) {
        if self.options.politeness_delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.options.politeness_delay) => {}
            _ = cancel.cancelled() => {}
        }
    }
}

/// Sort by score (descending) and then by distance (ascending)
pub fn rank(rows: &mut [GradedBusiness]) {
    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.distance_km
                    .partial_cmp(&b.distance_km)
                    .unwrap_or(Ordering::Equal)
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collaborators::{NoopSink, PlacesError};
    use crate::models::{BusinessDetails, LatLng};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeDetails(HashMap<String, BusinessDetails>);

    #[async_trait]
    impl PlaceDetailsSource for FakeDetails {
        async fn fetch(&self, place_id: &str) -> Result<BusinessDetails, PlacesError> {
            self.0
                .get(place_id)
                .cloned()
                .ok_or_else(|| PlacesError::NoResults(place_id.to_string()))
        }
    }

    struct AlwaysUp;

    #[async_trait]
    impl ReachabilityProber for AlwaysUp {
        async fn is_reachable(&self, _url: &str) -> bool {
            true
        }
    }

    fn graded(score: f64, distance_km: f64) -> GradedBusiness {
        GradedBusiness {
            name: format!("{score}-{distance_km}"),
            address: String::new(),
            place_id: String::new(),
            details: BusinessDetails::default(),
            score,
            distance_km,
            website_accessible: false,
        }
    }

    fn options(threshold: f64) -> PipelineOptions {
        PipelineOptions {
            grade_threshold: threshold,
            politeness_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_rank_orders_by_score_then_distance() {
        let mut rows = vec![graded(50.0, 3.0), graded(80.0, 9.0), graded(50.0, 1.0)];
        rank(&mut rows);

        let order: Vec<(f64, f64)> = rows.iter().map(|r| (r.score, r.distance_km)).collect();
        assert_eq!(order, vec![(80.0, 9.0), (50.0, 1.0), (50.0, 3.0)]);
    }

    #[tokio::test]
    async fn test_missing_details_are_skipped() {
        let details = FakeDetails(HashMap::from([(
            "known".to_string(),
            BusinessDetails {
                rating: 5.0,
                location: Some(LatLng::default()),
                ..Default::default()
            },
        )]));
        let grader = Grader::new(vec![], 50.0, LatLng::default());
        let pipeline = QualificationPipeline::new(&details, &AlwaysUp, grader, options(0.0));

        let listings = vec![
            RawListing::new("Known", "1 Main St", "known"),
            RawListing::new("Ghost", "2 Main St", "missing"),
        ];
        let report = pipeline
            .run(&listings, &mut NoopSink, &CancellationToken::new())
            .await;

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.processed(), 2);
        assert!(!report.rows[0].website_accessible, "no website means not accessible");
    }

    #[tokio::test]
    async fn test_threshold_boundary_is_inclusive() {
        let details = FakeDetails(HashMap::from([(
            "p".to_string(),
            BusinessDetails::default(),
        )]));
        // all absent at distance zero scores exactly the proximity share: 5.0
        let grader = Grader::new(vec![], 50.0, LatLng::default());

        let at = QualificationPipeline::new(&details, &AlwaysUp, grader.clone(), options(5.0));
        let listing = RawListing::new("P", "", "p");
        let outcome = at.process(&listing, &CancellationToken::new()).await;
        assert!(matches!(outcome, ListingOutcome::Reported(_)));

        let above = QualificationPipeline::new(&details, &AlwaysUp, grader, options(5.5));
        let outcome = above.process(&listing, &CancellationToken::new()).await;
        assert_eq!(outcome, ListingOutcome::Discarded { score: 5.0 });
    }

    #[tokio::test]
    async fn test_cancelled_before_start_processes_nothing() {
        let details = FakeDetails(HashMap::new());
        let grader = Grader::new(vec![], 50.0, LatLng::default());
        let pipeline = QualificationPipeline::new(&details, &AlwaysUp, grader, options(0.0));

        let cancel = CancellationToken::new();
        cancel.cancel();

        let listings = vec![RawListing::new("A", "", "a")];
        let report = pipeline.run(&listings, &mut NoopSink, &cancel).await;

        assert!(report.cancelled);
        assert_eq!(report.processed(), 0);
        assert_eq!(report.total, 1);
    }
}
