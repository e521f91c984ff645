// Core algorithm exports
pub mod analysis;
pub mod collaborators;
pub mod dedup;
pub mod distance;
pub mod export;
pub mod pipeline;
pub mod reviews;
pub mod scoring;
pub mod sentiment;
pub mod similarity;

pub use analysis::{run_analysis, AnalysisError, AnalysisReport, AnalysisRequest, Collaborators};
pub use collaborators::{
    Geocoder, LoggingSink, NoopSink, PlaceDetailsSource, PlacesError, PlacesSearch,
    ReachabilityProber, ReportSink,
};
pub use dedup::{is_duplicate, merge_listings};
pub use distance::{distance_between, haversine_distance};
pub use export::{parse_columns, to_csv_string, write_csv, ExportColumn, ExportError};
pub use pipeline::{rank, ListingOutcome, PipelineOptions, QualificationPipeline, QualificationReport};
pub use reviews::ReviewCriteria;
pub use scoring::{Grader, ScoreBreakdown};
pub use sentiment::{LexiconScorer, PolarityScorer};
pub use similarity::similarity_ratio;
