// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BusinessDetails, GradedBusiness, GradingWeights, LatLng, RawListing, ReviewRecord};
pub use requests::AnalyzeRequest;
pub use responses::{AnalyzeResponse, ErrorResponse, HealthResponse};
