// Service exports
pub mod cache;
pub mod google;
pub mod prober;

pub use cache::CachedDetails;
pub use google::GooglePlacesClient;
pub use prober::HttpProber;
