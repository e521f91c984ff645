use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A raw places search result, before enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub name: String,
    #[serde(default)]
    pub vicinity: String,
    #[serde(rename = "placeId")]
    pub place_id: String,
    #[serde(default)]
    pub geometry: Option<LatLng>,
}

impl RawListing {
    pub fn new(name: impl Into<String>, vicinity: impl Into<String>, place_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vicinity: vicinity.into(),
            place_id: place_id.into(),
            geometry: None,
        }
    }
}

/// A single customer review attached to a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rating: f64,
    /// Raw timestamp text; may be malformed
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
}

/// Enriched details for one place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    pub website: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub user_ratings_total: u32,
    #[serde(default)]
    pub price_level: u8,
    #[serde(default)]
    pub types: Vec<String>,
    pub location: Option<LatLng>,
    #[serde(default)]
    pub open_now: bool,
    #[serde(default)]
    pub reviews: Vec<ReviewRecord>,
}

/// Final graded record for a qualifying business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedBusiness {
    pub name: String,
    pub address: String,
    #[serde(rename = "placeId")]
    pub place_id: String,
    #[serde(flatten)]
    pub details: BusinessDetails,
    pub score: f64,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "websiteAccessible")]
    pub website_accessible: bool,
}

impl GradedBusiness {
    /// Deep link into Google Maps for this place
    pub fn maps_url(&self) -> String {
        maps_url(&self.place_id)
    }
}

pub fn maps_url(place_id: &str) -> String {
    format!("https://www.google.com/maps/place/?q=place_id:{}", place_id)
}

/// Per-criterion grading weights
///
/// Each criterion's 0-10 sub-score is multiplied by `weight / 100` before
/// summing, so weights need not add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradingWeights {
    pub rating: f64,
    // snake_case aliases: config sources lowercase their keys
    #[serde(alias = "user_ratings_total")]
    pub user_ratings_total: f64,
    pub reviews: f64,
    pub website: f64,
    pub phone: f64,
    #[serde(alias = "price_level")]
    pub price_level: f64,
    pub types: f64,
    #[serde(alias = "location_proximity")]
    pub location_proximity: f64,
}

impl Default for GradingWeights {
    fn default() -> Self {
        Self {
            rating: 20.0,
            user_ratings_total: 10.0,
            reviews: 20.0,
            website: 15.0,
            phone: 15.0,
            price_level: 10.0,
            types: 5.0,
            location_proximity: 5.0,
        }
    }
}

impl GradingWeights {
    pub fn total(&self) -> f64 {
        self.rating
            + self.user_ratings_total
            + self.reviews
            + self.website
            + self.phone
            + self.price_level
            + self.types
            + self.location_proximity
    }

    /// First weight that is negative or not finite, by its field name
    pub fn first_invalid(&self) -> Option<(&'static str, f64)> {
        [
            ("rating", self.rating),
            ("user_ratings_total", self.user_ratings_total),
            ("reviews", self.reviews),
            ("website", self.website),
            ("phone", self.phone),
            ("price_level", self.price_level),
            ("types", self.types),
            ("location_proximity", self.location_proximity),
        ]
        .into_iter()
        .find(|(_, weight)| !weight.is_finite() || *weight < 0.0)
    }
}
