use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::core::collaborators::{Geocoder, PlaceDetailsSource, PlacesError, PlacesSearch};
use crate::models::{BusinessDetails, LatLng, RawListing, ReviewRecord};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Fields requested from the Place Details endpoint
const DETAIL_FIELDS: &[&str] = &[
    "website",
    "formatted_phone_number",
    "rating",
    "user_ratings_total",
    "price_level",
    "types",
    "geometry",
    "opening_hours",
    "reviews",
];

/// Nearby Search never serves more than three pages per query
const MAX_PAGES: usize = 3;

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl From<Location> for LatLng {
    fn from(location: Location) -> Self {
        LatLng::new(location.lat, location.lng)
    }
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    #[serde(default)]
    name: String,
    #[serde(default)]
    vicinity: String,
    place_id: String,
    geometry: Option<Geometry>,
}

impl From<NearbyResult> for RawListing {
    fn from(result: NearbyResult) -> Self {
        RawListing {
            name: result.name,
            vicinity: result.vicinity,
            place_id: result.place_id,
            geometry: result.geometry.map(|g| g.location.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    error_message: Option<String>,
    result: Option<DetailsResult>,
}

#[derive(Debug, Default, Deserialize)]
struct DetailsResult {
    website: Option<String>,
    formatted_phone_number: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    price_level: Option<u8>,
    #[serde(default)]
    types: Vec<String>,
    geometry: Option<Geometry>,
    opening_hours: Option<OpeningHours>,
    #[serde(default)]
    reviews: Vec<ReviewResult>,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    open_now: bool,
}

#[derive(Debug, Deserialize)]
struct ReviewResult {
    #[serde(default)]
    text: String,
    #[serde(default)]
    rating: f64,
    time_created: Option<String>,
    /// Unix seconds
    time: Option<i64>,
}

impl From<ReviewResult> for ReviewRecord {
    fn from(review: ReviewResult) -> Self {
        let created_at = review
            .time_created
            .or_else(|| {
                review
                    .time
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                    .map(|t| t.to_rfc3339())
            })
            .unwrap_or_default();

        ReviewRecord {
            text: review.text,
            rating: review.rating,
            created_at,
        }
    }
}

impl From<DetailsResult> for BusinessDetails {
    fn from(result: DetailsResult) -> Self {
        BusinessDetails {
            website: result.website.filter(|w| !w.trim().is_empty()),
            phone: result.formatted_phone_number.filter(|p| !p.trim().is_empty()),
            rating: result.rating.unwrap_or(0.0),
            user_ratings_total: result.user_ratings_total.unwrap_or(0),
            price_level: result.price_level.unwrap_or(0),
            types: result.types,
            location: result.geometry.map(|g| g.location.into()),
            open_now: result.opening_hours.map(|h| h.open_now).unwrap_or(false),
            reviews: result.reviews.into_iter().map(ReviewRecord::from).collect(),
        }
    }
}

/// Map a Google API `status` field to an error, if it is one
fn check_status(status: &str, error_message: Option<String>) -> Result<(), PlacesError> {
    match status {
        "OK" => Ok(()),
        "REQUEST_DENIED" => Err(PlacesError::RequestDenied(
            error_message.unwrap_or_else(|| status.to_string()),
        )),
        _ => Err(PlacesError::Status {
            status: status.to_string(),
            message: error_message.unwrap_or_default(),
        }),
    }
}

/// Google Maps Platform client
///
/// Handles all communication with the Geocoding and Places APIs:
/// - Resolving a free-text location to coordinates
/// - Nearby keyword search with pagination
/// - Place details for enrichment
pub struct GooglePlacesClient {
    base_url: String,
    api_key: String,
    client: Client,
    /// Wait before a `next_page_token` becomes valid
    page_token_delay: Duration,
}

impl GooglePlacesClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Request`] if the HTTP client cannot be built.
    pub fn new(
        base_url: String,
        api_key: String,
        timeout_secs: u64,
        page_token_delay: Duration,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            page_token_delay,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, PlacesError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlacesError::HttpStatus(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| PlacesError::InvalidResponse(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl Geocoder for GooglePlacesClient {
    async fn resolve(&self, location: &str) -> Result<LatLng, PlacesError> {
        tracing::debug!("Geocoding location: {}", location);

        let response: GeocodeResponse = self
            .get_json("geocode/json", &[("address", location.to_string())])
            .await?;

        if response.status == "ZERO_RESULTS" {
            return Err(PlacesError::NoResults(location.to_string()));
        }
        check_status(&response.status, response.error_message)?;

        response
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location.into())
            .ok_or_else(|| PlacesError::NoResults(location.to_string()))
    }
}

#[async_trait]
impl PlacesSearch for GooglePlacesClient {
    async fn search(
        &self,
        keyword: &str,
        center: LatLng,
        radius_m: u32,
        max_results: usize,
    ) -> Result<Vec<RawListing>, PlacesError> {
        let mut listings: Vec<RawListing> = Vec::new();
        let mut params = vec![
            ("keyword", keyword.to_string()),
            ("location", format!("{},{}", center.lat, center.lng)),
            ("radius", radius_m.to_string()),
        ];

        for page in 0..MAX_PAGES {
            let fetched = self
                .get_json::<NearbySearchResponse>("place/nearbysearch/json", &params)
                .await
                .and_then(|response| {
                    if response.status == "ZERO_RESULTS" {
                        return Ok(response);
                    }
                    check_status(&response.status, response.error_message.clone())?;
                    Ok(response)
                });

            let response = match fetched {
                Ok(response) => response,
                // the first page failing means the search failed
                Err(e) if page == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Stopping pagination after {} listing(s): {}",
                        listings.len(),
                        e
                    );
                    break;
                }
            };

            for result in response.results {
                if listings.len() >= max_results {
                    return Ok(listings);
                }
                listings.push(result.into());
            }

            match response.next_page_token {
                Some(token) if listings.len() < max_results => {
                    tokio::time::sleep(self.page_token_delay).await;
                    params = vec![("pagetoken", token)];
                }
                _ => break,
            }
        }

        tracing::info!("Total businesses fetched: {}", listings.len());
        Ok(listings)
    }
}

#[async_trait]
impl PlaceDetailsSource for GooglePlacesClient {
    async fn fetch(&self, place_id: &str) -> Result<BusinessDetails, PlacesError> {
        let response: DetailsResponse = self
            .get_json(
                "place/details/json",
                &[
                    ("place_id", place_id.to_string()),
                    ("fields", DETAIL_FIELDS.join(",")),
                ],
            )
            .await?;

        check_status(&response.status, response.error_message)?;

        let result = response
            .result
            .ok_or_else(|| PlacesError::InvalidResponse(format!("missing result for {}", place_id)))?;

        Ok(result.into())
    }
}
