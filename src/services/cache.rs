use async_trait::async_trait;
use std::time::Duration;

use crate::core::collaborators::{PlaceDetailsSource, PlacesError};
use crate::models::BusinessDetails;

/// In-memory cache in front of a place details source
///
/// Only successful lookups are cached; failures always go upstream again.
/// Entries expire after the configured TTL so ratings and reviews stay fresh.
pub struct CachedDetails<S> {
    inner: S,
    cache: moka::future::Cache<String, BusinessDetails>,
}

impl<S: PlaceDetailsSource> CachedDetails<S> {
    pub fn new(inner: S, capacity: u64, ttl: Duration) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<S: PlaceDetailsSource> PlaceDetailsSource for CachedDetails<S> {
    async fn fetch(&self, place_id: &str) -> Result<BusinessDetails, PlacesError> {
        if let Some(details) = self.cache.get(place_id).await {
            tracing::trace!("Details cache hit: {}", place_id);
            return Ok(details);
        }

        let details = self.inner.fetch(place_id).await?;
        self.cache.insert(place_id.to_string(), details.clone()).await;
        tracing::trace!("Details cache set: {}", place_id);

        Ok(details)
    }
}
