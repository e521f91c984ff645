use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

use crate::core::collaborators::{PlacesError, ReachabilityProber};

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Checks websites with a `HEAD` request
///
/// A site is reachable when it answers with a status below 400 after
/// following redirects. Timeouts and transport errors count as unreachable.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ReachabilityProber for HttpProber {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let reachable = response.status().as_u16() < 400;
                tracing::debug!("Probed {}: HTTP {}", url, response.status());
                reachable
            }
            Err(e) => {
                tracing::debug!("Probe failed for {}: {}", url, e);
                false
            }
        }
    }
}
