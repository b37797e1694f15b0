//! Listings client: the single point of entry for every call to the job source.
//!
//! Searches are retried only on 429, using the shared backoff policy. Any other
//! failure abandons the (keyword, location) pair and is reported to the caller;
//! `fetch` turns those failures into an empty result so a hunt cycle never stops
//! on a single bad search.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

pub mod backoff;
pub mod parser;
pub mod transport;

use crate::config::FetchConfig;
use crate::models::listing::{ListingSource, RawListing};
use backoff::{BackoffPolicy, RateGate};
use parser::{parse_description, parse_search_page};
use transport::{Transport, TransportError};

/// Results per search page on the listing source.
pub const PAGE_SIZE: u32 = 25;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Listing source returned status {status}")]
    Status { status: u16 },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Unparseable search page: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ListingsClient {
    transport: Arc<dyn Transport>,
    settings: Arc<FetchConfig>,
    backoff: BackoffPolicy,
    gate: RateGate,
}

impl ListingsClient {
    pub fn new(transport: Arc<dyn Transport>, settings: FetchConfig) -> Self {
        debug!(
            "Rate-limit backoff schedule {:?}, ceiling {:?}",
            settings.backoff.schedule(),
            settings.backoff.ceiling()
        );
        Self {
            transport,
            backoff: settings.backoff,
            settings: Arc::new(settings),
            gate: RateGate::new(),
        }
    }

    pub fn source(&self) -> ListingSource {
        self.settings.source
    }

    /// Upper bound on searches in flight at once.
    pub fn concurrency(&self) -> usize {
        self.settings.concurrency.max(1)
    }

    /// Searches one (keyword, location) pair, returning an empty list on failure.
    #[allow(dead_code)]
    pub async fn fetch(&self, keyword: &str, location: &str) -> Vec<RawListing> {
        match self.search(keyword, location).await {
            Ok(listings) => listings,
            Err(e) => {
                warn!("Error searching for '{keyword}' in '{location}': {e}");
                Vec::new()
            }
        }
    }

    /// Searches one (keyword, location) pair across the configured number of pages.
    pub async fn search(&self, keyword: &str, location: &str) -> Result<Vec<RawListing>, FetchError> {
        let mut listings = Vec::new();

        for page in 0..self.settings.pages_per_search {
            let query = self.search_query(keyword, location, page);
            let parsed = match self.get_page(&query).await {
                Ok(parsed) => parsed,
                Err(e) if page > 0 => {
                    warn!(
                        "Stopping after page {page} of '{keyword}' in '{location}': {e}"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            if parsed.is_empty() {
                break;
            }
            listings.extend(parsed);
        }

        if self.settings.fetch_descriptions {
            self.fill_descriptions(&mut listings).await;
        }

        info!(
            "Found {} potential matches for '{keyword}' in '{location}'",
            listings.len()
        );
        Ok(listings)
    }

    async fn get_page(&self, query: &[(&str, String)]) -> Result<Vec<RawListing>, FetchError> {
        let body = self.get_with_backoff(&self.settings.search_url, query).await?;
        Ok(parse_search_page(&body)?)
    }

    /// Issues a GET, retrying on 429 with exponential backoff.
    async fn get_with_backoff(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, FetchError> {
        let max_attempts = self.backoff.max_attempts();

        for attempt in 1..=max_attempts {
            self.gate.wait().await;
            let response = self.transport.get(url, query).await?;

            if response.is_rate_limited() {
                if attempt == max_attempts {
                    break;
                }
                let delay = self.backoff.delay_for(attempt);
                warn!(
                    "Rate limited (attempt {attempt}/{max_attempts}), backing off for {}s",
                    delay.as_secs_f64()
                );
                self.gate.hold(delay).await;
                continue;
            }

            if !response.is_success() {
                debug!("Listing source body for status {}: {}", response.status, response.body);
                return Err(FetchError::Status {
                    status: response.status,
                });
            }

            return Ok(response.body);
        }

        Err(FetchError::RateLimited {
            attempts: max_attempts,
        })
    }

    fn search_query(&self, keyword: &str, location: &str, page: u32) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("keywords", keyword.to_string()),
            ("location", location.to_string()),
            ("f_TPR", format!("r{}", self.settings.recency_window_secs)),
        ];
        if self.settings.remote_filter {
            query.push(("f_WT", "2".to_string()));
        }
        query.push(("start", (page * PAGE_SIZE).to_string()));
        query
    }

    /// Fetches full description text for listings that arrived without one.
    /// No retries: any failure leaves the description empty.
    async fn fill_descriptions(&self, listings: &mut [RawListing]) {
        for raw in listings.iter_mut().filter(|raw| !raw.has_description()) {
            let Some(url) = self.detail_url(raw) else {
                continue;
            };

            tokio::time::sleep(self.settings.description_delay).await;
            self.gate.wait().await;

            let description = match self.transport.get(&url, &[]).await {
                Ok(response) if response.is_success() => parse_description(&response.body),
                Ok(response) if response.is_rate_limited() => {
                    let delay = self.backoff.delay_for(1);
                    warn!(
                        "Rate limited fetching description for {url}, pausing requests for {}s",
                        delay.as_secs_f64()
                    );
                    self.gate.hold(delay).await;
                    String::new()
                }
                Ok(response) => {
                    debug!("Description fetch for {url} returned {}", response.status);
                    String::new()
                }
                Err(e) => {
                    debug!("Description fetch for {url} failed: {e}");
                    String::new()
                }
            };
            raw.description = Some(description);
        }
    }

    fn detail_url(&self, raw: &RawListing) -> Option<String> {
        match (&self.settings.detail_url, raw.id_text()) {
            (Some(base), Some(id)) => Some(format!("{}/{}", base.trim_end_matches('/'), id)),
            _ => raw.url.clone().filter(|u| !u.trim().is_empty()),
        }
    }
}
