//! Bounded-concurrency fetcher for facility detail pages.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;

use icpe_core::FacilityReference;

use crate::error::ScraperError;
use crate::types::FetchResult;

/// Fetches detail pages over one shared `reqwest::Client`.
///
/// At most `max_concurrent` requests are in flight at once. A failed request
/// (transport error, timeout, non-2xx status) marks only its own
/// [`FetchResult`] as failed; it is never retried here.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    max_concurrent: usize,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with a per-request timeout and `User-Agent`.
    ///
    /// `max_concurrent` is clamped to at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_concurrent: usize,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self::with_client(client, max_concurrent))
    }

    /// Wraps an existing client, e.g. one built with a shorter timeout in tests.
    #[must_use]
    pub fn with_client(client: Client, max_concurrent: usize) -> Self {
        Self {
            client,
            max_concurrent: max_concurrent.max(1),
        }
    }

    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Fetches every facility's detail page and returns once all requests
    /// have finished.
    ///
    /// A slow request holds only its own slot; the others keep flowing. The
    /// output has exactly one entry per input, in input order.
    pub async fn fetch_all(&self, facilities: &[FacilityReference]) -> Vec<FetchResult> {
        // Completion order varies with latency; the index restores input order.
        let mut indexed: Vec<(usize, FetchResult)> = stream::iter(facilities.iter().enumerate())
            .map(|(index, facility)| async move { (index, self.fetch_one(facility).await) })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;
        indexed.sort_unstable_by_key(|(index, _)| *index);
        let results: Vec<FetchResult> = indexed.into_iter().map(|(_, result)| result).collect();

        let failed = results.iter().filter(|r| r.failed).count();
        tracing::debug!(
            requested = facilities.len(),
            failed,
            max_concurrent = self.max_concurrent,
            "fetched facility detail pages"
        );
        results
    }

    async fn fetch_one(&self, facility: &FacilityReference) -> FetchResult {
        let response = match self
            .client
            .get(&facility.detail_url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    facility_id = %facility.facility_id,
                    url = %facility.detail_url,
                    error = %e,
                    "detail page request failed"
                );
                return FetchResult::failed(&facility.facility_id);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                facility_id = %facility.facility_id,
                url = %facility.detail_url,
                status = status.as_u16(),
                "detail page returned non-success status"
            );
            return FetchResult::failed(&facility.facility_id);
        }

        match response.text().await {
            Ok(body) => FetchResult::fetched(&facility.facility_id, body),
            Err(e) => {
                tracing::warn!(
                    facility_id = %facility.facility_id,
                    url = %facility.detail_url,
                    error = %e,
                    "failed to read detail page body"
                );
                FetchResult::failed(&facility.facility_id)
            }
        }
    }
}
