use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::{Mutex, OnceCell};

use slotbook_common::BlockedDates;

type CacheKey = (String, i32, u32);

/// Client for the blocked-dates endpoint of the scheduling backend.
///
/// Results are cached per `(username, year, month)`. Each key holds a
/// `OnceCell`, so a cache miss issues exactly one request no matter how many
/// callers ask concurrently; the rest await the same initialization. A failed
/// request leaves the cell unset — nothing negative is cached and nothing is
/// retried automatically.
pub struct AvailabilityClient {
    http_client: Client,
    base_url: String,
    cache: Mutex<HashMap<CacheKey, Arc<OnceCell<BlockedDates>>>>,
}

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Availability service unavailable: {0}")]
    Unavailable(String),
}

impl AvailabilityClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the blocked weekdays for `username` in the given month.
    ///
    /// `month0` is the 0-based in-memory month index; the service speaks
    /// 1-based months, so the conversion happens here and nowhere else.
    pub async fn fetch_blocked_dates(
        &self,
        username: &str,
        year: i32,
        month0: u32,
    ) -> Result<BlockedDates, AvailabilityError> {
        let key = (username.to_string(), year, month0);

        let cell = {
            let mut cache = self.cache.lock().await;
            cache.entry(key).or_default().clone()
        };

        cell.get_or_try_init(|| self.fetch_remote(username, year, month0))
            .await
            .cloned()
    }

    async fn fetch_remote(
        &self,
        username: &str,
        year: i32,
        month0: u32,
    ) -> Result<BlockedDates, AvailabilityError> {
        let url = format!("{}/users/{}/blocked-dates", self.base_url, username);
        let month = month0 + 1;

        tracing::debug!(username, year, month, "Fetching blocked dates");

        let response = self
            .http_client
            .get(&url)
            .query(&[("year", year.to_string()), ("month", month.to_string())])
            .send()
            .await
            .map_err(|e| AvailabilityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AvailabilityError::Unavailable(
                response.status().to_string(),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AvailabilityError::Unavailable(e.to_string()))
    }
}
