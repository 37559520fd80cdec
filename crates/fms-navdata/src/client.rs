//! Navdata backend HTTP client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use fms_core::error::NavdataError;
use fms_core::models::{Airport, Procedure, Runway};
use fms_core::navdata::NavigationDatabase;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

use crate::backoff::Backoff;
use crate::cache::ResponseCache;
use crate::config::NavdataConfig;

/// HTTP client for the navdata backend.
///
/// Responses are cached per path. After a transport failure requests fail
/// fast with [`NavdataError::Unavailable`] until the backoff window passes.
pub struct NavdataClient {
    client: Client,
    base_url: String,
    cache: ResponseCache,
    backoff: Mutex<Backoff>,
}

impl NavdataClient {
    pub fn new(config: &NavdataConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            cache: ResponseCache::new(config.cache_ttl, config.cache_max_entries),
            backoff: Mutex::new(Backoff::new(config.backoff_base, config.backoff_max)),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&NavdataConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Drop every cached response, e.g. after a navdata cycle switch.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// GET `path` and decode it. `Ok(None)` when the backend answers 404.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, NavdataError> {
        let body = match self.cache.get(path) {
            Some(body) => {
                tracing::debug!(path, "Navdata cache hit");
                Some(body)
            }
            None => self.fetch_uncached(path).await?,
        };

        body.map(|body| {
            serde_json::from_value(body)
                .map_err(|e| NavdataError::malformed(format!("{}: {}", path, e)))
        })
        .transpose()
    }

    async fn fetch_uncached(&self, path: &str) -> Result<Option<Value>, NavdataError> {
        if let Err(refusal) = self.with_backoff(|b| b.check(), Ok(())) {
            tracing::debug!(path, failures = refusal.failures, "Navdata request refused");
            return Err(NavdataError::unavailable(refusal.to_string()));
        }

        match self.fetch(path).await {
            Ok(body) => {
                if let Some(failures) = self.with_backoff(Backoff::record_success, None) {
                    tracing::info!(failures, "Navdata backend reachable again");
                }
                if let Some(body) = &body {
                    self.cache.insert(path, body.clone());
                }
                Ok(body)
            }
            Err(FetchError::Transport(err)) => {
                let window = self.with_backoff(Backoff::record_failure, Duration::ZERO);
                tracing::warn!(
                    path,
                    retry_in_ms = window.as_millis() as u64,
                    "Navdata request failed: {:#}",
                    err
                );
                Err(NavdataError::transport(format!("GET {}", path), err))
            }
            Err(FetchError::Malformed(err)) => {
                self.with_backoff(Backoff::record_success, None);
                Err(NavdataError::malformed(format!("{}: {:#}", path, err)))
            }
        }
    }

    async fn fetch(&self, path: &str) -> Result<Option<Value>, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to reach navdata backend")
            .map_err(FetchError::Transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transport(anyhow::anyhow!(
                "Navdata request failed: {} {}",
                status,
                body
            )));
        }

        let text = response
            .text()
            .await
            .context("Failed to read navdata response")
            .map_err(FetchError::Transport)?;
        let body = serde_json::from_str(&text)
            .context("Failed to parse navdata response")
            .map_err(FetchError::Malformed)?;
        Ok(Some(body))
    }

    /// Run `f` on the backoff state, or return `poisoned` if the lock is.
    fn with_backoff<R>(&self, f: impl FnOnce(&mut Backoff) -> R, poisoned: R) -> R {
        match self.backoff.lock() {
            Ok(mut backoff) => f(&mut backoff),
            Err(_) => poisoned,
        }
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, NavdataError> {
        Ok(self.get_json(path).await?.unwrap_or_default())
    }
}

enum FetchError {
    Transport(anyhow::Error),
    Malformed(anyhow::Error),
}

#[async_trait]
impl NavigationDatabase for NavdataClient {
    async fn airport(&self, ident: &str) -> Result<Option<Airport>, NavdataError> {
        self.get_json(&format!("/v1/airports/{}", ident)).await
    }

    async fn runways(&self, airport_ident: &str) -> Result<Vec<Runway>, NavdataError> {
        self.get_list(&format!("/v1/airports/{}/runways", airport_ident))
            .await
    }

    async fn departures(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError> {
        self.get_list(&format!("/v1/airports/{}/departures", airport_ident))
            .await
    }

    async fn arrivals(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError> {
        self.get_list(&format!("/v1/airports/{}/arrivals", airport_ident))
            .await
    }

    async fn approaches(&self, airport_ident: &str) -> Result<Vec<Procedure>, NavdataError> {
        self.get_list(&format!("/v1/airports/{}/approaches", airport_ident))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> NavdataConfig {
        NavdataConfig {
            // Discard port on loopback; connections are refused.
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_millis(500),
            backoff_base: Duration::from_secs(30),
            backoff_max: Duration::from_secs(60),
            ..NavdataConfig::default()
        }
    }

    #[tokio::test]
    async fn test_transport_failure_then_fail_fast() {
        let client = NavdataClient::new(&unreachable_config()).unwrap();

        let first = client.airport("KSFO").await;
        assert!(matches!(first, Err(NavdataError::Transport { .. })));

        let second = client.runways("KSFO").await;
        assert!(matches!(second, Err(NavdataError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_refusal_reports_failure_count() {
        let client = NavdataClient::new(&unreachable_config()).unwrap();
        assert!(client.airport("KSFO").await.is_err());

        match client.approaches("KSFO").await {
            Err(NavdataError::Unavailable { message }) => {
                assert!(message.contains("after 1 consecutive failure"), "{}", message);
            }
            other => panic!("expected refusal, got {:?}", other),
        }

        client.with_backoff(Backoff::record_failure, Duration::ZERO);
        let refusal = client.with_backoff(|b| b.check(), Ok(())).unwrap_err();
        assert_eq!(refusal.failures, 2);
        assert_eq!(refusal.remaining.as_secs(), 59);
    }

    #[tokio::test]
    async fn test_cached_response_skips_backend() {
        let client = NavdataClient::new(&unreachable_config()).unwrap();
        client.cache.insert(
            "/v1/airports/KSFO/runways",
            serde_json::json!([{
                "ident": "RW28L",
                "airport_ident": "KSFO",
                "threshold": {"lat": 37.6117, "lon": -122.3576},
                "landing_course_deg": 297.0
            }]),
        );

        let runways = client.runways("KSFO").await.unwrap();
        assert_eq!(runways.len(), 1);
        assert_eq!(runways[0].ident, "RW28L");
    }

    #[tokio::test]
    async fn test_cached_garbage_is_malformed() {
        let client = NavdataClient::new(&unreachable_config()).unwrap();
        client
            .cache
            .insert("/v1/airports/KSFO", serde_json::json!({"ident": 42}));

        let result = client.airport("KSFO").await;
        assert!(matches!(result, Err(NavdataError::Malformed { .. })));
    }
}
