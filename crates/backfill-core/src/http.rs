//! Retrying JSON-over-HTTP client shared by all provider adapters.
//!
//! Uses async reqwest internally but presents a blocking interface: a run is
//! strictly sequential, so every request is driven to completion on the
//! shared runtime before the caller continues.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use serde_json::Value;

use crate::error::HttpError;
use crate::pacing::Sleeper;
use crate::retry::{backoff_duration, is_retryable_status};

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Client-wide HTTP settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Sent on every request unless a call overrides it
    pub user_agent: String,
    /// Unit of the linear retry backoff
    pub base_delay: Duration,
    pub connect_timeout: Duration,
    /// Per-request timeout used when a caller does not pick its own
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "backfill/{} (entity enrichment batch job)",
                env!("CARGO_PKG_VERSION")
            ),
            base_delay: Duration::from_millis(1200),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(20),
            max_attempts: 3,
        }
    }
}

/// Per-call attempt budget and timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl RequestOptions {
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        let config = HttpConfig::default();
        Self {
            max_attempts: config.max_attempts,
            timeout: config.timeout,
        }
    }
}

/// GET-and-decode client with status classification and linear backoff.
///
/// Constructed once per run and shared by reference between adapters.
pub struct HttpClient {
    client: reqwest::Client,
    default_headers: Vec<(String, String)>,
    base_delay: Duration,
    defaults: RequestOptions,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("default_headers", &self.default_headers)
            .field("base_delay", &self.base_delay)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(config: &HttpConfig, sleeper: Arc<dyn Sleeper>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self {
            client,
            default_headers: vec![("User-Agent".to_string(), config.user_agent.clone())],
            base_delay: config.base_delay,
            defaults: RequestOptions {
                max_attempts: config.max_attempts,
                timeout: config.timeout,
            },
            sleeper,
        })
    }

    /// Attempt budget and timeout from the client configuration
    pub fn request_options(&self) -> RequestOptions {
        self.defaults
    }

    /// GET `url` with `query` and decode the body as JSON.
    ///
    /// Retryable statuses (see [`crate::RETRYABLE_STATUSES`]) sleep
    /// `base_delay * (attempt + 1)` and try again, up to
    /// `options.max_attempts`. Any other non-2xx status, a transport failure
    /// or an undecodable body fails immediately.
    pub fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
        options: RequestOptions,
    ) -> Result<Value, HttpError> {
        let headers = self.merge_headers(headers);
        for attempt in 0..options.max_attempts {
            let (status, body) = self.send_once(url, query, &headers, options.timeout)?;
            if is_retryable_status(status) {
                let delay = backoff_duration(self.base_delay, attempt);
                log::debug!(
                    "{url}: HTTP {status} on attempt {}/{}, retrying in {delay:?}",
                    attempt + 1,
                    options.max_attempts
                );
                self.sleeper.sleep(delay);
                continue;
            }
            if !(200..300).contains(&status) {
                return Err(HttpError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            return serde_json::from_slice(&body).map_err(|_| HttpError::Decode {
                url: url.to_string(),
                status,
            });
        }
        log::warn!("{url}: giving up after {} attempts", options.max_attempts);
        Err(HttpError::Exhausted {
            url: url.to_string(),
            attempts: options.max_attempts,
        })
    }

    fn send_once(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<(u16, Vec<u8>), HttpError> {
        SHARED_RUNTIME.handle().block_on(async {
            let mut request = self.client.get(url).query(query).timeout(timeout);
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
            let response = request
                .send()
                .await
                .map_err(|e| HttpError::from_reqwest(url, &e))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| HttpError::from_reqwest(url, &e))?;
            Ok((status, body.to_vec()))
        })
    }

    /// Defaults first, then per-call headers; a per-call header replaces a
    /// default of the same name.
    fn merge_headers(&self, extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = self
            .default_headers
            .iter()
            .filter(|(name, _)| !extra.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)))
            .cloned()
            .collect();
        merged.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        merged
    }
}
