//! Thin reqwest wrapper shared by every outbound call.
//!
//! All requests go through one retry loop: server errors (5xx) and
//! server-side transport failures are retried with capped exponential
//! backoff, client errors (4xx) fail on the first attempt.

use std::time::Duration;

use contentprofiler_shared::{ContentProfilerError, HttpSettings, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("ContentProfiler/", env!("CARGO_PKG_VERSION"));

/// Maximum redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// How much of an error body is kept in [`ContentProfilerError::Http`].
const ERROR_BODY_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
        }
    }

    /// Delay before retry `n` (1-based): `initial * 2^(n-1)`, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&HttpSettings::default())
    }
}

// ---------------------------------------------------------------------------
// HttpClient
// ---------------------------------------------------------------------------

/// Shared HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Build a client with the timeout and retry policy from `settings`.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(settings.timeout())
            .build()
            .map_err(|e| {
                ContentProfilerError::network(format!("failed to build HTTP client: {e}"), false)
            })?;

        Ok(Self {
            client,
            retry: RetryPolicy::from_settings(settings),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// GET `url` with query `params` and decode the body as JSON.
    pub async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Value> {
        let response = self
            .send_with_retry(url, || {
                with_headers(self.client.get(url).query(params), headers)
            })
            .await?;
        decode_json(url, response).await
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String> {
        let response = self
            .send_with_retry(url, || with_headers(self.client.get(url), headers))
            .await?;
        read_body(url, response).await
    }

    /// POST a JSON body to `url` and decode the JSON response.
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value> {
        let response = self
            .send_with_retry(url, || {
                with_headers(self.client.post(url).json(body), headers)
            })
            .await?;
        decode_json(url, response).await
    }

    /// Send the request built by `build`, rebuilding it for every attempt.
    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            debug!(url, attempt, "sending request");
            let result = match build().send().await {
                Ok(response) => check_status(url, response).await,
                Err(e) => Err(transport_error(url, &e)),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(url, attempt, ?delay, error = %e, "request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

fn with_headers(mut request: RequestBuilder, headers: &[(&str, &str)]) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    request
}

/// Turn a non-success status into [`ContentProfilerError::Http`].
async fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ContentProfilerError::Http {
        status: status.as_u16(),
        url: url.to_string(),
        body: body.chars().take(ERROR_BODY_CHARS).collect(),
    })
}

/// Connect, timeout and send failures look server-side and are retryable.
fn transport_error(url: &str, e: &reqwest::Error) -> ContentProfilerError {
    let retryable = e.is_connect() || e.is_timeout() || e.is_request();
    ContentProfilerError::network(format!("{url}: {e}"), retryable)
}

async fn read_body(url: &str, response: Response) -> Result<String> {
    response.text().await.map_err(|e| {
        ContentProfilerError::network(format!("{url}: failed to read body: {e}"), false)
    })
}

async fn decode_json(url: &str, response: Response) -> Result<Value> {
    let body = read_body(url, response).await?;
    serde_json::from_str(&body)
        .map_err(|e| ContentProfilerError::parse(format!("{url}: invalid JSON response: {e}")))
}
