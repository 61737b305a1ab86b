//! HTTP client for the failed-jobs collector endpoint.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use super::error::{PollError, Result};
use crate::job::Job;
use crate::sanitize::{redact_url, truncate_body};

/// Default connect timeout for HTTP requests (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for HTTP requests (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can deliver a snapshot of failed jobs.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetches the full current set of failed jobs.
    async fn fetch_failed_jobs(&self) -> Result<Vec<Job>>;

    /// Log- and notification-safe description of the source.
    fn describe(&self) -> String;
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

/// Transport settings for [`CollectorClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Polls `GET {endpoint}/jobs/failed` with a bearer key.
pub struct CollectorClient {
    client: Client,
    jobs_url: String,
    api_key: SecretString,
    retry: RetryPolicy,
}

impl CollectorClient {
    pub fn new(endpoint: &str, api_key: SecretString, options: ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| PollError::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            jobs_url: jobs_url(endpoint),
            api_key,
            retry: options.retry,
        })
    }

    pub fn jobs_url(&self) -> &str {
        &self.jobs_url
    }

    async fn fetch_once(&self) -> Result<Vec<Job>> {
        let response = self
            .client
            .get(&self.jobs_url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PollError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Vec<Job>>(&body).map_err(|e| PollError::Decode(e.to_string()))
    }
}

#[async_trait]
impl JobSource for CollectorClient {
    async fn fetch_failed_jobs(&self) -> Result<Vec<Job>> {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once().await {
                Ok(jobs) => {
                    debug!("Fetched {} failed jobs from {}", jobs.len(), self.describe());
                    return Ok(jobs);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        "Poll attempt {}/{} against {} failed: {}; retrying in {:?}",
                        attempt,
                        attempts,
                        self.describe(),
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if attempt > 1 {
                        info!("Giving up on {} after {} attempts", self.describe(), attempt);
                    }
                    return Err(e);
                }
            }
        }
    }

    fn describe(&self) -> String {
        redact_url(&self.jobs_url)
    }
}

fn jobs_url(endpoint: &str) -> String {
    format!("{}/jobs/failed", endpoint.trim().trim_end_matches('/'))
}
