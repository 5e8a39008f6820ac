//! Retry with exponential backoff for idempotent reads
//!
//! Only catalog and settings fetches go through this; saves are sent exactly
//! once per user action.

use log::{debug, info, warn};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A single attempt, no retries
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Types of errors and their retry behavior
#[derive(Debug, Clone, PartialEq)]
pub enum RetryableError {
    /// Network-level errors (connection refused, DNS, reset)
    Network,
    /// HTTP 5xx server errors
    ServerError(u16),
    /// HTTP 429 Too Many Requests
    RateLimited,
    /// Request or HTTP 408 timeout
    Timeout,
    /// Non-retryable client errors (4xx except 408, 429)
    ClientError(u16),
    Unknown,
}

impl RetryableError {
    pub fn should_retry(&self) -> bool {
        match self {
            RetryableError::Network
            | RetryableError::ServerError(_)
            | RetryableError::RateLimited
            | RetryableError::Timeout => true,
            RetryableError::ClientError(_) | RetryableError::Unknown => false,
        }
    }

    pub fn from_status_code(status: u16) -> Self {
        match status {
            408 => RetryableError::Timeout,
            429 => RetryableError::RateLimited,
            400..=499 => RetryableError::ClientError(status),
            500..=599 => RetryableError::ServerError(status),
            _ => RetryableError::Unknown,
        }
    }

    pub fn from_reqwest_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            RetryableError::Timeout
        } else if error.is_connect() || error.is_request() {
            RetryableError::Network
        } else if let Some(status) = error.status() {
            Self::from_status_code(status.as_u16())
        } else {
            RetryableError::Unknown
        }
    }
}

/// A successful call whose result can still ask for another attempt
///
/// reqwest hands back `Ok` for every status code, so a 503 or 429 only shows
/// up once the response is inspected.
pub trait RetryStatus {
    fn retry_reason(&self) -> Option<RetryableError>;
}

impl RetryStatus for reqwest::Response {
    fn retry_reason(&self) -> Option<RetryableError> {
        let status = self.status();
        if status.is_success() {
            return None;
        }
        let reason = RetryableError::from_status_code(status.as_u16());
        reason.should_retry().then_some(reason)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails permanently or runs out of attempts
    ///
    /// A retryable status on the last attempt is handed back as `Ok` so the
    /// caller can still read the body.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
        T: RetryStatus,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if let Some(reason) = result.retry_reason() {
                        if attempt < max_attempts {
                            warn!("Request answered {:?} on attempt {}, retrying", reason, attempt);
                            tokio::time::sleep(self.calculate_delay(attempt)).await;
                            attempt += 1;
                            continue;
                        }
                        warn!("Request still answered {:?} after {} attempts", reason, attempt);
                    } else if attempt > 1 {
                        info!("Request succeeded after {} attempts", attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    let should_retry = RetryableError::from_reqwest_error(&error).should_retry();
                    if !should_retry || attempt >= max_attempts {
                        warn!(
                            "Request failed permanently on attempt {} (should_retry: {}): {}",
                            attempt, should_retry, error
                        );
                        return Err(error);
                    }

                    warn!("Request failed on attempt {} (retryable): {}", attempt, error);
                    let delay = self.calculate_delay(attempt);
                    debug!("Waiting {:?} before retry", delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = (self.config.base_delay.as_millis() as f64)
            * self.config.backoff_multiplier.powi(attempt as i32 - 1);

        let mut delay = Duration::from_millis(delay_ms as u64).min(self.config.max_delay);

        if self.config.jitter {
            let jitter_factor = rand::rng().random_range(0.5..=1.5);
            delay = Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64);
        }

        delay
    }
}
