/*!
 * Retry controller for remote calls.
 *
 * Only HTTP 429, 500, 502, 503 and 504 (timeouts count as 504) are retried.
 * Rate-limit failures back off on a fixed power-of-two schedule in seconds;
 * everything else doubles the configured initial backoff. Every wait is
 * capped at the configured maximum.
 */

use std::future::Future;
use std::time::Duration;
use log::{error, warn};
use tokio_util::sync::CancellationToken;

use crate::app_config::PipelineConfig;
use crate::errors::{ProviderError, TranslationError};

/// Exponent cap for the rate-limit schedule (2^6 = 64 seconds)
const MAX_RATE_LIMIT_EXPONENT: u32 = 6;

/// Backoff and cap settings for one batch's requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Prefer the server's Retry-After on 429
    pub honor_retry_after: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            honor_retry_after: config.honor_retry_after,
        }
    }

    /// Wait before retry `attempt` (1-indexed) following `error`
    pub fn backoff(&self, error: &ProviderError, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);

        let wait = match error {
            ProviderError::RateLimitExceeded { retry_after_secs, .. } => {
                match retry_after_secs {
                    Some(secs) if self.honor_retry_after => Duration::from_secs(*secs),
                    _ => Duration::from_secs(1u64 << exponent.min(MAX_RATE_LIMIT_EXPONENT)),
                }
            },
            _ => self.initial_backoff.saturating_mul(2u32.saturating_pow(exponent)),
        };

        wait.min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out.
    ///
    /// The last provider error is returned on exhaustion. Cancellation aborts
    /// both the in-flight call and any pending backoff.
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, TranslationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TranslationError::Cancelled),
                result = operation() => result,
            };

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(error.into());
            }

            if attempt >= self.max_retries {
                error!(
                    "Failed to translate batch {} after {} retries. Last error: {}",
                    label, self.max_retries, error
                );
                return Err(error.into());
            }

            attempt += 1;
            let wait = self.backoff(&error, attempt);
            warn!(
                "Retrying batch {} attempt {}/{} after {}ms. Reason: {}",
                label, attempt, self.max_retries, wait.as_millis(), error
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TranslationError::Cancelled),
                _ = tokio::time::sleep(wait) => {},
            }
        }
    }
}
