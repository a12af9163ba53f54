/*!
 * Core translation service implementation.
 *
 * `TranslationService` translates one batch: it builds the prompt, sends a
 * single request through the retry controller and reconciles the answer
 * with the batch. Remote failures never escape; they become markers on the
 * returned entries. Only cancellation is reported as an error.
 */

use std::sync::Arc;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::app_config::PipelineConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::gemini::ExtractFailure;
use crate::providers::{Gemini, GeminiRequest, Provider};
use crate::subtitle_processor::SubtitleEntry;

use super::prompts::TranslationPromptBuilder;
use super::response::{self, markers};
use super::retry::RetryPolicy;

/// Translation worker for a single batch
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Remote endpoint
    provider: Arc<dyn Provider>,

    /// Language name placed in the prompt
    target_language: String,

    /// Retry settings for the batch request
    retry: RetryPolicy,
}

impl TranslationService {
    /// Create a service talking to the Gemini endpoint from `config`
    pub fn new(config: &PipelineConfig) -> Result<Self, ProviderError> {
        let provider = Gemini::new(&config.api_key, &config.endpoint_url, config.request_timeout)?;
        Ok(Self::with_provider(Arc::new(provider), config))
    }

    /// Create a service on top of any provider
    pub fn with_provider(provider: Arc<dyn Provider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            target_language: config.target_language.clone(),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// Target language name used in prompts
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translate one batch.
    ///
    /// The result always has `batch.len()` entries in batch order. The only
    /// error is `TranslationError::Cancelled`.
    pub async fn translate_batch(
        &self,
        batch: &[SubtitleEntry],
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let range = response::sequence_range(batch);
        info!("Translating batch of {} entries (sequences {})", batch.len(), range);

        let prompt = TranslationPromptBuilder::new(&self.target_language)
            .with_entries(batch)
            .build();
        let request = GeminiRequest::from_prompt(prompt);

        let provider = &self.provider;
        let request = &request;
        let outcome = self.retry
            .run(&range, cancel, move || provider.complete(request))
            .await;

        match outcome {
            Ok(body) => match body.first_text() {
                Ok(text) => Ok(response::reconcile(batch, text.trim())),
                Err(ExtractFailure::Empty) => {
                    warn!("Empty response for batch {}", range);
                    Ok(response::mark_all(batch, markers::EMPTY_RESPONSE))
                },
                Err(ExtractFailure::Malformed) => {
                    warn!("Malformed response structure for batch {}", range);
                    Ok(response::mark_all(batch, markers::MALFORMED_RESPONSE))
                },
            },
            Err(TranslationError::Cancelled) => Err(TranslationError::Cancelled),
            Err(TranslationError::Provider(e)) => Ok(Self::soft_fail(batch, &range, &e)),
            Err(e) => {
                error!("Unexpected failure for batch {}: {}", range, e);
                Ok(response::mark_all(batch, markers::FALLBACK_ERROR))
            },
        }
    }

    /// Mark a whole batch after a provider failure the retry controller gave up on
    fn soft_fail(batch: &[SubtitleEntry], range: &str, e: &ProviderError) -> Vec<SubtitleEntry> {
        if e.is_http_response() {
            error!(
                "API error for batch {}: status {}, {}",
                range,
                e.status_code().map(|s| s.to_string()).unwrap_or_else(|| "?".to_string()),
                e
            );
            response::mark_all(batch, markers::API_ERROR)
        } else {
            error!("Request failed for batch {}: {}", range, e);
            response::mark_all(batch, markers::FALLBACK_ERROR)
        }
    }
}
