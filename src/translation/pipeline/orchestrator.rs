/*!
 * Pipeline orchestrator for translating a full list of entries.
 *
 * Entries are split into batches, dispatched with bounded concurrency and
 * flattened back in input order. The output always has the input's length,
 * and each output entry keeps the sequence number and timestamps of the
 * input entry at the same position.
 */

use std::sync::Arc;
use std::time::Instant;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::app_config::PipelineConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::Provider;
use crate::subtitle_processor::SubtitleEntry;
use crate::translation::batch::{BatchTranslator, create_batches};
use crate::translation::core::TranslationService;

/// Progress information during pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineProgress {
    /// Batches finished so far
    pub completed_batches: usize,

    /// Batches in this run
    pub total_batches: usize,
}

impl PipelineProgress {
    /// Completed share of the run (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.total_batches == 0 {
            1.0
        } else {
            self.completed_batches as f32 / self.total_batches as f32
        }
    }
}

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(PipelineProgress) + Send + Sync>;

/// The main translation pipeline orchestrator.
#[derive(Debug, Clone)]
pub struct TranslationPipeline {
    config: PipelineConfig,
    /// `None` when no API key is configured
    translator: Option<BatchTranslator>,
}

impl TranslationPipeline {
    /// Create a pipeline talking to the endpoint configured in `config`
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self, ProviderError> {
        let translator = if config.is_translation_enabled() {
            Some(BatchTranslator::new(TranslationService::new(&config)?, &config))
        } else {
            None
        };
        Ok(Self { config, translator })
    }

    /// Create a pipeline on top of a specific provider.
    ///
    /// Without an API key in `config` the provider is never called.
    pub fn with_provider(config: PipelineConfig, provider: Arc<dyn Provider>) -> Self {
        let translator = config.is_translation_enabled()
            .then(|| BatchTranslator::new(TranslationService::with_provider(provider, &config), &config));
        Self { config, translator }
    }

    /// Settings this pipeline was built with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Number of batches `entry_count` entries are split into
    pub fn batch_count(&self, entry_count: usize) -> usize {
        entry_count.div_ceil(self.config.batch_size.max(1))
    }

    /// Translate `entries` without progress reporting
    pub async fn translate(
        &self,
        entries: &[SubtitleEntry],
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        self.translate_with_progress(entries, cancel, None).await
    }

    /// Translate `entries`.
    ///
    /// Empty input yields empty output. Without an API key the entries are
    /// returned as-is with no translation set. Remote failures show up as
    /// markers in the output; only cancellation is returned as an error.
    pub async fn translate_with_progress(
        &self,
        entries: &[SubtitleEntry],
        cancel: &CancellationToken,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let Some(translator) = &self.translator else {
            error!("No API key configured; returning {} entries untranslated", entries.len());
            return Ok(entries.to_vec());
        };

        let start_time = Instant::now();
        let batches = create_batches(entries, self.config.batch_size);
        info!(
            "Translating {} entries to {} in {} batches (batch size {}, concurrency {})",
            entries.len(),
            self.config.target_language,
            batches.len(),
            self.config.batch_size,
            self.config.concurrent_requests
        );

        let translated = translator
            .translate_batches(&batches, cancel, |completed_batches, total_batches| {
                if let Some(callback) = &progress_callback {
                    callback(PipelineProgress { completed_batches, total_batches });
                }
            })
            .await?;

        info!(
            "Translation completed: {} entries in {:.2}s",
            translated.len(),
            start_time.elapsed().as_secs_f32()
        );
        Ok(translated)
    }
}
