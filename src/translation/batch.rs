/*!
 * Batch translation processing.
 *
 * `create_batches` splits entries into contiguous slices. `BatchTranslator`
 * dispatches those slices to the translation service with bounded
 * concurrency and a per-batch start delay, then restores input order.
 */

use futures::stream::{self, StreamExt, TryStreamExt};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::PipelineConfig;
use crate::errors::TranslationError;
use crate::subtitle_processor::SubtitleEntry;

use super::core::TranslationService;

/// Split `entries` into contiguous batches of `batch_size` (the last may be shorter)
pub fn create_batches(entries: &[SubtitleEntry], batch_size: usize) -> Vec<Vec<SubtitleEntry>> {
    entries.chunks(batch_size.max(1))
        .map(<[SubtitleEntry]>::to_vec)
        .collect()
}

/// Batch translator for processing subtitle entries in batches
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// The translation service to use
    service: TranslationService,

    /// Maximum number of batches in flight
    max_concurrent_requests: usize,

    /// Wait at the start of every batch, inside its concurrency slot
    inter_batch_delay: Duration,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(service: TranslationService, config: &PipelineConfig) -> Self {
        Self {
            service,
            max_concurrent_requests: config.concurrent_requests.max(1),
            inter_batch_delay: config.inter_batch_delay,
        }
    }

    /// Translate batches and flatten the results in input order.
    ///
    /// `progress_callback(done, total)` is invoked after each batch completes.
    /// On cancellation no new batch is started, in-flight work is dropped and
    /// `TranslationError::Cancelled` is returned.
    pub async fn translate_batches<F>(
        &self,
        batches: &[Vec<SubtitleEntry>],
        cancel: &CancellationToken,
        progress_callback: F,
    ) -> Result<Vec<SubtitleEntry>, TranslationError>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let total_batches = batches.len();
        let processed_batches = AtomicUsize::new(0);

        let service = &self.service;
        let delay = self.inter_batch_delay;
        let processed = &processed_batches;
        let progress = &progress_callback;

        let mut results = stream::iter(batches.iter().enumerate())
            .map(|(batch_index, batch)| async move {
                if cancel.is_cancelled() {
                    return Err(TranslationError::Cancelled);
                }

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(TranslationError::Cancelled),
                    _ = tokio::time::sleep(delay) => {},
                }

                let start_time = Instant::now();
                let entries = service.translate_batch(batch, cancel).await?;

                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                debug!("Batch {} of {} completed in {:?}", batch_index + 1, total_batches, start_time.elapsed());
                progress(current, total_batches);

                Ok((batch_index, entries))
            })
            .buffer_unordered(self.max_concurrent_requests)
            .try_collect::<Vec<_>>()
            .await?;

        // Sort results by batch index to maintain original order
        results.sort_by_key(|(index, _)| *index);

        Ok(results.into_iter().flat_map(|(_, entries)| entries).collect())
    }
}
