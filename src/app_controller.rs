use anyhow::{Result, Context, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::errors::{SubtitleError, TranslationError};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::Provider;
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::{PipelineProgress, TranslationPipeline};

// @module: Application controller for subtitle processing

/// Options for one `translate` run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Output directory; defaults to each input file's own directory
    pub output_dir: Option<PathBuf>,
    /// Overwrite existing translations
    pub force_overwrite: bool,
    /// Emit with SRT validation
    pub validate: bool,
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Output written to this path
    Translated(PathBuf),
    /// Output already existed at this path
    Skipped(PathBuf),
    /// Input could not be parsed or had no entries
    Failed,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared translation pipeline
    pipeline: TranslationPipeline,
    // @field: Draw progress bars on stderr
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let pipeline = TranslationPipeline::new(config.pipeline_config())
            .context("Failed to create translation pipeline")?;
        Ok(Self { config, pipeline, show_progress: true })
    }

    /// Create a controller whose pipeline uses `provider` instead of the configured endpoint
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let pipeline = TranslationPipeline::with_provider(config.pipeline_config(), provider);
        Ok(Self { config, pipeline, show_progress: false })
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The configuration this controller runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate an SRT file, or every SRT file below a directory.
    ///
    /// Blocks until all files are done. Unparsable files are logged and
    /// counted as failed; cancellation and write failures end the run.
    pub async fn run(&self, input: &Path, options: &RunOptions, cancel: &CancellationToken) -> Result<RunSummary> {
        let start_time = Instant::now();

        let files = FileManager::find_srt_files(input)?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input));
        }

        let multi_progress = self.multi_progress();
        let folder_pb = (files.len() > 1).then(|| {
            let pb = multi_progress.add(ProgressBar::new(files.len() as u64));
            pb.set_style(Self::bar_style("files"));
            pb
        });

        let mut summary = RunSummary::default();
        for file in &files {
            if let Some(pb) = &folder_pb {
                let file_name = file.file_name()
                    .map(|f| f.to_string_lossy().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                pb.set_message(format!("Processing: {}", file_name));
            }

            let output_dir = match &options.output_dir {
                Some(dir) => Self::mirrored_output_dir(dir, input, file),
                None => file.parent().map(Path::to_path_buf).unwrap_or_default(),
            };

            match self.translate_file(file, &output_dir, options, cancel, &multi_progress).await? {
                FileOutcome::Translated(_) => summary.translated += 1,
                FileOutcome::Skipped(_) => summary.skipped += 1,
                FileOutcome::Failed => summary.failed += 1,
            }

            if let Some(pb) = &folder_pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = folder_pb {
            pb.finish_and_clear();
        }

        info!(
            "Done: {} translated, {} skipped, {} failed in {}",
            summary.translated, summary.skipped, summary.failed,
            Self::format_duration(start_time.elapsed())
        );
        Ok(summary)
    }

    /// Parse, translate and write a single file
    pub async fn translate_file(
        &self,
        input_file: &Path,
        output_dir: &Path,
        options: &RunOptions,
        cancel: &CancellationToken,
        multi_progress: &MultiProgress,
    ) -> Result<FileOutcome> {
        let language_code = language_utils::output_code(&self.config.target_language);
        let output_path = FileManager::generate_output_path(input_file, output_dir, &language_code, "srt");
        if output_path.exists() && !options.force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite): {}", output_path.display());
            return Ok(FileOutcome::Skipped(output_path));
        }

        let subtitles = match SubtitleCollection::from_srt_file(input_file) {
            Ok(subtitles) => subtitles,
            Err(SubtitleError::Skipped { path }) => {
                warn!("Skipping directory: {}", path);
                return Ok(FileOutcome::Skipped(output_path));
            },
            Err(e) => {
                error!("Failed to parse {}: {}", input_file.display(), e);
                return Ok(FileOutcome::Failed);
            },
        };

        if subtitles.entries.is_empty() {
            error!("{}: {}", input_file.display(), TranslationError::InputMissing);
            return Ok(FileOutcome::Failed);
        }

        info!("Translating {} ({} entries)", input_file.display(), subtitles.entries.len());
        let translation_start = Instant::now();

        let total_batches = self.pipeline.batch_count(subtitles.entries.len());
        let progress_bar = multi_progress.add(ProgressBar::new(total_batches as u64));
        progress_bar.set_style(Self::bar_style("batches"));
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let result = self.pipeline
            .translate_with_progress(
                &subtitles.entries,
                cancel,
                Some(Box::new(move |progress: PipelineProgress| pb.set_position(progress.completed_batches as u64))),
            )
            .await;
        progress_bar.finish_and_clear();

        let translated = result.with_context(|| format!("Translation of {} did not complete", input_file.display()))?;

        let output = SubtitleCollection { source_file: input_file.to_path_buf(), entries: translated };
        output.write_to_srt(&output_path, options.validate)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(translation_start.elapsed())
        );
        Ok(FileOutcome::Translated(output_path))
    }

    // Keep a file's subfolder below the input root so equal stems never share an output path
    fn mirrored_output_dir(output_root: &Path, input_root: &Path, file: &Path) -> PathBuf {
        file.parent()
            .and_then(|parent| parent.strip_prefix(input_root).ok())
            .map(|relative| output_root.join(relative))
            .unwrap_or_else(|| output_root.to_path_buf())
    }

    fn multi_progress(&self) -> MultiProgress {
        if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        }
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
