/*!
 * # gemsub - SRT subtitle translation through the Gemini API
 *
 * A Rust library that parses SRT subtitle files in any common encoding,
 * translates their dialogue in batches through a remote generative-text
 * endpoint, and writes translated SRT files back out.
 *
 * ## Features
 *
 * - Charset detection for legacy-encoded subtitle files
 * - Tolerant SRT parsing and strict or lenient SRT emission
 * - Batched translation with bounded concurrency and per-batch throttling
 * - Retry with capped exponential backoff on rate limits and server errors
 * - Output that always matches the input entry for entry, with markers
 *   where a translation could not be obtained
 * - Cooperative cancellation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `charset`: Encoding detection and decoding
 * - `subtitle_processor`: SRT parsing and emission
 * - `translation`: Batch translation:
 *   - `translation::batch`: Batching and dispatch
 *   - `translation::core`: Single-batch worker
 *   - `translation::pipeline`: Whole-file orchestration
 *   - `translation::prompts`: Prompt construction
 *   - `translation::response`: Response reconciliation
 *   - `translation::retry`: Retry policy
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Remote endpoint clients:
 *   - `providers::gemini`: Gemini generateContent client
 *   - `providers::mock`: In-process endpoint for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod charset;
pub mod file_utils;
pub mod subtitle_processor;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{Config, PipelineConfig};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translation::{TranslationPipeline, TranslationService};
pub use language_utils::{output_code, resolve_language_name};
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
