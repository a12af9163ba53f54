/*!
 * Subtitle translation through a remote generative-text endpoint.
 *
 * - `batch`: batching and bounded-concurrency dispatch
 * - `core`: translation of a single batch
 * - `pipeline`: whole-file orchestration with cancellation
 * - `prompts`: prompt template and builder
 * - `response`: reconciliation of delimited responses with their batch
 * - `retry`: retry classification and backoff
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, create_batches};
pub use self::core::TranslationService;
pub use self::pipeline::{PipelineProgress, TranslationPipeline};
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};
pub use self::retry::RetryPolicy;

// Submodules
pub mod batch;
pub mod core;
pub mod pipeline;
pub mod prompts;
pub mod response;
pub mod retry;
