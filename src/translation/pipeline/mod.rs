/*!
 * Translation pipeline: batcher, dispatcher and worker composed over a
 * whole subtitle file.
 */

pub mod orchestrator;

// Re-export types used externally
pub use orchestrator::{PipelineProgress, TranslationPipeline};
