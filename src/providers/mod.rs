/*!
 * Provider implementations for the remote translation endpoint.
 *
 * - `gemini`: HTTP client for the generateContent API
 * - `mock`: scripted in-process endpoint used by tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

pub use self::gemini::{Gemini, GeminiRequest, GeminiResponse};

/// Common trait for all LLM providers
///
/// The translation worker only depends on this trait, so the retry and
/// reconciliation logic can be exercised without a network.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<GeminiResponse, ProviderError>` - The decoded response body or a classified error
    async fn complete(&self, request: &GeminiRequest) -> Result<GeminiResponse, ProviderError>;
}

pub mod gemini;
pub mod mock;
