/*!
 * Mock provider implementations for testing.
 *
 * This module provides a provider that never touches the network:
 * - `MockProvider::echo()` - Answers every batch with `<text> [tr]` segments
 * - `MockProvider::scripted(..)` - Plays back a fixed list of outcomes, repeating the last one
 * - `MockProvider::failing(status)` - Always answers with the given HTTP status
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{GeminiRequest, GeminiResponse, Provider};
use crate::translation::response::SEPARATOR;

// @const: Numbered input line of a batch prompt
static PROMPT_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?ms)^\d+\. "(.*?)"$"#).unwrap()
});

/// Outcome of a single scripted call
pub type MockOutcome = Result<GeminiResponse, ProviderError>;

/// Behavior mode for the mock provider
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Translate every prompt line to `<text> [tr]`
    Echo,
    /// Play back outcomes in order; the last one repeats forever
    Scripted(Arc<Mutex<VecDeque<MockOutcome>>>),
    /// Always fail with this HTTP status
    Failing { status_code: u16 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of `complete` calls seen
    request_count: Arc<AtomicUsize>,
    /// Every prompt received, in arrival order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Calls currently inside `complete`
    in_flight: Arc<AtomicUsize>,
    /// Highest value `in_flight` reached
    peak_in_flight: Arc<AtomicUsize>,
    /// Simulated latency computed from the prompt
    latency: Option<fn(&str) -> Duration>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            latency: None,
        }
    }

    /// Create a mock that answers every batch correctly
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that plays back `outcomes`
    pub fn scripted(outcomes: Vec<MockOutcome>) -> Self {
        Self::new(MockBehavior::Scripted(Arc::new(Mutex::new(outcomes.into()))))
    }

    /// Create a mock that answers a fixed text on every call
    pub fn replying(text: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(GeminiResponse::with_text(text))])
    }

    /// Create a failing mock provider that always errors with `status_code`
    pub fn failing(status_code: u16) -> Self {
        Self::new(MockBehavior::Failing { status_code })
    }

    /// Delay each call by an amount derived from its prompt
    pub fn with_latency(mut self, latency: fn(&str) -> Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping calls seen
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// The texts of a batch prompt's numbered lines
    pub fn prompt_lines(prompt: &str) -> Vec<String> {
        PROMPT_LINE_REGEX.captures_iter(prompt)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Generate a well-formed answer for a batch prompt
    pub fn echo_response(prompt: &str) -> String {
        Self::prompt_lines(prompt)
            .iter()
            .map(|line| format!("{} [tr]", line))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: &GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let prompt = request.prompt().unwrap_or_default().to_string();
        self.prompts.lock().push(prompt.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency(&prompt)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Echo => Ok(GeminiResponse::with_text(Self::echo_response(&prompt))),
            MockBehavior::Scripted(outcomes) => {
                let mut outcomes = outcomes.lock();
                match outcomes.len() {
                    0 => Err(ProviderError::RequestFailed("mock script is empty".to_string())),
                    1 => outcomes.front().cloned().unwrap_or_else(|| Ok(GeminiResponse::default())),
                    _ => outcomes.pop_front().unwrap_or_else(|| Ok(GeminiResponse::default())),
                }
            },
            MockBehavior::Failing { status_code } => {
                Err(ProviderError::from_status(*status_code, "mock failure", None))
            },
        }
    }
}
