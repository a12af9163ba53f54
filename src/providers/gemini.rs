/*!
 * Client for the Gemini generateContent endpoint.
 *
 * Only `candidates[0].content.parts[0].text` of a response is consumed;
 * the remaining fields are modelled so that bodies decode without loss.
 */

use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use reqwest::{Client, header};
use log::{debug, error};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Gemini client for the generateContent endpoint
#[derive(Debug, Clone)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key, sent as the `key` query parameter
    api_key: String,
    /// Full generateContent URL
    endpoint: String,
}

/// One text fragment of a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Role of the message sender (user, model)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Message fragments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<TextPart>>,
}

/// generateContent request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiRequest {
    pub contents: Vec<Content>,
}

impl GeminiRequest {
    /// Single-turn user request carrying one prompt
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: Some(vec![TextPart { text: Some(prompt.into()) }]),
            }],
        }
    }

    /// The prompt text of the first part, if any
    pub fn prompt(&self) -> Option<&str> {
        self.contents.first()?
            .parts.as_ref()?
            .first()?
            .text.as_deref()
    }
}

/// Safety classification attached to candidates and prompt feedback
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyRating {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub probability: Option<String>,
}

/// One generated answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub safety_ratings: Option<Vec<SafetyRating>>,
}

/// Feedback about the prompt itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub safety_ratings: Option<Vec<SafetyRating>>,
}

/// generateContent response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// Why a 2xx body had no usable text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFailure {
    /// No candidates at all
    Empty,
    /// A candidate without content, parts or text
    Malformed,
}

impl GeminiResponse {
    /// Response whose first candidate carries `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            candidates: Some(vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: Some(vec![TextPart { text: Some(text.into()) }]),
                }),
                finish_reason: Some("STOP".to_string()),
                index: Some(0),
                safety_ratings: None,
            }]),
            prompt_feedback: None,
        }
    }

    /// `candidates[0].content.parts[0].text`, the only field the translator consumes
    pub fn first_text(&self) -> Result<&str, ExtractFailure> {
        let candidate = self.candidates.as_ref()
            .and_then(|candidates| candidates.first())
            .ok_or(ExtractFailure::Empty)?;

        candidate.content.as_ref()
            .and_then(|content| content.parts.as_ref())
            .and_then(|parts| parts.first())
            .and_then(|part| part.text.as_deref())
            .ok_or(ExtractFailure::Malformed)
    }
}

impl Gemini {
    /// Create a new Gemini client whose requests time out after `timeout`
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }

    /// Extract a Retry-After value given in seconds
    fn retry_after_secs(headers: &header::HeaderMap) -> Option<u64> {
        headers.get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
    }

    fn classify_send_error(error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(error.to_string())
        } else if error.is_connect() {
            ProviderError::ConnectionError(error.to_string())
        } else {
            ProviderError::RequestFailed(error.to_string())
        }
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn complete(&self, request: &GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let response = self.client.post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = Self::retry_after_secs(response.headers());
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text, retry_after));
        }

        let body = response.text().await
            .map_err(Self::classify_send_error)?;

        serde_json::from_str::<GeminiResponse>(&body).map_err(|e| {
            debug!("Unparsable Gemini body (first 500 chars): {}", body.chars().take(500).collect::<String>());
            ProviderError::ParseError(e.to_string())
        })
    }
}
