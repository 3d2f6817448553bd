//! LLM provider abstractions for blackstory-runtime.
//!
//! One adapter per backend, each conforming to the same two-operation
//! generation capability. Adapters are thin mappers from the canonical
//! [`GenerationRequest`] to a backend wire shape; all normalization
//! (answer canonicalization, JSON recovery defaults) lives outside the
//! adapters so they stay substitutable.
//!
//! ## Security
//!
//! All cloud providers use the [`secrets`] module for credential
//! handling. See [`ApiCredential`] for the patterns.

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;
use thiserror::Error;

mod anthropic;
mod factory;
mod gemini;
mod ollama;
mod openai;
pub mod recovery;
pub mod secrets;

pub use anthropic::{AnthropicProvider, AnthropicProviderFactory, ANTHROPIC_API_KEY_ENV};
pub use factory::{ProviderFactory, ProviderRegistry, BACKEND_KINDS};
pub use gemini::{GeminiProvider, GeminiProviderFactory, GOOGLE_API_KEY_ENV};
pub use ollama::{OllamaProvider, OllamaProviderFactory, OLLAMA_HOST_ENV};
pub use openai::{OpenAiProvider, OpenAiProviderFactory, OPENAI_API_KEY_ENV};
pub use secrets::{ApiCredential, CredentialSource};

/// Errors from LLM providers.
///
/// Three classes matter to callers:
/// - configuration (`NotConfigured`): a caller mistake detectable
///   before any network call,
/// - backend (`Http`, `Api`, `Auth`, `EmptyResponse`, `Timeout`): a
///   runtime failure of one specific call,
/// - parse (`Parse`): structured output could not be recovered.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed")]
    Auth,

    #[error("Backend returned an empty completion")]
    EmptyResponse,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Could not recover a JSON object from response: {raw}")]
    Parse { raw: String },
}

impl ProviderError {
    /// A caller configuration mistake, raised before any network call.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }

    /// A runtime failure of a specific backend call.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Api { .. } | Self::Auth | Self::EmptyResponse | Self::Timeout(_)
        )
    }
}

/// Backend tuning parameters for one request.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature; `None` lets the backend pick its default
    pub temperature: Option<f32>,

    /// Per-call timeout applied at the HTTP layer
    pub timeout: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// A prompt pair plus tuning options. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// The uniform generation capability every backend hides behind.
///
/// Each adapter maps the request to its own role model: a system-role
/// message where the wire supports one, a concatenated preamble where
/// it does not.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Send the prompt pair and return the raw completion text.
    ///
    /// Fails with a backend-class error on transport failure, auth
    /// failure, or an empty completion.
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, ProviderError>;

    /// Request a JSON-shaped reply and return it as a key/value map.
    ///
    /// Backends with a native JSON mode pass the mode flag; the rest
    /// append an explicit JSON-only instruction and post-process
    /// through [`recovery`]. Fails with [`ProviderError::Parse`] when
    /// the final text still does not parse as a JSON object.
    async fn generate_structured(
        &self,
        request: &GenerationRequest,
    ) -> Result<Map<String, JsonValue>, ProviderError>;

    /// Backend kind identifier for logging and reports.
    fn name(&self) -> &str;

    /// Model this handle is bound to.
    fn model(&self) -> &str;
}

/// Instruction appended for backends without a native JSON mode.
pub(crate) const JSON_ONLY_INSTRUCTION: &str =
    "Responde SOLAMENTE con un objeto JSON válido, sin ningún texto antes ni después.";

/// Map a reqwest transport failure onto the provider error taxonomy.
pub(crate) fn map_transport_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::Http(err.to_string())
    }
}

/// Reject empty completions; every backend treats them as a failure.
pub(crate) fn require_non_empty(text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyResponse)
    } else {
        Ok(text)
    }
}

/// Map an HTTP status onto the provider error taxonomy.
pub(crate) fn status_error(status: u16, message: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Auth,
        _ => ProviderError::Api { status, message },
    }
}
