//! Anthropic messages-API provider.
//!
//! The system prompt travels in a dedicated `system` field rather than
//! a message. There is no native JSON mode, so the structured path
//! appends the JSON-only instruction and relies on recovery.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use super::{
    factory::ProviderFactory, map_transport_error, recovery, require_non_empty,
    secrets::ApiCredential, status_error, AiProvider, GenerationRequest, ProviderError,
    JSON_ONLY_INSTRUCTION,
};

/// Environment variable name for the Anthropic API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Provider for Anthropic Claude models.
pub struct AnthropicProvider {
    credential: ApiCredential,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicProvider {
    /// Create a provider with an explicit key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::new(
                api_key,
                super::CredentialSource::Programmatic,
                "Anthropic API key",
            ),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from `ANTHROPIC_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(ANTHROPIC_API_KEY_ENV, "Anthropic API key")?;
        Ok(Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.options.max_tokens,
            system: system_prompt,
            messages: vec![WireMessage {
                role: "user",
                content: user_prompt,
            }],
            temperature: request.options.temperature,
        };

        tracing::debug!(model = %self.model, "dispatching anthropic messages request");

        // Expose the credential only here, at the header call site.
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", API_VERSION)
            .timeout(request.options.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, request.options.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_default();
            return Err(status_error(status.as_u16(), message));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let content = body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        require_non_empty(content)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.complete(&request.system_prompt, &request.user_prompt, request)
            .await
    }

    async fn generate_structured(
        &self,
        request: &GenerationRequest,
    ) -> Result<Map<String, JsonValue>, ProviderError> {
        // No native JSON mode: instruct, then recover.
        let user_prompt = format!("{}\n\n{}", request.user_prompt, JSON_ONLY_INSTRUCTION);
        let text = self
            .complete(&request.system_prompt, &user_prompt, request)
            .await?;
        recovery::recover_json(&text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Factory for Anthropic providers. Requires `ANTHROPIC_API_KEY`.
pub struct AnthropicProviderFactory;

impl ProviderFactory for AnthropicProviderFactory {
    fn backend_kind(&self) -> &'static str {
        "anthropic"
    }

    fn create(&self, model: &str) -> Result<Arc<dyn AiProvider>, ProviderError> {
        Ok(Arc::new(AnthropicProvider::from_env(model)?))
    }

    fn description(&self) -> &'static str {
        "Anthropic messages API"
    }
}
