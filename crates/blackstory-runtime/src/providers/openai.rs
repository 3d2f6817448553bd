//! OpenAI chat-completions provider.
//!
//! Has both a system role and a native JSON mode
//! (`response_format: {"type": "json_object"}`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use super::{
    factory::ProviderFactory, map_transport_error, recovery, require_non_empty,
    secrets::ApiCredential, status_error, AiProvider, GenerationRequest, ProviderError,
};

/// Environment variable name for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider for OpenAI chat models.
pub struct OpenAiProvider {
    credential: ApiCredential,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a provider with an explicit key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::new(
                api_key,
                super::CredentialSource::Programmatic,
                "OpenAI API key",
            ),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from `OPENAI_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(OPENAI_API_KEY_ENV, "OpenAI API key")?;
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

    async fn chat(
        &self,
        request: &GenerationRequest,
        json_mode: bool,
    ) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                WireMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
            response_format: json_mode.then_some(ResponseFormat { type_: "json_object" }),
        };

        tracing::debug!(model = %self.model, json_mode, "dispatching openai chat request");

        // Expose the credential only here, at the header call site.
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.credential.expose())
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

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        require_non_empty(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    type_: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
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
impl AiProvider for OpenAiProvider {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.chat(request, false).await
    }

    async fn generate_structured(
        &self,
        request: &GenerationRequest,
    ) -> Result<Map<String, JsonValue>, ProviderError> {
        let text = self.chat(request, true).await?;
        recovery::recover_json(&text)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Factory for OpenAI providers. Requires `OPENAI_API_KEY`.
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn backend_kind(&self) -> &'static str {
        "openai"
    }

    fn create(&self, model: &str) -> Result<Arc<dyn AiProvider>, ProviderError> {
        Ok(Arc::new(OpenAiProvider::from_env(model)?))
    }

    fn description(&self) -> &'static str {
        "OpenAI chat-completions API"
    }
}
