//! Local-inference provider speaking the Ollama chat API.
//!
//! The only backend with no credential: it talks to a local daemon.
//! It has both a real system role and a native JSON mode
//! (`format: "json"`), so the structured path is a mode flag rather
//! than a prompt instruction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use super::{
    factory::ProviderFactory, map_transport_error, recovery, require_non_empty, status_error,
    AiProvider, GenerationRequest, ProviderError,
};

/// Environment variable overriding the local daemon address.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Provider for models served by a local Ollama daemon.
#[derive(Debug)]
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for `model`, honoring `OLLAMA_HOST` if set.
    pub fn new(model: impl Into<String>) -> Self {
        let base_url =
            std::env::var(OLLAMA_HOST_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at a non-default daemon address.
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
            stream: false,
            format: json_mode.then_some("json"),
            options: ChatOptions {
                temperature: request.options.temperature,
                num_predict: request.options.max_tokens,
            },
        };

        tracing::debug!(model = %self.model, json_mode, "dispatching ollama chat request");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(request.options.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, request.options.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error: ErrorBody = response.json().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), error.error));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        require_non_empty(body.message.content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

#[async_trait]
impl AiProvider for OllamaProvider {
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
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Factory for local Ollama providers.
pub struct OllamaProviderFactory;

impl ProviderFactory for OllamaProviderFactory {
    fn backend_kind(&self) -> &'static str {
        "ollama"
    }

    fn create(&self, model: &str) -> Result<Arc<dyn AiProvider>, ProviderError> {
        Ok(Arc::new(OllamaProvider::new(model)))
    }

    fn description(&self) -> &'static str {
        "Local models served by an Ollama daemon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_is_bound_to_kind_and_model() {
        let provider = OllamaProvider::new("llama3.2");
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "llama3.2");
    }

    #[test]
    fn base_url_can_be_overridden() {
        let provider = OllamaProvider::new("llama3.2").with_base_url("http://remote:11434");
        assert_eq!(provider.base_url, "http://remote:11434");
    }
}
