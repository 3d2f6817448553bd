//! Google Gemini provider.
//!
//! The generateContent API has no system role: the system prompt is
//! prepended to the user prompt as a preamble. There is no strict JSON
//! mode either, so the structured path appends the JSON-only
//! instruction and relies on recovery.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use super::{
    factory::ProviderFactory, map_transport_error, recovery, require_non_empty,
    secrets::ApiCredential, status_error, AiProvider, GenerationRequest, ProviderError,
    JSON_ONLY_INSTRUCTION,
};

/// Environment variable name for the Gemini API key.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Provider for Google Gemini models.
pub struct GeminiProvider {
    credential: ApiCredential,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a provider with an explicit key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::new(
                api_key,
                super::CredentialSource::Programmatic,
                "Gemini API key",
            ),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from `GOOGLE_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(GOOGLE_API_KEY_ENV, "Gemini API key")?;
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

    async fn generate(
        &self,
        user_prompt: &str,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        // No system role: concatenate the preamble.
        let full_prompt = format!("{}\n\n{}", request.system_prompt, user_prompt);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &full_prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: request.options.temperature,
                max_output_tokens: request.options.max_tokens,
            },
        };

        tracing::debug!(model = %self.model, "dispatching gemini generateContent request");

        // The key travels in a header, not the URL, so it cannot leak
        // through request logging. Exposed only here.
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", self.credential.expose())
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

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let content = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        require_non_empty(content)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
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
impl AiProvider for GeminiProvider {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.generate(&request.user_prompt, request).await
    }

    async fn generate_structured(
        &self,
        request: &GenerationRequest,
    ) -> Result<Map<String, JsonValue>, ProviderError> {
        // No native JSON mode: instruct, then recover.
        let user_prompt = format!("{}\n\n{}", request.user_prompt, JSON_ONLY_INSTRUCTION);
        let text = self.generate(&user_prompt, request).await?;
        recovery::recover_json(&text)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Factory for Gemini providers. Requires `GOOGLE_API_KEY`.
pub struct GeminiProviderFactory;

impl ProviderFactory for GeminiProviderFactory {
    fn backend_kind(&self) -> &'static str {
        "gemini"
    }

    fn create(&self, model: &str) -> Result<Arc<dyn AiProvider>, ProviderError> {
        Ok(Arc::new(GeminiProvider::from_env(model)?))
    }

    fn description(&self) -> &'static str {
        "Google Gemini generateContent API"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_is_bound_to_kind_and_model() {
        let provider = GeminiProvider::new("test-key", "gemini-1.5-flash");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-1.5-flash");
    }

    #[test]
    fn api_key_not_in_debug_output() {
        let secret = "AIza-super-secret-key-12345";
        let provider = GeminiProvider::new(secret, "gemini-1.5-flash");

        let debug = format!("{provider:?}");
        assert!(!debug.contains(secret), "API key exposed in Debug output!");
        assert!(debug.contains("[REDACTED]"));
    }
}
