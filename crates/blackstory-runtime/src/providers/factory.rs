//! Provider factory and registry.
//!
//! The registry maps a backend-kind identifier plus a model name to a
//! constructed adapter. It fails closed: an unrecognized kind is a
//! configuration error raised before any network call, distinguishable
//! from a runtime backend failure.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    anthropic::AnthropicProviderFactory, gemini::GeminiProviderFactory,
    ollama::OllamaProviderFactory, openai::OpenAiProviderFactory, AiProvider, ProviderError,
};

/// The four supported backend kinds.
pub const BACKEND_KINDS: [&str; 4] = ["ollama", "gemini", "anthropic", "openai"];

/// Factory for creating providers of one backend kind.
///
/// Each factory validates its own preconditions (credentials in the
/// environment) and constructs a handle bound to the given model.
pub trait ProviderFactory: Send + Sync {
    /// Unique backend-kind identifier, e.g. "anthropic".
    fn backend_kind(&self) -> &'static str;

    /// Create a provider handle for `model`.
    fn create(&self, model: &str) -> Result<Arc<dyn AiProvider>, ProviderError>;

    /// Human-readable description of this backend.
    fn description(&self) -> &'static str {
        "LLM provider"
    }
}

/// Registry of available provider factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all four built-in backends registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OllamaProviderFactory));
        registry.register(Arc::new(GeminiProviderFactory));
        registry.register(Arc::new(AnthropicProviderFactory));
        registry.register(Arc::new(OpenAiProviderFactory));
        registry
    }

    /// Register a factory, replacing any existing one of the same kind.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories
            .insert(factory.backend_kind().to_string(), factory);
    }

    /// Create a provider handle for (backend kind, model).
    ///
    /// Fails with [`ProviderError::NotConfigured`] for an unknown kind.
    pub fn create(
        &self,
        backend_kind: &str,
        model: &str,
    ) -> Result<Arc<dyn AiProvider>, ProviderError> {
        self.factories
            .get(backend_kind)
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "Unknown backend kind: '{}'. Available: {:?}",
                    backend_kind,
                    self.available_kinds()
                ))
            })?
            .create(model)
    }

    /// List registered backend kinds.
    pub fn available_kinds(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Check whether a backend kind is registered.
    pub fn has_backend(&self, backend_kind: &str) -> bool {
        self.factories.contains_key(backend_kind)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("backends", &self.available_kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{anthropic, gemini, openai};

    fn seed_credentials() {
        std::env::set_var(anthropic::ANTHROPIC_API_KEY_ENV, "test-anthropic-key");
        std::env::set_var(openai::OPENAI_API_KEY_ENV, "test-openai-key");
        std::env::set_var(gemini::GOOGLE_API_KEY_ENV, "test-google-key");
    }

    #[test]
    fn all_four_backend_kinds_construct() {
        seed_credentials();
        let registry = ProviderRegistry::with_defaults();

        for kind in BACKEND_KINDS {
            let provider = registry
                .create(kind, "some-model")
                .unwrap_or_else(|e| panic!("{kind} failed to construct: {e}"));
            assert_eq!(provider.name(), kind);
            assert_eq!(provider.model(), "some-model");
        }
    }

    #[test]
    fn unknown_backend_kind_is_a_config_error() {
        let registry = ProviderRegistry::with_defaults();
        let result = registry.create("mistral", "some-model");

        match result {
            Err(err) => {
                assert!(err.is_config(), "expected config error, got {err:?}");
                assert!(!err.is_backend());
                assert!(err.to_string().contains("mistral"));
            }
            Ok(_) => panic!("expected unknown backend kind to fail"),
        }
    }

    #[test]
    fn registry_lists_registered_kinds() {
        let registry = ProviderRegistry::with_defaults();
        assert!(registry.has_backend("ollama"));
        assert!(!registry.has_backend("mistral"));

        let mut kinds = registry.available_kinds();
        kinds.sort_unstable();
        assert_eq!(kinds, vec!["anthropic", "gemini", "ollama", "openai"]);
    }
}
