//! Secure credential handling for LLM providers.
//!
//! Every cloud backend takes its API key through [`ApiCredential`]:
//!
//! - **No accidental logging**: credentials cannot appear in
//!   Debug/Display output
//! - **Memory safety**: credentials are zeroed on drop
//! - **Explicit exposure**: the value leaves the wrapper only through
//!   `.expose()`, at the HTTP header call site
//!
//! The core never inspects or logs credentials; they flow opaquely from
//! the environment into the provider constructors.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
///
/// Useful for diagnosing configuration issues without exposing the
/// credential value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a credential value.
    ///
    /// The value is immediately wrapped in `SecretString` and cannot be
    /// accidentally logged after this point.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from an environment variable.
    ///
    /// `name` is the human-readable label used in error messages, e.g.
    /// "OpenAI API key". Fails with the config-class error when the
    /// variable is unset.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        std::env::var(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .map_err(|_| {
                ProviderError::NotConfigured(format!(
                    "{name} not set: configure '{env_var}' environment variable"
                ))
            })
    }

    /// Expose the credential value for use in an API call.
    ///
    /// Only call this at the point where the credential is actually
    /// needed; never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_redacted_in_debug() {
        let secret = "sk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, CredentialSource::Programmatic, "Test API key");

        let debug = format!("{cred:?}");
        assert!(!debug.contains(secret), "Secret exposed in Debug!");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn credential_redacted_in_display() {
        let secret = "sk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, CredentialSource::Programmatic, "Test API key");

        let display = format!("{cred}");
        assert!(!display.contains(secret), "Secret exposed in Display!");
        assert!(display.contains("[REDACTED]"));
        assert!(display.contains("Test API key"));
    }

    #[test]
    fn credential_exposes_explicitly() {
        let cred = ApiCredential::new("key", CredentialSource::Programmatic, "Test");
        assert_eq!(cred.expose(), "key");
        assert!(!cred.is_empty());
        assert!(ApiCredential::new("", CredentialSource::Programmatic, "Test").is_empty());
    }

    #[test]
    fn missing_env_var_is_a_config_error() {
        let result = ApiCredential::from_env("NONEXISTENT_VAR_12345", "Test key");
        match result {
            Err(err) => {
                assert!(err.is_config());
                assert!(err.to_string().contains("NONEXISTENT_VAR_12345"));
            }
            Ok(_) => panic!("expected config error"),
        }
    }
}
