//! API key lookup via OS keyring with environment fallback.
//!
//! The LLM API key is sourced from the OS keyring when available, then
//! from `GEMINI_API_KEY` / `GOOGLE_API_KEY` environment variables.

use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "sqlchat";

/// Environment variables consulted for the Gemini API key, in order.
const GEMINI_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Manages lookup of secrets (API keys).
#[derive(Debug, Clone, Default)]
pub struct SecretStore;

impl SecretStore {
    /// Creates a new secret store.
    pub fn new() -> Self {
        Self
    }

    /// Looks up the API key for the given provider.
    ///
    /// Checks the OS keyring first (entry `llm:{provider}`), then the
    /// provider's environment variables. Returns `None` when neither is set.
    pub fn api_key(&self, provider: &str) -> Option<String> {
        if let Some(key) = self.keyring_lookup(&Self::llm_api_key(provider)) {
            debug!("API key for '{provider}' found in keyring");
            return Some(key);
        }

        for var in GEMINI_KEY_ENV_VARS {
            if let Ok(key) = std::env::var(var) {
                if !key.is_empty() {
                    debug!("API key for '{provider}' found in ${var}");
                    return Some(key);
                }
            }
        }

        None
    }

    /// Retrieves a secret from the keyring, treating any failure as absence.
    fn keyring_lookup(&self, key: &str) -> Option<String> {
        let entry = Entry::new(SERVICE_NAME, key).ok()?;
        entry.get_password().ok()
    }

    /// Generates a keyring key for an LLM API key.
    pub fn llm_api_key(provider: &str) -> String {
        format!("llm:{}", provider)
    }

    /// Masks a secret for display, showing only the last 4 characters.
    pub fn mask_secret(secret: &str) -> String {
        if secret.len() <= 4 {
            "*".repeat(secret.len())
        } else {
            format!("{}...{}", "*".repeat(4), &secret[secret.len() - 4..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret_short() {
        assert_eq!(SecretStore::mask_secret("abc"), "***");
    }

    #[test]
    fn test_mask_secret_long() {
        assert_eq!(
            SecretStore::mask_secret("AIza1234567890abcdef"),
            "****...cdef"
        );
    }

    #[test]
    fn test_llm_api_key() {
        assert_eq!(SecretStore::llm_api_key("gemini"), "llm:gemini");
    }
}
