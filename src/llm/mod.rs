//! LLM integration for sqlchat.
//!
//! Provides the client trait and implementations for communicating with
//! the model provider behind the SQL agent.

pub mod gemini;
pub mod mock;
pub mod types;

pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::MockLlmClient;
pub use types::{LlmResponse, Message, Role, ToolCall, ToolDefinition};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::{Result, SqlchatError};
use crate::secrets::SecretStore;

/// Trait for LLM clients that can generate tool-calling completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages, allowing the model
    /// to request calls to the given tools.
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini.
    #[default]
    Gemini,
    /// Mock client for testing (no API key required).
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Creates an LLM client for the given provider and model.
///
/// The API key is sourced from the secret store (keyring, then environment).
pub fn create_llm_client(
    provider: LlmProvider,
    model: &str,
    secrets: &SecretStore,
) -> Result<Box<dyn LlmClient>> {
    match provider {
        LlmProvider::Gemini => {
            let api_key = secrets.api_key(provider.as_str()).ok_or_else(|| {
                SqlchatError::llm(
                    "No API key configured. Set GEMINI_API_KEY (or GOOGLE_API_KEY), \
                     or store one in the OS keyring.",
                )
            })?;
            Ok(Box::new(GeminiClient::new(GeminiConfig::new(
                api_key, model,
            ))?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(
            "gemini".parse::<LlmProvider>().unwrap(),
            LlmProvider::Gemini
        );
        assert_eq!(
            "Gemini".parse::<LlmProvider>().unwrap(),
            LlmProvider::Gemini
        );
        assert_eq!("mock".parse::<LlmProvider>().unwrap(), LlmProvider::Mock);
        assert!("unknown".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(format!("{}", LlmProvider::Gemini), "gemini");
        assert_eq!(format!("{}", LlmProvider::Mock), "mock");
    }

    #[test]
    fn test_provider_default() {
        assert_eq!(LlmProvider::default(), LlmProvider::Gemini);
    }

    #[test]
    fn test_create_mock_client() {
        let client = create_llm_client(LlmProvider::Mock, "ignored", &SecretStore::new());
        assert!(client.is_ok());
    }
}
