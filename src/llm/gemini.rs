//! Gemini LLM client implementation.
//!
//! Implements the LlmClient trait for Google's Gemini API using the
//! generateContent endpoint with function calling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, SqlchatError};
use crate::llm::types::{LlmResponse, Message, Role, ToolCall, ToolDefinition};
use crate::llm::LlmClient;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Maximum number of retry attempts for transient errors.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Sampling temperature. Fixed to the most deterministic setting.
const TEMPERATURE: f32 = 0.0;

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model to use (e.g., "gemini-2.5-pro").
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Creates a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Gemini LLM client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Creates a new Gemini client with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SqlchatError::llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `GEMINI_API_KEY` for the API key.
    /// Optionally reads `GEMINI_MODEL` for the model (defaults to "gemini-2.5-pro").
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| SqlchatError::llm("GEMINI_API_KEY environment variable not set"))?;

        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-pro".to_string());

        Self::new(GeminiConfig::new(api_key, model))
    }

    /// Returns the generateContent endpoint URL for the configured model.
    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.config.model)
    }

    /// Extracts the system instruction and converts remaining messages to
    /// Gemini content entries.
    fn convert_messages(messages: &[Message]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
        let mut system = None;
        let mut contents = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => {
                    // Gemini uses a separate systemInstruction field
                    system = Some(GeminiContent {
                        role: None,
                        parts: vec![GeminiPart::text(&msg.content)],
                    });
                }
                Role::User => {
                    contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![GeminiPart::text(&msg.content)],
                    });
                }
                Role::Assistant => {
                    let mut parts = Vec::new();
                    if !msg.content.is_empty() {
                        parts.push(GeminiPart::text(&msg.content));
                    }
                    for call in &msg.tool_calls {
                        parts.push(GeminiPart::function_call(call));
                    }
                    contents.push(GeminiContent {
                        role: Some("model".to_string()),
                        parts,
                    });
                }
                Role::Tool => {
                    let name = msg.tool_name.clone().unwrap_or_default();
                    contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![GeminiPart::function_response(&name, &msg.content)],
                    });
                }
            }
        }

        (system, contents)
    }

    /// Converts tool definitions to Gemini function declarations.
    fn convert_tools(tools: &[ToolDefinition]) -> Option<Vec<GeminiTool>> {
        if tools.is_empty() {
            return None;
        }

        Some(vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|t| GeminiFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                })
                .collect(),
        }])
    }

    /// Parses an API error response and returns (error, is_retryable).
    fn parse_error(status: reqwest::StatusCode, body: &str) -> (SqlchatError, bool) {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return (
                SqlchatError::llm("Authentication failed. Check your GEMINI_API_KEY."),
                false,
            );
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return (
                SqlchatError::llm("Rate limited. Please wait and try again."),
                true, // Rate limits are retryable
            );
        }

        // 5xx errors are generally retryable
        let is_retryable = status.is_server_error();

        // Try to parse error message from response
        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            return (
                SqlchatError::llm(format!("Gemini API error: {}", error_response.error.message)),
                is_retryable,
            );
        }

        (
            SqlchatError::llm(format!("Gemini API error ({}): {}", status, body)),
            is_retryable,
        )
    }

    /// Determines if a request error is retryable.
    fn is_retryable_request_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }

    /// Converts a Gemini response into our LlmResponse shape.
    fn convert_response(response: GeminiResponse) -> Result<LlmResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| SqlchatError::llm("No response from Gemini"))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for (i, part) in candidate.content.parts.into_iter().enumerate() {
            if let Some(text) = part.text {
                content.push_str(&text);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall {
                    // Gemini does not assign call IDs; synthesize positional ones
                    id: format!("call_{i}"),
                    name: call.name,
                    arguments: call.args.to_string(),
                });
            }
        }

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let (system_instruction, contents) = Self::convert_messages(messages);

        let request = GeminiRequest {
            system_instruction,
            contents,
            tools: Self::convert_tools(tools),
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!(
                "Gemini API request attempt {} of {}",
                attempt, MAX_RETRY_ATTEMPTS
            );

            let result = self
                .client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.config.api_key)
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.map_err(|e| {
                        SqlchatError::llm(format!("Failed to read response: {}", e))
                    })?;

                    if status.is_success() {
                        let response: GeminiResponse =
                            serde_json::from_str(&body).map_err(|e| {
                                SqlchatError::llm(format!("Failed to parse response: {}", e))
                            })?;

                        return Self::convert_response(response);
                    }

                    let (error, is_retryable) = Self::parse_error(status, &body);
                    last_error = Some(error);

                    if !is_retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        break;
                    }

                    warn!(
                        "Gemini API request failed (attempt {}), retrying in {:?}: {}",
                        attempt, delay, status
                    );
                }
                Err(e) => {
                    let is_retryable = Self::is_retryable_request_error(&e);
                    let error = if e.is_timeout() {
                        SqlchatError::llm("Request timed out. Try again.")
                    } else if e.is_connect() {
                        SqlchatError::llm("Failed to connect to Gemini API. Check your network.")
                    } else {
                        SqlchatError::llm(format!("Request failed: {}", e))
                    };
                    last_error = Some(error);

                    if !is_retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        break;
                    }

                    warn!(
                        "Gemini API request failed (attempt {}), retrying in {:?}",
                        attempt, delay
                    );
                }
            }

            tokio::time::sleep(delay).await;
            delay *= 2; // Exponential backoff
        }

        Err(last_error.expect("at least one attempt was made"))
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(content: &str) -> Self {
        Self {
            text: Some(content.to_string()),
            ..Self::default()
        }
    }

    fn function_call(call: &ToolCall) -> Self {
        let args = serde_json::from_str(&call.arguments)
            .unwrap_or_else(|_| serde_json::json!({ "input": call.arguments.clone() }));
        Self {
            function_call: Some(GeminiFunctionCall {
                name: call.name.clone(),
                args,
            }),
            ..Self::default()
        }
    }

    fn function_response(name: &str, content: &str) -> Self {
        Self {
            function_response: Some(GeminiFunctionResponse {
                name: name.to_string(),
                // The response field must be a JSON object
                response: serde_json::json!({ "result": content }),
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = GeminiConfig::new("AIza-test", "gemini-2.5-pro");
        assert_eq!(config.api_key, "AIza-test");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_with_timeout() {
        let config = GeminiConfig::new("AIza-test", "gemini-2.5-pro").with_timeout(120);
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(GeminiConfig::new("k", "gemini-2.5-pro")).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_convert_messages_separates_system() {
        let messages = vec![
            Message::system("You are a SQL assistant."),
            Message::user("Who has the highest sugar level?"),
        ];

        let (system, contents) = GeminiClient::convert_messages(&messages);

        assert!(system.is_some());
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
    }

    #[test]
    fn test_convert_messages_tool_roundtrip() {
        let messages = vec![
            Message::user("question"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_0".to_string(),
                    name: "sql_db_query".to_string(),
                    arguments: r#"{"query":"SELECT 1"}"#.to_string(),
                }],
            ),
            Message::tool("sql_db_query", "1"),
        ];

        let (_, contents) = GeminiClient::convert_messages(&messages);

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1].role.as_deref(), Some("model"));
        assert!(contents[1].parts[0].function_call.is_some());
        assert!(contents[2].parts[0].function_response.is_some());
    }

    #[test]
    fn test_convert_response_with_function_call() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"functionCall": {"name": "sql_db_query", "args": {"query": "SELECT * FROM patients"}}}]
                }
            }]
        }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        let converted = GeminiClient::convert_response(response).unwrap();

        assert!(converted.has_tool_calls());
        assert_eq!(converted.tool_calls[0].name, "sql_db_query");
        assert!(converted.tool_calls[0].arguments.contains("SELECT"));
    }

    #[test]
    fn test_convert_response_text_only() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Alice has the highest level"}]
                }
            }]
        }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        let converted = GeminiClient::convert_response(response).unwrap();

        assert!(!converted.has_tool_calls());
        assert_eq!(converted.content, "Alice has the highest level");
    }

    #[test]
    fn test_convert_response_empty() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(GeminiClient::convert_response(response).is_err());
    }

    #[test]
    fn test_parse_error_unauthorized() {
        let (error, is_retryable) =
            GeminiClient::parse_error(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(error.to_string().contains("Authentication failed"));
        assert!(!is_retryable);
    }

    #[test]
    fn test_parse_error_rate_limited() {
        let (error, is_retryable) =
            GeminiClient::parse_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "");
        assert!(error.to_string().contains("Rate limited"));
        assert!(is_retryable);
    }

    #[test]
    fn test_parse_error_with_message() {
        let body = r#"{"error":{"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let (error, _) = GeminiClient::parse_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(error.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_parse_error_server_error_is_retryable() {
        let (_, is_retryable) =
            GeminiClient::parse_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(is_retryable);
    }

    #[test]
    fn test_request_serialization_is_camel_case() {
        let request = GeminiRequest {
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::text("system")],
            }),
            contents: vec![],
            tools: None,
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("systemInstruction"));
        assert!(json.contains("generationConfig"));
        assert!(!json.contains("tools"));
    }
}
