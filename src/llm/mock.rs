//! Mock LLM client for testing.
//!
//! Provides deterministic responses without making real API calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::Result;
use crate::llm::types::{LlmResponse, Message, Role, ToolCall, ToolDefinition};
use crate::llm::LlmClient;

/// Mock LLM client that replays a script of responses.
///
/// Used for unit testing the agent loop without real API calls. When the
/// script is exhausted (or none was given), the client falls back to a
/// canned two-turn behavior: first a `sql_db_query` tool call, then a
/// final text answer once a tool result is present in the conversation.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<LlmResponse>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock client that replays the given responses in order.
    pub fn with_script(responses: Vec<LlmResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
        }
    }

    /// Default behavior when no script is configured.
    fn fallback_response(messages: &[Message]) -> LlmResponse {
        let has_tool_result = messages.iter().any(|m| m.role == Role::Tool);

        if has_tool_result {
            LlmResponse::text("Alice has the highest sugar level.")
        } else {
            LlmResponse::with_tool_calls(
                String::new(),
                vec![ToolCall {
                    id: "call_0".to_string(),
                    name: "sql_db_query".to_string(),
                    arguments:
                        r#"{"query":"SELECT name, sugar FROM patients ORDER BY sugar DESC LIMIT 1"}"#
                            .to_string(),
                }],
            )
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        if let Some(response) = self.script.lock().unwrap().pop_front() {
            return Ok(response);
        }

        Ok(Self::fallback_response(messages))
    }
}
