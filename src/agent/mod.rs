//! The SQL agent boundary for sqlchat.
//!
//! Defines the typed response model and the `SqlAgent` trait the
//! presentation layer calls, plus the live tool-loop implementation
//! and a stub for tests.

mod runner;
mod stub;
pub mod tools;

pub use runner::ToolLoopAgent;
pub use stub::StubAgent;

use crate::error::Result;
use async_trait::async_trait;

/// One tool invocation the agent decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAction {
    /// Name of the invoked tool (e.g., "sql_db_query").
    pub tool: String,
    /// Raw input passed to the tool. For the query tool this is SQL text.
    pub input: String,
}

impl AgentAction {
    /// Creates a new action.
    pub fn new(tool: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            input: input.into(),
        }
    }
}

/// One (action, observation) pair recorded during an agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStep {
    /// The tool invocation.
    pub action: AgentAction,
    /// The raw result of executing the tool's input.
    pub observation: String,
}

impl AgentStep {
    /// Creates a new step.
    pub fn new(action: AgentAction, observation: impl Into<String>) -> Self {
        Self {
            action,
            observation: observation.into(),
        }
    }
}

/// The agent's answer to one question.
///
/// `intermediate_steps` is always present (possibly empty) and ordered by
/// execution: one entry per tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentResponse {
    /// Final free-text answer.
    pub output: String,
    /// Ordered trace of tool invocations and their results.
    pub intermediate_steps: Vec<AgentStep>,
}

impl AgentResponse {
    /// Creates a response with only a final answer.
    pub fn answer(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            intermediate_steps: Vec::new(),
        }
    }

    /// Creates a response with a final answer and a step trace.
    pub fn with_steps(output: impl Into<String>, intermediate_steps: Vec<AgentStep>) -> Self {
        Self {
            output: output.into(),
            intermediate_steps,
        }
    }
}

/// Trait for agents that answer a natural-language question by deciding
/// and executing SQL tool calls.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait SqlAgent: Send + Sync {
    /// Runs the agent once for the given question, blocking until it
    /// produces a final answer or fails.
    async fn invoke(&self, question: &str) -> Result<AgentResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_response_answer() {
        let response = AgentResponse::answer("42");
        assert_eq!(response.output, "42");
        assert!(response.intermediate_steps.is_empty());
    }

    #[test]
    fn test_agent_response_with_steps() {
        let response = AgentResponse::with_steps(
            "Alice has the highest level",
            vec![AgentStep::new(
                AgentAction::new("sql_db_query", "SELECT * FROM patients"),
                "Alice,180",
            )],
        );

        assert_eq!(response.intermediate_steps.len(), 1);
        assert_eq!(response.intermediate_steps[0].action.tool, "sql_db_query");
        assert_eq!(response.intermediate_steps[0].observation, "Alice,180");
    }
}
