//! Stub agent for testing and headless mode.
//!
//! Returns canned responses without touching an LLM or a database, and
//! counts invocations so tests can assert how often it was called.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::agent::{AgentAction, AgentResponse, AgentStep, SqlAgent};
use crate::error::{Result, SqlchatError};

/// A stub agent with a fixed response (or a fixed failure).
pub struct StubAgent {
    response: std::result::Result<AgentResponse, String>,
    invocations: Arc<AtomicUsize>,
}

impl StubAgent {
    /// Creates a stub that returns the given response on every invocation.
    pub fn with_response(response: AgentResponse) -> Self {
        Self {
            response: Ok(response),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a stub that fails every invocation with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates the stub used by `--mock-agent` headless runs: one SQL step
    /// over a sample patients table plus a plain-text answer.
    pub fn sample() -> Self {
        Self::with_response(AgentResponse::with_steps(
            "Alice has the highest sugar level.",
            vec![AgentStep::new(
                AgentAction::new(
                    "sql_db_query",
                    "SELECT name, sugar FROM patients ORDER BY sugar DESC LIMIT 1",
                ),
                "Alice,180",
            )],
        ))
    }

    /// Returns a handle to the invocation counter.
    pub fn invocation_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.invocations)
    }

    /// Returns how many times the agent has been invoked.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SqlAgent for StubAgent {
    async fn invoke(&self, _question: &str) -> Result<AgentResponse> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(SqlchatError::agent(message.clone())),
        }
    }
}
