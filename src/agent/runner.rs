//! The live agent loop.
//!
//! `ToolLoopAgent` wires an LLM client and a database client: it asks the
//! model for the next action, executes the requested tool, feeds the
//! observation back, and stops when the model answers in plain text.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::agent::tools::{
    tool_definitions, tool_input, SqlQueryInput, LIST_TABLES_TOOL, SQL_QUERY_TOOL, SYSTEM_PROMPT,
};
use crate::agent::{AgentAction, AgentResponse, AgentStep, SqlAgent};
use crate::db::DatabaseClient;
use crate::error::{Result, SqlchatError};
use crate::llm::{LlmClient, Message, ToolCall};
use crate::safety::classify_sql;

/// Maximum number of model turns before giving up.
const MAX_STEPS: usize = 10;

/// LLM-driven SQL agent over a database handle.
pub struct ToolLoopAgent {
    llm: Box<dyn LlmClient>,
    db: Box<dyn DatabaseClient>,
    max_steps: usize,
}

impl ToolLoopAgent {
    /// Creates a new agent from an LLM client and a database client.
    pub fn new(llm: Box<dyn LlmClient>, db: Box<dyn DatabaseClient>) -> Self {
        Self {
            llm,
            db,
            max_steps: MAX_STEPS,
        }
    }

    /// Overrides the step bound (for tests).
    #[allow(dead_code)]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Executes a tool call and returns the observation text.
    ///
    /// Tool failures (bad SQL, blocked statements, unknown tools) become
    /// observations the model can react to; they do not abort the run.
    async fn execute_tool(&self, call: &ToolCall) -> String {
        match call.name.as_str() {
            SQL_QUERY_TOOL => self.execute_query_tool(call).await,
            LIST_TABLES_TOOL => match self.db.list_tables().await {
                Ok(tables) => tables.join(", "),
                Err(e) => format!("error: {e}"),
            },
            other => format!("error: unknown tool '{other}'"),
        }
    }

    /// Executes the sql_db_query tool with the read-only gate applied.
    async fn execute_query_tool(&self, call: &ToolCall) -> String {
        let sql = match serde_json::from_str::<SqlQueryInput>(&call.arguments) {
            Ok(input) => input.query,
            Err(_) => return "error: expected arguments {\"query\": \"...\"}".to_string(),
        };

        let classification = classify_sql(&sql);
        if !classification.is_read_only() {
            return format!(
                "error: only read-only queries are allowed; refusing {}",
                classification.statement
            );
        }

        match self.db.execute_query(&sql).await {
            Ok(result) => {
                debug!("Query returned {} rows", result.row_count);
                result.to_compact_text()
            }
            Err(e) => format!("error: {e}"),
        }
    }
}

#[async_trait]
impl SqlAgent for ToolLoopAgent {
    async fn invoke(&self, question: &str) -> Result<AgentResponse> {
        let tools = tool_definitions();
        let mut messages = vec![Message::system(SYSTEM_PROMPT), Message::user(question)];
        let mut steps: Vec<AgentStep> = Vec::new();

        for turn in 0..self.max_steps {
            let response = self.llm.complete_with_tools(&messages, &tools).await?;

            if !response.has_tool_calls() {
                info!(
                    "Agent finished after {} turn(s), {} step(s)",
                    turn + 1,
                    steps.len()
                );
                return Ok(AgentResponse::with_steps(response.content, steps));
            }

            messages.push(Message::assistant_with_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let observation = self.execute_tool(call).await;
                debug!(tool = %call.name, "Tool executed");

                steps.push(AgentStep::new(
                    AgentAction::new(&call.name, tool_input(call)),
                    observation.clone(),
                ));
                messages.push(Message::tool(&call.name, observation));
            }
        }

        Err(SqlchatError::agent(format!(
            "no final answer after {} steps",
            self.max_steps
        )))
    }
}
