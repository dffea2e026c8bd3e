//! Tool definitions and the system prompt for the SQL agent.
//!
//! The agent exposes two read-only tools to the model: one that runs a
//! SQL query and one that lists the tables in the database.

use crate::llm::{ToolCall, ToolDefinition};
use serde::Deserialize;

/// Tool name for executing a SQL query.
pub const SQL_QUERY_TOOL: &str = "sql_db_query";

/// Tool name for listing database tables.
pub const LIST_TABLES_TOOL: &str = "sql_db_list_tables";

/// System prompt for the SQL agent loop.
pub const SYSTEM_PROMPT: &str = "\
You are a SQL assistant answering questions about a SQLite database.

You have two tools:
- sql_db_list_tables: lists the tables in the database. Takes no input.
- sql_db_query: executes a read-only SQL query and returns the rows.

Start by listing the tables if you are unsure of the schema. Only SELECT
queries are allowed; the query tool refuses anything that writes. When a
query fails, read the error and try a corrected query. Once you have the
data you need, answer the user's question in plain text without calling
any more tools.";

/// Input parameters for the sql_db_query tool.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlQueryInput {
    pub query: String,
}

/// Returns the tool definitions available to the model.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: SQL_QUERY_TOOL.to_string(),
            description: "Execute a read-only SQL query against the database and return \
                          the result rows as text. Input is a single SELECT statement."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The SQL query to execute"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: LIST_TABLES_TOOL.to_string(),
            description: "List the names of the tables in the database.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ]
}

/// Extracts the human-readable tool input from a tool call.
///
/// For the query tool this is the SQL text; for other tools it is the
/// raw argument payload (or empty for argument-less tools).
pub fn tool_input(call: &ToolCall) -> String {
    if call.name == SQL_QUERY_TOOL {
        if let Ok(input) = serde_json::from_str::<SqlQueryInput>(&call.arguments) {
            return input.query;
        }
    }

    match call.arguments.trim() {
        "" | "{}" | "null" => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions() {
        let tools = tool_definitions();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, SQL_QUERY_TOOL);
        assert_eq!(tools[1].name, LIST_TABLES_TOOL);
    }

    #[test]
    fn test_tool_input_extracts_query() {
        let call = ToolCall {
            id: "call_0".to_string(),
            name: SQL_QUERY_TOOL.to_string(),
            arguments: r#"{"query":"SELECT * FROM patients"}"#.to_string(),
        };

        assert_eq!(tool_input(&call), "SELECT * FROM patients");
    }

    #[test]
    fn test_tool_input_empty_arguments() {
        let call = ToolCall {
            id: "call_0".to_string(),
            name: LIST_TABLES_TOOL.to_string(),
            arguments: "{}".to_string(),
        };

        assert_eq!(tool_input(&call), "");
    }

    #[test]
    fn test_tool_input_malformed_arguments_fall_through() {
        let call = ToolCall {
            id: "call_0".to_string(),
            name: SQL_QUERY_TOOL.to_string(),
            arguments: "not json".to_string(),
        };

        assert_eq!(tool_input(&call), "not json");
    }
}
