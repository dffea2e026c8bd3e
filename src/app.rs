//! Interaction controller for sqlchat.
//!
//! Collects one question, triggers one blocking agent invocation, and
//! turns the response (or the failure) into chat messages for the UI.

use crate::agent::{AgentResponse, SqlAgent};
use crate::tui::app::ChatMessage;
use tracing::{error, info};

/// Help text displayed for the /help command.
const HELP_TEXT: &str = r#"Ask a question about the database in natural language,
e.g. "Who has the highest sugar level?"

Commands:
  /help            - Show this help message
  /clear           - Clear the chat history
  /quit, /exit     - Exit the application

Keyboard shortcuts:
  Ctrl+C, Ctrl+Q  - Exit application
  Tab             - Switch focus between panels
  Enter           - Submit question
  Esc             - Clear input
  Up/Down         - Scroll the chat (when focused)"#;

/// Result of processing user input.
#[derive(Debug)]
pub enum InputResult {
    /// No action needed (empty input).
    None,
    /// Messages to add to the chat.
    Messages(Vec<ChatMessage>),
    /// Chat history should be cleared.
    Clear,
    /// Application should exit.
    Exit,
}

/// The interaction controller.
///
/// Holds the agent as an injected dependency so tests can substitute a
/// stub collaborator.
pub struct Controller {
    agent: Box<dyn SqlAgent>,
}

impl Controller {
    /// Creates a new controller around the given agent.
    pub fn new(agent: Box<dyn SqlAgent>) -> Self {
        Self { agent }
    }

    /// Handles user input and returns the result.
    ///
    /// Empty input is a no-op; the agent is never invoked for it. Agent
    /// failures are caught here and rendered as an error banner; the
    /// interaction always terminates cleanly.
    pub async fn handle_input(&mut self, input: &str) -> InputResult {
        let input = input.trim();

        if input.is_empty() {
            return InputResult::None;
        }

        // Check for commands
        if input.starts_with('/') {
            return self.handle_command(input);
        }

        // Natural language question - one blocking agent invocation
        info!("Invoking agent");
        match self.agent.invoke(input).await {
            Ok(response) => InputResult::Messages(render_response(&response)),
            Err(e) => {
                error!("Agent invocation failed: {e}");
                InputResult::Messages(vec![ChatMessage::Error(format!("Error: {e}"))])
            }
        }
    }

    /// Handles a command (input starting with /).
    fn handle_command(&mut self, input: &str) -> InputResult {
        match input.to_lowercase().as_str() {
            "/help" => InputResult::Messages(vec![ChatMessage::System(HELP_TEXT.to_string())]),
            "/clear" => InputResult::Clear,
            "/quit" | "/exit" => InputResult::Exit,
            other => InputResult::Messages(vec![ChatMessage::Error(format!(
                "Unknown command: {}. Type /help for available commands.",
                other
            ))]),
        }
    }
}

/// Returns true if a tool input should be rendered as a SQL code block.
///
/// This is a substring heuristic, not a parser: it uppercases the input
/// and looks for "SELECT". It misclassifies non-SQL text that happens to
/// contain the word, and misses statements without a SELECT keyword.
/// Kept in one place so its limits are documented and testable.
pub fn looks_like_sql(input: &str) -> bool {
    input.to_uppercase().contains("SELECT")
}

/// Renders an agent response as chat messages.
///
/// The answer comes first as a success banner. When the trace is
/// non-empty, a section header follows, then per step (1-indexed): a
/// header naming the tool, the tool input as a SQL code block when it
/// passes [`looks_like_sql`], and the raw observation when non-empty.
pub fn render_response(response: &AgentResponse) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::Answer(response.output.clone())];

    if response.intermediate_steps.is_empty() {
        return messages;
    }

    messages.push(ChatMessage::System(
        "SQL queries and database output".to_string(),
    ));

    for (i, step) in response.intermediate_steps.iter().enumerate() {
        messages.push(ChatMessage::StepHeader {
            index: i + 1,
            tool: step.action.tool.clone(),
        });

        if looks_like_sql(&step.action.input) {
            messages.push(ChatMessage::Sql(step.action.input.clone()));
        }

        if !step.observation.is_empty() {
            messages.push(ChatMessage::Observation(step.observation.clone()));
        }
    }

    messages
}
