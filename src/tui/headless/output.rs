//! Output formatting for headless mode.
//!
//! Provides the text and JSON output formats.

use super::{HeadlessResult, HeadlessState};
use ratatui::buffer::Buffer;
use serde::Serialize;

/// Output format for headless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text output of the final screen.
    #[default]
    Text,
    /// JSON output with screen, state, and metadata.
    Json,
}

/// Renders a ratatui buffer to a string.
pub struct ScreenRenderer;

impl ScreenRenderer {
    /// Renders a buffer to a plain text string.
    pub fn render(buffer: &Buffer) -> String {
        let area = buffer.area;
        if area.height == 0 {
            return String::new();
        }

        let lines = (0..area.height)
            .map(|y| {
                let line = (0..area.width)
                    .map(|x| buffer.cell((x, y)).unwrap().symbol())
                    .collect::<Vec<_>>()
                    .join("");
                line.trim_end_matches(' ').to_string()
            })
            .collect::<Vec<_>>();

        let trimmed_lines = lines
            .into_iter()
            .rev()
            .skip_while(|line| line.is_empty())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>();

        let output_lines = if trimmed_lines.is_empty() {
            vec![String::new()]
        } else {
            trimmed_lines
        };

        format!("{}\n", output_lines.join("\n"))
    }
}

/// JSON output structure.
#[derive(Debug, Serialize)]
struct JsonOutput {
    screen: String,
    screen_lines: Vec<String>,
    events_executed: usize,
    duration_ms: u64,
    state: HeadlessState,
}

/// Formats headless execution results.
pub struct HeadlessOutput {
    format: OutputFormat,
}

impl HeadlessOutput {
    /// Creates a new output formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result according to the configured format.
    pub fn format(&self, result: &HeadlessResult) -> String {
        match self.format {
            OutputFormat::Text => self.format_text(result),
            OutputFormat::Json => self.format_json(result),
        }
    }

    /// Formats as plain text.
    fn format_text(&self, result: &HeadlessResult) -> String {
        format!(
            "{}\nEvents: {} executed in {}ms\n",
            result.screen,
            result.events_executed,
            result.duration.as_millis(),
        )
    }

    /// Formats as JSON.
    fn format_json(&self, result: &HeadlessResult) -> String {
        let json_output = JsonOutput {
            screen: result.screen.clone(),
            screen_lines: result.screen_lines.clone(),
            events_executed: result.events_executed,
            duration_ms: result.duration.as_millis() as u64,
            state: result.state.clone(),
        };

        serde_json::to_string_pretty(&json_output)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e))
    }
}
