//! Headless mode for automated testing.
//!
//! Runs the TUI without a terminal, executing scripted events against a
//! virtual screen and capturing the output for verification.

mod events;
mod output;

pub use events::{Event, EventParser};
pub use output::OutputFormat;
pub use output::{HeadlessOutput, ScreenRenderer};

use crate::app::Controller;
use crate::cli::Cli;
use crate::error::{Result, SqlchatError};
use crate::tui::app::{App, ChatMessage};
use crate::tui::ui;
use crossterm::event::KeyCode;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::time::{Duration, Instant};

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Screen width in columns.
    pub width: u16,
    /// Screen height in rows.
    pub height: u16,
    /// Output format.
    pub output_format: OutputFormat,
    /// Path to write output (None = stdout).
    pub output_file: Option<std::path::PathBuf>,
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = cli.parse_screen_size().map_err(SqlchatError::config)?;
        let output_format = cli.parse_output_format().map_err(SqlchatError::config)?;

        Ok(Self {
            width,
            height,
            output_format: match output_format {
                crate::cli::OutputFormat::Text => OutputFormat::Text,
                crate::cli::OutputFormat::Json => OutputFormat::Json,
            },
            output_file: cli.output_file.clone(),
        })
    }
}

/// Result of headless execution.
#[derive(Debug)]
pub struct HeadlessResult {
    /// Final screen content as text.
    pub screen: String,
    /// Screen lines for JSON output.
    pub screen_lines: Vec<String>,
    /// Number of events executed.
    pub events_executed: usize,
    /// Total execution duration.
    pub duration: Duration,
    /// Application state snapshot.
    pub state: HeadlessState,
}

/// Snapshot of application state for JSON output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HeadlessState {
    /// Current input text.
    pub input_text: String,
    /// Current focus panel.
    pub focus: String,
    /// Whether the app is processing.
    pub is_processing: bool,
    /// Number of messages in chat.
    pub message_count: usize,
    /// Whether the app is still running.
    pub running: bool,
}

impl HeadlessState {
    fn from_app(app: &App) -> Self {
        Self {
            input_text: app.input.text.clone(),
            focus: format!("{:?}", app.focus),
            is_processing: app.is_processing,
            message_count: app.messages.len(),
            running: app.running,
        }
    }
}

/// Runs the TUI in headless mode.
pub struct HeadlessRunner {
    terminal: Terminal<TestBackend>,
    app: App,
    controller: Controller,
    events: Vec<Event>,
    start_time: Instant,
}

impl HeadlessRunner {
    /// Creates a new headless runner with the given configuration and controller.
    pub fn new(config: &HeadlessConfig, controller: Controller) -> Result<Self> {
        let backend = TestBackend::new(config.width, config.height);
        let terminal = Terminal::new(backend)
            .map_err(|e| SqlchatError::internal(format!("Failed to create test terminal: {e}")))?;

        Ok(Self {
            terminal,
            app: App::new(None),
            controller,
            events: Vec::new(),
            start_time: Instant::now(),
        })
    }

    /// Sets the database info shown in the header.
    pub fn with_database_info(mut self, info: Option<String>) -> Self {
        self.app.database_info = info;
        self
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        let parser = EventParser::new();
        self.events = parser.parse_all(input)?;
        Ok(())
    }

    /// Loads events from a script file.
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| SqlchatError::internal(format!("Failed to read stdin: {e}")))?;
            buffer
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| SqlchatError::internal(format!("Failed to read script file: {e}")))?
        };

        self.load_events(&content)
    }

    /// Runs the headless execution and returns the result.
    pub async fn run(mut self) -> Result<HeadlessResult> {
        self.start_time = Instant::now();

        let events = std::mem::take(&mut self.events);
        let mut events_executed = 0;

        for event in events {
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Enter {
                        self.handle_enter().await;
                    } else {
                        self.app.handle_event(crate::tui::Event::Key(*key_event));
                    }
                }
                Event::Type(text) => {
                    for c in text.chars() {
                        self.app.input.insert(c);
                    }
                }
                Event::Wait(duration) => {
                    tokio::time::sleep(*duration).await;
                }
                Event::Resize(w, h) => {
                    self.terminal
                        .resize(ratatui::layout::Rect::new(0, 0, *w, *h))
                        .map_err(|e| SqlchatError::internal(format!("Resize failed: {e}")))?;
                }
            }

            events_executed += 1;

            // Render after each event
            self.terminal
                .draw(|frame| ui::render(frame, &self.app))
                .map_err(|e| SqlchatError::internal(format!("Failed to render: {e}")))?;

            // Check if app has exited
            if !self.app.running {
                break;
            }
        }

        // Final render
        self.terminal
            .draw(|frame| ui::render(frame, &self.app))
            .map_err(|e| SqlchatError::internal(format!("Failed to render: {e}")))?;

        let screen = self.render_screen();
        let screen_lines = screen.lines().map(String::from).collect();

        Ok(HeadlessResult {
            screen,
            screen_lines,
            events_executed,
            duration: self.start_time.elapsed(),
            state: HeadlessState::from_app(&self.app),
        })
    }

    /// Handles Enter key press: submits the input through the controller.
    async fn handle_enter(&mut self) {
        if let Some(input) = self.app.submit_input() {
            self.app.add_message(ChatMessage::User(input.clone()));
            self.app.is_processing = true;

            let result = self.controller.handle_input(&input).await;
            self.app.is_processing = false;

            crate::tui::apply_input_result(result, &mut self.app);
        }
    }

    /// Renders the current screen to a string.
    fn render_screen(&self) -> String {
        ScreenRenderer::render(self.terminal.backend().buffer())
    }
}

/// Runs headless mode from CLI arguments with the given controller.
pub async fn run_headless(
    cli: &Cli,
    controller: Controller,
    database_info: Option<String>,
) -> Result<i32> {
    cli.validate_headless().map_err(SqlchatError::config)?;

    let config = HeadlessConfig::from_cli(cli)?;
    let mut runner = HeadlessRunner::new(&config, controller)?.with_database_info(database_info);

    // Load events
    if let Some(ref events_str) = cli.events {
        runner.load_events(events_str)?;
    } else if let Some(ref script_path) = cli.script {
        runner.load_script(script_path)?;
    }

    let result = runner.run().await?;

    // Generate output
    let output = HeadlessOutput::new(config.output_format);
    let output_str = output.format(&result);

    // Write output
    if let Some(ref path) = config.output_file {
        std::fs::write(path, &output_str)
            .map_err(|e| SqlchatError::internal(format!("Failed to write output file: {e}")))?;
    } else {
        print!("{}", output_str);
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentAction, AgentResponse, AgentStep, StubAgent};

    fn test_config() -> HeadlessConfig {
        HeadlessConfig {
            width: 80,
            height: 24,
            output_format: OutputFormat::Text,
            output_file: None,
        }
    }

    fn stub_controller() -> Controller {
        Controller::new(Box::new(StubAgent::with_response(
            AgentResponse::with_steps(
                "Alice has the highest sugar level.",
                vec![AgentStep::new(
                    AgentAction::new(
                        "sql_db_query",
                        "SELECT name FROM patients ORDER BY sugar DESC LIMIT 1",
                    ),
                    "Alice,180",
                )],
            ),
        )))
    }

    #[tokio::test]
    async fn test_headless_submit_renders_answer_and_trace() {
        let mut runner = HeadlessRunner::new(&test_config(), stub_controller()).unwrap();
        runner
            .load_events("type:Who has the highest sugar level?,key:enter")
            .unwrap();

        let result = runner.run().await.unwrap();

        assert!(result.screen.contains("Alice has the highest sugar level."));
        assert!(result.screen.contains("Step 1: tool sql_db_query"));
        assert!(result.screen.contains("SELECT name FROM patients"));
        assert!(result.screen.contains("Alice,180"));
        assert!(!result.state.is_processing);
    }

    #[tokio::test]
    async fn test_headless_enter_on_empty_input_is_noop() {
        let agent = StubAgent::with_response(AgentResponse::answer("unused"));
        let counter = agent.invocation_counter();
        let controller = Controller::new(Box::new(agent));

        let mut runner = HeadlessRunner::new(&test_config(), controller).unwrap();
        runner.load_events("key:enter,key:enter").unwrap();

        let result = runner.run().await.unwrap();

        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);
        // Only the welcome message
        assert_eq!(result.state.message_count, 1);
    }

    #[tokio::test]
    async fn test_headless_error_banner() {
        let controller = Controller::new(Box::new(StubAgent::failing("rate limited")));

        let mut runner = HeadlessRunner::new(&test_config(), controller).unwrap();
        runner.load_events("type:anything,key:enter").unwrap();

        let result = runner.run().await.unwrap();

        assert!(result.screen.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_headless_quit_command_stops_run() {
        let mut runner = HeadlessRunner::new(&test_config(), stub_controller()).unwrap();
        runner.load_events("type:/quit,key:enter,type:after").unwrap();

        let result = runner.run().await.unwrap();

        assert!(!result.state.running);
        // The trailing type event is not executed
        assert_eq!(result.events_executed, 2);
    }
}
