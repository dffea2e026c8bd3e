//! Terminal User Interface for sqlchat.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
pub mod headless;
mod ui;
pub mod widgets;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::app::{Controller, InputResult};
use crate::error::{Result, SqlchatError};
use crossterm::{
    event::KeyCode,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tracing::info;

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        let event_handler = EventHandler::new();

        Ok(Self {
            terminal,
            event_handler,
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| SqlchatError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| {
            SqlchatError::internal(format!("Failed to enter alternate screen: {e}"))
        })?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)
            .map_err(|e| SqlchatError::internal(format!("Failed to create terminal: {e}")))?;

        Ok(terminal)
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| SqlchatError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).map_err(|e| {
            SqlchatError::internal(format!("Failed to leave alternate screen: {e}"))
        })?;

        self.terminal
            .show_cursor()
            .map_err(|e| SqlchatError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the main TUI event loop with the interaction controller.
    pub async fn run(
        &mut self,
        database_info: Option<String>,
        mut controller: Controller,
    ) -> Result<()> {
        // Set up panic hook to restore terminal on panic
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let mut app_state = App::new(database_info);

        while app_state.running {
            // Draw the UI
            self.terminal
                .draw(|frame| ui::render(frame, &app_state))
                .map_err(|e| SqlchatError::internal(format!("Failed to draw: {e}")))?;

            // Handle the next event
            let event = self.event_handler.next()?;
            self.handle_event(event, &mut app_state, &mut controller)
                .await?;
        }

        // Restore panic hook
        let _ = panic::take_hook();

        Ok(())
    }

    /// Handles one event, submitting input to the controller on Enter.
    async fn handle_event(
        &mut self,
        event: Event,
        app_state: &mut App,
        controller: &mut Controller,
    ) -> Result<()> {
        if let Event::Key(key) = &event {
            if key.code == KeyCode::Enter && app_state.focus == app::Focus::Input {
                if let Some(input) = app_state.submit_input() {
                    self.process_input(&input, app_state, controller).await?;
                }
                return Ok(());
            }
        }

        app_state.handle_event(event);
        Ok(())
    }

    /// Submits one question and renders the outcome.
    ///
    /// The invocation blocks the interface: a processing frame is drawn
    /// first, then no further events are handled until the agent returns.
    async fn process_input(
        &mut self,
        input: &str,
        app_state: &mut App,
        controller: &mut Controller,
    ) -> Result<()> {
        app_state.add_message(app::ChatMessage::User(input.to_string()));
        app_state.is_processing = true;

        self.terminal
            .draw(|frame| ui::render(frame, app_state))
            .map_err(|e| SqlchatError::internal(format!("Failed to draw: {e}")))?;

        let result = controller.handle_input(input).await;
        app_state.is_processing = false;

        apply_input_result(result, app_state);
        Ok(())
    }
}

/// Applies a controller result to the application state.
pub fn apply_input_result(result: InputResult, app_state: &mut App) {
    match result {
        InputResult::None => {}
        InputResult::Messages(messages) => {
            for msg in messages {
                app_state.add_message(msg);
            }
        }
        InputResult::Clear => {
            app_state.clear_messages();
        }
        InputResult::Exit => {
            app_state.running = false;
        }
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the TUI application with the given controller.
pub async fn run(database_info: Option<String>, controller: Controller) -> Result<()> {
    info!("Starting TUI");
    let mut tui = Tui::new()?;
    tui.run(database_info, controller).await
}
