//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus};
use super::widgets::{chat, header, input, spinner};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, chat, input
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Chat
            Constraint::Length(3), // Input
        ])
        .split(area);

    render_header(frame, main_layout[0], app);
    render_chat(frame, main_layout[1], app);
    render_input(frame, main_layout[2], app);
}

/// Renders the header bar.
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let widget = header::Header::new(app.database_info.as_deref());
    frame.render_widget(widget, area);
}

/// Renders the chat panel.
fn render_chat(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Chat;
    let mut widget = chat::ChatPanel::new(&app.messages, app.chat_scroll, focused);
    if app.is_processing {
        widget = widget.with_processing_label(spinner::Spinner::thinking().display());
    }
    frame.render_widget(widget, area);
}

/// Renders the input bar.
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Input;
    let widget = input::InputBar::new(&app.input.text, app.input.cursor, focused);
    frame.render_widget(widget, area);

    // Position cursor in input field when focused
    if focused {
        // Account for border (1) and prompt "> " (2)
        let cursor_x = area.x + 1 + 2 + app.input.cursor as u16;
        let cursor_y = area.y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}
