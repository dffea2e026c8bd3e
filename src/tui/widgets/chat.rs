//! Chat panel widget for the TUI.
//!
//! Displays the conversation: questions, answer banners, step headers,
//! SQL code blocks, raw observations, and error banners.

use crate::tui::app::ChatMessage;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Chat panel widget.
pub struct ChatPanel<'a> {
    messages: &'a [ChatMessage],
    /// Scroll offset in lines from the bottom.
    scroll: usize,
    focused: bool,
    /// Processing indicator text (shown as the last line when set).
    processing_label: Option<String>,
}

impl<'a> ChatPanel<'a> {
    /// Creates a new chat panel widget.
    pub fn new(messages: &'a [ChatMessage], scroll: usize, focused: bool) -> Self {
        Self {
            messages,
            scroll,
            focused,
            processing_label: None,
        }
    }

    /// Shows a processing indicator as the last line.
    pub fn with_processing_label(mut self, label: impl Into<String>) -> Self {
        self.processing_label = Some(label.into());
        self
    }
}

/// Builds the styled lines for a single chat message.
fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    match message {
        ChatMessage::User(text) => {
            let label = Span::styled(
                "You: ",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            );
            prefix_first_line(label, text, Style::default())
        }
        ChatMessage::Answer(text) => {
            let label = Span::styled(
                "✔ ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            );
            prefix_first_line(label, text, Style::default().fg(Color::Green))
        }
        ChatMessage::StepHeader { index, tool } => vec![Line::from(Span::styled(
            format!("Step {index}: tool {tool}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))],
        ChatMessage::Sql(sql) => sql
            .lines()
            .map(|line| {
                Line::from(Span::styled(
                    format!("  {line}"),
                    Style::default().fg(Color::Cyan),
                ))
            })
            .collect(),
        ChatMessage::Observation(text) => text
            .lines()
            .map(|line| Line::from(Span::styled(format!("  {line}"), Style::default())))
            .collect(),
        ChatMessage::Error(text) => {
            let label = Span::styled(
                "✘ ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            );
            prefix_first_line(label, text, Style::default().fg(Color::Red))
        }
        ChatMessage::System(text) => text
            .lines()
            .map(|line| {
                Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Gray),
                ))
            })
            .collect(),
    }
}

/// Splits multi-line text into lines, attaching a label span to the first.
fn prefix_first_line(label: Span<'static>, text: &str, style: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut text_lines = text.lines();

    let first = text_lines.next().unwrap_or("").to_string();
    lines.push(Line::from(vec![label, Span::styled(first, style)]));

    for line in text_lines {
        lines.push(Line::from(Span::styled(line.to_string(), style)));
    }

    lines
}

/// Builds all chat lines, including blank separators between messages.
pub fn build_lines(messages: &[ChatMessage]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, message) in messages.iter().enumerate() {
        if i > 0 && matches!(message, ChatMessage::User(_) | ChatMessage::Answer(_)) {
            lines.push(Line::from(""));
        }
        lines.extend(message_lines(message));
    }
    lines
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Chat ");

        let mut lines = build_lines(self.messages);
        if let Some(label) = &self.processing_label {
            lines.push(Line::from(Span::styled(
                label.clone(),
                Style::default().fg(Color::Yellow),
            )));
        }

        // Scroll from the bottom: skip `scroll` lines off the end
        let inner_height = area.height.saturating_sub(2) as usize;
        let total = lines.len();
        let end = total.saturating_sub(self.scroll);
        let start = end.saturating_sub(inner_height);
        let visible: Vec<Line> = lines[start..end].to_vec();

        let paragraph = Paragraph::new(visible).block(block);
        paragraph.render(area, buf);
    }
}
