//! Header bar widget for the TUI.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Header bar showing the application name and the open database.
pub struct Header<'a> {
    database_info: Option<&'a str>,
}

impl<'a> Header<'a> {
    /// Creates a new header widget.
    pub fn new(database_info: Option<&'a str>) -> Self {
        Self { database_info }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let info_style = Style::default().fg(Color::Gray);

        let info = match self.database_info {
            Some(db) => format!(" {db}"),
            None => " no database".to_string(),
        };

        let line = Line::from(vec![
            Span::styled(" sqlchat ", title_style),
            Span::styled("|", Style::default().fg(Color::DarkGray)),
            Span::styled(info, info_style),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
