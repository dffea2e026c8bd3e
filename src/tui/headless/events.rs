//! Scripted event parsing for headless mode.
//!
//! Events are comma- or newline-separated tokens such as `type:hello`,
//! `key:enter`, or `wait:100`.

use crate::error::{Result, SqlchatError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::time::Duration;

/// A scripted headless event.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// Type a string of characters into the input.
    Type(String),
    /// Wait for the given duration.
    Wait(Duration),
    /// Resize the virtual terminal.
    Resize(u16, u16),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "key:{:?}", key.code),
            Self::Type(text) => write!(f, "type:{text}"),
            Self::Wait(duration) => write!(f, "wait:{}ms", duration.as_millis()),
            Self::Resize(w, h) => write!(f, "resize:{w}x{h}"),
        }
    }
}

/// Parses scripted events from text.
#[derive(Debug, Default)]
pub struct EventParser;

impl EventParser {
    /// Creates a new event parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses all events from a comma- or newline-separated string.
    ///
    /// Blank entries and lines starting with `#` are skipped.
    pub fn parse_all(&self, input: &str) -> Result<Vec<Event>> {
        input
            .split(['\n', ','])
            .map(str::trim)
            .filter(|entry| !entry.is_empty() && !entry.starts_with('#'))
            .map(|entry| self.parse_one(entry))
            .collect()
    }

    /// Parses a single event token.
    fn parse_one(&self, entry: &str) -> Result<Event> {
        let (kind, value) = entry.split_once(':').unwrap_or((entry, ""));

        match kind {
            "type" => Ok(Event::Type(value.to_string())),
            "key" => Self::parse_key(value),
            "wait" => {
                let ms: u64 = value
                    .parse()
                    .map_err(|_| SqlchatError::config(format!("Invalid wait duration: {value}")))?;
                Ok(Event::Wait(Duration::from_millis(ms)))
            }
            "resize" => {
                let (w, h) = value
                    .split_once('x')
                    .ok_or_else(|| SqlchatError::config(format!("Invalid resize: {value}")))?;
                let width = w
                    .parse()
                    .map_err(|_| SqlchatError::config(format!("Invalid width: {w}")))?;
                let height = h
                    .parse()
                    .map_err(|_| SqlchatError::config(format!("Invalid height: {h}")))?;
                Ok(Event::Resize(width, height))
            }
            other => Err(SqlchatError::config(format!(
                "Unknown event '{other}'. Expected type:, key:, wait:, or resize:"
            ))),
        }
    }

    /// Parses a key name into a key event.
    fn parse_key(name: &str) -> Result<Event> {
        let code = match name.to_lowercase().as_str() {
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "delete" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "ctrl-c" => {
                return Ok(Event::Key(KeyEvent::new(
                    KeyCode::Char('c'),
                    KeyModifiers::CONTROL,
                )))
            }
            "ctrl-q" => {
                return Ok(Event::Key(KeyEvent::new(
                    KeyCode::Char('q'),
                    KeyModifiers::CONTROL,
                )))
            }
            single if single.chars().count() == 1 => {
                KeyCode::Char(single.chars().next().unwrap())
            }
            other => {
                return Err(SqlchatError::config(format!("Unknown key: {other}")));
            }
        };

        Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_and_key() {
        let parser = EventParser::new();
        let events = parser.parse_all("type:hello,key:enter").unwrap();

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::Type(text) if text == "hello"));
        assert!(matches!(
            &events[1],
            Event::Key(key) if key.code == KeyCode::Enter
        ));
    }

    #[test]
    fn test_parse_newline_separated_with_comments() {
        let parser = EventParser::new();
        let events = parser
            .parse_all("# a comment\ntype:hi\n\nkey:tab")
            .unwrap();

        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_wait() {
        let parser = EventParser::new();
        let events = parser.parse_all("wait:250").unwrap();
        assert!(matches!(
            &events[0],
            Event::Wait(d) if *d == Duration::from_millis(250)
        ));
    }

    #[test]
    fn test_parse_resize() {
        let parser = EventParser::new();
        let events = parser.parse_all("resize:120x40").unwrap();
        assert!(matches!(&events[0], Event::Resize(120, 40)));
    }

    #[test]
    fn test_parse_ctrl_keys() {
        let parser = EventParser::new();
        let events = parser.parse_all("key:ctrl-c").unwrap();
        assert!(matches!(
            &events[0],
            Event::Key(key) if key.modifiers.contains(KeyModifiers::CONTROL)
        ));
    }

    #[test]
    fn test_parse_unknown_event_fails() {
        let parser = EventParser::new();
        assert!(parser.parse_all("click:button").is_err());
    }

    #[test]
    fn test_parse_unknown_key_fails() {
        let parser = EventParser::new();
        assert!(parser.parse_all("key:meta-x").is_err());
    }
}
