//! Processing indicator for the TUI.
//!
//! Shows an animated "Thinking..." label while an agent invocation is
//! in flight.

use std::time::Instant;

/// Dot animation frames for agent thinking.
const DOT_FRAMES: &[&str] = &["", ".", "..", "..."];

/// Animation speed in milliseconds per frame.
const FRAME_DURATION_MS: u128 = 300;

/// Spinner state for the processing indicator.
#[derive(Debug, Clone)]
pub struct Spinner {
    /// When the spinner started.
    start_time: Instant,
    /// Label to display with the spinner.
    label: String,
}

impl Spinner {
    /// Creates a new spinner with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            label: label.into(),
        }
    }

    /// Creates the agent-thinking spinner.
    pub fn thinking() -> Self {
        Self::new("Thinking")
    }

    /// Returns the current frame of the animation.
    pub fn frame(&self) -> &'static str {
        let elapsed_ms = self.start_time.elapsed().as_millis();
        let frame_index = (elapsed_ms / FRAME_DURATION_MS) as usize;
        DOT_FRAMES[frame_index % DOT_FRAMES.len()]
    }

    /// Returns the display string for the spinner.
    pub fn display(&self) -> String {
        format!("{}{}", self.label, self.frame())
    }

    /// Returns the label.
    pub fn label(&self) -> &str {
        &self.label
    }
}
