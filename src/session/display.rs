//! Observable display state and sinks that render it.

use serde::Serialize;

use crate::recognition::FingerCount;

/// Everything the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    /// Count of the latest frame (`null` when no hand).
    pub finger_count: FingerCount,
    /// Current problem, e.g. `"2 + 3 = ?"`.
    pub problem_text: String,
    /// Success indicator.
    pub success_visible: bool,
    /// "Try again" indicator.
    pub retry_visible: bool,
}

impl DisplayState {
    /// Initial display for a freshly seeded problem.
    #[must_use]
    pub fn new(problem_text: String) -> Self {
        Self {
            finger_count: FingerCount::Unknown,
            problem_text,
            success_visible: false,
            retry_visible: false,
        }
    }

    /// Finger count as shown on screen (`-` when no hand).
    #[must_use]
    pub fn finger_count_text(&self) -> String {
        self.finger_count.to_string()
    }
}

/// Receives display updates whenever they change.
pub trait DisplaySink {
    /// Renders the new display state.
    fn render(&mut self, display: &DisplayState);
}

impl<F: FnMut(&DisplayState)> DisplaySink for F {
    fn render(&mut self, display: &DisplayState) {
        self(display);
    }
}

/// Sink that keeps every rendered state.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    /// Rendered states, oldest first.
    pub frames: Vec<DisplayState>,
}

impl DisplaySink for RecordingDisplay {
    fn render(&mut self, display: &DisplayState) {
        self.frames.push(display.clone());
    }
}
