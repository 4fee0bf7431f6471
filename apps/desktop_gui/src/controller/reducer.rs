//! Chat window state and the transitions backend events drive.

use super::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub category: UiErrorCategory,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub transcript: Vec<String>,
    pub status: String,
    pub status_banner: Option<StatusBanner>,
    /// Commands handed to the backend that have not produced output yet.
    /// Starts at one for the initialize the worker runs on startup.
    pub pending: usize,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            transcript: Vec::new(),
            status: "Starting browser...".to_string(),
            status_banner: None,
            pending: 1,
        }
    }
}

impl ChatState {
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Output(text) => {
                self.pending = self.pending.saturating_sub(1);
                self.transcript.push(text);
                self.status = "Ready".to_string();
                self.status_banner = None;
            }
            UiEvent::Error(err) => {
                self.pending = self.pending.saturating_sub(1);
                self.transcript.push(err.transcript_line());
                self.status = format!("{} error", err.category().label());
                self.status_banner = Some(banner_for(&err));
            }
        }
    }

    /// Records that a command was queued for the backend.
    pub fn command_sent(&mut self) {
        self.pending += 1;
        self.status = "Working...".to_string();
    }

    /// Raises the banner for a command the backend queue refused; the
    /// refusal text is already in `status`.
    pub fn command_refused(&mut self) {
        let err = UiError::from_message(UiErrorContext::General, self.status.clone());
        self.status_banner = Some(banner_for(&err));
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// The transcript as shown: blocks separated by a blank line.
    pub fn transcript_text(&self) -> String {
        self.transcript.join("\n\n")
    }

    pub fn dismiss_banner(&mut self) {
        self.status_banner = None;
    }
}

fn banner_for(err: &UiError) -> StatusBanner {
    StatusBanner {
        category: err.category(),
        message: format!("{}: {}", err.category().label(), err.message()),
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
