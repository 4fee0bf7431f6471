//! UI/backend events and error modeling for the chat window.

use browser_env::EnvError;
use harness::{CommandError, ControllerError};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Status-line text that does not belong in the transcript.
    Info(String),
    /// A block of transcript text: welcome, observation or step feedback.
    Output(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Browser,
    Element,
    Syntax,
    Transport,
    Unknown,
}

impl UiErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Browser => "Browser",
            Self::Element => "Element",
            Self::Syntax => "Command syntax",
            Self::Transport => "Transport",
            Self::Unknown => "Unexpected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Initialize,
    Perform,
    General,
}

impl UiErrorContext {
    /// Transcript line the chat window shows for an error in this context.
    pub fn transcript_line(self, message: &str) -> String {
        match self {
            Self::BackendStartup => format!("Backend worker startup failure: {message}"),
            Self::Initialize => format!("Error initializing browser: {message}"),
            Self::Perform => format!("Error performing action: {message}"),
            Self::General => message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_controller(context: UiErrorContext, err: &ControllerError) -> Self {
        let category = match err {
            ControllerError::NotInitialized => UiErrorCategory::Browser,
            ControllerError::Command(CommandError::ElementNotFound(_)) => UiErrorCategory::Element,
            ControllerError::Command(_) => UiErrorCategory::Syntax,
            ControllerError::Env(env) => env_category(env),
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("not found")
            || message_lower.contains("not in the current observation")
        {
            UiErrorCategory::Element
        } else if message_lower.contains("unknown action")
            || message_lower.contains("invalid")
            || message_lower.contains("empty command")
        {
            UiErrorCategory::Syntax
        } else if message_lower.contains("disconnect")
            || message_lower.contains("queue is full")
            || message_lower.contains("channel")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("browser")
            || message_lower.contains("devtools")
            || message_lower.contains("page")
            || message_lower.contains("tab")
        {
            UiErrorCategory::Browser
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn transcript_line(&self) -> String {
        self.context.transcript_line(&self.message)
    }
}

fn env_category(err: &EnvError) -> UiErrorCategory {
    match err {
        EnvError::UnknownElement(_) => UiErrorCategory::Element,
        EnvError::InvalidKeys(_) => UiErrorCategory::Syntax,
        EnvError::Launch(_)
        | EnvError::Cdp(_)
        | EnvError::NoActivePage
        | EnvError::TabOutOfRange { .. }
        | EnvError::Config(_)
        | EnvError::Io { .. } => UiErrorCategory::Browser,
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
