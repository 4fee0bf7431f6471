//! Commands sent from the chat window to the backend worker.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Launch a fresh browser and reset it to the task in `config_file`.
    Initialize { config_file: PathBuf },
    /// Run one chat line through the controller.
    Perform { line: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "initialize",
            Self::Perform { .. } => "perform",
        }
    }
}
