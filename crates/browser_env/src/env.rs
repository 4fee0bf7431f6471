use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{
    action::{Action, ElementId},
    config::TaskConfig,
    observation::Observation,
};

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("devtools protocol error: {0}")]
    Cdp(String),
    #[error("no active page")]
    NoActivePage,
    #[error("element [{0}] is not in the current observation")]
    UnknownElement(ElementId),
    #[error("tab index {index} is out of range ({open} open)")]
    TabOutOfRange { index: usize, open: usize },
    #[error("invalid key combination '{0}'")]
    InvalidKeys(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<chromiumoxide::error::CdpError> for EnvError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Cdp(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StepInfo {
    /// Why the action did not execute, when it did not.
    pub fail_error: Option<String>,
}

/// Result of one `step`.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

impl StepOutcome {
    /// Builds the outcome for `action` given whether it executed.
    pub fn after(action: &Action, observation: Observation, result: Result<(), EnvError>) -> Self {
        let (reward, fail_error) = match result {
            Ok(()) => (1.0, None),
            Err(err) => (0.0, Some(err.to_string())),
        };
        Self {
            observation,
            reward,
            terminated: action.is_stop(),
            truncated: false,
            info: StepInfo { fail_error },
        }
    }
}

/// A browser session that executes id-based actions and reports
/// accessibility-tree observations.
#[async_trait]
pub trait BrowserEnvironment: Send + Sync {
    /// Opens the task's start pages and returns the first observation.
    async fn reset(&mut self, config: &TaskConfig) -> Result<Observation, EnvError>;

    /// Executes one action. A failed action still yields `Ok` with zero reward.
    async fn step(&mut self, action: &Action) -> Result<StepOutcome, EnvError>;

    async fn current_url(&self) -> Result<String, EnvError>;

    fn observation(&self) -> &Observation;

    async fn close(self) -> Result<(), EnvError>
    where
        Self: Sized;
}

#[cfg(test)]
#[path = "tests/env_tests.rs"]
mod tests;
