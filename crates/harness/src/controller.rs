use std::{fmt, future::Future, path::Path};

use browser_env::{BrowserEnvironment, EnvError, Observation, TaskConfig};
use thiserror::Error;
use tracing::{info, warn};

use crate::command::{Command, CommandError};

pub const WELCOME_MESSAGE: &str = "Welcome to Browser Automation Chat!

Available actions:
- print: Prints current observation
- click element_text: Click on an element
- hover element_text: Hover over an element
- type element_text [input_text]: Type text into an input field
- scroll up/down: Scroll the page
- press key_combination: Press a key or key combination
- new_tab: Open a new tab
- close_tab: Close the current tab
- goto URL: Navigate to a specific URL
- go_back: Go back to the previous page
- go_forward: Go forward to the next page
- tab_focus tab_number: Focus on a specific tab
- stop answer: Stop the current task with an optional answer
";

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("browser is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Env(#[from] EnvError),
}

/// What happened when one command line was stepped.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFeedback {
    pub line: String,
    pub before_url: String,
    pub after_url: String,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub fail_error: Option<String>,
}

impl fmt::Display for StepFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performed action: {}", self.line)?;
        writeln!(f, "Before URL: {}", self.before_url)?;
        writeln!(f, "After URL: {}", self.after_url)?;
        write!(
            f,
            "Reward: {:.1}, Terminated: {}, Truncated: {}",
            self.reward,
            title_case(self.terminated),
            title_case(self.truncated)
        )?;
        if let Some(err) = &self.fail_error {
            write!(f, "\nError: {err}")?;
        }
        Ok(())
    }
}

fn title_case(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Observation(String),
    Feedback(StepFeedback),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observation(text) => write!(f, "Observation:\n{text}"),
            Self::Feedback(feedback) => feedback.fmt(f),
        }
    }
}

/// One browsing session driven by typed commands.
pub struct BrowserController<E: BrowserEnvironment> {
    env: Option<E>,
}

impl<E: BrowserEnvironment> Default for BrowserController<E> {
    fn default() -> Self {
        Self { env: None }
    }
}

impl<E: BrowserEnvironment> BrowserController<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.env.is_some()
    }

    pub fn observation(&self) -> Option<&Observation> {
        self.env.as_ref().map(|env| env.observation())
    }

    /// Starts a fresh environment with `launch`, resets it to the task in
    /// `config_file`, and returns the URL it landed on. A previous session
    /// is closed first.
    pub async fn initialize<F, Fut>(
        &mut self,
        launch: F,
        config_file: &Path,
    ) -> Result<String, ControllerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<E, EnvError>>,
    {
        let config = TaskConfig::load(config_file)?;
        self.close().await;

        let mut env = launch().await?;
        env.reset(&config).await?;
        let url = env.current_url().await?;
        info!(config = %config_file.display(), url = %url, "browser initialized");
        self.env = Some(env);
        Ok(url)
    }

    /// Welcome text and start URL, or the initialization error, as chat lines.
    pub async fn initialize_report<F, Fut>(&mut self, launch: F, config_file: &Path) -> Vec<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<E, EnvError>>,
    {
        match self.initialize(launch, config_file).await {
            Ok(url) => vec![
                WELCOME_MESSAGE.to_string(),
                format!("Browser initialized. Current URL: {url}"),
            ],
            Err(err) => {
                warn!(error = %err, "browser initialization failed");
                vec![format!("Error initializing browser: {err}")]
            }
        }
    }

    pub async fn perform(&mut self, line: &str) -> Result<Reply, ControllerError> {
        let env = self.env.as_mut().ok_or(ControllerError::NotInitialized)?;
        let command = Command::parse(line)?;
        if command == Command::Print {
            let observation = env.observation();
            let text = if observation.tabs.len() > 1 {
                format!("{}\n\nTabs:\n{}", observation.text, observation.tab_listing())
            } else {
                observation.text.clone()
            };
            return Ok(Reply::Observation(text));
        }

        let action = command.into_action(&env.observation().text)?;
        let before_url = env.current_url().await?;
        let outcome = env.step(&action).await?;
        let after_url = env.current_url().await?;

        info!(
            command = line.trim(),
            action = %action,
            reward = outcome.reward,
            terminated = outcome.terminated,
            fail_error = outcome.info.fail_error.as_deref(),
            "command performed"
        );

        Ok(Reply::Feedback(StepFeedback {
            line: line.trim().to_string(),
            before_url,
            after_url,
            reward: outcome.reward,
            terminated: outcome.terminated,
            truncated: outcome.truncated,
            fail_error: outcome.info.fail_error,
        }))
    }

    /// `perform` with any failure rendered as a chat line.
    pub async fn handle_line(&mut self, line: &str) -> String {
        match self.perform(line).await {
            Ok(reply) => reply.to_string(),
            Err(err) => {
                warn!(command = line.trim(), error = %err, "command failed");
                format!("Error performing action: {err}")
            }
        }
    }

    pub async fn close(&mut self) {
        let Some(env) = self.env.take() else {
            return;
        };
        if let Err(err) = env.close().await {
            warn!(error = %err, "failed to close browser");
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
