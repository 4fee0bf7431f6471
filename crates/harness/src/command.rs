use std::sync::OnceLock;

use browser_env::{Action, ScrollDirection};
use regex::Regex;
use thiserror::Error;

use crate::resolver::find_element_id_by_text;

/// One line typed by the user, before element resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Print,
    Click {
        target: String,
    },
    Hover {
        target: String,
    },
    Type {
        target: String,
        text: String,
        press_enter: bool,
    },
    Scroll(ScrollDirection),
    Press {
        keys: String,
    },
    NewTab,
    CloseTab,
    Goto {
        url: String,
    },
    GoBack,
    GoForward,
    TabFocus {
        index: usize,
    },
    Stop {
        answer: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Element '{0}' not found")]
    ElementNotFound(String),
    #[error("Invalid type command format: type email [email@address.com]")]
    InvalidTypeFormat,
    #[error("Invalid scroll direction '{0}': expected up or down")]
    InvalidScrollDirection(String),
    #[error("Invalid tab index '{0}'")]
    InvalidTabIndex(String),
    #[error("Unknown action: {0}")]
    Unknown(String),
    #[error("Empty command")]
    Empty,
}

fn type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^type\s+(.*?)\s+\[(.*?)\](?:\s+\[([01])\])?$").expect("static type pattern")
    })
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let (verb, rest) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim()),
            None => (line, ""),
        };
        let verb = verb.to_ascii_lowercase();
        let unknown = || CommandError::Unknown(line.to_string());

        let command = match verb.as_str() {
            "print" if rest.is_empty() => Self::Print,
            "click" if !rest.is_empty() => Self::Click {
                target: rest.to_string(),
            },
            "hover" if !rest.is_empty() => Self::Hover {
                target: rest.to_string(),
            },
            "type" => {
                let caps = type_pattern()
                    .captures(line)
                    .ok_or(CommandError::InvalidTypeFormat)?;
                let target = caps[1].trim();
                if target.is_empty() {
                    return Err(CommandError::InvalidTypeFormat);
                }
                Self::Type {
                    target: target.to_string(),
                    text: caps[2].to_string(),
                    press_enter: caps.get(3).map_or(true, |flag| flag.as_str() == "1"),
                }
            }
            "scroll" => ScrollDirection::parse(rest)
                .map(Self::Scroll)
                .ok_or_else(|| CommandError::InvalidScrollDirection(rest.to_string()))?,
            "press" if !rest.is_empty() => Self::Press {
                keys: rest.to_string(),
            },
            "new_tab" if rest.is_empty() => Self::NewTab,
            "close_tab" if rest.is_empty() => Self::CloseTab,
            "goto" if !rest.is_empty() => Self::Goto {
                url: rest.to_string(),
            },
            "go_back" if rest.is_empty() => Self::GoBack,
            "go_forward" if rest.is_empty() => Self::GoForward,
            "tab_focus" => Self::TabFocus {
                index: rest
                    .parse::<usize>()
                    .map_err(|_| CommandError::InvalidTabIndex(rest.to_string()))?,
            },
            "stop" => Self::Stop {
                answer: rest.to_string(),
            },
            _ => return Err(unknown()),
        };
        Ok(command)
    }

    /// Resolves element descriptions against `observation` and produces the
    /// action to step. `Print` maps to `Action::None`; callers answer it
    /// from the observation instead of stepping.
    pub fn into_action(self, observation: &str) -> Result<Action, CommandError> {
        let resolve = |target: String| {
            find_element_id_by_text(observation, &target).ok_or(CommandError::ElementNotFound(target))
        };

        let action = match self {
            Self::Print => Action::None,
            Self::Click { target } => Action::Click(resolve(target)?),
            Self::Hover { target } => Action::Hover(resolve(target)?),
            Self::Type {
                target,
                text,
                press_enter,
            } => Action::Type {
                element: resolve(target)?,
                text,
                press_enter,
            },
            Self::Scroll(direction) => Action::Scroll(direction),
            Self::Press { keys } => Action::KeyPress(keys),
            Self::NewTab => Action::NewTab,
            Self::CloseTab => Action::CloseTab,
            Self::Goto { url } => Action::Goto(url),
            Self::GoBack => Action::GoBack,
            Self::GoForward => Action::GoForward,
            Self::TabFocus { index } => Action::TabFocus(index),
            Self::Stop { answer } => Action::Stop(answer),
        };
        Ok(action)
    }
}

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;
