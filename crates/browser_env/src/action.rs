use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric element id as printed in the accessibility-tree observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// The closed set of operations the environment understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Click(ElementId),
    Hover(ElementId),
    Type {
        element: ElementId,
        text: String,
        press_enter: bool,
    },
    Scroll(ScrollDirection),
    KeyPress(String),
    NewTab,
    CloseTab,
    Goto(String),
    GoBack,
    GoForward,
    TabFocus(usize),
    Stop(String),
    None,
}

impl Action {
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click(id) => write!(f, "click [{id}]"),
            Self::Hover(id) => write!(f, "hover [{id}]"),
            Self::Type {
                element,
                text,
                press_enter,
            } => write!(
                f,
                "type [{element}] [{text}] [{}]",
                if *press_enter { 1 } else { 0 }
            ),
            Self::Scroll(direction) => write!(f, "scroll [{}]", direction.as_str()),
            Self::KeyPress(keys) => write!(f, "press [{keys}]"),
            Self::NewTab => f.write_str("new_tab"),
            Self::CloseTab => f.write_str("close_tab"),
            Self::Goto(url) => write!(f, "goto [{url}]"),
            Self::GoBack => f.write_str("go_back"),
            Self::GoForward => f.write_str("go_forward"),
            Self::TabFocus(index) => write!(f, "tab_focus [{index}]"),
            Self::Stop(answer) => write!(f, "stop [{answer}]"),
            Self::None => f.write_str("none"),
        }
    }
}

#[cfg(test)]
#[path = "tests/action_tests.rs"]
mod tests;
