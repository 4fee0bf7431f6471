//! Chat-style command layer over a browsing environment.
//!
//! A line such as `click Add to Cart` is parsed into a [`Command`], its
//! element description is matched against the current accessibility tree,
//! and the resulting id-based action is stepped through the environment.

pub mod command;
pub mod controller;
pub mod resolver;

pub use command::{Command, CommandError};
pub use controller::{BrowserController, ControllerError, Reply, StepFeedback, WELCOME_MESSAGE};
pub use resolver::{clean_text, find_element_id_by_text};
