//! Browsing environment driven by the command harness.
//!
//! The environment owns a Chromium instance, turns each page into an
//! accessibility-tree text observation, and executes id-based actions
//! against the elements named in that observation.

pub mod action;
pub mod chromium;
pub mod config;
pub mod env;
pub mod keys;
pub mod observation;

pub use action::{Action, ElementId, ScrollDirection};
pub use chromium::ChromiumEnv;
pub use config::{EnvOptions, StorageState, StoredCookie, TaskConfig, ViewportSize};
pub use env::{BrowserEnvironment, EnvError, StepInfo, StepOutcome};
pub use keys::KeyCombo;
pub use observation::{
    parse_element_line, AxNodeSnapshot, ElementLine, Observation, RenderedTree, TabSummary,
};
