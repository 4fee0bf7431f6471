//! UI layer for the chat window.

pub mod app;

pub use app::ChatApp;
