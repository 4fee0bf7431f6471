//! Bridge between the chat window and the backend worker thread.

pub mod commands;
pub mod runtime;
