//! Interactive chat module
//!
//! Provides a readline-based interactive interface for asking questions
//! in the selected mode.

mod repl;

pub use repl::{ChatRepl, Command};
