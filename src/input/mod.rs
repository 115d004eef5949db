//! Textual edit commands for scripting the editor.

pub mod command;

pub use command::{Command, CommandError, RunError};
