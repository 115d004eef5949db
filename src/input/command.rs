//! Line-oriented edit commands.
//!
//! Each command is one line: a verb followed by its arguments. Node names may
//! contain spaces, so multi-node selections are separated with `;` and two-part
//! arguments with `=>`.
//!
//! ```text
//! cut Sales Team 1; Engineering
//! copy Sales
//! paste Company
//! delete Marketing
//! rename Sales => Revenue
//! insert Sales => Sales Team 3
//! set Sales => {"definition": "Sales department"}
//! undo
//! redo
//! ```
//!
//! Blank lines and lines starting with `#` parse to `None`.

use crate::document::content::Content;
use crate::editor::action::TreeDelta;
use crate::editor::engine::Operation;
use crate::editor::state::EditorState;
use crate::errors::{HistoryError, MutationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Edit(Operation),
    Undo,
    Redo,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownVerb(String),
    #[error("'{verb}' expects {expected}")]
    MissingArgument {
        verb: String,
        expected: &'static str,
    },
    #[error("invalid content for '{node}': {message}")]
    InvalidContent { node: String, message: String },
}

/// Error from running a command against an editor state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl Command {
    /// Parses one command line.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "cut" => Command::Edit(Operation::Cut(selection(verb, rest)?)),
            "copy" => Command::Edit(Operation::Copy(selection(verb, rest)?)),
            "delete" => Command::Edit(Operation::Delete(selection(verb, rest)?)),
            "paste" => Command::Edit(Operation::Paste {
                target: single(verb, rest)?,
            }),
            "rename" => {
                let (node, new_name) = pair(verb, rest, "NODE => NEW_NAME")?;
                Command::Edit(Operation::Rename { node, new_name })
            }
            "insert" => {
                let (parent, name) = match rest.split_once("=>") {
                    Some((parent, name)) => (parent.trim(), Some(name.trim())),
                    None => (rest, None),
                };
                let parent = single(verb, parent)?;
                let name = match name {
                    Some("") => {
                        return Err(CommandError::MissingArgument {
                            verb: verb.to_string(),
                            expected: "PARENT [=> NAME]",
                        })
                    }
                    other => other.map(str::to_string),
                };
                Command::Edit(Operation::Insert {
                    parent,
                    name,
                    content: Content::Null,
                })
            }
            "set" => {
                let (node, raw) = pair(verb, rest, "NODE => JSON")?;
                let content: Content =
                    serde_json::from_str(&raw).map_err(|e| CommandError::InvalidContent {
                        node: node.clone(),
                        message: e.to_string(),
                    })?;
                Command::Edit(Operation::EditContent { node, content })
            }
            other => return Err(CommandError::UnknownVerb(other.to_string())),
        };
        Ok(Some(command))
    }

    /// Runs the command against `state`.
    pub fn run(self, state: &mut EditorState) -> Result<TreeDelta, RunError> {
        match self {
            Command::Edit(operation) => Ok(state.perform(operation)?),
            Command::Undo => Ok(state.undo()?),
            Command::Redo => Ok(state.redo()?),
        }
    }
}

fn selection(verb: &str, rest: &str) -> Result<Vec<String>, CommandError> {
    let names: Vec<String> = rest
        .split(';')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err(CommandError::MissingArgument {
            verb: verb.to_string(),
            expected: "NODE[; NODE...]",
        });
    }
    Ok(names)
}

fn single(verb: &str, rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            verb: verb.to_string(),
            expected: "a node name",
        });
    }
    Ok(rest.to_string())
}

fn pair(verb: &str, rest: &str, expected: &'static str) -> Result<(String, String), CommandError> {
    let missing = || CommandError::MissingArgument {
        verb: verb.to_string(),
        expected,
    };
    let (left, right) = rest.split_once("=>").ok_or_else(missing)?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return Err(missing());
    }
    Ok((left.to_string(), right.to_string()))
}
