//! Error types for tree editing.
//!
//! Every variant here is an expected, recoverable condition. Operations that
//! return one of these errors leave the tree, the clipboard and the history
//! exactly as they were before the call.

use thiserror::Error;

/// Errors raised by the arena-backed tree itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node name: {0}")]
    DuplicateName(String),

    #[error("Invalid root operation: {0}")]
    InvalidRootOperation(String),
}

/// Errors raised by cut, copy, paste, delete, rename and friends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node name: {0}")]
    DuplicateName(String),

    #[error("Invalid root operation: {0}")]
    InvalidRootOperation(String),

    #[error("Clipboard is empty")]
    EmptyClipboard,
}

impl From<TreeError> for MutationError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::NodeNotFound(name) => MutationError::NodeNotFound(name),
            TreeError::DuplicateName(name) => MutationError::DuplicateName(name),
            TreeError::InvalidRootOperation(msg) => MutationError::InvalidRootOperation(msg),
        }
    }
}

/// Errors raised by undo and redo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Nothing to undo or redo")]
    HistoryEmpty,

    /// A stored action no longer applies to the tree. The entry stays where it
    /// was; this only happens if the tree was edited outside the history.
    #[error("Failed to replay history entry: {0}")]
    Replay(#[from] MutationError),
}

/// Errors raised while reading or writing node documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid node document at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid value at line {line}, column {column}: {source}")]
    Value {
        line: usize,
        column: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

pub type TreeResult<T> = Result<T, TreeError>;
pub type MutationResult<T> = Result<T, MutationError>;
pub type HistoryResult<T> = Result<T, HistoryError>;
