//! Single-slot clipboard for cut and copied subtrees.
//!
//! The clipboard holds at most one staged batch: an ordered list of detached
//! subtrees plus the mode they were staged with. Staging a new batch replaces
//! whatever was there. Each staging gets an id so history can tell whether
//! the clipboard still holds the batch a given action produced.

use crate::document::node::Subtree;
use std::fmt;

/// How the staged batch got onto the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    /// Nodes were detached from the tree; a paste moves them back in.
    Cut,
    /// Nodes are independent copies; every paste inserts a fresh copy.
    Copy,
}

impl fmt::Display for ClipboardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardMode::Cut => write!(f, "cut"),
            ClipboardMode::Copy => write!(f, "copy"),
        }
    }
}

/// A staged batch.
#[derive(Debug)]
pub struct Staged {
    pub id: u64,
    pub mode: ClipboardMode,
    pub nodes: Vec<Subtree>,
}

/// What the clipboard currently holds, for status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardState {
    Empty,
    Staged {
        mode: ClipboardMode,
        /// Root names of the staged subtrees, in order
        roots: Vec<String>,
        /// Total number of staged nodes, descendants included
        node_count: usize,
    },
}

impl fmt::Display for ClipboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardState::Empty => write!(f, "Clipboard: empty"),
            ClipboardState::Staged { mode, roots, .. } => {
                write!(f, "Clipboard ({}): {}", mode, roots.join(", "))
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Clipboard {
    slot: Option<Staged>,
    next_id: u64,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn mode(&self) -> Option<ClipboardMode> {
        self.slot.as_ref().map(|s| s.mode)
    }

    pub fn staged(&self) -> Option<&Staged> {
        self.slot.as_ref()
    }

    /// Id of the batch currently staged, if any.
    pub fn staging_id(&self) -> Option<u64> {
        self.slot.as_ref().map(|s| s.id)
    }

    /// Stages a new batch, replacing the previous one, and returns its id.
    pub fn stage(&mut self, mode: ClipboardMode, nodes: Vec<Subtree>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.slot = Some(Staged { id, mode, nodes });
        id
    }

    /// Puts a batch back under an id it was staged with before.
    pub(crate) fn restage(&mut self, id: u64, mode: ClipboardMode, nodes: Vec<Subtree>) {
        self.slot = Some(Staged { id, mode, nodes });
    }

    /// Removes and returns the staged batch.
    pub fn take(&mut self) -> Option<Staged> {
        self.slot.take()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Clears the clipboard only if it still holds batch `id`.
    pub(crate) fn clear_if_staged(&mut self, id: u64) -> bool {
        if self.staging_id() == Some(id) {
            self.slot = None;
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> ClipboardState {
        match &self.slot {
            None => ClipboardState::Empty,
            Some(staged) => ClipboardState::Staged {
                mode: staged.mode,
                roots: staged
                    .nodes
                    .iter()
                    .map(|n| n.root_name().to_string())
                    .collect(),
                node_count: staged.nodes.iter().map(Subtree::node_count).sum(),
            },
        }
    }
}
