//! Linear undo/redo history.
//!
//! Successful mutations are recorded as [`Action`] descriptors on a bounded
//! undo stack. Undo reverts the most recent record and moves it to the redo
//! stack; redo replays it and moves it back. Recording anything new drops the
//! redo stack, so there is no branching.
//!
//! When the undo stack grows past its capacity the oldest record is evicted
//! and can no longer be undone. A capacity of `0` means unbounded.

use crate::document::tree::Tree;
use crate::editor::action::{Action, TreeDelta};
use crate::editor::clipboard::Clipboard;
use crate::errors::{HistoryError, HistoryResult};
use std::collections::VecDeque;
use std::time::SystemTime;
use tracing::debug;

/// A recorded action plus the metadata shown to the user.
#[derive(Debug)]
pub struct ActionRecord {
    pub action: Action,
    pub label: String,
    pub timestamp: SystemTime,
    /// Increases with every recorded action
    pub seq: u64,
}

#[derive(Debug)]
pub struct ActionMemory {
    undo_stack: VecDeque<ActionRecord>,
    redo_stack: Vec<ActionRecord>,
    capacity: usize,
    next_seq: u64,
}

impl Default for ActionMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionMemory {
    pub const DEFAULT_CAPACITY: usize = 20;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity,
            next_seq: 0,
        }
    }

    /// Records a new action. Clears the redo stack and evicts the oldest
    /// record if the undo stack is over capacity.
    pub fn record(&mut self, action: Action, label: impl Into<String>) {
        let label = label.into();
        let seq = self.next_seq;
        self.next_seq += 1;
        debug!(seq, %label, kind = %action.kind(), "recording action");

        self.undo_stack.push_back(ActionRecord {
            action,
            label,
            timestamp: SystemTime::now(),
            seq,
        });
        if !self.redo_stack.is_empty() {
            debug!(dropped = self.redo_stack.len(), "clearing redo history");
            self.redo_stack.clear();
        }
        if self.capacity > 0 {
            while self.undo_stack.len() > self.capacity {
                if let Some(evicted) = self.undo_stack.pop_front() {
                    debug!(seq = evicted.seq, label = %evicted.label, "evicted oldest undo level");
                }
            }
        }
    }

    /// Reverts the most recent action.
    ///
    /// Fails with `HistoryEmpty` when there is nothing to undo. If reverting
    /// fails, the record stays on the undo stack.
    pub fn undo(&mut self, tree: &mut Tree, clipboard: &mut Clipboard) -> HistoryResult<TreeDelta> {
        let record = self.undo_stack.pop_back().ok_or(HistoryError::HistoryEmpty)?;
        match record.action.revert(tree, clipboard) {
            Ok(delta) => {
                debug!(seq = record.seq, label = %record.label, "undone");
                self.redo_stack.push(record);
                Ok(delta)
            }
            Err(e) => {
                self.undo_stack.push_back(record);
                Err(e.into())
            }
        }
    }

    /// Replays the most recently undone action.
    pub fn redo(&mut self, tree: &mut Tree, clipboard: &mut Clipboard) -> HistoryResult<TreeDelta> {
        let record = self.redo_stack.pop().ok_or(HistoryError::HistoryEmpty)?;
        match record.action.replay(tree, clipboard) {
            Ok(delta) => {
                debug!(seq = record.seq, label = %record.label, "redone");
                self.undo_stack.push_back(record);
                Ok(delta)
            }
            Err(e) => {
                self.redo_stack.push(record);
                Err(e.into())
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the action the next undo would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|r| r.label.as_str())
    }

    /// Label of the action the next redo would replay.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|r| r.label.as_str())
    }

    /// Records available for undo, oldest first.
    pub fn undo_records(&self) -> impl Iterator<Item = &ActionRecord> {
        self.undo_stack.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
