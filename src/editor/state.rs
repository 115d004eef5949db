//! Editor state management.
//!
//! `EditorState` owns the tree being edited together with its clipboard and
//! undo/redo history, and is the one place mutations go through: each
//! operation runs on the [`MutationEngine`], and whatever it reports as
//! reversible is recorded in [`ActionMemory`].
//!
//! # Example
//!
//! ```
//! use treequill::document::node::Subtree;
//! use treequill::document::tree::Tree;
//! use treequill::editor::state::EditorState;
//!
//! let tree = Tree::from_subtree(
//!     Subtree::new("Company", "Acme Corp")
//!         .with_child(Subtree::new("Sales", ""))
//!         .with_child(Subtree::new("Engineering", "")),
//! )
//! .unwrap();
//! let mut state = EditorState::new(tree);
//!
//! state.cut("Engineering").unwrap();
//! state.paste("Sales").unwrap();
//! let moved = state.tree().require("Engineering").unwrap();
//! assert_eq!(state.tree().path(moved).unwrap(), vec!["Company", "Sales", "Engineering"]);
//!
//! state.undo().unwrap();
//! state.undo().unwrap();
//! let back = state.tree().require("Engineering").unwrap();
//! assert_eq!(state.tree().path(back).unwrap(), vec!["Company", "Engineering"]);
//! assert!(state.clipboard().is_empty());
//! ```

use super::action::TreeDelta;
use super::clipboard::{Clipboard, ClipboardState};
use super::engine::{MutationEngine, Operation};
use super::history::ActionMemory;
use crate::config::Config;
use crate::document::content::Content;
use crate::document::tree::Tree;
use crate::errors::{HistoryResult, MutationResult};

/// Runtime state of one editing session.
#[derive(Debug)]
pub struct EditorState {
    tree: Tree,
    clipboard: Clipboard,
    history: ActionMemory,
    new_node_name: String,
    dirty: bool,
    filename: Option<String>,
}

impl EditorState {
    /// Creates a state with default settings.
    pub fn new(tree: Tree) -> Self {
        Self::with_config(tree, &Config::default())
    }

    pub fn with_config(tree: Tree, config: &Config) -> Self {
        Self {
            tree,
            clipboard: Clipboard::new(),
            history: ActionMemory::with_capacity(config.undo_limit),
            new_node_name: config.new_node_name.clone(),
            dirty: false,
            filename: None,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn history(&self) -> &ActionMemory {
        &self.history
    }

    /// Swaps in a freshly loaded tree. The clipboard and history refer to the
    /// old tree, so both are cleared; the old tree is returned.
    pub fn replace_tree(&mut self, tree: Tree) -> Tree {
        self.clipboard.clear();
        self.history.clear();
        self.dirty = false;
        std::mem::replace(&mut self.tree, tree)
    }

    /// Consumes the state and returns the tree.
    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Applies an operation and records it when it changed the tree.
    ///
    /// On error nothing changes: not the tree, the clipboard, nor history.
    pub fn perform(&mut self, operation: Operation) -> MutationResult<TreeDelta> {
        let applied = MutationEngine::new(
            &mut self.tree,
            &mut self.clipboard,
            &self.new_node_name,
        )
        .apply(operation)?;

        if let Some((action, label)) = applied.record {
            self.history.record(action, label);
            self.dirty = true;
        }
        Ok(applied.delta)
    }

    pub fn cut(&mut self, name: &str) -> MutationResult<TreeDelta> {
        self.perform(Operation::Cut(vec![name.to_string()]))
    }

    pub fn cut_many<S: AsRef<str>>(&mut self, names: &[S]) -> MutationResult<TreeDelta> {
        self.perform(Operation::Cut(owned(names)))
    }

    pub fn copy(&mut self, name: &str) -> MutationResult<TreeDelta> {
        self.perform(Operation::Copy(vec![name.to_string()]))
    }

    pub fn copy_many<S: AsRef<str>>(&mut self, names: &[S]) -> MutationResult<TreeDelta> {
        self.perform(Operation::Copy(owned(names)))
    }

    pub fn paste(&mut self, target: &str) -> MutationResult<TreeDelta> {
        self.perform(Operation::Paste {
            target: target.to_string(),
        })
    }

    pub fn delete(&mut self, name: &str) -> MutationResult<TreeDelta> {
        self.perform(Operation::Delete(vec![name.to_string()]))
    }

    pub fn delete_many<S: AsRef<str>>(&mut self, names: &[S]) -> MutationResult<TreeDelta> {
        self.perform(Operation::Delete(owned(names)))
    }

    pub fn rename(&mut self, node: &str, new_name: &str) -> MutationResult<TreeDelta> {
        self.perform(Operation::Rename {
            node: node.to_string(),
            new_name: new_name.to_string(),
        })
    }

    /// Appends a child to `parent`. Without a name, the configured base name
    /// is used and numbered as needed.
    pub fn insert_child(
        &mut self,
        parent: &str,
        name: Option<&str>,
        content: impl Into<Content>,
    ) -> MutationResult<TreeDelta> {
        self.perform(Operation::Insert {
            parent: parent.to_string(),
            name: name.map(str::to_string),
            content: content.into(),
        })
    }

    pub fn set_content(
        &mut self,
        node: &str,
        content: impl Into<Content>,
    ) -> MutationResult<TreeDelta> {
        self.perform(Operation::EditContent {
            node: node.to_string(),
            content: content.into(),
        })
    }

    pub fn undo(&mut self) -> HistoryResult<TreeDelta> {
        let delta = self.history.undo(&mut self.tree, &mut self.clipboard)?;
        self.dirty = true;
        Ok(delta)
    }

    pub fn redo(&mut self) -> HistoryResult<TreeDelta> {
        let delta = self.history.redo(&mut self.tree, &mut self.clipboard)?;
        self.dirty = true;
        Ok(delta)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clipboard_state(&self) -> ClipboardState {
        self.clipboard.state()
    }

    /// Returns whether the tree changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: String) {
        self.filename = Some(filename);
    }
}

fn owned<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| n.as_ref().to_string()).collect()
}
