//! Reversible action descriptors.
//!
//! Every successful mutation that changes the tree produces an `Action`
//! holding enough data to apply it again (`replay`) or to take it back
//! (`revert`). Nodes are addressed by name: names are unique tree-wide, and
//! because history is strictly last-in first-out, the tree an action is
//! reverted or replayed against is exactly the tree it left behind (or found).
//!
//! Subtrees stored in an action are private deep copies, so later edits to
//! the live tree or the clipboard never reach into history.
//!
//! Replaying and reverting bypass name resolution; they restore exact prior
//! states.

use crate::document::content::Content;
use crate::document::node::Subtree;
use crate::document::tree::Tree;
use crate::editor::clipboard::{Clipboard, ClipboardMode};
use crate::errors::{MutationError, MutationResult};
use std::collections::HashSet;
use std::fmt;

/// Where a subtree sits (or sat) in the tree.
#[derive(Debug, PartialEq)]
pub struct Placement {
    /// Name of the parent node
    pub parent: String,
    /// Index among the parent's children
    pub index: usize,
    pub subtree: Subtree,
}

/// One structural change reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Inserted {
        parent: String,
        index: usize,
        name: String,
    },
    Removed {
        parent: String,
        index: usize,
        name: String,
    },
    Renamed {
        from: String,
        to: String,
    },
    ContentChanged {
        name: String,
    },
}

/// The changes one operation, undo or redo made to the tree, in the order
/// they happened. Empty when the tree did not change (e.g. copy).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeDelta {
    pub changes: Vec<Change>,
}

impl TreeDelta {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Names of subtree roots inserted by this delta.
    pub fn inserted(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter_map(|c| match c {
                Change::Inserted { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names of subtree roots removed by this delta.
    pub fn removed(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter_map(|c| match c {
                Change::Removed { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Cut,
    Paste,
    Delete,
    Rename,
    Insert,
    EditContent,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Cut => "cut",
            ActionKind::Paste => "paste",
            ActionKind::Delete => "delete",
            ActionKind::Rename => "rename",
            ActionKind::Insert => "insert",
            ActionKind::EditContent => "edit content",
        };
        write!(f, "{}", name)
    }
}

/// A recorded, reversible mutation.
#[derive(Debug)]
pub enum Action {
    /// Nodes detached into the clipboard, in detach order.
    Cut {
        placements: Vec<Placement>,
        staging: u64,
    },
    /// Nodes detached and discarded, in detach order.
    Delete { placements: Vec<Placement> },
    /// Nodes inserted under `target`, in insertion order, with the names
    /// they got after collision resolution.
    Paste {
        target: String,
        placements: Vec<Placement>,
        mode: ClipboardMode,
        staging: u64,
        /// The clipboard batch as it was before a cut-mode paste consumed it
        staged: Vec<Subtree>,
    },
    Rename { from: String, to: String },
    Insert { placement: Placement },
    EditContent {
        node: String,
        before: Content,
        after: Content,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Cut { .. } => ActionKind::Cut,
            Action::Delete { .. } => ActionKind::Delete,
            Action::Paste { .. } => ActionKind::Paste,
            Action::Rename { .. } => ActionKind::Rename,
            Action::Insert { .. } => ActionKind::Insert,
            Action::EditContent { .. } => ActionKind::EditContent,
        }
    }

    /// Takes the action back.
    pub(crate) fn revert(
        &self,
        tree: &mut Tree,
        clipboard: &mut Clipboard,
    ) -> MutationResult<TreeDelta> {
        match self {
            Action::Cut {
                placements,
                staging,
            } => {
                let delta = attach_all(tree, placements.iter().rev())?;
                clipboard.clear_if_staged(*staging);
                Ok(delta)
            }
            Action::Delete { placements } => attach_all(tree, placements.iter().rev()),
            Action::Paste {
                placements,
                mode,
                staging,
                staged,
                ..
            } => {
                let names: Vec<&str> = placements
                    .iter()
                    .rev()
                    .map(|p| p.subtree.root_name())
                    .collect();
                let (_, delta) = detach_all(tree, &names)?;
                if *mode == ClipboardMode::Cut {
                    clipboard.restage(
                        *staging,
                        ClipboardMode::Cut,
                        staged.iter().map(Subtree::deep_clone).collect(),
                    );
                }
                Ok(delta)
            }
            Action::Rename { from, to } => rename(tree, to, from),
            Action::Insert { placement } => {
                let (_, delta) = detach_all(tree, &[placement.subtree.root_name()])?;
                Ok(delta)
            }
            Action::EditContent { node, before, .. } => set_content(tree, node, before),
        }
    }

    /// Applies the action again after it was reverted.
    pub(crate) fn replay(
        &self,
        tree: &mut Tree,
        clipboard: &mut Clipboard,
    ) -> MutationResult<TreeDelta> {
        match self {
            Action::Cut {
                placements,
                staging,
            } => {
                let names: Vec<&str> = placements.iter().map(|p| p.subtree.root_name()).collect();
                let (detached, delta) = detach_all(tree, &names)?;
                clipboard.restage(*staging, ClipboardMode::Cut, detached);
                Ok(delta)
            }
            Action::Delete { placements } => {
                let names: Vec<&str> = placements.iter().map(|p| p.subtree.root_name()).collect();
                Ok(detach_all(tree, &names)?.1)
            }
            Action::Paste {
                placements,
                mode,
                staging,
                ..
            } => {
                let delta = attach_all(tree, placements.iter())?;
                if *mode == ClipboardMode::Cut {
                    clipboard.clear_if_staged(*staging);
                }
                Ok(delta)
            }
            Action::Rename { from, to } => rename(tree, from, to),
            Action::Insert { placement } => attach_all(tree, std::iter::once(placement)),
            Action::EditContent { node, after, .. } => set_content(tree, node, after),
        }
    }
}

/// Re-inserts copies of the placed subtrees at their recorded positions, in
/// iteration order. Validates everything before touching the tree.
fn attach_all<'a>(
    tree: &mut Tree,
    placements: impl Iterator<Item = &'a Placement> + Clone,
) -> MutationResult<TreeDelta> {
    let mut incoming: HashSet<&str> = HashSet::new();
    for placement in placements.clone() {
        tree.require(&placement.parent)?;
        for name in placement.subtree.names() {
            if tree.contains_name(name) || !incoming.insert(name) {
                return Err(MutationError::DuplicateName(name.to_string()));
            }
        }
    }

    let mut delta = TreeDelta::default();
    for placement in placements {
        let parent = tree.require(&placement.parent)?;
        tree.add_child(
            parent,
            placement.subtree.deep_clone(),
            Some(placement.index),
        )?;
        delta.push(Change::Inserted {
            parent: placement.parent.clone(),
            index: placement.index,
            name: placement.subtree.root_name().to_string(),
        });
    }
    Ok(delta)
}

/// Detaches the named nodes in order. Validates every name first.
fn detach_all(tree: &mut Tree, names: &[&str]) -> MutationResult<(Vec<Subtree>, TreeDelta)> {
    for name in names {
        let id = tree.require(name)?;
        if tree.is_root(id) {
            return Err(MutationError::InvalidRootOperation(format!(
                "cannot detach the root '{}'",
                name
            )));
        }
    }

    let mut detached = Vec::with_capacity(names.len());
    let mut delta = TreeDelta::default();
    for name in names {
        let id = tree.require(name)?;
        let (parent, index, subtree) = tree.detach(id)?;
        delta.push(Change::Removed {
            parent: tree.name(parent)?.to_string(),
            index,
            name: name.to_string(),
        });
        detached.push(subtree);
    }
    Ok((detached, delta))
}

fn rename(tree: &mut Tree, from: &str, to: &str) -> MutationResult<TreeDelta> {
    let id = tree.require(from)?;
    tree.rename(id, to)?;
    Ok(TreeDelta {
        changes: vec![Change::Renamed {
            from: from.to_string(),
            to: to.to_string(),
        }],
    })
}

fn set_content(tree: &mut Tree, node: &str, content: &Content) -> MutationResult<TreeDelta> {
    let id = tree.require(node)?;
    tree.set_content(id, content.clone())?;
    Ok(TreeDelta {
        changes: vec![Change::ContentChanged {
            name: node.to_string(),
        }],
    })
}
