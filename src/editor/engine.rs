//! # Mutation engine
//!
//! Applies cut, copy, paste, delete, rename, insert and content edits to a
//! tree and its clipboard.
//!
//! ## Semantics
//!
//! ### Cut
//! - Detaches the selected nodes and stages them, by move, in `cut` mode
//! - The root can never be cut
//!
//! ### Copy
//! - Stages independent deep copies in `copy` mode
//! - Copying the root stages a copy of the whole tree
//! - Leaves the tree untouched, so nothing is recorded in history
//!
//! ### Paste
//! - Inserts the staged batch at the end of the target's children
//! - Names that collide (with the tree, or with names assigned earlier in the
//!   same paste) are resolved in pre-order; everything else keeps its name
//! - `cut` mode consumes the clipboard; `copy` mode inserts a fresh copy and
//!   keeps the clipboard for further pastes
//!
//! ### Delete
//! - Detaches and discards the selected nodes; confirmation is up to the caller
//!
//! ### Rename
//! - Fails loudly on a taken name instead of resolving it
//!
//! Every operation validates before changing anything: on error the tree and
//! the clipboard are exactly as they were.
//!
//! Selections are ordered lists of names. Duplicates are ignored and nodes
//! whose ancestor is also selected are dropped, since they travel with that
//! ancestor anyway.

use crate::document::content::Content;
use crate::document::node::{NodeId, Subtree};
use crate::document::tree::Tree;
use crate::editor::action::{Action, Change, Placement, TreeDelta};
use crate::editor::clipboard::{Clipboard, ClipboardMode};
use crate::editor::names::NameResolver;
use crate::errors::{MutationError, MutationResult};
use std::collections::HashSet;
use tracing::debug;

/// A mutation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Cut(Vec<String>),
    Copy(Vec<String>),
    Paste {
        target: String,
    },
    Delete(Vec<String>),
    Rename {
        node: String,
        new_name: String,
    },
    /// Append a new child; without a name one is generated
    Insert {
        parent: String,
        name: Option<String>,
        content: Content,
    },
    EditContent {
        node: String,
        content: Content,
    },
}

/// Result of a successfully applied operation.
#[derive(Debug)]
pub struct Applied {
    pub delta: TreeDelta,
    /// The reversible record and its label, if the tree changed
    pub record: Option<(Action, String)>,
}

impl Applied {
    fn unrecorded(delta: TreeDelta) -> Self {
        Self {
            delta,
            record: None,
        }
    }

    fn recorded(delta: TreeDelta, action: Action, label: String) -> Self {
        Self {
            delta,
            record: Some((action, label)),
        }
    }
}

/// Applies operations against one tree and its clipboard.
pub struct MutationEngine<'a> {
    tree: &'a mut Tree,
    clipboard: &'a mut Clipboard,
    new_node_name: &'a str,
}

impl<'a> MutationEngine<'a> {
    pub fn new(tree: &'a mut Tree, clipboard: &'a mut Clipboard, new_node_name: &'a str) -> Self {
        Self {
            tree,
            clipboard,
            new_node_name,
        }
    }

    pub fn apply(&mut self, operation: Operation) -> MutationResult<Applied> {
        match operation {
            Operation::Cut(names) => self.cut(&names),
            Operation::Copy(names) => self.copy(&names),
            Operation::Paste { target } => self.paste(&target),
            Operation::Delete(names) => self.delete(&names),
            Operation::Rename { node, new_name } => self.rename(&node, &new_name),
            Operation::Insert {
                parent,
                name,
                content,
            } => self.insert(&parent, name.as_deref(), content),
            Operation::EditContent { node, content } => self.set_content(&node, content),
        }
    }

    /// Detaches the selection into the clipboard.
    pub fn cut<S: AsRef<str>>(&mut self, names: &[S]) -> MutationResult<Applied> {
        let selection = self.select(names, Some("cut"))?;
        if selection.is_empty() {
            return Ok(Applied::unrecorded(TreeDelta::default()));
        }

        let (placements, staged, delta) = self.detach_selection(selection)?;
        let label = format!("Cut {}", describe(&placements));
        let staging = self.clipboard.stage(ClipboardMode::Cut, staged);
        debug!(%label, staging, "cut staged");

        Ok(Applied::recorded(
            delta,
            Action::Cut {
                placements,
                staging,
            },
            label,
        ))
    }

    /// Stages deep copies of the selection. The tree is not touched.
    pub fn copy<S: AsRef<str>>(&mut self, names: &[S]) -> MutationResult<Applied> {
        let selection = self.select(names, None)?;
        if selection.is_empty() {
            return Ok(Applied::unrecorded(TreeDelta::default()));
        }

        let copies = selection
            .into_iter()
            .map(|id| self.tree.deep_copy(id))
            .collect::<Result<Vec<_>, _>>()?;
        let staging = self.clipboard.stage(ClipboardMode::Copy, copies);
        debug!(staging, "copy staged");
        Ok(Applied::unrecorded(TreeDelta::default()))
    }

    /// Inserts the staged batch under `target`.
    pub fn paste(&mut self, target: &str) -> MutationResult<Applied> {
        let (mode, staging) = match self.clipboard.staged() {
            Some(staged) => (staged.mode, staged.id),
            None => return Err(MutationError::EmptyClipboard),
        };
        let parent = self.tree.require(target)?;

        let (mut batch, staged) = match mode {
            ClipboardMode::Copy => {
                let fresh: Vec<Subtree> = self
                    .clipboard
                    .staged()
                    .map(|s| s.nodes.iter().map(Subtree::deep_clone).collect())
                    .unwrap_or_default();
                (fresh, Vec::new())
            }
            ClipboardMode::Cut => {
                let nodes = self.clipboard.take().map(|s| s.nodes).unwrap_or_default();
                let original: Vec<Subtree> = nodes.iter().map(Subtree::deep_clone).collect();
                (nodes, original)
            }
        };

        NameResolver::resolve_batch(self.tree, &mut batch);

        let mut placements = Vec::with_capacity(batch.len());
        let mut delta = TreeDelta::default();
        for subtree in batch {
            let snapshot = subtree.deep_clone();
            let id = self.tree.add_child(parent, subtree, None)?;
            let index = self.tree.position(id)?.map_or(0, |(_, i)| i);
            delta.push(Change::Inserted {
                parent: target.to_string(),
                index,
                name: snapshot.root_name().to_string(),
            });
            placements.push(Placement {
                parent: target.to_string(),
                index,
                subtree: snapshot,
            });
        }

        let label = format!("Paste {} into '{}'", describe(&placements), target);
        debug!(%label, %mode, "paste applied");
        Ok(Applied::recorded(
            delta,
            Action::Paste {
                target: target.to_string(),
                placements,
                mode,
                staging,
                staged,
            },
            label,
        ))
    }

    /// Detaches and discards the selection.
    pub fn delete<S: AsRef<str>>(&mut self, names: &[S]) -> MutationResult<Applied> {
        let selection = self.select(names, Some("delete"))?;
        if selection.is_empty() {
            return Ok(Applied::unrecorded(TreeDelta::default()));
        }

        let (placements, _, delta) = self.detach_selection(selection)?;
        let label = format!("Delete {}", describe(&placements));
        debug!(%label, "delete applied");
        Ok(Applied::recorded(
            delta,
            Action::Delete { placements },
            label,
        ))
    }

    /// Renames `node`. Renaming to the current name changes nothing.
    pub fn rename(&mut self, node: &str, new_name: &str) -> MutationResult<Applied> {
        let id = self.tree.require(node)?;
        if self.tree.is_root(id) {
            return Err(MutationError::InvalidRootOperation(
                "the root name is reserved".to_string(),
            ));
        }
        if node == new_name {
            return Ok(Applied::unrecorded(TreeDelta::default()));
        }
        if self.tree.contains_name(new_name) {
            return Err(MutationError::DuplicateName(new_name.to_string()));
        }

        self.tree.rename(id, new_name)?;
        let label = format!("Rename '{}' to '{}'", node, new_name);
        debug!(%label, "rename applied");
        Ok(Applied::recorded(
            TreeDelta {
                changes: vec![Change::Renamed {
                    from: node.to_string(),
                    to: new_name.to_string(),
                }],
            },
            Action::Rename {
                from: node.to_string(),
                to: new_name.to_string(),
            },
            label,
        ))
    }

    /// Appends a new child under `parent`.
    pub fn insert(
        &mut self,
        parent: &str,
        name: Option<&str>,
        content: Content,
    ) -> MutationResult<Applied> {
        let parent_id = self.tree.require(parent)?;
        let name = match name {
            Some(name) if self.tree.contains_name(name) => {
                return Err(MutationError::DuplicateName(name.to_string()));
            }
            Some(name) => name.to_string(),
            None => NameResolver::sequential(self.new_node_name, self.tree),
        };

        let id = self
            .tree
            .add_child(parent_id, Subtree::new(name.clone(), content), None)?;
        let index = self.tree.position(id)?.map_or(0, |(_, i)| i);
        let placement = Placement {
            parent: parent.to_string(),
            index,
            subtree: self.tree.deep_copy(id)?,
        };

        let label = format!("Insert '{}' under '{}'", name, parent);
        debug!(%label, "insert applied");
        Ok(Applied::recorded(
            TreeDelta {
                changes: vec![Change::Inserted {
                    parent: parent.to_string(),
                    index,
                    name,
                }],
            },
            Action::Insert { placement },
            label,
        ))
    }

    /// Replaces the content of `node`.
    pub fn set_content(&mut self, node: &str, content: Content) -> MutationResult<Applied> {
        let id = self.tree.require(node)?;
        let before = self.tree.set_content(id, content.clone())?;
        let label = format!("Edit content of '{}'", node);
        debug!(%label, "content edited");
        Ok(Applied::recorded(
            TreeDelta {
                changes: vec![Change::ContentChanged {
                    name: node.to_string(),
                }],
            },
            Action::EditContent {
                node: node.to_string(),
                before,
                after: content,
            },
            label,
        ))
    }

    /// Resolves a selection to node ids, rejecting unknown names and
    /// dropping duplicates and nodes with a selected ancestor. `detaching`
    /// names the verb when the selection leaves the tree, which the root
    /// never may.
    fn select<S: AsRef<str>>(
        &self,
        names: &[S],
        detaching: Option<&str>,
    ) -> MutationResult<Vec<NodeId>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = self.tree.require(name.as_ref())?;
            if let Some(verb) = detaching.filter(|_| self.tree.is_root(id)) {
                return Err(MutationError::InvalidRootOperation(format!(
                    "cannot {} the root",
                    verb
                )));
            }
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let chosen: HashSet<NodeId> = ids.iter().copied().collect();
        let mut selection = Vec::with_capacity(ids.len());
        for id in ids {
            if !self.has_selected_ancestor(id, &chosen)? {
                selection.push(id);
            }
        }
        Ok(selection)
    }

    fn has_selected_ancestor(&self, id: NodeId, chosen: &HashSet<NodeId>) -> MutationResult<bool> {
        let mut current = self.tree.parent(id)?;
        while let Some(ancestor) = current {
            if chosen.contains(&ancestor) {
                return Ok(true);
            }
            current = self.tree.parent(ancestor)?;
        }
        Ok(false)
    }

    /// Detaches a validated selection in order. Returns the placements (with
    /// private copies for history), the detached subtrees themselves, and the
    /// delta.
    fn detach_selection(
        &mut self,
        selection: Vec<NodeId>,
    ) -> MutationResult<(Vec<Placement>, Vec<Subtree>, TreeDelta)> {
        let mut placements = Vec::with_capacity(selection.len());
        let mut detached = Vec::with_capacity(selection.len());
        let mut delta = TreeDelta::default();
        for id in selection {
            let (parent, index, subtree) = self.tree.detach(id)?;
            let parent_name = self.tree.name(parent)?.to_string();
            delta.push(Change::Removed {
                parent: parent_name.clone(),
                index,
                name: subtree.root_name().to_string(),
            });
            placements.push(Placement {
                parent: parent_name,
                index,
                subtree: subtree.deep_clone(),
            });
            detached.push(subtree);
        }
        Ok((placements, detached, delta))
    }
}

/// `'Name'` for a single placement, `N nodes` otherwise.
fn describe(placements: &[Placement]) -> String {
    match placements {
        [single] => format!("'{}'", single.subtree.root_name()),
        many => format!("{} nodes", many.len()),
    }
}
