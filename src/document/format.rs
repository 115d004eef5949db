//! Document mapping for trees.
//!
//! A tree maps to a nested document where every node is
//! `{ "name": ..., "content": ..., "children": [...] }`. Content maps directly
//! to JSON scalars, objects (key order preserved) and arrays. Converting a
//! tree to a document and back yields a structurally equal tree.
//!
//! # Example
//!
//! ```
//! use treequill::document::format::NodeDocument;
//! use treequill::document::tree::Tree;
//!
//! let json = r#"{
//!     "name": "Company",
//!     "content": "Acme Corp",
//!     "children": [
//!         { "name": "Sales", "content": { "definition": "Sales department" } }
//!     ]
//! }"#;
//!
//! let doc: NodeDocument = serde_json::from_str(json).unwrap();
//! let tree = Tree::from_document(&doc).unwrap();
//! assert!(tree.contains_name("Sales"));
//! assert_eq!(tree.to_document(), doc);
//! ```

use super::content::{Content, SharedContent};
use super::node::{DetachedNode, Subtree};
use super::tree::Tree;
use crate::errors::TreeResult;
use serde::{Deserialize, Serialize};

/// Serialized form of one node and its descendants.
///
/// The derived serde impls recurse once per level, so `serde_json` refuses
/// documents nested deeper than its recursion limit. Files are read and
/// written through [`super::stream`], which has no such bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub name: String,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub children: Vec<NodeDocument>,
}

impl Drop for NodeDocument {
    // Unlinks descendants onto a heap stack so dropping a deep chain does not
    // recurse.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut doc) = pending.pop() {
            pending.append(&mut doc.children);
        }
    }
}

impl NodeDocument {
    pub fn new(name: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            children: Vec::new(),
        }
    }
}

impl Subtree {
    /// Converts a document into a detached subtree with fresh content cells.
    pub fn from_document(doc: &NodeDocument) -> Subtree {
        let mut nodes = Vec::new();
        let mut stack: Vec<(&NodeDocument, Option<usize>)> = vec![(doc, None)];
        while let Some((current, parent)) = stack.pop() {
            let offset = nodes.len();
            nodes.push(DetachedNode {
                name: current.name.clone(),
                content: SharedContent::new(current.content.clone()),
                parent,
            });
            for child in current.children.iter().rev() {
                stack.push((child, Some(offset)));
            }
        }
        Subtree::from_preorder(nodes)
    }

    /// Converts the subtree into its document form.
    pub fn to_document(&self) -> NodeDocument {
        let nodes = self.nodes();
        // Children have larger offsets than their parent, so walking backwards
        // finishes every child before the parent needs it.
        let mut pending: Vec<Vec<NodeDocument>> = nodes.iter().map(|_| Vec::new()).collect();
        let mut root = None;
        for (offset, node) in nodes.iter().enumerate().rev() {
            let mut children = std::mem::take(&mut pending[offset]);
            children.reverse();
            let doc = NodeDocument {
                name: node.name.clone(),
                content: node.content.snapshot(),
                children,
            };
            match node.parent {
                Some(parent) => pending[parent].push(doc),
                None => root = Some(doc),
            }
        }
        root.unwrap_or_else(|| NodeDocument::new(self.root_name(), Content::Null))
    }
}

impl Tree {
    /// Builds a tree from a document; fails with `DuplicateName` if the
    /// document repeats a name anywhere.
    pub fn from_document(doc: &NodeDocument) -> TreeResult<Tree> {
        Tree::from_subtree(Subtree::from_document(doc))
    }

    pub fn to_document(&self) -> NodeDocument {
        let mut nodes = Vec::new();
        let mut stack = vec![(self.root(), None)];
        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let offset = nodes.len();
            nodes.push(DetachedNode {
                name: node.name().to_string(),
                content: node.content().clone(),
                parent,
            });
            for &child in node.children().iter().rev() {
                stack.push((child, Some(offset)));
            }
        }
        Subtree::from_preorder(nodes).to_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TreeError;
    use indexmap::IndexMap;

    fn sample_document() -> NodeDocument {
        let mut info = IndexMap::new();
        info.insert("definition".to_string(), Content::from("Sales department"));
        info.insert(
            "members".to_string(),
            Content::from(vec![Content::from("Ann"), Content::from("Bo")]),
        );

        NodeDocument {
            name: "Company".to_string(),
            content: Content::from("Acme Corp"),
            children: vec![
                NodeDocument {
                    name: "Sales".to_string(),
                    content: Content::Map(info),
                    children: vec![NodeDocument::new("Sales Team 1", 12)],
                },
                NodeDocument::new("Engineering", 2.5),
            ],
        }
    }

    #[test]
    fn test_document_roundtrip_preserves_structure() {
        let doc = sample_document();
        let tree = Tree::from_document(&doc).unwrap();
        assert_eq!(tree.total_nodes(), 4);
        assert_eq!(tree.to_document(), doc);
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = sample_document();
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: NodeDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_missing_fields_default() {
        let parsed: NodeDocument = serde_json::from_str(r#"{"name": "lonely"}"#).unwrap();
        assert_eq!(parsed, NodeDocument::new("lonely", Content::Null));
    }

    #[test]
    fn test_content_types_map_to_json_types() {
        let parsed: NodeDocument = serde_json::from_str(
            r#"{"name": "n", "content": {"b": true, "i": 3, "f": 1.5, "s": "x", "l": [null]}}"#,
        )
        .unwrap();
        let content = &parsed.content;
        assert_eq!(content.get("b"), Some(&Content::Bool(true)));
        assert_eq!(content.get("i"), Some(&Content::Integer(3)));
        assert_eq!(content.get("f"), Some(&Content::Float(1.5)));
        assert_eq!(content.get("s"), Some(&Content::from("x")));
        assert_eq!(content.get("l"), Some(&Content::List(vec![Content::Null])));
    }

    #[test]
    fn test_deep_document_converts_and_drops() {
        let mut tree = Tree::new("root", Content::Null);
        let mut parent = tree.root();
        for i in 0..50_000 {
            parent = tree
                .add_child(parent, Subtree::new(format!("n{}", i), i as i64), None)
                .unwrap();
        }

        let doc = tree.to_document();
        assert_eq!(doc.children.len(), 1);
        let rebuilt = Tree::from_document(&doc).unwrap();
        assert_eq!(rebuilt.total_nodes(), 50_001);
        drop(doc);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut doc = sample_document();
        doc.children.push(NodeDocument::new("Sales Team 1", 0));
        assert_eq!(
            Tree::from_document(&doc).unwrap_err(),
            TreeError::DuplicateName("Sales Team 1".to_string())
        );
    }
}
