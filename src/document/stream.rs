//! Streaming reader and writer for the node document format.
//!
//! Both directions walk the `{name, content, children}` nesting with an
//! explicit stack, so a chain of any depth loads and saves without growing
//! the call stack. Only individual `content` values go through serde, and
//! those stay bounded by `serde_json`'s recursion limit.
//!
//! # Example
//!
//! ```
//! use treequill::document::node::Subtree;
//! use treequill::document::stream::{read_document, write_document};
//! use treequill::document::tree::Tree;
//!
//! let tree = Tree::from_subtree(
//!     Subtree::new("Company", "Acme Corp").with_child(Subtree::new("Sales", 3)),
//! )
//! .unwrap();
//!
//! let mut out = Vec::new();
//! write_document(&tree, &mut out, b"  ").unwrap();
//! let text = String::from_utf8(out).unwrap();
//!
//! let reloaded = Tree::from_subtree(read_document(&text).unwrap()).unwrap();
//! assert_eq!(reloaded, tree);
//! ```

use super::content::{Content, SharedContent};
use super::node::{DetachedNode, NodeId, Subtree};
use super::tree::Tree;
use crate::errors::DocumentError;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::io::Write;

enum Step {
    Open { id: NodeId, level: usize, last: bool },
    Close { level: usize, last: bool },
}

/// Writes `tree` as a pretty-printed node document, indenting each level
/// with `indent`. No trailing newline is written.
pub fn write_document<W: Write>(tree: &Tree, out: &mut W, indent: &[u8]) -> Result<(), DocumentError> {
    let mut steps = vec![Step::Open {
        id: tree.root(),
        level: 0,
        last: true,
    }];

    while let Some(step) = steps.pop() {
        match step {
            Step::Open { id, level, last } => {
                let node = tree.get(id)?;

                pad(out, indent, level)?;
                out.write_all(b"{\n")?;
                pad(out, indent, level + 1)?;
                out.write_all(b"\"name\": ")?;
                serde_json::to_writer(&mut *out, node.name())?;
                out.write_all(b",\n")?;
                pad(out, indent, level + 1)?;
                out.write_all(b"\"content\": ")?;
                write_content(out, &node.content().get(), indent, level + 1)?;

                if node.is_leaf() {
                    out.write_all(b"\n")?;
                    close(out, indent, level, last)?;
                    continue;
                }

                out.write_all(b",\n")?;
                pad(out, indent, level + 1)?;
                out.write_all(b"\"children\": [\n")?;
                steps.push(Step::Close { level, last });
                let count = node.children().len();
                for (i, &child) in node.children().iter().enumerate().rev() {
                    steps.push(Step::Open {
                        id: child,
                        level: level + 2,
                        last: i + 1 == count,
                    });
                }
            }
            Step::Close { level, last } => {
                pad(out, indent, level + 1)?;
                out.write_all(b"]\n")?;
                close(out, indent, level, last)?;
            }
        }
    }
    Ok(())
}

fn pad<W: Write>(out: &mut W, indent: &[u8], level: usize) -> std::io::Result<()> {
    for _ in 0..level {
        out.write_all(indent)?;
    }
    Ok(())
}

fn close<W: Write>(out: &mut W, indent: &[u8], level: usize, last: bool) -> std::io::Result<()> {
    pad(out, indent, level)?;
    out.write_all(b"}")?;
    match (last, level) {
        (true, 0) => Ok(()),
        (true, _) => out.write_all(b"\n"),
        (false, _) => out.write_all(b",\n"),
    }
}

/// Pretty-prints one content value, re-indenting its continuation lines to
/// sit under the field at `level`.
fn write_content<W: Write>(
    out: &mut W,
    content: &Content,
    indent: &[u8],
    level: usize,
) -> Result<(), DocumentError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    content.serialize(&mut serializer)?;

    // Pretty JSON never has a raw newline inside a string, so every newline
    // starts a new line of structure.
    for line in buffer.split_inclusive(|&b| b == b'\n') {
        out.write_all(line)?;
        if line.ends_with(b"\n") {
            pad(out, indent, level)?;
        }
    }
    Ok(())
}

/// Reads a node document into a detached subtree.
///
/// Keys may come in any order and unknown keys are skipped. A node without
/// `content` holds null; a node without `children` is a leaf. Name
/// uniqueness is not checked here; `Tree::from_subtree` does that.
pub fn read_document(input: &str) -> Result<Subtree, DocumentError> {
    Reader::new(input).read()
}

struct PendingNode {
    start: usize,
    name: Option<String>,
    content: Option<Content>,
    has_children: bool,
    parent: Option<usize>,
}

#[derive(Clone, Copy)]
enum Scope {
    Node(usize),
    Children(usize),
}

struct Frame {
    scope: Scope,
    first: bool,
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
    nodes: Vec<PendingNode>,
    stack: Vec<Frame>,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn read(mut self) -> Result<Subtree, DocumentError> {
        self.open(None)?;

        while let Some(frame) = self.stack.last_mut() {
            let scope = frame.scope;
            let first = std::mem::replace(&mut frame.first, false);
            let closing = match scope {
                Scope::Node(_) => b'}',
                Scope::Children(_) => b']',
            };

            if self.peek() == Some(closing) {
                self.pos += 1;
                self.stack.pop();
                continue;
            }
            if !first {
                self.expect(b',')?;
            }
            match scope {
                Scope::Node(offset) => self.field(offset)?,
                Scope::Children(parent) => self.open(Some(parent))?,
            }
        }

        if self.peek().is_some() {
            return Err(self.syntax(self.pos, "trailing characters after the document"));
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for pending in std::mem::take(&mut self.nodes) {
            let Some(name) = pending.name else {
                return Err(self.syntax(pending.start, "node has no name"));
            };
            nodes.push(DetachedNode {
                name,
                content: SharedContent::new(pending.content.unwrap_or_default()),
                parent: pending.parent,
            });
        }
        Ok(Subtree::from_preorder(nodes))
    }

    fn open(&mut self, parent: Option<usize>) -> Result<(), DocumentError> {
        self.expect(b'{')?;
        let offset = self.nodes.len();
        self.nodes.push(PendingNode {
            start: self.pos - 1,
            name: None,
            content: None,
            has_children: false,
            parent,
        });
        self.stack.push(Frame {
            scope: Scope::Node(offset),
            first: true,
        });
        Ok(())
    }

    fn field(&mut self, offset: usize) -> Result<(), DocumentError> {
        self.peek();
        let key_start = self.pos;
        let key: String = self.value()?;
        self.expect(b':')?;

        match key.as_str() {
            "name" => {
                if self.nodes[offset].name.is_some() {
                    return Err(self.syntax(key_start, "duplicate field `name`"));
                }
                self.nodes[offset].name = Some(self.value()?);
            }
            "content" => {
                if self.nodes[offset].content.is_some() {
                    return Err(self.syntax(key_start, "duplicate field `content`"));
                }
                self.nodes[offset].content = Some(self.value()?);
            }
            "children" => {
                if self.nodes[offset].has_children {
                    return Err(self.syntax(key_start, "duplicate field `children`"));
                }
                self.nodes[offset].has_children = true;
                self.expect(b'[')?;
                self.stack.push(Frame {
                    scope: Scope::Children(offset),
                    first: true,
                });
            }
            _ => {
                self.value::<IgnoredAny>()?;
            }
        }
        Ok(())
    }

    /// Skips whitespace and returns the next byte without consuming it.
    fn peek(&mut self) -> Option<u8> {
        let bytes = self.input.as_bytes();
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = bytes.get(self.pos) {
            self.pos += 1;
        }
        bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), DocumentError> {
        match self.peek() {
            Some(found) if found == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(self.syntax(
                self.pos,
                &format!("expected `{}`, found `{}`", byte as char, found as char),
            )),
            None => Err(self.syntax(
                self.pos,
                &format!("expected `{}`, found end of input", byte as char),
            )),
        }
    }

    /// Parses one JSON value in place with serde and advances past it.
    fn value<T: DeserializeOwned>(&mut self) -> Result<T, DocumentError> {
        self.peek();
        let input = self.input;
        let start = self.pos;
        let mut stream = serde_json::Deserializer::from_str(&input[start..]).into_iter::<T>();
        match stream.next() {
            Some(Ok(value)) => {
                self.pos = start + stream.byte_offset();
                Ok(value)
            }
            Some(Err(source)) => {
                let (line, column) = line_col(input, start);
                Err(DocumentError::Value {
                    line,
                    column,
                    source,
                })
            }
            None => Err(self.syntax(start, "expected a value, found end of input")),
        }
    }

    fn syntax(&self, offset: usize, message: &str) -> DocumentError {
        let (line, column) = line_col(self.input, offset);
        DocumentError::Syntax {
            line,
            column,
            message: message.to_string(),
        }
    }
}

/// 1-based line and column of a byte offset.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = &source.as_bytes()[..offset.min(source.len())];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |p| p + 1);
    (line, offset.min(source.len()) - line_start + 1)
}
