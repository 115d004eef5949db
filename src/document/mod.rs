//! Tree data model.
//!
//! - `content`: node content values and the shared content cell
//! - `node`: node ids, attached nodes and detached subtrees
//! - `tree`: the arena-backed tree with its name index
//! - `format`: the `{name, content, children}` document mapping
//! - `stream`: depth-independent reading and writing of that document

pub mod content;
pub mod format;
pub mod node;
pub mod stream;
pub mod tree;
