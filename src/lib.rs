//! TreeQuill - a structural editor for trees of uniquely named nodes.
//!
//! The library keeps a tree of named nodes carrying structured content and
//! edits it with cut, copy, paste, delete, rename and insert, backed by a
//! single-slot clipboard and bounded undo/redo history.
//!
//! - `document`: the tree model and its document mapping
//! - `editor`: mutations, clipboard, name resolution and history
//! - `input`: the line-oriented command language
//! - `config`: user configuration
//! - `file`: loading and saving trees
//! - `errors`: error types shared by the modules above

pub mod config;
pub mod document;
pub mod editor;
pub mod errors;
pub mod file;
pub mod input;
