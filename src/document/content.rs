//! Node content representation.
//!
//! Every tree node carries one `Content` value: a scalar, a mapping of string
//! keys to values, or an ordered list of values. Mappings and lists nest
//! arbitrarily.
//!
//! Content is held through a `SharedContent` cell so that a shallow copy of a
//! node can alias the original's content while a deep copy gets its own.
//!
//! # Example
//!
//! ```
//! use treequill::document::content::{Content, SharedContent};
//! use indexmap::IndexMap;
//!
//! let mut map = IndexMap::new();
//! map.insert("title".to_string(), Content::from("Engineering"));
//! map.insert("headcount".to_string(), Content::from(12));
//!
//! let shared = SharedContent::new(Content::Map(map));
//! let alias = shared.clone();
//! let independent = shared.deep_clone();
//!
//! shared.replace(Content::Null);
//! assert!(alias.get().is_null());
//! assert!(independent.get().is_map());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// A content value without any tree structure attached.
///
/// Serializes untagged, so each variant maps directly onto the matching
/// JSON type. Cloning, comparing, displaying and dropping recurse once per
/// nesting level; loading caps nesting at `serde_json`'s recursion limit,
/// but values built in code are not checked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Ordered mapping of string keys to values
    Map(IndexMap<String, Content>),
    /// Ordered list of values
    List(Vec<Content>),
}

impl Content {
    pub fn is_null(&self) -> bool {
        matches!(self, Content::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Content::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Content::List(_))
    }

    /// Returns true for everything that is neither a mapping nor a list.
    pub fn is_scalar(&self) -> bool {
        !self.is_map() && !self.is_list()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Content::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a key when this content is a mapping.
    pub fn get(&self, key: &str) -> Option<&Content> {
        match self {
            Content::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Renders the content the way it is shown in summaries and drawings:
    /// strings bare, everything else as compact JSON-like text.
    pub fn display_text(&self) -> String {
        match self {
            Content::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Null => write!(f, "null"),
            Content::Bool(b) => write!(f, "{}", b),
            Content::Integer(i) => write!(f, "{}", i),
            Content::Float(fl) => write!(f, "{}", fl),
            Content::String(s) => write!(f, "{:?}", s),
            Content::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Content::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::String(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::String(s)
    }
}

impl From<i64> for Content {
    fn from(i: i64) -> Self {
        Content::Integer(i)
    }
}

impl From<i32> for Content {
    fn from(i: i32) -> Self {
        Content::Integer(i as i64)
    }
}

impl From<f64> for Content {
    fn from(f: f64) -> Self {
        Content::Float(f)
    }
}

impl From<bool> for Content {
    fn from(b: bool) -> Self {
        Content::Bool(b)
    }
}

impl From<Vec<Content>> for Content {
    fn from(items: Vec<Content>) -> Self {
        Content::List(items)
    }
}

impl From<IndexMap<String, Content>> for Content {
    fn from(map: IndexMap<String, Content>) -> Self {
        Content::Map(map)
    }
}

/// A reference-shared content cell.
///
/// Cloning a `SharedContent` aliases the same cell (this is what a shallow
/// node copy does). `deep_clone` produces an independent cell. Equality
/// compares values, not identity; use `ptr_eq` for identity.
#[derive(Debug, Clone, Default)]
pub struct SharedContent(Rc<RefCell<Content>>);

impl SharedContent {
    pub fn new(content: Content) -> Self {
        Self(Rc::new(RefCell::new(content)))
    }

    /// Borrows the current value.
    pub fn get(&self) -> Ref<'_, Content> {
        self.0.borrow()
    }

    /// Returns an owned copy of the current value.
    pub fn snapshot(&self) -> Content {
        self.0.borrow().clone()
    }

    /// Replaces the value in place, returning the previous one. Every alias
    /// of this cell observes the new value.
    pub fn replace(&self, content: Content) -> Content {
        self.0.replace(content)
    }

    /// Creates an independent cell holding a clone of the current value.
    pub fn deep_clone(&self) -> Self {
        Self::new(self.snapshot())
    }

    /// Returns true if both handles point at the same cell.
    pub fn ptr_eq(&self, other: &SharedContent) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SharedContent {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.get() == *other.get()
    }
}

impl From<Content> for SharedContent {
    fn from(content: Content) -> Self {
        SharedContent::new(content)
    }
}
