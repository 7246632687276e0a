//! # Path Algebra
//!
//! Every node of a compiled validator tree has an address: a dot-notated
//! string built from the position of the node in the Lexicon definition
//! tree. Addresses key the compiler's override table, so the same
//! structural position must always produce the same string.
//!
//! | Traversal | Address |
//! |-----------|---------|
//! | object property | `parent.key` |
//! | array element | `parent.__array__` |
//! | union branch | `parent.__union__.<index>` |
//!
//! An empty parent yields the bare child segment, so top-level definitions
//! are addressed by their definition key alone (`main`, `main.record`, ...).
//!
//! The segment names `__array__` and `__union__` are reserved: a Lexicon
//! property with one of those names would alias an array or union address.

use std::fmt;

/// Literal segment marking an array element.
pub const ARRAY_SEGMENT: &str = "__array__";

/// Literal segment marking a union branch; followed by the branch index.
pub const UNION_SEGMENT: &str = "__union__";

/// Address of the property `key` of the object at `parent`.
pub fn object_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Address of the element schema of the array at `parent`.
pub fn array_path(parent: &str) -> String {
    object_path(parent, ARRAY_SEGMENT)
}

/// Address of the `index`-th declared branch of the union at `parent`.
pub fn union_path(parent: &str, index: usize) -> String {
    object_path(parent, &format!("{UNION_SEGMENT}.{index}"))
}

/// One traversal step of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object property (or definition key at the root).
    Key(String),
    /// Array element.
    Array,
    /// Union branch by declared position.
    Union(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Array => f.write_str(ARRAY_SEGMENT),
            Self::Union(index) => write!(f, "{UNION_SEGMENT}.{index}"),
        }
    }
}

/// Split an address back into its traversal steps.
///
/// A `__union__` segment that is not followed by a numeric index is read
/// as an ordinary key. The empty address has no segments.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    if path.is_empty() {
        return segments;
    }

    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        match part {
            ARRAY_SEGMENT => segments.push(PathSegment::Array),
            UNION_SEGMENT => match parts.peek().and_then(|next| next.parse::<usize>().ok()) {
                Some(index) => {
                    parts.next();
                    segments.push(PathSegment::Union(index));
                }
                None => segments.push(PathSegment::Key(part.to_string())),
            },
            key => segments.push(PathSegment::Key(key.to_string())),
        }
    }
    segments
}

/// Rebuild an address from traversal steps.
pub fn render_path(segments: &[PathSegment]) -> String {
    segments.iter().fold(String::new(), |parent, segment| match segment {
        PathSegment::Key(key) => object_path(&parent, key),
        PathSegment::Array => array_path(&parent),
        PathSegment::Union(index) => union_path(&parent, *index),
    })
}
