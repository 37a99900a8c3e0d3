//! Attribute paths through nested DataSetLists.
//!
//! An [`AttributePath`] is the ordered list of DSL-typed attribute ids leading
//! from a top-level DataSetList (root) down to a nested group (leaf). Every entry
//! is the id of an attribute whose type is [`AttributeType::Dsl`], so the path
//! identifies one group instance inside the reference hierarchy.
//!
//! ```rust
//! use datasets::model::{AttributePath, Id};
//!
//! let middle = Id::random();
//! let low = Id::random();
//! let path = AttributePath::root().join(middle).join(low);
//!
//! assert_eq!(path.len(), 2);
//! assert_eq!(path.as_slice(), &[middle, low]);
//! ```
//!
//! [`AttributeType::Dsl`]: super::AttributeType::Dsl

use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};

use super::Id;

/// Owned path of DSL-attribute ids, root to leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributePath(Vec<Id>);

impl AttributePath {
    /// The empty path, addressing the top-level DataSetList itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path with `attribute` appended.
    pub fn join(&self, attribute: Id) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(attribute);
        Self(segments)
    }

    /// Appends a segment in place.
    pub fn push(&mut self, attribute: Id) {
        self.0.push(attribute);
    }

    /// Whether this path is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments as a slice.
    pub fn as_slice(&self) -> &[Id] {
        &self.0
    }
}

impl Deref for AttributePath {
    type Target = [Id];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Id>> for AttributePath {
    fn from(segments: Vec<Id>) -> Self {
        Self(segments)
    }
}

impl From<&[Id]> for AttributePath {
    fn from(segments: &[Id]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
