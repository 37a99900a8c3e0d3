//! Where a value is computed.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::model::{AttributePath, DataSet, Id};

/// Identifies one cell as seen through a top-level column.
///
/// The same leaf Parameter may be reached through different paths or columns
/// and yield different values there (overrides are path-scoped), so all four
/// parts form the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterPositionContext {
    /// Top-level DataSetList the path starts from.
    pub data_set_list: Id,
    /// Column of `data_set_list`.
    pub column: Id,
    /// DSL attributes leading from `data_set_list` to the group holding `attribute`.
    pub path: AttributePath,
    pub attribute: Id,
}

impl ParameterPositionContext {
    pub fn new(data_set_list: Id, column: Id, path: AttributePath, attribute: Id) -> Self {
        Self {
            data_set_list,
            column,
            path,
            attribute,
        }
    }

    /// A cell directly in `data_set`'s own DataSetList.
    pub fn top_level(data_set: &DataSet, attribute: Id) -> Self {
        Self::new(
            data_set.data_set_list,
            data_set.id,
            AttributePath::root(),
            attribute,
        )
    }
}

impl fmt::Display for ParameterPositionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.data_set_list, self.column)?;
        if !self.path.is_root() {
            write!(f, "/{}", self.path)?;
        }
        write!(f, ":{}", self.attribute)
    }
}

/// Evaluation scope threaded by value through recursive evaluation.
///
/// Descending into a referenced cell clones the scope and records the cell in
/// `visited`, so sibling evaluations never see each other's chains.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Top-level DataSetList of the current pass, used by `REF_THIS`.
    pub data_set_list: Id,
    /// Top-level column of the current pass, used by `REF_THIS`.
    pub column: Id,
    /// DataSetList owning the cell being evaluated, used by `REF`.
    pub local: Id,
    visited: HashSet<ParameterPositionContext>,
}

impl Scope {
    pub fn new(data_set_list: Id, column: Id) -> Self {
        Self {
            data_set_list,
            column,
            local: data_set_list,
            visited: HashSet::new(),
        }
    }

    /// The scope of text evaluated directly in a column.
    pub fn for_data_set(data_set: &DataSet) -> Self {
        Self::new(data_set.data_set_list, data_set.id)
    }

    /// Whether `position` is already being evaluated along this chain.
    pub fn is_visiting(&self, position: &ParameterPositionContext) -> bool {
        self.visited.contains(position)
    }

    /// The scope for evaluating the text stored at `position`, owned by `local`.
    pub fn descend(&self, position: &ParameterPositionContext, local: Id) -> Self {
        let mut visited = self.visited.clone();
        visited.insert(position.clone());
        Self {
            data_set_list: position.data_set_list,
            column: position.column,
            local,
            visited,
        }
    }

    /// Number of positions on the current chain.
    pub fn depth(&self) -> usize {
        self.visited.len()
    }
}
