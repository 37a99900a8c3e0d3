//! Serializable resolved view of a DataSetList.
//!
//! [`build_tree`] walks the attribute hierarchy with a [`PreorderWalk`]. The
//! handler keeps an explicit stack of [`Frame`]s mirroring the open levels:
//! the root list, then one frame per expanded group. Values are resolved per
//! top-level column through the shared [`EvaluationContext`], so references
//! between cells of the tree see the same cached values as the tree itself.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    eval::{EvalError, EvaluationContext, ParameterPositionContext},
    model::{Attribute, AttributePath, AttributeType, DataSetList, Id},
    traversal::{PreorderWalk, TraversalHandler},
};

/// A fully resolved DataSetList.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTree {
    pub id: Id,
    pub name: String,
    /// Columns, in display order.
    pub data_sets: Vec<DataSetHeader>,
    pub attributes: Vec<ResolvedAttribute>,
}

impl ResolvedTree {
    /// Finds an attribute by names, descending through groups.
    pub fn find(&self, names: &[&str]) -> Option<&ResolvedAttribute> {
        let (first, rest) = names.split_first()?;
        let mut current = self.attributes.iter().find(|a| a.name == *first)?;
        for name in rest {
            current = current.children.iter().find(|a| a.name == *name)?;
        }
        Some(current)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetHeader {
    pub id: Id,
    pub name: String,
}

/// One attribute with its value in every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAttribute {
    pub id: Id,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub values: Vec<ResolvedValue>,
    /// Nested attributes of an expanded group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResolvedAttribute>,
}

impl ResolvedAttribute {
    /// The value shown in `data_set`.
    pub fn value_in(&self, data_set: &Id) -> Option<&ResolvedValue> {
        self.values.iter().find(|v| v.data_set == *data_set)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub data_set: Id,
    pub value: Option<String>,
    /// Whether an override contributed to this value.
    pub overlap: bool,
}

/// Builds the resolved tree of `data_set_list`.
///
/// Fails only if the DataSetList itself does not exist; everything below it
/// is rendered best-effort.
pub fn build_tree(
    context: &mut EvaluationContext<'_>,
    data_set_list: &Id,
) -> Result<ResolvedTree, EvalError> {
    let source = context.source();
    let list = source
        .data_set_list(data_set_list)?
        .ok_or_else(|| EvalError::DataSetListNotFound {
            name: data_set_list.to_string(),
        })?;

    let mut data_sets = Vec::with_capacity(list.data_sets.len());
    for id in &list.data_sets {
        match source.data_set(id)? {
            Some(data_set) => data_sets.push(DataSetHeader {
                id: data_set.id,
                name: data_set.name.clone(),
            }),
            None => warn!(data_set = %id, dsl = %list.id, "Skipping missing DataSet"),
        }
    }
    context.overlay(&list.id)?;
    debug!(dsl = %list.id, columns = data_sets.len(), "Building resolved tree");

    let handler = TreeHandler {
        context,
        top: list.id,
        columns: data_sets.iter().map(|header| header.id).collect(),
        frames: Vec::new(),
        attributes: Vec::new(),
    };
    let handler = PreorderWalk::new(Level::List(list.clone()), handler).finish();
    Ok(ResolvedTree {
        id: list.id,
        name: list.name.clone(),
        data_sets,
        attributes: handler.attributes,
    })
}

/// A node of the walk.
#[derive(Debug, Clone)]
enum Level {
    List(Arc<DataSetList>),
    /// An attribute inside the group reached through `path`.
    Attribute {
        attribute: Arc<Attribute>,
        path: AttributePath,
    },
}

/// An open level of the output.
enum Frame {
    Root {
        data_set_list: Id,
        attributes: Vec<ResolvedAttribute>,
    },
    Group {
        data_set_list: Id,
        attribute: ResolvedAttribute,
    },
}

impl Frame {
    fn data_set_list(&self) -> Id {
        match self {
            Frame::Root { data_set_list, .. } | Frame::Group { data_set_list, .. } => {
                *data_set_list
            }
        }
    }

    fn push(&mut self, child: ResolvedAttribute) {
        match self {
            Frame::Root { attributes, .. } => attributes.push(child),
            Frame::Group { attribute, .. } => attribute.children.push(child),
        }
    }
}

struct TreeHandler<'c, 'a> {
    context: &'c mut EvaluationContext<'a>,
    top: Id,
    columns: Vec<Id>,
    frames: Vec<Frame>,
    /// Finished top-level attributes.
    attributes: Vec<ResolvedAttribute>,
}

impl TreeHandler<'_, '_> {
    /// The attributes of `data_set_list` as nodes inside `path`.
    fn attributes_of(&self, data_set_list: &Id, path: &AttributePath) -> Vec<Level> {
        let source = self.context.source();
        let list = match source.data_set_list(data_set_list) {
            Ok(Some(list)) => list,
            Ok(None) => {
                warn!(dsl = %data_set_list, "Referenced DataSetList does not exist");
                return Vec::new();
            }
            Err(err) => {
                warn!(dsl = %data_set_list, error = %err, "Failed to read DataSetList");
                return Vec::new();
            }
        };
        let mut levels = Vec::with_capacity(list.attributes.len());
        for id in &list.attributes {
            match source.attribute(id) {
                Ok(Some(attribute)) => levels.push(Level::Attribute {
                    attribute,
                    path: path.clone(),
                }),
                Ok(None) => warn!(attribute = %id, dsl = %data_set_list, "Skipping missing attribute"),
                Err(err) => warn!(attribute = %id, error = %err, "Failed to read attribute"),
            }
        }
        levels
    }

    /// Whether a group opened by `attribute` at `path` has anything to show:
    /// a reference in some column, or an override at or below it.
    fn worth_expanding(&mut self, attribute: &Attribute, path: &AttributePath) -> bool {
        let group_path = path.join(attribute.id);
        for column in self.columns.clone() {
            let position =
                ParameterPositionContext::new(self.top, column, path.clone(), attribute.id);
            match self.context.locate(&position) {
                Ok(located) if located.target().is_some() => return true,
                Ok(_) => {}
                Err(err) => debug!(%position, error = %err, "Group not located"),
            }
            if let Ok(overlay) = self.context.overlay(&self.top)
                && overlay.contains_overlaps_in_path(group_path.as_slice(), &column)
            {
                return true;
            }
        }
        false
    }

    fn resolve(&mut self, attribute: &Attribute, path: &AttributePath) -> ResolvedAttribute {
        let values = self
            .columns
            .clone()
            .into_iter()
            .map(|column| {
                let position =
                    ParameterPositionContext::new(self.top, column, path.clone(), attribute.id);
                let evaluated = self.context.resolve(&position);
                ResolvedValue {
                    data_set: column,
                    value: evaluated.value,
                    overlap: evaluated.overlap,
                }
            })
            .collect();
        ResolvedAttribute {
            id: attribute.id,
            name: attribute.name.clone(),
            kind: attribute.kind,
            values,
            children: Vec::new(),
        }
    }

    fn attach(&mut self, child: ResolvedAttribute) {
        match self.frames.last_mut() {
            Some(frame) => frame.push(child),
            None => self.attributes.push(child),
        }
    }
}

impl TraversalHandler for TreeHandler<'_, '_> {
    type Node = Level;

    fn children(&mut self, parent: &Level) -> Vec<Level> {
        match parent {
            Level::List(list) => self.attributes_of(&list.id, &AttributePath::root()),
            Level::Attribute { attribute, path } => {
                let Some(target) = attribute
                    .type_data_set_list
                    .filter(|_| attribute.is_reference())
                else {
                    return Vec::new();
                };
                // Open frames are exactly the ancestors of `parent`.
                if self.frames.iter().any(|frame| frame.data_set_list() == target) {
                    debug!(attribute = %attribute.id, dsl = %target, "Not expanding cyclic group");
                    return Vec::new();
                }
                if !self.worth_expanding(attribute, path) {
                    return Vec::new();
                }
                self.attributes_of(&target, &path.join(attribute.id))
            }
        }
    }

    fn forward(&mut self, parent: &Level) {
        let frame = match parent {
            Level::List(list) => Frame::Root {
                data_set_list: list.id,
                attributes: Vec::new(),
            },
            Level::Attribute { attribute, path } => Frame::Group {
                data_set_list: attribute
                    .type_data_set_list
                    .unwrap_or(attribute.data_set_list),
                attribute: self.resolve(attribute, path),
            },
        };
        self.frames.push(frame);
    }

    fn back(&mut self, _parent: &Level) {
        match self.frames.pop() {
            Some(Frame::Root { attributes, .. }) => self.attributes = attributes,
            Some(Frame::Group { attribute, .. }) => self.attach(attribute),
            None => {}
        }
    }

    fn leaf(&mut self, node: &Level) {
        if let Level::Attribute { attribute, path } = node {
            let resolved = self.resolve(attribute, path);
            self.attach(resolved);
        }
    }
}
