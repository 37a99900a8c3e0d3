//! Data model read by the core.
//!
//! These types mirror what the persistence collaborator hands over: templates
//! ([`DataSetList`]), their columns ([`DataSet`]) and fields ([`Attribute`]),
//! concrete cell values ([`Parameter`]) and path-scoped overrides
//! ([`AttributeKey`]). The core never mutates them.

mod id;
mod path;

use serde::{Deserialize, Serialize};

pub use id::Id;
pub use path::AttributePath;

/// A named template owning ordered attributes (rows) and data sets (columns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetList {
    pub id: Id,
    pub name: String,
    /// Attribute ids in display order.
    #[serde(default)]
    pub attributes: Vec<Id>,
    /// DataSet ids in display order.
    #[serde(default)]
    pub data_sets: Vec<Id>,
}

/// One column of values under a [`DataSetList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSet {
    pub id: Id,
    pub name: String,
    /// Owning DataSetList.
    pub data_set_list: Id,
}

/// Kind of value an [`Attribute`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    Text,
    File,
    List,
    /// Nests another DataSetList; parameters hold a DataSet reference.
    Dsl,
    Change,
    Encrypted,
}

impl AttributeType {
    /// Whether parameter text of this type goes through macro evaluation.
    pub fn evaluates_macros(&self) -> bool {
        matches!(self, AttributeType::Text | AttributeType::Change)
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeType::Text => "TEXT",
            AttributeType::File => "FILE",
            AttributeType::List => "LIST",
            AttributeType::Dsl => "DSL",
            AttributeType::Change => "CHANGE",
            AttributeType::Encrypted => "ENCRYPTED",
        };
        f.write_str(name)
    }
}

/// Typed field definition of a [`DataSetList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Id,
    pub name: String,
    /// Owning DataSetList.
    pub data_set_list: Id,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    /// Referenced DataSetList, set only for [`AttributeType::Dsl`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_data_set_list: Option<Id>,
    /// Allowed values, used by [`AttributeType::List`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list_values: Vec<Id>,
}

impl Attribute {
    /// Whether this attribute nests another DataSetList.
    pub fn is_reference(&self) -> bool {
        self.kind == AttributeType::Dsl
    }
}

/// One allowed value of a LIST attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListValue {
    pub id: Id,
    pub attribute: Id,
    pub text: String,
}

/// Reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// The raw value stored in a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    /// Free text, possibly containing `#NAME(...)` macros.
    Text(String),
    File(FileRef),
    /// Id of a [`ListValue`].
    ListValue(Id),
    /// Id of a [`DataSet`] of the attribute's referenced DataSetList.
    DataSetRef(Id),
}

impl ParameterValue {
    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        ParameterValue::Text(value.into())
    }

    /// The referenced DataSet, if this value is a reference.
    pub fn data_set_ref(&self) -> Option<Id> {
        match self {
            ParameterValue::DataSetRef(id) => Some(*id),
            _ => None,
        }
    }
}

/// Concrete value at one (DataSet, Attribute) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub data_set: Id,
    pub attribute: Id,
    pub value: ParameterValue,
}

/// An override row: replaces the value of `attribute` for the group reached
/// through `path` when rendering column `data_set` of `data_set_list`.
///
/// For a DSL-typed `attribute`, the row redirects the group it opens, and the
/// path ends with that attribute itself. For any other attribute, the path is
/// the group containing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeKey {
    pub id: Id,
    /// Top-level DataSetList the override belongs to.
    pub data_set_list: Id,
    /// Top-level column the override applies to.
    pub data_set: Id,
    pub path: AttributePath,
    pub attribute: Id,
    pub value: ParameterValue,
}
