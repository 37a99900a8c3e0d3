//! In-memory data source
//!
//! A `HashMap`-backed [`DataSource`] with get-or-create builders. Suitable for
//! tests, benchmarks, the CLI, and any caller that loads templates from a JSON
//! snapshot instead of a database.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};

use super::{DataSource, StoreError, persistence};
use crate::model::{
    Attribute, AttributeKey, AttributePath, AttributeType, DataSet, DataSetList, Id, ListValue,
    Parameter, ParameterValue,
};

/// Everything the store holds, guarded by a single lock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    pub(crate) data_set_lists: HashMap<Id, DataSetList>,
    #[serde(default)]
    pub(crate) data_sets: HashMap<Id, DataSet>,
    #[serde(default)]
    pub(crate) attributes: HashMap<Id, Attribute>,
    #[serde(default)]
    pub(crate) list_values: HashMap<Id, ListValue>,
    /// data_set -> attribute -> parameter
    #[serde(default)]
    pub(crate) parameters: HashMap<Id, HashMap<Id, Parameter>>,
    /// top-level data_set_list -> override rows
    #[serde(default)]
    pub(crate) overlaps: HashMap<Id, Vec<AttributeKey>>,
}

/// A simple in-memory store.
///
/// Builder methods follow get-or-create semantics: asking for a name that
/// already exists in the given scope returns the existing id.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub(crate) state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Saves the whole store to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        persistence::save_to_file(self, path)
    }

    /// Loads a store from a JSON file. A missing file yields an empty store.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        persistence::load_from_file(path)
    }

    /// Gets or creates a DataSetList by name.
    pub fn data_set_list(&self, name: &str) -> Id {
        let mut state = self.state.write().unwrap();
        if let Some(existing) = state.data_set_lists.values().find(|dsl| dsl.name == name) {
            return existing.id;
        }
        let id = Id::random();
        state.data_set_lists.insert(
            id,
            DataSetList {
                id,
                name: name.to_string(),
                attributes: Vec::new(),
                data_sets: Vec::new(),
            },
        );
        id
    }

    /// Gets or creates a DataSet (column) by name under a DataSetList.
    pub fn data_set(&self, data_set_list: Id, name: &str) -> Result<Id, StoreError> {
        let mut state = self.state.write().unwrap();
        if !state.data_set_lists.contains_key(&data_set_list) {
            return Err(StoreError::DataSetListNotFound { id: data_set_list });
        }
        if let Some(existing) = state
            .data_sets
            .values()
            .find(|ds| ds.data_set_list == data_set_list && ds.name == name)
        {
            return Ok(existing.id);
        }
        let id = Id::random();
        state.data_sets.insert(
            id,
            DataSet {
                id,
                name: name.to_string(),
                data_set_list,
            },
        );
        if let Some(dsl) = state.data_set_lists.get_mut(&data_set_list) {
            dsl.data_sets.push(id);
        }
        Ok(id)
    }

    /// Gets or creates a plain attribute of the given type.
    pub fn attribute(
        &self,
        data_set_list: Id,
        name: &str,
        kind: AttributeType,
    ) -> Result<Id, StoreError> {
        self.insert_attribute(data_set_list, name, kind, None)
    }

    /// Gets or creates a TEXT attribute.
    pub fn text_attribute(&self, data_set_list: Id, name: &str) -> Result<Id, StoreError> {
        self.insert_attribute(data_set_list, name, AttributeType::Text, None)
    }

    /// Gets or creates a DSL attribute nesting `target`.
    pub fn reference_attribute(
        &self,
        data_set_list: Id,
        name: &str,
        target: Id,
    ) -> Result<Id, StoreError> {
        if !self.state.read().unwrap().data_set_lists.contains_key(&target) {
            return Err(StoreError::DataSetListNotFound { id: target });
        }
        self.insert_attribute(data_set_list, name, AttributeType::Dsl, Some(target))
    }

    /// Gets or creates a LIST attribute together with its allowed values.
    pub fn list_attribute(
        &self,
        data_set_list: Id,
        name: &str,
        values: &[&str],
    ) -> Result<Id, StoreError> {
        let attribute = self.insert_attribute(data_set_list, name, AttributeType::List, None)?;
        for value in values {
            self.list_value(attribute, value)?;
        }
        Ok(attribute)
    }

    /// Gets or creates an allowed value of a LIST attribute.
    pub fn list_value(&self, attribute: Id, text: &str) -> Result<Id, StoreError> {
        let mut state = self.state.write().unwrap();
        if !state.attributes.contains_key(&attribute) {
            return Err(StoreError::AttributeNotFound { id: attribute });
        }
        if let Some(existing) = state
            .list_values
            .values()
            .find(|lv| lv.attribute == attribute && lv.text == text)
        {
            return Ok(existing.id);
        }
        let id = Id::random();
        state.list_values.insert(
            id,
            ListValue {
                id,
                attribute,
                text: text.to_string(),
            },
        );
        if let Some(attr) = state.attributes.get_mut(&attribute) {
            attr.list_values.push(id);
        }
        Ok(id)
    }

    /// Stores the value of one cell, replacing any previous value.
    pub fn set_parameter(
        &self,
        data_set: Id,
        attribute: Id,
        value: ParameterValue,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        let ds = state
            .data_sets
            .get(&data_set)
            .ok_or(StoreError::DataSetNotFound { id: data_set })?;
        let attr = state
            .attributes
            .get(&attribute)
            .ok_or(StoreError::AttributeNotFound { id: attribute })?;
        if ds.data_set_list != attr.data_set_list {
            return Err(StoreError::ScopeMismatch {
                data_set,
                attribute,
            });
        }
        check_value_kind(attr.kind, &value)?;
        state.parameters.entry(data_set).or_default().insert(
            attribute,
            Parameter {
                data_set,
                attribute,
                value,
            },
        );
        Ok(())
    }

    /// Convenience for [`set_parameter`](Self::set_parameter) with a text value.
    pub fn set_text(&self, data_set: Id, attribute: Id, text: &str) -> Result<(), StoreError> {
        self.set_parameter(data_set, attribute, ParameterValue::text(text))
    }

    /// Convenience for [`set_parameter`](Self::set_parameter) with a DataSet reference.
    pub fn set_reference(
        &self,
        data_set: Id,
        attribute: Id,
        target: Id,
    ) -> Result<(), StoreError> {
        self.set_parameter(data_set, attribute, ParameterValue::DataSetRef(target))
    }

    /// Registers an override of `attribute` at `path` for column `data_set`.
    ///
    /// Every path segment must be a DSL attribute. The owning top-level
    /// DataSetList is taken from the column.
    pub fn add_overlap(
        &self,
        data_set: Id,
        path: AttributePath,
        attribute: Id,
        value: ParameterValue,
    ) -> Result<Id, StoreError> {
        let mut state = self.state.write().unwrap();
        let data_set_list = state
            .data_sets
            .get(&data_set)
            .ok_or(StoreError::DataSetNotFound { id: data_set })?
            .data_set_list;
        for segment in path.iter() {
            match state.attributes.get(segment) {
                Some(attr) if attr.is_reference() => {}
                Some(_) => return Err(StoreError::InvalidOverlapPath { id: *segment }),
                None => return Err(StoreError::AttributeNotFound { id: *segment }),
            }
        }
        let attr = state
            .attributes
            .get(&attribute)
            .ok_or(StoreError::AttributeNotFound { id: attribute })?;
        check_value_kind(attr.kind, &value)?;
        let id = Id::random();
        state
            .overlaps
            .entry(data_set_list)
            .or_default()
            .push(AttributeKey {
                id,
                data_set_list,
                data_set,
                path,
                attribute,
                value,
            });
        Ok(id)
    }

    /// Appends a raw override row without validation.
    ///
    /// Collaborators may hand over rows that no longer match the template
    /// (e.g. a deleted attribute); this lets tests reproduce that.
    pub fn insert_overlap_row(&self, row: AttributeKey) {
        let mut state = self.state.write().unwrap();
        state
            .overlaps
            .entry(row.data_set_list)
            .or_default()
            .push(row);
    }

    fn insert_attribute(
        &self,
        data_set_list: Id,
        name: &str,
        kind: AttributeType,
        type_data_set_list: Option<Id>,
    ) -> Result<Id, StoreError> {
        let mut state = self.state.write().unwrap();
        if !state.data_set_lists.contains_key(&data_set_list) {
            return Err(StoreError::DataSetListNotFound { id: data_set_list });
        }
        if let Some(existing) = state
            .attributes
            .values()
            .find(|a| a.data_set_list == data_set_list && a.name == name)
        {
            return Ok(existing.id);
        }
        let id = Id::random();
        state.attributes.insert(
            id,
            Attribute {
                id,
                name: name.to_string(),
                data_set_list,
                kind,
                type_data_set_list,
                list_values: Vec::new(),
            },
        );
        if let Some(dsl) = state.data_set_lists.get_mut(&data_set_list) {
            dsl.attributes.push(id);
        }
        Ok(id)
    }
}

fn check_value_kind(kind: AttributeType, value: &ParameterValue) -> Result<(), StoreError> {
    let fits = match value {
        ParameterValue::Text(_) => matches!(
            kind,
            AttributeType::Text | AttributeType::Change | AttributeType::Encrypted
        ),
        ParameterValue::File(_) => kind == AttributeType::File,
        ParameterValue::ListValue(_) => kind == AttributeType::List,
        ParameterValue::DataSetRef(_) => kind == AttributeType::Dsl,
    };
    if fits {
        Ok(())
    } else {
        Err(StoreError::ValueTypeMismatch {
            expected: kind,
            value: value_kind_name(value),
        })
    }
}

fn value_kind_name(value: &ParameterValue) -> &'static str {
    match value {
        ParameterValue::Text(_) => "text",
        ParameterValue::File(_) => "file",
        ParameterValue::ListValue(_) => "list_value",
        ParameterValue::DataSetRef(_) => "data_set_ref",
    }
}

impl DataSource for InMemoryStore {
    fn data_set_list(&self, id: &Id) -> Result<Option<Arc<DataSetList>>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state.data_set_lists.get(id).cloned().map(Arc::new))
    }

    fn data_set_list_by_name(&self, name: &str) -> Result<Option<Arc<DataSetList>>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .data_set_lists
            .values()
            .find(|dsl| dsl.name == name)
            .cloned()
            .map(Arc::new))
    }

    fn data_set(&self, id: &Id) -> Result<Option<Arc<DataSet>>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state.data_sets.get(id).cloned().map(Arc::new))
    }

    fn data_set_by_name(
        &self,
        data_set_list: &Id,
        name: &str,
    ) -> Result<Option<Arc<DataSet>>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .data_sets
            .values()
            .find(|ds| ds.data_set_list == *data_set_list && ds.name == name)
            .cloned()
            .map(Arc::new))
    }

    fn attribute(&self, id: &Id) -> Result<Option<Arc<Attribute>>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state.attributes.get(id).cloned().map(Arc::new))
    }

    fn attribute_by_name(
        &self,
        data_set_list: &Id,
        name: &str,
    ) -> Result<Option<Arc<Attribute>>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .attributes
            .values()
            .find(|a| a.data_set_list == *data_set_list && a.name == name)
            .cloned()
            .map(Arc::new))
    }

    fn list_value(&self, id: &Id) -> Result<Option<Arc<ListValue>>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state.list_values.get(id).cloned().map(Arc::new))
    }

    fn overlaps(&self, data_set_list: &Id) -> Result<Vec<AttributeKey>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .overlaps
            .get(data_set_list)
            .cloned()
            .unwrap_or_default())
    }

    fn parameter(&self, data_set: &Id, attribute: &Id) -> Result<Option<Parameter>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .parameters
            .get(data_set)
            .and_then(|cells| cells.get(attribute))
            .cloned())
    }
}
