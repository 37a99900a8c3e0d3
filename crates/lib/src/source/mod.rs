//! The persistence collaborator seam.
//!
//! The core never stores anything itself. Everything it reads comes through the
//! [`DataSource`] trait: name and id lookups, the bulk fetch of override rows
//! for one DataSetList, and the typed read of a single cell. [`InMemoryStore`]
//! is a complete implementation used by tests, benchmarks and the CLI.

mod errors;
mod in_memory;
mod persistence;

use std::sync::Arc;

pub use errors::StoreError;
pub use in_memory::InMemoryStore;

use crate::model::{Attribute, AttributeKey, DataSet, DataSetList, Id, ListValue, Parameter};

/// Read access to stored templates.
///
/// Lookups return `Ok(None)` for missing entities; errors are reserved for the
/// collaborator itself failing.
pub trait DataSource: Send + Sync {
    fn data_set_list(&self, id: &Id) -> Result<Option<Arc<DataSetList>>, StoreError>;

    fn data_set_list_by_name(&self, name: &str) -> Result<Option<Arc<DataSetList>>, StoreError>;

    fn data_set(&self, id: &Id) -> Result<Option<Arc<DataSet>>, StoreError>;

    /// Looks up a DataSet by name within one DataSetList.
    fn data_set_by_name(
        &self,
        data_set_list: &Id,
        name: &str,
    ) -> Result<Option<Arc<DataSet>>, StoreError>;

    fn attribute(&self, id: &Id) -> Result<Option<Arc<Attribute>>, StoreError>;

    /// Looks up an Attribute by name within one DataSetList.
    fn attribute_by_name(
        &self,
        data_set_list: &Id,
        name: &str,
    ) -> Result<Option<Arc<Attribute>>, StoreError>;

    fn list_value(&self, id: &Id) -> Result<Option<Arc<ListValue>>, StoreError>;

    /// All override rows registered for a top-level DataSetList.
    fn overlaps(&self, data_set_list: &Id) -> Result<Vec<AttributeKey>, StoreError>;

    /// The value stored at one (DataSet, Attribute) cell, if any.
    fn parameter(&self, data_set: &Id, attribute: &Id) -> Result<Option<Parameter>, StoreError>;

    /// Resolves a reference segment that is either an id or a DataSetList name.
    fn find_data_set_list(&self, segment: &str) -> Result<Option<Arc<DataSetList>>, StoreError> {
        if let Some(id) = Id::parse(segment)
            && let Some(found) = self.data_set_list(&id)?
        {
            return Ok(Some(found));
        }
        self.data_set_list_by_name(segment.trim())
    }

    /// Resolves a reference segment that is either an id or a DataSet name.
    ///
    /// An id is accepted only if it belongs to `data_set_list`.
    fn find_data_set(
        &self,
        data_set_list: &Id,
        segment: &str,
    ) -> Result<Option<Arc<DataSet>>, StoreError> {
        if let Some(id) = Id::parse(segment)
            && let Some(found) = self.data_set(&id)?
            && found.data_set_list == *data_set_list
        {
            return Ok(Some(found));
        }
        self.data_set_by_name(data_set_list, segment.trim())
    }

    /// Resolves a reference segment that is either an id or an Attribute name.
    ///
    /// An id is accepted only if it belongs to `data_set_list`.
    fn find_attribute(
        &self,
        data_set_list: &Id,
        segment: &str,
    ) -> Result<Option<Arc<Attribute>>, StoreError> {
        if let Some(id) = Id::parse(segment)
            && let Some(found) = self.attribute(&id)?
            && found.data_set_list == *data_set_list
        {
            return Ok(Some(found));
        }
        self.attribute_by_name(data_set_list, segment.trim())
    }
}

impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    fn data_set_list(&self, id: &Id) -> Result<Option<Arc<DataSetList>>, StoreError> {
        (**self).data_set_list(id)
    }

    fn data_set_list_by_name(&self, name: &str) -> Result<Option<Arc<DataSetList>>, StoreError> {
        (**self).data_set_list_by_name(name)
    }

    fn data_set(&self, id: &Id) -> Result<Option<Arc<DataSet>>, StoreError> {
        (**self).data_set(id)
    }

    fn data_set_by_name(
        &self,
        data_set_list: &Id,
        name: &str,
    ) -> Result<Option<Arc<DataSet>>, StoreError> {
        (**self).data_set_by_name(data_set_list, name)
    }

    fn attribute(&self, id: &Id) -> Result<Option<Arc<Attribute>>, StoreError> {
        (**self).attribute(id)
    }

    fn attribute_by_name(
        &self,
        data_set_list: &Id,
        name: &str,
    ) -> Result<Option<Arc<Attribute>>, StoreError> {
        (**self).attribute_by_name(data_set_list, name)
    }

    fn list_value(&self, id: &Id) -> Result<Option<Arc<ListValue>>, StoreError> {
        (**self).list_value(id)
    }

    fn overlaps(&self, data_set_list: &Id) -> Result<Vec<AttributeKey>, StoreError> {
        (**self).overlaps(data_set_list)
    }

    fn parameter(&self, data_set: &Id, attribute: &Id) -> Result<Option<Parameter>, StoreError> {
        (**self).parameter(data_set, attribute)
    }
}
