//! Error types for the data source collaborator.

use thiserror::Error;

use crate::model::{AttributeType, Id};

/// Errors raised by a [`DataSource`](super::DataSource) or by the in-memory store.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// DataSetList not found by id.
    #[error("DataSetList not found: {id}")]
    DataSetListNotFound { id: Id },

    /// DataSet not found by id.
    #[error("DataSet not found: {id}")]
    DataSetNotFound { id: Id },

    /// Attribute not found by id.
    #[error("Attribute not found: {id}")]
    AttributeNotFound { id: Id },

    /// A DataSet and an Attribute belong to different DataSetLists.
    #[error("DataSet {data_set} and attribute {attribute} belong to different DataSetLists")]
    ScopeMismatch { data_set: Id, attribute: Id },

    /// A value does not fit the attribute type it is stored under.
    #[error("Value of kind '{value}' cannot be stored in a {expected} attribute")]
    ValueTypeMismatch {
        expected: AttributeType,
        value: &'static str,
    },

    /// An override path segment is not a DSL-typed attribute.
    #[error("Override path segment {id} is not a DSL attribute")]
    InvalidOverlapPath { id: Id },

    /// The backing collaborator failed.
    #[error("Data source unavailable: {reason}")]
    Unavailable { reason: String },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::DataSetListNotFound { .. }
                | StoreError::DataSetNotFound { .. }
                | StoreError::AttributeNotFound { .. }
        )
    }

    /// Check if this error comes from inconsistent input data.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            StoreError::ScopeMismatch { .. }
                | StoreError::ValueTypeMismatch { .. }
                | StoreError::InvalidOverlapPath { .. }
        )
    }

    /// Check if this error is I/O or (de)serialization related.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            StoreError::FileIo { .. }
                | StoreError::SerializationFailed { .. }
                | StoreError::DeserializationFailed { .. }
        )
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
