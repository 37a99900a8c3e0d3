//! Error types for macro evaluation and reference resolution.

use thiserror::Error;

use crate::{model::Id, source::StoreError};

/// Broad class of an [`EvalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed macro argument shape.
    Parse,
    /// A name or id could not be resolved, or resolved to the wrong kind.
    Resolution,
    /// A macro failed on well-formed arguments.
    Evaluation,
    /// The data source failed.
    Store,
}

/// Errors raised while evaluating a cell or a macro.
///
/// None of these abort a surrounding evaluation: they are rendered inline as
/// `[message]` by the evaluation context.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EvalError {
    /// Wrong number or shape of macro arguments.
    #[error("{name}: {reason}")]
    MalformedArguments { name: String, reason: String },

    /// No DataSetList with this name or id.
    #[error("DataSetList '{name}' not found")]
    DataSetListNotFound { name: String },

    /// No DataSet with this name or id in the given DataSetList.
    #[error("DataSet '{name}' not found in DataSetList {data_set_list}")]
    DataSetNotFound { name: String, data_set_list: Id },

    /// No Attribute with this name or id in the given DataSetList.
    #[error("Attribute '{name}' not found in DataSetList {data_set_list}")]
    AttributeNotFound { name: String, data_set_list: Id },

    /// A LIST value points at a list value that no longer exists.
    #[error("List value {id} not found")]
    ListValueNotFound { id: Id },

    /// A path segment names an attribute that does not nest a DataSetList.
    #[error("Attribute '{name}' is not a DSL reference")]
    NotAReference { name: String },

    /// A path does not follow the DataSetList chain it is applied to.
    #[error("Path segment {segment} does not belong to DataSetList {data_set_list}")]
    PathMismatch { segment: Id, data_set_list: Id },

    /// Evaluating a position requires its own value.
    #[error("Cyclic reference at {position}")]
    CyclicReference { position: String },

    /// `min` is greater than `max`.
    #[error("Invalid bounds: {min} > {max}")]
    InvalidBounds { min: i64, max: i64 },

    /// A numeric argument did not parse or is out of range.
    #[error("{name}: invalid number '{value}'")]
    InvalidNumber { name: String, value: String },

    /// A length argument exceeds what a single macro may produce.
    #[error("{name}: length {length} exceeds the maximum of {max}")]
    LengthTooLarge {
        name: String,
        length: String,
        max: usize,
    },

    /// A date pattern could not be used for formatting.
    #[error("Invalid date format '{format}'")]
    InvalidDateFormat { format: String },

    /// Shifting the current date by the offset overflows.
    #[error("Date offset {offset} is out of range")]
    DateOutOfRange { offset: String },

    /// The data source failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EvalError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::MalformedArguments { .. } => ErrorKind::Parse,
            EvalError::DataSetListNotFound { .. }
            | EvalError::DataSetNotFound { .. }
            | EvalError::AttributeNotFound { .. }
            | EvalError::ListValueNotFound { .. }
            | EvalError::NotAReference { .. }
            | EvalError::PathMismatch { .. }
            | EvalError::CyclicReference { .. } => ErrorKind::Resolution,
            EvalError::InvalidBounds { .. }
            | EvalError::InvalidNumber { .. }
            | EvalError::LengthTooLarge { .. }
            | EvalError::InvalidDateFormat { .. }
            | EvalError::DateOutOfRange { .. } => ErrorKind::Evaluation,
            EvalError::Store(_) => ErrorKind::Store,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            EvalError::DataSetListNotFound { .. }
            | EvalError::DataSetNotFound { .. }
            | EvalError::AttributeNotFound { .. }
            | EvalError::ListValueNotFound { .. } => true,
            EvalError::Store(err) => err.is_not_found(),
            _ => false,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        self.kind() == ErrorKind::Parse
    }

    pub fn is_resolution_error(&self) -> bool {
        self.kind() == ErrorKind::Resolution
    }

    pub fn is_evaluation_error(&self) -> bool {
        self.kind() == ErrorKind::Evaluation
    }

    /// Check if this error is a cyclic reference.
    pub fn is_cycle(&self) -> bool {
        matches!(self, EvalError::CyclicReference { .. })
    }
}

impl From<EvalError> for crate::Error {
    fn from(err: EvalError) -> Self {
        crate::Error::Eval(err)
    }
}
