//!
//! Datasets: hierarchical, reusable test-data templates.
//! This library resolves the values of templates whose cells embed a small
//! macro language and may be overridden at specific points of a reference
//! hierarchy.
//!
//! ## Core Concepts
//!
//! * **DataSetLists (`model::DataSetList`)**: Named templates owning ordered attributes (rows) and data sets (columns).
//! * **Attributes (`model::Attribute`)**: Typed fields. A DSL-typed attribute nests another DataSetList, so templates form an arbitrarily deep and possibly cyclic hierarchy.
//! * **Macros (`macros`)**: `#NAME(args)` calls embedded in text. The [`macros::Tokenizer`] finds macro boundaries, the [`macros::TreeBuilder`] nests them and the [`macros::MacroRegistry`] maps names to behaviors.
//! * **Overrides (`overlay::OverlapNode`)**: Values replacing what a column would inherit through a chain of DSL attributes, indexed by path.
//! * **Evaluation (`eval::EvaluationContext`)**: Request-scoped cache and scope used to evaluate macros and follow `REF`, `REF_DSL` and `REF_THIS` references.
//! * **Resolver ([`Resolver`])**: The entry point. Resolves single values, dotted references and whole [`tree::ResolvedTree`]s over any [`source::DataSource`].

pub mod cache;
pub mod clock;
pub mod constants;
pub mod eval;
pub mod macros;
pub mod model;
pub mod overlay;
pub mod resolver;
pub mod source;
pub mod traversal;
pub mod tree;

pub use clock::{Clock, FixedClock, SystemClock};
pub use eval::{EvalError, EvaluationContext};
pub use macros::MacroRegistry;
pub use model::Id;
pub use resolver::{Resolver, ResolverConfig};
pub use source::{DataSource, InMemoryStore, StoreError};
pub use tree::ResolvedTree;

/// Result type used throughout the datasets library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the datasets library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured data source errors from the source module
    #[error(transparent)]
    Store(source::StoreError),

    /// Structured evaluation errors from the eval module
    #[error(transparent)]
    Eval(eval::EvalError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "source",
            Error::Eval(_) => "eval",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            Error::Eval(eval_err) => eval_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_validation_error(),
            Error::Eval(eval_err) => eval_err.is_parse_error(),
            _ => false,
        }
    }
}
