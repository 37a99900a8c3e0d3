//! Macro evaluation and cross-dataset reference resolution.
//!
//! An [`EvaluationContext`] is created per request. It locates the value that
//! wins at a [`ParameterPositionContext`] through the override trie of the
//! top-level DataSetList, evaluates the macros inside it and memoizes the
//! result. Recursion through reference macros carries a [`Scope`] by value;
//! its visited set breaks reference cycles.

mod context;
mod errors;
mod position;
mod reference;

pub use context::{EvaluationContext, Evaluated, Located};
pub use errors::{ErrorKind, EvalError};
pub use position::{ParameterPositionContext, Scope};
pub use reference::ReferenceKind;
