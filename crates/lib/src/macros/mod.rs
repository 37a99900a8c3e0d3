//! The embedded macro language.
//!
//! Cell text may contain calls like `#RANDOM(5)` or `#REF_DSL(dsl.ds.attr)`.
//! Parsing happens in two stages:
//!
//! * [`Tokenizer`] recognizes macro boundaries character by character, using a
//!   [`MacroRegistry`] to decide whether the text after `#` is a macro name.
//! * [`TreeBuilder`] turns the tokens into a [`MacroTree`] of literal text and
//!   nested [`MacroCall`]s.
//!
//! Evaluation is done by [`EvaluationContext`](crate::eval::EvaluationContext),
//! which dispatches on [`MacroKind`] and uses the [`generators`] for the
//! non-reference macros.

mod builder;
mod escape;
pub mod generators;
mod node;
mod registry;
mod tokenizer;


pub use builder::TreeBuilder;
pub use escape::{escape, unescape};
pub use node::{MacroCall, MacroNode, MacroTree};
pub use registry::{MacroKind, MacroNames, MacroRegistry};
pub use tokenizer::{Token, TokenKind, Tokenizer, TokenizerState, reconstruct, tokenize};
