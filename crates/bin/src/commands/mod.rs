pub mod eval;
pub mod resolve;
pub mod tokens;
pub mod tree;
