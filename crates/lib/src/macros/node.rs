//! Macro trees.
//!
//! A parsed cell value is a sequence of [`MacroNode`]s: raw literal text and
//! macro calls whose children are again nodes. Text is stored exactly as
//! written (escapes included) so that [`MacroTree::to_source`] always
//! reproduces the parsed input.

use super::{builder::TreeBuilder, registry::MacroKind, registry::MacroRegistry, tokenizer::Tokenizer};
use crate::constants::{ARGUMENT_SEPARATOR, MACRO_MARKER};

/// One node of a macro tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroNode {
    /// Raw literal text, still escaped.
    Text(String),
    Call(MacroCall),
}

impl MacroNode {
    /// Appends the source text of this node.
    pub fn write_source(&self, out: &mut String) {
        match self {
            MacroNode::Text(raw) => out.push_str(raw),
            MacroNode::Call(call) => call.write_source(out),
        }
    }

    pub fn as_call(&self) -> Option<&MacroCall> {
        match self {
            MacroNode::Call(call) => Some(call),
            MacroNode::Text(_) => None,
        }
    }
}

/// A macro call `#name(children)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    /// The name as written in the source.
    pub name: String,
    pub kind: MacroKind,
    pub children: Vec<MacroNode>,
}

impl MacroCall {
    /// Appends `#name(children)` to `out`.
    pub fn write_source(&self, out: &mut String) {
        out.push(MACRO_MARKER);
        out.push_str(&self.name);
        out.push('(');
        for child in &self.children {
            child.write_source(out);
        }
        out.push(')');
    }

    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    /// Splits the children into comma-separated arguments.
    ///
    /// Only commas at paren depth zero in literal text separate arguments;
    /// nested calls always stay inside the argument they appear in. An empty
    /// body has no arguments, while `a,` has two (the second empty).
    pub fn arguments(&self) -> Vec<Vec<MacroNode>> {
        let mut arguments = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0usize;
        for child in &self.children {
            let raw = match child {
                MacroNode::Text(raw) => raw,
                MacroNode::Call(_) => {
                    current.push(child.clone());
                    continue;
                }
            };
            let mut piece = String::new();
            for c in raw.chars() {
                match c {
                    '(' => depth += 1,
                    ')' => depth = depth.saturating_sub(1),
                    ARGUMENT_SEPARATOR if depth == 0 => {
                        if !piece.is_empty() {
                            current.push(MacroNode::Text(std::mem::take(&mut piece)));
                        }
                        arguments.push(std::mem::take(&mut current));
                        continue;
                    }
                    _ => {}
                }
                piece.push(c);
            }
            if !piece.is_empty() {
                current.push(MacroNode::Text(piece));
            }
        }
        if !arguments.is_empty() || !current.is_empty() {
            arguments.push(current);
        }
        arguments
    }
}

/// A parsed text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTree {
    nodes: Vec<MacroNode>,
}

impl MacroTree {
    pub(crate) fn from_nodes(nodes: Vec<MacroNode>) -> Self {
        Self { nodes }
    }

    /// Tokenizes and builds the tree for `text` in one pass.
    pub fn parse(text: &str, registry: &MacroRegistry) -> Self {
        let mut builder = TreeBuilder::new(registry);
        for token in Tokenizer::new(text, registry) {
            builder.push(token);
        }
        builder.finish()
    }

    pub fn nodes(&self) -> &[MacroNode] {
        &self.nodes
    }

    /// Whether any macro call appears at the top level.
    pub fn has_macros(&self) -> bool {
        self.nodes.iter().any(|node| node.as_call().is_some())
    }

    /// The exact text this tree was parsed from.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_source(&mut out);
        }
        out
    }
}
