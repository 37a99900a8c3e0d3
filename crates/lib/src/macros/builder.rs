//! Builds macro trees from a token stream.

use super::{
    node::{MacroCall, MacroNode, MacroTree},
    registry::{MacroKind, MacroRegistry},
    tokenizer::{Token, TokenKind},
};

/// A macro call still waiting for its closing paren.
#[derive(Debug)]
struct OpenCall {
    name: String,
    kind: MacroKind,
    children: Vec<MacroNode>,
}

/// Stack-based consumer of [`Token`]s.
///
/// `FormulaStart` opens a call, text tokens attach to the innermost open call
/// (or the top level), `FormulaEnd` closes the innermost call. Names the
/// registry does not know become passthrough calls that re-emit their source.
#[derive(Debug)]
pub struct TreeBuilder<'r> {
    registry: &'r MacroRegistry,
    stack: Vec<OpenCall>,
    roots: Vec<MacroNode>,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r MacroRegistry) -> Self {
        Self {
            registry,
            stack: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Consumes one token.
    pub fn push(&mut self, token: Token) {
        match token.kind {
            TokenKind::TextPart | TokenKind::ProbablyFormula => self.push_text(&token.text),
            TokenKind::FormulaStart => {
                let kind = self
                    .registry
                    .lookup(&token.text)
                    .unwrap_or(MacroKind::Passthrough);
                self.stack.push(OpenCall {
                    name: token.text,
                    kind,
                    children: Vec::new(),
                });
            }
            TokenKind::FormulaEnd => {
                self.push_text(&token.text);
                match self.stack.pop() {
                    Some(open) => {
                        let call = MacroCall {
                            name: open.name,
                            kind: open.kind,
                            children: open.children,
                        };
                        self.current().push(MacroNode::Call(call));
                    }
                    None => self.push_text(")"),
                }
            }
        }
    }

    /// Closes the build, turning unclosed calls back into text.
    pub fn finish(mut self) -> MacroTree {
        while let Some(open) = self.stack.pop() {
            let mut head = String::from(crate::constants::MACRO_MARKER);
            head.push_str(&open.name);
            head.push('(');
            self.push_text(&head);
            for child in open.children {
                match child {
                    MacroNode::Text(raw) => self.push_text(&raw),
                    call @ MacroNode::Call(_) => self.current().push(call),
                }
            }
        }
        MacroTree::from_nodes(self.roots)
    }

    fn current(&mut self) -> &mut Vec<MacroNode> {
        match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.roots,
        }
    }

    /// Appends raw text, merging with a preceding text node.
    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let nodes = self.current();
        if let Some(MacroNode::Text(last)) = nodes.last_mut() {
            last.push_str(raw);
        } else {
            nodes.push(MacroNode::Text(raw.to_string()));
        }
    }
}
