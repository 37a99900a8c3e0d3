//! Character-level tokenizer for macros embedded in free text.
//!
//! The tokenizer is a small state machine pulled one token at a time. It never
//! fails: anything that does not turn out to be a registered macro call is
//! returned as literal text, and concatenating [`Token::source`] over the whole
//! stream reproduces the input exactly.
//!
//! ```rust
//! use datasets::macros::{MacroRegistry, TokenKind, Tokenizer};
//!
//! let registry = MacroRegistry::builtin();
//! let kinds: Vec<_> = Tokenizer::new("first.#REF_DSL(1.2.3).third", &registry)
//!     .map(|token| token.kind)
//!     .collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::TextPart, TokenKind::FormulaStart, TokenKind::FormulaEnd, TokenKind::TextPart]
//! );
//! ```

use std::{collections::VecDeque, str::Chars};

use super::registry::MacroNames;
use crate::constants::MACRO_MARKER;

/// Kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Input ended while a macro name was still being read after `#`.
    ProbablyFormula,
    /// Literal text.
    TextPart,
    /// `#NAME(`; the token text is the name as written.
    FormulaStart,
    /// `body)`; the token text is the body text since the last nested macro.
    FormulaEnd,
}

/// One token with the raw text it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Appends the source text this token was read from.
    pub fn write_source(&self, out: &mut String) {
        match self.kind {
            TokenKind::FormulaStart => {
                out.push(MACRO_MARKER);
                out.push_str(&self.text);
                out.push('(');
            }
            TokenKind::FormulaEnd => {
                out.push_str(&self.text);
                out.push(')');
            }
            TokenKind::ProbablyFormula | TokenKind::TextPart => out.push_str(&self.text),
        }
    }

    /// The source text this token was read from.
    pub fn source(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + 2);
        self.write_source(&mut out);
        out
    }
}

/// Rebuilds the original input from a token stream.
pub fn reconstruct<'t>(tokens: impl IntoIterator<Item = &'t Token>) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_source(&mut out);
    }
    out
}

/// Tokenizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    /// Not inside a macro name; initial state and state after `)` closed a call.
    FormulaEnd,
    /// Reading a candidate macro name after `#`.
    ProbablyFormula,
    /// A macro call was just opened.
    FormulaStart,
    /// Accumulating literal text or a macro body.
    TextPart,
}

/// Pull-based tokenizer over one input string.
pub struct Tokenizer<'a, N: MacroNames + ?Sized> {
    chars: Chars<'a>,
    names: &'a N,
    state: TokenizerState,
    /// Text read since the last emitted token, `#` and candidate name excluded.
    pending: String,
    /// Candidate macro name read after `#`.
    name: String,
    /// Paren depth of every open macro call, innermost last.
    depths: Vec<usize>,
    ready: VecDeque<Token>,
    done: bool,
}

impl<'a, N: MacroNames + ?Sized> Tokenizer<'a, N> {
    pub fn new(input: &'a str, names: &'a N) -> Self {
        Self {
            chars: input.chars(),
            names,
            state: TokenizerState::FormulaEnd,
            pending: String::new(),
            name: String::new(),
            depths: Vec::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }

    pub fn state(&self) -> TokenizerState {
        self.state
    }

    /// Number of macro calls opened and not yet closed.
    pub fn open_formulas(&self) -> usize {
        self.depths.len()
    }

    fn consume(&mut self, c: char) {
        match self.state {
            TokenizerState::ProbablyFormula => self.consume_name(c),
            _ => self.consume_text(c),
        }
    }

    fn consume_name(&mut self, c: char) {
        if c == '(' && self.names.fully_equals(&self.name) {
            self.open_formula();
            return;
        }
        self.name.push(c);
        if self.names.partially_equals(&self.name) {
            return;
        }
        self.name.pop();
        // Not a macro after all: the marker and the name read so far are text.
        self.pending.push(MACRO_MARKER);
        self.pending.push_str(&self.name);
        self.name.clear();
        self.state = TokenizerState::TextPart;
        self.consume_text(c);
    }

    fn consume_text(&mut self, c: char) {
        if c == MACRO_MARKER {
            self.name.clear();
            self.state = TokenizerState::ProbablyFormula;
            return;
        }
        match (c, self.depths.last().copied()) {
            (')', Some(0)) => {
                self.depths.pop();
                let body = std::mem::take(&mut self.pending);
                self.ready.push_back(Token::new(TokenKind::FormulaEnd, body));
                self.state = TokenizerState::FormulaEnd;
            }
            ('(', Some(depth)) => self.set_depth(depth + 1, c),
            (')', Some(depth)) => self.set_depth(depth - 1, c),
            _ => {
                self.pending.push(c);
                self.state = TokenizerState::TextPart;
            }
        }
    }

    fn set_depth(&mut self, depth: usize, c: char) {
        if let Some(current) = self.depths.last_mut() {
            *current = depth;
        }
        self.pending.push(c);
        self.state = TokenizerState::TextPart;
    }

    fn open_formula(&mut self) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.ready.push_back(Token::new(TokenKind::TextPart, text));
        }
        let name = std::mem::take(&mut self.name);
        self.ready.push_back(Token::new(TokenKind::FormulaStart, name));
        self.depths.push(0);
        self.state = TokenizerState::FormulaStart;
    }

    fn finish(&mut self) {
        self.done = true;
        if self.state == TokenizerState::ProbablyFormula {
            let mut text = std::mem::take(&mut self.pending);
            text.push(MACRO_MARKER);
            text.push_str(&self.name);
            self.name.clear();
            self.ready.push_back(Token::new(TokenKind::ProbablyFormula, text));
        } else if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.ready.push_back(Token::new(TokenKind::TextPart, text));
        }
    }
}

impl<N: MacroNames + ?Sized> Iterator for Tokenizer<'_, N> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.ready.pop_front() {
                return Some(token);
            }
            if self.done {
                return None;
            }
            match self.chars.next() {
                Some(c) => self.consume(c),
                None => self.finish(),
            }
        }
    }
}

/// Tokenizes a whole string eagerly.
pub fn tokenize<N: MacroNames + ?Sized>(input: &str, names: &N) -> Vec<Token> {
    Tokenizer::new(input, names).collect()
}
