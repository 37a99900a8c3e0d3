//! Macro registry
//!
//! Maps case-insensitive macro names to a [`MacroKind`]. The registry is built
//! once at startup and answers the two questions the tokenizer asks while it
//! speculatively reads a name after `#`: is this a prefix of some registered
//! name, and is it exactly a registered name.

use std::collections::BTreeMap;

use crate::constants::names;

/// What a registered macro does when evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    /// Recognized but left untouched: evaluates to its own source text.
    Passthrough,
    /// `#RANDOM(n)`: n random digits.
    Random,
    /// `#RANDOMBETWEEN(min,max)`: integer in the inclusive range.
    RandomBetween,
    /// `#RANDOMCHAR()`: one uppercase letter.
    RandomChar,
    /// `#RANDOMCHARS(n)`: n uppercase letters.
    RandomChars,
    /// `#UUID()`: lowercase v4 UUID.
    Uuid,
    /// `#UUID_UPPER()`: uppercase v4 UUID.
    UuidUpper,
    /// `#DATE(offset,format)`: shifted current date.
    Date,
    /// `#CONCAT(a,b,...)`: concatenation of arguments.
    Concat,
    /// `#REF(ds.attr...)`: a cell of another DataSet of the current group.
    Ref,
    /// `#REF_DSL(dsl.ds.attr...)`: a cell anywhere.
    RefDsl,
    /// `#REF_THIS(attr...)`: a cell of the same top-level column.
    RefThis,
}

impl MacroKind {
    /// Whether this macro reads another cell.
    pub fn is_reference(&self) -> bool {
        matches!(self, MacroKind::Ref | MacroKind::RefDsl | MacroKind::RefThis)
    }
}

/// Name lookups the tokenizer needs to recognize macro boundaries.
pub trait MacroNames {
    /// Whether `prefix` starts at least one registered name.
    fn partially_equals(&self, prefix: &str) -> bool;

    /// Whether `name` is exactly a registered name.
    fn fully_equals(&self, name: &str) -> bool;
}

/// Case-insensitive name to [`MacroKind`] table.
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    by_name: BTreeMap<String, MacroKind>,
}

impl MacroRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in macro.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(names::RANDOM, MacroKind::Random);
        registry.register(names::RANDOM_BETWEEN, MacroKind::RandomBetween);
        registry.register(names::RANDOM_CHAR, MacroKind::RandomChar);
        registry.register(names::RANDOM_CHARS, MacroKind::RandomChars);
        registry.register(names::UUID, MacroKind::Uuid);
        registry.register(names::UUID_UPPER, MacroKind::UuidUpper);
        registry.register(names::DATE, MacroKind::Date);
        registry.register(names::CONCAT, MacroKind::Concat);
        registry.register(names::REF, MacroKind::Ref);
        registry.register(names::REF_DSL, MacroKind::RefDsl);
        registry.register(names::REF_THIS, MacroKind::RefThis);
        registry
    }

    /// Registers `name` (case-insensitive), returning the kind it replaced.
    pub fn register(&mut self, name: &str, kind: MacroKind) -> Option<MacroKind> {
        self.by_name.insert(name.to_uppercase(), kind)
    }

    /// Registers a macro that is evaluated elsewhere and must survive untouched.
    pub fn register_passthrough(&mut self, name: &str) -> Option<MacroKind> {
        self.register(name, MacroKind::Passthrough)
    }

    /// Looks up the kind registered for `name`.
    pub fn lookup(&self, name: &str) -> Option<MacroKind> {
        self.by_name.get(&name.to_uppercase()).copied()
    }

    /// Registered names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl MacroNames for MacroRegistry {
    fn partially_equals(&self, prefix: &str) -> bool {
        let prefix = prefix.to_uppercase();
        self.by_name
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(name, _)| name.starts_with(&prefix))
    }

    fn fully_equals(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_uppercase())
    }
}
