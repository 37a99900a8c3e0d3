//! Path-indexed override lookup.
//!
//! All override rows of one top-level DataSetList are fetched in a single
//! batch and indexed into an [`OverlapNode`] trie: one node per path prefix,
//! each holding the overrides registered for exactly that prefix, keyed by
//! column and then by attribute. Lookups walk the path in O(depth) instead of
//! querying the collaborator once per nested group.

use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    marker::PhantomData,
};

use tracing::{debug, warn};

use crate::{
    model::{AttributeKey, Id},
    source::{DataSource, StoreError},
    traversal::{PreorderWalk, TraversalHandler},
};

/// One node of the override trie.
#[derive(Debug, Clone, Default)]
pub struct OverlapNode {
    /// column -> attribute -> override
    slots: HashMap<Id, HashMap<Id, AttributeKey>>,
    /// next path segment -> child
    children: HashMap<Id, OverlapNode>,
}

impl OverlapNode {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a trie from a batch of rows.
    pub fn from_rows(rows: impl IntoIterator<Item = AttributeKey>) -> Self {
        let mut root = Self::new();
        for row in rows {
            root.insert(row);
        }
        root
    }

    /// Inserts a row at its path, creating nodes on demand.
    ///
    /// Returns `false` if an override for the same attribute already exists at
    /// that path and column; the existing row is kept.
    pub fn insert(&mut self, row: AttributeKey) -> bool {
        let mut node = self;
        for segment in row.path.iter() {
            node = node.children.entry(*segment).or_default();
        }
        match node
            .slots
            .entry(row.data_set)
            .or_default()
            .entry(row.attribute)
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(row);
                true
            }
        }
    }

    /// The node for exactly `path`, if any override lives at or below it.
    pub fn node(&self, path: &[Id]) -> Option<&OverlapNode> {
        let mut node = self;
        for segment in path {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    /// The override of `attribute` registered for exactly `path` and `column`.
    pub fn get_overlap(&self, path: &[Id], column: &Id, attribute: &Id) -> Option<&AttributeKey> {
        self.node(path)?.slots.get(column)?.get(attribute)
    }

    /// Whether any override for `column` exists at `path` or below it.
    pub fn contains_overlaps_in_path(&self, path: &[Id], column: &Id) -> bool {
        let Some(start) = self.node(path) else {
            return false;
        };
        PreorderWalk::new(start, Subtree::new()).any(|visit| visit.node.slots.contains_key(column))
    }

    /// Overrides registered directly at this node for `column`.
    pub fn overlaps_for(&self, column: &Id) -> impl Iterator<Item = &AttributeKey> {
        self.slots.get(column).into_iter().flat_map(|slot| slot.values())
    }

    /// Total number of rows in this node and below.
    pub fn len(&self) -> usize {
        PreorderWalk::new(self, Subtree::new())
            .map(|visit| visit.node.slots.values().map(HashMap::len).sum::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.children.is_empty()
    }
}

/// Walks an [`OverlapNode`] subtree.
struct Subtree<'a>(PhantomData<&'a OverlapNode>);

impl<'a> Subtree<'a> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'a> TraversalHandler for Subtree<'a> {
    type Node = &'a OverlapNode;

    fn children(&mut self, parent: &&'a OverlapNode) -> Vec<&'a OverlapNode> {
        parent.children.values().collect()
    }
}

/// Loads and indexes the override rows of `data_set_list`.
///
/// Rows referencing unknown attributes, or whose path runs through an
/// attribute that is not DSL-typed, are skipped: a stale row counts as no
/// override at all. Each distinct attribute is read from `source` once.
pub fn load(source: &dyn DataSource, data_set_list: &Id) -> Result<OverlapNode, StoreError> {
    let rows = source.overlaps(data_set_list)?;
    let total = rows.len();
    let catalog = AttributeCatalog::fetch(source, &rows)?;
    let mut root = OverlapNode::new();
    let mut skipped = 0usize;
    for row in rows {
        if !catalog.is_well_formed(&row) {
            warn!(row = %row.id, dsl = %data_set_list, "Skipping override row with dangling attribute");
            skipped += 1;
            continue;
        }
        if !root.insert(row) {
            debug!(dsl = %data_set_list, "Ignoring duplicate override row");
        }
    }
    debug!(dsl = %data_set_list, total, skipped, attributes = catalog.len(), "Loaded override rows");
    Ok(root)
}

/// Attribute id -> whether it nests a DataSetList, for every attribute the
/// rows mention that exists.
struct AttributeCatalog(HashMap<Id, bool>);

impl AttributeCatalog {
    fn fetch(source: &dyn DataSource, rows: &[AttributeKey]) -> Result<Self, StoreError> {
        let mut known = HashMap::new();
        let mut missing = HashSet::new();
        let mentioned = rows
            .iter()
            .flat_map(|row| row.path.iter().chain(std::iter::once(&row.attribute)));
        for id in mentioned {
            if known.contains_key(id) || missing.contains(id) {
                continue;
            }
            match source.attribute(id)? {
                Some(attribute) => {
                    known.insert(*id, attribute.is_reference());
                }
                None => {
                    missing.insert(*id);
                }
            }
        }
        Ok(Self(known))
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn is_well_formed(&self, row: &AttributeKey) -> bool {
        self.0.contains_key(&row.attribute)
            && row
                .path
                .iter()
                .all(|segment| self.0.get(segment).copied().unwrap_or(false))
    }
}
