//! Override precedence along DSL reference chains.

use datasets::{
    eval::ParameterPositionContext,
    model::{AttributeKey, AttributePath, ParameterValue},
    overlay,
};

use crate::helpers::*;

#[test]
fn test_without_override_the_reference_chain_wins() {
    let h = Hierarchy::new();
    assert_eq!(h.some_attr_in(h.main), "Default value");
}

#[test]
fn test_override_redirects_nested_group() {
    let h = Hierarchy::new();
    h.redirect_low(h.main);

    assert_eq!(h.some_attr_in(h.main), "Overlap value");
    // Overrides are scoped to one top-level column.
    assert_eq!(h.some_attr_in(h.other), "Default value");
}

#[test]
fn test_override_only_applies_at_its_exact_prefix() {
    let h = Hierarchy::new();
    // Registered one level too shallow: there is no Low attribute in Top.
    h.store
        .add_overlap(
            h.main,
            AttributePath::from(vec![h.to_middle]),
            h.to_low,
            ParameterValue::DataSetRef(h.low_overlap),
        )
        .unwrap();
    assert_eq!(h.some_attr_in(h.main), "Default value");
}

#[test]
fn test_leaf_override_replaces_value() {
    let h = Hierarchy::new();
    h.store
        .add_overlap(
            h.main,
            h.low_path(),
            h.some_attr,
            ParameterValue::text("Leaf #CONCAT(over,ride)"),
        )
        .unwrap();

    let resolver = h.resolver();
    let mut context = resolver.context();
    let position = ParameterPositionContext::new(h.top, h.main, h.low_path(), h.some_attr);
    let evaluated = context.resolve(&position);
    assert_eq!(evaluated.value.as_deref(), Some("Leaf override"));
    assert!(evaluated.overlap);

    let other = ParameterPositionContext::new(h.top, h.other, h.low_path(), h.some_attr);
    let evaluated = context.resolve(&other);
    assert_eq!(evaluated.value.as_deref(), Some("Default value"));
    assert!(!evaluated.overlap);
}

#[test]
fn test_leaf_override_beats_redirect() {
    let h = Hierarchy::new();
    h.redirect_low(h.main);
    h.store
        .add_overlap(
            h.main,
            h.low_path(),
            h.some_attr,
            ParameterValue::text("Pinned"),
        )
        .unwrap();
    assert_eq!(h.some_attr_in(h.main), "Pinned");
}

#[test]
fn test_override_reaches_groups_without_stored_reference() {
    let h = Hierarchy::new();
    let lonely = h.store.data_set(h.top, "Lonely").unwrap();
    // Lonely references nothing, but an override supplies the whole chain.
    h.store
        .add_overlap(
            lonely,
            AttributePath::from(vec![h.to_middle]),
            h.to_middle,
            ParameterValue::DataSetRef(h.middle_default),
        )
        .unwrap();
    h.redirect_low(lonely);
    assert_eq!(h.some_attr_in(lonely), "Overlap value");
}

#[test]
fn test_first_duplicate_override_wins() {
    let h = Hierarchy::new();
    h.redirect_low(h.main);
    h.store
        .add_overlap(
            h.main,
            h.low_path(),
            h.to_low,
            ParameterValue::DataSetRef(h.low_default),
        )
        .unwrap();
    assert_eq!(h.some_attr_in(h.main), "Overlap value");
}

#[test]
fn test_dangling_rows_are_ignored() {
    let h = Hierarchy::new();
    h.store.insert_overlap_row(AttributeKey {
        id: datasets::Id::random(),
        data_set_list: h.top,
        data_set: h.main,
        path: AttributePath::from(vec![h.to_middle, datasets::Id::random()]),
        attribute: h.to_low,
        value: ParameterValue::DataSetRef(h.low_overlap),
    });

    let trie = overlay::load(&*h.store, &h.top).unwrap();
    assert!(trie.is_empty());
    assert_eq!(h.some_attr_in(h.main), "Default value");
}

#[test]
fn test_path_must_follow_the_chain() {
    let h = Hierarchy::new();
    let value = h
        .resolver()
        .resolve(&h.main, &h.some_attr, &AttributePath::from(vec![h.to_low]));
    assert!(value.starts_with("[Path segment"), "got {value}");
}
