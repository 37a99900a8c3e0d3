//! Resolved tree building.

use std::sync::Arc;

use datasets::{
    InMemoryStore, model::AttributeType, model::ParameterValue, tree::ResolvedAttribute,
};

use crate::helpers::*;

fn names(attributes: &[ResolvedAttribute]) -> Vec<&str> {
    attributes.iter().map(|a| a.name.as_str()).collect()
}

#[test]
fn test_tree_nests_referenced_groups() {
    let h = Hierarchy::new();
    let tree = h.resolver().build_tree(&h.top).unwrap();

    assert_eq!(tree.name, "Top");
    let columns: Vec<&str> = tree.data_sets.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(columns, vec!["Main", "Other"]);

    let middle = tree.find(&["Middle"]).unwrap();
    assert_eq!(middle.kind, AttributeType::Dsl);
    assert_eq!(
        middle.value_in(&h.main).unwrap().value.as_deref(),
        Some("Middle Default")
    );
    assert_eq!(names(&middle.children), vec!["Low"]);

    let some_attr = tree.find(&["Middle", "Low", "SomeAttr"]).unwrap();
    for column in [h.main, h.other] {
        let value = some_attr.value_in(&column).unwrap();
        assert_eq!(value.value.as_deref(), Some("Default value"));
        assert!(!value.overlap);
    }
}

#[test]
fn test_tree_marks_overridden_values() {
    let h = Hierarchy::new();
    h.redirect_low(h.main);
    let tree = h.resolver().build_tree(&h.top).unwrap();

    let low = tree.find(&["Middle", "Low"]).unwrap();
    let main = low.value_in(&h.main).unwrap();
    assert_eq!(main.value.as_deref(), Some("Overlap"));
    assert!(main.overlap);
    assert_eq!(
        low.value_in(&h.other).unwrap().value.as_deref(),
        Some("Default")
    );

    let some_attr = tree.find(&["Middle", "Low", "SomeAttr"]).unwrap();
    let main = some_attr.value_in(&h.main).unwrap();
    assert_eq!(main.value.as_deref(), Some("Overlap value"));
    assert!(main.overlap);
    let other = some_attr.value_in(&h.other).unwrap();
    assert_eq!(other.value.as_deref(), Some("Default value"));
    assert!(!other.overlap);
}

#[test]
fn test_unreferenced_groups_are_not_expanded() {
    let h = Hierarchy::new();
    h.store
        .reference_attribute(h.top, "Spare", h.low)
        .unwrap();
    let tree = h.resolver().build_tree(&h.top).unwrap();

    let spare = tree.find(&["Spare"]).unwrap();
    assert!(spare.children.is_empty());
    assert!(spare.values.iter().all(|v| v.value.is_none()));
}

#[test]
fn test_overrides_below_a_group_expand_it() {
    let h = Hierarchy::new();
    let spare = h
        .store
        .reference_attribute(h.top, "Spare", h.low)
        .unwrap();
    h.store
        .add_overlap(
            h.other,
            datasets::model::AttributePath::from(vec![spare]),
            h.some_attr,
            ParameterValue::text("From override"),
        )
        .unwrap();
    let tree = h.resolver().build_tree(&h.top).unwrap();

    let value = tree.find(&["Spare", "SomeAttr"]).unwrap();
    let other = value.value_in(&h.other).unwrap();
    assert_eq!(other.value.as_deref(), Some("From override"));
    assert!(other.overlap);
    assert_eq!(value.value_in(&h.main).unwrap().value, None);
}

#[test]
fn test_cyclic_groups_stop_expanding() {
    let store = Arc::new(InMemoryStore::new());
    let ping = store.data_set_list("Ping");
    let pong = store.data_set_list("Pong");
    let p1 = store.data_set(ping, "P1").unwrap();
    let q1 = store.data_set(pong, "Q1").unwrap();
    let to_pong = store.reference_attribute(ping, "Pong", pong).unwrap();
    let to_ping = store.reference_attribute(pong, "Ping", ping).unwrap();
    let label = store.text_attribute(pong, "Label").unwrap();
    store.set_reference(p1, to_pong, q1).unwrap();
    store.set_reference(q1, to_ping, p1).unwrap();
    store.set_text(q1, label, "pong label").unwrap();

    let tree = test_resolver(store).build_tree(&ping).unwrap();
    let group = tree.find(&["Pong"]).unwrap();
    assert_eq!(names(&group.children), vec!["Ping", "Label"]);

    let back = tree.find(&["Pong", "Ping"]).unwrap();
    assert_eq!(back.value_in(&p1).unwrap().value.as_deref(), Some("P1"));
    assert!(back.children.is_empty());
    assert_eq!(
        tree.find(&["Pong", "Label"])
            .unwrap()
            .value_in(&p1)
            .unwrap()
            .value
            .as_deref(),
        Some("pong label")
    );
}

#[test]
fn test_tree_serializes_for_clients() {
    let h = Hierarchy::new();
    let tree = h.resolver().build_tree(&h.top).unwrap();
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json["name"], "Top");
    let middle = &json["attributes"][0];
    assert_eq!(middle["type"], "DSL");
    let some_attr = &middle["children"][0]["children"][0];
    assert_eq!(some_attr["name"], "SomeAttr");
    assert_eq!(some_attr["type"], "TEXT");
    assert!(some_attr.get("children").is_none());
    assert_eq!(some_attr["values"][0]["value"], "Default value");
    assert_eq!(some_attr["values"][0]["overlap"], false);
}

#[test]
fn test_missing_list_is_the_only_failure() {
    let h = Hierarchy::new();
    let err = h.resolver().build_tree(&datasets::Id::random()).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.module(), "eval");

    let empty = h.store.data_set_list("Empty");
    let tree = h.resolver().build_tree(&empty).unwrap();
    assert!(tree.attributes.is_empty());
    assert!(tree.data_sets.is_empty());
}
