//! Within one evaluation context every position has exactly one value.

use datasets::{Id, eval::ParameterPositionContext, model::AttributePath};

use crate::helpers::*;

fn position(sheet: &Sheet, attribute: Id) -> ParameterPositionContext {
    ParameterPositionContext::new(sheet.dsl, sheet.column, AttributePath::root(), attribute)
}

#[test]
fn test_random_values_are_stable_within_a_context() {
    let sheet = Sheet::new();
    let random = sheet.text("R", "#RANDOM(12)");
    let uuid = sheet.text("U", "#UUID()");

    let resolver = sheet.resolver();
    let mut context = resolver.context();
    let first = context.resolve(&position(&sheet, random));
    let again = context.resolve(&position(&sheet, random));
    assert_eq!(first, again);

    let first = context.resolve(&position(&sheet, uuid));
    let again = context.resolve(&position(&sheet, uuid));
    assert_eq!(first, again);
    assert_eq!(context.cache_len(), 2);
    assert!(context.cached(&position(&sheet, uuid)).is_some());
}

#[test]
fn test_ref_this_reuses_the_first_value() {
    let sheet = Sheet::new();
    let random = sheet.text("R", "#RANDOM(12)");
    let pair = sheet.text("S", "#REF_THIS(R)=#REF_THIS(R)");

    // Referencing cell first.
    let resolver = sheet.resolver();
    let mut context = resolver.context();
    let pair_value = context.resolve(&position(&sheet, pair)).value.unwrap();
    let random_value = context.resolve(&position(&sheet, random)).value.unwrap();
    assert_eq!(pair_value, format!("{random_value}={random_value}"));

    // Referenced cell first.
    let mut context = resolver.context();
    let random_value = context.resolve(&position(&sheet, random)).value.unwrap();
    let pair_value = context.resolve(&position(&sheet, pair)).value.unwrap();
    assert_eq!(pair_value, format!("{random_value}={random_value}"));
}

#[test]
fn test_tree_and_references_agree() {
    let sheet = Sheet::new();
    sheet.text("R", "#UUID()");
    sheet.text("S", "#REF_THIS(R)");

    let tree = sheet.resolver().build_tree(&sheet.dsl).unwrap();
    let r = tree.find(&["R"]).unwrap().value_in(&sheet.column).unwrap();
    let s = tree.find(&["S"]).unwrap().value_in(&sheet.column).unwrap();
    assert_eq!(r.value, s.value);
    assert!(r.value.is_some());
}

#[test]
fn test_separate_contexts_are_independent() {
    let sheet = Sheet::new();
    let random = sheet.text("R", "#RANDOM(18)");
    let resolver = datasets::Resolver::new(sheet.store.clone());

    let first = resolver.context().resolve(&position(&sheet, random));
    let second = resolver.context().resolve(&position(&sheet, random));
    assert_ne!(first.value, second.value);
}
