//! `REF`, `REF_DSL` and `REF_THIS` resolution.

use datasets::{Id, model::AttributePath};

use crate::helpers::*;

/// Adds a Top-level TEXT attribute holding `text` in Main and returns its value.
fn top_cell(h: &Hierarchy, name: &str, text: &str) -> String {
    let attribute = h.store.text_attribute(h.top, name).unwrap();
    h.store.set_text(h.main, attribute, text).unwrap();
    h.resolver()
        .resolve(&h.main, &attribute, &AttributePath::root())
}

/// Adds a Low TEXT attribute holding `text` in Low's Default column.
fn low_cell(h: &Hierarchy, name: &str, text: &str) -> Id {
    let attribute = h.store.text_attribute(h.low, name).unwrap();
    h.store.set_text(h.low_default, attribute, text).unwrap();
    attribute
}

#[test]
fn test_ref_dsl_dotted_and_comma_forms() {
    let h = Hierarchy::new();
    assert_eq!(top_cell(&h, "A", "#REF_DSL(Low.Overlap.SomeAttr)"), "Overlap value");
    assert_eq!(top_cell(&h, "B", "#REF_DSL(Low, Default, SomeAttr)"), "Default value");
    assert_eq!(
        top_cell(&h, "C", "[#REF_DSL(Low.Default.SomeAttr)]"),
        "[Default value]"
    );
}

#[test]
fn test_ref_dsl_accepts_ids() {
    let h = Hierarchy::new();
    let text = format!("#REF_DSL({},{},{})", h.low, h.low_overlap, h.some_attr);
    assert_eq!(top_cell(&h, "A", &text), "Overlap value");
}

#[test]
fn test_ref_dsl_follows_paths_and_overrides() {
    let h = Hierarchy::new();
    h.redirect_low(h.main);
    assert_eq!(
        top_cell(&h, "A", "#REF_DSL(Top.Main.Middle.Low.SomeAttr)"),
        "Overlap value"
    );
    assert_eq!(
        top_cell(&h, "B", "#REF_DSL(Top.Other.Middle.Low.SomeAttr)"),
        "Default value"
    );
}

#[test]
fn test_ref_resolves_in_the_owning_data_set_list() {
    let h = Hierarchy::new();
    let echo = low_cell(&h, "Echo", "#REF(Overlap,SomeAttr)");
    let value = h.resolver().resolve(&h.main, &echo, &h.low_path());
    assert_eq!(value, "Overlap value");
}

#[test]
fn test_ref_this_uses_the_top_level_column() {
    let h = Hierarchy::new();
    let title = h.store.text_attribute(h.top, "Title").unwrap();
    h.store.set_text(h.main, title, "Main title").unwrap();
    h.store.set_text(h.other, title, "Other title").unwrap();
    let back = low_cell(&h, "Back", "#REF_THIS(Title)");

    let resolver = h.resolver();
    assert_eq!(resolver.resolve(&h.main, &back, &h.low_path()), "Main title");
    assert_eq!(resolver.resolve(&h.other, &back, &h.low_path()), "Other title");
}

#[test]
fn test_ref_this_sees_overrides_of_the_pass() {
    let h = Hierarchy::new();
    h.redirect_low(h.main);
    assert_eq!(
        top_cell(&h, "Summary", "Got #REF_THIS(Middle.Low.SomeAttr)"),
        "Got Overlap value"
    );
}

#[test]
fn test_unresolvable_references_render_inline() {
    let h = Hierarchy::new();
    assert_eq!(
        top_cell(&h, "A", "x#REF_DSL(Nope.X.Y)"),
        "x[DataSetList 'Nope' not found]"
    );
    assert_eq!(
        top_cell(&h, "B", "#REF_DSL(Low.Nope.SomeAttr)"),
        format!("[DataSet 'Nope' not found in DataSetList {}]", h.low)
    );
    assert_eq!(
        top_cell(&h, "C", "#REF_THIS(Missing)"),
        format!("[Attribute 'Missing' not found in DataSetList {}]", h.top)
    );
    top_cell(&h, "Title", "plain");
    assert_eq!(
        top_cell(&h, "D", "#REF_THIS(Title.X)"),
        "[Attribute 'Title' is not a DSL reference]"
    );
}

#[test]
fn test_malformed_references_render_inline() {
    let h = Hierarchy::new();
    assert_eq!(
        top_cell(&h, "A", "#REF_DSL(Low.Default)"),
        "[REF_DSL: expects a DataSetList, a DataSet and an attribute]"
    );
    assert_eq!(
        top_cell(&h, "B", "#REF_THIS(Middle..SomeAttr)"),
        "[REF_THIS: empty reference segment]"
    );
    assert_eq!(
        top_cell(&h, "C", "#REF_THIS()"),
        "[REF_THIS: missing attribute]"
    );
}

#[test]
fn test_self_reference_is_a_cycle() {
    let h = Hierarchy::new();
    let value = top_cell(&h, "Loop", "a#REF_THIS(Loop)b");
    assert!(value.starts_with("a[Cyclic reference at "), "got {value}");
    assert!(value.ends_with("]b"), "got {value}");
}

#[test]
fn test_mutual_references_are_cut_once() {
    let h = Hierarchy::new();
    let ping = h.store.text_attribute(h.top, "Ping").unwrap();
    h.store.set_text(h.main, ping, "x#REF_THIS(Pong)").unwrap();
    let value = top_cell(&h, "Pong", "y#REF_THIS(Ping)");
    assert!(value.starts_with("yx[Cyclic reference at "), "got {value}");
}

#[test]
fn test_resolve_reference_on_the_resolver() {
    let h = Hierarchy::new();
    h.redirect_low(h.main);
    let resolver = h.resolver();
    assert_eq!(
        resolver.resolve_reference("Top.Main.Middle.Low.SomeAttr"),
        "Overlap value"
    );
    assert_eq!(resolver.resolve_reference("Top.Main.Middle"), "Middle Default");
    assert_eq!(resolver.resolve_reference("Top.Main.Middle.Low"), "Overlap");
    assert_eq!(
        resolver.resolve_reference("Top.Main"),
        "[REF_DSL: expects a DataSetList, a DataSet and an attribute]"
    );
}

#[test]
fn test_resolve_reference_scopes_the_target_cell() {
    let h = Hierarchy::new();
    h.redirect_low(h.main);
    let label = h.store.text_attribute(h.top, "Label").unwrap();
    h.store.set_text(h.main, label, "main label").unwrap();
    let echo = h.store.text_attribute(h.top, "Echo").unwrap();
    h.store
        .set_text(h.other, echo, "#REF_THIS(Middle.Low.SomeAttr) / #REF(Main,Label)")
        .unwrap();

    assert_eq!(
        h.resolver().resolve_reference("Top.Other.Echo"),
        "Default value / main label"
    );
    assert_eq!(
        h.resolver().resolve_reference(&format!("{}.{}.{}", h.top, h.other, echo)),
        "Default value / main label"
    );
}
