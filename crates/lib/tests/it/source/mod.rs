//! Data source behavior and persistence.

use std::sync::Arc;

use datasets::{DataSource, InMemoryStore, StoreError};
use tempfile::tempdir;

use crate::helpers::*;

#[test]
fn test_lookups_by_name_and_id() {
    let h = Hierarchy::new();
    let store: &dyn DataSource = &*h.store;

    let top = store.find_data_set_list("Top").unwrap().unwrap();
    assert_eq!(top.id, h.top);
    assert_eq!(top.data_sets, vec![h.main, h.other]);
    let by_id = store.find_data_set_list(&h.top.to_string()).unwrap().unwrap();
    assert_eq!(by_id.name, "Top");

    let column = store.find_data_set(&h.low, "Overlap").unwrap().unwrap();
    assert_eq!(column.id, h.low_overlap);
    assert!(store.find_data_set(&h.top, "Overlap").unwrap().is_none());

    let attribute = store.find_attribute(&h.middle, "Low").unwrap().unwrap();
    assert_eq!(attribute.id, h.to_low);
    assert_eq!(attribute.type_data_set_list, Some(h.low));
}

#[test]
fn test_overrides_are_listed_per_top_level_list() {
    let h = Hierarchy::new();
    let id = h.redirect_low(h.main);

    let rows = h.store.overlaps(&h.top).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].data_set, h.main);
    assert_eq!(rows[0].path, h.low_path());
    assert!(h.store.overlaps(&h.low).unwrap().is_empty());
}

#[test]
fn test_parameters_must_share_the_list() {
    let h = Hierarchy::new();
    let err = h
        .store
        .set_text(h.main, h.some_attr, "misplaced")
        .unwrap_err();
    assert!(matches!(err, StoreError::ScopeMismatch { .. }));

    let err: datasets::Error = err.into();
    assert!(err.is_validation_error());
    assert_eq!(err.module(), "source");
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("store.json");

    let h = Hierarchy::new();
    h.redirect_low(h.main);
    h.store.save_to_file(&path).expect("Failed to save store");

    let loaded = Arc::new(InMemoryStore::load_from_file(&path).expect("Failed to load store"));
    let resolver = test_resolver(loaded.clone());
    assert_eq!(
        resolver.resolve(&h.main, &h.some_attr, &h.low_path()),
        "Overlap value"
    );
    assert_eq!(
        resolver.resolve(&h.other, &h.some_attr, &h.low_path()),
        "Default value"
    );
    assert_eq!(loaded.overlaps(&h.top).unwrap().len(), 1);
}

#[test]
fn test_missing_file_loads_empty_store() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = InMemoryStore::load_from_file(dir.path().join("absent.json"))
        .expect("Failed to load store");
    assert!(store.data_set_list_by_name("Top").unwrap().is_none());
}

#[test]
fn test_unknown_format_version_is_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("future.json");
    std::fs::write(&path, r#"{"_v":9}"#).expect("Failed to write file");

    let err = InMemoryStore::load_from_file(&path).unwrap_err();
    assert!(err.is_io_error());
    assert!(matches!(err, StoreError::DeserializationFailed { .. }));
}
