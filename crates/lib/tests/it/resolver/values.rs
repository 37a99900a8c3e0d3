//! Rendering of the different value kinds.

use datasets::{
    Id,
    model::{AttributePath, AttributeType, FileRef, ParameterValue},
};

use crate::helpers::*;

fn resolve(sheet: &Sheet, attribute: Id) -> String {
    sheet
        .resolver()
        .resolve(&sheet.column, &attribute, &AttributePath::root())
}

#[test]
fn test_text_and_change_values_evaluate_macros() {
    let sheet = Sheet::new();
    let text = sheet.text("Text", "#CONCAT(a,b)");
    assert_eq!(resolve(&sheet, text), "ab");

    let change = sheet
        .store
        .attribute(sheet.dsl, "Change", AttributeType::Change)
        .unwrap();
    sheet.store.set_text(sheet.column, change, "#CONCAT(c,d)").unwrap();
    assert_eq!(resolve(&sheet, change), "cd");
}

#[test]
fn test_encrypted_values_are_verbatim() {
    let sheet = Sheet::new();
    let secret = sheet
        .store
        .attribute(sheet.dsl, "Secret", AttributeType::Encrypted)
        .unwrap();
    sheet
        .store
        .set_text(sheet.column, secret, "{ENC}#CONCAT(a,b)")
        .unwrap();
    assert_eq!(resolve(&sheet, secret), "{ENC}#CONCAT(a,b)");
}

#[test]
fn test_list_values_render_their_text() {
    let sheet = Sheet::new();
    let color = sheet
        .store
        .list_attribute(sheet.dsl, "Color", &["Red", "Green"])
        .unwrap();
    let green = sheet.store.list_value(color, "Green").unwrap();
    sheet
        .store
        .set_parameter(sheet.column, color, ParameterValue::ListValue(green))
        .unwrap();
    assert_eq!(resolve(&sheet, color), "Green");

    let gone = Id::random();
    sheet
        .store
        .set_parameter(sheet.column, color, ParameterValue::ListValue(gone))
        .unwrap();
    assert_eq!(resolve(&sheet, color), format!("[List value {gone} not found]"));
}

#[test]
fn test_files_render_their_name() {
    let sheet = Sheet::new();
    let upload = sheet
        .store
        .attribute(sheet.dsl, "Upload", AttributeType::File)
        .unwrap();
    sheet
        .store
        .set_parameter(
            sheet.column,
            upload,
            ParameterValue::File(FileRef {
                name: "data.csv".to_string(),
                content_type: Some("text/csv".to_string()),
            }),
        )
        .unwrap();
    assert_eq!(resolve(&sheet, upload), "data.csv");
}

#[test]
fn test_empty_cells() {
    let sheet = Sheet::new();
    let empty = sheet.store.text_attribute(sheet.dsl, "Empty").unwrap();
    assert_eq!(resolve(&sheet, empty), "");

    let resolver = sheet.resolver();
    let mut context = resolver.context();
    let position = datasets::eval::ParameterPositionContext::new(
        sheet.dsl,
        sheet.column,
        AttributePath::root(),
        empty,
    );
    assert_eq!(context.resolve(&position).value, None);
}

#[test]
fn test_unknown_column_or_attribute() {
    let sheet = Sheet::new();
    let text = sheet.text("Text", "value");
    let missing = Id::random();
    assert_eq!(
        sheet
            .resolver()
            .resolve(&missing, &text, &AttributePath::root()),
        format!("[DataSet not found: {missing}]")
    );
    assert_eq!(
        sheet.resolver().evaluate_text(&missing, "x"),
        format!("[DataSet not found: {missing}]")
    );
    assert!(resolve(&sheet, Id::random()).starts_with("[Attribute '"));
}
