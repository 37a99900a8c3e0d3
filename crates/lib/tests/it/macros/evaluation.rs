use std::sync::Arc;

use datasets::{MacroRegistry, ResolverConfig};

use crate::helpers::*;

#[test]
fn test_random_digits() {
    let sheet = Sheet::new();
    let value = sheet.eval("#RANDOM(5)");
    assert_eq!(value.len(), 5);
    assert!(value.chars().all(|c| c.is_ascii_digit()));
    assert!(!value.starts_with('0'));
}

#[test]
fn test_random_between() {
    let sheet = Sheet::new();
    assert_eq!(sheet.eval("#RANDOMBETWEEN(3,3)"), "3");
    let value: i64 = sheet.eval("#RANDOMBETWEEN(-5, 5)").parse().unwrap();
    assert!((-5..=5).contains(&value));
    assert_eq!(
        sheet.eval("x#RANDOMBETWEEN(5,1)y"),
        "x[Invalid bounds: 5 > 1]y"
    );
}

#[test]
fn test_random_characters() {
    let sheet = Sheet::new();
    let one = sheet.eval("#RANDOMCHAR()");
    assert_eq!(one.len(), 1);
    assert!(one.chars().all(|c| c.is_ascii_uppercase()));

    let many = sheet.eval("#randomchars(8)");
    assert_eq!(many.len(), 8);
    assert!(many.chars().all(|c| c.is_ascii_uppercase()));
}

#[test]
fn test_random_lengths_are_bounded() {
    let sheet = Sheet::new();
    assert_eq!(
        sheet.eval("x #RANDOM(99999999999) y"),
        "x [RANDOM: length 99999999999 exceeds the maximum of 4096] y"
    );
    assert_eq!(
        sheet.eval("#RANDOM(18446744073709551615)"),
        "[RANDOM: length 18446744073709551615 exceeds the maximum of 4096]"
    );
    assert_eq!(
        sheet.eval("#RANDOMCHARS(99999999999999999999999)"),
        "[RANDOMCHARS: length 99999999999999999999999 exceeds the maximum of 4096]"
    );
    assert_eq!(sheet.eval("#RANDOMCHARS(4096)").len(), 4096);
    assert_eq!(sheet.eval("#RANDOM(0)"), "[RANDOM: invalid number '0']");
    assert_eq!(sheet.eval("#RANDOM(-3)"), "[RANDOM: invalid number '-3']");
}

#[test]
fn test_uuids() {
    let sheet = Sheet::new();
    let lower = sheet.eval("#UUID()");
    assert!(uuid::Uuid::parse_str(&lower).is_ok());
    assert_eq!(lower, lower.to_lowercase());

    let upper = sheet.eval("#UUID_UPPER()");
    assert!(uuid::Uuid::parse_str(&upper).is_ok());
    assert_eq!(upper, upper.to_uppercase());

    assert_eq!(sheet.eval("#UUID(1)"), "[UUID: expects 0 argument(s), got 1]");
}

#[test]
fn test_dates_follow_the_clock() {
    let sheet = Sheet::new();
    assert_eq!(sheet.eval("#DATE()"), "2024-02-28");
    assert_eq!(sheet.eval("#DATE(+1,dd.MM.yyyy)"), "29.02.2024");
    assert_eq!(sheet.eval("#DATE(-28,%Y/%m/%d)"), "2024/01/31");
    assert_eq!(sheet.eval("#DATE(2d, yyyy-MM-dd HH:mm)"), "2024-03-01 09:30");
    assert_eq!(sheet.eval("#DATE(0,%Q)"), "[Invalid date format '%Q']");
    assert_eq!(
        sheet.eval("#DATE(soon)"),
        "[DATE: invalid number 'soon']"
    );
}

#[test]
fn test_default_date_format_is_configurable() {
    let sheet = Sheet::new();
    let resolver = sheet.resolver().with_config(ResolverConfig {
        date_format: "dd/MM/yy".to_string(),
        ..ResolverConfig::default()
    });
    assert_eq!(resolver.evaluate_text(&sheet.column, "#DATE()"), "28/02/24");
}

#[test]
fn test_concat_evaluates_nested_arguments() {
    let sheet = Sheet::new();
    assert_eq!(sheet.eval("#CONCAT(a,#RANDOMBETWEEN(7,7),b)"), "a7b");
    assert_eq!(sheet.eval("#CONCAT()"), "");
    assert_eq!(sheet.eval("<#CONCAT(x(1),y)>"), "<x(1)y>");
}

#[test]
fn test_escapes_are_removed_once() {
    let sheet = Sheet::new();
    assert_eq!(sheet.eval(r"cost \$5 \& more"), "cost $5 & more");
    assert_eq!(sheet.eval(r"a\\b"), r"a\b");
    assert_eq!(sheet.eval(r"#CONCAT(\<,x,\>)"), "<x>");
    assert_eq!(sheet.eval(r"\q"), r"\q");
}

#[test]
fn test_unknown_and_unclosed_macros_stay_verbatim() {
    let sheet = Sheet::new();
    assert_eq!(sheet.eval("#NOPE(1)"), "#NOPE(1)");
    assert_eq!(sheet.eval("#CONCAT(a"), "#CONCAT(a");
    assert_eq!(sheet.eval("100#"), "100#");
}

#[test]
fn test_passthrough_macros_are_left_for_downstream() {
    let sheet = Sheet::new();
    let mut registry = MacroRegistry::builtin();
    registry.register_passthrough("EXECUTION_REQUEST_NUMBER");
    let resolver = sheet.resolver().with_registry(registry);
    assert_eq!(
        resolver.evaluate_text(&sheet.column, "run #EXECUTION_REQUEST_NUMBER(#RANDOM(2))"),
        "run #EXECUTION_REQUEST_NUMBER(#RANDOM(2))"
    );
}

#[test]
fn test_diagnostics_can_be_hidden() {
    let sheet = Sheet::new();
    let resolver = sheet.resolver().with_config(ResolverConfig {
        inline_diagnostics: false,
        ..ResolverConfig::default()
    });
    assert_eq!(resolver.evaluate_text(&sheet.column, "a#RANDOM(x)b"), "ab");
}

#[test]
fn test_seeded_resolvers_agree() {
    let sheet = Sheet::new();
    let first = sheet.eval("#UUID() #RANDOM(10)");
    let second = sheet.eval("#UUID() #RANDOM(10)");
    assert_eq!(first, second);

    let unseeded = datasets::Resolver::new(Arc::clone(&sheet.store) as Arc<dyn datasets::DataSource>);
    assert_eq!(unseeded.evaluate_text(&sheet.column, "#RANDOM(3)").len(), 3);
}
