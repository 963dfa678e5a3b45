//! Integration tests for compile errors
//!
//! Tests error construction, display, and error lists.

use yangforge_foundation::{CompileError, CompileErrors, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn duplicate_names_the_first_line() {
    let err = CompileError::duplicate("ietf-interfaces", 42, "typedef", "counter", 10);
    assert_eq!(err.line, 42);
    assert_eq!(err.module, "ietf-interfaces");
    assert!(matches!(
        err.kind,
        ErrorKind::DuplicateName {
            statement: "typedef",
            first_line: 10,
            ..
        }
    ));
}

#[test]
fn kind_at_location() {
    let kind = ErrorKind::UnresolvedAugment("/a:b".to_string());
    let err = kind.clone().at("m", 7);
    assert_eq!(err, CompileError::new(kind, "m", 7));
}

// =============================================================================
// Error Display
// =============================================================================

#[test]
fn display_has_module_and_line() {
    let err = CompileError::duplicate("m", 12, "leaf", "name", 3);
    assert_eq!(
        err.to_string(),
        "m:12: leaf with same name 'name' already declared at line 3"
    );
}

#[test]
fn display_invalid_parent() {
    let err = CompileError::invalid_parent("m", 5, "case", "tcp");
    let msg = err.to_string();
    assert!(msg.starts_with("m:5:"));
    assert!(msg.contains("tcp"));
}

#[test]
fn display_unresolved_references() {
    let msg = ErrorKind::UnresolvedType("counter64".to_string())
        .at("m", 1)
        .to_string();
    assert!(msg.contains("counter64"));
    let msg = ErrorKind::MissingModule("base@2020-01-01".to_string())
        .at("m", 2)
        .to_string();
    assert!(msg.contains("base@2020-01-01"));
}

// =============================================================================
// Error Lists
// =============================================================================

#[test]
fn empty_list_is_not_a_failure() {
    assert!(CompileErrors::new(Vec::new()).is_none());
}

#[test]
fn list_keeps_order_and_joins_lines() {
    let errors = CompileErrors::new(vec![
        ErrorKind::UnresolvedGrouping("a".to_string()).at("m", 1),
        ErrorKind::UnresolvedGrouping("b".to_string()).at("m", 2),
    ])
    .unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.first().line, 1);
    assert!(errors.any(|k| matches!(k, ErrorKind::UnresolvedGrouping(g) if g == "b")));
    assert_eq!(errors.to_string().lines().count(), 2);
}

#[test]
fn lines_are_sorted() {
    let errors = CompileErrors::new(vec![
        ErrorKind::Frozen.at("m", 9),
        ErrorKind::Frozen.at("m", 3),
    ])
    .unwrap();
    assert_eq!(errors.lines(), vec![3, 9]);
    assert_eq!(errors.iter().next().unwrap().line, 9);
}

#[test]
fn single_error_converts() {
    let errors: CompileErrors = ErrorKind::Frozen.at("m", 0).into();
    assert_eq!(errors.errors().len(), 1);
}
