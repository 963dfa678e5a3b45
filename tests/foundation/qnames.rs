//! Integration tests for qualified names
//!
//! Tests identity, ordering, and display of QName.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use yangforge_foundation::QName;

fn q(namespace: &str, revision: Option<&str>, name: &str) -> QName {
    QName::new(namespace, revision.map(Arc::from), name)
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn prefix_is_not_part_of_identity() {
    let a = q("urn:a", None, "top").with_prefix("a");
    let b = q("urn:a", None, "top").with_prefix("other");
    assert_eq!(a, b);

    let mut map = HashMap::new();
    map.insert(a, 1);
    assert_eq!(map.get(&b), Some(&1));
}

#[test]
fn revision_is_part_of_identity() {
    let old = q("urn:a", Some("2020-01-01"), "top");
    let new = q("urn:a", Some("2021-01-01"), "top");
    assert_ne!(old, new);
}

#[test]
fn namespace_is_part_of_identity() {
    assert_ne!(q("urn:a", None, "top"), q("urn:b", None, "top"));
}

#[test]
fn sibling_keeps_namespace_and_prefix() {
    let top = q("urn:a", Some("2020-01-01"), "top").with_prefix("a");
    let other = top.sibling("other");
    assert_eq!(other.namespace(), "urn:a");
    assert_eq!(other.revision(), Some("2020-01-01"));
    assert_eq!(other.prefix(), Some("a"));
    assert_eq!(other.local_name(), "other");
}

// =============================================================================
// Ordering and Display
// =============================================================================

#[test]
fn sorted_by_local_name_first() {
    let set: BTreeSet<QName> = [
        q("urn:z", None, "alpha"),
        q("urn:a", None, "gamma"),
        q("urn:m", None, "beta"),
    ]
    .into_iter()
    .collect();
    let names: Vec<&str> = set.iter().map(QName::local_name).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn display_uses_prefix_when_known() {
    assert_eq!(q("urn:a", None, "top").with_prefix("a").to_string(), "a:top");
    assert_eq!(q("urn:a", None, "top").to_string(), "top");
}

#[test]
fn unqualified_names_have_no_namespace() {
    let name = QName::unqualified("thing");
    assert!(name.is_unqualified());
    assert!(!q("urn:a", None, "thing").is_unqualified());
}
