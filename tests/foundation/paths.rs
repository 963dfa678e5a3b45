//! Integration tests for schema paths and textual references
//!
//! Tests SchemaPath navigation, NodeRef/RawPath parsing, and Status keywords.

use yangforge_foundation::{ErrorKind, NodeRef, QName, RawPath, SchemaPath, Status};

fn q(name: &str) -> QName {
    QName::new("urn:t", None, name).with_prefix("t")
}

// =============================================================================
// SchemaPath
// =============================================================================

#[test]
fn child_parent_round_trip() {
    let path = SchemaPath::root().child(q("a")).child(q("b"));
    assert_eq!(path.len(), 2);
    assert_eq!(path.parent(), Some(SchemaPath::root().child(q("a"))));
    assert_eq!(path.last(), Some(&q("b")));
}

#[test]
fn root_has_no_parent() {
    assert!(SchemaPath::root().is_empty());
    assert!(SchemaPath::root().is_absolute());
    assert_eq!(SchemaPath::root().parent(), None);
}

#[test]
fn prefix_relation() {
    let a = SchemaPath::root().child(q("a"));
    let ab = a.child(q("b"));
    assert!(ab.starts_with(&a));
    assert!(!a.starts_with(&ab));
    assert!(ab.starts_with(&SchemaPath::root()));
}

#[test]
fn display() {
    let path = SchemaPath::root().child(q("a")).child(q("b"));
    assert_eq!(path.to_string(), "/t:a/t:b");
    assert_eq!(SchemaPath::root().to_string(), "/");
    let relative = SchemaPath::new(vec![q("x"), q("y")], false);
    assert_eq!(relative.to_string(), "t:x/t:y");
}

// =============================================================================
// NodeRef / RawPath
// =============================================================================

#[test]
fn node_ref_parsing() {
    assert_eq!(NodeRef::parse("name").unwrap(), NodeRef::local("name"));
    assert_eq!(
        NodeRef::parse(" if:name ").unwrap(),
        NodeRef::prefixed("if", "name")
    );
    for bad in ["", ":name", "if:", "a:b:c"] {
        assert!(
            matches!(NodeRef::parse(bad), Err(ErrorKind::InvalidPath(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn raw_path_parsing() {
    let path = RawPath::parse("/if:interfaces/if:interface").unwrap();
    assert!(path.absolute);
    assert_eq!(path.segments.len(), 2);
    assert_eq!(path.first_prefix(), Some("if"));
    assert_eq!(path.last(), Some(&NodeRef::prefixed("if", "interface")));
    assert_eq!(path.to_string(), "/if:interfaces/if:interface");

    let relative = RawPath::parse("inner/leaf").unwrap();
    assert!(!relative.absolute);
    assert_eq!(relative.first_prefix(), None);
    assert_eq!(relative.to_string(), "inner/leaf");
}

#[test]
fn raw_path_rejects_empty_segments() {
    for bad in ["", "/", "/a//b", "a:b:c/d"] {
        assert!(RawPath::parse(bad).is_err(), "{bad:?} should be rejected");
    }
}

// =============================================================================
// Status
// =============================================================================

#[test]
fn status_keywords() {
    assert_eq!(Status::parse("current").unwrap(), Status::Current);
    assert_eq!(Status::parse("deprecated").unwrap(), Status::Deprecated);
    assert_eq!(Status::parse("obsolete").unwrap(), Status::Obsolete);
    assert_eq!(Status::default(), Status::Current);
    assert_eq!(
        Status::parse("retired"),
        Err(ErrorKind::InvalidStatus("retired".to_string()))
    );
}
