//! Textual reference parsing

use proptest::prelude::*;
use yangforge_foundation::{NodeRef, QName, RawPath, SchemaPath};

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

fn node_ref() -> impl Strategy<Value = NodeRef> {
    (proptest::option::of(identifier()), identifier()).prop_map(|(prefix, name)| match prefix {
        Some(prefix) => NodeRef::prefixed(prefix, name),
        None => NodeRef::local(name),
    })
}

proptest! {
    #[test]
    fn node_ref_display_parses_back(r in node_ref()) {
        prop_assert_eq!(NodeRef::parse(&r.to_string()).unwrap(), r);
    }

    #[test]
    fn raw_path_display_parses_back(
        absolute in any::<bool>(),
        segments in proptest::collection::vec(node_ref(), 1..6)
    ) {
        let path = RawPath { absolute, segments };
        let text = path.to_string();
        prop_assert_eq!(text.starts_with('/'), absolute);
        prop_assert_eq!(RawPath::parse(&text).unwrap(), path);
    }

    #[test]
    fn empty_segments_are_rejected(a in identifier(), b in identifier()) {
        let doubled = format!("/{a}//{b}");
        let trailing = format!("{a}/");
        let colons = format!("{a}::{b}");
        prop_assert!(RawPath::parse(&doubled).is_err());
        prop_assert!(RawPath::parse(&trailing).is_err());
        prop_assert!(NodeRef::parse(&colons).is_err());
    }

    #[test]
    fn schema_path_parent_undoes_child(names in proptest::collection::vec(identifier(), 1..6)) {
        let mut path = SchemaPath::root();
        for name in &names {
            let parent = path.clone();
            path = path.child(QName::new("urn:t", None, name.as_str()));
            prop_assert_eq!(path.parent(), Some(parent.clone()));
            prop_assert!(path.starts_with(&parent));
        }
        prop_assert_eq!(path.len(), names.len());
    }

    #[test]
    fn qname_identity_ignores_prefix(name in identifier(), p1 in identifier(), p2 in identifier()) {
        let a = QName::new("urn:t", None, name.as_str()).with_prefix(p1.as_str());
        let b = QName::new("urn:t", None, name.as_str()).with_prefix(p2.as_str());
        prop_assert_eq!(a, b);
    }
}
