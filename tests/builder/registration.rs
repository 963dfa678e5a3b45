//! Integration tests for statement registration
//!
//! Tests the actual-path stack, sibling uniqueness, and nesting rules.

use yangforge_builder::{BuilderKind, ModuleBuilder, Refine, TypeSpec};
use yangforge_foundation::{CompileError, ErrorKind};
use yangforge_model::BuiltinType;

fn module() -> ModuleBuilder {
    ModuleBuilder::new("interfaces", "urn:example:interfaces", "if")
}

fn string() -> TypeSpec {
    TypeSpec::builtin(BuiltinType::String)
}

fn first_line(err: &CompileError) -> u32 {
    match err.kind {
        ErrorKind::DuplicateName { first_line, .. } => first_line,
        ref other => panic!("expected a duplicate, got {other:?}"),
    }
}

// =============================================================================
// Uniqueness
// =============================================================================

#[test]
fn duplicate_typedef_names_first_declaration() {
    let mut m = module();
    m.add_typedef(4, m.qname("counter"), string()).unwrap();
    let err = m.add_typedef(9, m.qname("counter"), string()).unwrap_err();
    assert_eq!(err.line, 9);
    assert_eq!(err.module, "interfaces");
    assert_eq!(first_line(&err), 4);
}

#[test]
fn duplicate_children_in_container() {
    let mut m = module();
    let top = m.add_container_node(1, m.qname("interfaces")).unwrap();
    m.enter_node(top).unwrap();
    m.add_leaf_node(2, m.qname("name"), string()).unwrap();
    let err = m.add_container_node(3, m.qname("name")).unwrap_err();
    assert_eq!(first_line(&err), 2);
}

#[test]
fn duplicate_rpcs() {
    let mut m = module();
    m.add_rpc(10, m.qname("reset")).unwrap();
    let err = m.add_rpc(20, m.qname("reset")).unwrap_err();
    assert_eq!(first_line(&err), 10);
}

#[test]
fn rpc_clashes_with_top_level_container() {
    let mut m = module();
    m.add_container_node(1, m.qname("reset")).unwrap();
    let err = m.add_rpc(2, m.qname("reset")).unwrap_err();
    assert_eq!(first_line(&err), 1);
    let err = m.add_notification(3, m.qname("reset")).unwrap_err();
    assert_eq!(first_line(&err), 1);
}

#[test]
fn duplicate_cases() {
    let mut m = module();
    let choice = m.add_choice(1, m.qname("transport")).unwrap();
    m.enter_node(choice).unwrap();
    m.add_case(2, m.qname("tcp")).unwrap();
    let err = m.add_case(3, m.qname("tcp")).unwrap_err();
    assert_eq!(first_line(&err), 2);
    // A shorthand node is a case too.
    let err = m.add_leaf_node(4, m.qname("tcp"), string()).unwrap_err();
    assert_eq!(first_line(&err), 2);
}

#[test]
fn same_name_in_different_scopes() {
    let mut m = module();
    for (line, parent) in [(1, "a"), (3, "b")] {
        let c = m.add_container_node(line, m.qname(parent)).unwrap();
        m.enter_node(c).unwrap();
        m.add_leaf_node(line + 1, m.qname("name"), string()).unwrap();
        m.exit_node().unwrap();
    }
    // Typedefs and data nodes do not share a namespace.
    m.add_typedef(5, m.qname("a"), string()).unwrap();
    let c1 = m.add_choice(6, m.qname("c1")).unwrap();
    m.enter_node(c1).unwrap();
    m.add_case(7, m.qname("x")).unwrap();
    m.exit_node().unwrap();
    let c2 = m.add_choice(8, m.qname("c2")).unwrap();
    m.enter_node(c2).unwrap();
    m.add_case(9, m.qname("x")).unwrap();
}

#[test]
fn duplicate_identities_and_features() {
    let mut m = module();
    m.add_identity(1, m.qname("ethernet")).unwrap();
    assert_eq!(first_line(&m.add_identity(2, m.qname("ethernet")).unwrap_err()), 1);
    m.add_feature(3, m.qname("vlan")).unwrap();
    assert_eq!(first_line(&m.add_feature(4, m.qname("vlan")).unwrap_err()), 3);
}

// =============================================================================
// Nesting Rules
// =============================================================================

fn is_invalid_parent(err: &CompileError) -> bool {
    matches!(err.kind, ErrorKind::InvalidParent { .. })
}

#[test]
fn case_requires_choice() {
    let mut m = module();
    assert!(is_invalid_parent(&m.add_case(1, m.qname("c")).unwrap_err()));
    let top = m.add_container_node(2, m.qname("top")).unwrap();
    m.enter_node(top).unwrap();
    let err = m.add_case(3, m.qname("c")).unwrap_err();
    assert!(is_invalid_parent(&err));
    assert_eq!(err.line, 3);
}

#[test]
fn case_inside_augment() {
    let mut m = module();
    let aug = m.add_augment(1, "/if:top/if:transport").unwrap();
    m.enter_node(aug).unwrap();
    m.add_case(2, m.qname("sctp")).unwrap();
}

#[test]
fn leaf_cannot_hold_children() {
    let mut m = module();
    let leaf = m.add_leaf_node(1, m.qname("x"), string()).unwrap();
    m.enter_node(leaf).unwrap();
    assert!(is_invalid_parent(&m.add_leaf_node(2, m.qname("y"), string()).unwrap_err()));
    assert!(is_invalid_parent(&m.add_uses_node(3, "g").unwrap_err()));
}

#[test]
fn top_level_only_statements() {
    let mut m = module();
    let top = m.add_container_node(1, m.qname("top")).unwrap();
    m.enter_node(top).unwrap();
    assert!(is_invalid_parent(&m.add_rpc(2, m.qname("r")).unwrap_err()));
    assert!(is_invalid_parent(&m.add_notification(3, m.qname("n")).unwrap_err()));
    assert!(is_invalid_parent(&m.add_identity(4, m.qname("i")).unwrap_err()));
    assert!(is_invalid_parent(&m.add_feature(5, m.qname("f")).unwrap_err()));
    assert!(is_invalid_parent(&m.add_extension(6, m.qname("e")).unwrap_err()));
    assert!(is_invalid_parent(
        &m.add_deviation(7, "/if:top", "not-supported").unwrap_err()
    ));
    // Absolute augments belong at top level, relative ones inside a uses.
    assert!(is_invalid_parent(&m.add_augment(8, "/if:top").unwrap_err()));
}

#[test]
fn refine_only_inside_uses() {
    let mut m = module();
    assert!(is_invalid_parent(&m.add_refine(1, Refine::new("x")).unwrap_err()));
    let uses = m.add_uses_node(2, "g").unwrap();
    m.enter_node(uses).unwrap();
    m.add_refine(3, Refine::new("x").with_mandatory(true)).unwrap();
}

#[test]
fn input_and_output_only_inside_rpc() {
    let mut m = module();
    assert!(is_invalid_parent(&m.add_rpc_input(1).unwrap_err()));
    let rpc = m.add_rpc(2, m.qname("reset")).unwrap();
    m.enter_node(rpc).unwrap();
    m.add_rpc_input(3).unwrap();
    m.add_rpc_output(4).unwrap();
}

#[test]
fn typedef_under_leaf_is_rejected() {
    let mut m = module();
    let leaf = m.add_leaf_node(1, m.qname("x"), string()).unwrap();
    m.enter_node(leaf).unwrap();
    assert!(is_invalid_parent(&m.add_typedef(2, m.qname("t"), string()).unwrap_err()));
}

#[test]
fn invalid_deviate_keyword() {
    let mut m = module();
    let err = m.add_deviation(6, "/if:top", "remove").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidDeviate("remove".to_string()));
    assert_eq!(err.line, 6);
}

// =============================================================================
// Actual Path and Registration
// =============================================================================

#[test]
fn actual_path_nests_and_unwinds() {
    let mut m = module();
    assert_eq!(m.actual_node(), None);
    let top = m.add_container_node(1, m.qname("top")).unwrap();
    m.enter_node(top).unwrap();
    let inner = m.add_list_node(2, m.qname("entry")).unwrap();
    m.enter_node(inner).unwrap();
    assert_eq!(m.actual_node(), Some(inner));
    assert_eq!(m.exit_node().unwrap(), inner);
    assert_eq!(m.actual_node(), Some(top));
    m.exit_node().unwrap();
    assert!(m.exit_node().is_err());

    let node = m.node(inner).unwrap();
    assert_eq!(node.parent(), Some(top));
    assert_eq!(node.path().to_string(), "/if:top/if:entry");
    assert_eq!(m.top_level_children(), &[top]);
}

#[test]
fn shorthand_wraps_leaf_in_case() {
    let mut m = module();
    let choice = m.add_choice(1, m.qname("transport")).unwrap();
    m.enter_node(choice).unwrap();
    let leaf = m.add_leaf_node(2, m.qname("tcp"), string()).unwrap();

    let case = m.node(leaf).unwrap().parent().unwrap();
    let case_node = m.node(case).unwrap();
    assert!(matches!(case_node.kind(), BuilderKind::Case));
    assert_eq!(case_node.qname(), &m.qname("tcp"));
    assert_eq!(case_node.children(), &[leaf]);
    assert_eq!(m.node(choice).unwrap().children(), &[case]);
}

#[test]
fn flat_collections_track_nested_statements() {
    let mut m = module();
    let g = m.add_grouping(1, m.qname("g")).unwrap();
    m.enter_node(g).unwrap();
    let inner_uses = m.add_uses_node(2, "other").unwrap();
    m.exit_node().unwrap();
    let top_uses = m.add_uses_node(3, "g").unwrap();
    m.enter_node(top_uses).unwrap();
    let scoped = m.add_augment(4, "x").unwrap();
    m.exit_node().unwrap();
    let global = m.add_augment(5, "/if:x").unwrap();
    let ext = m.add_unknown_schema_node(6, "ext:hidden", None).unwrap();

    assert_eq!(m.all_uses_nodes(), &[inner_uses, top_uses]);
    // Only top-level augments are resolved globally.
    assert_eq!(m.all_augments(), &[global]);
    assert_ne!(scoped, global);
    assert_eq!(m.all_unknown_nodes(), &[ext]);
    assert_eq!(m.augments_resolved(), 0);
}

#[test]
fn named_types_are_dirty() {
    let mut m = module();
    let plain = m.add_leaf_node(1, m.qname("a"), string()).unwrap();
    let named = m
        .add_leaf_node(2, m.qname("b"), TypeSpec::named(yangforge_foundation::NodeRef::local("t")))
        .unwrap();
    let dirty: Vec<_> = m.dirty_nodes().collect();
    assert!(dirty.contains(&named));
    assert!(!dirty.contains(&plain));

    m.set_type(named, string()).unwrap();
    assert!(!m.dirty_nodes().any(|id| id == named));

    let top = m.add_container_node(3, m.qname("top")).unwrap();
    m.enter_node(top).unwrap();
    m.mark_actual_node_dirty().unwrap();
    assert!(m.dirty_nodes().any(|id| id == top));
}

#[test]
fn duplicate_import_prefix() {
    let mut m = module();
    m.add_module_import(2, "types", None, "t").unwrap();
    let err = m.add_module_import(3, "other-types", None, "t").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(m.imports().count(), 1);
}

#[test]
fn setters_reject_wrong_kinds() {
    let mut m = module();
    let leaf = m.add_leaf_node(1, m.qname("x"), string()).unwrap();
    let top = m.add_container_node(2, m.qname("top")).unwrap();
    assert!(is_invalid_parent(&m.set_keys(leaf, "name").unwrap_err()));
    assert!(is_invalid_parent(&m.set_presence(leaf, "p").unwrap_err()));
    assert!(is_invalid_parent(&m.set_default(top, "x").unwrap_err()));
    m.set_default(leaf, "x").unwrap();
    m.set_presence(top, "enabled").unwrap();
}
