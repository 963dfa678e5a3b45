//! Integration tests for freezing builders into the model
//!
//! Tests memoized builds, frozen mutation, and partial rebuilds.

use std::sync::Arc;

use yangforge_builder::{BuiltNode, ModuleBuilder, TypeSpec};
use yangforge_foundation::{ErrorKind, NodeRef};
use yangforge_model::{BuiltinType, DataSchemaNode, MustDefinition, TypeBase};

fn string() -> TypeSpec {
    TypeSpec::builtin(BuiltinType::String)
}

fn interfaces() -> ModuleBuilder {
    let mut m = ModuleBuilder::new("interfaces", "urn:example:interfaces", "if");
    let top = m.add_container_node(1, m.qname("interfaces")).unwrap();
    m.enter_node(top).unwrap();
    let list = m.add_list_node(2, m.qname("interface")).unwrap();
    m.set_keys(list, "name").unwrap();
    m.enter_node(list).unwrap();
    m.add_leaf_node(3, m.qname("name"), string()).unwrap();
    m.add_leaf_node(4, m.qname("enabled"), TypeSpec::builtin(BuiltinType::Boolean))
        .unwrap();
    m.exit_node().unwrap();
    m.exit_node().unwrap();
    m
}

// =============================================================================
// Memoization
// =============================================================================

#[test]
fn build_twice_returns_same_module() {
    let mut m = interfaces();
    let first = m.build();
    let second = m.build();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(m.is_built());
}

#[test]
fn build_node_is_memoized() {
    let mut m = interfaces();
    let list = m.find_path(&["interfaces", "interface"]).unwrap();
    let first = m.build_node(list).unwrap();
    let second = m.build_node(list).unwrap();
    assert!(first.ptr_eq(&second));
    assert!(m.node(list).unwrap().is_built());
}

#[test]
fn module_build_reuses_node_snapshots() {
    let mut m = interfaces();
    let top = m.find_path(&["interfaces"]).unwrap();
    let early = m.build_node(top).unwrap();
    let module = m.build();
    let late = BuiltNode::Data(module.children[0].clone());
    assert!(early.ptr_eq(&late));
}

// =============================================================================
// Frozen Builders
// =============================================================================

#[test]
fn built_module_rejects_changes() {
    let mut m = interfaces();
    let top = m.find_path(&["interfaces"]).unwrap();
    m.build();
    let err = m.add_container_node(9, m.qname("other")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Frozen);
    assert_eq!(err.line, 9);
    assert_eq!(
        m.set_description(top, "changed").unwrap_err().kind,
        ErrorKind::Frozen
    );
}

#[test]
fn built_node_rejects_new_children() {
    let mut m = interfaces();
    let top = m.find_path(&["interfaces"]).unwrap();
    m.build_node(top).unwrap();
    m.enter_node(top).unwrap();
    let err = m.add_leaf_node(7, m.qname("late"), string()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Frozen);
}

#[test]
fn rebuild_after_unfreeze() {
    let mut m = interfaces();
    let first = m.build();
    m.unfreeze();
    m.add_container_node(9, m.qname("state")).unwrap();
    let second = m.build();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.children.len(), 1);
    assert_eq!(second.children.len(), 2);
}

#[test]
fn rebuild_node_keeps_unchanged_siblings() {
    let mut m = interfaces();
    let name = m.find_path(&["interfaces", "interface", "name"]).unwrap();
    let enabled = m.find_path(&["interfaces", "interface", "enabled"]).unwrap();
    let old_enabled = m.build_node(enabled).unwrap();
    let old_module = m.build();

    m.unfreeze_node(name).unwrap();
    m.set_description(name, "interface name").unwrap();
    let new_module = m.build();

    assert!(!Arc::ptr_eq(&old_module, &new_module));
    assert!(m.build_node(enabled).unwrap().ptr_eq(&old_enabled));
    let leaf = new_module
        .find_node(&["interfaces", "interface", "name"])
        .unwrap();
    assert_eq!(leaf.meta().description.as_deref(), Some("interface name"));
}

#[test]
fn rebuild_is_a_fresh_build() {
    let mut m = interfaces();
    let first = m.build();
    let second = m.rebuild();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.children, second.children);
}

// =============================================================================
// Built Shape
// =============================================================================

#[test]
fn module_header_and_imports() {
    let mut m = ModuleBuilder::new("interfaces", "urn:example:interfaces", "if")
        .with_revision("2024-02-01");
    m.set_yang_version("1").unwrap();
    m.set_organization("Example Org").unwrap();
    m.set_contact("ops@example.com").unwrap();
    m.set_module_description("Interface management").unwrap();
    m.add_module_import(2, "types", Some("2023-01-01"), "t").unwrap();

    let module = m.build();
    assert_eq!(module.name, "interfaces");
    assert_eq!(module.prefix, "if");
    assert_eq!(module.revision.as_deref(), Some("2024-02-01"));
    assert_eq!(module.organization.as_deref(), Some("Example Org"));
    assert_eq!(module.imports.len(), 1);
    assert_eq!(module.imports[0].prefix, "t");
    assert_eq!(module.imports[0].revision.as_deref(), Some("2023-01-01"));
}

#[test]
fn children_are_ordered_by_name() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    for (line, name) in [(1, "zeta"), (2, "alpha"), (3, "mid")] {
        m.add_leaf_node(line, m.qname(name), string()).unwrap();
    }
    let module = m.build();
    let names: Vec<_> = module
        .children
        .iter()
        .map(|c| c.qname().local_name().to_string())
        .collect();
    assert_eq!(names, ["alpha", "mid", "zeta"]);
}

#[test]
fn shorthand_case_is_navigable() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    let choice = m.add_choice(1, m.qname("c")).unwrap();
    m.enter_node(choice).unwrap();
    m.add_leaf_node(2, m.qname("x"), string()).unwrap();
    m.exit_node().unwrap();

    let module = m.build();
    let leaf = module.find_node(&["c", "x", "x"]).unwrap();
    assert!(matches!(leaf, DataSchemaNode::Leaf(_)));
    assert_eq!(leaf.path().to_string(), "/t:c/t:x/t:x");
    let case = module.find_node(&["c", "x"]).unwrap();
    assert_eq!(case.kind_name(), "case");
}

#[test]
fn config_is_inherited() {
    let mut m = interfaces();
    let top = m.find_path(&["interfaces"]).unwrap();
    m.set_config(top, false).unwrap();
    let module = m.build();
    let leaf = module
        .find_node(&["interfaces", "interface", "enabled"])
        .unwrap();
    assert!(!leaf.flags().config);
}

#[test]
fn rpc_input_and_output() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    let rpc = m.add_rpc(1, m.qname("reset")).unwrap();
    m.enter_node(rpc).unwrap();
    let input = m.add_rpc_input(2).unwrap();
    m.enter_node(input).unwrap();
    m.add_leaf_node(3, m.qname("delay"), TypeSpec::builtin(BuiltinType::Uint32))
        .unwrap();
    m.exit_node().unwrap();
    m.exit_node().unwrap();

    let module = m.build();
    let rpc = module.rpc("reset").unwrap();
    assert!(rpc.output.is_none());
    let input = rpc.input.as_ref().unwrap();
    assert_eq!(input.meta.path.to_string(), "/t:reset/t:input");
    assert!(!input.children[0].flags().config);
}

#[test]
fn definitions_are_built() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    m.add_feature(1, m.qname("vlan")).unwrap();
    let base = m.add_identity(2, m.qname("iana-type")).unwrap();
    let derived = m.add_identity(3, m.qname("ethernet")).unwrap();
    m.set_identity_base(derived, "iana-type").unwrap();
    let ext = m.add_extension(4, m.qname("hidden")).unwrap();
    m.set_extension_argument(ext, "reason", true).unwrap();
    let notification = m.add_notification(5, m.qname("link-down")).unwrap();
    m.enter_node(notification).unwrap();
    m.add_leaf_node(6, m.qname("if-name"), string()).unwrap();
    m.exit_node().unwrap();

    let module = m.build();
    assert!(module.feature("vlan").is_some());
    assert!(module.identity("iana-type").is_some());
    // Not resolved without a compilation.
    assert!(module.identity("ethernet").unwrap().base.is_none());
    assert_ne!(base, derived);
    let ext = module.extension("hidden").unwrap();
    assert_eq!(ext.argument.as_deref(), Some("reason"));
    assert!(ext.yin_element);
    assert_eq!(module.notification("link-down").unwrap().children.len(), 1);
}

#[test]
fn extension_usage_is_attached_to_its_parent() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    let leaf = m.add_leaf_node(1, m.qname("secret"), string()).unwrap();
    m.enter_node(leaf).unwrap();
    m.add_unknown_schema_node(2, "t:hidden", Some("internal")).unwrap();
    m.exit_node().unwrap();

    let module = m.build();
    let secret = module.find_node(&["secret"]).unwrap();
    let usages = &secret.meta().unknown_nodes;
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].argument.as_deref(), Some("internal"));
    assert_eq!(usages[0].node_type.local_name(), "hidden");
}

#[test]
fn constraints_are_carried() {
    let mut m = interfaces();
    let list = m.find_path(&["interfaces", "interface"]).unwrap();
    m.set_min_elements(list, 1).unwrap();
    m.set_max_elements(list, 8).unwrap();
    m.add_must(list, MustDefinition::new("count(name) > 0")).unwrap();
    m.set_when(list, "../enabled").unwrap();

    let module = m.build();
    let list = module.find_node(&["interfaces", "interface"]).unwrap();
    let constraints = list.constraints();
    assert_eq!(constraints.min_elements, Some(1));
    assert_eq!(constraints.max_elements, Some(8));
    assert_eq!(constraints.must.len(), 1);
    assert_eq!(constraints.when.as_deref(), Some("../enabled"));
    let keys = &list.as_list().unwrap().keys;
    assert_eq!(keys[0].local_name(), "name");
}

#[test]
fn unresolved_type_is_frozen_as_is() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    m.add_leaf_node(1, m.qname("x"), TypeSpec::named(NodeRef::local("percent")))
        .unwrap();
    let module = m.build();
    let leaf = module.find_node(&["x"]).unwrap();
    let ty = &leaf.as_leaf().unwrap().ty;
    assert!(!ty.is_resolved());
    assert!(matches!(&ty.base, TypeBase::Unresolved(name) if name.local_name() == "percent"));
}
