//! Deviation tests

use yangforge_builder::{DeviateProperties, ModuleBuilder, TypeSpec};
use yangforge_foundation::{ErrorKind, NodeRef};
use yangforge_model::{BuiltinType, DeviateKind};

use crate::compile;

fn string() -> TypeSpec {
    TypeSpec::builtin(BuiltinType::String)
}

fn base() -> ModuleBuilder {
    let mut m = ModuleBuilder::new("base", "urn:example:base", "b");
    let top = m.add_container_node(1, m.qname("interfaces")).unwrap();
    m.enter_node(top).unwrap();
    m.add_leaf_node(2, m.qname("mtu"), TypeSpec::builtin(BuiltinType::Uint32))
        .unwrap();
    m.add_leaf_node(3, m.qname("description"), string()).unwrap();
    m.exit_node().unwrap();
    m
}

fn deviating() -> ModuleBuilder {
    let mut m = ModuleBuilder::new("vendor", "urn:example:vendor", "v");
    m.add_module_import(1, "base", None, "b").unwrap();
    m
}

#[test]
fn not_supported_removes_target() {
    let mut dev = deviating();
    dev.add_deviation(2, "/b:interfaces/b:description", "not-supported")
        .unwrap();

    let schema = compile(vec![base(), dev]).unwrap();
    let base = schema.module("base", None).unwrap();
    assert!(base.find_node(&["interfaces", "description"]).is_none());
    assert!(base.find_node(&["interfaces", "mtu"]).is_some());

    let vendor = schema.module("vendor", None).unwrap();
    let deviation = &vendor.deviations[0];
    assert_eq!(deviation.deviate, DeviateKind::NotSupported);
    assert_eq!(
        deviation.target_path.to_string(),
        "/b:interfaces/b:description"
    );
}

#[test]
fn deviation_sees_nodes_of_later_augments() {
    let mut dev = deviating();
    // Declared before the augment that adds its target.
    dev.add_deviation(2, "/b:interfaces/v:speed", "not-supported")
        .unwrap();
    let aug = dev.add_augment(3, "/b:interfaces").unwrap();
    dev.enter_node(aug).unwrap();
    dev.add_leaf_node(4, dev.qname("speed"), string()).unwrap();
    dev.add_leaf_node(5, dev.qname("duplex"), string()).unwrap();
    dev.exit_node().unwrap();

    let schema = compile(vec![base(), dev]).unwrap();
    let base = schema.module("base", None).unwrap();
    assert!(base.find_node(&["interfaces", "speed"]).is_none());
    assert!(base.find_node(&["interfaces", "duplex"]).is_some());
}

#[test]
fn replace_and_add_properties() {
    let mut dev = deviating();
    let replace = dev.add_deviation(2, "/b:interfaces/b:mtu", "replace").unwrap();
    dev.set_deviate_properties(
        replace,
        DeviateProperties::new()
            .with_type(TypeSpec::builtin(BuiltinType::Uint16))
            .with_units("octets"),
    )
    .unwrap();
    let add = dev
        .add_deviation(3, "/b:interfaces/b:description", "add")
        .unwrap();
    dev.set_deviate_properties(add, DeviateProperties::new().with_default("none"))
        .unwrap();

    let schema = compile(vec![base(), dev]).unwrap();
    let base = schema.module("base", None).unwrap();
    let mtu = base.find_node(&["interfaces", "mtu"]).unwrap();
    let mtu = mtu.as_leaf().unwrap();
    assert_eq!(mtu.ty.builtin_type(), Some(BuiltinType::Uint16));
    assert_eq!(mtu.units.as_deref(), Some("octets"));
    let description = base.find_node(&["interfaces", "description"]).unwrap();
    assert_eq!(description.as_leaf().unwrap().default.as_deref(), Some("none"));
}

#[test]
fn replace_with_unknown_typedef() {
    let mut dev = deviating();
    let replace = dev.add_deviation(4, "/b:interfaces/b:mtu", "replace").unwrap();
    dev.set_deviate_properties(
        replace,
        DeviateProperties::new().with_type(TypeSpec::named(NodeRef::local("jumbo"))),
    )
    .unwrap();
    let errors = compile(vec![base(), dev]).unwrap_err();
    assert_eq!(errors.first().line, 4);
    assert_eq!(errors.first().module, "vendor");
    assert_eq!(
        errors.first().kind,
        ErrorKind::UnresolvedType("jumbo".to_string())
    );
}

#[test]
fn missing_target() {
    let mut dev = deviating();
    dev.add_deviation(5, "/b:interfaces/b:speed", "not-supported")
        .unwrap();
    let errors = compile(vec![base(), dev]).unwrap_err();
    assert_eq!(
        errors.first().kind,
        ErrorKind::UnresolvedDeviation("/b:interfaces/b:speed".to_string())
    );
}
