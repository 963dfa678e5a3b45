//! Import and extension usage tests

use yangforge_builder::{CompilerConfig, ModuleBuilder, SchemaCompiler, TypeSpec};
use yangforge_foundation::{ErrorKind, NodeRef};
use yangforge_model::BuiltinType;

use crate::compile;

#[test]
fn missing_module_stops_compilation() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    m.add_module_import(2, "types", Some("2020-01-01"), "yt").unwrap();
    // Would fail in the types phase, which never runs.
    m.add_leaf_node(3, m.qname("x"), TypeSpec::named(NodeRef::local("nope")))
        .unwrap();

    let errors = compile(vec![m]).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().line, 2);
    assert_eq!(
        errors.first().kind,
        ErrorKind::MissingModule("types@2020-01-01".to_string())
    );
}

#[test]
fn import_without_revision_takes_latest() {
    let old = ModuleBuilder::new("types", "urn:example:types", "yt").with_revision("2019-01-01");
    let mut new = ModuleBuilder::new("types", "urn:example:types", "yt").with_revision("2021-06-01");
    new.add_typedef(1, new.qname("added-later"), TypeSpec::builtin(BuiltinType::Int8))
        .unwrap();

    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    m.add_module_import(1, "types", None, "yt").unwrap();
    m.add_leaf_node(2, m.qname("x"), TypeSpec::named(NodeRef::prefixed("yt", "added-later")))
        .unwrap();

    let schema = compile(vec![old, new, m]).unwrap();
    assert_eq!(schema.len(), 3);
    let leaf = schema.module("t", None).unwrap().find_node(&["x"]).unwrap();
    let ty = &leaf.as_leaf().unwrap().ty;
    assert_eq!(ty.qname.revision(), Some("2021-06-01"));
}

#[test]
fn extension_usage_is_qualified() {
    let mut ext = ModuleBuilder::new("ext", "urn:example:ext", "x");
    ext.add_extension(1, ext.qname("secret")).unwrap();

    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    m.add_module_import(1, "ext", None, "x").unwrap();
    let leaf = m
        .add_leaf_node(2, m.qname("password"), TypeSpec::builtin(BuiltinType::String))
        .unwrap();
    m.enter_node(leaf).unwrap();
    m.add_unknown_schema_node(3, "x:secret", None).unwrap();
    m.exit_node().unwrap();

    let schema = compile(vec![ext, m]).unwrap();
    let leaf = schema.module("t", None).unwrap().find_node(&["password"]).unwrap();
    let usage = &leaf.meta().unknown_nodes[0];
    assert_eq!(usage.node_type.namespace(), "urn:example:ext");
    assert_eq!(usage.node_type.local_name(), "secret");
}

#[test]
fn unknown_extension_prefix_is_lenient_by_default() {
    let build = || {
        let mut m = ModuleBuilder::new("t", "urn:t", "t");
        m.add_unknown_schema_node(4, "vendor:annotation", Some("x")).unwrap();
        m
    };
    let schema = compile(vec![build()]).unwrap();
    let module = schema.module("t", None).unwrap();
    assert_eq!(module.unknown_nodes.len(), 1);
    assert_eq!(module.unknown_nodes[0].argument.as_deref(), Some("x"));

    let mut strict = SchemaCompiler::with_config(CompilerConfig::strict());
    strict.add_module(build()).unwrap();
    let errors = strict.compile().unwrap_err();
    assert_eq!(errors.first().line, 4);
    assert_eq!(
        errors.first().kind,
        ErrorKind::UnknownPrefix("vendor".to_string())
    );
}
