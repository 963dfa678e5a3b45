//! Identity resolution tests

use std::sync::Arc;

use yangforge_builder::{CompilerConfig, ModuleBuilder, SchemaCompiler};
use yangforge_foundation::ErrorKind;

use crate::compile;

#[test]
fn bases_across_modules() {
    let mut iana = ModuleBuilder::new("iana", "urn:example:iana", "ianaift");
    iana.add_identity(1, iana.qname("iana-interface-type")).unwrap();

    let mut ift = ModuleBuilder::new("if-types", "urn:example:if-types", "ift");
    ift.add_module_import(1, "iana", None, "ianaift").unwrap();
    // Declared before its base.
    let vlan = ift.add_identity(2, ift.qname("l2vlan")).unwrap();
    ift.set_identity_base(vlan, "ethernet").unwrap();
    let eth = ift.add_identity(3, ift.qname("ethernet")).unwrap();
    ift.set_identity_base(eth, "ianaift:iana-interface-type").unwrap();

    let schema = compile(vec![ift, iana]).unwrap();
    let ift = schema.module("if-types", None).unwrap();
    let iana = schema.module("iana", None).unwrap();

    let vlan = ift.identity("l2vlan").unwrap();
    let eth = vlan.base.as_ref().unwrap();
    assert!(Arc::ptr_eq(eth, ift.identity("ethernet").unwrap()));
    let root = eth.base.as_ref().unwrap();
    assert!(Arc::ptr_eq(root, iana.identity("iana-interface-type").unwrap()));
    assert!(root.base.is_none());
}

#[test]
fn cycle_is_reported_for_each_member() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    for (line, name, base) in [(1, "a", "b"), (2, "b", "a"), (3, "c", "a")] {
        let id = m.add_identity(line, m.qname(name)).unwrap();
        m.set_identity_base(id, base).unwrap();
    }
    let errors = compile(vec![m]).unwrap_err();
    assert_eq!(errors.len(), 3);
    let cyclic: Vec<u32> = errors
        .iter()
        .filter(|e| matches!(e.kind, ErrorKind::CyclicIdentity(_)))
        .map(|e| e.line)
        .collect();
    // `c` only hangs off the cycle.
    assert_eq!(cyclic, vec![1, 2]);
}

#[test]
fn cycle_check_can_be_disabled() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    let id = m.add_identity(1, m.qname("self")).unwrap();
    m.set_identity_base(id, "self").unwrap();

    let config = CompilerConfig::default().with_check_identity_cycles(false);
    let mut compiler = SchemaCompiler::with_config(config);
    compiler.add_module(m).unwrap();
    let errors = compiler.compile().unwrap_err();
    assert_eq!(
        errors.first().kind,
        ErrorKind::UnresolvedIdentity("self".to_string())
    );
}

#[test]
fn unknown_base() {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    let id = m.add_identity(6, m.qname("x")).unwrap();
    m.set_identity_base(id, "ghost").unwrap();
    let errors = compile(vec![m]).unwrap_err();
    assert_eq!(errors.first().line, 6);
    assert!(matches!(errors.first().kind, ErrorKind::UnresolvedIdentity(_)));
}
