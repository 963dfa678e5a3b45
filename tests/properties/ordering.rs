//! Declaration order independence

use proptest::prelude::*;
use yangforge_builder::{ModuleBuilder, SchemaCompiler, TypeSpec};
use yangforge_foundation::NodeRef;
use yangforge_model::BuiltinType;

/// A permutation of `0..n` for some `n` in `1..=max`.
fn permutation(max: usize) -> impl Strategy<Value = Vec<usize>> {
    (1..=max).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

fn line(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}

/// `leaf x { type t0; }` and `typedef t{i} { type t{i+1}; }`, the last one
/// deriving from `uint32`, declared in `order`.
fn typedef_chain(order: &[usize]) -> ModuleBuilder {
    let n = order.len();
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    m.add_leaf_node(1, m.qname("x"), TypeSpec::named(NodeRef::local("t0")))
        .unwrap();
    for (pos, &i) in order.iter().enumerate() {
        let ty = if i + 1 == n {
            TypeSpec::builtin(BuiltinType::Uint32)
        } else {
            TypeSpec::named(NodeRef::local(format!("t{}", i + 1)))
        };
        m.add_typedef(line(pos + 2), m.qname(&format!("t{i}")), ty)
            .unwrap();
    }
    m
}

/// A container `top` and augments adding `a0` under `top`, `a1` under `a0`
/// and so on, declared in `order`.
fn augment_chain(order: &[usize]) -> ModuleBuilder {
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    m.add_container_node(1, m.qname("top")).unwrap();
    for (pos, &i) in order.iter().enumerate() {
        let mut target = String::from("/t:top");
        for level in 0..i {
            target.push_str(&format!("/t:a{level}"));
        }
        let base = line(10 * (pos + 1));
        let aug = m.add_augment(base, &target).unwrap();
        m.enter_node(aug).unwrap();
        m.add_container_node(base + 1, m.qname(&format!("a{i}"))).unwrap();
        m.exit_node().unwrap();
    }
    m
}

/// `grouping g{i} { uses g{i+1}; }`, the last one holding `leaf end`, used
/// by container `top`; groupings declared in `order`.
fn grouping_chain(order: &[usize]) -> ModuleBuilder {
    let n = order.len();
    let mut m = ModuleBuilder::new("t", "urn:t", "t");
    for (pos, &i) in order.iter().enumerate() {
        let base = line(10 * (pos + 1));
        let g = m.add_grouping(base, m.qname(&format!("g{i}"))).unwrap();
        m.enter_node(g).unwrap();
        m.add_leaf_node(base + 1, m.qname(&format!("l{i}")), TypeSpec::builtin(BuiltinType::Empty))
            .unwrap();
        if i + 1 < n {
            m.add_uses_node(base + 2, &format!("g{}", i + 1)).unwrap();
        }
        m.exit_node().unwrap();
    }
    let top = m.add_container_node(1, m.qname("top")).unwrap();
    m.enter_node(top).unwrap();
    m.add_uses_node(2, "g0").unwrap();
    m.exit_node().unwrap();
    m
}

proptest! {
    #[test]
    fn typedef_chain_resolves_in_any_order(order in permutation(8)) {
        let n = order.len();
        let mut compiler = SchemaCompiler::new();
        compiler.add_module(typedef_chain(&order)).unwrap();
        let schema = compiler.compile().unwrap();
        let leaf = schema.module("t", None).unwrap().find_node(&["x"]).unwrap();
        let ty = &leaf.as_leaf().unwrap().ty;
        prop_assert_eq!(ty.builtin_type(), Some(BuiltinType::Uint32));
        prop_assert_eq!(ty.depth(), n);
        prop_assert_eq!(ty.qname.local_name(), "t0");
    }

    #[test]
    fn augment_chain_resolves_in_any_order(order in permutation(8)) {
        let n = order.len();
        let mut compiler = SchemaCompiler::new();
        compiler.add_module(augment_chain(&order)).unwrap();
        prop_assert!(compiler.resolve().is_ok());
        prop_assert_eq!(compiler.module("t", None).unwrap().augments_resolved(), n);

        let schema = compiler.compile().unwrap();
        let mut names = vec!["top".to_string()];
        names.extend((0..n).map(|i| format!("a{i}")));
        let deepest = schema.module("t", None).unwrap().find_node(&names);
        prop_assert!(deepest.is_some());
        prop_assert!(deepest.unwrap().flags().augmenting);
    }

    #[test]
    fn nested_uses_expand_in_any_order(order in permutation(6)) {
        let n = order.len();
        let mut compiler = SchemaCompiler::new();
        compiler.add_module(grouping_chain(&order)).unwrap();
        let schema = compiler.compile().unwrap();
        let module = schema.module("t", None).unwrap();
        for i in 0..n {
            let leaf = module.find_node(&["top".to_string(), format!("l{i}")]);
            prop_assert!(leaf.is_some(), "l{} missing", i);
            prop_assert!(leaf.unwrap().flags().added_by_uses);
        }
    }

    #[test]
    fn unreachable_augment_never_loops(order in permutation(5)) {
        let n = order.len();
        let mut m = augment_chain(&order);
        m.add_augment(1000, &format!("/t:top/t:a{n}")).unwrap();
        let mut compiler = SchemaCompiler::new();
        compiler.add_module(m).unwrap();
        let errors = compiler.compile().unwrap_err();
        prop_assert_eq!(errors.len(), 1);
        prop_assert_eq!(errors.first().line, 1000);
    }
}
