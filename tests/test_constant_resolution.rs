//! Constant resolution against a small core-library environment.
//!
//! The environment mirrors a typical signature set: `BasicObject`, `Kernel`
//! and `Object` carrying their own constants, plus user classes with
//! nesting, inheritance, mixins and module aliases.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use rstest::rstest;
use rubysig::env::{AliasDecl, ClassDecl, ConstantDecl, Declaration, ModuleDecl, Type};
use rubysig::resolve::ConstantTable;
use rubysig::{Constant, ConstantResolver, Context, Environment, ResolveError, TypeName};

fn tn(s: &str) -> TypeName {
    TypeName::parse(s).unwrap()
}

fn ctx(names: &[&str]) -> Context {
    Context::from_namespaces(names.iter().map(|n| tn(n)))
}

fn integer() -> Type {
    Type::instance(tn("::Integer"))
}

static ENV: Lazy<Environment> = Lazy::new(|| {
    Environment::from_decls([
        // class BasicObject; BASIC: Integer; end
        Declaration::from(ClassDecl::new(tn("::BasicObject"))),
        ConstantDecl::new(tn("::BasicObject::BASIC"), integer()).into(),
        // module Kernel; KERNEL: Integer; end
        ModuleDecl::new(tn("::Kernel")).into(),
        ConstantDecl::new(tn("::Kernel::KERNEL"), integer()).into(),
        // class Object < BasicObject; include Kernel; OBJECT: Integer; end
        ClassDecl::new(tn("::Object"))
            .with_super(tn("::BasicObject"))
            .include(tn("::Kernel"))
            .into(),
        ConstantDecl::new(tn("::Object::OBJECT"), integer()).into(),
        ClassDecl::new(tn("::Integer")).into(),
        ClassDecl::new(tn("::String")).into(),
        // VERSION: String
        ConstantDecl::new(tn("::VERSION"), Type::instance(tn("::String"))).into(),
        // module Outer; NAME: Integer; class Inner; NAME: String; end; end
        ModuleDecl::new(tn("::Outer")).into(),
        ConstantDecl::new(tn("::Outer::NAME"), integer()).into(),
        ClassDecl::new(tn("::Outer::Inner")).into(),
        ConstantDecl::new(tn("::Outer::Inner::NAME"), Type::instance(tn("::String"))).into(),
        // class Parent; MAX: Integer; end
        ClassDecl::new(tn("::Parent")).into(),
        ConstantDecl::new(tn("::Parent::MAX"), integer()).into(),
        // module Mix; MIN: Integer; end
        ModuleDecl::new(tn("::Mix")).into(),
        ConstantDecl::new(tn("::Mix::MIN"), integer()).into(),
        // class Child < Parent; include Mix; end
        ClassDecl::new(tn("::Child"))
            .with_super(tn("::Parent"))
            .include(tn("::Mix"))
            .into(),
        // module M; module M2; end; end; module M3 = M
        ModuleDecl::new(tn("::M")).into(),
        ModuleDecl::new(tn("::M::M2")).into(),
        AliasDecl::module(tn("::M3"), tn("::M")).into(),
        AliasDecl::module(tn("::M4"), tn("::M3")).into(),
        // class Unrelated; end
        ClassDecl::new(tn("::Unrelated")).into(),
        ModuleDecl::new(tn("::Standalone")).into(),
        // class Empty; end
        ClassDecl::new(tn("::Empty")).into(),
    ])
    .unwrap()
});

static RESOLVER: Lazy<ConstantResolver<'static>> = Lazy::new(|| ConstantResolver::new(&ENV));

fn resolve(name: &str, context: &Context) -> Option<String> {
    RESOLVER
        .resolve(name, context)
        .unwrap()
        .map(|constant| constant.name.to_string())
}

// ============================================================================
// CONSTANT TABLE
// ============================================================================

#[rstest]
#[case("::Outer", "NAME", "::Outer::NAME")]
#[case("::Outer", "Inner", "::Outer::Inner")]
#[case("::Outer::Inner", "NAME", "::Outer::Inner::NAME")]
#[case("::M", "M2", "::M::M2")]
#[case("::Object", "OBJECT", "::Object::OBJECT")]
fn test_children_contain_nested(#[case] namespace: &str, #[case] child: &str, #[case] expected: &str) {
    let table = ConstantTable::new(&ENV);
    let children = table.children(&tn(namespace)).unwrap();
    assert_eq!(children.get(child).unwrap().name, tn(expected));
}

#[test]
fn test_children_types() {
    let table = ConstantTable::new(&ENV);
    let children = table.children(&tn("::Outer")).unwrap();

    assert_eq!(children.get("Inner").unwrap().ty, Type::singleton(tn("::Outer::Inner")));
    assert_eq!(children.get("NAME").unwrap().ty, integer());
}

#[test]
fn test_children_unknown_is_distinguishable_from_empty() {
    let table = ConstantTable::new(&ENV);

    assert!(table.children(&tn("::Nope")).is_none());
    assert!(table.children(&tn("::Outer::NAME")).is_none());
    assert_eq!(table.children(&tn("::Empty")).map(|t| t.len()), Some(0));
}

#[test]
fn test_alias_children_are_transparent() {
    let table = ConstantTable::new(&ENV);
    let direct = table.children(&tn("::M")).unwrap();

    for alias in ["::M3", "::M4"] {
        let via_alias = table.children(&tn(alias)).unwrap();
        assert_eq!(*via_alias, *direct);
        assert_eq!(via_alias.get("M2").unwrap().name, tn("::M::M2"));
    }
    assert!(table.toplevel().contains_key("M3"));
}

// ============================================================================
// RESOLVE
// ============================================================================

#[rstest]
#[case(&["::Outer", "::Outer::Inner"], "NAME", "::Outer::Inner::NAME")]
#[case(&["::Outer"], "NAME", "::Outer::NAME")]
#[case(&["::Outer", "::Outer::Inner"], "Inner", "::Outer::Inner")]
#[case(&["::Outer", "::Outer::Inner"], "Outer", "::Outer")]
fn test_lexical_scope_dominates(#[case] context: &[&str], #[case] name: &str, #[case] expected: &str) {
    assert_eq!(resolve(name, &ctx(context)).as_deref(), Some(expected));
}

#[rstest]
#[case("MAX", "::Parent::MAX")]
#[case("MIN", "::Mix::MIN")]
fn test_ancestor_search_order(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(resolve(name, &ctx(&["::Child"])).as_deref(), Some(expected));
}

#[rstest]
#[case::root(&[])]
#[case::class(&["::Unrelated"])]
#[case::module(&["::Standalone"])]
#[case::nested(&["::Outer", "::Outer::Inner"])]
fn test_object_constants_visible_everywhere(#[case] context: &[&str]) {
    let context = ctx(context);
    assert_eq!(resolve("OBJECT", &context).as_deref(), Some("::Object::OBJECT"));
    assert_eq!(resolve("KERNEL", &context).as_deref(), Some("::Kernel::KERNEL"));
    assert_eq!(resolve("BASIC", &context).as_deref(), Some("::BasicObject::BASIC"));
    assert_eq!(resolve("VERSION", &context).as_deref(), Some("::VERSION"));
}

#[test]
fn test_alias_visible_by_its_own_name() {
    let constant = RESOLVER.resolve("M3", &ctx(&["::Outer"])).unwrap().unwrap();
    assert_eq!(constant, Constant::new(tn("::M3"), Type::singleton(tn("::M3"))));

    // Inside the alias, the target's children are in scope.
    assert_eq!(resolve("M2", &ctx(&["::M3"])).as_deref(), Some("::M::M2"));
}

#[test]
fn test_unknown_names_are_absent() {
    assert_eq!(resolve("Missing", &ctx(&["::Child"])), None);
    // Declared somewhere, but not visible from here.
    assert_eq!(resolve("M2", &ctx(&["::Outer"])), None);
}

// ============================================================================
// RESOLVE CHILD
// ============================================================================

#[rstest]
#[case("::Unrelated", "KERNEL", Some("::Kernel::KERNEL"))]
#[case("::Unrelated", "BASIC", Some("::BasicObject::BASIC"))]
#[case("::Unrelated", "OBJECT", Some("::Object::OBJECT"))]
#[case("::Child", "MAX", Some("::Parent::MAX"))]
#[case("::Child", "MIN", Some("::Mix::MIN"))]
#[case("::M3", "M2", Some("::M::M2"))]
#[case("::Unrelated", "MAX", None)]
#[case("::Unrelated", "VERSION", None)]
#[case("::Outer::Inner", "Inner", None)]
#[case("::Nope", "MAX", None)]
fn test_resolve_child(#[case] namespace: &str, #[case] name: &str, #[case] expected: Option<&str>) {
    let found = RESOLVER.resolve_child(&tn(namespace), name).unwrap();
    assert_eq!(found.map(|c| c.name.to_string()).as_deref(), expected);
}

// ============================================================================
// LISTINGS
// ============================================================================

#[test]
fn test_constants_through_alias() {
    let listing = RESOLVER.constants(&ctx(&["::M3"]));

    assert_eq!(listing["M2"].name, tn("::M::M2"));
    assert_eq!(listing["M3"].name, tn("::M3"));
    assert_eq!(listing["OBJECT"].name, tn("::Object::OBJECT"));
}

#[test]
fn test_constants_agree_with_resolve() {
    let context = ctx(&["::Outer", "::Outer::Inner"]);
    let listing = RESOLVER.constants(&context);

    for (name, constant) in listing.iter() {
        let resolved = RESOLVER.resolve(name, &context).unwrap().unwrap();
        assert_eq!(&resolved, constant, "listing disagrees on {name}");
    }
}

#[test]
fn test_children_listing_includes_ancestors() {
    let children = RESOLVER.children(&tn("::Child")).unwrap();

    assert_eq!(children["MAX"].name, tn("::Parent::MAX"));
    assert_eq!(children["MIN"].name, tn("::Mix::MIN"));
    assert_eq!(children["KERNEL"].name, tn("::Kernel::KERNEL"));
    assert!(!children.contains_key("VERSION"));
    assert!(RESOLVER.children(&tn("::Nope")).is_none());
}

// ============================================================================
// AMBIGUITY
// ============================================================================

#[test]
fn test_ambiguous_declarations() {
    let env = Environment::from_decls([
        Declaration::from(ModuleDecl::new(tn("::A"))),
        ClassDecl::new(tn("::A::X")).into(),
        ConstantDecl::new(tn("::A::X"), integer()).into(),
        ConstantDecl::new(tn("::A::Same"), integer()).into(),
        ConstantDecl::new(tn("::A::Same"), integer()).into(),
    ])
    .unwrap();
    let resolver = ConstantResolver::new(&env);
    let context = ctx(&["::A"]);

    match resolver.resolve("X", &context) {
        Err(ResolveError::AmbiguousConstant { name, candidates }) => {
            assert_eq!(name, "X");
            assert_eq!(candidates.len(), 2);
            assert!(candidates.iter().all(|c| c.name == tn("::A::X")));
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert!(resolver.resolve_child(&tn("::A"), "X").is_err());

    // Identical redeclarations are not ambiguous.
    let same = resolver.resolve("Same", &context).unwrap().unwrap();
    assert_eq!(same.name, tn("::A::Same"));
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_concurrent_queries_agree() {
    let resolver = ConstantResolver::new(&ENV);
    let queries: Vec<(&str, Context)> = (0..64)
        .map(|i| match i % 4 {
            0 => ("MAX", ctx(&["::Child"])),
            1 => ("NAME", ctx(&["::Outer", "::Outer::Inner"])),
            2 => ("M2", ctx(&["::M4"])),
            _ => ("KERNEL", Context::root()),
        })
        .collect();

    let results: Vec<Option<TypeName>> = queries
        .par_iter()
        .map(|(name, context)| resolver.resolve(name, context).unwrap().map(|c| c.name))
        .collect();

    for ((name, context), result) in queries.iter().zip(&results) {
        let sequential = RESOLVER.resolve(name, context).unwrap().map(|c| c.name);
        assert_eq!(result, &sequential);
    }
    assert!(results.iter().all(Option::is_some));
}
