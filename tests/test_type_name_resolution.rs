//! Relative type name resolution.

use once_cell::sync::Lazy;
use rstest::rstest;
use rubysig::env::{
    AliasDecl, ClassDecl, Declaration, InterfaceDecl, ModuleDecl, Type, TypeAliasDecl,
};
use rubysig::{Context, Environment, TypeName, TypeNameResolver};

fn tn(s: &str) -> TypeName {
    TypeName::parse(s).unwrap()
}

fn ctx(names: &[&str]) -> Context {
    Context::from_namespaces(names.iter().map(|n| tn(n)))
}

static ENV: Lazy<Environment> = Lazy::new(|| {
    Environment::from_decls([
        // class X; class X; end; class Y; class Z; end; end; end
        Declaration::from(ClassDecl::new(tn("::X"))),
        ClassDecl::new(tn("::X::X")).into(),
        ClassDecl::new(tn("::X::Y")).into(),
        ClassDecl::new(tn("::X::Y::Z")).into(),
        // module M; class M2; end; end; module M3 = M
        ModuleDecl::new(tn("::M")).into(),
        ClassDecl::new(tn("::M::M2")).into(),
        AliasDecl::module(tn("::M3"), tn("::M")).into(),
        // reopened twice
        ClassDecl::new(tn("::Reopened")).into(),
        ClassDecl::new(tn("::Reopened")).into(),
        InterfaceDecl {
            name: tn("::_ToS"),
            location: None,
        }
        .into(),
        TypeAliasDecl {
            name: tn("::X::count"),
            ty: Type::instance(tn("::Integer")),
            location: None,
        }
        .into(),
    ])
    .unwrap()
});

static RESOLVER: Lazy<TypeNameResolver<'static>> = Lazy::new(|| TypeNameResolver::new(&ENV));

#[rstest]
#[case::toplevel_x(&[], "X", Some("::X"))]
#[case::inner_x_shadows(&["::X"], "X", Some("::X::X"))]
#[case::inside_inner_x(&["::X", "::X::X"], "X", Some("::X::X"))]
#[case::nested_from_x(&["::X"], "Y::Z", Some("::X::Y::Z"))]
#[case::nested_from_too_deep(&["::X::Y::Z"], "Y::Z", None)]
#[case::qualified_from_root(&[], "X::Y::Z", Some("::X::Y::Z"))]
#[case::missing_tail(&[], "X::Y::W", None)]
#[case::missing_head(&["::X"], "Nope", None)]
#[case::alias_head(&[], "M3", Some("::M3"))]
#[case::through_alias(&[], "M3::M2", Some("::M3::M2"))]
#[case::reopened(&["::X"], "Reopened", Some("::Reopened"))]
#[case::interface(&["::X", "::X::Y"], "_ToS", Some("::_ToS"))]
#[case::type_alias(&["::X", "::X::Y"], "count", Some("::X::count"))]
fn test_resolve(#[case] context: &[&str], #[case] name: &str, #[case] expected: Option<&str>) {
    let resolved = RESOLVER.resolve(&tn(name), &ctx(context));
    assert_eq!(resolved, expected.map(tn));
}

#[rstest]
#[case("::X")]
#[case("::Nowhere::At::All")]
fn test_absolute_names_unchanged(#[case] name: &str) {
    for context in [Context::root(), ctx(&["::X", "::X::Y"])] {
        assert_eq!(RESOLVER.resolve(&tn(name), &context), Some(tn(name)));
    }
}

#[test]
fn test_repeated_queries_are_stable() {
    let context = ctx(&["::X"]);
    let first = RESOLVER.resolve(&tn("Y::Z"), &context);
    let second = RESOLVER.resolve(&tn("Y::Z"), &ctx(&["::X"]));
    assert_eq!(first, second);
}
