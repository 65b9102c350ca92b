//! Qualified names: namespaces and type names.
//!
//! A [`Namespace`] is a path of module names that can contain declarations,
//! written `::A::B::` when absolute. A [`TypeName`] is a namespace plus one
//! final component, written `::A::B::C` when absolute.
//!
//! Both are immutable values: every operation returns a new name, and
//! equality/hashing is structural over the components plus the absolute flag.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;
use std::sync::Arc;

use smol_str::SmolStr;

const SEPARATOR: &str = "::";

/// Errors produced when parsing name text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("empty name")]
    Empty,
    #[error("invalid component `{component}` in `{text}`")]
    InvalidComponent { text: String, component: String },
    #[error("type name `{0}` must not end with `::`")]
    TrailingSeparator(String),
}

/// The kind of entity a type name denotes, decided by its spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// `Foo`: a class, module or class/module alias.
    Class,
    /// `_Foo`: an interface.
    Interface,
    /// `foo`: a type alias.
    Alias,
}

fn is_identifier(component: &str) -> bool {
    let mut chars = component.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn split_components(text: &str, body: &str) -> Result<Vec<SmolStr>, NameError> {
    body.split(SEPARATOR)
        .map(|component| {
            if is_identifier(component) {
                Ok(SmolStr::new(component))
            } else {
                Err(NameError::InvalidComponent {
                    text: text.to_string(),
                    component: component.to_string(),
                })
            }
        })
        .collect()
}

// ============================================================================
// NAMESPACE
// ============================================================================

/// A container path such as `::Foo::Bar::` (absolute) or `Foo::` (relative).
///
/// The absolute empty namespace is the root (the toplevel).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    absolute: bool,
    path: Arc<[SmolStr]>,
}

impl Namespace {
    pub fn new<I, S>(path: I, absolute: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            absolute,
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// The toplevel namespace, `::`.
    pub fn root() -> Self {
        Self::new(std::iter::empty::<SmolStr>(), true)
    }

    /// The empty relative namespace.
    pub fn empty() -> Self {
        Self::new(std::iter::empty::<SmolStr>(), false)
    }

    /// Parse `::A::B::`, `A::B::` or `A::B`. `::` is the root and `""` is
    /// the empty relative namespace.
    pub fn parse(text: &str) -> Result<Self, NameError> {
        let (absolute, body) = match text.strip_prefix(SEPARATOR) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let body = body.strip_suffix(SEPARATOR).unwrap_or(body);
        if body.is_empty() {
            return Ok(Self::new(std::iter::empty::<SmolStr>(), absolute));
        }
        Ok(Self::new(split_components(text, body)?, absolute))
    }

    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.absolute && self.path.is_empty()
    }

    #[inline]
    pub fn path(&self) -> &[SmolStr] {
        &self.path
    }

    /// `self + component`.
    pub fn append(&self, component: impl Into<SmolStr>) -> Namespace {
        let mut path = self.path.to_vec();
        path.push(component.into());
        Self::new(path, self.absolute)
    }

    /// Everything but the last component; `None` for an empty namespace.
    pub fn parent(&self) -> Option<Namespace> {
        let (_, init) = self.path.split_last()?;
        Some(Self::new(init.iter().cloned(), self.absolute))
    }

    /// The type name this namespace is the body of: `::A::B::` -> `::A::B`.
    pub fn to_type_name(&self) -> Option<TypeName> {
        let (last, init) = self.path.split_last()?;
        Some(TypeName::new(
            Self::new(init.iter().cloned(), self.absolute),
            last.clone(),
        ))
    }

    pub fn absolute(&self) -> Namespace {
        Self {
            absolute: true,
            path: self.path.clone(),
        }
    }

    pub fn relative(&self) -> Namespace {
        Self {
            absolute: false,
            path: self.path.clone(),
        }
    }

    /// This namespace and each of its parents, ending with the empty one.
    pub fn ascend(&self) -> impl Iterator<Item = Namespace> {
        std::iter::successors(Some(self.clone()), Namespace::parent)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str(SEPARATOR)?;
        }
        for component in self.path.iter() {
            write!(f, "{component}{SEPARATOR}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({self})")
    }
}

impl FromStr for Namespace {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add<&str> for &Namespace {
    type Output = Namespace;

    fn add(self, component: &str) -> Namespace {
        self.append(component)
    }
}

/// `prefix + name` qualifies a relative name; absolute names are unchanged.
impl Add<&TypeName> for &Namespace {
    type Output = TypeName;

    fn add(self, name: &TypeName) -> TypeName {
        name.with_prefix(self)
    }
}

// ============================================================================
// TYPE NAME
// ============================================================================

/// A qualified name such as `::Foo::Bar` or `Bar`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    namespace: Namespace,
    name: SmolStr,
}

impl TypeName {
    pub fn new(namespace: Namespace, name: impl Into<SmolStr>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// Parse `::A::B` (absolute) or `A::B` (relative).
    pub fn parse(text: &str) -> Result<Self, NameError> {
        let (absolute, body) = match text.strip_prefix(SEPARATOR) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if body.is_empty() {
            return Err(NameError::Empty);
        }
        if body.ends_with(SEPARATOR) {
            return Err(NameError::TrailingSeparator(text.to_string()));
        }
        let mut components = split_components(text, body)?;
        let name = components.pop().ok_or(NameError::Empty)?;
        Ok(Self::new(Namespace::new(components, absolute), name))
    }

    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.namespace.absolute
    }

    /// The last component.
    #[inline]
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    /// Everything before the last component.
    #[inline]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The namespace this name opens: `::A::B` -> `::A::B::`.
    pub fn to_namespace(&self) -> Namespace {
        self.namespace.append(self.name.clone())
    }

    /// The enclosing type name: `::A::B` -> `::A`, `::A` -> `None`.
    pub fn parent(&self) -> Option<TypeName> {
        self.namespace.to_type_name()
    }

    pub fn absolute(&self) -> TypeName {
        Self::new(self.namespace.absolute(), self.name.clone())
    }

    /// Qualify a relative name under `prefix`.
    pub fn with_prefix(&self, prefix: &Namespace) -> TypeName {
        if self.is_absolute() {
            return self.clone();
        }
        let path = prefix
            .path()
            .iter()
            .chain(self.namespace.path())
            .cloned()
            .collect::<Vec<_>>();
        Self::new(Namespace::new(path, prefix.is_absolute()), self.name.clone())
    }

    /// Split into the leading component and the relative remainder:
    /// `A::B::C` -> (`A`, `Some(B::C)`), `A` -> (`A`, `None`).
    pub fn split_first(&self) -> (SmolStr, Option<TypeName>) {
        match self.namespace.path().split_first() {
            None => (self.name.clone(), None),
            Some((head, rest)) => (
                head.clone(),
                Some(Self::new(
                    Namespace::new(rest.iter().cloned(), false),
                    self.name.clone(),
                )),
            ),
        }
    }

    pub fn components(&self) -> impl Iterator<Item = &SmolStr> {
        self.namespace.path().iter().chain(std::iter::once(&self.name))
    }

    pub fn kind(&self) -> NameKind {
        match self.name.chars().next() {
            Some('_') => NameKind::Interface,
            Some(c) if c.is_ascii_lowercase() => NameKind::Alias,
            _ => NameKind::Class,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace, self.name)
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({self})")
    }
}

impl FromStr for TypeName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tn(s: &str) -> TypeName {
        TypeName::parse(s).unwrap()
    }

    fn ns(s: &str) -> Namespace {
        Namespace::parse(s).unwrap()
    }

    #[test]
    fn test_parse_absolute_and_relative() {
        let abs = tn("::Foo::Bar");
        assert!(abs.is_absolute());
        assert_eq!(abs.name(), "Bar");
        assert_eq!(abs.namespace(), &ns("::Foo::"));

        let rel = tn("Foo::Bar");
        assert!(!rel.is_absolute());
        assert_ne!(abs, rel);
        assert_eq!(rel.absolute(), abs);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(TypeName::parse(""), Err(NameError::Empty));
        assert_eq!(TypeName::parse("::"), Err(NameError::Empty));
        assert!(matches!(
            TypeName::parse("Foo::"),
            Err(NameError::TrailingSeparator(_))
        ));
        assert!(matches!(
            TypeName::parse("Foo::::Bar"),
            Err(NameError::InvalidComponent { .. })
        ));
        assert!(matches!(
            TypeName::parse("Foo-Bar"),
            Err(NameError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(tn("::Foo::Bar").to_string(), "::Foo::Bar");
        assert_eq!(tn("Bar").to_string(), "Bar");
        assert_eq!(ns("::Foo::Bar").to_string(), "::Foo::Bar::");
        assert_eq!(Namespace::root().to_string(), "::");
        assert_eq!(Namespace::empty().to_string(), "");
    }

    #[test]
    fn test_namespace_roundtrip_through_type_name() {
        let name = tn("::A::B");
        assert_eq!(name.to_namespace(), ns("::A::B::"));
        assert_eq!(name.to_namespace().to_type_name(), Some(name));
        assert_eq!(Namespace::root().to_type_name(), None);
    }

    #[test]
    fn test_parent_chain() {
        let name = tn("::A::B::C");
        assert_eq!(name.parent(), Some(tn("::A::B")));
        assert_eq!(tn("::A").parent(), None);

        let chain: Vec<_> = ns("::A::B::").ascend().map(|n| n.to_string()).collect();
        assert_eq!(chain, ["::A::B::", "::A::", "::"]);
    }

    #[test]
    fn test_append_and_add() {
        let root = Namespace::root();
        let a = &root + "A";
        assert_eq!(a, ns("::A::"));
        assert_eq!(&a + &tn("B::C"), tn("::A::B::C"));
        assert_eq!(&a + &tn("::Z"), tn("::Z"));
    }

    #[test]
    fn test_split_first() {
        let (head, rest) = tn("Y::Z").split_first();
        assert_eq!(head, "Y");
        assert_eq!(rest, Some(tn("Z")));

        let (head, rest) = tn("X").split_first();
        assert_eq!(head, "X");
        assert_eq!(rest, None);
    }

    #[test]
    fn test_kind() {
        assert_eq!(tn("::Foo").kind(), NameKind::Class);
        assert_eq!(tn("::Foo::_Each").kind(), NameKind::Interface);
        assert_eq!(tn("::Foo::int").kind(), NameKind::Alias);
    }

    #[test]
    fn test_structural_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(tn("::A::B"));
        set.insert(Namespace::root().append("A").append("B").to_type_name().unwrap());
        set.insert(tn("A::B"));
        assert_eq!(set.len(), 2);
    }
}
