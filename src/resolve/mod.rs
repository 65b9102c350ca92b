//! Name resolution: resolving bare names to their declarations.
//!
//! Two independent resolvers read one [`Environment`](crate::env::Environment):
//!
//! - [`ConstantResolver`] answers "which constant does `NAME` mean here?"
//!   using Ruby's constant lookup: lexical scope, then the ancestors of the
//!   innermost namespace, then the toplevel and the implicit `Object` ancestry.
//! - [`TypeNameResolver`] turns a relative type name such as `Y::Z` into an
//!   absolute [`TypeName`] by searching the lexical scope only.
//!
//! Both take a caller-built [`Context`], the chain of namespaces enclosing
//! the reference, and memoize per query so repeated lookups are cheap.
//!
//! ## Key Data Structures
//!
//! - [`ConstantTable`] - Lazily built per-namespace maps of direct children
//! - [`Constant`] - One resolution answer: absolute name plus type
//! - [`ResolveError`] - Raised only for ambiguous constants; absence is `None`

mod constant;
mod context;
mod diagnostics;
mod table;
mod type_name;

pub use constant::ConstantResolver;
pub use context::Context;
pub use diagnostics::{
    codes, check_environment, Diagnostic, DiagnosticCollector, EnvironmentChecker, RelatedInfo,
    Severity,
};
pub use table::{ConstantMap, ConstantTable};
pub use type_name::TypeNameResolver;

use smol_str::SmolStr;

use crate::base::{Location, TypeName};
use crate::env::Type;

/// A resolved constant: its absolute name and declared type.
///
/// Classes and modules appear as constants typed `singleton(Name)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constant {
    pub name: TypeName,
    pub ty: Type,
    pub location: Option<Location>,
}

impl Constant {
    pub fn new(name: TypeName, ty: Type) -> Self {
        Self {
            name,
            ty,
            location: None,
        }
    }

    /// Whether two constants denote the same declaration, ignoring where
    /// they were written.
    pub fn same_declaration(&self, other: &Constant) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

/// Resolution failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Two or more distinct declarations tie for the same name.
    #[error("constant `{name}` is ambiguous between {}", candidate_list(.candidates))]
    AmbiguousConstant {
        name: SmolStr,
        candidates: Vec<Constant>,
    },
}

fn candidate_list(candidates: &[Constant]) -> String {
    candidates
        .iter()
        .map(|constant| format!("`{}: {}`", constant.name, constant.ty))
        .collect::<Vec<_>>()
        .join(", ")
}
