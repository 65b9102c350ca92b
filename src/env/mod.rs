//! The environment: a read-only symbol table of signature declarations.
//!
//! An external builder parses signature files and feeds the resulting
//! [`Declaration`]s into an [`Environment`]. Once built, the environment is
//! only read: resolvers borrow it and keep their own caches.
//!
//! ## Key Data Structures
//!
//! - [`Environment`] - Declarations indexed by absolute name and by namespace
//! - [`ModuleEntry`] - A class or module merged over all its reopenings
//! - [`AncestorBuilder`] - Memoized superclass/mixin linearization

mod ancestors;
mod builtins;
mod decls;
mod types;

pub use ancestors::AncestorBuilder;
pub use builtins::BuiltinNames;
pub use decls::{
    AliasDecl, ClassDecl, ConstantDecl, Declaration, InterfaceDecl, Mixin, ModuleDecl,
    ModuleKind, TypeAliasDecl,
};
pub use types::{BaseType, Type};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{ConstantPool, Location, Namespace, TypeName};

/// Errors raised while inserting declarations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvironmentError {
    #[error("declaration names must be absolute, got `{0}`")]
    RelativeName(TypeName),
    #[error("`{name}` is declared as a {existing} and cannot be reopened as a {added}")]
    KindMismatch {
        name: TypeName,
        existing: &'static str,
        added: &'static str,
    },
}

// ============================================================================
// MODULE ENTRY
// ============================================================================

/// A class or module, merged over every declaration that opens it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleEntry {
    pub name: TypeName,
    pub kind: ModuleKind,
    /// The first explicit superclass among the class declarations.
    pub super_class: Option<TypeName>,
    /// Mixins of all declarations, in declaration order.
    pub mixins: Vec<Mixin>,
    pub locations: Vec<Location>,
}

impl ModuleEntry {
    fn new(name: TypeName, kind: ModuleKind) -> Self {
        Self {
            name,
            kind,
            super_class: None,
            mixins: Vec::new(),
            locations: Vec::new(),
        }
    }

    #[inline]
    pub fn is_class(&self) -> bool {
        self.kind == ModuleKind::Class
    }
}

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// All declarations of a program, keyed by absolute name.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    modules: IndexMap<TypeName, ModuleEntry>,
    aliases: IndexMap<TypeName, AliasDecl>,
    /// Duplicates are kept; the constant table reports them as ambiguous.
    constants: IndexMap<TypeName, Vec<ConstantDecl>>,
    interfaces: IndexMap<TypeName, InterfaceDecl>,
    type_aliases: IndexMap<TypeName, TypeAliasDecl>,
    /// Namespace -> modules, aliases and constants declared directly in it.
    members: FxHashMap<Namespace, IndexSet<TypeName>>,
    pool: ConstantPool,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an environment from a list of declarations.
    pub fn from_decls<I>(decls: I) -> Result<Self, EnvironmentError>
    where
        I: IntoIterator,
        I::Item: Into<Declaration>,
    {
        let mut env = Self::new();
        for decl in decls {
            env.add(decl)?;
        }
        Ok(env)
    }

    /// Insert one declaration.
    ///
    /// Reopened classes and modules merge into their existing entry; a
    /// reopening with the other kind is rejected.
    pub fn add(&mut self, decl: impl Into<Declaration>) -> Result<(), EnvironmentError> {
        let decl = decl.into();
        for name in std::iter::once(decl.name()).chain(decl.references()) {
            if !name.is_absolute() {
                return Err(EnvironmentError::RelativeName(name.clone()));
            }
        }

        let name = decl.name().clone();
        let simple = name.name().clone();

        match decl {
            Declaration::Class(class) => {
                let entry = self.module_entry_mut(&name, ModuleKind::Class)?;
                if entry.super_class.is_none() {
                    entry.super_class = class.super_class;
                }
                entry.mixins.extend(class.mixins);
                entry.locations.extend(class.location);
                self.add_member(name);
            }
            Declaration::Module(module) => {
                let entry = self.module_entry_mut(&name, ModuleKind::Module)?;
                entry.mixins.extend(module.mixins);
                entry.locations.extend(module.location);
                self.add_member(name);
            }
            Declaration::Constant(constant) => {
                self.constants.entry(name.clone()).or_default().push(constant);
                self.add_member(name);
            }
            Declaration::Alias(alias) => {
                self.aliases.insert(name.clone(), alias);
                self.add_member(name);
            }
            Declaration::Interface(interface) => {
                self.interfaces.insert(name, interface);
            }
            Declaration::TypeAlias(type_alias) => {
                self.type_aliases.insert(name, type_alias);
            }
        }
        self.pool.insert(&simple);
        Ok(())
    }

    fn module_entry_mut(
        &mut self,
        name: &TypeName,
        kind: ModuleKind,
    ) -> Result<&mut ModuleEntry, EnvironmentError> {
        let entry = self
            .modules
            .entry(name.clone())
            .or_insert_with(|| ModuleEntry::new(name.clone(), kind));
        if entry.kind != kind {
            return Err(EnvironmentError::KindMismatch {
                name: name.clone(),
                existing: entry.kind.as_str(),
                added: kind.as_str(),
            });
        }
        Ok(entry)
    }

    fn add_member(&mut self, name: TypeName) {
        self.members
            .entry(name.namespace().clone())
            .or_default()
            .insert(name);
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn module_entry(&self, name: &TypeName) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }

    pub fn alias_decl(&self, name: &TypeName) -> Option<&AliasDecl> {
        self.aliases.get(name)
    }

    /// Every declaration of the constant `name`, empty when undeclared.
    pub fn constant_decls(&self, name: &TypeName) -> &[ConstantDecl] {
        self.constants.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn interface_decl(&self, name: &TypeName) -> Option<&InterfaceDecl> {
        self.interfaces.get(name)
    }

    pub fn type_alias_decl(&self, name: &TypeName) -> Option<&TypeAliasDecl> {
        self.type_aliases.get(name)
    }

    /// Whether `name` is a class, module or class/module alias.
    pub fn is_module_name(&self, name: &TypeName) -> bool {
        self.modules.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Whether `name` can appear in a type: modules, aliases, interfaces and
    /// type aliases.
    pub fn is_type_name(&self, name: &TypeName) -> bool {
        self.is_module_name(name)
            || self.interfaces.contains_key(name)
            || self.type_aliases.contains_key(name)
    }

    /// Modules, aliases and constants declared directly in `namespace`.
    pub fn members_of<'a>(
        &'a self,
        namespace: &Namespace,
    ) -> impl Iterator<Item = &'a TypeName> + use<'a> {
        self.members.get(namespace).into_iter().flatten()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &TypeName> {
        self.modules.keys()
    }

    pub fn alias_names(&self) -> impl Iterator<Item = &TypeName> {
        self.aliases.keys()
    }

    pub fn constant_names(&self) -> impl Iterator<Item = &TypeName> {
        self.constants.keys()
    }

    /// Follow class/module aliases until a class or module is reached.
    ///
    /// Returns `None` when `name` is not a module name, when an alias points
    /// at nothing, or when the alias chain loops.
    pub fn normalize_module_name(&self, name: &TypeName) -> Option<TypeName> {
        let mut current = name.clone();
        let mut visited = FxHashSet::default();

        loop {
            if self.modules.contains_key(&current) {
                return Some(current);
            }
            let Some(alias) = self.aliases.get(&current) else {
                if current != *name {
                    tracing::warn!(alias = %name, target = %current, "alias target is not declared");
                }
                return None;
            };
            if !visited.insert(current.clone()) {
                tracing::warn!(alias = %name, "alias chain is cyclic");
                return None;
            }
            current = alias.target.clone();
        }
    }

    /// The interning pool of every declared simple name.
    pub fn pool(&self) -> &ConstantPool {
        &self.pool
    }

    /// Number of declared names (modules, aliases, constants, interfaces and
    /// type aliases).
    pub fn len(&self) -> usize {
        self.modules.len()
            + self.aliases.len()
            + self.constants.len()
            + self.interfaces.len()
            + self.type_aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
