//! Constant tables: per-namespace maps from simple name to constant.
//!
//! A table holds only the *direct* children of one namespace: constants and
//! nested classes, modules and aliases. Tables are derived lazily from the
//! environment and cached for the lifetime of the [`ConstantTable`].

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{Namespace, TypeName};
use crate::env::{Environment, Type};

use super::{Constant, ResolveError};

// ============================================================================
// CONSTANT MAP
// ============================================================================

/// Simple name -> constant(s) declared directly in one namespace.
///
/// A name normally maps to exactly one constant. It maps to several when
/// distinct declarations share a qualified name (say a class and a constant
/// both called `::A::X`), which [`lookup`](Self::lookup) reports as ambiguous.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstantMap {
    entries: IndexMap<SmolStr, Vec<Constant>>,
}

impl ConstantMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate, dropping it when an equal declaration is present.
    pub fn insert(&mut self, constant: Constant) {
        let candidates = self.entries.entry(constant.name.name().clone()).or_default();
        if !candidates.iter().any(|c| c.same_declaration(&constant)) {
            candidates.push(constant);
        }
    }

    /// The first candidate for `name`.
    pub fn get(&self, name: &str) -> Option<&Constant> {
        self.entries.get(name).and_then(|candidates| candidates.first())
    }

    /// Every candidate for `name`.
    pub fn candidates(&self, name: &str) -> &[Constant] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// The unique constant for `name`, or an ambiguity error.
    pub fn lookup(&self, name: &str) -> Result<Option<&Constant>, ResolveError> {
        match self.candidates(name) {
            [] => Ok(None),
            [single] => Ok(Some(single)),
            candidates => Err(ResolveError::AmbiguousConstant {
                name: SmolStr::new(name),
                candidates: candidates.to_vec(),
            }),
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names with more than one candidate.
    pub fn ambiguous(&self) -> impl Iterator<Item = (&SmolStr, &[Constant])> {
        self.entries
            .iter()
            .filter(|(_, candidates)| candidates.len() > 1)
            .map(|(name, candidates)| (name, candidates.as_slice()))
    }

    /// `(simple name, first candidate)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Constant)> {
        self.entries
            .iter()
            .filter_map(|(name, candidates)| Some((name, candidates.first()?)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &SmolStr> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// CONSTANT TABLE
// ============================================================================

/// Lazily built constant maps for every namespace of one environment.
///
/// Aliases are transparent: the children of `::M3` where `module M3 = M`
/// are the children of `::M`.
pub struct ConstantTable<'env> {
    env: &'env Environment,
    tables: RwLock<FxHashMap<Namespace, Arc<ConstantMap>>>,
}

impl<'env> ConstantTable<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self {
            env,
            tables: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn env(&self) -> &'env Environment {
        self.env
    }

    /// Constants, classes, modules and aliases declared at the root.
    pub fn toplevel(&self) -> Arc<ConstantMap> {
        self.table_for(Namespace::root())
    }

    /// Direct children of the class or module `name`.
    ///
    /// `None` when `name` is not a declared class, module or alias; a
    /// declared module without children yields an empty map.
    pub fn children(&self, name: &TypeName) -> Option<Arc<ConstantMap>> {
        let target = self.env.normalize_module_name(name)?;
        Some(self.table_for(target.to_namespace()))
    }

    /// The table entry for the absolute name `name` itself.
    pub fn constant(&self, name: &TypeName) -> Result<Option<Constant>, ResolveError> {
        match self.enclosing(name) {
            Some(table) => Ok(table.lookup(name.name())?.cloned()),
            None => Ok(None),
        }
    }

    /// The table `name` itself is listed in.
    pub fn enclosing(&self, name: &TypeName) -> Option<Arc<ConstantMap>> {
        match name.parent() {
            None => Some(self.toplevel()),
            Some(parent) => self.children(&parent),
        }
    }

    fn table_for(&self, namespace: Namespace) -> Arc<ConstantMap> {
        if let Some(table) = self.tables.read().get(&namespace) {
            return table.clone();
        }

        let table = Arc::new(self.build(&namespace));
        tracing::trace!(%namespace, len = table.len(), "built constant table");

        self.tables.write().entry(namespace).or_insert(table).clone()
    }

    fn build(&self, namespace: &Namespace) -> ConstantMap {
        let mut table = ConstantMap::new();

        for name in self.env.members_of(namespace) {
            if let Some(entry) = self.env.module_entry(name) {
                table.insert(Constant {
                    name: name.clone(),
                    ty: Type::singleton(name.clone()),
                    location: entry.locations.first().copied(),
                });
            }
            if let Some(alias) = self.env.alias_decl(name) {
                table.insert(Constant {
                    name: name.clone(),
                    ty: Type::singleton(name.clone()),
                    location: alias.location,
                });
            }
            for decl in self.env.constant_decls(name) {
                table.insert(Constant {
                    name: name.clone(),
                    ty: decl.ty.clone(),
                    location: decl.location,
                });
            }
        }

        table
    }
}

impl std::fmt::Debug for ConstantTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantTable")
            .field("cached", &self.tables.read().len())
            .finish()
    }
}
