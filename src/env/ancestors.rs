//! Ancestor linearization: the lookup order of a class or module.
//!
//! The order matches ordinary method lookup:
//!
//! ```text
//! class Child < Parent
//!   prepend Pre
//!   include A
//!   include B
//! end
//!
//! Child.ancestors  # => [Pre, Child, B, A, Parent, ..., Object, Kernel, BasicObject]
//! ```
//!
//! Prepended modules come before the module itself, included modules follow
//! it with the most recent inclusion closest, and the superclass chain comes
//! last. A module already present in the superclass chain is not inserted a
//! second time.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::TypeName;

use super::{BuiltinNames, Environment, Mixin, ModuleEntry};

/// Memoized instance-ancestor computation over one [`Environment`].
pub struct AncestorBuilder<'env> {
    env: &'env Environment,
    builtins: BuiltinNames,
    cache: RwLock<FxHashMap<TypeName, Arc<[TypeName]>>>,
}

impl<'env> AncestorBuilder<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self::with_builtins(env, BuiltinNames::default())
    }

    pub fn with_builtins(env: &'env Environment, builtins: BuiltinNames) -> Self {
        Self {
            env,
            builtins,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn env(&self) -> &'env Environment {
        self.env
    }

    pub fn builtins(&self) -> &BuiltinNames {
        &self.builtins
    }

    /// The linearized ancestors of a class or module, starting with prepended
    /// modules and the module itself.
    ///
    /// Aliases are followed first; `None` when `name` is not a module name.
    pub fn instance_ancestors(&self, name: &TypeName) -> Option<Arc<[TypeName]>> {
        let name = self.env.normalize_module_name(name)?;
        let mut visiting = FxHashSet::default();
        Some(self.linearize(&name, &mut visiting))
    }

    /// The superclass a class falls back to when it declares none.
    fn implicit_super_class(&self, entry: &ModuleEntry) -> Option<TypeName> {
        if entry.name == self.builtins.basic_object {
            None
        } else if entry.name == self.builtins.object {
            Some(self.builtins.basic_object.clone())
        } else {
            Some(self.builtins.object.clone())
        }
    }

    fn linearize(&self, name: &TypeName, visiting: &mut FxHashSet<TypeName>) -> Arc<[TypeName]> {
        if let Some(cached) = self.cache.read().get(name) {
            return cached.clone();
        }

        let Some(entry) = self.env.module_entry(name) else {
            return Arc::from([]);
        };

        if !visiting.insert(name.clone()) {
            tracing::warn!(module = %name, "cyclic ancestry, cutting the chain");
            return Arc::from([]);
        }

        let parent_ancestors = if entry.is_class() {
            entry
                .super_class
                .clone()
                .or_else(|| self.implicit_super_class(entry))
                .and_then(|super_class| self.env.normalize_module_name(&super_class))
                .map(|super_class| self.linearize(&super_class, visiting))
        } else {
            None
        };

        let mut prepends: VecDeque<TypeName> = VecDeque::new();
        let mut includes: VecDeque<TypeName> = VecDeque::new();

        for mixin in &entry.mixins {
            let Some(module) = self.env.normalize_module_name(mixin.module_name()) else {
                tracing::debug!(module = %name, mixin = %mixin.module_name(), "skipping unknown mixin");
                continue;
            };
            let ids = self.linearize(&module, visiting);

            match mixin {
                Mixin::Prepend(_) => {
                    // Prepending modules that are all already prepended keeps the order.
                    if ids.iter().any(|id| !prepends.contains(id)) {
                        prepends.retain(|id| !ids.contains(id));
                        for id in ids.iter().rev() {
                            prepends.push_front(id.clone());
                        }
                    }
                }
                Mixin::Include(_) => {
                    for id in ids.iter().rev() {
                        let known = prepends.contains(id)
                            || includes.contains(id)
                            || parent_ancestors
                                .as_ref()
                                .is_some_and(|parents| parents.contains(id));
                        if !known {
                            includes.push_front(id.clone());
                        }
                    }
                }
            }
        }

        visiting.remove(name);

        let ancestors: Arc<[TypeName]> = prepends
            .into_iter()
            .chain(std::iter::once(name.clone()))
            .chain(includes)
            .chain(parent_ancestors.iter().flat_map(|parents| parents.iter().cloned()))
            .collect();

        tracing::trace!(module = %name, count = ancestors.len(), "linearized ancestors");
        self.cache
            .write()
            .entry(name.clone())
            .or_insert(ancestors)
            .clone()
    }
}

impl std::fmt::Debug for AncestorBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AncestorBuilder")
            .field("builtins", &self.builtins)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}
