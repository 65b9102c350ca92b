//! Type name resolution: relative type names to absolute ones.
//!
//! Only the leading component of a relative name is looked up lexically.
//! The rest is walked strictly below whatever the head resolved to:
//!
//! ```text
//! class X               # resolve(Y::Z, [::X])      => ::X::Y::Z
//!   class Y             # resolve(Y::Z, [::X::Y::Z]) => None
//!     class Z; end      #   (no ::X::Y::Z::Y, no ::Y)
//!   end
//! end
//! ```

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::base::{Namespace, TypeName};
use crate::env::Environment;

use super::Context;

/// Resolves relative type names against one [`Environment`], memoizing
/// each `(name, context)` query.
pub struct TypeNameResolver<'env> {
    env: &'env Environment,
    cache: RwLock<FxHashMap<(TypeName, Context), Option<TypeName>>>,
}

impl<'env> TypeNameResolver<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self {
            env,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn env(&self) -> &'env Environment {
        self.env
    }

    /// Resolve `name` as written at `context`.
    ///
    /// Absolute names come back unchanged without consulting the
    /// environment. A head bound to an alias yields the alias's own name.
    pub fn resolve(&self, name: &TypeName, context: &Context) -> Option<TypeName> {
        if name.is_absolute() {
            return Some(name.clone());
        }

        let key = (name.clone(), context.clone());
        if let Some(cached) = self.cache.read().get(&key) {
            return cached.clone();
        }

        let resolved = self.resolve_relative(name, context);
        tracing::debug!(%name, ?context, resolved = ?resolved, "resolved type name");

        self.cache.write().entry(key).or_insert(resolved).clone()
    }

    fn resolve_relative(&self, name: &TypeName, context: &Context) -> Option<TypeName> {
        let (head, rest) = name.split_first();
        if self.env.pool().find(&head).is_none() {
            return None;
        }

        let head = context
            .frames()
            .map(TypeName::to_namespace)
            .chain(std::iter::once(Namespace::root()))
            .map(|namespace| TypeName::new(namespace, head.clone()))
            .find(|candidate| self.env.is_type_name(candidate))?;

        let Some(rest) = rest else {
            return Some(head);
        };

        // The path stays under the name as written; `declared` tracks where
        // each step actually lives once aliases are followed.
        let mut resolved = head.clone();
        let mut declared = head;
        for component in rest.components() {
            declared = self.descend(&declared, component)?;
            resolved = TypeName::new(resolved.to_namespace(), component.clone());
        }
        Some(resolved)
    }

    /// The declaration of `current::component`, looking through `current`
    /// when it is an alias.
    fn descend(&self, current: &TypeName, component: &str) -> Option<TypeName> {
        let child = TypeName::new(current.to_namespace(), component);
        if self.env.is_type_name(&child) {
            return Some(child);
        }

        let target = self.env.normalize_module_name(current)?;
        if target == *current {
            return None;
        }
        let child = TypeName::new(target.to_namespace(), component);
        self.env.is_type_name(&child).then_some(child)
    }
}

impl std::fmt::Debug for TypeNameResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeNameResolver")
            .field("cached", &self.cache.read().len())
            .finish()
    }
}
