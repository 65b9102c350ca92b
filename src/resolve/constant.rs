//! Constant resolution: Ruby's lookup order for bare constant names.
//!
//! ```text
//! class Child < Parent        # resolve("MAX", [::Outer, ::Outer::Child])
//!   include Mix               #
//!   MAX                       # 1. lexical:  ::Outer::Child::, ::Outer::
//! end                         # 2. ancestry: Child, Mix, Parent (no builtins)
//!                             # 3. toplevel: root, ::Object::, Kernel, BasicObject
//! ```
//!
//! The first phase producing a hit wins. Inside a phase the first table
//! that knows the name wins, and a table with two distinct declarations
//! for the name fails with [`ResolveError::AmbiguousConstant`]. In phase 3
//! the root table comes before `Object`'s own table.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::TypeName;
use crate::env::{AncestorBuilder, BuiltinNames, Environment};

use super::{Constant, ConstantTable, Context, ResolveError};

/// Every constant visible from one place, keyed by simple name.
type ConstantListing = IndexMap<SmolStr, Constant>;

/// Resolves constant names against one [`Environment`].
///
/// All caches are filled on demand behind read/write locks, so one
/// resolver can serve queries from many threads.
pub struct ConstantResolver<'env> {
    table: ConstantTable<'env>,
    ancestors: AncestorBuilder<'env>,
    context_constants: RwLock<FxHashMap<Context, Arc<ConstantListing>>>,
    child_constants: RwLock<FxHashMap<TypeName, Arc<ConstantListing>>>,
}

impl<'env> ConstantResolver<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self::with_builtins(env, BuiltinNames::default())
    }

    /// A resolver whose implicit `Object`/`Kernel`/`BasicObject` roots are
    /// `builtins` instead of the default names.
    pub fn with_builtins(env: &'env Environment, builtins: BuiltinNames) -> Self {
        Self {
            table: ConstantTable::new(env),
            ancestors: AncestorBuilder::with_builtins(env, builtins),
            context_constants: RwLock::new(FxHashMap::default()),
            child_constants: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn env(&self) -> &'env Environment {
        self.table.env()
    }

    pub fn table(&self) -> &ConstantTable<'env> {
        &self.table
    }

    pub fn ancestors(&self) -> &AncestorBuilder<'env> {
        &self.ancestors
    }

    fn builtins(&self) -> &BuiltinNames {
        self.ancestors.builtins()
    }

    // ========================================================================
    // RESOLVE
    // ========================================================================

    /// Resolve the bare constant `name` written at `context`.
    pub fn resolve(&self, name: &str, context: &Context) -> Result<Option<Constant>, ResolveError> {
        tracing::debug!(name, ?context, "resolving constant");

        // Declared nowhere, so no scope can have it.
        if self.env().pool().find(name).is_none() {
            return Ok(None);
        }

        if let Some(constant) = self.lookup_lexical(name, context)? {
            tracing::debug!(name, resolved = %constant.name, "resolved in lexical scope");
            return Ok(Some(constant));
        }

        if let Some(innermost) = context.innermost() {
            if let Some(constant) = self.lookup_ancestors(name, innermost)? {
                tracing::debug!(name, resolved = %constant.name, "resolved through ancestors");
                return Ok(Some(constant));
            }
        }

        let constant = self.lookup_toplevel(name)?;
        if let Some(constant) = &constant {
            tracing::debug!(name, resolved = %constant.name, "resolved at toplevel");
        }
        Ok(constant)
    }

    /// Phase 1: the enclosing namespaces, innermost first.
    ///
    /// The innermost namespace also sees its own name, which lets a class
    /// body refer to itself even when its parent is not on the chain.
    fn lookup_lexical(&self, name: &str, context: &Context) -> Result<Option<Constant>, ResolveError> {
        for (depth, frame) in context.frames().enumerate() {
            if let Some(children) = self.table.children(frame) {
                if let Some(constant) = children.lookup(name)? {
                    return Ok(Some(constant.clone()));
                }
            }
            if depth == 0 && frame.name() == name {
                if let Some(constant) = self.table.constant(frame)? {
                    return Ok(Some(constant));
                }
            }
        }
        Ok(None)
    }

    /// Phase 2: the ancestors of the innermost namespace, builtins excluded.
    fn lookup_ancestors(&self, name: &str, namespace: &TypeName) -> Result<Option<Constant>, ResolveError> {
        let Some(ancestors) = self.ancestors.instance_ancestors(namespace) else {
            return Ok(None);
        };
        for ancestor in ancestors.iter().filter(|a| !self.builtins().is_builtin(a)) {
            if let Some(constant) = self.lookup_in(ancestor, name)? {
                return Ok(Some(constant));
            }
        }
        Ok(None)
    }

    /// Phase 3: the root table, then `Object` and the rest of its ancestry.
    fn lookup_toplevel(&self, name: &str) -> Result<Option<Constant>, ResolveError> {
        if let Some(constant) = self.table.toplevel().lookup(name)? {
            return Ok(Some(constant.clone()));
        }
        if let Some(constant) = self.lookup_in(&self.builtins().object, name)? {
            return Ok(Some(constant));
        }

        for ancestor in self.object_chain() {
            if let Some(constant) = self.lookup_in(&ancestor, name)? {
                return Ok(Some(constant));
            }
        }
        Ok(None)
    }

    fn lookup_in(&self, namespace: &TypeName, name: &str) -> Result<Option<Constant>, ResolveError> {
        match self.table.children(namespace) {
            Some(children) => Ok(children.lookup(name)?.cloned()),
            None => Ok(None),
        }
    }

    /// `Object`'s ancestors after `Object` itself, with `Kernel` and
    /// `BasicObject` appended when the environment leaves them out.
    fn object_chain(&self) -> Vec<TypeName> {
        let object = &self.builtins().object;
        let mut chain: Vec<TypeName> = self
            .ancestors
            .instance_ancestors(object)
            .map(|ancestors| ancestors.iter().filter(|a| *a != object).cloned().collect())
            .unwrap_or_default();

        for implicit in [&self.builtins().kernel, &self.builtins().basic_object] {
            if !chain.contains(implicit) {
                chain.push(implicit.clone());
            }
        }
        chain
    }

    // ========================================================================
    // RESOLVE CHILD
    // ========================================================================

    /// Resolve `namespace::name`: the ancestors of `namespace` only, with no
    /// lexical scope and no toplevel.
    ///
    /// Classes additionally see `Object`, `Kernel` and `BasicObject`.
    pub fn resolve_child(
        &self,
        namespace: &TypeName,
        name: &str,
    ) -> Result<Option<Constant>, ResolveError> {
        tracing::debug!(%namespace, name, "resolving child constant");

        if self.env().pool().find(name).is_none() {
            return Ok(None);
        }
        let Some(chain) = self.child_chain(namespace) else {
            return Ok(None);
        };

        for ancestor in &chain {
            if let Some(constant) = self.lookup_in(ancestor, name)? {
                tracing::debug!(name, resolved = %constant.name, via = %ancestor, "resolved child");
                return Ok(Some(constant));
            }
        }
        Ok(None)
    }

    /// The tables searched by [`resolve_child`](Self::resolve_child), closest
    /// first. `None` when `namespace` is not a class, module or alias.
    fn child_chain(&self, namespace: &TypeName) -> Option<Vec<TypeName>> {
        let target = self.env().normalize_module_name(namespace)?;
        let mut chain = self.ancestors.instance_ancestors(&target)?.to_vec();

        let is_class = self.env().module_entry(&target).is_some_and(|entry| entry.is_class());
        if is_class {
            for implicit in self.builtins().implicit_ancestors() {
                if !chain.contains(implicit) {
                    chain.push(implicit.clone());
                }
            }
        }
        Some(chain)
    }

    // ========================================================================
    // LISTINGS
    // ========================================================================

    /// Every constant `resolve` can reach from `context`, keyed by simple
    /// name. Where `resolve` would report an ambiguity the first candidate
    /// is listed.
    pub fn constants(&self, context: &Context) -> Arc<ConstantListing> {
        if let Some(listing) = self.context_constants.read().get(context) {
            return listing.clone();
        }

        let listing = Arc::new(self.build_context_constants(context));
        tracing::trace!(?context, len = listing.len(), "built context constants");

        self.context_constants
            .write()
            .entry(context.clone())
            .or_insert(listing)
            .clone()
    }

    /// Every constant `resolve_child` can reach under `namespace`.
    ///
    /// `None` when `namespace` is not a class, module or alias.
    pub fn children(&self, namespace: &TypeName) -> Option<Arc<ConstantListing>> {
        let target = self.env().normalize_module_name(namespace)?;
        if let Some(listing) = self.child_constants.read().get(&target) {
            return Some(listing.clone());
        }

        let chain = self.child_chain(&target)?;
        let mut listing = ConstantListing::new();
        for ancestor in chain.iter().rev() {
            self.merge_table(&mut listing, ancestor);
        }
        let listing = Arc::new(listing);
        tracing::trace!(namespace = %target, len = listing.len(), "built child constants");

        Some(
            self.child_constants
                .write()
                .entry(target)
                .or_insert(listing)
                .clone(),
        )
    }

    /// Merge lowest priority first so closer tables overwrite farther ones.
    fn build_context_constants(&self, context: &Context) -> ConstantListing {
        let mut listing = ConstantListing::new();

        for ancestor in self.object_chain().iter().rev() {
            self.merge_table(&mut listing, ancestor);
        }
        self.merge_table(&mut listing, &self.builtins().object);
        for (name, constant) in self.table.toplevel().iter() {
            listing.insert(name.clone(), constant.clone());
        }

        if let Some(innermost) = context.innermost() {
            if let Some(ancestors) = self.ancestors.instance_ancestors(innermost) {
                for ancestor in ancestors.iter().rev().filter(|a| !self.builtins().is_builtin(a)) {
                    self.merge_table(&mut listing, ancestor);
                }
            }
        }

        let frames: Vec<&TypeName> = context.frames().collect();
        for (depth, frame) in frames.iter().enumerate().rev() {
            if depth == 0 {
                let itself = self.table.enclosing(frame);
                if let Some(constant) = itself.as_deref().and_then(|t| t.get(frame.name())) {
                    listing.insert(frame.name().clone(), constant.clone());
                }
            }
            self.merge_table(&mut listing, frame);
        }

        listing
    }

    fn merge_table(&self, listing: &mut ConstantListing, namespace: &TypeName) {
        if let Some(children) = self.table.children(namespace) {
            for (name, constant) in children.iter() {
                listing.insert(name.clone(), constant.clone());
            }
        }
    }
}

impl std::fmt::Debug for ConstantResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantResolver")
            .field("table", &self.table)
            .field("ancestors", &self.ancestors)
            .field("contexts", &self.context_constants.read().len())
            .finish()
    }
}
