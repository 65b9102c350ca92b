//! Interning pool for simple name components.

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// An interned simple name such as `Object` or `MAX`.
///
/// `ConstantId` is a lightweight handle (just a u32). Raw value `0` is
/// reserved for [`ConstantId::UNSET`] and is never handed out by a pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ConstantId(u32);

impl ConstantId {
    /// Placeholder for "no constant"; never returned by [`ConstantPool::insert`].
    pub const UNSET: ConstantId = ConstantId(0);

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for ConstantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            f.write_str("ConstantId(unset)")
        } else {
            write!(f, "ConstantId({})", self.0)
        }
    }
}

/// Pool deduplicating the simple names used by an environment.
///
/// Thread-safe via internal locking, so a shared `&ConstantPool` can keep
/// interning while resolvers on other threads call [`find`](Self::find).
#[derive(Default)]
pub struct ConstantPool {
    inner: RwLock<PoolInner>,
}

#[derive(Default)]
struct PoolInner {
    map: FxHashMap<SmolStr, ConstantId>,
    /// `strings[i]` is the text of the id with raw value `i + 1`.
    strings: Vec<SmolStr>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, returning the existing id when it was seen before.
    pub fn insert(&self, s: &str) -> ConstantId {
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.map.get(s) {
                return id;
            }
        }

        let mut inner = self.inner.write();

        // Another writer may have won the race.
        if let Some(&id) = inner.map.get(s) {
            return id;
        }

        let smol = SmolStr::new(s);
        inner.strings.push(smol.clone());
        let id = ConstantId(inner.strings.len() as u32);
        inner.map.insert(smol, id);
        id
    }

    /// Look up a name without interning it.
    pub fn find(&self, s: &str) -> Option<ConstantId> {
        self.inner.read().map.get(s).copied()
    }

    /// The text behind an id, or `None` for `UNSET` and foreign ids.
    pub fn resolve(&self, id: ConstantId) -> Option<SmolStr> {
        let index = id.0.checked_sub(1)? as usize;
        self.inner.read().strings.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for ConstantPool {
    fn clone(&self) -> Self {
        let inner = self.inner.read();
        Self {
            inner: RwLock::new(PoolInner {
                map: inner.map.clone(),
                strings: inner.strings.clone(),
            }),
        }
    }
}

impl fmt::Debug for ConstantPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantPool")
            .field("count", &self.inner.read().strings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_same_name() {
        let pool = ConstantPool::new();

        let a = pool.insert("Object");
        let b = pool.insert("Object");

        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_insert_never_returns_unset() {
        let pool = ConstantPool::new();

        let first = pool.insert("A");
        let second = pool.insert("B");

        assert!(!first.is_unset());
        assert_ne!(first, second);
        assert_eq!(first.index(), 1);
    }

    #[test]
    fn test_find_does_not_insert() {
        let pool = ConstantPool::new();
        pool.insert("Kernel");

        assert!(pool.find("Kernel").is_some());
        assert!(pool.find("BasicObject").is_none());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_resolve() {
        let pool = ConstantPool::new();
        let id = pool.insert("MAX");

        assert_eq!(pool.resolve(id).as_deref(), Some("MAX"));
        assert_eq!(pool.resolve(ConstantId::UNSET), None);
    }

    #[test]
    fn test_constant_id_size() {
        assert_eq!(std::mem::size_of::<ConstantId>(), 4);
    }
}
