//! Immutable request scope threaded through GraphQL resolution.
//!
//! A `Scope` is a persistent linked chain of entries. Deriving a child with
//! [`Scope::with`] is O(1) and never touches the parent, so sibling resolvers
//! that branch from the same scope cannot observe each other's bindings.
//! Lookups walk from the newest entry towards the root, which gives
//! shadowing for free.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed key for a scope entry.
///
/// The key name identifies the slot, the type parameter fixes what may be
/// stored there.
pub struct ScopeKey<T> {
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> ScopeKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

struct Entry {
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// Append-only chain of request values.
#[derive(Clone, Default)]
pub struct Scope {
    head: Option<Arc<Entry>>,
}

impl Scope {
    /// Empty root scope.
    pub fn root() -> Self {
        Self::default()
    }

    /// Derive a child scope carrying `value` under `key`.
    pub fn with<T>(&self, key: &ScopeKey<T>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Entry {
                name: key.name,
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Look up the nearest binding for `key`.
    pub fn get<T>(&self, key: &ScopeKey<T>) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        self.entries()
            .find(|entry| entry.name == key.name)
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    pub fn contains<T>(&self, key: &ScopeKey<T>) -> bool
    where
        T: Any + Send + Sync,
    {
        self.get(key).is_some()
    }

    /// Number of entries between this scope and the root.
    pub fn depth(&self) -> usize {
        self.entries().count()
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        std::iter::successors(self.head.as_deref(), |entry| entry.parent.as_deref())
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries().map(|entry| entry.name))
            .finish()
    }
}
