//! Immutable key-value registries
//!
//! Action handlers and screen composers are both looked up by string id from
//! tables that are assembled once and then only read. Use a builder to
//! accumulate entries, then call `.build()`. Rebuild on changes.

use std::borrow::Borrow;
use std::hash::Hash;

/// A read-only registry for key-value lookups
pub trait Registry {
    type Key;
    type Value;

    fn get<Q>(&self, key: &Q) -> Option<&Self::Value>
    where
        Self::Key: Borrow<Q>,
        Q: ?Sized + Eq + Hash;

    fn contains<Q>(&self, key: &Q) -> bool
    where
        Self::Key: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.get(key).is_some()
    }

    /// Registered keys in sorted order
    fn keys(&self) -> Vec<&Self::Key>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accumulates registrations for a [`Registry`]
pub trait RegistryBuilder: Default {
    type Registry: Registry;

    fn insert(
        self,
        key: <Self::Registry as Registry>::Key,
        value: <Self::Registry as Registry>::Value,
    ) -> Self;

    fn build(self) -> Self::Registry;
}
