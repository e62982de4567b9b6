#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
type Map<K> = HashMap<K, u32>;
#[cfg(not(feature = "std"))]
type Map<K> = BTreeMap<K, u32>;

/// Bound for item keys used by the measurement cache.
///
/// With `std` this is `Hash + Eq`; without it the cache falls back to a `BTreeMap` and keys must
/// be `Ord`.
#[cfg(feature = "std")]
#[doc(hidden)]
pub trait KeyCacheKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> KeyCacheKey for K {}

#[cfg(not(feature = "std"))]
#[doc(hidden)]
pub trait KeyCacheKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> KeyCacheKey for K {}

/// Measured sizes keyed by item identity rather than index.
#[derive(Clone, Debug)]
pub(crate) struct SizeCache<K> {
    sizes: Map<K>,
}

impl<K: KeyCacheKey> SizeCache<K> {
    pub(crate) fn new() -> Self {
        Self { sizes: Map::new() }
    }

    pub(crate) fn get(&self, key: &K) -> Option<u32> {
        self.sizes.get(key).copied()
    }

    /// Records `size` for `key` and returns the previously cached size.
    pub(crate) fn insert(&mut self, key: K, size: u32) -> Option<u32> {
        self.sizes.insert(key, size)
    }

    pub(crate) fn clear(&mut self) {
        self.sizes.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.sizes.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, u32)> {
        self.sizes.iter().map(|(k, v)| (k, *v))
    }
}
