//! Fx-hashed map and set aliases.
//!
//! Scan-side lookups are keyed by small values (a [`Language`](crate::Language)
//! or an interned path slice), and none of them are exposed to untrusted
//! input, so the `rustc-hash` hasher is used throughout instead of `SipHash`.
//!
//! # Examples
//!
//! ```
//! use cloc_core::{FxHashMap, Language, Stats, fx_hash_map_with_capacity};
//!
//! let mut buckets: FxHashMap<Language, Stats> = fx_hash_map_with_capacity(Language::COUNT);
//! buckets.entry(Language::C).or_default().files += 1;
//! assert_eq!(buckets[&Language::C].files, 1);
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new [`FxHashMap`] with room for at least `capacity` entries.
#[inline]
#[must_use]
pub fn fx_hash_map_with_capacity<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

/// Creates a new [`FxHashSet`] with room for at least `capacity` entries.
#[inline]
#[must_use]
pub fn fx_hash_set_with_capacity<V>(capacity: usize) -> FxHashSet<V> {
    FxHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_with_capacity() {
        let map: FxHashMap<u8, u64> = fx_hash_map_with_capacity(16);
        assert!(map.capacity() >= 16);
        assert!(map.is_empty());
    }

    #[test]
    fn test_set_with_capacity() {
        let mut set: FxHashSet<&str> = fx_hash_set_with_capacity(4);
        assert!(set.insert("/tmp/a"));
        assert!(!set.insert("/tmp/a"));
        assert!(set.contains("/tmp/a"));
    }
}
