//! Fast hash map alias keyed by watched path.
//!
//! The debounce table is keyed by UTF-8 paths and lives for the whole process,
//! so it uses the Fx hash from `rustc-hash` instead of the DoS-resistant std
//! hasher. Keys come from the local filesystem, never from the network.

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Creates a new empty [`FxHashMap`] able to hold `capacity` entries without
/// reallocating.
///
/// # Examples
///
/// ```
/// use war_core::fx_hash_map;
///
/// let map: war_core::FxHashMap<String, u32> = fx_hash_map(8);
/// assert!(map.is_empty());
/// assert!(map.capacity() >= 8);
/// ```
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_map_operations() {
        let mut map: FxHashMap<&str, i32> = fx_hash_map(2);
        map.insert("/tmp/a", 1);
        map.insert("/tmp/b", 2);
        assert_eq!(map.get("/tmp/a"), Some(&1));
        assert_eq!(map.remove("/tmp/b"), Some(2));
        assert_eq!(map.get("/tmp/b"), None);
    }
}
