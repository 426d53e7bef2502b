//! IncrHashMap: typed map API over the incremental core.
//!
//! Hashes each key exactly once at insert time with a `BuildHasher` and
//! stores the result; `K: Hash` is never invoked again for an entry, so
//! migration re-buckets purely from stored hashes and never calls back into
//! user code mid-move.

use crate::config::MapConfig;
use crate::error::MapConfigError;
use crate::incr_map::IncrMap;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

pub struct IncrHashMap<K, V, S = RandomState> {
    hasher: S,
    map: IncrMap<Entry<K, V>>,
}

impl<K, V> IncrHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(RandomState::default())
    }

    pub fn with_config(config: MapConfig) -> Result<Self, MapConfigError> {
        Self::with_config_and_hasher(config, RandomState::default())
    }
}

impl<K, V> Default for IncrHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> IncrHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            map: IncrMap::new(),
        }
    }

    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, MapConfigError> {
        Ok(Self {
            hasher,
            map: IncrMap::with_config(config)?,
        })
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bucket count of the current generation.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// True while a resize is draining the previous generation.
    pub fn is_resizing(&self) -> bool {
        self.map.is_resizing()
    }

    /// Entries still waiting in the old generation; 0 in steady state.
    pub fn pending_migration(&self) -> usize {
        self.map.pending_migration()
    }

    /// Insert, overwriting in place on a duplicate key and returning the
    /// previous value. Helps migration before probing, like every other
    /// mutating operation, so a pure-overwrite workload still drives an
    /// in-flight resize to completion.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        if let Some(found) = self.map.lookup(hash, |e| e.key == key) {
            let entry = self.map.get_mut(found).expect("found entry resolves");
            return Some(mem::replace(&mut entry.value, value));
        }
        self.map.insert(hash, Entry { key, value });
        None
    }

    /// Look up a value, helping migration along the way (hence `&mut self`).
    /// Use `peek` for a shared-reference probe.
    pub fn get<Q>(&mut self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let found = self.map.lookup(hash, |e| e.key.borrow() == q)?;
        self.map.get(found).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let found = self.map.lookup(hash, |e| e.key.borrow() == q)?;
        self.map.get_mut(found).map(|e| &mut e.value)
    }

    /// Read-only lookup that performs no migration work.
    pub fn peek<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let found = self.map.find(hash, |e| e.key.borrow() == q)?;
        self.map.get(found).map(|e| &e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.map.find(hash, |e| e.key.borrow() == q).is_some()
    }

    /// Remove a key, returning its value. Absence is a normal result.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.map
            .remove(hash, |e| e.key.borrow() == q)
            .map(|e| e.value)
    }

    /// Iterate all entries in unspecified order, spanning both generations.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter().map(|(_, e)| (&e.key, &e.value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.map.iter_mut().map(|(_, e)| (&e.key, &mut e.value))
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: insert overwrites in place on a duplicate key and hands
    /// back the previous value; len is unaffected.
    #[test]
    fn insert_overwrites_duplicates() {
        let mut m: IncrHashMap<String, i32> = IncrHashMap::new();
        assert_eq!(m.insert("k".to_string(), 1), None);
        assert_eq!(m.insert("k".to_string(), 2), Some(1));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("k"), Some(&2));
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`)
    /// on every probe entry point.
    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: IncrHashMap<String, i32> = IncrHashMap::new();
        m.insert("hello".to_string(), 1);
        assert!(m.contains_key("hello"));
        assert_eq!(m.peek("hello"), Some(&1));
        assert_eq!(m.get("hello"), Some(&1));
        assert!(!m.contains_key("world"));
        assert_eq!(m.remove("hello"), Some(1));
        assert_eq!(m.remove("hello"), None);
    }

    /// Invariant: get_mut mutates the stored value in place.
    #[test]
    fn get_mut_updates_value() {
        let mut m: IncrHashMap<String, i32> = IncrHashMap::new();
        m.insert("k".to_string(), 10);
        *m.get_mut("k").unwrap() += 5;
        assert_eq!(m.peek("k"), Some(&15));
    }

    /// Invariant: overwrite reaches an entry that still lives in the old
    /// generation mid-resize.
    #[test]
    fn overwrite_mid_resize() {
        let cfg = MapConfig {
            initial_capacity: 4,
            growth_factor: 2,
            work_budget: 1,
        };
        let mut m: IncrHashMap<u32, u32> = IncrHashMap::with_config(cfg).unwrap();
        for i in 0..4 {
            m.insert(i, i);
        }
        assert!(m.is_resizing());
        // Some original key is still waiting in the drain table.
        assert!(m.pending_migration() > 0);
        for i in 0..4 {
            assert_eq!(m.insert(i, i + 100), Some(i));
        }
        assert_eq!(m.len(), 4);
        for i in 0..4 {
            assert_eq!(m.get(&i), Some(&(i + 100)));
        }
    }

    /// Invariant: a pure-overwrite workload still performs bounded
    /// migration work per call and drives the map back to steady state.
    #[test]
    fn overwrite_storm_drives_migration() {
        let cfg = MapConfig {
            initial_capacity: 4,
            growth_factor: 2,
            work_budget: 1,
        };
        let mut m: IncrHashMap<u32, u32> = IncrHashMap::with_config(cfg).unwrap();
        for i in 0..4 {
            m.insert(i, i);
        }
        assert!(m.is_resizing());
        assert_eq!(m.pending_migration(), 4);

        // Overwrites only: each call must migrate one entry (budget 1).
        let mut expected_old = 0;
        for _ in 0..4 {
            let before = m.pending_migration();
            assert_eq!(m.insert(0, 999), Some(expected_old));
            expected_old = 999;
            assert_eq!(m.pending_migration(), before.saturating_sub(1));
        }
        assert_eq!(m.pending_migration(), 0);
        assert!(!m.is_resizing());
        assert_eq!(m.len(), 4);
        assert_eq!(m.peek(&0), Some(&999));
    }

    /// Invariant: peek and contains_key never advance migration.
    #[test]
    fn peek_does_not_migrate() {
        let cfg = MapConfig {
            initial_capacity: 4,
            growth_factor: 2,
            work_budget: 1,
        };
        let mut m: IncrHashMap<u32, u32> = IncrHashMap::with_config(cfg).unwrap();
        for i in 0..4 {
            m.insert(i, i);
        }
        assert!(m.is_resizing());
        let pending = m.pending_migration();
        for i in 0..4 {
            assert_eq!(m.peek(&i), Some(&i));
            assert!(m.contains_key(&i));
        }
        assert_eq!(m.pending_migration(), pending);
        // A migrating read does advance it.
        let _ = m.get(&0);
        assert!(m.pending_migration() < pending);
    }

    /// Invariant: iteration yields each live entry exactly once.
    #[test]
    fn iteration_and_mutation() {
        let mut m: IncrHashMap<String, i32> = IncrHashMap::new();
        for (i, k) in ["k1", "k2", "k3"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }
        let mut seen: Vec<(String, i32)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("k1".to_string(), 0),
                ("k2".to_string(), 1),
                ("k3".to_string(), 2)
            ]
        );

        for (_, v) in m.iter_mut() {
            *v += 10;
        }
        assert_eq!(m.peek("k2"), Some(&11));
    }

    /// Invariant: clear empties the map and lookups miss afterwards.
    #[test]
    fn clear_empties_map() {
        let mut m: IncrHashMap<u32, u32> = IncrHashMap::new();
        for i in 0..100 {
            m.insert(i, i);
        }
        m.clear();
        assert!(m.is_empty());
        assert!(!m.is_resizing());
        assert_eq!(m.get(&1), None);
    }
}
