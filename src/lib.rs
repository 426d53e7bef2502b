//! incr-hashmap: a single-threaded hash map that grows incrementally,
//! bounding per-operation migration work instead of rehashing the whole
//! table at once.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: the indexing primitive for a single-process key-value server,
//!   where a stop-the-world rehash of a large table would blow the tail
//!   latency budget. Growth is amortized: when the load factor reaches 1.0
//!   the map allocates a larger table and drains the old one a bounded
//!   number of entries at a time as a side effect of normal operations.
//! - Layers:
//!   - table::BucketTable: one generation of chained buckets, power-of-two
//!     sized, addressed by `hash & mask`. Chains are intrusive over a
//!     slotmap arena: heads and next-links store generational keys, never
//!     pointers. Knows nothing about resizing.
//!   - IncrMap<T>: owns the arena plus the `live` table and, during a
//!     resize, the `drain` table being emptied. Routes every operation
//!     across both generations and performs up to `work_budget` units of
//!     migration per call. Surface is hash + predicate: the caller supplies
//!     a precomputed 64-bit hash and an equality closure per probe, and
//!     gets back stable `NodeRef` handles.
//!   - IncrHashMap<K, V, S>: typed public API. Hashes keys once via a
//!     `BuildHasher` (default `RandomState`) and stores the hash; inserts
//!     overwrite duplicates in place.
//!
//! Constraints
//! - Single-threaded. Migration progresses only inside foreground calls,
//!   so every path that helps migrate (including lookups) takes `&mut self`;
//!   `peek`/`find`/`contains_key` are the shared-borrow probes.
//! - No operation performs more than `work_budget` migration moves;
//!   skipping already-drained buckets is free.
//! - A key lives in exactly one generation at a time: inserts go only to
//!   the live table, migration moves rather than copies, and probes check
//!   live before drain.
//! - Handles are stable across resizes (the arena never relocates entries)
//!   and stale handles never alias later entries (generational keys).
//!
//! Why this split?
//! - BucketTable stays a dumb chain structure that can be tested in
//!   isolation; all resize policy (trigger, growth factor, work budget,
//!   drain teardown) is concentrated in IncrMap.
//! - The hash+predicate core never invokes `K: Hash`; only the typed layer
//!   does, exactly once per key. Migration re-buckets from stored hashes
//!   and never calls user code while chains are mid-splice.
//!
//! Notes and non-goals
//! - Not a concurrent map: no atomics, no locks; embed under one external
//!   mutual exclusion scope if a multi-threaded host needs it.
//! - No shrinking; tables only grow.
//! - Growth trigger (load factor 1.0), growth factor (x4) and work budget
//!   (128) are configuration, not contract; see `MapConfig`.

mod config;
mod error;
mod hash_map;
mod incr_map;
mod incr_map_proptest;
mod table;

// Public surface
pub use config::MapConfig;
pub use error::MapConfigError;
pub use hash_map::IncrHashMap;
pub use incr_map::{IncrMap, Iter, IterMut, NodeRef};
