//! IncrMap: the incremental two-generation map over hash + predicate.
//!
//! Owns the node arena and up to two `BucketTable` generations: `live` (the
//! table all inserts target) and `drain` (the previous, smaller table being
//! emptied during a resize; `None` in steady state). Every operation first
//! performs a bounded slice of migration work, then dispatches, so resize
//! cost is spread across normal traffic and no call rehashes the whole table.

use crate::config::MapConfig;
use crate::error::MapConfigError;
use crate::table::{Arena, BucketTable, Node};
use slotmap::DefaultKey;

/// Stable handle to an entry. Handles survive resizes and migrations (the
/// arena never moves entries); a handle whose entry was removed never
/// resolves again and never aliases a later entry (generational keys).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeRef(DefaultKey);

impl NodeRef {
    pub(crate) fn new(key: DefaultKey) -> Self {
        NodeRef(key)
    }

    pub(crate) fn raw(&self) -> DefaultKey {
        self.0
    }
}

pub struct IncrMap<T> {
    nodes: Arena<T>,
    live: BucketTable,
    drain: Option<BucketTable>,
    /// Next bucket in `drain` to scan; every bucket below it is empty.
    cursor: usize,
    config: MapConfig,
}

impl<T> IncrMap<T> {
    pub fn new() -> Self {
        Self::with_config(MapConfig::default()).expect("default config is valid")
    }

    pub fn with_config(config: MapConfig) -> Result<Self, MapConfigError> {
        config.validate()?;
        Ok(Self {
            nodes: Arena::with_key(),
            live: BucketTable::with_capacity(config.initial_capacity)?,
            drain: None,
            cursor: 0,
            config,
        })
    }

    /// Total live entries across both generations.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bucket count of the current (insert-target) generation.
    pub fn capacity(&self) -> usize {
        self.live.capacity()
    }

    /// True while a resize is draining the previous generation.
    pub fn is_resizing(&self) -> bool {
        self.drain.is_some()
    }

    /// Entries still waiting in the old generation; 0 in steady state.
    /// Each operation reduces this by at most the configured work budget.
    pub fn pending_migration(&self) -> usize {
        self.drain.as_ref().map_or(0, BucketTable::count)
    }

    /// Insert an entry under a caller-computed hash. Always lands in the
    /// current generation; may trigger a resize once the load factor reaches
    /// 1.0 (count >= capacity). No duplicate check is performed here: equal
    /// keys may coexist, and which copy a probe resolves to is unspecified
    /// (the most recently inserted one, unless a migration has re-threaded
    /// an older copy above it). The typed layer never creates duplicates
    /// and builds its overwrite policy on top.
    pub fn insert(&mut self, hash: u64, entry: T) -> NodeRef {
        self.help_migrate();
        let key = self.nodes.insert(Node {
            hash,
            next: None,
            entry,
        });
        self.live.insert(&mut self.nodes, key);
        self.maybe_grow();
        NodeRef::new(key)
    }

    /// Find an entry, helping migration along the way (hence `&mut self`).
    /// Probes the current generation first; entries still in the old one
    /// have not been touched since the resize began, so the two tables
    /// partition the keyspace and at most two probes are ever needed.
    pub fn lookup<F>(&mut self, hash: u64, pred: F) -> Option<NodeRef>
    where
        F: FnMut(&T) -> bool,
    {
        self.help_migrate();
        self.find(hash, pred)
    }

    /// Read-only probe: like `lookup` but performs no migration work, so it
    /// runs under a shared borrow.
    pub fn find<F>(&self, hash: u64, mut pred: F) -> Option<NodeRef>
    where
        F: FnMut(&T) -> bool,
    {
        if let Some(slot) = self.live.find(&self.nodes, hash, &mut pred) {
            return Some(NodeRef::new(slot.node));
        }
        let drain = self.drain.as_ref()?;
        drain
            .find(&self.nodes, hash, &mut pred)
            .map(|slot| NodeRef::new(slot.node))
    }

    /// Detach and return the first matching entry, or `None`. Absence is a
    /// normal result, not an error.
    pub fn remove<F>(&mut self, hash: u64, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.help_migrate();
        if let Some(slot) = self.live.find(&self.nodes, hash, &mut pred) {
            let key = self.live.detach(&mut self.nodes, slot);
            return self.pop_node(key);
        }
        let drain = self.drain.as_mut()?;
        let slot = drain.find(&self.nodes, hash, &mut pred)?;
        let key = drain.detach(&mut self.nodes, slot);
        // An emptied drain table is freed by the next operation's migration
        // step, not here.
        self.pop_node(key)
    }

    pub fn get(&self, node: NodeRef) -> Option<&T> {
        self.nodes.get(node.raw()).map(|n| &n.entry)
    }

    pub fn get_mut(&mut self, node: NodeRef) -> Option<&mut T> {
        self.nodes.get_mut(node.raw()).map(|n| &mut n.entry)
    }

    /// Iterate all live entries, regardless of generation. Order is
    /// unspecified.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.nodes.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            it: self.nodes.iter_mut(),
        }
    }

    /// Drop every entry and abandon any in-progress resize, returning to
    /// steady state at the configured initial capacity.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.live = BucketTable::with_capacity(self.config.initial_capacity)
            .expect("config was validated at construction");
        self.drain = None;
        self.cursor = 0;
    }

    /// Perform up to `work_budget` units of migration: detach the head of
    /// the drain bucket under the cursor and re-thread it into the current
    /// table. Skipping empty buckets is free and never counts against the
    /// budget. Frees the drain table the moment it empties.
    fn help_migrate(&mut self) {
        let Some(drain) = self.drain.as_mut() else {
            return;
        };
        let mut nwork = 0;
        while nwork < self.config.work_budget && drain.count() > 0 {
            debug_assert!(self.cursor < drain.capacity());
            match drain.take_head(&mut self.nodes, self.cursor) {
                None => self.cursor += 1,
                Some(key) => {
                    self.live.insert(&mut self.nodes, key);
                    nwork += 1;
                }
            }
        }
        if drain.count() == 0 {
            self.drain = None;
            self.cursor = 0;
        }
        debug_assert_eq!(
            self.live.count() + self.pending_migration(),
            self.nodes.len()
        );
    }

    /// Stable -> Resizing transition. Only fires in steady state; a resize
    /// already in progress must finish before the next one can start.
    fn maybe_grow(&mut self) {
        if self.drain.is_some() {
            return;
        }
        if self.live.count() < self.live.capacity() {
            return;
        }
        let cap = self
            .live
            .capacity()
            .checked_mul(self.config.growth_factor)
            .expect("bucket capacity overflow");
        let grown = BucketTable::with_capacity(cap)
            .expect("power-of-two capacity times power-of-two factor");
        let old = std::mem::replace(&mut self.live, grown);
        self.drain = Some(old);
        self.cursor = 0;
    }

    #[cfg(test)]
    pub(crate) fn counts(&self) -> (usize, usize) {
        (self.live.count(), self.pending_migration())
    }

    fn pop_node(&mut self, key: DefaultKey) -> Option<T> {
        let node = self
            .nodes
            .remove(key)
            .expect("detached node is live in the arena");
        Some(node.entry)
    }
}

impl<T> Default for IncrMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over shared entries in `IncrMap`.
pub struct Iter<'a, T> {
    it: slotmap::basic::Iter<'a, DefaultKey, Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeRef, &'a T);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, n)| (NodeRef::new(k), &n.entry))
    }
}

/// Iterator over mutable entries in `IncrMap`.
pub struct IterMut<'a, T> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (NodeRef, &'a mut T);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, n)| (NodeRef::new(k), &mut n.entry))
    }
}
