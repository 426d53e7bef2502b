//! BucketTable: one generation of chained buckets, fixed capacity.
//!
//! Chains are intrusive over an arena: each `Node` carries its precomputed
//! hash and a `next` link, and both bucket heads and links store generational
//! `slotmap` keys instead of pointers. The table owns only the chain
//! structure; node payloads live in the arena owned by the layer above.
//! No resizing logic lives here.

use crate::error::MapConfigError;
use slotmap::{DefaultKey, SlotMap};

/// Chain node: stored hash, link to the next node in the bucket, payload.
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) hash: u64,
    pub(crate) next: Option<DefaultKey>,
    pub(crate) entry: T,
}

pub(crate) type Arena<T> = SlotMap<DefaultKey, Node<T>>;

/// Position of a found node within a chain. Holding the predecessor link
/// makes `detach` O(1) without rescanning the chain.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChainSlot {
    bucket: usize,
    prev: Option<DefaultKey>,
    pub(crate) node: DefaultKey,
}

#[derive(Debug)]
pub(crate) struct BucketTable {
    heads: Box<[Option<DefaultKey>]>,
    mask: u64,
    count: usize,
}

impl BucketTable {
    /// `capacity` must be a non-zero power of two.
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, MapConfigError> {
        if capacity == 0 {
            return Err(MapConfigError::ZeroCapacity);
        }
        if !capacity.is_power_of_two() {
            return Err(MapConfigError::CapacityNotPowerOfTwo(capacity));
        }
        Ok(Self {
            heads: vec![None; capacity].into_boxed_slice(),
            mask: capacity as u64 - 1,
            count: 0,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    /// Push `key` onto the head of its bucket's chain. O(1). The node must
    /// not currently be threaded into any chain.
    pub(crate) fn insert<T>(&mut self, arena: &mut Arena<T>, key: DefaultKey) {
        let pos = self.bucket_of(arena[key].hash);
        debug_assert!(arena[key].next.is_none());
        arena[key].next = self.heads[pos];
        self.heads[pos] = Some(key);
        self.count += 1;
    }

    /// Scan the chain for `hash`, returning the slot of the first node whose
    /// stored hash matches and for which `pred` holds.
    pub(crate) fn find<T, F>(&self, arena: &Arena<T>, hash: u64, pred: &mut F) -> Option<ChainSlot>
    where
        F: FnMut(&T) -> bool,
    {
        let bucket = self.bucket_of(hash);
        let mut prev = None;
        let mut cur = self.heads[bucket];
        while let Some(key) = cur {
            let node = &arena[key];
            if node.hash == hash && pred(&node.entry) {
                return Some(ChainSlot {
                    bucket,
                    prev,
                    node: key,
                });
            }
            prev = Some(key);
            cur = node.next;
        }
        None
    }

    /// Unlink the node located by `find` and return its key. O(1).
    pub(crate) fn detach<T>(&mut self, arena: &mut Arena<T>, slot: ChainSlot) -> DefaultKey {
        let next = arena[slot.node].next.take();
        match slot.prev {
            Some(prev) => {
                debug_assert_eq!(arena[prev].next, Some(slot.node));
                arena[prev].next = next;
            }
            None => {
                debug_assert_eq!(self.heads[slot.bucket], Some(slot.node));
                self.heads[slot.bucket] = next;
            }
        }
        self.count -= 1;
        slot.node
    }

    /// Pop the head of `bucket`'s chain, or `None` if the bucket is empty.
    /// Migration uses this to drain buckets front to back.
    pub(crate) fn take_head<T>(&mut self, arena: &mut Arena<T>, bucket: usize) -> Option<DefaultKey> {
        let key = self.heads[bucket]?;
        self.heads[bucket] = arena[key].next.take();
        self.count -= 1;
        Some(key)
    }
}
