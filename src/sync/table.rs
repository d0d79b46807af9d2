//! Addressing of elements within the bucket table.
//!
//! The table is a `num_shards x slot_count` matrix of buckets. An element's
//! hash selects its row (shard) and its column (slot) independently:
//!
//! ```text
//! shard = hash % num_shards
//! slot  = hash % slot_count
//! ```
//!
//! Because the shard of an element never depends on the slot count, a rehash
//! only moves elements between buckets of the same row.

use crate::common::error::Error;

/// The collision list of one `(shard, slot)` cell. An empty `Vec` does not
/// allocate, so buckets are only materialized on first insertion.
pub(crate) type Bucket<T> = Vec<T>;

/// One shard row of the table.
pub(crate) struct Row<T> {
    buckets: Box<[Bucket<T>]>,
}

impl<T: Clone> Clone for Row<T> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
        }
    }
}

impl<T> Row<T> {
    pub(crate) fn with_slots(slot_count: usize) -> Self {
        Self {
            buckets: (0..slot_count).map(|_| Bucket::new()).collect(),
        }
    }

    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the bucket at `slot`, or `None` when nothing was ever stored
    /// there or it has been emptied.
    #[inline]
    pub(crate) fn lookup(&self, slot: usize) -> Option<&[T]> {
        self.buckets
            .get(slot)
            .filter(|bucket| !bucket.is_empty())
            .map(Vec::as_slice)
    }

    /// Returns the bucket an element with `hash` belongs to, given that the
    /// table currently has `slot_count` slots.
    ///
    /// # Panics
    ///
    /// Panics with [`Error::ConcurrentStructuralConflict`] when this row was
    /// not sized for `slot_count`.
    pub(crate) fn bucket_for(&self, hash: u64, slot_count: usize) -> &Bucket<T> {
        let slot = self.checked_slot(hash, slot_count);
        &self.buckets[slot]
    }

    /// Mutable counterpart of [`Row::bucket_for`].
    pub(crate) fn bucket_for_mut(&mut self, hash: u64, slot_count: usize) -> &mut Bucket<T> {
        let slot = self.checked_slot(hash, slot_count);
        &mut self.buckets[slot]
    }

    #[inline]
    pub(crate) fn bucket_at_mut(&mut self, slot: usize) -> Option<&mut Bucket<T>> {
        self.buckets.get_mut(slot)
    }

    pub(crate) fn buckets_mut(&mut self) -> impl Iterator<Item = &mut Bucket<T>> {
        self.buckets.iter_mut()
    }

    /// Moves every element of this row into a fresh set of `slot_count`
    /// buckets. `hash` must be the hasher the elements were placed with.
    pub(crate) fn rehash(&mut self, slot_count: usize, hash: impl Fn(&T) -> u64) {
        let old = std::mem::replace(self, Self::with_slots(slot_count));
        for element in old.buckets.into_vec().into_iter().flatten() {
            let h = hash(&element);
            self.bucket_for_mut(h, slot_count).push(element);
        }
    }

    fn checked_slot(&self, hash: u64, slot_count: usize) -> usize {
        let slot = slot_index(hash, slot_count);
        if slot_count != self.slot_count() || slot >= self.slot_count() {
            structural_conflict(slot, self.slot_count());
        }
        slot
    }
}

#[inline]
pub(crate) fn slot_index(hash: u64, slot_count: usize) -> usize {
    (hash % slot_count as u64) as usize
}

#[inline]
pub(crate) fn shard_index(hash: u64, num_shards: usize) -> usize {
    (hash % num_shards as u64) as usize
}

#[cold]
fn structural_conflict(slot: usize, slot_count: usize) -> ! {
    let error = Error::ConcurrentStructuralConflict { slot, slot_count };
    #[cfg(feature = "logging")]
    log::error!("{error}");
    panic!("{error}");
}
