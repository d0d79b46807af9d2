use super::{
    constants::{LOAD_FACTOR, SHRINK_DIVISOR, SHRINK_OFFSET},
    error::Error,
};

use std::sync::atomic::{AtomicUsize, Ordering};

/// Slot counts a table can take. Each is roughly twice the previous one and as
/// far as possible from the neighboring powers of two.
pub(crate) const PRIMES: [usize; 27] = [
    23, 53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613, 393241,
    786433, 1572869, 3145739, 6291469, 12582917, 25165843, 50331653, 100663319, 201326611,
    402653189, 805306457, 1610612741,
];

/// Tracks the position of a table's slot count in [`PRIMES`].
///
/// The position only moves while every shard lock of the owning set is held
/// for writing, so a reader holding any one shard lock sees a stable value.
pub(crate) struct CapacityPolicy {
    index: AtomicUsize,
    initial_index: usize,
}

impl Clone for CapacityPolicy {
    fn clone(&self) -> Self {
        Self {
            index: AtomicUsize::new(self.index()),
            initial_index: self.initial_index,
        }
    }
}

impl Default for CapacityPolicy {
    /// Starts at the smallest prime.
    fn default() -> Self {
        Self {
            index: AtomicUsize::new(0),
            initial_index: 0,
        }
    }
}

impl CapacityPolicy {
    /// Picks the smallest prime that is at least a third of `expected_count`.
    pub(crate) fn for_expected_count(expected_count: usize) -> Result<Self, Error> {
        let wanted = expected_count / 3;
        let index = PRIMES
            .iter()
            .position(|&p| p >= wanted)
            .ok_or(Error::InvalidArgument(
                "initial capacity exceeds the largest supported table size",
            ))?;
        Ok(Self {
            index: AtomicUsize::new(index),
            initial_index: index,
        })
    }

    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        PRIMES[self.index()]
    }

    pub(crate) fn initial_slot_count(&self) -> usize {
        PRIMES[self.initial_index]
    }

    /// Moves to the next larger prime and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the slot count is already the largest prime.
    pub(crate) fn advance(&self) -> usize {
        let next = self.index() + 1;
        assert!(
            next < PRIMES.len(),
            "capacity exhausted: cannot grow beyond {} slots",
            PRIMES[PRIMES.len() - 1]
        );
        self.index.store(next, Ordering::Release);
        PRIMES[next]
    }

    /// Moves to the next smaller prime and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the slot count is already the smallest prime.
    pub(crate) fn retreat(&self) -> usize {
        let current = self.index();
        assert!(
            current > 0,
            "capacity underflow: cannot shrink below {} slots",
            PRIMES[0]
        );
        self.index.store(current - 1, Ordering::Release);
        PRIMES[current - 1]
    }

    pub(crate) fn reset(&self) {
        self.index.store(self.initial_index, Ordering::Release);
    }

    pub(crate) fn needs_grow(&self, size: usize) -> bool {
        size as f64 > grow_threshold(self.slot_count())
    }

    /// Never true at or below the initial slot count.
    pub(crate) fn needs_shrink(&self, size: usize) -> bool {
        self.index() > self.initial_index && (size as f64) < shrink_threshold(self.slot_count())
    }

    #[inline]
    fn index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }
}

fn grow_threshold(slot_count: usize) -> f64 {
    slot_count as f64 * LOAD_FACTOR as f64
}

fn shrink_threshold(slot_count: usize) -> f64 {
    slot_count as f64 * (LOAD_FACTOR / SHRINK_DIVISOR) as f64 - SHRINK_OFFSET as f64
}
