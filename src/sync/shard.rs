//! The lock set of a [`RandomHashSet`][random-hash-set].
//!
//! Each shard owns one row of the bucket table behind its own read/write lock.
//! Operations on a single element lock only the element's shard. Whole-table
//! operations (rehash, clear, retention, copying) take every shard lock in
//! ascending index order, which is the only order used anywhere, so two of them
//! can never deadlock each other.
//!
//! [random-hash-set]: ../struct.RandomHashSet.html

use super::table::{shard_index, Row};
use crate::common::constants::WRITE_LOCK_TIMEOUT_MILLIS;

use crossbeam_utils::{Backoff, CachePadded};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use smallvec::SmallVec;
use std::time::Duration;

pub(crate) type ReadGuards<'a, T> = SmallVec<[RwLockReadGuard<'a, Row<T>>; 16]>;
pub(crate) type WriteGuards<'a, T> = SmallVec<[RwLockWriteGuard<'a, Row<T>>; 16]>;

pub(crate) struct ShardLocks<T> {
    // Padded so that writers on neighboring shards do not share cache lines.
    shards: Box<[CachePadded<RwLock<Row<T>>>]>,
}

impl<T> ShardLocks<T> {
    /// # Panics
    ///
    /// Panics if `num_shards` is 0.
    pub(crate) fn new(num_shards: usize, slot_count: usize) -> Self {
        assert!(num_shards > 0);
        let shards = (0..num_shards)
            .map(|_| CachePadded::new(RwLock::new(Row::with_slots(slot_count))))
            .collect();
        Self { shards }
    }

    pub(crate) fn from_rows(rows: impl IntoIterator<Item = Row<T>>) -> Self {
        let shards = rows
            .into_iter()
            .map(|row| CachePadded::new(RwLock::new(row)))
            .collect::<Box<[_]>>();
        assert!(!shards.is_empty());
        Self { shards }
    }

    #[inline]
    pub(crate) fn num_shards(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    pub(crate) fn shard_of(&self, hash: u64) -> usize {
        shard_index(hash, self.num_shards())
    }

    pub(crate) fn read(&self, shard: usize) -> RwLockReadGuard<'_, Row<T>> {
        self.shards[shard].read()
    }

    /// Acquires the write lock of `shard`.
    ///
    /// Waits a bounded time per attempt and backs off between attempts, so a
    /// long-held lock slows the caller down without aborting it.
    pub(crate) fn write(&self, shard: usize) -> RwLockWriteGuard<'_, Row<T>> {
        let lock = &self.shards[shard];
        let timeout = Duration::from_millis(WRITE_LOCK_TIMEOUT_MILLIS);
        let backoff = Backoff::new();
        loop {
            if let Some(guard) = lock.try_write_for(timeout) {
                return guard;
            }
            backoff.snooze();
        }
    }

    pub(crate) fn with_read_lock<R>(&self, hash: u64, f: impl FnOnce(&Row<T>) -> R) -> R {
        let row = self.read(self.shard_of(hash));
        f(&row)
    }

    pub(crate) fn with_write_lock<R>(&self, hash: u64, f: impl FnOnce(&mut Row<T>) -> R) -> R {
        let mut row = self.write(self.shard_of(hash));
        f(&mut row)
    }

    /// Runs `f` with every shard write-locked. Index `i` of the slice passed to
    /// `f` is the row of shard `i`. The locks are released when `f` returns or
    /// unwinds.
    pub(crate) fn with_all_write_locks<R>(
        &self,
        f: impl FnOnce(&mut [RwLockWriteGuard<'_, Row<T>>]) -> R,
    ) -> R {
        let mut guards: WriteGuards<'_, T> =
            (0..self.num_shards()).map(|i| self.write(i)).collect();
        f(&mut guards)
    }

    /// Runs `f` with every shard read-locked, in the same order as
    /// [`ShardLocks::with_all_write_locks`].
    pub(crate) fn with_all_read_locks<R>(
        &self,
        f: impl FnOnce(&[RwLockReadGuard<'_, Row<T>>]) -> R,
    ) -> R {
        let guards: ReadGuards<'_, T> = (0..self.num_shards()).map(|i| self.read(i)).collect();
        f(&guards)
    }
}
