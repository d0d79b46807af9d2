use super::set::RandomHashSet;
use crate::common::error::Error;

use std::{
    hash::{BuildHasher, Hash},
    iter::FusedIterator,
    sync::atomic::Ordering,
};

/// Iterator visiting the elements of a [`RandomHashSet`] in arbitrary order,
/// yielding _clones_ of them.
///
/// Call [`RandomHashSet::iter`](./struct.RandomHashSet.html#method.iter) to
/// obtain an `Iter`.
///
/// The iterator produces at most as many elements as the set held when it was
/// created. It holds a shard lock only while it looks for the next element, so
/// other threads may mutate the set in between. Elements inserted after the
/// iterator was created may or may not be visited. If other threads remove
/// elements faster than they are consumed, [`Iter::try_next`] reports
/// [`Error::NoSuchElement`] before the count is reached and the `Iterator`
/// implementation simply ends. If another thread grows or shrinks the table
/// during the iteration, the elements are redistributed over the new slots, so
/// the iterator may yield some elements twice and skip others.
///
/// Besides the `Iterator` methods, `Iter` can remove the element it returned
/// last with [`Iter::remove`].
///
/// # Examples
///
/// ```rust
/// use randset::sync::RandomHashSet;
///
/// let set = RandomHashSet::new();
/// set.insert_all(0..10);
///
/// let mut iter = set.iter();
/// while iter.has_next() {
///     if iter.try_next().unwrap() % 2 == 0 {
///         iter.remove().unwrap();
///     }
/// }
///
/// assert_eq!(set.len(), 5);
/// ```
pub struct Iter<'a, T, S> {
    set: &'a RandomHashSet<T, S>,
    start_size: usize,
    produced: usize,
    shard: usize,
    slot: usize,
    // Position of the last produced element in the current bucket, `None`
    // before the first element of the bucket.
    pos: Option<usize>,
    // The last produced element while it can still be removed.
    last: Option<T>,
}

impl<'a, T, S> Iter<'a, T, S> {
    pub(crate) fn new(set: &'a RandomHashSet<T, S>) -> Self {
        Self {
            set,
            start_size: set.len(),
            produced: 0,
            shard: 0,
            slot: 0,
            pos: None,
            last: None,
        }
    }

    /// Returns `true` while fewer elements were produced than the set held
    /// when this iterator was created.
    pub fn has_next(&self) -> bool {
        self.produced < self.start_size
    }
}

impl<'a, T, S> Iter<'a, T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher,
{
    /// Returns the next element.
    ///
    /// Returns [`Error::NoSuchElement`] when the iteration is over, or when the
    /// table ran out of elements before `has_next` turned `false`.
    pub fn try_next(&mut self) -> Result<T, Error> {
        if !self.has_next() {
            return Err(Error::NoSuchElement);
        }

        let set = self.set;
        while self.shard < set.shards.num_shards() {
            let row = set.shards.read(self.shard);
            while self.slot < row.slot_count() {
                let next = self.pos.map_or(0, |pos| pos + 1);
                if let Some(element) = row.lookup(self.slot).and_then(|b| b.get(next)) {
                    self.pos = Some(next);
                    self.produced += 1;
                    self.last = Some(element.clone());
                    return Ok(element.clone());
                }
                self.slot += 1;
                self.pos = None;
            }
            self.shard += 1;
            self.slot = 0;
        }

        Err(Error::NoSuchElement)
    }

    /// Removes the element returned by the last call to `next` or `try_next`
    /// from the set.
    ///
    /// Returns [`Error::IllegalState`] if no element was returned yet, or if
    /// it was already removed.
    ///
    /// Removing through the iterator never resizes the table, even when the
    /// element has moved since it was produced, so the iteration is not
    /// disturbed. A later insertion or removal on the set catches up
    /// with any pending shrink.
    pub fn remove(&mut self) -> Result<(), Error> {
        let last = self.last.take().ok_or(Error::IllegalState)?;
        let set = self.set;

        let removed_in_place = self.pos.map_or(false, |pos| {
            let mut row = set.shards.write(self.shard);
            match row.bucket_at_mut(self.slot) {
                Some(bucket) if bucket.get(pos) == Some(&last) => {
                    bucket.remove(pos);
                    set.size.fetch_sub(1, Ordering::AcqRel);
                    true
                }
                _ => false,
            }
        });

        if removed_in_place {
            // The following element of the bucket took the vacated position.
            self.pos = self.pos.and_then(|pos| pos.checked_sub(1));
        } else {
            // The table was rehashed or the bucket changed since the element
            // was produced.
            set.remove_without_resizing(&last);
        }
        Ok(())
    }
}

impl<'a, T, S> Iterator for Iter<'a, T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        self.try_next().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.start_size - self.produced))
    }
}

impl<'a, T, S> FusedIterator for Iter<'a, T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher,
{
}
