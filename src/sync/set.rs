use super::{builder::RandomHashSetBuilder, iter::Iter, shard::ShardLocks, table::Row};
use crate::{
    common::{
        capacity::CapacityPolicy,
        constants::DEFAULT_NUM_SHARDS,
        error::Error,
        random::{self, RandomSource},
    },
    policy::Policy,
};

use parking_lot::Mutex;
use std::{
    borrow::Borrow,
    collections::{hash_map::DefaultHasher, HashSet},
    fmt,
    hash::{BuildHasher, BuildHasherDefault, Hash, Hasher},
    iter::FromIterator,
    ptr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// The default hashing algorithm of a [`RandomHashSet`].
///
/// Unlike `std::collections::hash_map::RandomState`, it uses the same keys in
/// every instance, so two sets built with the same seed place their elements
/// identically and replay the same sequence of random elements. It offers no
/// protection against HashDoS attacks; supply another hasher through
/// [`RandomHashSetBuilder::build_with_hasher`] if elements are untrusted.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// A thread-safe hash set that can return a random element in expected
/// constant time.
///
/// Elements live in a table of `num_shards` rows by a prime number of slots.
/// Each row is guarded by its own read/write lock, so operations on elements in
/// different shards run in parallel. The number of slots grows and shrinks with
/// the number of elements, keeping the collision buckets short.
///
/// All methods take `&self`. To share a set between threads, wrap it in an
/// [`Arc`].
///
/// # Examples
///
/// ```rust
/// use randset::sync::RandomHashSet;
///
/// let set = RandomHashSet::with_seed(42);
/// assert!(set.insert("alice"));
/// assert!(set.insert("bob"));
/// assert!(!set.insert("alice"));
///
/// let who = set.random_element().unwrap();
/// assert!(who == "alice" || who == "bob");
///
/// assert!(set.remove("alice"));
/// assert_eq!(set.random_element(), Ok("bob"));
/// ```
///
/// # Random element distribution
///
/// [`random_element`](#method.random_element) picks a random cell of the table
/// and scans forward to the first non-empty bucket, then picks a random element
/// of that bucket. Elements that follow a run of empty buckets, and elements
/// sharing a bucket, are therefore picked with slightly different
/// probabilities. The load factor keeps buckets near length one, where the
/// distribution is close to uniform.
pub struct RandomHashSet<T, S = DefaultHashBuilder> {
    pub(crate) shards: ShardLocks<T>,
    capacity: CapacityPolicy,
    pub(crate) size: AtomicUsize,
    random: Arc<Mutex<Box<dyn RandomSource>>>,
    seed: Option<u64>,
    build_hasher: S,
}

impl<T> RandomHashSet<T, DefaultHashBuilder>
where
    T: Hash + Eq,
{
    /// Constructs an empty set with the default number of shards and a random
    /// generator seeded from the operating system.
    pub fn new() -> Self {
        Self::with_everything(
            CapacityPolicy::default(),
            DEFAULT_NUM_SHARDS,
            random::from_entropy(),
            None,
            DefaultHashBuilder::default(),
        )
    }

    /// Constructs an empty set whose random elements are drawn from a generator
    /// seeded with `seed`.
    ///
    /// Two sets constructed with the same seed and driven through the same
    /// sequence of calls return the same random elements.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_everything(
            CapacityPolicy::default(),
            DEFAULT_NUM_SHARDS,
            random::seeded(seed),
            Some(seed),
            DefaultHashBuilder::default(),
        )
    }

    /// Constructs an empty set sized for about `capacity` elements.
    ///
    /// Returns [`Error::InvalidArgument`] if `capacity` is beyond the largest
    /// supported table.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::builder().initial_capacity(capacity).build()
    }

    /// Returns a [`RandomHashSetBuilder`], which builds a `RandomHashSet` with
    /// various configuration knobs.
    pub fn builder() -> RandomHashSetBuilder<T> {
        RandomHashSetBuilder::default()
    }
}

impl<T, S> RandomHashSet<T, S> {
    pub(crate) fn with_everything(
        capacity: CapacityPolicy,
        num_shards: usize,
        random: Box<dyn RandomSource>,
        seed: Option<u64>,
        build_hasher: S,
    ) -> Self {
        Self {
            shards: ShardLocks::new(num_shards, capacity.slot_count()),
            capacity,
            size: AtomicUsize::new(0),
            random: Arc::new(Mutex::new(random)),
            seed,
            build_hasher,
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// This never blocks. While other threads are mutating the set, the value
    /// may already be stale when it is returned.
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a read-only snapshot of the configuration and table dimensions
    /// of this set.
    pub fn policy(&self) -> Policy {
        Policy::new(
            self.shards.num_shards(),
            self.capacity.slot_count(),
            self.capacity.initial_slot_count(),
            self.seed,
        )
    }

    /// Returns a reference to the set's [`BuildHasher`].
    pub fn hasher(&self) -> &S {
        &self.build_hasher
    }

    /// Removes every element and restores the initial number of slots.
    pub fn clear(&self) {
        self.shards.with_all_write_locks(|rows| {
            self.capacity.reset();
            let slot_count = self.capacity.slot_count();
            for row in rows.iter_mut() {
                **row = Row::with_slots(slot_count);
            }
            self.size.store(0, Ordering::Release);
        });
    }
}

impl<T, S> RandomHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Adds an element to the set.
    ///
    /// Returns `true` if the element was not present. An element equal to one
    /// already in the set is dropped and `false` is returned.
    pub fn insert(&self, element: T) -> bool {
        let hash = self.hash(&element);
        let inserted = self.shards.with_write_lock(hash, |row| {
            let bucket = row.bucket_for_mut(hash, self.capacity.slot_count());
            if bucket.contains(&element) {
                return false;
            }
            bucket.push(element);
            self.size.fetch_add(1, Ordering::AcqRel);
            true
        });
        if inserted {
            self.resize_if_needed();
        }
        inserted
    }

    /// Removes an element from the set. Returns `true` if it was present.
    ///
    /// The element may be any borrowed form of the set's element type, but
    /// `Hash` and `Eq` on the borrowed form _must_ match those for the element
    /// type.
    pub fn remove<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.remove_without_resizing(element);
        if removed {
            self.resize_if_needed();
        }
        removed
    }

    /// Removes an element from its bucket, leaving the table dimensions alone
    /// even when the set dropped below the shrink threshold.
    pub(crate) fn remove_without_resizing<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(element);
        self.shards.with_write_lock(hash, |row| {
            let bucket = row.bucket_for_mut(hash, self.capacity.slot_count());
            match bucket.iter().position(|e| e.borrow() == element) {
                Some(pos) => {
                    bucket.remove(pos);
                    self.size.fetch_sub(1, Ordering::AcqRel);
                    true
                }
                None => false,
            }
        })
    }

    /// Returns `true` if the set contains the element.
    ///
    /// The element may be any borrowed form of the set's element type, but
    /// `Hash` and `Eq` on the borrowed form _must_ match those for the element
    /// type.
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(element);
        self.shards.with_read_lock(hash, |row| {
            row.bucket_for(hash, self.capacity.slot_count())
                .iter()
                .any(|e| e.borrow() == element)
        })
    }

    /// Inserts every element of `elements`, one at a time. Returns `true` if
    /// any of them was not present.
    pub fn insert_all<I>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let mut changed = false;
        for element in elements {
            changed |= self.insert(element);
        }
        changed
    }

    /// Inserts every element of `other`. Returns `true` if any of them was not
    /// present.
    ///
    /// Passing the set itself is a no-op that returns `false`.
    pub fn insert_all_from<S2>(&self, other: &RandomHashSet<T, S2>) -> bool
    where
        T: Clone,
        S2: BuildHasher,
    {
        let this = self as *const Self as *const ();
        let that = other as *const RandomHashSet<T, S2> as *const ();
        if ptr::eq(this, that) {
            return false;
        }
        self.insert_all(other.iter())
    }

    /// Removes every element of `elements`, one at a time. Returns `true` if
    /// any of them was present.
    pub fn remove_all<'a, I, Q>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = &'a Q>,
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'a,
    {
        let mut changed = false;
        for element in elements {
            changed |= self.remove(element);
        }
        changed
    }

    /// Returns `true` if the set contains every element of `elements`.
    pub fn contains_all<'a, I, Q>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = &'a Q>,
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'a,
    {
        elements.into_iter().all(|e| self.contains(e))
    }

    /// Keeps only the elements that are also in `elements`. Returns `true` if
    /// any element was removed.
    ///
    /// The whole table is locked while the elements are filtered.
    pub fn retain_all<'a, I>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let keep = elements.into_iter().collect::<HashSet<&T>>();
        self.retain(|e| keep.contains(e))
    }

    /// Keeps only the elements for which `predicate` returns `true`. Returns
    /// `true` if any element was removed.
    ///
    /// The whole table is locked while the elements are filtered, so
    /// `predicate` must not call back into this set.
    pub fn retain<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let removed = self.shards.with_all_write_locks(|rows| {
            let mut removed = 0;
            for row in rows.iter_mut() {
                for bucket in row.buckets_mut() {
                    let before = bucket.len();
                    bucket.retain(|e| predicate(e));
                    removed += before - bucket.len();
                }
            }
            self.size.fetch_sub(removed, Ordering::AcqRel);
            removed
        });
        if removed > 0 {
            self.resize_if_needed();
        }
        removed > 0
    }

    /// Returns a _clone_ of a randomly chosen element.
    ///
    /// Returns [`Error::EmptyCollection`] if the set is empty. See the
    /// [type level documentation](#random-element-distribution) for the
    /// distribution of the returned elements.
    ///
    /// The set's random generator is locked only for each draw, so concurrent
    /// calls scan the table in parallel.
    pub fn random_element(&self) -> Result<T, Error>
    where
        T: Clone,
    {
        if self.is_empty() {
            return Err(Error::EmptyCollection);
        }

        let num_shards = self.shards.num_shards();
        let mut shard = self.next_below(num_shards);

        // One extra round so that the slots before the starting one in the
        // first row are scanned too.
        for round in 0..=num_shards {
            let row = self.shards.read(shard);
            let first = if round == 0 {
                self.next_below(row.slot_count())
            } else {
                0
            };
            for slot in first..row.slot_count() {
                if let Some(bucket) = row.lookup(slot) {
                    return Ok(bucket[self.next_below(bucket.len())].clone());
                }
            }
            shard = (shard + 1) % num_shards;
        }

        // Other threads emptied the set while it was being scanned.
        Err(Error::EmptyCollection)
    }

    /// Creates an iterator over the elements present in the set at the time of
    /// the call. See [`Iter`] for how it behaves under concurrent mutation.
    pub fn iter(&self) -> Iter<'_, T, S>
    where
        T: Clone,
    {
        Iter::new(self)
    }

    #[inline]
    fn hash<Q>(&self, element: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        let mut hasher = self.build_hasher.build_hasher();
        element.hash(&mut hasher);
        hasher.finish()
    }

    #[inline]
    fn next_below(&self, bound: usize) -> usize {
        self.random.lock().next_below(bound)
    }

    fn needs_resizing(&self) -> bool {
        let size = self.len();
        self.capacity.needs_grow(size) || self.capacity.needs_shrink(size)
    }

    /// Rehashes the table if its load went beyond a grow or shrink threshold.
    fn resize_if_needed(&self) {
        if !self.needs_resizing() {
            return;
        }

        self.shards.with_all_write_locks(|rows| {
            // Another thread may have resized while we waited for the locks.
            let size = self.len();
            let old_slot_count = self.capacity.slot_count();
            while self.capacity.needs_grow(size) {
                self.capacity.advance();
            }
            while self.capacity.needs_shrink(size) {
                self.capacity.retreat();
            }
            let slot_count = self.capacity.slot_count();
            if slot_count == old_slot_count {
                return;
            }

            #[cfg(feature = "logging")]
            log::debug!(
                "Rehashing {size} elements from {old_slot_count} to {slot_count} slots per shard"
            );

            for (shard, row) in rows.iter_mut().enumerate() {
                row.rehash(slot_count, |e| {
                    let hash = self.hash(e);
                    debug_assert_eq!(self.shards.shard_of(hash), shard);
                    hash
                });
            }
        });
    }
}

impl<T, S> Clone for RandomHashSet<T, S>
where
    T: Clone,
    S: Clone,
{
    /// Makes a copy of this set, taking every shard lock while copying.
    ///
    /// The copy shares the random generator of this set.
    fn clone(&self) -> Self {
        self.shards.with_all_read_locks(|rows| Self {
            shards: ShardLocks::from_rows(rows.iter().map(|row| Row::clone(row))),
            capacity: self.capacity.clone(),
            size: AtomicUsize::new(self.len()),
            random: Arc::clone(&self.random),
            seed: self.seed,
            build_hasher: self.build_hasher.clone(),
        })
    }
}

impl<T> Default for RandomHashSet<T, DefaultHashBuilder>
where
    T: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> fmt::Debug for RandomHashSet<T, S>
where
    T: fmt::Debug + Clone + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for RandomHashSet<T, DefaultHashBuilder>
where
    T: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let capacity = CapacityPolicy::for_expected_count(iter.size_hint().0).unwrap_or_default();
        let set = Self::with_everything(
            capacity,
            DEFAULT_NUM_SHARDS,
            random::from_entropy(),
            None,
            DefaultHashBuilder::default(),
        );
        set.insert_all(iter);
        set
    }
}

impl<T, S> Extend<T> for RandomHashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_all(iter);
    }
}

impl<'a, T, S> IntoIterator for &'a RandomHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher,
{
    type Item = T;

    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
