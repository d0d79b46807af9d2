use super::{set::DefaultHashBuilder, RandomHashSet};
use crate::common::{
    capacity::CapacityPolicy,
    constants::{DEFAULT_INITIAL_CAPACITY, DEFAULT_NUM_SHARDS},
    error::Error,
    random::{self, RandomSource},
};

use std::{
    fmt,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

/// Builds a [`RandomHashSet`][set-struct] with various configuration knobs.
///
/// [set-struct]: ./struct.RandomHashSet.html
///
/// # Examples
///
/// ```rust
/// use randset::sync::RandomHashSet;
///
/// let set = RandomHashSet::builder()
///     // Expect about 10,000 elements.
///     .initial_capacity(10_000)
///     // Split the locks into 16 shards.
///     .shards(16)
///     // Make the sequence of random elements reproducible.
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// set.insert(1);
/// assert_eq!(set.random_element(), Ok(1));
/// ```
///
pub struct RandomHashSetBuilder<T> {
    initial_capacity: usize,
    num_shards: usize,
    seed: Option<u64>,
    random_source: Option<Box<dyn RandomSource>>,
    element_type: PhantomData<T>,
}

impl<T> Default for RandomHashSetBuilder<T> {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            num_shards: DEFAULT_NUM_SHARDS,
            seed: None,
            random_source: None,
            element_type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RandomHashSetBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomHashSetBuilder")
            .field("initial_capacity", &self.initial_capacity)
            .field("num_shards", &self.num_shards)
            .field("seed", &self.seed)
            .field("random_source", &self.random_source.as_ref().map(|_| ".."))
            .finish()
    }
}

impl<T> RandomHashSetBuilder<T>
where
    T: Hash + Eq,
{
    /// Sets the number of elements the set is expected to hold. The table is
    /// sized so that it does not need to grow before reaching it.
    pub fn initial_capacity(self, number_of_elements: usize) -> Self {
        Self {
            initial_capacity: number_of_elements,
            ..self
        }
    }

    /// Sets the number of shards, i.e. independent locks, of the set. Use about
    /// as many as the number of threads expected to access the set at once.
    pub fn shards(self, num_shards: usize) -> Self {
        Self { num_shards, ..self }
    }

    /// Seeds the random generator, making the sequence of random elements
    /// reproducible for an identical sequence of calls.
    ///
    /// Without a seed or a [`random_source`](#method.random_source), the
    /// generator is seeded from the operating system.
    pub fn seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            random_source: None,
            ..self
        }
    }

    /// Uses `source` to pick random elements. Replaces any [`seed`](#method.seed).
    pub fn random_source(self, source: impl RandomSource + 'static) -> Self {
        Self {
            seed: None,
            random_source: Some(Box::new(source)),
            ..self
        }
    }

    /// Builds a `RandomHashSet<T>`.
    ///
    /// Returns [`Error::InvalidArgument`] if the number of shards is zero or the
    /// initial capacity is beyond the largest supported table.
    pub fn build(self) -> Result<RandomHashSet<T, DefaultHashBuilder>, Error> {
        self.build_with_hasher(DefaultHashBuilder::default())
    }

    /// Builds a `RandomHashSet<T, S>` that uses `hasher` to hash its elements.
    ///
    /// Returns [`Error::InvalidArgument`] if the number of shards is zero or the
    /// initial capacity is beyond the largest supported table.
    pub fn build_with_hasher<S>(self, hasher: S) -> Result<RandomHashSet<T, S>, Error>
    where
        S: BuildHasher,
    {
        if self.num_shards == 0 {
            return Err(Error::InvalidArgument("number of shards must be at least one"));
        }
        let capacity = CapacityPolicy::for_expected_count(self.initial_capacity)?;
        let random = match (self.random_source, self.seed) {
            (Some(source), _) => source,
            (None, Some(seed)) => random::seeded(seed),
            (None, None) => random::from_entropy(),
        };
        Ok(RandomHashSet::with_everything(
            capacity,
            self.num_shards,
            random,
            self.seed,
            hasher,
        ))
    }
}
