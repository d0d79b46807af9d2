use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// A source of uniformly distributed indices, used by
/// [`RandomHashSet::random_element`][random-element] to pick a position in the
/// table.
///
/// Every [`rand::RngCore`] that is `Send` is a `RandomSource`, so any generator
/// from the `rand` ecosystem can be injected through
/// [`RandomHashSetBuilder::random_source`][random-source].
///
/// [random-element]: ./sync/struct.RandomHashSet.html#method.random_element
/// [random-source]: ./sync/struct.RandomHashSetBuilder.html#method.random_source
pub trait RandomSource: Send {
    /// Returns a value in `0..bound`. `bound` is never zero.
    fn next_below(&mut self, bound: usize) -> usize;
}

impl<R> RandomSource for R
where
    R: RngCore + Send,
{
    #[inline]
    fn next_below(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }
}

pub(crate) fn seeded(seed: u64) -> Box<dyn RandomSource> {
    Box::new(StdRng::seed_from_u64(seed))
}

/// A generator seeded from the operating system, whose sequence cannot be
/// predicted or replayed.
pub(crate) fn from_entropy() -> Box<dyn RandomSource> {
    Box::new(StdRng::from_entropy())
}

#[cfg(test)]
mod tests {
    use super::{from_entropy, seeded, RandomSource};

    #[test]
    fn seeded_sources_replay() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        let xs = (0..32).map(|_| a.next_below(1000)).collect::<Vec<_>>();
        let ys = (0..32).map(|_| b.next_below(1000)).collect::<Vec<_>>();
        assert_eq!(xs, ys);
    }

    #[test]
    fn stays_below_bound() {
        let mut rng = from_entropy();
        for bound in 1..64 {
            assert!(rng.next_below(bound) < bound);
        }
        assert_eq!(rng.next_below(1), 0);
    }
}
