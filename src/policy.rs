#[derive(Clone, Debug)]
/// The policy of a set.
///
/// The slot count is a snapshot; the set may rehash right after it was taken.
pub struct Policy {
    num_shards: usize,
    slot_count: usize,
    initial_slot_count: usize,
    seed: Option<u64>,
}

impl Policy {
    pub(crate) fn new(
        num_shards: usize,
        slot_count: usize,
        initial_slot_count: usize,
        seed: Option<u64>,
    ) -> Self {
        Self {
            num_shards,
            slot_count,
            initial_slot_count,
            seed,
        }
    }

    /// Returns the number of shards (independent locks) of the set.
    pub fn num_shards(&self) -> usize {
        self.num_shards
    }

    /// Returns the number of slots in each shard.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Returns the number of slots in each shard right after construction or
    /// [`clear`][clear]. The table never shrinks below it.
    ///
    /// [clear]: ./sync/struct.RandomHashSet.html#method.clear
    pub fn initial_slot_count(&self) -> usize {
        self.initial_slot_count
    }

    /// Returns the seed of the random generator, or `None` if the generator was
    /// seeded from the operating system or injected.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
