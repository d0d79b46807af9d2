/// The error type for the operations of a
/// [`RandomHashSet`][random-hash-set] and its [`Iter`][iter].
///
/// [random-hash-set]: ./sync/struct.RandomHashSet.html
/// [iter]: ./sync/struct.Iter.html
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A construction parameter is out of its accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A random element was requested from an empty set.
    ///
    /// Check [`is_empty`][is-empty] first to avoid it.
    ///
    /// [is-empty]: ./sync/struct.RandomHashSet.html#method.is_empty
    #[error("The set is empty")]
    EmptyCollection,

    /// The iterator has no more elements to produce, or the table shrank
    /// underneath it faster than it was consumed.
    #[error("No more elements in the iteration")]
    NoSuchElement,

    /// `Iter::remove` was called without a preceding unconsumed `next`.
    #[error("No element to remove; call next before remove")]
    IllegalState,

    /// A slot index did not fit the table it addressed while a shard lock was
    /// held. This means the locking discipline of the set was bypassed.
    ///
    /// Never returned as a value; the set panics with this error.
    #[error(
        "Illegal state: trying to access slot {slot} but the table has \
    {slot_count} slots"
    )]
    ConcurrentStructuralConflict { slot: usize, slot_count: usize },
}
