//! Provides a thread-safe, concurrent set with random element retrieval.

mod builder;
mod iter;
mod set;
mod shard;
mod table;

pub use {
    builder::RandomHashSetBuilder,
    iter::Iter,
    set::{DefaultHashBuilder, RandomHashSet},
};
