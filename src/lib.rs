#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! `randset` provides a concurrent hash set that, besides the usual set
//! operations, returns a random element in expected constant time.
//!
//! It is meant for workloads that repeatedly sample an arbitrary member of a
//! large, changing set: simulations, randomized scheduling, or load shedding.
//! Picking a random element of a `std::collections::HashSet` requires walking
//! it, which takes linear time.
//!
//! # Example
//!
//! ```rust
//! use randset::sync::RandomHashSet;
//!
//! use std::{sync::Arc, thread};
//!
//! let set = Arc::new(RandomHashSet::new());
//!
//! let handles = (0..4u32)
//!     .map(|t| {
//!         let set = Arc::clone(&set);
//!         thread::spawn(move || {
//!             for i in 0..250 {
//!                 set.insert(t * 1000 + i);
//!             }
//!         })
//!     })
//!     .collect::<Vec<_>>();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(set.len(), 1000);
//! let e = set.random_element().unwrap();
//! assert!(set.contains(&e));
//! ```
//!
//! # Internals
//!
//! The elements are stored in a table of `shards x slots` collision buckets.
//! The shard of an element selects the read/write lock that guards it, the slot
//! selects its bucket within that shard. The number of slots is always a prime
//! and follows the number of elements, so that buckets hold about one element.
//! Growing or shrinking the table locks every shard and rehashes all elements.
//!
//! # Logging
//!
//! With the `logging` feature enabled, sets emit records through the [`log`]
//! crate when they rehash their table, and an error record right before they
//! panic on a slot access that does not match the table dimensions.
//!
//! [`log`]: https://docs.rs/log

pub mod sync;

pub(crate) mod common;
mod policy;

pub use common::{error::Error, random::RandomSource};
pub use policy::Policy;
