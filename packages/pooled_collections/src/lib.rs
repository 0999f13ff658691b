//! Collections whose backing storage is rented from a buffer pool instead of being freshly
//! allocated, to reduce allocation churn in code that repeatedly builds and discards
//! short-lived collections.
//!
//! This crate provides two containers:
//!
//! * [`PooledArray`] - a fixed-length array with bounds-checked element access and zero-copy
//!   views of its elements.
//! * [`PooledVec`] - a growable vector that swaps its buffer for a larger pooled one whenever it
//!   runs out of room, returning the old buffer to the pool.
//!
//! Both rent their storage from a [`BufferPool`], through a [`BufferHandle`] that owns exactly
//! one buffer at a time and returns it to the pool exactly once - when the container is
//! released or dropped. Any access after release fails with [`Error::UseAfterRelease`].
//!
//! # Pools
//!
//! * [`SharedPool`] - the default. A process-wide pool per element type, usable from any thread.
//! * [`BucketedPool`] - a dedicated pool with power-of-two buckets, shared between containers
//!   by reference, [`Rc`][std::rc::Rc] or [`Arc`][std::sync::Arc].
//! * [`HeapPool`] - no pooling at all. Every rent allocates and every return frees.
//!
//! Implement [`BufferPool`] to supply your own.
//!
//! # Example
//!
//! ```rust
//! use pooled_collections::{BucketedPool, PooledVec};
//!
//! let pool = BucketedPool::<u32>::new();
//!
//! let mut evens = PooledVec::<u32, _>::new_in(&pool);
//! evens.append_range((0..100).filter(|n| n % 2 == 0)).unwrap();
//!
//! assert_eq!(evens.len(), 50);
//! assert!(evens.contains(&42).unwrap());
//!
//! // Freeze the contents; the array keeps using the same buffer.
//! let mut evens = evens.into_array();
//! assert_eq!(evens.get(10).unwrap(), &20);
//!
//! evens.release();
//! assert!(evens.get(10).is_err());
//!
//! // Every buffer rented from the pool has been returned to it.
//! assert_eq!(pool.rent_count(), pool.return_count());
//! ```
//!
//! # Searching
//!
//! [`index_of()`][PooledVec::index_of], [`contains()`][PooledVec::contains] and
//! [`remove()`][PooledVec::remove] search with the algorithm that the element type declares
//! through [`Searchable`]. Built-in types use a linear scan. Custom types opt in with
//! [`impl_linear_search!`] or, if their containers are always sorted, [`impl_ordered_search!`].
//! Element types without a [`Searchable`] implementation can still be searched with
//! [`position()`][PooledVec::position], a plain scan that only needs [`PartialEq`].
//!
//! # Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events when buffers are rented, grown
//! and returned. It never installs a subscriber.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod bucketed_pool;
mod bucketed_pool_builder;
mod buffer_handle;
mod constants;
mod error;
mod pool;
mod pooled_array;
mod pooled_vec;
mod pooled_vec_builder;
mod release_policy;
mod search;
mod sequence;
mod shared_pool;

pub use bucketed_pool::*;
pub use bucketed_pool_builder::*;
pub use buffer_handle::*;
pub use error::*;
pub use pool::*;
pub use pooled_array::*;
pub use pooled_vec::*;
pub use pooled_vec_builder::*;
pub use release_policy::*;
pub use search::*;
pub use sequence::PooledSequence;
pub use shared_pool::*;
