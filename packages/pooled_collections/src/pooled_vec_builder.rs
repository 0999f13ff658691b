use std::marker::PhantomData;

use crate::{BufferPool, PooledVec, ReleasePolicy, Result, SharedPool};

/// Builder for creating an instance of [`PooledVec`].
///
/// You only need to use this builder if you want to customize the vector configuration.
/// [`PooledVec::new()`][1] and [`PooledVec::new_in()`][2] are sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use pooled_collections::{BucketedPool, PooledVec, ReleasePolicy};
///
/// let pool = BucketedPool::<u64>::new();
///
/// let mut samples = PooledVec::<u64>::builder()
///     .capacity(256)
///     .pool(&pool)
///     .release_policy(ReleasePolicy::MustReleaseExplicitly)
///     .build()
///     .unwrap();
///
/// samples.append(7).unwrap();
/// samples.release();
///
/// assert_eq!(pool.idle_count(), 1);
/// ```
///
/// [1]: PooledVec::new
/// [2]: PooledVec::new_in
#[must_use]
pub struct PooledVecBuilder<T, P = SharedPool> {
    capacity: usize,
    pool: P,
    release_policy: ReleasePolicy,

    _item: PhantomData<T>,
}

impl<T, P> std::fmt::Debug for PooledVecBuilder<T, P>
where
    P: std::fmt::Debug,
{
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledVecBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("capacity", &self.capacity)
            .field("pool", &self.pool)
            .field("release_policy", &self.release_policy)
            .finish()
    }
}

impl<T> PooledVecBuilder<T, SharedPool> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            pool: SharedPool,
            release_policy: ReleasePolicy::default(),
            _item: PhantomData,
        }
    }
}

impl<T, P> PooledVecBuilder<T, P> {
    /// Sets the minimum initial capacity of the vector. Zero by default, in which case the
    /// vector starts out with a zero-capacity buffer and rents a real one when the first
    /// element is added.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the pool that the vector rents its buffers from. The shared pool is used by
    /// default.
    pub fn pool<Q>(self, pool: Q) -> PooledVecBuilder<T, Q>
    where
        Q: BufferPool<T>,
    {
        PooledVecBuilder {
            capacity: self.capacity,
            pool,
            release_policy: self.release_policy,
            _item: PhantomData,
        }
    }

    /// Sets the [release policy][ReleasePolicy] of the vector. This governs what happens if the
    /// vector is dropped without being released.
    pub fn release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.release_policy = policy;
        self
    }

    /// Builds the vector with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`][crate::Error::InvalidArgument] if the capacity
    /// cannot be represented in memory.
    pub fn build(self) -> Result<PooledVec<T, P>>
    where
        P: BufferPool<T>,
    {
        let mut result = if self.capacity == 0 {
            PooledVec::new_in(self.pool)
        } else {
            PooledVec::with_capacity_in(self.capacity, self.pool)?
        };

        result.set_release_policy(self.release_policy);

        Ok(result)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{BucketedPool, Error, HeapPool};

    #[test]
    fn defaults_match_new() {
        let values = PooledVecBuilder::<u32, _>::new().build().unwrap();

        assert_eq!(values.capacity(), Ok(0));
        assert_eq!(values.release_policy(), ReleasePolicy::ReleaseOnDrop);
    }

    #[test]
    fn capacity_is_rented_up_front() {
        let pool = BucketedPool::<u32>::new();

        let values = PooledVec::<u32>::builder()
            .capacity(100)
            .pool(&pool)
            .build()
            .unwrap();

        assert_eq!(values.capacity(), Ok(128));
        assert_eq!(pool.rent_count(), 1);
    }

    #[test]
    fn settings_survive_pool_change() {
        let mut values = PooledVec::<u8>::builder()
            .release_policy(ReleasePolicy::MustReleaseExplicitly)
            .capacity(10)
            .pool(HeapPool)
            .build()
            .unwrap();

        assert_eq!(values.capacity(), Ok(10));
        assert_eq!(
            values.release_policy(),
            ReleasePolicy::MustReleaseExplicitly
        );

        values.release();
    }

    #[test]
    fn unrepresentable_capacity_is_invalid_argument() {
        let result = PooledVec::<u64>::builder()
            .capacity(usize::MAX)
            .pool(HeapPool)
            .build();

        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }
}
