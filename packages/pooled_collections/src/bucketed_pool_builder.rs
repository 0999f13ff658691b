use std::marker::PhantomData;
use std::num::NonZero;

use crate::BucketedPool;
use crate::constants::{
    DEFAULT_MAX_BUFFER_CAPACITY, DEFAULT_MAX_BUFFERS_PER_BUCKET, MIN_BUCKET_CAPACITY,
};

/// Builder for creating an instance of [`BucketedPool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The default configuration used by [`BucketedPool::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use pooled_collections::BucketedPool;
///
/// let pool = BucketedPool::<u32>::builder()
///     .max_buffer_capacity(64 * 1024)
///     .max_buffers_per_bucket(16)
///     .build();
///
/// assert_eq!(pool.max_buffer_capacity(), 64 * 1024);
/// assert_eq!(pool.max_buffers_per_bucket(), 16);
/// ```
///
/// [1]: BucketedPool::new
#[must_use]
pub struct BucketedPoolBuilder<T> {
    max_buffer_capacity: NonZero<usize>,
    max_buffers_per_bucket: NonZero<usize>,

    _item: PhantomData<T>,
}

impl<T> std::fmt::Debug for BucketedPoolBuilder<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketedPoolBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("max_buffer_capacity", &self.max_buffer_capacity)
            .field("max_buffers_per_bucket", &self.max_buffers_per_bucket)
            .finish()
    }
}

impl<T> BucketedPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            max_buffer_capacity: DEFAULT_MAX_BUFFER_CAPACITY,
            max_buffers_per_bucket: DEFAULT_MAX_BUFFERS_PER_BUCKET,
            _item: PhantomData,
        }
    }

    /// Sets the largest buffer capacity the pool keeps for reuse.
    ///
    /// The value is rounded up to a power of two and to at least 16, the capacity of the
    /// smallest bucket. Larger rent requests are served by direct allocation.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity is not representable in `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_collections::BucketedPool;
    ///
    /// let pool = BucketedPool::<u32>::builder().max_buffer_capacity(3).build();
    /// assert_eq!(pool.max_buffer_capacity(), 16);
    /// ```
    pub fn max_buffer_capacity(mut self, capacity: usize) -> Self {
        let rounded = capacity
            .max(MIN_BUCKET_CAPACITY.get())
            .checked_next_power_of_two()
            .and_then(NonZero::new)
            .expect("maximum buffer capacity must be representable as a power of two");

        self.max_buffer_capacity = rounded;
        self
    }

    /// Sets how many idle buffers each bucket keeps before freeing returned buffers.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_collections::BucketedPool;
    ///
    /// let pool = BucketedPool::<u32>::builder().max_buffers_per_bucket(4).build();
    /// assert_eq!(pool.max_buffers_per_bucket(), 4);
    /// ```
    pub fn max_buffers_per_bucket(mut self, count: usize) -> Self {
        self.max_buffers_per_bucket =
            NonZero::new(count).expect("a bucket must be able to hold at least one buffer");
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_collections::BucketedPool;
    ///
    /// let pool = BucketedPool::<u32>::builder().build();
    /// assert_eq!(pool.idle_count(), 0);
    /// ```
    #[must_use]
    pub fn build(self) -> BucketedPool<T> {
        BucketedPool::new_inner(self.max_buffer_capacity, self.max_buffers_per_bucket)
    }
}
