use std::any::type_name;
use std::fmt;
use std::num::NonZero;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::constants::{ERR_POISONED_LOCK, MIN_BUCKET_CAPACITY};
use crate::{BucketedPoolBuilder, BufferPool};

/// A thread-safe pool that keeps returned buffers in power-of-two sized buckets for reuse.
///
/// Bucket capacities start at 16 elements and double up to the configured maximum buffer
/// capacity. A rent request is rounded up to the nearest bucket and served from the idle buffers
/// of that bucket, allocating a new buffer of the bucket capacity only when none is idle.
///
/// Requests larger than the maximum buffer capacity bypass the pool: they are allocated directly
/// and the buffers are freed when returned. A bucket keeps at most a configured number of idle
/// buffers; buffers returned to a full bucket are freed.
///
/// # Examples
///
/// ```rust
/// use pooled_collections::{BucketedPool, BufferPool};
///
/// let pool = BucketedPool::<u64>::new();
///
/// let buffer = pool.rent(20);
/// assert_eq!(buffer.capacity(), 32);
/// pool.return_buffer(buffer);
///
/// // The same buffer is reused for the next request that maps to its bucket.
/// assert_eq!(pool.idle_count(), 1);
/// let buffer = pool.rent(30);
/// assert_eq!(pool.idle_count(), 0);
/// # pool.return_buffer(buffer);
/// ```
///
/// Pools are usually shared between containers by reference:
///
/// ```rust
/// use pooled_collections::{BucketedPool, PooledVec};
///
/// let pool = BucketedPool::<String>::builder()
///     .max_buffer_capacity(4096)
///     .max_buffers_per_bucket(8)
///     .build();
///
/// let mut first = PooledVec::new_in(&pool);
/// first.append("a".to_string()).unwrap();
///
/// let mut second = PooledVec::new_in(&pool);
/// second.append("b".to_string()).unwrap();
/// ```
///
/// # Thread safety
///
/// The pool is thread-safe ([`Sync`]) whenever the elements can be moved between threads.
pub struct BucketedPool<T> {
    /// Idle buffers, indexed by bucket. Bucket `n` holds buffers with a capacity of at least
    /// `MIN_BUCKET_CAPACITY << n` elements.
    buckets: Box<[Mutex<Vec<Vec<T>>>]>,

    max_buffer_capacity: NonZero<usize>,
    max_buffers_per_bucket: NonZero<usize>,

    rent_count: AtomicU64,
    return_count: AtomicU64,
}

impl<T> BucketedPool<T> {
    /// Creates a pool with the default configuration: buffers of up to 1,048,576 elements are
    /// reused and each bucket keeps at most 50 idle buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for creating a pool with a custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pooled_collections::BucketedPool;
    ///
    /// let pool = BucketedPool::<u8>::builder()
    ///     .max_buffer_capacity(1000)
    ///     .build();
    ///
    /// // Rounded up to the nearest bucket capacity.
    /// assert_eq!(pool.max_buffer_capacity(), 1024);
    /// ```
    pub fn builder() -> BucketedPoolBuilder<T> {
        BucketedPoolBuilder::new()
    }

    pub(crate) fn new_inner(
        max_buffer_capacity: NonZero<usize>,
        max_buffers_per_bucket: NonZero<usize>,
    ) -> Self {
        debug_assert!(max_buffer_capacity.is_power_of_two());
        debug_assert!(max_buffer_capacity >= MIN_BUCKET_CAPACITY);

        // Both values are powers of two with max >= min, so the subtraction cannot underflow.
        let bucket_count = max_buffer_capacity
            .ilog2()
            .wrapping_sub(MIN_BUCKET_CAPACITY.ilog2())
            .wrapping_add(1);

        let buckets = (0..bucket_count)
            .map(|_| Mutex::new(Vec::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            buckets,
            max_buffer_capacity,
            max_buffers_per_bucket,
            rent_count: AtomicU64::new(0),
            return_count: AtomicU64::new(0),
        }
    }

    /// The largest buffer capacity this pool keeps for reuse.
    #[must_use]
    pub fn max_buffer_capacity(&self) -> usize {
        self.max_buffer_capacity.get()
    }

    /// The largest number of idle buffers kept in each bucket.
    #[must_use]
    pub fn max_buffers_per_bucket(&self) -> usize {
        self.max_buffers_per_bucket.get()
    }

    /// Number of buffers rented from this pool since it was created.
    #[must_use]
    pub fn rent_count(&self) -> u64 {
        self.rent_count.load(Ordering::Relaxed)
    }

    /// Number of buffers returned to this pool since it was created, including buffers that
    /// were freed instead of being kept for reuse.
    #[must_use]
    pub fn return_count(&self) -> u64 {
        self.return_count.load(Ordering::Relaxed)
    }

    /// Number of buffers currently idle in the pool, waiting to be rented again.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.lock().expect(ERR_POISONED_LOCK).len())
            .sum()
    }

    /// The capacity of the buffers allocated for the given bucket.
    fn bucket_capacity(index: usize) -> usize {
        let shift = u32::try_from(index).expect("bucket indexes are derived from a u32 logarithm");

        // Bucket indexes are bounded by the pool's maximum capacity, which is representable.
        MIN_BUCKET_CAPACITY.get().wrapping_shl(shift)
    }

    /// The bucket that serves a rent request, if the request is small enough to be pooled.
    fn bucket_for_rent(&self, minimum_capacity: usize) -> Option<usize> {
        if minimum_capacity > self.max_buffer_capacity.get() {
            return None;
        }

        // Cannot overflow because it is at most the (power of two) maximum buffer capacity.
        let rounded = minimum_capacity
            .max(MIN_BUCKET_CAPACITY.get())
            .next_power_of_two();

        Some(Self::bucket_index(rounded))
    }

    /// The bucket that a returned buffer of the given capacity belongs to, if any.
    ///
    /// A buffer belongs to the largest bucket whose capacity it can satisfy.
    fn bucket_for_return(&self, capacity: usize) -> Option<usize> {
        if capacity < MIN_BUCKET_CAPACITY.get() || capacity > self.max_buffer_capacity.get() {
            return None;
        }

        Some(Self::bucket_index(capacity))
    }

    fn bucket_index(capacity: usize) -> usize {
        // Callers guarantee capacity >= MIN_BUCKET_CAPACITY.
        let index = capacity
            .ilog2()
            .wrapping_sub(MIN_BUCKET_CAPACITY.ilog2());

        usize::try_from(index).expect("bucket index always fits in usize")
    }
}

impl<T> BufferPool<T> for BucketedPool<T> {
    fn rent(&self, minimum_capacity: usize) -> Vec<T> {
        self.rent_count.fetch_add(1, Ordering::Relaxed);

        if minimum_capacity == 0 {
            return Vec::new();
        }

        let Some(index) = self.bucket_for_rent(minimum_capacity) else {
            debug!(
                minimum_capacity,
                max_buffer_capacity = self.max_buffer_capacity.get(),
                "rent request exceeds pooled capacity, allocating directly"
            );

            return Vec::with_capacity(minimum_capacity);
        };

        let bucket = self
            .buckets
            .get(index)
            .expect("bucket_for_rent only yields indexes of existing buckets");

        let reused = bucket.lock().expect(ERR_POISONED_LOCK).pop();

        if let Some(buffer) = reused {
            trace!(
                minimum_capacity,
                capacity = buffer.capacity(),
                "reusing idle buffer"
            );

            return buffer;
        }

        let capacity = Self::bucket_capacity(index);
        trace!(minimum_capacity, capacity, "allocating new buffer");

        Vec::with_capacity(capacity)
    }

    fn return_buffer(&self, mut buffer: Vec<T>) {
        self.return_count.fetch_add(1, Ordering::Relaxed);

        debug_assert!(buffer.is_empty(), "returned buffers must be empty");
        buffer.clear();

        let capacity = buffer.capacity();

        if capacity == 0 {
            return;
        }

        let Some(index) = self.bucket_for_return(capacity) else {
            debug!(capacity, "returned buffer does not fit any bucket, freeing it");
            return;
        };

        let bucket = self
            .buckets
            .get(index)
            .expect("bucket_for_return only yields indexes of existing buckets");

        let mut idle = bucket.lock().expect(ERR_POISONED_LOCK);

        if idle.len() >= self.max_buffers_per_bucket.get() {
            drop(idle);
            debug!(capacity, "bucket is full, freeing returned buffer");
            return;
        }

        idle.push(buffer);
        trace!(capacity, idle = idle.len(), "buffer returned to bucket");
    }
}

impl<T> Default for BucketedPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BucketedPool<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("bucket_count", &self.buckets.len())
            .field("max_buffer_capacity", &self.max_buffer_capacity)
            .field("max_buffers_per_bucket", &self.max_buffers_per_bucket)
            .field("rent_count", &self.rent_count())
            .field("return_count", &self.return_count())
            .field("idle_count", &self.idle_count())
            .finish()
    }
}
