use std::any::type_name;
use std::fmt;
use std::mem;
use std::thread;

use tracing::{debug, trace, warn};

use crate::constants::max_capacity_of;
use crate::{BufferPool, Error, ReleasePolicy, Result, SharedPool};

/// The single owner of one buffer rented from a [`BufferPool`].
///
/// A handle rents its buffer when it is acquired and holds exactly one buffer at any time until
/// it is released. Growing swaps the buffer for a larger one: the elements move over and the old
/// buffer goes back to the pool. Releasing returns the buffer to the pool, after which every
/// access fails with [`Error::UseAfterRelease`].
///
/// Releasing is idempotent and also happens automatically when the handle is dropped (subject to
/// the [`ReleasePolicy`]), so a buffer is returned exactly once on every exit path.
///
/// Before a buffer goes back to the pool its elements are dropped, so pooled memory never keeps
/// values (and whatever they own) alive. For element types without drop glue this is free.
///
/// Handles are the building block of [`PooledArray`][crate::PooledArray] and
/// [`PooledVec`][crate::PooledVec] but can also be used directly.
///
/// # Example
///
/// ```rust
/// use pooled_collections::{BucketedPool, BufferHandle, Error};
///
/// let pool = BucketedPool::<u32>::new();
/// let mut handle = BufferHandle::acquire(10, &pool).unwrap();
///
/// assert!(handle.capacity().unwrap() >= 10);
/// assert_eq!(handle.len(), 0);
///
/// handle.release();
/// handle.release(); // No-op.
///
/// assert_eq!(handle.capacity(), Err(Error::UseAfterRelease));
/// assert_eq!(pool.return_count(), 1);
/// ```
pub struct BufferHandle<T, P = SharedPool>
where
    P: BufferPool<T>,
{
    /// `None` once released.
    buffer: Option<Vec<T>>,

    pool: P,

    release_policy: ReleasePolicy,
}

impl<T, P> BufferHandle<T, P>
where
    P: BufferPool<T>,
{
    /// Rents a buffer with room for at least `capacity` elements from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a buffer of `capacity` elements could not be
    /// represented in memory.
    pub fn acquire(capacity: usize, pool: P) -> Result<Self> {
        if capacity > max_capacity_of::<T>() {
            return Err(Error::InvalidArgument {
                problem: format!(
                    "capacity {capacity} exceeds the maximum of {} elements of type {}",
                    max_capacity_of::<T>(),
                    type_name::<T>()
                ),
            });
        }

        Ok(Self::acquire_unchecked(capacity, pool))
    }

    /// Rents a buffer without allocating, for containers that start out empty.
    pub(crate) fn acquire_empty(pool: P) -> Self {
        Self::acquire_unchecked(0, pool)
    }

    fn acquire_unchecked(capacity: usize, pool: P) -> Self {
        let buffer = pool.rent(capacity);
        debug_assert!(buffer.is_empty(), "pools must rent out empty buffers");
        debug_assert!(buffer.capacity() >= capacity);

        trace!(
            requested = capacity,
            capacity = buffer.capacity(),
            "acquired pooled buffer"
        );

        Self {
            buffer: Some(buffer),
            pool,
            release_policy: ReleasePolicy::default(),
        }
    }

    /// Whether the buffer has been returned to the pool.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.buffer.is_none()
    }

    /// Number of initialized elements in the buffer. Zero once released.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.as_ref().map_or(0, Vec::len)
    }

    /// Whether the buffer holds no initialized elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements the buffer can hold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the handle has been released.
    pub fn capacity(&self) -> Result<usize> {
        self.buffer().map(Vec::capacity)
    }

    /// The initialized elements of the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the handle has been released.
    pub fn as_slice(&self) -> Result<&[T]> {
        self.buffer().map(Vec::as_slice)
    }

    /// The initialized elements of the buffer, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the handle has been released.
    pub fn as_mut_slice(&mut self) -> Result<&mut [T]> {
        self.buffer_mut().map(Vec::as_mut_slice)
    }

    /// The pool the buffer is rented from and will be returned to.
    #[must_use]
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// What happens if the handle is dropped while still holding its buffer.
    #[must_use]
    pub fn release_policy(&self) -> ReleasePolicy {
        self.release_policy
    }

    /// Sets what happens if the handle is dropped while still holding its buffer.
    pub fn set_release_policy(&mut self, policy: ReleasePolicy) {
        self.release_policy = policy;
    }

    /// Returns the held buffer to the pool and adopts `new_buffer` in its place.
    ///
    /// The elements of the old buffer are dropped before it is returned. The elements of
    /// `new_buffer`, if any, become the elements of the handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the handle has been released. The new buffer is
    /// dropped in that case.
    pub fn replace(&mut self, new_buffer: Vec<T>) -> Result<()> {
        let slot = self.buffer.as_mut().ok_or(Error::UseAfterRelease)?;
        let old_buffer = mem::replace(slot, new_buffer);

        self.return_to_pool(old_buffer);

        Ok(())
    }

    /// Ensures the buffer can hold at least `new_capacity` elements, swapping it for a larger one
    /// rented from the pool if necessary. Existing elements are moved to the new buffer.
    ///
    /// The new buffer has a capacity of at least `new_capacity` - the pool may round it up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the handle has been released and
    /// [`Error::CapacityOverflow`] if `new_capacity` cannot be represented in memory.
    pub fn grow_to(&mut self, new_capacity: usize) -> Result<()> {
        let old_capacity = self.capacity()?;

        if new_capacity <= old_capacity {
            return Ok(());
        }

        if new_capacity > max_capacity_of::<T>() {
            return Err(Error::CapacityOverflow {
                requested: new_capacity,
            });
        }

        debug!(old_capacity, new_capacity, "growing pooled buffer");

        self.move_to_new_buffer(new_capacity)
    }

    /// Moves the elements to a buffer rented with the given minimum capacity, which must be
    /// enough to hold all the elements, and returns the current buffer to the pool.
    pub(crate) fn move_to_new_buffer(&mut self, minimum_capacity: usize) -> Result<()> {
        debug_assert!(minimum_capacity >= self.len());

        // Fail before renting, so we never rent a buffer we cannot hand back through the handle.
        self.buffer()?;

        let mut new_buffer = self.pool.rent(minimum_capacity);
        debug_assert!(new_buffer.is_empty(), "pools must rent out empty buffers");
        debug_assert!(new_buffer.capacity() >= minimum_capacity);

        // The new buffer has room for all elements, so this moves without reallocating.
        new_buffer.append(self.buffer_mut()?);

        self.replace(new_buffer)
    }

    /// Swaps the buffer for a smaller one that still fits all elements, if the pool has one.
    ///
    /// The pool may round capacities up, so the current buffer is kept if the replacement would
    /// not be smaller.
    pub(crate) fn shrink_to_fit(&mut self) -> Result<()> {
        let old_capacity = self.capacity()?;
        let len = self.len();

        if len == old_capacity {
            return Ok(());
        }

        let mut new_buffer = self.pool.rent(len);
        let new_capacity = new_buffer.capacity();

        if new_capacity >= old_capacity {
            self.pool.return_buffer(new_buffer);
            return Ok(());
        }

        debug!(old_capacity, new_capacity, "shrinking pooled buffer");

        new_buffer.append(self.buffer_mut()?);
        self.replace(new_buffer)
    }

    /// Returns the buffer to the pool. Any further access fails with
    /// [`Error::UseAfterRelease`].
    ///
    /// Calling this on an already released handle does nothing.
    pub fn release(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.return_to_pool(buffer);
            trace!("released pooled buffer");
        }
    }

    pub(crate) fn buffer(&self) -> Result<&Vec<T>> {
        self.buffer.as_ref().ok_or(Error::UseAfterRelease)
    }

    /// Mutable access to the buffer. Callers must not push beyond the capacity of the buffer:
    /// growth goes through [`grow_to()`](Self::grow_to) so that buffers come from the pool.
    pub(crate) fn buffer_mut(&mut self) -> Result<&mut Vec<T>> {
        self.buffer.as_mut().ok_or(Error::UseAfterRelease)
    }

    fn return_to_pool(&self, mut buffer: Vec<T>) {
        // Drop the elements here, not in the pool, so they do not outlive their owner.
        buffer.clear();

        trace!(
            capacity = buffer.capacity(),
            dropped_elements = mem::needs_drop::<T>(),
            "returning buffer to pool"
        );

        self.pool.return_buffer(buffer);
    }
}

impl<T, P> Drop for BufferHandle<T, P>
where
    P: BufferPool<T>,
{
    fn drop(&mut self) {
        let Some(buffer) = self.buffer.take() else {
            return;
        };

        // Return the buffer first so the pool is not left short even if we panic below.
        self.return_to_pool(buffer);

        if matches!(self.release_policy, ReleasePolicy::MustReleaseExplicitly) {
            // If we are already panicking, we do not want to panic again because that will
            // simply obscure whatever the original panic was, leading to debug difficulties.
            if thread::panicking() {
                warn!(
                    element_type = type_name::<T>(),
                    "pooled buffer dropped without explicit release during panic"
                );
            } else {
                panic!(
                    "pooled buffer of {} dropped without explicit release, which the release policy forbids",
                    type_name::<T>()
                );
            }
        }
    }
}

impl<T, P> fmt::Debug for BufferHandle<T, P>
where
    P: BufferPool<T>,
{
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("len", &self.len())
            .field("capacity", &self.buffer.as_ref().map(Vec::capacity))
            .field("released", &self.is_released())
            .field("release_policy", &self.release_policy)
            .finish_non_exhaustive()
    }
}
