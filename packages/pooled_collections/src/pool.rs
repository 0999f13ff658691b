use std::rc::Rc;
use std::sync::Arc;

/// A source of reusable buffers for pooled containers.
///
/// Containers rent a buffer when they are created or when they need to grow and hand it back
/// exactly once when they no longer need it. The pool itself decides whether a returned buffer
/// is kept for reuse or freed.
///
/// # Contract
///
/// * [`rent()`](Self::rent) returns an empty vector whose capacity is at least the requested
///   minimum. It never fails; an exhausted pool falls back to direct allocation.
/// * [`return_buffer()`](Self::return_buffer) receives an empty vector. Containers drop the
///   elements of a buffer before handing it back, so pooled memory never keeps values alive.
/// * Implementations are expected to be safe to use from multiple threads if they are
///   shared between threads ([`Sync`]), even though each rented buffer has a single owner.
///
/// # Example
///
/// ```rust
/// use pooled_collections::{BufferPool, HeapPool};
///
/// let pool = HeapPool;
///
/// let buffer: Vec<u32> = pool.rent(10);
/// assert!(buffer.capacity() >= 10);
/// assert!(buffer.is_empty());
///
/// pool.return_buffer(buffer);
/// ```
pub trait BufferPool<T> {
    /// Rents an empty buffer with room for at least `minimum_capacity` elements.
    ///
    /// A request for zero capacity may be served by an unallocated vector.
    fn rent(&self, minimum_capacity: usize) -> Vec<T>;

    /// Returns a previously rented buffer to the pool.
    ///
    /// The buffer must be empty. Pools may also accept buffers they did not hand out.
    fn return_buffer(&self, buffer: Vec<T>);
}

impl<T, P> BufferPool<T> for &P
where
    P: BufferPool<T> + ?Sized,
{
    #[inline]
    fn rent(&self, minimum_capacity: usize) -> Vec<T> {
        (**self).rent(minimum_capacity)
    }

    #[inline]
    fn return_buffer(&self, buffer: Vec<T>) {
        (**self).return_buffer(buffer);
    }
}

impl<T, P> BufferPool<T> for Rc<P>
where
    P: BufferPool<T> + ?Sized,
{
    #[inline]
    fn rent(&self, minimum_capacity: usize) -> Vec<T> {
        (**self).rent(minimum_capacity)
    }

    #[inline]
    fn return_buffer(&self, buffer: Vec<T>) {
        (**self).return_buffer(buffer);
    }
}

impl<T, P> BufferPool<T> for Arc<P>
where
    P: BufferPool<T> + ?Sized,
{
    #[inline]
    fn rent(&self, minimum_capacity: usize) -> Vec<T> {
        (**self).rent(minimum_capacity)
    }

    #[inline]
    fn return_buffer(&self, buffer: Vec<T>) {
        (**self).return_buffer(buffer);
    }
}

/// A pool that does not pool: every rent allocates and every return frees.
///
/// This is useful as a baseline when comparing against real pools and in places where a
/// container type requires a pool but reuse is not wanted.
///
/// # Example
///
/// ```rust
/// use pooled_collections::{HeapPool, PooledVec};
///
/// let mut items = PooledVec::with_capacity_in(4, HeapPool).unwrap();
/// items.append(1_u8).unwrap();
///
/// assert_eq!(items.as_view().unwrap(), [1]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
pub struct HeapPool;

impl<T> BufferPool<T> for HeapPool {
    #[inline]
    fn rent(&self, minimum_capacity: usize) -> Vec<T> {
        Vec::with_capacity(minimum_capacity)
    }

    #[inline]
    fn return_buffer(&self, buffer: Vec<T>) {
        debug_assert!(buffer.is_empty());
        drop(buffer);
    }
}
