use std::any::{Any, TypeId};
use std::sync::{LazyLock, Mutex};

use foldhash::{HashMap, HashMapExt};
use tracing::debug;

use crate::constants::ERR_POISONED_LOCK;
use crate::{BucketedPool, BufferPool};

/// Process-wide pools, one per element type. Pools are created on first use and live for the
/// rest of the process, so we can hand out `'static` references without holding the lock.
static REGISTRY: LazyLock<Mutex<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// The process-wide shared buffer pool, used by pooled containers unless another pool is given.
///
/// This is a zero-sized handle: all instances refer to the same set of pools. For each element
/// type there is one [`BucketedPool`] with default configuration, created lazily the first time
/// a buffer of that type is rented.
///
/// # Example
///
/// ```rust
/// use pooled_collections::{BufferPool, PooledVec, SharedPool};
///
/// // Containers use the shared pool by default.
/// let mut items: PooledVec<u32> = PooledVec::new();
/// items.append(42).unwrap();
///
/// // The pool can also be used directly.
/// let buffer: Vec<u32> = SharedPool.rent(100);
/// assert!(buffer.capacity() >= 100);
/// SharedPool.return_buffer(buffer);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
pub struct SharedPool;

impl SharedPool {
    /// Returns the process-wide pool that serves buffers of element type `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pooled_collections::SharedPool;
    ///
    /// let first = SharedPool::pool_for::<String>();
    /// let second = SharedPool::pool_for::<String>();
    ///
    /// assert!(std::ptr::eq(first, second));
    /// ```
    #[must_use]
    pub fn pool_for<T>() -> &'static BucketedPool<T>
    where
        T: Send + 'static,
    {
        let mut registry = REGISTRY.lock().expect(ERR_POISONED_LOCK);

        let pool = *registry.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(
                element_type = std::any::type_name::<T>(),
                "creating shared pool for element type"
            );

            let pool: &'static (dyn Any + Send + Sync) =
                Box::leak(Box::new(BucketedPool::<T>::new()));
            pool
        });

        pool.downcast_ref::<BucketedPool<T>>()
            .expect("shared pool registry entries are keyed by the type id of their element type")
    }
}

impl<T> BufferPool<T> for SharedPool
where
    T: Send + 'static,
{
    #[inline]
    fn rent(&self, minimum_capacity: usize) -> Vec<T> {
        Self::pool_for::<T>().rent(minimum_capacity)
    }

    #[inline]
    fn return_buffer(&self, buffer: Vec<T>) {
        Self::pool_for::<T>().return_buffer(buffer);
    }
}
