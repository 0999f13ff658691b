/// Determines what happens when a buffer handle is dropped while still holding its buffer.
///
/// By default, the buffer is returned to its pool when the handle is dropped.
///
/// # Examples
///
/// ```
/// use pooled_collections::{PooledVec, ReleasePolicy};
///
/// let mut items = PooledVec::<u32>::builder()
///     .capacity(16)
///     .release_policy(ReleasePolicy::MustReleaseExplicitly)
///     .build()
///     .unwrap();
///
/// items.append(1).unwrap();
///
/// // Dropping `items` without this call would panic.
/// items.release();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReleasePolicy {
    /// The buffer is returned to the pool when the handle is dropped. This is the default.
    #[default]
    ReleaseOnDrop,

    /// The handle will panic if it still holds its buffer when it is dropped.
    ///
    /// This may be valuable in tests, to verify that every exit path of the code under test
    /// releases its containers explicitly. The buffer is still returned to the pool before the
    /// panic, so the pool is never left short.
    MustReleaseExplicitly,
}
