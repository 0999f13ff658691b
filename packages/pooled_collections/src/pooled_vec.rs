use std::any::type_name;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;
use std::ops::RangeBounds;
use std::slice;

use crate::constants::{DEFAULT_GROWTH_CAPACITY, max_capacity_of};
use crate::sequence::{
    check_index, check_position, copy_into, impl_structural_traits, resolve_range,
    resolve_window, sequence_cmp, sequence_eq, sequence_hash,
};
use crate::{
    BufferHandle, BufferPool, Error, PooledArray, PooledSequence, PooledVecBuilder,
    ReleasePolicy, Result, Searchable, SharedPool, linear_search, ordered_search,
};

/// A growable vector whose storage is rented from a [`BufferPool`].
///
/// The vector never reallocates on its own. When it runs out of room it rents a larger buffer
/// from the pool, moves the elements over and returns the old buffer, so that buffers cycle
/// through the pool instead of being freed. A vector at capacity doubles its capacity; an empty
/// one starts with room for 4 elements (the pool may round this up).
///
/// The storage goes back to the pool when the vector is released or dropped. Every access after
/// [`release()`](Self::release) fails with [`Error::UseAfterRelease`].
///
/// # Examples
///
/// ```rust
/// use pooled_collections::PooledVec;
///
/// let mut values = PooledVec::new();
/// values.append(10).unwrap();
/// values.append(30).unwrap();
/// values.insert(1, 20).unwrap();
///
/// assert_eq!(values.as_view().unwrap(), [10, 20, 30]);
///
/// assert!(values.remove(&20).unwrap());
/// assert!(!values.remove(&40).unwrap());
/// assert_eq!(values.as_view().unwrap(), [10, 30]);
/// ```
///
/// Containers can share a dedicated pool, borrowing it:
///
/// ```rust
/// use pooled_collections::{BucketedPool, PooledVec};
///
/// let pool = BucketedPool::<u8>::new();
///
/// for _ in 0..10 {
///     let mut scratch = PooledVec::with_capacity_in(100, &pool).unwrap();
///     scratch.append_slice(b"hello").unwrap();
///     // The buffer returns to the pool here and is reused by the next iteration.
/// }
///
/// assert_eq!(pool.idle_count(), 1);
/// ```
pub struct PooledVec<T, P = SharedPool>
where
    P: BufferPool<T>,
{
    handle: BufferHandle<T, P>,
}

impl<T> PooledVec<T, SharedPool>
where
    T: Send + 'static,
{
    /// Creates an empty vector using the shared pool.
    ///
    /// The vector starts out with a zero-capacity buffer, which the pool counts as a rent but
    /// never allocates for. A real buffer is rented when the first element is added.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(SharedPool)
    }

    /// Creates an empty vector with room for at least `capacity` elements, using the shared
    /// pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `capacity` elements cannot be represented in
    /// memory.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, SharedPool)
    }

    /// Creates a vector holding clones of the elements of `items`, using the shared pool.
    ///
    /// # Errors
    ///
    /// This function currently does not fail for any slice but reports errors of the
    /// underlying buffer acquisition.
    pub fn from_slice(items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_slice_in(items, SharedPool)
    }

    /// Returns a builder for creating a vector with a custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pooled_collections::{HeapPool, PooledVec};
    ///
    /// let values = PooledVec::<u32>::builder()
    ///     .capacity(64)
    ///     .pool(HeapPool)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(values.capacity().unwrap() >= 64);
    /// ```
    pub fn builder() -> PooledVecBuilder<T, SharedPool> {
        PooledVecBuilder::new()
    }
}

impl<T, P> PooledVec<T, P>
where
    P: BufferPool<T>,
{
    /// Creates an empty vector using the given pool.
    ///
    /// The vector starts out with a zero-capacity buffer, which the pool counts as a rent but
    /// never allocates for. A real buffer is rented when the first element is added.
    #[must_use]
    pub fn new_in(pool: P) -> Self {
        Self {
            handle: BufferHandle::acquire_empty(pool),
        }
    }

    /// Creates an empty vector with room for at least `capacity` elements, using the given
    /// pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `capacity` elements cannot be represented in
    /// memory.
    pub fn with_capacity_in(capacity: usize, pool: P) -> Result<Self> {
        Ok(Self {
            handle: BufferHandle::acquire(capacity, pool)?,
        })
    }

    /// Creates a vector holding clones of the elements of `items`, using the given pool.
    ///
    /// # Errors
    ///
    /// This function currently does not fail for any slice but reports errors of the
    /// underlying buffer acquisition.
    pub fn from_slice_in(items: &[T], pool: P) -> Result<Self>
    where
        T: Clone,
    {
        let mut result = Self::with_capacity_in(items.len(), pool)?;
        result.handle.buffer_mut()?.extend_from_slice(items);

        Ok(result)
    }

    /// Creates a vector holding the items of any finite iterable, using the given pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the items cannot be represented in memory.
    pub fn from_iter_in<I>(items: I, pool: P) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let items = items.into_iter();
        let (lower, _) = items.size_hint();

        if lower > max_capacity_of::<T>() {
            return Err(Error::CapacityOverflow { requested: lower });
        }

        let mut result = Self::with_capacity_in(lower, pool)?;
        result.append_range(items)?;

        Ok(result)
    }

    /// Number of elements in the vector. Zero once released.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handle.len()
    }

    /// Whether the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    /// Number of elements the vector can hold before it needs to rent a larger buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn capacity(&self) -> Result<usize> {
        self.handle.capacity()
    }

    /// Appends an element to the end of the vector, growing the buffer if it is full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::CapacityOverflow`] if the grown capacity cannot be represented in memory.
    pub fn append(&mut self, item: T) -> Result<()> {
        self.grow_if_full()?;
        self.handle.buffer_mut()?.push(item);
        Ok(())
    }

    /// Appends all items of an iterable to the end of the vector.
    ///
    /// If the iterator reports its exact length, the buffer grows at most once, to exactly the
    /// size needed. Otherwise the items are appended one by one, growing as [`append()`]
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::CapacityOverflow`] if the grown capacity cannot be represented in memory. Items
    /// appended before an error remain in the vector.
    ///
    /// [`append()`]: Self::append
    pub fn append_range<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.handle.buffer()?;

        let mut items = items.into_iter();
        let (lower, upper) = items.size_hint();

        if upper == Some(lower) {
            self.reserve(lower)?;
            self.handle
                .buffer_mut()?
                .extend(items.by_ref().take(lower));
        }

        // Only reached with items left over if the iterator does not know its length or has
        // misreported it.
        for item in items {
            self.append(item)?;
        }

        Ok(())
    }

    /// Appends clones of all elements of `items`, growing the buffer at most once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::CapacityOverflow`] if the grown capacity cannot be represented in memory.
    pub fn append_slice(&mut self, items: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.reserve(items.len())?;
        self.handle.buffer_mut()?.extend_from_slice(items);
        Ok(())
    }

    /// Inserts an element at `index`, shifting all later elements one position to the right.
    ///
    /// `index` may be equal to [`len()`](Self::len), which appends.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released,
    /// [`Error::OutOfBounds`] if `index > len()` and [`Error::CapacityOverflow`] if the grown
    /// capacity cannot be represented in memory.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        check_position(index, self.handle.buffer()?.len())?;

        self.grow_if_full()?;
        self.handle.buffer_mut()?.insert(index, item);
        Ok(())
    }

    /// Inserts all items of an iterable at `index`, shifting later elements to the right once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released,
    /// [`Error::OutOfBounds`] if `index > len()` and [`Error::CapacityOverflow`] if the grown
    /// capacity cannot be represented in memory. The vector is unchanged if an error occurs.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pooled_collections::PooledVec;
    ///
    /// let mut letters = PooledVec::from_slice(&['a', 'e']).unwrap();
    /// letters.insert_range(1, ['b', 'c', 'd']).unwrap();
    ///
    /// assert_eq!(letters.as_view().unwrap(), ['a', 'b', 'c', 'd', 'e']);
    /// ```
    pub fn insert_range<I>(&mut self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let original_len = self.handle.buffer()?.len();
        check_position(index, original_len)?;

        let appended = self.append_range(items);

        let buffer = self.handle.buffer_mut()?;

        if let Err(error) = appended {
            buffer.truncate(original_len);
            return Err(error);
        }

        let inserted_count = buffer
            .len()
            .checked_sub(original_len)
            .expect("appending never shortens the buffer");

        buffer
            .get_mut(index..)
            .expect("index was validated against the original length")
            .rotate_right(inserted_count);

        Ok(())
    }

    /// Removes and returns the element at `index`, shifting all later elements one position to
    /// the left.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::OutOfBounds`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let buffer = self.handle.buffer_mut()?;
        check_index(index, buffer.len())?;

        Ok(buffer.remove(index))
    }

    /// Removes the first element equal to `item`, if there is one. Returns whether an element
    /// was removed.
    ///
    /// The element is located with the search strategy declared by the element type's
    /// [`Searchable`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn remove(&mut self, item: &T) -> Result<bool>
    where
        T: Searchable,
    {
        let Some(index) = self.index_of(item)? else {
            return Ok(false);
        };

        self.remove_at(index)?;
        Ok(true)
    }

    /// Removes the elements in `range`, shifting later elements to the left once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released,
    /// [`Error::InvalidArgument`] if the range is inverted and [`Error::OutOfBounds`] if it
    /// reaches past the end of the vector.
    pub fn remove_range(&mut self, range: impl RangeBounds<usize>) -> Result<()> {
        let buffer = self.handle.buffer_mut()?;
        let range = resolve_range(range, buffer.len())?;

        buffer.drain(range);
        Ok(())
    }

    /// Shortens the vector to `len` elements, dropping the rest. Does nothing if the vector is
    /// not longer than `len`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn truncate(&mut self, len: usize) -> Result<()> {
        self.handle.buffer_mut()?.truncate(len);
        Ok(())
    }

    /// Removes and returns the last element, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn pop(&mut self) -> Result<Option<T>> {
        Ok(self.handle.buffer_mut()?.pop())
    }

    /// Drops all elements. The capacity is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn clear(&mut self) -> Result<()> {
        self.handle.buffer_mut()?.clear();
        Ok(())
    }

    /// Ensures there is room for at least `additional` more elements, growing the buffer to
    /// exactly the required size (before any rounding by the pool) if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::CapacityOverflow`] if the required capacity cannot be represented in memory.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .handle
            .buffer()?
            .len()
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow {
                requested: usize::MAX,
            })?;

        self.handle.grow_to(required)
    }

    /// Swaps the buffer for the smallest one the pool offers that still fits all elements, if
    /// that is smaller than the current buffer.
    ///
    /// Capacity never shrinks unless this is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.handle.shrink_to_fit()
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::OutOfBounds`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&T> {
        let view = self.as_view()?;
        let len = view.len();

        view.get(index).ok_or(Error::OutOfBounds { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::OutOfBounds`] if `index >= len()`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let view = self.as_view_mut()?;
        let len = view.len();

        view.get_mut(index).ok_or(Error::OutOfBounds { index, len })
    }

    /// Overwrites the element at `index`, dropping the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::OutOfBounds`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Borrows all elements as a slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn as_view(&self) -> Result<&[T]> {
        self.handle.as_slice()
    }

    /// Borrows the elements from `start` to the end as a slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::OutOfBounds`] if `start > len()`.
    pub fn as_view_from(&self, start: usize) -> Result<&[T]> {
        let view = self.as_view()?;
        check_position(start, view.len())?;

        Ok(view
            .get(start..)
            .expect("start was validated against the length"))
    }

    /// Borrows `length` elements starting at `start` as a slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::OutOfBounds`] if the window does not fit within the vector.
    pub fn as_view_range(&self, start: usize, length: usize) -> Result<&[T]> {
        let view = self.as_view()?;
        let range = resolve_window(start, length, view.len())?;

        Ok(view
            .get(range)
            .expect("window was validated against the length"))
    }

    /// Borrows all elements as a mutable slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn as_view_mut(&mut self) -> Result<&mut [T]> {
        self.handle.as_mut_slice()
    }

    /// Borrows the elements from `start` to the end as a mutable slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::OutOfBounds`] if `start > len()`.
    pub fn as_view_mut_from(&mut self, start: usize) -> Result<&mut [T]> {
        let view = self.as_view_mut()?;
        check_position(start, view.len())?;

        Ok(view
            .get_mut(start..)
            .expect("start was validated against the length"))
    }

    /// Borrows `length` elements starting at `start` as a mutable slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::OutOfBounds`] if the window does not fit within the vector.
    pub fn as_view_mut_range(&mut self, start: usize, length: usize) -> Result<&mut [T]> {
        let view = self.as_view_mut()?;
        let range = resolve_window(start, length, view.len())?;

        Ok(view
            .get_mut(range)
            .expect("window was validated against the length"))
    }

    /// Iterates over the elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn iter(&self) -> Result<slice::Iter<'_, T>> {
        self.as_view().map(<[T]>::iter)
    }

    /// Iterates over the elements, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn iter_mut(&mut self) -> Result<slice::IterMut<'_, T>> {
        self.as_view_mut().map(<[T]>::iter_mut)
    }

    /// Copies the elements in `range` into a new, independent vector with its own buffer rented
    /// from the same pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released,
    /// [`Error::InvalidArgument`] if the range is inverted and [`Error::OutOfBounds`] if it
    /// reaches past the end of the vector.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Result<Self>
    where
        T: Clone,
        P: Clone,
    {
        let view = self.as_view()?;
        let range = resolve_range(range, view.len())?;
        let selected = view
            .get(range)
            .expect("range was validated against the length");

        Self::from_slice_in(selected, self.handle.pool().clone())
    }

    /// Creates a copy of the vector with its own buffer of the same capacity, rented from the
    /// same pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        P: Clone,
    {
        let view = self.as_view()?;

        let mut result = Self::with_capacity_in(self.capacity()?, self.handle.pool().clone())?;
        result.set_release_policy(self.release_policy());
        result.handle.buffer_mut()?.extend_from_slice(view);

        Ok(result)
    }

    /// Clones all elements into `destination`, starting at `destination_index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released and
    /// [`Error::InvalidArgument`] if `destination` has no room for all elements at the given
    /// index.
    pub fn copy_to(&self, destination: &mut [T], destination_index: usize) -> Result<()>
    where
        T: Clone,
    {
        copy_into(self.as_view()?, destination, destination_index)
    }

    /// Clones the elements into a regular (non-pooled) vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn to_vec(&self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        self.as_view().map(<[T]>::to_vec)
    }

    /// Returns the index of the first element equal to `item`, searching with the strategy
    /// declared by the element type's [`Searchable`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn index_of(&self, item: &T) -> Result<Option<usize>>
    where
        T: Searchable,
    {
        Ok(T::locate(self.as_view()?, item))
    }

    /// Whether any element is equal to `item`, searching like [`index_of()`](Self::index_of).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn contains(&self, item: &T) -> Result<bool>
    where
        T: Searchable,
    {
        self.index_of(item).map(|index| index.is_some())
    }

    /// Returns the index of the first element equal to `item` by scanning every element,
    /// regardless of the strategy declared by the element type.
    ///
    /// Unlike [`index_of()`](Self::index_of), this works for any element type with
    /// [`PartialEq`], including types that do not implement [`Searchable`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn position(&self, item: &T) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        Ok(linear_search(self.as_view()?, item))
    }

    /// Returns the index of the first element equal to `item` using binary search, regardless
    /// of the strategy declared by the element type.
    ///
    /// The elements must be sorted in ascending order, for example by
    /// [`sort_unstable()`](Self::sort_unstable); otherwise the result is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pooled_collections::PooledVec;
    ///
    /// let mut values = PooledVec::from_slice(&[42, 7, 19, 3]).unwrap();
    /// values.sort_unstable().unwrap();
    ///
    /// assert_eq!(values.sorted_index_of(&19).unwrap(), Some(2));
    /// ```
    pub fn sorted_index_of(&self, item: &T) -> Result<Option<usize>>
    where
        T: Ord,
    {
        Ok(ordered_search(self.as_view()?, item))
    }

    /// Sorts the elements in ascending order, in place and without allocating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn sort_unstable(&mut self) -> Result<()>
    where
        T: Ord,
    {
        self.as_view_mut()?.sort_unstable();
        Ok(())
    }

    /// Sorts the elements with a comparator, in place and without allocating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn sort_unstable_by<F>(&mut self, compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.as_view_mut()?.sort_unstable_by(compare);
        Ok(())
    }

    /// Reverses the order of the elements, in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn reverse(&mut self) -> Result<()> {
        self.as_view_mut()?.reverse();
        Ok(())
    }

    /// Compares the vector element-wise with any other sequence, using `eq` to compare
    /// elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn structural_eq<I, F>(&self, other: I, eq: F) -> Result<bool>
    where
        I: IntoIterator,
        F: FnMut(&T, I::Item) -> bool,
    {
        Ok(sequence_eq(self.as_view()?, other, eq))
    }

    /// Compares the vector lexicographically with any other sequence, using `cmp` to compare
    /// elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    ///
    /// use pooled_collections::PooledVec;
    ///
    /// let scores = PooledVec::from_slice(&[3.5_f64, 9.0]).unwrap();
    ///
    /// let ordering = scores
    ///     .structural_cmp([3.5, 10.0], |a, b| a.total_cmp(&b))
    ///     .unwrap();
    ///
    /// assert_eq!(ordering, Ordering::Less);
    /// ```
    pub fn structural_cmp<I, F>(&self, other: I, cmp: F) -> Result<Ordering>
    where
        I: IntoIterator,
        F: FnMut(&T, I::Item) -> Ordering,
    {
        Ok(sequence_cmp(self.as_view()?, other, cmp))
    }

    /// Feeds the length and every element to `state`, hashing elements with `hash_item`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the vector has been released.
    pub fn structural_hash<H, F>(&self, state: &mut H, hash_item: F) -> Result<()>
    where
        H: Hasher,
        F: FnMut(&T, &mut H),
    {
        sequence_hash(self.as_view()?, state, hash_item);
        Ok(())
    }

    /// Converts the vector into a fixed-length array over the same buffer, without copying.
    ///
    /// The array has the current length of the vector and keeps its release policy. A released
    /// vector becomes a released array.
    #[must_use]
    pub fn into_array(self) -> PooledArray<T, P> {
        PooledArray::from_handle(self.handle)
    }

    /// The pool the buffer is rented from.
    #[must_use]
    pub fn pool(&self) -> &P {
        self.handle.pool()
    }

    /// What happens if the vector is dropped without being released.
    #[must_use]
    pub fn release_policy(&self) -> ReleasePolicy {
        self.handle.release_policy()
    }

    /// Sets what happens if the vector is dropped without being released.
    pub fn set_release_policy(&mut self, policy: ReleasePolicy) {
        self.handle.set_release_policy(policy);
    }

    /// Returns the buffer to the pool. Any further access fails with
    /// [`Error::UseAfterRelease`]. Calling this more than once does nothing.
    pub fn release(&mut self) {
        self.handle.release();
    }

    /// Whether the buffer has been returned to the pool.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }

    pub(crate) fn view_or_empty(&self) -> &[T] {
        self.handle.as_slice().unwrap_or_default()
    }

    /// Makes room for one more element, doubling the capacity if the buffer is full.
    fn grow_if_full(&mut self) -> Result<()> {
        let capacity = self.capacity()?;

        if self.len() < capacity {
            return Ok(());
        }

        let new_capacity = if capacity == 0 {
            DEFAULT_GROWTH_CAPACITY.get()
        } else {
            capacity.checked_mul(2).ok_or(Error::CapacityOverflow {
                requested: usize::MAX,
            })?
        };

        self.handle.grow_to(new_capacity)
    }
}

impl<T> Default for PooledVec<T, SharedPool>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> PooledSequence<T> for PooledVec<T, P>
where
    P: BufferPool<T>,
{
    fn len(&self) -> usize {
        self.handle.len()
    }

    fn as_view(&self) -> Result<&[T]> {
        self.handle.as_slice()
    }

    fn as_view_mut(&mut self) -> Result<&mut [T]> {
        self.handle.as_mut_slice()
    }

    fn try_append(&mut self, item: T) -> Result<()> {
        self.append(item)
    }

    fn try_remove_at(&mut self, index: usize) -> Result<T> {
        self.remove_at(index)
    }

    fn release(&mut self) {
        self.handle.release();
    }

    fn is_released(&self) -> bool {
        self.handle.is_released()
    }
}

impl_structural_traits!(PooledVec);

impl<T, P> fmt::Debug for PooledVec<T, P>
where
    T: fmt::Debug,
    P: BufferPool<T>,
{
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("len", &self.len())
            .field("capacity", &self.capacity().ok())
            .field("released", &self.is_released())
            .field("items", &self.view_or_empty())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::hash::Hash;
    use std::iter;
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::{BucketedPool, HeapPool, impl_ordered_search};

    assert_impl_all!(PooledVec<u32>: Send, Sync, Default, fmt::Debug, Eq, Ord, Hash);
    assert_impl_all!(PooledVec<String, HeapPool>: Send, PartialEq<Vec<String>>);
    assert_not_impl_any!(PooledVec<u32>: Clone, Copy);
    assert_not_impl_any!(PooledVec<Rc<u32>, HeapPool>: Send, Sync);

    #[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
    struct Ticket(u32);

    impl_ordered_search!(Ticket);

    #[test]
    fn new_rents_nothing_until_first_append() {
        let pool = BucketedPool::<u32>::new();
        let mut values = PooledVec::<u32, _>::new_in(&pool);

        assert_eq!(values.capacity(), Ok(0));
        assert!(values.is_empty());

        values.append(1).unwrap();

        assert!(values.capacity().unwrap() >= 1);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn with_capacity_rents_at_least_requested() {
        let values = PooledVec::<u64, _>::with_capacity_in(100, HeapPool).unwrap();

        assert!(values.capacity().unwrap() >= 100);
        assert_eq!(values.len(), 0);
    }

    #[test]
    fn append_beyond_capacity_doubles() {
        let mut values = PooledVec::with_capacity_in(8, HeapPool).unwrap();
        let initial_capacity = values.capacity().unwrap();

        for value in 0..9 {
            values.append(value).unwrap();
        }

        assert_eq!(values.len(), 9);
        assert_eq!(values.get(0), Ok(&0));
        assert_eq!(values.get(8), Ok(&8));
        assert!(values.capacity().unwrap() >= initial_capacity.saturating_mul(2));
    }

    #[test]
    fn first_growth_uses_default_capacity() {
        let mut values = PooledVec::new_in(HeapPool);
        values.append('x').unwrap();

        assert!(values.capacity().unwrap() >= DEFAULT_GROWTH_CAPACITY.get());
    }

    #[test]
    fn growth_returns_old_buffer_to_pool() {
        let pool = BucketedPool::<u32>::new();
        let mut values = PooledVec::<u32, _>::with_capacity_in(16, &pool).unwrap();

        for value in 0..17 {
            values.append(value).unwrap();
        }

        assert_eq!(values.capacity(), Ok(32));
        assert_eq!(pool.rent_count(), 2);
        assert_eq!(pool.return_count(), 1);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn append_range_with_known_length_grows_once() {
        let pool = BucketedPool::<u32>::new();
        let mut values = PooledVec::<u32, _>::with_capacity_in(16, &pool).unwrap();

        values.append_range(0..100).unwrap();

        assert_eq!(values.len(), 100);
        assert_eq!(values.capacity(), Ok(128));
        assert_eq!(pool.rent_count(), 2);
        assert_eq!(values.get(99), Ok(&99));
    }

    #[test]
    fn append_range_with_unknown_length_appends_all() {
        let mut values = PooledVec::new_in(HeapPool);

        values
            .append_range((0..50).filter(|value| value % 5 == 0))
            .unwrap();

        assert_eq!(values.as_view().unwrap(), [0, 5, 10, 15, 20, 25, 30, 35, 40, 45]);
    }

    #[test]
    fn append_slice_clones_elements() {
        let mut values = PooledVec::from_slice_in(&["a".to_string()], HeapPool).unwrap();

        values
            .append_slice(&["b".to_string(), "c".to_string()])
            .unwrap();

        assert_eq!(values, ["a", "b", "c"].map(String::from));
    }

    #[test]
    fn insert_shifts_right() {
        let mut values = PooledVec::from_slice_in(&[10, 30], HeapPool).unwrap();

        values.insert(1, 20).unwrap();
        assert_eq!(values.as_view().unwrap(), [10, 20, 30]);

        values.insert(0, 0).unwrap();
        values.insert(4, 40).unwrap();
        assert_eq!(values.as_view().unwrap(), [0, 10, 20, 30, 40]);

        assert_eq!(
            values.insert(6, 60),
            Err(Error::OutOfBounds { index: 6, len: 5 })
        );
    }

    #[test]
    fn insert_at_capacity_grows() {
        let mut values = PooledVec::with_capacity_in(2, HeapPool).unwrap();
        values.append(1).unwrap();
        values.append(3).unwrap();
        let capacity = values.capacity().unwrap();

        values.insert(1, 2).unwrap();

        assert!(values.capacity().unwrap() > capacity);
        assert_eq!(values.as_view().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn insert_range_shifts_once() {
        let mut values = PooledVec::from_slice_in(&[1, 5], HeapPool).unwrap();

        values.insert_range(1, [2, 3, 4]).unwrap();
        assert_eq!(values.as_view().unwrap(), [1, 2, 3, 4, 5]);

        values.insert_range(5, iter::once(6)).unwrap();
        values.insert_range(0, iter::empty()).unwrap();
        assert_eq!(values.as_view().unwrap(), [1, 2, 3, 4, 5, 6]);

        assert_eq!(
            values.insert_range(7, [7]),
            Err(Error::OutOfBounds { index: 7, len: 6 })
        );
        assert_eq!(values.len(), 6);
    }

    #[test]
    fn insert_range_overflow_leaves_contents_unchanged() {
        let mut values = PooledVec::<u64, _>::from_slice_in(&[1, 2, 3], HeapPool).unwrap();
        let capacity = values.capacity().unwrap();

        // The length overflows `usize` when added to the current length.
        assert_eq!(
            values.insert_range(1, iter::repeat(0).take(usize::MAX)),
            Err(Error::CapacityOverflow {
                requested: usize::MAX
            })
        );
        assert_eq!(values.as_view().unwrap(), [1, 2, 3]);

        // The length fits in `usize` but not in memory.
        let too_many = isize::MAX.unsigned_abs();
        assert!(matches!(
            values.insert_range(0, iter::repeat(0).take(too_many)),
            Err(Error::CapacityOverflow { .. })
        ));
        assert_eq!(values.as_view().unwrap(), [1, 2, 3]);
        assert_eq!(values.capacity().unwrap(), capacity);
    }

    #[test]
    fn from_iter_with_unrepresentable_length_is_overflow() {
        let result = PooledVec::from_iter_in(iter::repeat(0_u64).take(usize::MAX), HeapPool);

        assert_eq!(
            result.map(|values| values.len()),
            Err(Error::CapacityOverflow {
                requested: usize::MAX
            })
        );
    }

    #[test]
    fn remove_at_shifts_left_and_drops_nothing_extra() {
        let tracker = Rc::new(());
        let mut values = PooledVec::new_in(HeapPool);

        for _ in 0..3 {
            values.append(Rc::clone(&tracker)).unwrap();
        }

        let removed = values.remove_at(1).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(Rc::strong_count(&tracker), 4);

        drop(removed);
        assert_eq!(Rc::strong_count(&tracker), 3);

        assert!(matches!(
            values.remove_at(2),
            Err(Error::OutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn search_works_for_arrays_and_shared_strings() {
        let mut pairs = PooledVec::<[u8; 2], _>::new_in(HeapPool);
        pairs.append_slice(&[[1, 2], [3, 4]]).unwrap();

        assert_eq!(pairs.index_of(&[3, 4]), Ok(Some(1)));
        assert!(pairs.remove(&[1, 2]).unwrap());
        assert_eq!(pairs.as_view().unwrap(), [[3, 4]]);

        let names = PooledVec::from_iter_in(
            ["ann", "bob"].map(std::sync::Arc::<str>::from),
            HeapPool,
        )
        .unwrap();

        assert_eq!(names.contains(&std::sync::Arc::from("bob")), Ok(true));
        assert_eq!(names.contains(&std::sync::Arc::from("cyd")), Ok(false));
    }

    #[test]
    fn position_needs_only_partial_eq() {
        // No `Searchable` implementation, so only `position()` can search it.
        #[derive(Clone, Debug, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        let mut points = PooledVec::new_in(HeapPool);
        points.append(Point { x: 1, y: 2 }).unwrap();
        points.append(Point { x: 3, y: 4 }).unwrap();

        assert_eq!(points.position(&Point { x: 3, y: 4 }), Ok(Some(1)));
        assert_eq!(points.position(&Point { x: 5, y: 6 }), Ok(None));

        points.release();
        assert_eq!(
            points.position(&Point { x: 1, y: 2 }),
            Err(Error::UseAfterRelease)
        );
    }

    #[test]
    fn remove_finds_first_match() {
        let mut values = PooledVec::from_slice_in(&[10, 20, 30, 20], HeapPool).unwrap();

        assert_eq!(values.remove(&20), Ok(true));
        assert_eq!(values.as_view().unwrap(), [10, 30, 20]);

        assert_eq!(values.remove(&40), Ok(false));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn remove_with_ordered_search_misses_in_unsorted_data() {
        let mut tickets = PooledVec::from_slice_in(&[Ticket(5), Ticket(9), Ticket(1)], HeapPool)
            .unwrap();

        // The element type declares its data sorted, which this vector violates.
        assert_eq!(tickets.remove(&Ticket(1)), Ok(false));

        tickets.sort_unstable().unwrap();
        assert_eq!(tickets.remove(&Ticket(1)), Ok(true));
        assert_eq!(tickets.as_view().unwrap(), [Ticket(5), Ticket(9)]);
    }

    #[test]
    fn remove_range_drains_window() {
        let mut values = PooledVec::from_iter_in(0..10, HeapPool).unwrap();

        values.remove_range(2..8).unwrap();
        assert_eq!(values.as_view().unwrap(), [0, 1, 8, 9]);

        values.remove_range(..).unwrap();
        assert!(values.is_empty());

        assert_eq!(
            values.remove_range(0..1),
            Err(Error::OutOfBounds { index: 1, len: 0 })
        );
    }

    #[test]
    fn truncate_pop_and_clear_keep_capacity() {
        let mut values = PooledVec::from_iter_in(0..10, HeapPool).unwrap();
        let capacity = values.capacity().unwrap();

        values.truncate(20).unwrap();
        assert_eq!(values.len(), 10);

        values.truncate(3).unwrap();
        assert_eq!(values.pop(), Ok(Some(2)));
        assert_eq!(values.as_view().unwrap(), [0, 1]);

        values.clear().unwrap();
        assert!(values.is_empty());
        assert_eq!(values.pop(), Ok(None));
        assert_eq!(values.capacity(), Ok(capacity));
    }

    #[test]
    fn clear_drops_elements() {
        let tracker = Rc::new(());
        let mut values = PooledVec::new_in(HeapPool);
        values.append(Rc::clone(&tracker)).unwrap();

        values.clear().unwrap();

        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn reserve_grows_exactly() {
        let mut values = PooledVec::<u8, _>::new_in(HeapPool);

        values.reserve(37).unwrap();
        assert!(values.capacity().unwrap() >= 37);

        let capacity = values.capacity().unwrap();
        values.reserve(capacity).unwrap();
        assert_eq!(values.capacity(), Ok(capacity));
    }

    #[test]
    fn reserve_overflow_is_reported() {
        let mut values = PooledVec::<u64, _>::from_slice_in(&[1], HeapPool).unwrap();

        assert!(matches!(
            values.reserve(usize::MAX),
            Err(Error::CapacityOverflow { .. })
        ));
        assert!(matches!(
            values.reserve(isize::MAX.unsigned_abs()),
            Err(Error::CapacityOverflow { .. })
        ));
        assert_eq!(values.as_view().unwrap(), [1]);
    }

    #[test]
    fn shrink_to_fit_moves_to_smaller_buffer() {
        let pool = BucketedPool::<u32>::new();
        let mut values = PooledVec::<u32, _>::with_capacity_in(1000, &pool).unwrap();
        values.append_range(0..10).unwrap();

        values.shrink_to_fit().unwrap();

        assert_eq!(values.capacity(), Ok(16));
        assert_eq!(values.len(), 10);
        assert_eq!(values.get(9), Ok(&9));
        assert_eq!(pool.return_count(), 1);
    }

    #[test]
    fn shrink_to_fit_keeps_buffer_when_nothing_smaller() {
        let pool = BucketedPool::<u32>::new();
        let mut values = PooledVec::<u32, _>::with_capacity_in(16, &pool).unwrap();
        values.append(1).unwrap();

        values.shrink_to_fit().unwrap();

        assert_eq!(values.capacity(), Ok(16));
        assert_eq!(pool.rent_count(), pool.return_count().saturating_add(1));
    }

    #[test]
    fn slice_is_independent_vector() {
        let source = PooledVec::from_slice_in(&[1, 2, 3, 4], HeapPool).unwrap();

        let mut slice = source.slice(1..3).unwrap();
        slice.append(99).unwrap();

        assert_eq!(slice.as_view().unwrap(), [2, 3, 99]);
        assert_eq!(source.as_view().unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn try_clone_keeps_capacity_and_policy() {
        let mut source = PooledVec::with_capacity_in(40, HeapPool).unwrap();
        source.append_slice(&[1, 2]).unwrap();
        source.set_release_policy(ReleasePolicy::MustReleaseExplicitly);

        let mut clone = source.try_clone().unwrap();

        assert_eq!(clone.capacity(), source.capacity());
        assert_eq!(clone, source);
        assert_eq!(clone.release_policy(), ReleasePolicy::MustReleaseExplicitly);

        clone.release();
        source.release();
    }

    #[test]
    fn views_follow_count_not_capacity() {
        let mut values = PooledVec::with_capacity_in(64, HeapPool).unwrap();
        values.append_slice(&[1, 2, 3]).unwrap();

        assert_eq!(values.as_view().unwrap().len(), 3);
        assert_eq!(values.as_view_from(1).unwrap(), [2, 3]);
        assert_eq!(values.as_view_range(1, 1).unwrap(), [2]);
        assert!(values.as_view_from(4).is_err());
        assert!(values.as_view_range(2, 2).is_err());

        values.as_view_mut_from(2).unwrap().fill(0);
        values.as_view_mut_range(0, 1).unwrap().fill(7);
        assert_eq!(values.as_view().unwrap(), [7, 2, 0]);
    }

    #[test]
    fn reorderings_work_in_place() {
        let mut values = PooledVec::from_slice_in(&[3, 1, 2], HeapPool).unwrap();

        values.sort_unstable().unwrap();
        assert_eq!(values.as_view().unwrap(), [1, 2, 3]);

        values.sort_unstable_by(|a, b| b.cmp(a)).unwrap();
        assert_eq!(values.as_view().unwrap(), [3, 2, 1]);

        values.reverse().unwrap();
        assert_eq!(values.as_view().unwrap(), [1, 2, 3]);
        assert_eq!(values.sorted_index_of(&3), Ok(Some(2)));
    }

    #[test]
    fn into_array_reuses_buffer() {
        let pool = BucketedPool::<u32>::new();
        let mut values = PooledVec::<u32, _>::with_capacity_in(16, &pool).unwrap();
        values.append_slice(&[4, 5, 6]).unwrap();

        let array = values.into_array();

        assert_eq!(array.len(), 3);
        assert_eq!(array.capacity(), Ok(16));
        assert_eq!(array.as_view().unwrap(), [4, 5, 6]);
        assert_eq!(pool.rent_count(), 1);
        assert_eq!(pool.return_count(), 0);
    }

    #[test]
    fn every_access_after_release_fails() {
        let mut values = PooledVec::from_slice_in(&[1, 2, 3], HeapPool).unwrap();
        values.release();

        assert!(values.is_released());
        assert_eq!(values.len(), 0);
        assert_eq!(values.append(4), Err(Error::UseAfterRelease));
        assert_eq!(values.append_range([4, 5]), Err(Error::UseAfterRelease));
        assert_eq!(values.append_slice(&[4]), Err(Error::UseAfterRelease));
        assert_eq!(values.insert(0, 4), Err(Error::UseAfterRelease));
        assert_eq!(values.insert_range(0, [4]), Err(Error::UseAfterRelease));
        assert_eq!(values.remove_at(0), Err(Error::UseAfterRelease));
        assert_eq!(values.remove(&1), Err(Error::UseAfterRelease));
        assert_eq!(values.remove_range(..), Err(Error::UseAfterRelease));
        assert_eq!(values.truncate(0), Err(Error::UseAfterRelease));
        assert_eq!(values.pop(), Err(Error::UseAfterRelease));
        assert_eq!(values.clear(), Err(Error::UseAfterRelease));
        assert_eq!(values.reserve(1), Err(Error::UseAfterRelease));
        assert_eq!(values.shrink_to_fit(), Err(Error::UseAfterRelease));
        assert_eq!(values.get(0), Err(Error::UseAfterRelease));
        assert_eq!(values.set(0, 1), Err(Error::UseAfterRelease));
        assert_eq!(values.index_of(&1), Err(Error::UseAfterRelease));
        assert_eq!(values.contains(&1), Err(Error::UseAfterRelease));
        assert_eq!(values.sort_unstable(), Err(Error::UseAfterRelease));
        assert!(matches!(values.iter(), Err(Error::UseAfterRelease)));
        assert!(matches!(values.slice(..), Err(Error::UseAfterRelease)));
        assert!(matches!(values.try_clone(), Err(Error::UseAfterRelease)));

        values.release();
        assert!(values.is_released());

        let array = values.into_array();
        assert!(array.is_released());
    }

    #[test]
    fn released_vectors_compare_as_empty() {
        let mut released = PooledVec::from_slice_in(&[1], HeapPool).unwrap();
        released.release();

        let empty = PooledVec::<i32, _>::new_in(HeapPool);

        assert_eq!(released, empty);
    }

    #[test]
    fn sequence_trait_forwards_to_vector() {
        let mut values = PooledVec::<u8, _>::new_in(HeapPool);

        values.try_append(1).unwrap();
        values.try_append(2).unwrap();
        assert_eq!(values.try_remove_at(0), Ok(1));
        assert_eq!(PooledSequence::len(&values), 1);

        PooledSequence::release(&mut values);
        assert!(PooledSequence::is_released(&values));
    }

    #[test]
    fn drop_returns_every_rented_buffer() {
        let pool = BucketedPool::<u64>::new();

        {
            let mut values = PooledVec::<u64, _>::new_in(&pool);
            values.append_range(0..1000).unwrap();
            values.append(1000).unwrap();
        }

        assert_eq!(pool.rent_count(), pool.return_count());
    }
}
