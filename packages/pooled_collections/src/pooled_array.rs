use std::any::type_name;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;
use std::ops::RangeBounds;
use std::slice;

use crate::sequence::{
    copy_into, impl_structural_traits, resolve_range, resolve_window, sequence_cmp, sequence_eq,
    sequence_hash,
};
use crate::{
    BufferHandle, BufferPool, Error, PooledSequence, PooledVec, ReleasePolicy, Result,
    Searchable, SharedPool, linear_search, ordered_search,
};

/// A fixed-length array whose storage is rented from a [`BufferPool`].
///
/// The length is set at construction and never changes; to add or remove elements use
/// [`PooledVec`] instead. Elements can be read and overwritten through bounds-checked accessors
/// or through slices that borrow the live window without copying.
///
/// The storage goes back to the pool when the array is released or dropped. Every access after
/// [`release()`](Self::release) fails with [`Error::UseAfterRelease`].
///
/// # Examples
///
/// ```rust
/// use pooled_collections::PooledArray;
///
/// let mut squares = PooledArray::<u64>::with_len(5).unwrap();
///
/// for (index, square) in squares.iter_mut().unwrap().enumerate() {
///     *square = (index as u64).pow(2);
/// }
///
/// assert_eq!(squares.get(3).unwrap(), &9);
/// assert_eq!(squares.as_view().unwrap(), [0, 1, 4, 9, 16]);
/// ```
///
/// Slices are independent copies:
///
/// ```rust
/// use pooled_collections::PooledArray;
///
/// let source = PooledArray::from_slice(&[10, 20, 30, 40]).unwrap();
/// let mut middle = source.slice(1..3).unwrap();
///
/// middle.set(0, 99).unwrap();
///
/// assert_eq!(middle.as_view().unwrap(), [99, 30]);
/// assert_eq!(source.as_view().unwrap(), [10, 20, 30, 40]);
/// ```
pub struct PooledArray<T, P = SharedPool>
where
    P: BufferPool<T>,
{
    handle: BufferHandle<T, P>,

    // Fixed at construction. The buffer holds exactly this many elements until released.
    len: usize,
}

impl<T> PooledArray<T, SharedPool>
where
    T: Send + 'static,
{
    /// Creates an array of `len` default-valued elements using the shared pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `len` elements cannot be represented in memory.
    pub fn with_len(len: usize) -> Result<Self>
    where
        T: Default,
    {
        Self::with_len_in(len, SharedPool)
    }

    /// Creates an array of `len` clones of `value` using the shared pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `len` elements cannot be represented in memory.
    pub fn filled(len: usize, value: T) -> Result<Self>
    where
        T: Clone,
    {
        Self::filled_in(len, value, SharedPool)
    }

    /// Creates an array holding clones of the elements of `items` using the shared pool.
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
}

impl<T, P> PooledArray<T, P>
where
    P: BufferPool<T>,
{
    /// Creates an array of `len` default-valued elements using the given pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `len` elements cannot be represented in memory.
    pub fn with_len_in(len: usize, pool: P) -> Result<Self>
    where
        T: Default,
    {
        let mut handle = BufferHandle::acquire(len, pool)?;
        handle.buffer_mut()?.resize_with(len, T::default);

        Ok(Self::from_handle(handle))
    }

    /// Creates an array of `len` clones of `value` using the given pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `len` elements cannot be represented in memory.
    pub fn filled_in(len: usize, value: T, pool: P) -> Result<Self>
    where
        T: Clone,
    {
        let mut handle = BufferHandle::acquire(len, pool)?;
        handle.buffer_mut()?.resize(len, value);

        Ok(Self::from_handle(handle))
    }

    /// Creates an array holding clones of the elements of `items` using the given pool.
    ///
    /// # Errors
    ///
    /// This function currently does not fail for any slice but reports errors of the
    /// underlying buffer acquisition.
    pub fn from_slice_in(items: &[T], pool: P) -> Result<Self>
    where
        T: Clone,
    {
        let mut handle = BufferHandle::acquire(items.len(), pool)?;
        handle.buffer_mut()?.extend_from_slice(items);

        Ok(Self::from_handle(handle))
    }

    /// Creates an array holding the items of any finite iterable using the given pool.
    ///
    /// If the iterator does not report its exact length up front, the storage grows as items
    /// arrive, exactly like [`PooledVec::append_range()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the items cannot be represented in memory.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pooled_collections::{HeapPool, PooledArray};
    ///
    /// let evens = PooledArray::from_iter_in((0..10).filter(|n| n % 2 == 0), HeapPool).unwrap();
    ///
    /// assert_eq!(evens.as_view().unwrap(), [0, 2, 4, 6, 8]);
    /// ```
    pub fn from_iter_in<I>(items: I, pool: P) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        PooledVec::from_iter_in(items, pool).map(PooledVec::into_array)
    }

    /// Takes over a handle, fixing the length at the number of elements it currently holds.
    pub(crate) fn from_handle(handle: BufferHandle<T, P>) -> Self {
        let len = handle.len();

        Self { handle, len }
    }

    /// Number of elements in the array, as fixed at construction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the rented buffer can hold. At least [`len()`](Self::len).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn capacity(&self) -> Result<usize> {
        self.handle.capacity()
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released and
    /// [`Error::OutOfBounds`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&T> {
        let len = self.len;

        self.as_view()?
            .get(index)
            .ok_or(Error::OutOfBounds { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released and
    /// [`Error::OutOfBounds`] if `index >= len()`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;

        self.as_view_mut()?
            .get_mut(index)
            .ok_or(Error::OutOfBounds { index, len })
    }

    /// Overwrites the element at `index`, dropping the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released and
    /// [`Error::OutOfBounds`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Borrows all elements as a slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn as_view(&self) -> Result<&[T]> {
        self.handle.as_slice()
    }

    /// Borrows the elements from `start` to the end as a slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released and
    /// [`Error::OutOfBounds`] if `start > len()`.
    pub fn as_view_from(&self, start: usize) -> Result<&[T]> {
        let view = self.as_view()?;
        let range = resolve_window(start, self.len.saturating_sub(start), self.len)?;

        Ok(view.get(range).expect("window was validated against the length"))
    }

    /// Borrows `length` elements starting at `start` as a slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released and
    /// [`Error::OutOfBounds`] if the window does not fit within the array.
    pub fn as_view_range(&self, start: usize, length: usize) -> Result<&[T]> {
        let view = self.as_view()?;
        let range = resolve_window(start, length, self.len)?;

        Ok(view.get(range).expect("window was validated against the length"))
    }

    /// Borrows all elements as a mutable slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn as_view_mut(&mut self) -> Result<&mut [T]> {
        self.handle.as_mut_slice()
    }

    /// Borrows the elements from `start` to the end as a mutable slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released and
    /// [`Error::OutOfBounds`] if `start > len()`.
    pub fn as_view_mut_from(&mut self, start: usize) -> Result<&mut [T]> {
        let len = self.len;
        let view = self.as_view_mut()?;
        let range = resolve_window(start, len.saturating_sub(start), len)?;

        Ok(view
            .get_mut(range)
            .expect("window was validated against the length"))
    }

    /// Borrows `length` elements starting at `start` as a mutable slice, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released and
    /// [`Error::OutOfBounds`] if the window does not fit within the array.
    pub fn as_view_mut_range(&mut self, start: usize, length: usize) -> Result<&mut [T]> {
        let len = self.len;
        let view = self.as_view_mut()?;
        let range = resolve_window(start, length, len)?;

        Ok(view
            .get_mut(range)
            .expect("window was validated against the length"))
    }

    /// Iterates over the elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn iter(&self) -> Result<slice::Iter<'_, T>> {
        self.as_view().map(<[T]>::iter)
    }

    /// Iterates over the elements, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn iter_mut(&mut self) -> Result<slice::IterMut<'_, T>> {
        self.as_view_mut().map(<[T]>::iter_mut)
    }

    /// Copies the elements in `range` into a new, independent array with its own buffer rented
    /// from the same pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released,
    /// [`Error::InvalidArgument`] if the range is inverted and [`Error::OutOfBounds`] if it
    /// reaches past the end of the array.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Result<Self>
    where
        T: Clone,
        P: Clone,
    {
        let view = self.as_view()?;
        let range = resolve_range(range, self.len)?;
        let selected = view.get(range).expect("range was validated against the length");

        Self::from_slice_in(selected, self.handle.pool().clone())
    }

    /// Creates a copy of the array with its own buffer of the same capacity, rented from the same
    /// pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        P: Clone,
    {
        let view = self.as_view()?;

        let mut handle = BufferHandle::acquire(self.capacity()?, self.handle.pool().clone())?;
        handle.set_release_policy(self.handle.release_policy());
        handle.buffer_mut()?.extend_from_slice(view);

        Ok(Self::from_handle(handle))
    }

    /// Clones all elements into `destination`, starting at `destination_index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released and
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
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn to_vec(&self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        self.as_view().map(<[T]>::to_vec)
    }

    /// Overwrites every element with a clone of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn fill(&mut self, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.as_view_mut()?.fill(value);
        Ok(())
    }

    /// Returns the index of the first element equal to `item`, searching with the strategy
    /// declared by the element type's [`Searchable`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
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
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
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
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn position(&self, item: &T) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        Ok(linear_search(self.as_view()?, item))
    }

    /// Returns the index of the first element equal to `item` using binary search, regardless
    /// of the strategy declared by the element type.
    ///
    /// The elements must be sorted in ascending order; otherwise the result is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn sorted_index_of(&self, item: &T) -> Result<Option<usize>>
    where
        T: Ord,
    {
        Ok(ordered_search(self.as_view()?, item))
    }

    /// Compares the array element-wise with any other sequence, using `eq` to compare elements.
    ///
    /// The sequences are equal if they have the same length and all elements at the same
    /// position are equal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pooled_collections::PooledArray;
    ///
    /// let names = PooledArray::from_slice(&["Ada", "Grace"]).unwrap();
    ///
    /// let same = names
    ///     .structural_eq(["ada", "GRACE"], |a, b| a.eq_ignore_ascii_case(b))
    ///     .unwrap();
    ///
    /// assert!(same);
    /// ```
    pub fn structural_eq<I, F>(&self, other: I, eq: F) -> Result<bool>
    where
        I: IntoIterator,
        F: FnMut(&T, I::Item) -> bool,
    {
        Ok(sequence_eq(self.as_view()?, other, eq))
    }

    /// Compares the array lexicographically with any other sequence, using `cmp` to compare
    /// elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
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
    /// Returns [`Error::UseAfterRelease`] if the array has been released.
    pub fn structural_hash<H, F>(&self, state: &mut H, hash_item: F) -> Result<()>
    where
        H: Hasher,
        F: FnMut(&T, &mut H),
    {
        sequence_hash(self.as_view()?, state, hash_item);
        Ok(())
    }

    /// The pool the buffer is rented from.
    #[must_use]
    pub fn pool(&self) -> &P {
        self.handle.pool()
    }

    /// What happens if the array is dropped without being released.
    #[must_use]
    pub fn release_policy(&self) -> ReleasePolicy {
        self.handle.release_policy()
    }

    /// Sets what happens if the array is dropped without being released.
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
}

impl<T, P> PooledSequence<T> for PooledArray<T, P>
where
    P: BufferPool<T>,
{
    fn len(&self) -> usize {
        self.len
    }

    fn as_view(&self) -> Result<&[T]> {
        self.handle.as_slice()
    }

    fn as_view_mut(&mut self) -> Result<&mut [T]> {
        self.handle.as_mut_slice()
    }

    fn try_append(&mut self, _item: T) -> Result<()> {
        Err(Error::UnsupportedOperation {
            operation: "append",
        })
    }

    fn try_remove_at(&mut self, _index: usize) -> Result<T> {
        Err(Error::UnsupportedOperation {
            operation: "remove_at",
        })
    }

    fn release(&mut self) {
        self.handle.release();
    }

    fn is_released(&self) -> bool {
        self.handle.is_released()
    }
}

impl_structural_traits!(PooledArray);

impl<T, P> fmt::Debug for PooledArray<T, P>
where
    T: fmt::Debug,
    P: BufferPool<T>,
{
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("len", &self.len)
            .field("released", &self.is_released())
            .field("items", &self.view_or_empty())
            .finish()
    }
}
