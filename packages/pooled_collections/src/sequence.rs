use std::cmp::Ordering;
use std::hash::Hasher;
use std::ops::{Bound, Range, RangeBounds};

use crate::{Error, Result};

/// Behavior shared by the pooled containers, for code that works with either of them.
///
/// Length-changing operations are part of the trait so that generic code can attempt them, but
/// fixed-length containers reject them with [`Error::UnsupportedOperation`].
///
/// # Example
///
/// ```rust
/// use pooled_collections::{Error, PooledArray, PooledSequence, PooledVec};
///
/// fn push_marker(sequence: &mut impl PooledSequence<u8>) -> Result<(), Error> {
///     sequence.try_append(0xFF)
/// }
///
/// let mut growable = PooledVec::<u8>::new();
/// assert!(push_marker(&mut growable).is_ok());
///
/// let mut fixed = PooledArray::<u8>::with_len(4).unwrap();
/// assert!(matches!(
///     push_marker(&mut fixed),
///     Err(Error::UnsupportedOperation { .. })
/// ));
/// ```
pub trait PooledSequence<T> {
    /// Number of elements in the sequence.
    fn len(&self) -> usize;

    /// Whether the sequence has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The elements of the sequence, without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the sequence has been released.
    fn as_view(&self) -> Result<&[T]>;

    /// The elements of the sequence, mutably and without copying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterRelease`] if the sequence has been released.
    fn as_view_mut(&mut self) -> Result<&mut [T]>;

    /// Appends an element to the end of the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for fixed-length sequences, otherwise the errors
    /// of the container's own append operation.
    fn try_append(&mut self, item: T) -> Result<()>;

    /// Removes and returns the element at `index`, shifting later elements left.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for fixed-length sequences, otherwise the errors
    /// of the container's own removal operation.
    fn try_remove_at(&mut self, index: usize) -> Result<T>;

    /// Returns the buffer to its pool. Idempotent.
    fn release(&mut self);

    /// Whether the buffer has been returned to its pool.
    fn is_released(&self) -> bool;
}

/// Fails with [`Error::OutOfBounds`] unless `index < len`.
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::OutOfBounds { index, len })
    }
}

/// Fails with [`Error::OutOfBounds`] unless `index <= len`, i.e. unless `index` is a valid
/// insertion position.
pub(crate) fn check_position(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(Error::OutOfBounds { index, len })
    }
}

/// Converts any range expression into a concrete range within `0..=len`.
///
/// An inverted range is an [`Error::InvalidArgument`]; a range reaching past `len` is
/// [`Error::OutOfBounds`].
pub(crate) fn resolve_range(range: impl RangeBounds<usize>, len: usize) -> Result<Range<usize>> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.checked_add(1).ok_or(Error::OutOfBounds {
            index: start,
            len,
        })?,
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(&end) => end
            .checked_add(1)
            .ok_or(Error::OutOfBounds { index: end, len })?,
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    if start > end {
        return Err(Error::InvalidArgument {
            problem: format!("range start {start} is greater than range end {end}"),
        });
    }

    check_position(end, len)?;

    Ok(start..end)
}

/// Converts a `start` + `length` window into a range within `0..=len`.
pub(crate) fn resolve_window(start: usize, length: usize, len: usize) -> Result<Range<usize>> {
    check_position(start, len)?;

    let end = start.checked_add(length).ok_or(Error::OutOfBounds {
        index: usize::MAX,
        len,
    })?;
    check_position(end, len)?;

    Ok(start..end)
}

/// Clones all of `source` into `destination`, starting at `destination_index`.
pub(crate) fn copy_into<T>(source: &[T], destination: &mut [T], destination_index: usize) -> Result<()>
where
    T: Clone,
{
    let destination_len = destination.len();
    let target = resolve_window(destination_index, source.len(), destination_len).map_err(|_| {
        Error::InvalidArgument {
            problem: format!(
                "destination of length {destination_len} cannot hold {} elements at index {destination_index}",
                source.len()
            ),
        }
    })?;

    destination
        .get_mut(target)
        .expect("window was validated against the destination length")
        .clone_from_slice(source);

    Ok(())
}

/// Element-wise equality of `left` and any other sequence, using a caller-supplied comparator.
///
/// The sequences are equal if they have the same number of elements and every pair of elements
/// at the same position is equal.
pub(crate) fn sequence_eq<T, I, F>(left: &[T], right: I, mut eq: F) -> bool
where
    I: IntoIterator,
    F: FnMut(&T, I::Item) -> bool,
{
    let mut right = right.into_iter();

    for item in left {
        let Some(other) = right.next() else {
            return false;
        };

        if !eq(item, other) {
            return false;
        }
    }

    right.next().is_none()
}

/// Lexicographic comparison of `left` and any other sequence, using a caller-supplied
/// comparator. A sequence that is a prefix of the other orders first.
pub(crate) fn sequence_cmp<T, I, F>(left: &[T], right: I, mut cmp: F) -> Ordering
where
    I: IntoIterator,
    F: FnMut(&T, I::Item) -> Ordering,
{
    let mut right = right.into_iter();

    for item in left {
        let Some(other) = right.next() else {
            return Ordering::Greater;
        };

        match cmp(item, other) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
    }

    if right.next().is_some() {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Feeds the length and then every element of `items` to `state`, the latter through a
/// caller-supplied element hasher.
pub(crate) fn sequence_hash<T, H, F>(items: &[T], state: &mut H, mut hash_item: F)
where
    H: Hasher,
    F: FnMut(&T, &mut H),
{
    state.write_usize(items.len());

    for item in items {
        hash_item(item, state);
    }
}

/// Implements the standard comparison and hashing traits for a pooled container in terms of
/// its structural comparison. A released container behaves as an empty sequence here, because
/// these traits cannot report errors.
macro_rules! impl_structural_traits {
    ($container:ident) => {
        impl<T, U, P, Q> ::std::cmp::PartialEq<$container<U, Q>> for $container<T, P>
        where
            T: ::std::cmp::PartialEq<U>,
            P: $crate::BufferPool<T>,
            Q: $crate::BufferPool<U>,
        {
            fn eq(&self, other: &$container<U, Q>) -> bool {
                self.view_or_empty() == other.view_or_empty()
            }
        }

        impl<T, U, P> ::std::cmp::PartialEq<[U]> for $container<T, P>
        where
            T: ::std::cmp::PartialEq<U>,
            P: $crate::BufferPool<T>,
        {
            fn eq(&self, other: &[U]) -> bool {
                self.view_or_empty() == other
            }
        }

        impl<T, U, P, const N: usize> ::std::cmp::PartialEq<[U; N]> for $container<T, P>
        where
            T: ::std::cmp::PartialEq<U>,
            P: $crate::BufferPool<T>,
        {
            fn eq(&self, other: &[U; N]) -> bool {
                self.view_or_empty() == other.as_slice()
            }
        }

        impl<T, U, P> ::std::cmp::PartialEq<Vec<U>> for $container<T, P>
        where
            T: ::std::cmp::PartialEq<U>,
            P: $crate::BufferPool<T>,
        {
            fn eq(&self, other: &Vec<U>) -> bool {
                self.view_or_empty() == other.as_slice()
            }
        }

        impl<T, P> ::std::cmp::Eq for $container<T, P>
        where
            T: ::std::cmp::Eq,
            P: $crate::BufferPool<T>,
        {
        }

        impl<T, P> ::std::cmp::PartialOrd for $container<T, P>
        where
            T: ::std::cmp::PartialOrd,
            P: $crate::BufferPool<T>,
        {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                self.view_or_empty().partial_cmp(other.view_or_empty())
            }
        }

        impl<T, P> ::std::cmp::Ord for $container<T, P>
        where
            T: ::std::cmp::Ord,
            P: $crate::BufferPool<T>,
        {
            fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                self.view_or_empty().cmp(other.view_or_empty())
            }
        }

        impl<T, P> ::std::hash::Hash for $container<T, P>
        where
            T: ::std::hash::Hash,
            P: $crate::BufferPool<T>,
        {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                $crate::sequence::sequence_hash(self.view_or_empty(), state, |item, state| {
                    ::std::hash::Hash::hash(item, state);
                });
            }
        }
    };
}

pub(crate) use impl_structural_traits;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::hash::{BuildHasher, Hash};

    use foldhash::fast::FixedState;

    use super::*;

    #[test]
    fn check_index_rejects_len_and_beyond() {
        assert!(check_index(0, 1).is_ok());
        assert_eq!(check_index(1, 1), Err(Error::OutOfBounds { index: 1, len: 1 }));
        assert!(check_index(0, 0).is_err());
    }

    #[test]
    fn check_position_accepts_len() {
        assert!(check_position(1, 1).is_ok());
        assert!(check_position(0, 0).is_ok());
        assert_eq!(
            check_position(2, 1),
            Err(Error::OutOfBounds { index: 2, len: 1 })
        );
    }

    #[test]
    fn resolve_range_handles_all_bound_kinds() {
        assert_eq!(resolve_range(1..3, 4), Ok(1..3));
        assert_eq!(resolve_range(1..=3, 4), Ok(1..4));
        assert_eq!(resolve_range(..2, 4), Ok(0..2));
        assert_eq!(resolve_range(2.., 4), Ok(2..4));
        assert_eq!(resolve_range(.., 4), Ok(0..4));
        assert_eq!(resolve_range(4..4, 4), Ok(4..4));
        assert_eq!(
            resolve_range((Bound::Excluded(0), Bound::Unbounded), 4),
            Ok(1..4)
        );
    }

    #[test]
    fn resolve_range_rejects_bad_ranges() {
        assert_eq!(
            resolve_range(0..5, 4),
            Err(Error::OutOfBounds { index: 5, len: 4 })
        );
        let (start, end) = (3, 1);
        assert!(matches!(
            resolve_range(start..end, 4),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(resolve_range(0..=usize::MAX, 4).is_err());
    }

    #[test]
    fn resolve_window_checks_both_ends() {
        assert_eq!(resolve_window(1, 2, 4), Ok(1..3));
        assert_eq!(resolve_window(4, 0, 4), Ok(4..4));
        assert!(resolve_window(5, 0, 4).is_err());
        assert!(resolve_window(3, 2, 4).is_err());
        assert!(resolve_window(1, usize::MAX, 4).is_err());
    }

    #[test]
    fn copy_into_writes_at_offset() {
        let mut destination = [0, 0, 0, 0, 0];
        copy_into(&[7, 8], &mut destination, 2).unwrap();
        assert_eq!(destination, [0, 0, 7, 8, 0]);

        assert!(matches!(
            copy_into(&[7, 8], &mut destination, 4),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn sequence_eq_compares_length_and_elements() {
        let eq = |a: &u32, b: &u32| a == b;

        assert!(sequence_eq(&[1, 2, 3], &[1, 2, 3], eq));
        assert!(!sequence_eq(&[1, 2, 3], &[1, 2], eq));
        assert!(!sequence_eq(&[1, 2], &[1, 2, 3], eq));
        assert!(!sequence_eq(&[1, 2, 3], &[1, 5, 3], eq));
        assert!(sequence_eq::<u32, _, _>(&[], &[], eq));
    }

    #[test]
    fn sequence_eq_uses_comparator() {
        let words = ["Hello", "WORLD"];

        assert!(sequence_eq(&words, ["hello", "world"], |a, b| {
            a.eq_ignore_ascii_case(b)
        }));
    }

    #[test]
    fn sequence_eq_consumes_owned_items() {
        let words = ["a", "b"];
        let owned = || vec!["a".to_string(), "b".to_string()];

        assert!(sequence_eq(&words, owned(), |a, b: String| *a == b));
        assert!(!sequence_eq(&words[..1], owned(), |a, b: String| *a == b));
        assert!(!sequence_eq(&words, vec!["a".to_string(), "c".to_string()], |a, b: String| {
            *a == b
        }));
    }

    #[test]
    fn sequence_cmp_is_lexicographic() {
        let cmp = |a: &u32, b: &u32| a.cmp(b);

        assert_eq!(sequence_cmp(&[1, 2], &[1, 2], cmp), Ordering::Equal);
        assert_eq!(sequence_cmp(&[1, 2], &[1, 3], cmp), Ordering::Less);
        assert_eq!(sequence_cmp(&[2], &[1, 3], cmp), Ordering::Greater);
        assert_eq!(sequence_cmp(&[1], &[1, 3], cmp), Ordering::Less);
        assert_eq!(sequence_cmp(&[1, 3], &[1], cmp), Ordering::Greater);
    }

    #[test]
    fn sequence_hash_distinguishes_length() {
        let hasher = FixedState::with_seed(42);

        let hash_of = |items: &[u8]| {
            let mut state = hasher.build_hasher();
            sequence_hash(items, &mut state, |item, state| item.hash(state));
            state.finish()
        };

        assert_eq!(hash_of(&[1, 2]), hash_of(&[1, 2]));
        assert_ne!(hash_of(&[1, 2]), hash_of(&[1, 2, 0]));
    }
}
