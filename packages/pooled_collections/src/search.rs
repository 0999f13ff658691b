//! Selection of the search algorithm used by `index_of()`, `contains()` and `remove()`.
//!
//! The algorithm is a property of the element type, declared once through the [`Searchable`]
//! trait and resolved at compile time - there is no per-call or per-container capability probing.

use std::any::TypeId;
use std::borrow::Cow;
use std::cmp::{Ordering, Reverse};
use std::collections::VecDeque;
use std::ffi::{CString, OsString};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::num::{NonZero, Wrapping};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// The search algorithm bound to an element type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum SearchStrategy {
    /// Scans every element in order. Correct for any data.
    Linear,

    /// Binary search. Only correct if the elements are sorted in ascending order, which is
    /// neither verified nor enforced.
    Ordered,
}

/// Declares how pooled containers search for elements of this type.
///
/// All implementations provided by this crate use [`SearchStrategy::Linear`], which is correct
/// for any element order. An element type can opt into [`SearchStrategy::Ordered`] with
/// [`impl_ordered_search!`][crate::impl_ordered_search] - doing so is an assertion that every
/// container of that type is kept sorted in ascending order. Searching unsorted data of an
/// ordered type yields unspecified results (a missed match, never a wrong index).
///
/// # Examples
///
/// ```rust
/// use pooled_collections::{PooledVec, SearchStrategy, Searchable, impl_ordered_search};
///
/// #[derive(Debug, Eq, Ord, PartialEq, PartialOrd)]
/// struct Timestamp(u64);
///
/// // Timestamps are only ever appended in ascending order, so binary search is safe.
/// impl_ordered_search!(Timestamp);
///
/// assert_eq!(Timestamp::STRATEGY, SearchStrategy::Ordered);
///
/// let mut log = PooledVec::new();
/// for t in [10, 20, 30, 40] {
///     log.append(Timestamp(t)).unwrap();
/// }
///
/// assert_eq!(log.index_of(&Timestamp(30)).unwrap(), Some(2));
/// ```
pub trait Searchable: PartialEq + Sized {
    /// The strategy [`locate()`](Self::locate) uses.
    const STRATEGY: SearchStrategy;

    /// Returns the index of the first element equal to `item`, if any.
    fn locate(items: &[Self], item: &Self) -> Option<usize>;
}

/// Returns the index of the first element equal to `item` by scanning every element.
///
/// # Example
///
/// ```rust
/// use pooled_collections::linear_search;
///
/// assert_eq!(linear_search(&[3, 1, 2, 1], &1), Some(1));
/// assert_eq!(linear_search(&[3, 1, 2, 1], &5), None);
/// ```
#[must_use]
pub fn linear_search<T>(items: &[T], item: &T) -> Option<usize>
where
    T: PartialEq,
{
    items.iter().position(|candidate| candidate == item)
}

/// Returns the index of the first element equal to `item` using binary search.
///
/// `items` must be sorted in ascending order. For unsorted input the result is unspecified,
/// though any index returned does point at an element equal to `item`.
///
/// # Example
///
/// ```rust
/// use pooled_collections::ordered_search;
///
/// assert_eq!(ordered_search(&[1, 2, 2, 2, 5], &2), Some(1));
/// assert_eq!(ordered_search(&[1, 2, 2, 2, 5], &3), None);
/// ```
#[must_use]
pub fn ordered_search<T>(items: &[T], item: &T) -> Option<usize>
where
    T: Ord,
{
    let index = items.partition_point(|candidate| candidate < item);

    items
        .get(index)
        .filter(|candidate| *candidate == item)
        .map(|_| index)
}

/// Declares that pooled containers search for elements of the given types with a linear scan.
///
/// This is correct for any element order and is what you want unless you can guarantee that
/// containers of the type are always sorted.
///
/// # Example
///
/// ```rust
/// use pooled_collections::{PooledVec, impl_linear_search};
///
/// #[derive(PartialEq)]
/// struct Color(u8, u8, u8);
///
/// impl_linear_search!(Color);
///
/// let mut palette = PooledVec::new();
/// palette.append(Color(255, 0, 0)).unwrap();
/// palette.append(Color(0, 0, 255)).unwrap();
///
/// assert!(palette.contains(&Color(0, 0, 255)).unwrap());
/// ```
#[macro_export]
macro_rules! impl_linear_search {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Searchable for $ty {
                const STRATEGY: $crate::SearchStrategy = $crate::SearchStrategy::Linear;

                #[inline]
                fn locate(items: &[Self], item: &Self) -> ::std::option::Option<usize> {
                    $crate::linear_search(items, item)
                }
            }
        )+
    };
}

/// Declares that pooled containers search for elements of the given types with binary search.
///
/// The types must implement [`Ord`]. This is an assertion that every container holding the type
/// is kept sorted in ascending order - see [`Searchable`] for the consequences of breaking it.
#[macro_export]
macro_rules! impl_ordered_search {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Searchable for $ty {
                const STRATEGY: $crate::SearchStrategy = $crate::SearchStrategy::Ordered;

                #[inline]
                fn locate(items: &[Self], item: &Self) -> ::std::option::Option<usize> {
                    $crate::ordered_search(items, item)
                }
            }
        )+
    };
}

impl_linear_search!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    (),
    NonZero<i8>, NonZero<i16>, NonZero<i32>, NonZero<i64>, NonZero<i128>, NonZero<isize>,
    NonZero<u8>, NonZero<u16>, NonZero<u32>, NonZero<u64>, NonZero<u128>, NonZero<usize>,
    Ordering, Duration, Instant, SystemTime, PathBuf, OsString, CString, IpAddr, Ipv4Addr,
    Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6, TypeId,
);

/// Binds linear search to generic types whose equality only depends on their type parameters.
macro_rules! impl_linear_search_generic {
    ($(impl<$($param:ident),+> for $ty:ty;)+) => {
        $(
            impl<$($param),+> Searchable for $ty
            where
                $($param: PartialEq,)+
            {
                const STRATEGY: SearchStrategy = SearchStrategy::Linear;

                #[inline]
                fn locate(items: &[Self], item: &Self) -> Option<usize> {
                    linear_search(items, item)
                }
            }
        )+
    };
}

impl_linear_search_generic! {
    impl<T> for Option<T>;
    impl<T, E> for std::result::Result<T, E>;
    impl<T> for Vec<T>;
    impl<T> for VecDeque<T>;
    impl<T> for Reverse<T>;
    impl<T> for Wrapping<T>;
    impl<A> for (A,);
    impl<A, B> for (A, B);
    impl<A, B, C> for (A, B, C);
    impl<A, B, C, D> for (A, B, C, D);
    impl<A, B, C, D, E> for (A, B, C, D, E);
    impl<A, B, C, D, E, F> for (A, B, C, D, E, F);
    impl<A, B, C, D, E, F, G> for (A, B, C, D, E, F, G);
    impl<A, B, C, D, E, F, G, H> for (A, B, C, D, E, F, G, H);
    impl<A, B, C, D, E, F, G, H, I> for (A, B, C, D, E, F, G, H, I);
    impl<A, B, C, D, E, F, G, H, I, J> for (A, B, C, D, E, F, G, H, I, J);
    impl<A, B, C, D, E, F, G, H, I, J, K> for (A, B, C, D, E, F, G, H, I, J, K);
    impl<A, B, C, D, E, F, G, H, I, J, K, L> for (A, B, C, D, E, F, G, H, I, J, K, L);
}

/// Binds linear search to smart pointers and references, which compare by pointee.
macro_rules! impl_linear_search_pointer {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<T> Searchable for $ty
            where
                T: PartialEq + ?Sized,
            {
                const STRATEGY: SearchStrategy = SearchStrategy::Linear;

                #[inline]
                fn locate(items: &[Self], item: &Self) -> Option<usize> {
                    linear_search(items, item)
                }
            }
        )+
    };
}

impl_linear_search_pointer!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

impl<T, const N: usize> Searchable for [T; N]
where
    T: PartialEq,
{
    const STRATEGY: SearchStrategy = SearchStrategy::Linear;

    #[inline]
    fn locate(items: &[Self], item: &Self) -> Option<usize> {
        linear_search(items, item)
    }
}

impl<B> Searchable for Cow<'_, B>
where
    B: PartialEq + ToOwned + ?Sized,
{
    const STRATEGY: SearchStrategy = SearchStrategy::Linear;

    #[inline]
    fn locate(items: &[Self], item: &Self) -> Option<usize> {
        linear_search(items, item)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[derive(Debug, Eq, Ord, PartialEq, PartialOrd)]
    struct Sorted(u32);

    impl_ordered_search!(Sorted);

    #[derive(Debug, PartialEq)]
    struct Unordered(u32);

    impl_linear_search!(Unordered);

    fn sorted(values: &[u32]) -> Vec<Sorted> {
        values.iter().copied().map(Sorted).collect()
    }

    #[test]
    fn builtin_types_are_linear() {
        assert_eq!(u32::STRATEGY, SearchStrategy::Linear);
        assert_eq!(String::STRATEGY, SearchStrategy::Linear);
        assert_eq!(<&str>::STRATEGY, SearchStrategy::Linear);
        assert_eq!(<Option<u8>>::STRATEGY, SearchStrategy::Linear);
        assert_eq!(<(u8, char)>::STRATEGY, SearchStrategy::Linear);
    }

    #[test]
    fn pointers_search_by_pointee() {
        let shared: Vec<Arc<str>> = vec![Arc::from("a"), Arc::from("b")];
        assert_eq!(Arc::<str>::locate(&shared, &Arc::from("b")), Some(1));

        let counted = [Rc::new(1), Rc::new(2)];
        assert_eq!(Rc::locate(&counted, &Rc::new(2)), Some(1));

        let boxed: [Box<[u8]>; 2] = [Box::new([1, 2]), Box::new([3])];
        assert_eq!(<Box<[u8]>>::locate(&boxed, &(Box::new([3u8]) as Box<[u8]>)), Some(1));

        let (first, second) = (5, 6);
        assert_eq!(<&i32>::locate(&[&first, &second], &&6), Some(1));
        assert_eq!(<&str>::locate(&["x", "y"], &"x"), Some(0));
    }

    #[test]
    fn arrays_and_cow_search_by_value() {
        assert_eq!(<[u8; 2]>::locate(&[[1, 2], [3, 4]], &[3, 4]), Some(1));
        assert_eq!(<[u8; 2]>::locate(&[[1, 2], [3, 4]], &[4, 3]), None);

        let names: [Cow<'_, str>; 2] = [Cow::Borrowed("a"), Cow::Owned("b".to_string())];
        assert_eq!(Cow::locate(&names, &Cow::Borrowed("b")), Some(1));
    }

    #[test]
    fn wide_tuples_and_std_types_are_linear() {
        type Wide = (u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8);

        let key: Wide = (0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1);
        let other: Wide = (1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0);

        assert_eq!(Wide::STRATEGY, SearchStrategy::Linear);
        assert_eq!(Wide::locate(&[other, key], &key), Some(1));

        let durations = [Duration::from_secs(2), Duration::from_millis(5)];
        assert_eq!(Duration::locate(&durations, &Duration::from_millis(5)), Some(1));

        let results: [std::result::Result<u8, ()>; 2] = [Err(()), Ok(1)];
        assert_eq!(std::result::Result::locate(&results, &Ok(1)), Some(1));

        assert_eq!(Reverse::locate(&[Reverse(3), Reverse(1)], &Reverse(1)), Some(1));
        assert_eq!(Ipv4Addr::locate(&[Ipv4Addr::LOCALHOST], &Ipv4Addr::LOCALHOST), Some(0));
    }

    #[test]
    fn macros_bind_declared_strategy() {
        assert_eq!(Sorted::STRATEGY, SearchStrategy::Ordered);
        assert_eq!(Unordered::STRATEGY, SearchStrategy::Linear);
    }

    #[test]
    fn linear_finds_first_match_in_unsorted_data() {
        assert_eq!(linear_search(&[5, 3, 9, 3], &3), Some(1));
        assert_eq!(linear_search(&[5, 3, 9, 3], &9), Some(2));
        assert_eq!(linear_search(&[5, 3, 9, 3], &4), None);
        assert_eq!(linear_search::<u8>(&[], &4), None);
    }

    #[test]
    fn ordered_finds_first_match_in_sorted_data() {
        let items = sorted(&[1, 3, 3, 3, 7, 9]);

        assert_eq!(Sorted::locate(&items, &Sorted(1)), Some(0));
        assert_eq!(Sorted::locate(&items, &Sorted(3)), Some(1));
        assert_eq!(Sorted::locate(&items, &Sorted(9)), Some(5));
        assert_eq!(Sorted::locate(&items, &Sorted(0)), None);
        assert_eq!(Sorted::locate(&items, &Sorted(4)), None);
        assert_eq!(Sorted::locate(&items, &Sorted(10)), None);
        assert_eq!(Sorted::locate(&[], &Sorted(10)), None);
    }

    #[test]
    fn ordered_misses_present_item_in_unsorted_data() {
        // Binary search trusts the ordering: 1 sits past the partition point for 1 and is missed.
        let items = sorted(&[5, 9, 1]);

        assert_eq!(Sorted::locate(&items, &Sorted(1)), None);
        assert_eq!(linear_search(&items, &Sorted(1)), Some(2));
    }

    #[test]
    fn float_search_follows_partial_eq() {
        assert_eq!(f64::locate(&[1.0, f64::NAN, 2.0], &2.0), Some(2));
        assert_eq!(f64::locate(&[1.0, f64::NAN, 2.0], &f64::NAN), None);
    }
}
