use std::num::NonZero;

use new_zealand::nz;

// A poisoned lock means another thread panicked while reshuffling pool buckets. The buckets are
// plain lists of empty buffers, so there is no partial state we could sensibly repair.
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock in buffer pool";

/// Capacity of the first buffer a growable container rents when it grows from zero capacity.
pub(crate) const DEFAULT_GROWTH_CAPACITY: NonZero<usize> = nz!(4);

/// Smallest buffer a bucketed pool hands out. Smaller requests are rounded up to this size.
pub(crate) const MIN_BUCKET_CAPACITY: NonZero<usize> = nz!(16);

/// Default upper bound on the capacity of buffers a bucketed pool keeps for reuse.
pub(crate) const DEFAULT_MAX_BUFFER_CAPACITY: NonZero<usize> = nz!(1_048_576);

/// Default upper bound on the number of idle buffers a bucketed pool keeps per bucket.
pub(crate) const DEFAULT_MAX_BUFFERS_PER_BUCKET: NonZero<usize> = nz!(50);

/// The largest number of elements of type `T` that a single buffer can hold.
///
/// Allocations are limited to `isize::MAX` bytes. Zero-sized types never allocate, so any
/// element count is representable for them.
#[must_use]
pub(crate) const fn max_capacity_of<T>() -> usize {
    match isize::MAX.unsigned_abs().checked_div(size_of::<T>()) {
        Some(max_elements) => max_elements,
        // Zero-sized.
        None => usize::MAX,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn max_capacity_scales_with_element_size() {
        assert_eq!(max_capacity_of::<u8>(), isize::MAX.unsigned_abs());
        assert_eq!(max_capacity_of::<u64>(), isize::MAX.unsigned_abs() / 8);
        assert_eq!(max_capacity_of::<()>(), usize::MAX);
    }

    #[test]
    fn bucket_limits_are_powers_of_two() {
        assert!(MIN_BUCKET_CAPACITY.is_power_of_two());
        assert!(DEFAULT_MAX_BUFFER_CAPACITY.is_power_of_two());
        assert!(DEFAULT_MAX_BUFFER_CAPACITY > MIN_BUCKET_CAPACITY);
        assert_eq!(DEFAULT_MAX_BUFFER_CAPACITY.get(), 1 << 20);
    }
}
