use thiserror::Error;

/// Errors reported by pooled containers and buffer handles.
///
/// Every error is reported synchronously at the point of the offending call. Nothing is retried
/// internally and releasing a buffer never produces an error.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The caller supplied a nonsensical argument, such as an inverted range or a capacity that
    /// cannot be represented in memory.
    #[error("invalid argument: {problem}")]
    InvalidArgument {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// An index or range fell outside the valid elements of the container.
    #[error("index {index} is out of bounds for a sequence of length {len}")]
    OutOfBounds {
        /// The offending index (for ranges, the offending end of the range).
        index: usize,

        /// The number of elements in the sequence at the time of the call.
        len: usize,
    },

    /// The buffer has already been returned to its pool and can no longer be accessed.
    #[error("the pooled buffer has already been released")]
    UseAfterRelease,

    /// Growing the buffer would require a capacity that cannot be represented.
    #[error("growing to hold {requested} elements would overflow the maximum capacity")]
    CapacityOverflow {
        /// The number of elements that the container needed room for, saturated at `usize::MAX`.
        requested: usize,
    },

    /// The operation is not compatible with the container, e.g. changing the length of a
    /// fixed-length [`PooledArray`][crate::PooledArray].
    #[error("operation '{operation}' is not supported by this container")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

/// A specialized `Result` type for pooled collection operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
