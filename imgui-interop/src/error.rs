//! Error types for draw data access

use thiserror::Error;

/// Errors reported while reading draw data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An index past the end of a draw list or command array
    #[error("{kind} index {index} out of range (length {len})")]
    OutOfRange {
        /// What was being indexed
        kind: &'static str,
        /// Requested index
        index: usize,
        /// Length of the array
        len: usize,
    },

    /// A raw buffer whose length is not a whole number of elements
    #[error("buffer of {len} bytes is not a multiple of the {stride}-byte element size")]
    Truncated {
        /// Buffer length in bytes
        len: usize,
        /// Element size in bytes
        stride: usize,
    },

    /// An index element width other than 2 or 4 bytes
    #[error("unsupported index size: {0} bytes")]
    UnsupportedIndexSize(usize),

    /// A vertex layout whose fields don't fit inside its stride
    #[error("vertex layout does not fit in a {0}-byte stride")]
    InvalidLayout(usize),
}

/// Result type for draw data access
pub type Result<T> = std::result::Result<T, Error>;
