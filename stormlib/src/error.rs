//! Error types for the StormLib bindings

use crate::sys::error_codes;
use std::ffi::NulError;
use std::fmt;
use std::io;
use thiserror::Error;

/// A raw StormLib last-error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    /// Whether this is `ERROR_FILE_NOT_FOUND`
    pub fn is_not_found(self) -> bool {
        self.0 == error_codes::ERROR_FILE_NOT_FOUND
    }

    /// Whether this is `ERROR_HANDLE_EOF`
    pub fn is_eof(self) -> bool {
        self.0 == error_codes::ERROR_HANDLE_EOF
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match error_codes::describe(self.0) {
            Some(text) => write!(f, "{} ({})", self.0, text),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Errors reported by the bindings
#[derive(Error, Debug)]
pub enum Error {
    /// A StormLib call reported failure
    #[error("{operation} failed with error {code}")]
    Storm {
        /// The StormLib entry point that failed
        operation: &'static str,
        /// Last-error code reported after the call
        code: ErrorCode,
    },

    /// The StormLib shared library could not be loaded
    #[error("failed to load StormLib from {path}: {message}")]
    Load {
        /// Library path that was tried
        path: String,
        /// Loader message
        message: String,
    },

    /// A name passed to StormLib contained an interior NUL byte
    #[error("invalid name: {0}")]
    InvalidName(#[from] NulError),

    /// A seek would move before the start of the file
    #[error("invalid seek to negative position {0}")]
    NegativeSeek(i64),

    /// The listfile is not valid text
    #[error("listfile is not valid UTF-8")]
    InvalidListfile,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a [`Error::Storm`] from a failed call
    pub fn storm(operation: &'static str, code: u32) -> Self {
        Error::Storm {
            operation,
            code: ErrorCode(code),
        }
    }

    /// The raw StormLib code, if this error came from StormLib
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Storm { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether StormLib reported that the archive or file does not exist
    pub fn is_not_found(&self) -> bool {
        self.code().is_some_and(ErrorCode::is_not_found)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::NegativeSeek(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            err if err.is_not_found() => io::Error::new(io::ErrorKind::NotFound, err),
            err => io::Error::other(err),
        }
    }
}

/// Result type for the bindings
pub type Result<T> = std::result::Result<T, Error>;
