//! Typed wrappers around StormLib's opaque `HANDLE`

use crate::sys::HANDLE;
use std::fmt;
use std::ptr;

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(HANDLE);

        impl $name {
            /// The null handle StormLib leaves behind on failure
            pub const NULL: Self = Self(ptr::null_mut());

            /// Wrap a raw handle
            pub const fn from_raw(raw: HANDLE) -> Self {
                Self(raw)
            }

            /// The raw handle value
            pub const fn as_raw(self) -> HANDLE {
                self.0
            }

            /// Pointer suitable for an out-parameter
            pub fn as_out_ptr(&mut self) -> *mut HANDLE {
                &mut self.0
            }

            /// Whether this is the null handle
            pub fn is_null(self) -> bool {
                self.0.is_null()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NULL
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:p})"), self.0)
            }
        }
    };
}

handle_type!(
    /// Handle to an open MPQ archive
    ArchiveHandle
);

handle_type!(
    /// Handle to a file opened inside an archive
    FileHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_null() {
        assert!(ArchiveHandle::default().is_null());
        assert!(FileHandle::default().is_null());
    }

    #[test]
    fn test_raw_round_trip() {
        let raw = 0x40usize as HANDLE;
        let handle = FileHandle::from_raw(raw);
        assert_eq!(handle.as_raw(), raw);
        assert!(!handle.is_null());
        assert_eq!(format!("{:?}", handle), "FileHandle(0x40)");
    }

    #[test]
    fn test_out_ptr_writes_through() {
        let mut handle = ArchiveHandle::NULL;
        unsafe { *handle.as_out_ptr() = 0x10usize as HANDLE };
        assert_eq!(handle.as_raw(), 0x10usize as HANDLE);
    }
}
