//! Raw StormLib ABI
//!
//! Names, parameter order and calling convention match `StormLib.h`. Nothing
//! here validates its input; see [`crate::Archive`] for the safe layer.

#![allow(non_camel_case_types, non_snake_case)]

use libc::{c_char, c_void};

/// Opaque StormLib handle
pub type HANDLE = *mut c_void;
/// Unsigned 32-bit value
pub type DWORD = u32;
/// Signed 32-bit value
pub type LONG = i32;
/// Pointer to a DWORD out-parameter
pub type LPDWORD = *mut DWORD;
/// Overlapped I/O parameter, always null
pub type LPOVERLAPPED = *mut c_void;
/// Narrow character type StormLib is built with when `UNICODE` is not defined
pub type TCHAR = c_char;

/// Move method: offset is relative to the start of the file
pub const FILE_BEGIN: DWORD = 0;
/// Move method: offset is relative to the current position
pub const FILE_CURRENT: DWORD = 1;
/// Move method: offset is relative to the end of the file
pub const FILE_END: DWORD = 2;

/// Returned by `SFileSetFilePointer` and `SFileGetFileSize` on failure
pub const SFILE_INVALID_SIZE: DWORD = 0xFFFF_FFFF;

/// Search scope: open a file from the archive
pub const SFILE_OPEN_FROM_MPQ: DWORD = 0x0000_0000;
/// Search scope: only check whether the file exists
pub const SFILE_OPEN_CHECK_EXISTS: DWORD = 0xFFFF_FFFC;
/// Search scope: open a file from the local disk instead
pub const SFILE_OPEN_LOCAL_FILE: DWORD = 0xFFFF_FFFF;

/// Archive open flag: the stream is opened read-only
pub const STREAM_FLAG_READ_ONLY: DWORD = 0x0000_0100;
/// Archive open flag: don't load the internal listfile
pub const MPQ_OPEN_NO_LISTFILE: DWORD = 0x0001_0000;
/// Archive open flag: don't load the (attributes) file
pub const MPQ_OPEN_NO_ATTRIBUTES: DWORD = 0x0002_0000;
/// Archive open flag: don't search for the header past offset zero
pub const MPQ_OPEN_NO_HEADER_SEARCH: DWORD = 0x0004_0000;
/// Archive open flag: always treat the archive as format version 1
pub const MPQ_OPEN_FORCE_MPQ_V1: DWORD = 0x0008_0000;
/// Archive open flag: verify sector CRCs while reading
pub const MPQ_OPEN_CHECK_SECTOR_CRC: DWORD = 0x0010_0000;

/// Error codes reported through `GetLastError`
///
/// StormLib uses Win32 codes on Windows and errno-based codes elsewhere.
pub mod error_codes {
    use super::DWORD;

    /// The operation completed successfully
    pub const ERROR_SUCCESS: DWORD = 0;

    #[cfg(windows)]
    #[allow(missing_docs)]
    mod platform {
        use super::DWORD;

        pub const ERROR_FILE_NOT_FOUND: DWORD = 2;
        pub const ERROR_ACCESS_DENIED: DWORD = 5;
        pub const ERROR_INVALID_HANDLE: DWORD = 6;
        pub const ERROR_NOT_ENOUGH_MEMORY: DWORD = 8;
        pub const ERROR_BAD_FORMAT: DWORD = 11;
        pub const ERROR_NO_MORE_FILES: DWORD = 18;
        pub const ERROR_HANDLE_EOF: DWORD = 38;
        pub const ERROR_NOT_SUPPORTED: DWORD = 50;
        pub const ERROR_INVALID_PARAMETER: DWORD = 87;
        pub const ERROR_NEGATIVE_SEEK: DWORD = 131;
        pub const ERROR_DISK_FULL: DWORD = 112;
        pub const ERROR_INSUFFICIENT_BUFFER: DWORD = 122;
        pub const ERROR_ALREADY_EXISTS: DWORD = 183;
        pub const ERROR_CAN_NOT_COMPLETE: DWORD = 1003;
        pub const ERROR_FILE_CORRUPT: DWORD = 1392;
    }

    #[cfg(not(windows))]
    #[allow(missing_docs)]
    mod platform {
        use super::DWORD;

        pub const ERROR_FILE_NOT_FOUND: DWORD = libc::ENOENT as DWORD;
        pub const ERROR_ACCESS_DENIED: DWORD = libc::EPERM as DWORD;
        pub const ERROR_INVALID_HANDLE: DWORD = libc::EBADF as DWORD;
        pub const ERROR_NOT_ENOUGH_MEMORY: DWORD = libc::ENOMEM as DWORD;
        pub const ERROR_BAD_FORMAT: DWORD = 1000;
        pub const ERROR_NO_MORE_FILES: DWORD = 1001;
        pub const ERROR_HANDLE_EOF: DWORD = 1002;
        pub const ERROR_NOT_SUPPORTED: DWORD = libc::ENOTSUP as DWORD;
        pub const ERROR_INVALID_PARAMETER: DWORD = libc::EINVAL as DWORD;
        // StormPort maps this onto EINVAL
        pub const ERROR_NEGATIVE_SEEK: DWORD = libc::EINVAL as DWORD;
        pub const ERROR_DISK_FULL: DWORD = libc::ENOSPC as DWORD;
        pub const ERROR_INSUFFICIENT_BUFFER: DWORD = libc::ENOBUFS as DWORD;
        pub const ERROR_ALREADY_EXISTS: DWORD = libc::EEXIST as DWORD;
        pub const ERROR_CAN_NOT_COMPLETE: DWORD = 1003;
        pub const ERROR_FILE_CORRUPT: DWORD = 1004;
    }

    pub use platform::*;

    /// Short description of a StormLib error code, if it is one we know
    pub fn describe(code: DWORD) -> Option<&'static str> {
        let text = match code {
            ERROR_SUCCESS => "success",
            ERROR_FILE_NOT_FOUND => "file not found",
            ERROR_ACCESS_DENIED => "access denied",
            ERROR_INVALID_HANDLE => "invalid handle",
            ERROR_NOT_ENOUGH_MEMORY => "not enough memory",
            ERROR_BAD_FORMAT => "bad archive format",
            ERROR_NO_MORE_FILES => "no more files",
            ERROR_HANDLE_EOF => "end of file",
            ERROR_NOT_SUPPORTED => "not supported",
            ERROR_INVALID_PARAMETER => "invalid parameter",
            #[cfg(windows)]
            ERROR_NEGATIVE_SEEK => "negative seek",
            ERROR_DISK_FULL => "disk full",
            ERROR_INSUFFICIENT_BUFFER => "insufficient buffer",
            ERROR_ALREADY_EXISTS => "already exists",
            ERROR_CAN_NOT_COMPLETE => "operation can not complete",
            ERROR_FILE_CORRUPT => "file corrupt",
            _ => return None,
        };
        Some(text)
    }
}

/// `SFileOpenArchive`
pub type SFileOpenArchiveFn = unsafe extern "system" fn(
    szMpqName: *const TCHAR,
    dwPriority: DWORD,
    dwFlags: DWORD,
    phMpq: *mut HANDLE,
) -> bool;

/// `SFileCloseArchive`
pub type SFileCloseArchiveFn = unsafe extern "system" fn(hMpq: HANDLE) -> bool;

/// `SFileOpenFileEx`
pub type SFileOpenFileExFn = unsafe extern "system" fn(
    hMpq: HANDLE,
    szFileName: *const c_char,
    dwSearchScope: DWORD,
    phFile: *mut HANDLE,
) -> bool;

/// `SFileSetFilePointer`
pub type SFileSetFilePointerFn = unsafe extern "system" fn(
    hFile: HANDLE,
    lFilePos: LONG,
    plFilePosHigh: *mut LONG,
    dwMoveMethod: DWORD,
) -> DWORD;

/// `SFileReadFile`
pub type SFileReadFileFn = unsafe extern "system" fn(
    hFile: HANDLE,
    lpBuffer: *mut c_void,
    dwToRead: DWORD,
    pdwRead: LPDWORD,
    lpOverlapped: LPOVERLAPPED,
) -> bool;

/// `SFileCloseFile`
pub type SFileCloseFileFn = unsafe extern "system" fn(hFile: HANDLE) -> bool;

/// `SFileGetFileSize`
pub type SFileGetFileSizeFn =
    unsafe extern "system" fn(hFile: HANDLE, pdwFileSizeHigh: LPDWORD) -> DWORD;

/// `GetLastError`
pub type GetLastErrorFn = unsafe extern "system" fn() -> DWORD;

#[cfg(feature = "link")]
#[allow(missing_docs)]
extern "system" {
    pub fn SFileOpenArchive(
        szMpqName: *const TCHAR,
        dwPriority: DWORD,
        dwFlags: DWORD,
        phMpq: *mut HANDLE,
    ) -> bool;
    pub fn SFileCloseArchive(hMpq: HANDLE) -> bool;
    pub fn SFileOpenFileEx(
        hMpq: HANDLE,
        szFileName: *const c_char,
        dwSearchScope: DWORD,
        phFile: *mut HANDLE,
    ) -> bool;
    pub fn SFileSetFilePointer(
        hFile: HANDLE,
        lFilePos: LONG,
        plFilePosHigh: *mut LONG,
        dwMoveMethod: DWORD,
    ) -> DWORD;
    pub fn SFileReadFile(
        hFile: HANDLE,
        lpBuffer: *mut c_void,
        dwToRead: DWORD,
        pdwRead: LPDWORD,
        lpOverlapped: LPOVERLAPPED,
    ) -> bool;
    pub fn SFileCloseFile(hFile: HANDLE) -> bool;
    pub fn SFileGetFileSize(hFile: HANDLE, pdwFileSizeHigh: LPDWORD) -> DWORD;
    #[cfg(not(windows))]
    pub fn GetLastError() -> DWORD;
}
