//! The StormLib entry points as a Rust trait
//!
//! [`StormApi`] restates the C API one function at a time with borrowed Rust
//! types in place of raw pointers. Return values and the last-error code are
//! passed through untouched; turning them into [`crate::Error`] is the job of
//! [`crate::Archive`] and [`crate::File`].

use crate::error::{Error, Result};
use crate::handle::{ArchiveHandle, FileHandle};
use crate::sys::{self, DWORD, HANDLE, LONG};
use dlopen::symbor::Library;
use libc::c_void;
use log::debug;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::ffi::CStr;
use std::fmt;
use std::path::Path;
use std::ptr;

/// The StormLib archive-reading API
///
/// Methods taking a handle are `unsafe`: the handle must have been returned by
/// the same implementation and must not have been closed yet.
pub trait StormApi {
    /// `SFileOpenArchive`
    fn open_archive(
        &self,
        name: &CStr,
        priority: u32,
        flags: u32,
        archive: &mut ArchiveHandle,
    ) -> bool;

    /// `SFileCloseArchive`
    ///
    /// # Safety
    ///
    /// `archive` must be open and must not be used afterwards.
    unsafe fn close_archive(&self, archive: ArchiveHandle) -> bool;

    /// `SFileOpenFileEx`
    ///
    /// `file` may be `None` only with [`sys::SFILE_OPEN_CHECK_EXISTS`].
    ///
    /// # Safety
    ///
    /// `archive` must be open.
    unsafe fn open_file_ex(
        &self,
        archive: ArchiveHandle,
        name: &CStr,
        search_scope: u32,
        file: Option<&mut FileHandle>,
    ) -> bool;

    /// `SFileSetFilePointer`
    ///
    /// # Safety
    ///
    /// `file` must be open.
    unsafe fn set_file_pointer(
        &self,
        file: FileHandle,
        pos: i32,
        pos_high: Option<&mut i32>,
        move_method: u32,
    ) -> u32;

    /// `SFileReadFile`, reading at most `buffer.len()` bytes
    ///
    /// # Safety
    ///
    /// `file` must be open.
    unsafe fn read_file(&self, file: FileHandle, buffer: &mut [u8], read: &mut u32) -> bool;

    /// `SFileCloseFile`
    ///
    /// # Safety
    ///
    /// `file` must be open and must not be used afterwards.
    unsafe fn close_file(&self, file: FileHandle) -> bool;

    /// `SFileGetFileSize`
    ///
    /// # Safety
    ///
    /// `file` must be open.
    unsafe fn get_file_size(&self, file: FileHandle, size_high: Option<&mut u32>) -> u32;

    /// `GetLastError`
    fn last_error(&self) -> u32;
}

impl<T: StormApi + ?Sized> StormApi for &T {
    fn open_archive(
        &self,
        name: &CStr,
        priority: u32,
        flags: u32,
        archive: &mut ArchiveHandle,
    ) -> bool {
        (**self).open_archive(name, priority, flags, archive)
    }

    unsafe fn close_archive(&self, archive: ArchiveHandle) -> bool {
        unsafe { (**self).close_archive(archive) }
    }

    unsafe fn open_file_ex(
        &self,
        archive: ArchiveHandle,
        name: &CStr,
        search_scope: u32,
        file: Option<&mut FileHandle>,
    ) -> bool {
        unsafe { (**self).open_file_ex(archive, name, search_scope, file) }
    }

    unsafe fn set_file_pointer(
        &self,
        file: FileHandle,
        pos: i32,
        pos_high: Option<&mut i32>,
        move_method: u32,
    ) -> u32 {
        unsafe { (**self).set_file_pointer(file, pos, pos_high, move_method) }
    }

    unsafe fn read_file(&self, file: FileHandle, buffer: &mut [u8], read: &mut u32) -> bool {
        unsafe { (**self).read_file(file, buffer, read) }
    }

    unsafe fn close_file(&self, file: FileHandle) -> bool {
        unsafe { (**self).close_file(file) }
    }

    unsafe fn get_file_size(&self, file: FileHandle, size_high: Option<&mut u32>) -> u32 {
        unsafe { (**self).get_file_size(file, size_high) }
    }

    fn last_error(&self) -> u32 {
        (**self).last_error()
    }
}

/// File name of the StormLib shared library on this platform
pub fn default_library_name() -> String {
    format!("{}storm{}", DLL_PREFIX, DLL_SUFFIX)
}

#[derive(Clone, Copy)]
struct Functions {
    open_archive: sys::SFileOpenArchiveFn,
    close_archive: sys::SFileCloseArchiveFn,
    open_file_ex: sys::SFileOpenFileExFn,
    set_file_pointer: sys::SFileSetFilePointerFn,
    read_file: sys::SFileReadFileFn,
    close_file: sys::SFileCloseFileFn,
    get_file_size: sys::SFileGetFileSizeFn,
    #[cfg(not(windows))]
    get_last_error: sys::GetLastErrorFn,
}

impl Functions {
    unsafe fn resolve(library: &Library, path: &str) -> Result<Self> {
        unsafe fn symbol<T: Copy>(library: &Library, path: &str, name: &str) -> Result<T> {
            let symbol = unsafe { library.symbol::<T>(name) }.map_err(|e| Error::Load {
                path: path.to_string(),
                message: format!("missing symbol {}: {}", name, e),
            })?;
            Ok(*symbol)
        }

        unsafe {
            Ok(Self {
                open_archive: symbol(library, path, "SFileOpenArchive")?,
                close_archive: symbol(library, path, "SFileCloseArchive")?,
                open_file_ex: symbol(library, path, "SFileOpenFileEx")?,
                set_file_pointer: symbol(library, path, "SFileSetFilePointer")?,
                read_file: symbol(library, path, "SFileReadFile")?,
                close_file: symbol(library, path, "SFileCloseFile")?,
                get_file_size: symbol(library, path, "SFileGetFileSize")?,
                #[cfg(not(windows))]
                get_last_error: symbol(library, path, "GetLastError")?,
            })
        }
    }

    #[cfg(feature = "link")]
    fn linked() -> Self {
        Self {
            open_archive: sys::SFileOpenArchive,
            close_archive: sys::SFileCloseArchive,
            open_file_ex: sys::SFileOpenFileEx,
            set_file_pointer: sys::SFileSetFilePointer,
            read_file: sys::SFileReadFile,
            close_file: sys::SFileCloseFile,
            get_file_size: sys::SFileGetFileSize,
            #[cfg(not(windows))]
            get_last_error: sys::GetLastError,
        }
    }
}

/// StormLib, either loaded at run time or linked at build time
pub struct Storm {
    functions: Functions,
    library: Option<Library>,
    origin: String,
}

impl Storm {
    /// Load StormLib from a shared library path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let library = Library::open(path).map_err(|e| Error::Load {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        let functions = unsafe { Functions::resolve(&library, &origin)? };
        debug!("Loaded StormLib from {}", origin);

        Ok(Self {
            functions,
            library: Some(library),
            origin,
        })
    }

    /// Load StormLib by its platform library name from the loader search path
    pub fn load_default() -> Result<Self> {
        Self::load(default_library_name())
    }

    /// Use the StormLib linked into this binary
    #[cfg(feature = "link")]
    pub fn linked() -> Self {
        Self {
            functions: Functions::linked(),
            library: None,
            origin: "<linked>".to_string(),
        }
    }

    /// Where the functions came from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether the library was loaded at run time
    pub fn is_dynamic(&self) -> bool {
        self.library.is_some()
    }
}

impl fmt::Debug for Storm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storm")
            .field("origin", &self.origin)
            .field("dynamic", &self.is_dynamic())
            .finish()
    }
}

impl StormApi for Storm {
    fn open_archive(
        &self,
        name: &CStr,
        priority: u32,
        flags: u32,
        archive: &mut ArchiveHandle,
    ) -> bool {
        unsafe {
            (self.functions.open_archive)(name.as_ptr(), priority, flags, archive.as_out_ptr())
        }
    }

    unsafe fn close_archive(&self, archive: ArchiveHandle) -> bool {
        unsafe { (self.functions.close_archive)(archive.as_raw()) }
    }

    unsafe fn open_file_ex(
        &self,
        archive: ArchiveHandle,
        name: &CStr,
        search_scope: u32,
        file: Option<&mut FileHandle>,
    ) -> bool {
        let out: *mut HANDLE = match file {
            Some(file) => file.as_out_ptr(),
            None => ptr::null_mut(),
        };
        unsafe { (self.functions.open_file_ex)(archive.as_raw(), name.as_ptr(), search_scope, out) }
    }

    unsafe fn set_file_pointer(
        &self,
        file: FileHandle,
        pos: i32,
        pos_high: Option<&mut i32>,
        move_method: u32,
    ) -> u32 {
        let high: *mut LONG = match pos_high {
            Some(high) => high,
            None => ptr::null_mut(),
        };
        unsafe { (self.functions.set_file_pointer)(file.as_raw(), pos, high, move_method) }
    }

    unsafe fn read_file(&self, file: FileHandle, buffer: &mut [u8], read: &mut u32) -> bool {
        let to_read = DWORD::try_from(buffer.len()).unwrap_or(DWORD::MAX);
        unsafe {
            (self.functions.read_file)(
                file.as_raw(),
                buffer.as_mut_ptr() as *mut c_void,
                to_read,
                read,
                ptr::null_mut(),
            )
        }
    }

    unsafe fn close_file(&self, file: FileHandle) -> bool {
        unsafe { (self.functions.close_file)(file.as_raw()) }
    }

    unsafe fn get_file_size(&self, file: FileHandle, size_high: Option<&mut u32>) -> u32 {
        let high: *mut DWORD = match size_high {
            Some(high) => high,
            None => ptr::null_mut(),
        };
        unsafe { (self.functions.get_file_size)(file.as_raw(), high) }
    }

    #[cfg(not(windows))]
    fn last_error(&self) -> u32 {
        unsafe { (self.functions.get_last_error)() }
    }

    #[cfg(windows)]
    fn last_error(&self) -> u32 {
        std::io::Error::last_os_error()
            .raw_os_error()
            .map_or(0, |code| code as u32)
    }
}
