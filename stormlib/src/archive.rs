//! MPQ archive handling

use crate::api::StormApi;
use crate::error::{Error, Result};
use crate::file::File;
use crate::handle::{ArchiveHandle, FileHandle};
use crate::listfile::{PathMap, LISTFILE_NAME};
use crate::sys;
use bitflags::bitflags;
use log::{debug, warn};
use std::ffi::CString;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

bitflags! {
    /// Flags passed to `SFileOpenArchive`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenArchiveFlags: u32 {
        /// Open the underlying stream read-only
        const READ_ONLY = sys::STREAM_FLAG_READ_ONLY;
        /// Don't let StormLib load the internal listfile
        const NO_LISTFILE = sys::MPQ_OPEN_NO_LISTFILE;
        /// Don't load the (attributes) file
        const NO_ATTRIBUTES = sys::MPQ_OPEN_NO_ATTRIBUTES;
        /// Only look for the header at offset zero
        const NO_HEADER_SEARCH = sys::MPQ_OPEN_NO_HEADER_SEARCH;
        /// Treat the archive as format version 1
        const FORCE_MPQ_V1 = sys::MPQ_OPEN_FORCE_MPQ_V1;
        /// Verify sector CRCs while reading
        const CHECK_SECTOR_CRC = sys::MPQ_OPEN_CHECK_SECTOR_CRC;
    }
}

/// Where `SFileOpenFileEx` looks for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Inside the archive
    #[default]
    FromMpq,
    /// On the local disk, bypassing the archive
    LocalFile,
}

impl SearchScope {
    /// The raw `dwSearchScope` value
    pub fn as_raw(self) -> u32 {
        match self {
            SearchScope::FromMpq => sys::SFILE_OPEN_FROM_MPQ,
            SearchScope::LocalFile => sys::SFILE_OPEN_LOCAL_FILE,
        }
    }
}

/// Options for opening MPQ archives
#[derive(Debug, Clone)]
pub struct OpenOptions {
    priority: u32,
    flags: OpenArchiveFlags,
    search_scope: SearchScope,
    load_listfile: bool,
}

impl OpenOptions {
    /// Create new default options
    pub fn new() -> Self {
        Self {
            priority: 0,
            flags: OpenArchiveFlags::empty(),
            search_scope: SearchScope::FromMpq,
            load_listfile: true,
        }
    }

    /// Set the archive priority passed to StormLib
    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the open flags
    pub fn flags(mut self, flags: OpenArchiveFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the search scope used by [`Archive::open_file`]
    pub fn search_scope(mut self, scope: SearchScope) -> Self {
        self.search_scope = scope;
        self
    }

    /// Whether to read `(listfile)` when the archive is opened
    ///
    /// A missing listfile is an error when this is enabled.
    pub fn load_listfile(mut self, load: bool) -> Self {
        self.load_listfile = load;
        self
    }

    /// Open an archive through the given StormLib implementation
    pub fn open<'s, S, P>(&self, storm: &'s S, path: P) -> Result<Archive<'s, S>>
    where
        S: StormApi + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let name = path_to_cstring(path)?;

        let mut handle = ArchiveHandle::NULL;
        if !storm.open_archive(&name, self.priority, self.flags.bits(), &mut handle) {
            return Err(Error::storm("SFileOpenArchive", storm.last_error()));
        }
        debug!("Opened archive {} as {:?}", path.display(), handle);

        let mut archive = Archive {
            storm,
            handle,
            path: path.to_path_buf(),
            search_scope: self.search_scope,
            paths: PathMap::default(),
        };

        if self.load_listfile {
            let listfile = archive.read_scoped(LISTFILE_NAME, SearchScope::FromMpq)?;
            archive.paths = PathMap::from_listfile(&listfile)?;
            debug!("Loaded {} listfile entries", archive.paths.len());
        }

        Ok(archive)
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    Ok(CString::new(path.as_os_str().as_bytes())?)
}

#[cfg(not(unix))]
fn path_to_cstring(path: &Path) -> Result<CString> {
    Ok(CString::new(path.to_string_lossy().into_owned())?)
}

/// An open MPQ archive
///
/// The archive handle is closed when the value is dropped. Files opened from
/// it borrow the archive and are therefore always closed first.
pub struct Archive<'s, S: StormApi + ?Sized> {
    storm: &'s S,
    handle: ArchiveHandle,
    path: PathBuf,
    search_scope: SearchScope,
    paths: PathMap,
}

impl<'s, S: StormApi + ?Sized> Archive<'s, S> {
    /// Open an archive with default options
    pub fn open<P: AsRef<Path>>(storm: &'s S, path: P) -> Result<Self> {
        OpenOptions::new().open(storm, path)
    }

    /// The raw archive handle
    pub fn handle(&self) -> ArchiveHandle {
        self.handle
    }

    /// Path the archive was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sanitized paths from the listfile, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.paths()
    }

    /// The listfile path map
    pub fn path_map(&self) -> &PathMap {
        &self.paths
    }

    fn internal_name(&self, name: &str) -> Result<CString> {
        let name = self.paths.resolve(name).unwrap_or(name);
        Ok(CString::new(name)?)
    }

    /// Open a file by sanitized path or internal name
    pub fn open_file(&self, name: &str) -> Result<File<'_, S>> {
        self.open_file_scoped(name, self.search_scope)
    }

    fn open_file_scoped(&self, name: &str, scope: SearchScope) -> Result<File<'_, S>> {
        let internal = self.internal_name(name)?;

        let mut handle = FileHandle::NULL;
        let opened = unsafe {
            self.storm
                .open_file_ex(self.handle, &internal, scope.as_raw(), Some(&mut handle))
        };
        if !opened {
            return Err(Error::storm("SFileOpenFileEx", self.storm.last_error()));
        }

        File::new(self.storm, handle, name)
    }

    /// Whether the archive contains a file
    pub fn contains(&self, name: &str) -> Result<bool> {
        let internal = self.internal_name(name)?;

        let exists = unsafe {
            self.storm
                .open_file_ex(self.handle, &internal, sys::SFILE_OPEN_CHECK_EXISTS, None)
        };
        if exists {
            return Ok(true);
        }

        let err = Error::storm("SFileOpenFileEx", self.storm.last_error());
        if err.is_not_found() {
            Ok(false)
        } else {
            Err(err)
        }
    }

    /// Read a whole file into memory
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.read_scoped(name, self.search_scope)
    }

    // `(listfile)` always lives inside the archive, whatever the file scope
    fn read_scoped(&self, name: &str, scope: SearchScope) -> Result<Vec<u8>> {
        let mut file = self.open_file_scoped(name, scope)?;
        let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut data)?;
        file.close()?;
        Ok(data)
    }

    /// Close the archive, reporting failure
    pub fn close(mut self) -> Result<()> {
        self.close_handle()
    }

    fn close_handle(&mut self) -> Result<()> {
        if self.handle.is_null() {
            return Ok(());
        }

        let handle = std::mem::take(&mut self.handle);
        if unsafe { self.storm.close_archive(handle) } {
            debug!("Closed archive {}", self.path.display());
            Ok(())
        } else {
            Err(Error::storm("SFileCloseArchive", self.storm.last_error()))
        }
    }
}

impl<S: StormApi + ?Sized> Drop for Archive<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.close_handle() {
            warn!("Failed to close archive {}: {}", self.path.display(), e);
        }
    }
}

impl<S: StormApi + ?Sized> fmt::Debug for Archive<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("handle", &self.handle)
            .field("paths", &self.paths.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryArchive, MemoryStorm};
    use crate::sys::error_codes;
    use pretty_assertions::assert_eq;

    fn storm() -> MemoryStorm {
        let storm = MemoryStorm::new();
        storm.insert(
            "d2char.mpq",
            MemoryArchive::new()
                .file("Data\\Global\\Palette\\Act1\\pal.dat", vec![7u8; 768])
                .file("Data\\Global\\UI\\Cursor\\ohand.dc6", b"cursor".to_vec())
                .with_listfile(),
        );
        storm.insert(
            "bare.mpq",
            MemoryArchive::new().file("readme.txt", b"hello".to_vec()),
        );
        storm
    }

    #[test]
    fn test_flag_bits_match_stormlib() {
        assert_eq!(OpenArchiveFlags::READ_ONLY.bits(), 0x100);
        assert_eq!(OpenArchiveFlags::NO_LISTFILE.bits(), 0x10000);
        assert_eq!(OpenArchiveFlags::CHECK_SECTOR_CRC.bits(), 0x100000);
        assert_eq!(SearchScope::LocalFile.as_raw(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_open_loads_sanitized_paths() {
        let storm = storm();
        let archive = Archive::open(&storm, "d2char.mpq").unwrap();
        let paths: Vec<&str> = archive.paths().collect();
        assert_eq!(
            paths,
            vec![
                "data/global/palette/act1/pal.dat",
                "data/global/ui/cursor/ohand.dc6",
            ]
        );
    }

    #[test]
    fn test_open_missing_archive() {
        let storm = storm();
        let err = Archive::open(&storm, "missing.mpq").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(storm.open_handles(), 0);
    }

    #[test]
    fn test_missing_listfile_fails_and_closes() {
        let storm = storm();
        let err = Archive::open(&storm, "bare.mpq").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(storm.open_handles(), 0);

        let archive = OpenOptions::new()
            .load_listfile(false)
            .open(&storm, "bare.mpq")
            .unwrap();
        assert_eq!(archive.paths().count(), 0);
        assert_eq!(archive.read_file("readme.txt").unwrap(), b"hello");
    }

    #[test]
    fn test_read_by_sanitized_and_internal_name() {
        let storm = storm();
        let archive = Archive::open(&storm, "d2char.mpq").unwrap();
        let by_path = archive.read_file("data/global/ui/cursor/ohand.dc6").unwrap();
        let by_name = archive.read_file("Data\\Global\\UI\\Cursor\\ohand.dc6").unwrap();
        assert_eq!(by_path, b"cursor");
        assert_eq!(by_path, by_name);
    }

    #[test]
    fn test_contains() {
        let storm = storm();
        let archive = Archive::open(&storm, "d2char.mpq").unwrap();
        assert!(archive.contains("data/global/palette/act1/pal.dat").unwrap());
        assert!(!archive.contains("data/global/missing.dat").unwrap());
    }

    #[test]
    fn test_close_releases_handle() {
        let storm = storm();
        let archive = Archive::open(&storm, "d2char.mpq").unwrap();
        assert_eq!(storm.open_handles(), 1);
        archive.close().unwrap();
        assert_eq!(storm.open_handles(), 0);
    }

    #[test]
    fn test_open_file_error_keeps_code() {
        let storm = storm();
        let archive = Archive::open(&storm, "d2char.mpq").unwrap();
        let err = archive.open_file("nope.txt").unwrap_err();
        assert_eq!(
            err.code().map(|c| c.0),
            Some(error_codes::ERROR_FILE_NOT_FOUND)
        );
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        let storm = storm();
        let archive = Archive::open(&storm, "d2char.mpq").unwrap();
        assert!(matches!(
            archive.open_file("bad\0name"),
            Err(Error::InvalidName(_))
        ));
    }
}
