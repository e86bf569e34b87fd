//! In-process StormLib stand-in
//!
//! [`MemoryStorm`] answers the [`StormApi`] calls from archives registered in
//! memory. It follows StormLib's observable behavior: file names match
//! case-insensitively with `/` and `\` treated alike, failures leave an error
//! code for [`StormApi::last_error`], short reads fail with
//! `ERROR_HANDLE_EOF` after copying what was available, and seeks past the
//! end stop at the file size while seeks before the start fail with
//! `ERROR_NEGATIVE_SEEK`.

use crate::api::StormApi;
use crate::handle::{ArchiveHandle, FileHandle};
use crate::listfile::LISTFILE_NAME;
use crate::sys::{self, error_codes::*, HANDLE};
use log::trace;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::Arc;

type Entries = HashMap<String, Arc<[u8]>>;

/// Contents of an archive served by [`MemoryStorm`]
#[derive(Debug, Default, Clone)]
pub struct MemoryArchive {
    files: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    /// An archive with no files
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under its internal (backslash-separated) name
    pub fn file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.files.push((name.into(), data.into()));
        self
    }

    /// Add a `(listfile)` naming every file added so far, CRLF-terminated
    pub fn with_listfile(self) -> Self {
        let mut listfile = String::new();
        for (name, _) in &self.files {
            listfile.push_str(name);
            listfile.push_str("\r\n");
        }
        self.file(LISTFILE_NAME, listfile)
    }

    fn into_entries(self) -> Entries {
        self.files
            .into_iter()
            .map(|(name, data)| (normalize(&name), Arc::from(data)))
            .collect()
    }
}

enum Slot {
    Archive(Arc<Entries>),
    File { data: Arc<[u8]>, position: u64 },
}

#[derive(Default)]
struct State {
    archives: HashMap<String, Arc<Entries>>,
    open: HashMap<usize, Slot>,
    next_handle: usize,
    last_error: u32,
}

impl State {
    fn fail(&mut self, code: u32) {
        self.last_error = code;
    }

    fn allocate(&mut self, slot: Slot) -> HANDLE {
        self.next_handle += 1;
        self.open.insert(self.next_handle, slot);
        self.next_handle as HANDLE
    }

    fn archive(&self, handle: ArchiveHandle) -> Option<Arc<Entries>> {
        match self.open.get(&(handle.as_raw() as usize)) {
            Some(Slot::Archive(entries)) => Some(Arc::clone(entries)),
            _ => None,
        }
    }

    fn file(&mut self, handle: FileHandle) -> Option<(&Arc<[u8]>, &mut u64)> {
        match self.open.get_mut(&(handle.as_raw() as usize)) {
            Some(Slot::File { data, position }) => Some((data, position)),
            _ => None,
        }
    }
}

/// A [`StormApi`] implementation backed by in-memory archives
#[derive(Default)]
pub struct MemoryStorm {
    state: Mutex<State>,
}

impl MemoryStorm {
    /// A backend with no archives registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an archive under the path `SFileOpenArchive` will be given
    pub fn insert(&self, path: impl Into<String>, archive: MemoryArchive) {
        self.state
            .lock()
            .archives
            .insert(path.into(), Arc::new(archive.into_entries()));
    }

    /// Number of archive and file handles currently open
    pub fn open_handles(&self) -> usize {
        self.state.lock().open.len()
    }
}

impl std::fmt::Debug for MemoryStorm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryStorm")
            .field("archives", &state.archives.len())
            .field("open_handles", &state.open.len())
            .finish()
    }
}

fn normalize(name: &str) -> String {
    name.replace('/', "\\").to_ascii_uppercase()
}

impl StormApi for MemoryStorm {
    fn open_archive(
        &self,
        name: &CStr,
        _priority: u32,
        _flags: u32,
        archive: &mut ArchiveHandle,
    ) -> bool {
        let mut state = self.state.lock();
        let path = name.to_string_lossy();

        match state.archives.get(&*path).cloned() {
            Some(entries) => {
                *archive = ArchiveHandle::from_raw(state.allocate(Slot::Archive(entries)));
                trace!("Opened in-memory archive {} as {:?}", path, archive);
                true
            }
            None => {
                *archive = ArchiveHandle::NULL;
                state.fail(ERROR_FILE_NOT_FOUND);
                false
            }
        }
    }

    unsafe fn close_archive(&self, archive: ArchiveHandle) -> bool {
        let mut state = self.state.lock();
        let key = archive.as_raw() as usize;
        if matches!(state.open.get(&key), Some(Slot::Archive(_))) {
            state.open.remove(&key);
            true
        } else {
            state.fail(ERROR_INVALID_HANDLE);
            false
        }
    }

    unsafe fn open_file_ex(
        &self,
        archive: ArchiveHandle,
        name: &CStr,
        search_scope: u32,
        file: Option<&mut FileHandle>,
    ) -> bool {
        let mut state = self.state.lock();
        let Some(entries) = state.archive(archive) else {
            state.fail(ERROR_INVALID_HANDLE);
            return false;
        };
        let name = name.to_string_lossy();

        let data: Arc<[u8]> = match search_scope {
            sys::SFILE_OPEN_CHECK_EXISTS => {
                if entries.contains_key(&normalize(&name)) {
                    return true;
                }
                state.fail(ERROR_FILE_NOT_FOUND);
                return false;
            }
            sys::SFILE_OPEN_FROM_MPQ => match entries.get(&normalize(&name)) {
                Some(data) => Arc::clone(data),
                None => {
                    state.fail(ERROR_FILE_NOT_FOUND);
                    return false;
                }
            },
            sys::SFILE_OPEN_LOCAL_FILE => match std::fs::read(&*name) {
                Ok(data) => Arc::from(data),
                Err(_) => {
                    state.fail(ERROR_FILE_NOT_FOUND);
                    return false;
                }
            },
            _ => {
                state.fail(ERROR_INVALID_PARAMETER);
                return false;
            }
        };

        match file {
            Some(file) => {
                *file = FileHandle::from_raw(state.allocate(Slot::File { data, position: 0 }));
                true
            }
            None => {
                state.fail(ERROR_INVALID_PARAMETER);
                false
            }
        }
    }

    unsafe fn set_file_pointer(
        &self,
        file: FileHandle,
        pos: i32,
        pos_high: Option<&mut i32>,
        move_method: u32,
    ) -> u32 {
        let mut state = self.state.lock();
        let Some((data, position)) = state.file(file) else {
            state.fail(ERROR_INVALID_HANDLE);
            return sys::SFILE_INVALID_SIZE;
        };

        let base = match move_method {
            sys::FILE_BEGIN => 0,
            sys::FILE_CURRENT => *position,
            sys::FILE_END => data.len() as u64,
            _ => {
                state.fail(ERROR_INVALID_PARAMETER);
                return sys::SFILE_INVALID_SIZE;
            }
        };

        let delta = match &pos_high {
            Some(high) => ((**high as i64) << 32) | (pos as u32 as i64),
            None => pos as i64,
        };

        let Some(target) = base.checked_add_signed(delta) else {
            state.fail(ERROR_NEGATIVE_SEEK);
            return sys::SFILE_INVALID_SIZE;
        };
        // StormLib clamps forward seeks to the file size
        let target = target.min(data.len() as u64);

        *position = target;
        if let Some(high) = pos_high {
            *high = (target >> 32) as i32;
        }
        target as u32
    }

    unsafe fn read_file(&self, file: FileHandle, buffer: &mut [u8], read: &mut u32) -> bool {
        let mut state = self.state.lock();
        let Some((data, position)) = state.file(file) else {
            *read = 0;
            state.fail(ERROR_INVALID_HANDLE);
            return false;
        };

        let wanted = buffer.len().min(u32::MAX as usize);
        let start = (*position).min(data.len() as u64) as usize;
        let count = wanted.min(data.len() - start);
        buffer[..count].copy_from_slice(&data[start..start + count]);
        *position += count as u64;
        *read = count as u32;

        if count < wanted {
            state.fail(ERROR_HANDLE_EOF);
            return false;
        }
        true
    }

    unsafe fn close_file(&self, file: FileHandle) -> bool {
        let mut state = self.state.lock();
        let key = file.as_raw() as usize;
        if matches!(state.open.get(&key), Some(Slot::File { .. })) {
            state.open.remove(&key);
            true
        } else {
            state.fail(ERROR_INVALID_HANDLE);
            false
        }
    }

    unsafe fn get_file_size(&self, file: FileHandle, size_high: Option<&mut u32>) -> u32 {
        let mut state = self.state.lock();
        let Some((data, _)) = state.file(file) else {
            state.fail(ERROR_INVALID_HANDLE);
            return sys::SFILE_INVALID_SIZE;
        };

        let size = data.len() as u64;
        if let Some(high) = size_high {
            *high = (size >> 32) as u32;
        }
        size as u32
    }

    fn last_error(&self) -> u32 {
        self.state.lock().last_error
    }
}
