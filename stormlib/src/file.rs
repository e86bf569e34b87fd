//! Files opened inside an MPQ archive

use crate::api::StormApi;
use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::sys::{self, error_codes};
use log::{trace, warn};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// A file opened from an [`crate::Archive`]
///
/// Reads never ask StormLib for more than the bytes left before the end of
/// the file. The handle is closed on drop.
pub struct File<'a, S: StormApi + ?Sized> {
    storm: &'a S,
    handle: FileHandle,
    name: String,
    size: u64,
    position: u64,
}

impl<'a, S: StormApi + ?Sized> File<'a, S> {
    pub(crate) fn new(storm: &'a S, handle: FileHandle, name: &str) -> Result<Self> {
        let mut file = Self {
            storm,
            handle,
            name: name.to_string(),
            size: 0,
            position: 0,
        };

        let mut high = 0u32;
        let low = unsafe { storm.get_file_size(handle, Some(&mut high)) };
        if low == sys::SFILE_INVALID_SIZE {
            let code = storm.last_error();
            if code != error_codes::ERROR_SUCCESS {
                return Err(Error::storm("SFileGetFileSize", code));
            }
        }
        file.size = (u64::from(high) << 32) | u64::from(low);
        trace!("Opened {} ({} bytes) as {:?}", file.name, file.size, handle);

        Ok(file)
    }

    /// The raw file handle
    pub fn handle(&self) -> FileHandle {
        self.handle
    }

    /// Name the file was opened with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uncompressed file size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current read position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Close the file, reporting failure
    pub fn close(mut self) -> Result<()> {
        self.close_handle()
    }

    fn close_handle(&mut self) -> Result<()> {
        if self.handle.is_null() {
            return Ok(());
        }

        let handle = std::mem::take(&mut self.handle);
        if unsafe { self.storm.close_file(handle) } {
            Ok(())
        } else {
            Err(Error::storm("SFileCloseFile", self.storm.last_error()))
        }
    }

    fn set_pointer(&mut self, offset: i64, move_method: u32) -> Result<u64> {
        let low = offset as u32 as i32;
        let mut high = (offset >> 32) as i32;

        let result =
            unsafe { self.storm.set_file_pointer(self.handle, low, Some(&mut high), move_method) };
        if result == sys::SFILE_INVALID_SIZE {
            let code = self.storm.last_error();
            if code != error_codes::ERROR_SUCCESS {
                return Err(Error::storm("SFileSetFilePointer", code));
            }
        }

        Ok((u64::from(high as u32) << 32) | u64::from(result))
    }
}

impl<S: StormApi + ?Sized> Read for File<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.size.saturating_sub(self.position);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let wanted = remaining.min(u64::from(u32::MAX)).min(buf.len() as u64) as usize;
        let mut read = 0u32;
        let ok = unsafe { self.storm.read_file(self.handle, &mut buf[..wanted], &mut read) };
        if !ok {
            let code = self.storm.last_error();
            if code != error_codes::ERROR_HANDLE_EOF {
                return Err(Error::storm("SFileReadFile", code).into());
            }
        }

        self.position += u64::from(read);
        trace!("Read {} bytes from {} at {}", read, self.name, self.position);
        Ok(read as usize)
    }
}

impl<S: StormApi + ?Sized> Seek for File<'_, S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, move_method, base) = match pos {
            SeekFrom::Start(offset) => {
                let offset = i64::try_from(offset).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset out of range")
                })?;
                (offset, sys::FILE_BEGIN, 0)
            }
            SeekFrom::Current(offset) => (offset, sys::FILE_CURRENT, self.position),
            SeekFrom::End(offset) => (offset, sys::FILE_END, self.size),
        };

        if base.checked_add_signed(offset).is_none() {
            return Err(Error::NegativeSeek(base as i64 + offset).into());
        }

        self.position = self.set_pointer(offset, move_method)?;
        trace!("Seeked {} to {}", self.name, self.position);
        Ok(self.position)
    }
}

impl<S: StormApi + ?Sized> Drop for File<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.close_handle() {
            warn!("Failed to close {}: {}", self.name, e);
        }
    }
}

impl<S: StormApi + ?Sized> fmt::Debug for File<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("size", &self.size)
            .field("position", &self.position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::{MemoryArchive, MemoryStorm};
    use crate::{Archive, OpenOptions};
    use pretty_assertions::assert_eq;
    use std::io::{Read, Seek, SeekFrom};

    const PAYLOAD: &[u8] = b"The quick brown fox jumps over the lazy dog";

    fn storm() -> MemoryStorm {
        let storm = MemoryStorm::new();
        storm.insert(
            "patch_d2.mpq",
            MemoryArchive::new().file("data\\local\\lng\\eng\\patchstring.tbl", PAYLOAD.to_vec()),
        );
        storm
    }

    fn open(storm: &MemoryStorm) -> Archive<'_, MemoryStorm> {
        OpenOptions::new()
            .load_listfile(false)
            .open(storm, "patch_d2.mpq")
            .unwrap()
    }

    #[test]
    fn test_size_and_full_read() {
        let storm = storm();
        let archive = open(&storm);
        let mut file = archive.open_file("data\\local\\lng\\eng\\patchstring.tbl").unwrap();
        assert_eq!(file.size(), PAYLOAD.len() as u64);

        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        assert_eq!(data, PAYLOAD);
        assert_eq!(file.position(), PAYLOAD.len() as u64);
    }

    #[test]
    fn test_small_buffer_reads() {
        let storm = storm();
        let archive = open(&storm);
        let mut file = archive.open_file("data\\local\\lng\\eng\\patchstring.tbl").unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(file.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"The ");
        file.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"quic");
    }

    #[test]
    fn test_seek_methods() {
        let storm = storm();
        let archive = open(&storm);
        let mut file = archive.open_file("data\\local\\lng\\eng\\patchstring.tbl").unwrap();

        assert_eq!(file.seek(SeekFrom::Start(4)).unwrap(), 4);
        assert_eq!(file.seek(SeekFrom::Current(6)).unwrap(), 10);
        assert_eq!(file.seek(SeekFrom::End(-3)).unwrap(), 40);

        let mut tail = String::new();
        file.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "dog");
    }

    #[test]
    fn test_negative_seek_is_rejected() {
        let storm = storm();
        let archive = open(&storm);
        let mut file = archive.open_file("data\\local\\lng\\eng\\patchstring.tbl").unwrap();

        let err = file.seek(SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert_eq!(file.position(), 0);
    }

    #[test]
    fn test_rewind_matches_fresh_open() {
        let storm = storm();
        let archive = open(&storm);

        let mut file = archive.open_file("data\\local\\lng\\eng\\patchstring.tbl").unwrap();
        let mut first = Vec::new();
        file.read_to_end(&mut first).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let mut again = Vec::new();
        file.read_to_end(&mut again).unwrap();

        let fresh = archive.read_file("data\\local\\lng\\eng\\patchstring.tbl").unwrap();
        assert_eq!(again, fresh);
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_read_past_end_after_seek() {
        let storm = storm();
        let archive = open(&storm);
        let mut file = archive.open_file("data\\local\\lng\\eng\\patchstring.tbl").unwrap();
        assert_eq!(file.seek(SeekFrom::End(10)).unwrap(), 43);
        assert_eq!(file.position(), 43);

        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_drop_closes_file_before_archive() {
        let storm = storm();
        {
            let archive = open(&storm);
            let _file = archive.open_file("data\\local\\lng\\eng\\patchstring.tbl").unwrap();
            assert_eq!(storm.open_handles(), 2);
        }
        assert_eq!(storm.open_handles(), 0);
    }
}
