//! # stormlib - StormLib MPQ archive bindings
//!
//! Bindings to the archive-reading half of [StormLib]: opening archives,
//! opening files inside them, seeking and reading. The MPQ format itself is
//! handled entirely by StormLib; this crate only relays calls.
//!
//! ## Layers
//!
//! - [`sys`]: the C ABI, with StormLib's names, parameter order and
//!   calling convention.
//! - [`StormApi`]: the same entry points as a trait, implemented by
//!   [`Storm`] (StormLib loaded at run time, or linked with the `link`
//!   feature) and [`MemoryStorm`] (archives served from memory).
//! - [`Archive`] and [`File`]: scoped handles that close themselves,
//!   with [`std::io::Read`] and [`std::io::Seek`] on files.
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Read;
//! use stormlib::{Archive, Storm};
//!
//! # fn main() -> Result<(), stormlib::Error> {
//! let storm = Storm::load_default()?;
//! let archive = Archive::open(&storm, "d2data.mpq")?;
//!
//! for path in archive.paths() {
//!     println!("{}", path);
//! }
//!
//! let mut file = archive.open_file("data/global/excel/armor.txt")?;
//! let mut text = String::new();
//! file.read_to_string(&mut text)?;
//! # Ok(())
//! # }
//! ```
//!
//! [StormLib]: https://github.com/ladislav-zezula/StormLib

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod api;
pub mod archive;
pub mod error;
pub mod file;
pub mod handle;
pub mod listfile;
pub mod memory;
pub mod sys;

// Re-export commonly used types
pub use api::{default_library_name, Storm, StormApi};
pub use archive::{Archive, OpenArchiveFlags, OpenOptions, SearchScope};
pub use error::{Error, ErrorCode, Result};
pub use file::File;
pub use handle::{ArchiveHandle, FileHandle};
pub use listfile::{sanitize_path, PathMap, LISTFILE_NAME};
pub use memory::{MemoryArchive, MemoryStorm};
