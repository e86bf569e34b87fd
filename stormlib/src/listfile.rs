//! Listfile handling for MPQ archives
//! Maps the names in the (listfile) special file to host-style paths

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Name of the special file listing the archive's contents
pub const LISTFILE_NAME: &str = "(listfile)";

/// Convert an internal archive name to the path form used for lookups
///
/// Backslashes become forward slashes and the name is lowercased, so
/// `Data\Global\UI\Cursor.dc6` becomes `data/global/ui/cursor.dc6`.
pub fn sanitize_path(name: &str) -> String {
    name.replace('\\', "/").to_lowercase()
}

/// Reads a listfile and returns the internal names it contains
pub fn read_listfile(data: &[u8]) -> Result<Vec<String>> {
    let text = std::str::from_utf8(data).map_err(|_| Error::InvalidListfile)?;

    Ok(text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

/// Sanitized path to internal name, in sorted order
#[derive(Debug, Default, Clone)]
pub struct PathMap {
    paths: BTreeMap<String, String>,
}

impl PathMap {
    /// Build the map from listfile contents
    pub fn from_listfile(data: &[u8]) -> Result<Self> {
        let paths = read_listfile(data)?
            .into_iter()
            .map(|name| (sanitize_path(&name), name))
            .collect();
        Ok(Self { paths })
    }

    /// Internal name for a sanitized path, if the listfile names it
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.paths.get(path).map(String::as_str)
    }

    /// Sanitized paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
