//! List command implementation

use super::Filter;
use crate::output;
use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use stormlib::{Archive, StormApi};

#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListing {
    archive: String,
    filter: String,
    total_entries: usize,
    files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Sorted paths in one archive accepted by `filter`
pub fn list_archive<S: StormApi + ?Sized>(
    storm: &S,
    archive_path: &Path,
    filter: &Filter,
) -> Result<Vec<String>> {
    let archive = Archive::open(storm, archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let files = archive
        .paths()
        .filter(|path| filter.matches(path))
        .map(str::to_string)
        .collect::<Vec<_>>();
    log::debug!(
        "{} of {} paths in {} match {}",
        files.len(),
        archive.path_map().len(),
        archive_path.display(),
        filter.as_str()
    );

    archive
        .close()
        .with_context(|| format!("Failed to close archive: {}", archive_path.display()))?;
    Ok(files)
}

/// List matching files in each archive, continuing past archives that fail
///
/// Returns `false` if any archive could not be listed.
pub fn list<S: StormApi + ?Sized>(
    storm: &S,
    archives: &[impl AsRef<Path>],
    filter: &Filter,
) -> Result<bool> {
    let mut listings = Vec::new();
    let mut all_ok = true;

    for archive_path in archives {
        let archive_path = archive_path.as_ref();
        let mut listing = ArchiveListing {
            archive: archive_path.display().to_string(),
            filter: filter.as_str().to_string(),
            total_entries: 0,
            files: Vec::new(),
            error: None,
        };

        match list_archive(storm, archive_path, filter) {
            Ok(files) => {
                if output::text_enabled() {
                    if archives.len() > 1 {
                        if output::use_color() {
                            println!("{}: {}", "Archive".bold(), listing.archive.cyan());
                        } else {
                            println!("Archive: {}", listing.archive);
                        }
                    }
                    for file in &files {
                        println!("{}", file);
                    }
                }
                listing.total_entries = files.len();
                listing.files = files;
            }
            Err(e) => {
                all_ok = false;
                output::print_error(&e);
                listing.error = Some(format!("{:#}", e));
            }
        }

        listings.push(listing);
    }

    output::print_output(&listings)?;
    Ok(all_ok)
}
