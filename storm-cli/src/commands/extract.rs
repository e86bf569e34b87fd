//! Extract command implementation

use super::Filter;
use crate::output;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use stormlib::{Archive, StormApi};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExtractResult {
    archive: String,
    output_dir: String,
    extracted: usize,
    skipped: usize,
    files: Vec<FileExtractResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileExtractResult {
    filename: String,
    output_path: String,
    size: u64,
}

/// Files written from one archive, and paths that were refused
#[derive(Debug, Default)]
pub struct ArchiveExtraction {
    pub files: Vec<FileExtractResult>,
    pub skipped: Vec<String>,
}

/// Map an archive path below `output_dir`, refusing anything that would
/// escape it
fn build_output_path(output_dir: &Path, archive_path: &str) -> Option<PathBuf> {
    let relative = Path::new(archive_path);
    let contained = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));

    if contained && relative.components().next().is_some() {
        Some(output_dir.join(relative))
    } else {
        None
    }
}

/// Extract every matching file of one archive into `output_dir`
///
/// Stops at the first file that can't be read or written.
pub fn extract_archive<S: StormApi + ?Sized>(
    storm: &S,
    archive_path: &Path,
    filter: &Filter,
    output_dir: &Path,
    progress: Option<&ProgressBar>,
) -> Result<ArchiveExtraction> {
    let archive = Archive::open(storm, archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let selected = archive
        .paths()
        .filter(|path| filter.matches(path))
        .collect::<Vec<_>>();
    if let Some(pb) = progress {
        pb.set_length(selected.len() as u64);
        pb.set_position(0);
    }

    let mut extraction = ArchiveExtraction::default();
    for filename in selected {
        let Some(output_path) = build_output_path(output_dir, filename) else {
            log::warn!("Skipping {}: path leaves the target directory", filename);
            extraction.skipped.push(filename.to_string());
            continue;
        };

        if let Some(pb) = progress {
            pb.set_message(filename.to_string());
        }
        output::verbose_println(
            1,
            &format!("Extracting {} → {}", filename, output_path.display()),
        );

        let size = extract_file(&archive, filename, &output_path)?;
        extraction.files.push(FileExtractResult {
            filename: filename.to_string(),
            output_path: output_path.display().to_string(),
            size,
        });

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    archive
        .close()
        .with_context(|| format!("Failed to close archive: {}", archive_path.display()))?;
    Ok(extraction)
}

/// Copy one archived file to disk, returning the number of bytes written
fn extract_file<S: StormApi + ?Sized>(
    archive: &Archive<'_, S>,
    filename: &str,
    output_path: &Path,
) -> Result<u64> {
    let mut file = archive
        .open_file(filename)
        .with_context(|| format!("Failed to open '{}' in archive", filename))?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create directory structure for: {:?}", output_path)
        })?;
    }

    let mut out = fs::File::create(output_path)
        .with_context(|| format!("Failed to create file: {:?}", output_path))?;
    let size = io::copy(&mut file, &mut out)
        .with_context(|| format!("Failed to extract '{}'", filename))?;

    file.close()
        .with_context(|| format!("Failed to close '{}'", filename))?;
    Ok(size)
}

/// Extract matching files from each archive, continuing past archives that fail
///
/// Returns `false` if any archive failed.
pub fn extract<S: StormApi + ?Sized>(
    storm: &S,
    archives: &[impl AsRef<Path>],
    filter: &Filter,
    output_dir: &Path,
) -> Result<bool> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let progress = if output::text_enabled() {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut results = Vec::new();
    let mut all_ok = true;

    for archive_path in archives {
        let archive_path = archive_path.as_ref();
        let mut result = ExtractResult {
            archive: archive_path.display().to_string(),
            output_dir: output_dir.display().to_string(),
            ..Default::default()
        };

        match extract_archive(storm, archive_path, filter, output_dir, progress.as_ref()) {
            Ok(extraction) => {
                if let Some(pb) = &progress {
                    let summary = format!(
                        "Extracted {} files from {}",
                        extraction.files.len(),
                        archive_path.display()
                    );
                    if output::use_color() {
                        pb.println(format!("{} {}", "✓".green().bold(), summary));
                    } else {
                        pb.println(format!("✓ {}", summary));
                    }
                }
                result.extracted = extraction.files.len();
                result.skipped = extraction.skipped.len();
                result.files = extraction.files;
            }
            Err(e) => {
                all_ok = false;
                if let Some(pb) = &progress {
                    pb.suspend(|| output::print_error(&e));
                } else {
                    output::print_error(&e);
                }
                result.error = Some(format!("{:#}", e));
            }
        }

        results.push(result);
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if output::text_enabled() {
        let extracted: usize = results.iter().map(|r| r.extracted).sum();
        let skipped: usize = results.iter().map(|r| r.skipped).sum();
        if output::use_color() {
            println!(
                "{} {} files to {}",
                "Extracted".green(),
                extracted.to_string().bright_blue(),
                output_dir.display()
            );
        } else {
            println!("Extracted {} files to {}", extracted, output_dir.display());
        }
        if skipped > 0 {
            println!("Skipped {} files with unsafe paths", skipped);
        }
    }

    output::print_output(&results)?;
    Ok(all_ok)
}
