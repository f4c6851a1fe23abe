//! Destination path policy
//!
//! Maps a category and a reference date onto an archive directory, and
//! picks a non-clobbering filename inside it.
//!
//! Week buckets are fixed 7-day windows within the month: days 1-7 are
//! Week_1, 8-14 Week_2, 15-21 Week_3, 22-28 Week_4, and 29-31 Week_5.
//! Changing this rule changes the archive layout for existing files, so
//! it is deliberately not configurable.

use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

use super::ArchiveError;
use crate::config::DocumentCategory;

/// Week buckets per month
pub const WEEKS_PER_MONTH: u32 = 5;

/// Upper bound on collision suffix probing before giving up
const MAX_COLLISION_PROBES: u32 = 10_000;

/// Week bucket (1-5) for a date, by fixed 7-day windows
pub fn week_of_month(date: NaiveDate) -> u32 {
    ((date.day() - 1) / 7 + 1).min(WEEKS_PER_MONTH)
}

/// Destination directory for a category on a reference date
///
/// The directory is part of the pre-built skeleton, so it exists before
/// any move is attempted.
pub fn destination_dir(root: &Path, category: DocumentCategory, date: NaiveDate) -> PathBuf {
    root.join(category.label())
        .join(date.year().to_string())
        .join(format!("Month_{}", date.month()))
        .join(format!("Week_{}", week_of_month(date)))
}

/// Pick a destination path for `file_name` inside `dir` that does not
/// clobber an existing file
///
/// If `dir/file_name` is free it is returned as-is; otherwise an
/// increasing numeric suffix is inserted before the extension
/// (`name_1.pdf`, `name_2.pdf`, ...) until an unused name is found.
/// Probing is bounded so a pathological directory cannot hang the loop.
pub fn resolve_collision(dir: &Path, file_name: &str) -> Result<PathBuf, ArchiveError> {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let (stem, extension) = split_name(file_name);

    for counter in 1..=MAX_COLLISION_PROBES {
        let renamed = match extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = dir.join(renamed);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(ArchiveError::CollisionOverflow {
        dir: dir.to_path_buf(),
        file_name: file_name.to_string(),
    })
}

/// Split a filename into stem and extension at the last dot
fn split_name(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}
