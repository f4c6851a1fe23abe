//! Archive skeleton construction
//!
//! Pre-builds every `category/year/Month_m/Week_w` directory for the
//! supported year span so the intake loop never has to create directories
//! on the move path. Safe to run on every process start.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use super::{ArchiveError, WEEKS_PER_MONTH};
use crate::config::DocumentCategory;

/// Create the full archive directory tree under `root`
///
/// Builds `root/<Category>/<year>/Month_<m>/Week_<w>` for every category,
/// every year in `years`, months 1-12 and week buckets 1-5. Idempotent:
/// existing directories are left untouched. A permission failure here is
/// fatal for the caller since no later move could succeed either.
pub fn build_skeleton(root: &Path, years: RangeInclusive<i32>) -> Result<(), ArchiveError> {
    for category in DocumentCategory::ALL {
        for year in years.clone() {
            for month in 1..=12u32 {
                for week in 1..=WEEKS_PER_MONTH {
                    let path = root
                        .join(category.label())
                        .join(year.to_string())
                        .join(format!("Month_{}", month))
                        .join(format!("Week_{}", week));
                    fs::create_dir_all(&path).map_err(|source| ArchiveError::CreateDir {
                        path: path.clone(),
                        source,
                    })?;
                }
            }
        }
    }

    Ok(())
}
