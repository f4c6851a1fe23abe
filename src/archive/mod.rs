//! Archive tree management
//!
//! The archive is a fixed hierarchy `root/<Category>/<Year>/Month_<m>/Week_<w>/`.
//! `skeleton` pre-builds the whole tree at startup so moves never race
//! directory creation; `layout` derives destination paths from the
//! wall-clock date and resolves filename collisions without overwriting.

pub mod layout;
pub mod skeleton;

pub use layout::{destination_dir, resolve_collision, week_of_month, WEEKS_PER_MONTH};
pub use skeleton::build_skeleton;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from archive path derivation and skeleton construction
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A directory could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Collision suffix probing exhausted its bound
    #[error("Collision suffixes exhausted for {file_name} in {}", dir.display())]
    CollisionOverflow { dir: PathBuf, file_name: String },
}
