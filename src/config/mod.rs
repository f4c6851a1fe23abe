//! Process-start configuration
//!
//! All knobs are fixed at startup: intake and archive paths, the polling
//! interval, the supported year span, and the closed set of document
//! categories. Values come from environment variables (a `.env` file is
//! loaded by `main` before this runs) with defaults matching a local
//! deployment.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

/// Default watched directory for incoming PDFs
pub const DEFAULT_INTAKE_DIR: &str = "./incoming_documents";

/// Default root of the sorted archive tree
pub const DEFAULT_ARCHIVE_ROOT: &str = "./sorted_documents";

/// Default seconds between intake scans
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30;

/// Pre-provisioned year span of the archive skeleton
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 2020..=2030;

/// The closed set of document categories.
///
/// The label string sent to the classifier and the top-level archive
/// folder name are the same string, so the candidate-label list and the
/// folder skeleton cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentCategory {
    Invoice,
    Protocol,
    Report,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 3] = [
        DocumentCategory::Invoice,
        DocumentCategory::Protocol,
        DocumentCategory::Report,
    ];

    /// Label offered to the classifier; also the archive folder name
    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::Invoice => "Invoice",
            DocumentCategory::Protocol => "Protocol",
            DocumentCategory::Report => "Report",
        }
    }

    /// Map a classifier label back to a category
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

/// Candidate labels passed to the classifier, in declaration order
pub fn candidate_labels() -> Vec<&'static str> {
    DocumentCategory::ALL.iter().map(|c| c.label()).collect()
}

/// Runtime configuration for the sorter
#[derive(Debug, Clone)]
pub struct SorterConfig {
    /// Watched directory for incoming PDFs
    pub intake_dir: PathBuf,
    /// Root of the sorted archive tree
    pub archive_root: PathBuf,
    /// Pause between intake scans
    pub poll_interval: Duration,
    /// Years pre-provisioned in the archive skeleton
    pub years: RangeInclusive<i32>,
}

impl SorterConfig {
    /// Read configuration from the environment, falling back to defaults
    ///
    /// Recognized variables: `SORTER_INPUT_DIR`, `SORTER_OUTPUT_DIR`,
    /// `SORTER_CHECK_INTERVAL` (seconds). An unparsable interval falls
    /// back to the default rather than aborting.
    pub fn from_env() -> Self {
        let intake_dir = std::env::var("SORTER_INPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_INTAKE_DIR));

        let archive_root = std::env::var("SORTER_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARCHIVE_ROOT));

        let interval_secs = std::env::var("SORTER_CHECK_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS);

        Self {
            intake_dir,
            archive_root,
            poll_interval: Duration::from_secs(interval_secs),
            years: SUPPORTED_YEARS,
        }
    }
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            intake_dir: PathBuf::from(DEFAULT_INTAKE_DIR),
            archive_root: PathBuf::from(DEFAULT_ARCHIVE_ROOT),
            poll_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            years: SUPPORTED_YEARS,
        }
    }
}
