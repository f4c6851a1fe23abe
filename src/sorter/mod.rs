//! Intake loop
//!
//! The sole active component: scans the intake directory, runs each PDF
//! through extraction and classification, derives the archive destination
//! and moves the file there. Files are processed one at a time, in
//! lexicographic order, and every per-file failure is logged and skipped;
//! the file stays in the intake directory and is retried on the next
//! cycle. Only startup (skeleton creation) can abort the process.

pub mod progress;

use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::archive::{self, ArchiveError};
use crate::classify::{Classifier, ClassifyError};
use crate::config::{candidate_labels, DocumentCategory, SorterConfig};
use crate::extract::{ExtractError, TextExtractor};

/// Errors from processing a single intake file
#[derive(Debug, Error)]
pub enum SorterError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// Extraction yielded no text (image-only or corrupted PDF)
    #[error("No text extracted from {}", path.display())]
    EmptyText { path: PathBuf },

    /// The classifier answered with a label outside the configured set
    #[error("Unknown label '{label}' for {}", path.display())]
    UnknownLabel { label: String, path: PathBuf },

    /// The file could not be relocated
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Polling document sorter over an intake directory
pub struct IntakeSorter<E, C> {
    config: SorterConfig,
    extractor: E,
    classifier: C,
}

impl<E: TextExtractor, C: Classifier> IntakeSorter<E, C> {
    pub fn new(config: SorterConfig, extractor: E, classifier: C) -> Self {
        Self {
            config,
            extractor,
            classifier,
        }
    }

    /// Run until the token is cancelled
    ///
    /// Each iteration processes every file currently in the intake
    /// directory, then counts down the configured interval. Cancellation
    /// is observed between cycles and at every countdown tick.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(
            "Monitoring {} for incoming documents...",
            self.config.intake_dir.display()
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let started = Instant::now();
            let processed = self.run_cycle().await;
            if processed > 0 {
                tracing::info!(
                    "Processed {} files in {:.2} seconds.",
                    processed,
                    started.elapsed().as_secs_f64()
                );
            }

            if self.countdown(&shutdown).await {
                break;
            }
        }
    }

    /// Process every PDF currently in the intake directory
    ///
    /// Returns the number of files successfully moved. Per-file failures
    /// are logged and skipped; the files remain in place for the next
    /// cycle. A listing failure logs an error and processes nothing.
    pub async fn run_cycle(&self) -> usize {
        let files = match self.scan_intake() {
            Ok(files) => files,
            Err(e) => {
                tracing::error!(
                    "Failed to list intake directory {}: {}",
                    self.config.intake_dir.display(),
                    e
                );
                return 0;
            }
        };

        if files.is_empty() {
            tracing::info!(
                "No PDF files to sort. Checking again in {} seconds.",
                self.config.poll_interval.as_secs()
            );
            return 0;
        }

        let mut processed = 0;
        for path in files {
            match self.process_file(&path).await {
                Ok(destination) => {
                    processed += 1;
                    tracing::info!("Moved {} to {}", path.display(), destination.display());
                }
                Err(e @ (SorterError::EmptyText { .. } | SorterError::UnknownLabel { .. })) => {
                    tracing::warn!("{}. Skipping.", e);
                }
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", path.display(), e);
                }
            }
        }

        processed
    }

    /// Extract, classify, and move a single file
    async fn process_file(&self, path: &Path) -> Result<PathBuf, SorterError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let text = self.extractor.extract(path)?;
        if text.trim().is_empty() {
            return Err(SorterError::EmptyText {
                path: path.to_path_buf(),
            });
        }

        let labels = candidate_labels();
        let result = self.classifier.classify(&text, &labels).await?;
        tracing::debug!(
            "Classified {} as {} with confidence {:.2}",
            path.display(),
            result.label,
            result.score
        );

        let category = DocumentCategory::from_label(&result.label).ok_or_else(|| {
            SorterError::UnknownLabel {
                label: result.label.clone(),
                path: path.to_path_buf(),
            }
        })?;

        tracing::info!("Document {} classified as: {}", file_name, category.label());
        progress::sorting_line(
            &file_name,
            category.label(),
            self.config.poll_interval.as_secs(),
        );
        progress::end_line();

        let today = Local::now().date_naive();
        let target_dir = archive::destination_dir(&self.config.archive_root, category, today);

        // The skeleton covers the configured year span; re-create in case
        // the wall clock has moved past it
        fs::create_dir_all(&target_dir).map_err(|source| ArchiveError::CreateDir {
            path: target_dir.clone(),
            source,
        })?;

        let destination = archive::resolve_collision(&target_dir, &file_name)?;
        move_file(path, &destination)?;

        Ok(destination)
    }

    /// List PDF files in the intake directory, lexicographic by name
    ///
    /// Skips subdirectories, dotfiles, and `*.tmp` partial downloads.
    /// The order is stable within a cycle so behavior is reproducible.
    fn scan_intake(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.config.intake_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with('.') || file_name.ends_with(".tmp") {
                continue;
            }

            let is_pdf = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if is_pdf {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Per-second countdown until the next cycle; true when cancelled
    async fn countdown(&self, shutdown: &CancellationToken) -> bool {
        let total = self.config.poll_interval.as_secs();
        for remaining in (1..=total).rev() {
            progress::countdown_line(remaining);
            tokio::select! {
                _ = shutdown.cancelled() => {
                    progress::end_line();
                    return true;
                }
                _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            }
        }
        progress::end_line();
        false
    }
}

/// Move a file, preferring an atomic rename
///
/// Falls back to copy+delete when rename fails (cross-device archive
/// root). The fallback cleans up after itself so the file is never left
/// present at both paths or at neither: a failed copy removes the partial
/// destination, and a failed source delete removes the copied destination.
fn move_file(source: &Path, destination: &Path) -> Result<(), SorterError> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    if let Err(e) = fs::copy(source, destination) {
        let _ = fs::remove_file(destination);
        return Err(SorterError::Move {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        });
    }

    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(destination);
        return Err(SorterError::Move {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::tempdir;

    /// Extractor returning the same text for every file
    struct StubExtractor(&'static str);

    impl TextExtractor for StubExtractor {
        fn extract(&self, _path: &Path) -> Result<String, ExtractError> {
            Ok(self.0.to_string())
        }
    }

    /// Classifier returning a fixed label with high confidence
    struct StubClassifier(&'static str);

    #[async_trait]
    impl Classifier for StubClassifier {
        async fn classify(
            &self,
            _text: &str,
            _candidate_labels: &[&str],
        ) -> Result<Classification, ClassifyError> {
            Ok(Classification {
                label: self.0.to_string(),
                score: 0.9,
            })
        }
    }

    /// Classifier that always errors, as if the backend were down
    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        async fn classify(
            &self,
            _text: &str,
            _candidate_labels: &[&str],
        ) -> Result<Classification, ClassifyError> {
            Err(ClassifyError::EmptyResponse)
        }
    }

    fn test_config(intake: &Path, archive: &Path) -> SorterConfig {
        SorterConfig {
            intake_dir: intake.to_path_buf(),
            archive_root: archive.to_path_buf(),
            poll_interval: Duration::from_secs(1),
            years: 2020..=2030,
        }
    }

    fn expected_dir(archive: &Path, category: DocumentCategory) -> PathBuf {
        archive::destination_dir(archive, category, Local::now().date_naive())
    }

    #[tokio::test]
    async fn test_cycle_moves_classified_file() {
        let intake = tempdir().unwrap();
        let archive_root = tempdir().unwrap();
        fs::write(intake.path().join("report_2024.pdf"), "pdf bytes").unwrap();

        let sorter = IntakeSorter::new(
            test_config(intake.path(), archive_root.path()),
            StubExtractor("Годишен отчет за финансовото състояние"),
            StubClassifier("Report"),
        );

        let processed = sorter.run_cycle().await;

        assert_eq!(processed, 1);
        assert!(!intake.path().join("report_2024.pdf").exists());
        let destination =
            expected_dir(archive_root.path(), DocumentCategory::Report).join("report_2024.pdf");
        assert!(destination.exists(), "missing {}", destination.display());
    }

    #[tokio::test]
    async fn test_empty_text_leaves_file_in_intake() {
        let intake = tempdir().unwrap();
        let archive_root = tempdir().unwrap();
        fs::write(intake.path().join("scan.pdf"), "pdf bytes").unwrap();

        let sorter = IntakeSorter::new(
            test_config(intake.path(), archive_root.path()),
            StubExtractor("   \n "),
            StubClassifier("Report"),
        );

        let processed = sorter.run_cycle().await;

        assert_eq!(processed, 0);
        assert!(intake.path().join("scan.pdf").exists());
    }

    #[tokio::test]
    async fn test_classifier_failure_is_retried_next_cycle() {
        let intake = tempdir().unwrap();
        let archive_root = tempdir().unwrap();
        fs::write(intake.path().join("doc.pdf"), "pdf bytes").unwrap();

        let failing = IntakeSorter::new(
            test_config(intake.path(), archive_root.path()),
            StubExtractor("invoice text"),
            FailingClassifier,
        );
        assert_eq!(failing.run_cycle().await, 0);
        assert!(intake.path().join("doc.pdf").exists());

        // Next cycle with a healthy backend picks the file up again
        let healthy = IntakeSorter::new(
            test_config(intake.path(), archive_root.path()),
            StubExtractor("invoice text"),
            StubClassifier("Invoice"),
        );
        assert_eq!(healthy.run_cycle().await, 1);
        assert!(!intake.path().join("doc.pdf").exists());
    }

    #[tokio::test]
    async fn test_unknown_label_leaves_file_in_intake() {
        let intake = tempdir().unwrap();
        let archive_root = tempdir().unwrap();
        fs::write(intake.path().join("doc.pdf"), "pdf bytes").unwrap();

        let sorter = IntakeSorter::new(
            test_config(intake.path(), archive_root.path()),
            StubExtractor("some text"),
            StubClassifier("Memo"),
        );

        assert_eq!(sorter.run_cycle().await, 0);
        assert!(intake.path().join("doc.pdf").exists());
    }

    #[tokio::test]
    async fn test_collision_gets_numeric_suffix() {
        let intake = tempdir().unwrap();
        let archive_root = tempdir().unwrap();

        let target = expected_dir(archive_root.path(), DocumentCategory::Invoice);
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("invoice.pdf"), "already archived").unwrap();

        fs::write(intake.path().join("invoice.pdf"), "new arrival").unwrap();

        let sorter = IntakeSorter::new(
            test_config(intake.path(), archive_root.path()),
            StubExtractor("Фактура за услуги"),
            StubClassifier("Invoice"),
        );

        assert_eq!(sorter.run_cycle().await, 1);
        assert_eq!(
            fs::read_to_string(target.join("invoice.pdf")).unwrap(),
            "already archived"
        );
        assert_eq!(
            fs::read_to_string(target.join("invoice_1.pdf")).unwrap(),
            "new arrival"
        );
    }

    #[tokio::test]
    async fn test_scan_order_is_lexicographic_and_filtered() {
        let intake = tempdir().unwrap();
        let archive_root = tempdir().unwrap();

        fs::write(intake.path().join("b.pdf"), "x").unwrap();
        fs::write(intake.path().join("a.pdf"), "x").unwrap();
        fs::write(intake.path().join("C.PDF"), "x").unwrap();
        fs::write(intake.path().join("notes.txt"), "x").unwrap();
        fs::write(intake.path().join(".hidden.pdf"), "x").unwrap();
        fs::write(intake.path().join("partial.pdf.tmp"), "x").unwrap();
        fs::create_dir(intake.path().join("subdir.pdf")).unwrap();

        let sorter = IntakeSorter::new(
            test_config(intake.path(), archive_root.path()),
            StubExtractor("text"),
            StubClassifier("Report"),
        );

        let names: Vec<String> = sorter
            .scan_intake()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["C.PDF", "a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_run_stops_when_cancelled() {
        let intake = tempdir().unwrap();
        let archive_root = tempdir().unwrap();

        let sorter = IntakeSorter::new(
            test_config(intake.path(), archive_root.path()),
            StubExtractor("text"),
            StubClassifier("Report"),
        );

        let shutdown = CancellationToken::new();
        shutdown.cancel();

        // Pre-cancelled token: run returns after at most one cycle
        tokio::time::timeout(Duration::from_secs(5), sorter.run(shutdown))
            .await
            .expect("run did not observe cancellation");
    }

    #[test]
    fn test_move_file_rename() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.pdf");
        let destination = dir.path().join("b.pdf");
        fs::write(&source, "content").unwrap();

        move_file(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "content");
    }
}
