//! Reconciliation driver.
//!
//! Walks a list of local files, reads each capture time and asks the
//! [`DayCache`] whether a remote item with the same creation time exists.
//!
//! # Example
//!
//! ```
//! use armpup::capture::ExifReader;
//! use armpup::library::{DayCache, InMemorySource};
//! use armpup::reconcile::Reconciler;
//!
//! let cache = DayCache::new(InMemorySource::new(Vec::new()));
//! let mut reconciler = Reconciler::new(cache, ExifReader);
//! let (reports, summary) = reconciler.run(Vec::new()).unwrap();
//! assert!(reports.is_empty());
//! assert_eq!(summary.total_files, 0);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::capture::CaptureTimeReader;
use crate::error::ExitCode;
use crate::library::{DayCache, LibraryError, MediaItem, MediaSource};
use crate::progress::ProgressCallback;
use crate::scanner::LocalFile;
use crate::signal::ShutdownHandler;

/// Display attributes of a matched remote item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteMatch {
    pub id: String,
    pub product_url: String,
    pub base_url: String,
    pub filename: String,
}

impl From<&MediaItem> for RemoteMatch {
    fn from(item: &MediaItem) -> Self {
        Self {
            id: item.id.clone(),
            product_url: item.product_url.clone(),
            base_url: item.base_url.clone(),
            filename: item.filename.clone(),
        }
    }
}

/// Result of checking one local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A remote item has the same creation time.
    Matched(RemoteMatch),
    /// The day was searched and nothing matched.
    NotFound,
    /// No capture time could be read from the file.
    NoCaptureTime(String),
}

impl Outcome {
    /// Short machine-readable name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Matched(_) => "matched",
            Outcome::NotFound => "not_found",
            Outcome::NoCaptureTime(_) => "no_capture_time",
        }
    }
}

/// One row of the reconciliation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: LocalFile,
    pub captured_at: Option<DateTime<FixedOffset>>,
    pub outcome: Outcome,
}

/// Totals for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Files handed to the run
    pub total_files: usize,
    /// Files checked before the run ended
    pub checked_files: usize,
    pub matched: usize,
    pub not_found: usize,
    pub no_capture_time: usize,
    /// Remote searches issued
    pub remote_queries: usize,
    /// Days resolved in the lookup cache
    pub days_resolved: usize,
    pub duration: Duration,
    /// Whether Ctrl+C stopped the run early
    pub interrupted: bool,
}

impl ReconcileSummary {
    /// Exit code describing this run.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.interrupted {
            ExitCode::Interrupted
        } else if self.not_found > 0 {
            ExitCode::MissingPhotos
        } else if self.no_capture_time > 0 {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }
    }
}

/// Drives a reconciliation run over an injected lookup cache.
pub struct Reconciler<S, R> {
    cache: DayCache<S>,
    reader: R,
    shutdown: ShutdownHandler,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl<S: MediaSource, R: CaptureTimeReader> Reconciler<S, R> {
    /// Create a driver over `cache`, reading capture times with `reader`.
    #[must_use]
    pub fn new(cache: DayCache<S>, reader: R) -> Self {
        Self {
            cache,
            reader,
            shutdown: ShutdownHandler::new(),
            progress: None,
        }
    }

    /// Set the cancellation context.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownHandler) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The lookup cache.
    #[must_use]
    pub fn cache(&self) -> &DayCache<S> {
        &self.cache
    }

    /// Check every file in order.
    ///
    /// Stops early, without error, when shutdown is requested between files.
    ///
    /// # Errors
    ///
    /// Any remote lookup failure aborts the run and is returned unchanged,
    /// except a cancellation during a search, which ends the run like a
    /// shutdown between files.
    pub fn run(
        &mut self,
        files: Vec<LocalFile>,
    ) -> Result<(Vec<FileReport>, ReconcileSummary), LibraryError> {
        let start = Instant::now();
        let mut summary = ReconcileSummary {
            total_files: files.len(),
            ..Default::default()
        };
        let mut reports = Vec::with_capacity(files.len());

        if let Some(progress) = &self.progress {
            progress.on_phase_start("reconcile", files.len());
        }

        for (index, file) in files.into_iter().enumerate() {
            if self.shutdown.is_shutdown_requested() {
                summary.interrupted = true;
                break;
            }
            if let Some(progress) = &self.progress {
                progress.on_progress(index + 1, &file.name);
            }

            let report = match self.check(file) {
                Ok(report) => report,
                Err(LibraryError::Cancelled) => {
                    summary.interrupted = true;
                    break;
                }
                Err(err) => {
                    if let Some(progress) = &self.progress {
                        progress.on_phase_end("reconcile");
                    }
                    return Err(err);
                }
            };

            match &report.outcome {
                Outcome::Matched(_) => summary.matched += 1,
                Outcome::NotFound => summary.not_found += 1,
                Outcome::NoCaptureTime(_) => summary.no_capture_time += 1,
            }
            summary.checked_files += 1;
            reports.push(report);
        }

        if let Some(progress) = &self.progress {
            progress.on_phase_end("reconcile");
        }

        let stats = self.cache.stats();
        summary.remote_queries = stats.queries;
        summary.days_resolved = self.cache.resolved_days();
        summary.duration = start.elapsed();

        log::info!(
            "Checked {} of {} files: {} matched, {} not found, {} without date ({} remote queries)",
            summary.checked_files,
            summary.total_files,
            summary.matched,
            summary.not_found,
            summary.no_capture_time,
            summary.remote_queries
        );
        Ok((reports, summary))
    }

    fn check(&mut self, file: LocalFile) -> Result<FileReport, LibraryError> {
        let captured_at = match self.reader.capture_time(&file.path) {
            Ok(t) => t,
            Err(e) => {
                log::debug!("{}", e);
                return Ok(FileReport {
                    file,
                    captured_at: None,
                    outcome: Outcome::NoCaptureTime(e.to_string()),
                });
            }
        };

        let outcome = match self.cache.lookup(&captured_at, &self.shutdown)? {
            Some(item) => Outcome::Matched(RemoteMatch::from(item)),
            None => {
                log::debug!(
                    "No remote item for {} taken at {}",
                    file.name,
                    captured_at.to_rfc3339()
                );
                if let Some(progress) = &self.progress {
                    progress.on_message(&format!("Not uploaded: {}", file.path.display()));
                }
                Outcome::NotFound
            }
        };

        Ok(FileReport {
            file,
            captured_at: Some(captured_at),
            outcome,
        })
    }
}
