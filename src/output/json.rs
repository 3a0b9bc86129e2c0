//! JSON report of a reconciliation run.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "files": [
//!     {
//!       "path": "/photos/IMG_0001.JPG",
//!       "name": "IMG_0001.JPG",
//!       "size": 2048576,
//!       "captured_at": "2021-06-01T08:00:00-04:00",
//!       "status": "matched",
//!       "remote": {
//!         "id": "AF1Qip...",
//!         "product_url": "https://photos.google.com/lr/photo/AF1Qip...",
//!         "base_url": "https://lh3.googleusercontent.com/...",
//!         "filename": "IMG_0001.JPG"
//!       }
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 1,
//!     "matched": 1,
//!     "not_found": 0,
//!     "no_capture_time": 0,
//!     "remote_queries": 1,
//!     "duration_ms": 812,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "AP000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::reconcile::{FileReport, Outcome, ReconcileSummary, RemoteMatch};

/// One checked file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFileReport {
    /// Full path of the local file
    pub path: String,
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Capture time with its original offset, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
    /// `matched`, `not_found` or `no_capture_time`
    pub status: &'static str,
    /// Why no capture time was read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The matching remote item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteMatch>,
}

impl From<&FileReport> for JsonFileReport {
    fn from(report: &FileReport) -> Self {
        let (remote, reason) = match &report.outcome {
            Outcome::Matched(remote) => (Some(remote.clone()), None),
            Outcome::NotFound => (None, None),
            Outcome::NoCaptureTime(reason) => (None, Some(reason.clone())),
        };
        Self {
            path: report.file.path.to_string_lossy().into_owned(),
            name: report.file.name.clone(),
            size: report.file.size,
            captured_at: report.captured_at.map(|t| t.to_rfc3339()),
            status: report.outcome.as_str(),
            reason,
            remote,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub checked_files: usize,
    pub matched: usize,
    pub not_found: usize,
    pub no_capture_time: usize,
    /// Remote searches issued
    pub remote_queries: usize,
    /// Days with a completed search
    pub days_resolved: usize,
    pub duration_ms: u64,
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "AP000")
    pub exit_code_name: String,
}

impl From<&ReconcileSummary> for JsonSummary {
    fn from(summary: &ReconcileSummary) -> Self {
        let exit_code = summary.exit_code();
        Self {
            total_files: summary.total_files,
            checked_files: summary.checked_files,
            matched: summary.matched,
            not_found: summary.not_found,
            no_capture_time: summary.no_capture_time,
            remote_queries: summary.remote_queries,
            days_resolved: summary.days_resolved,
            duration_ms: summary.duration.as_millis() as u64,
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub files: Vec<JsonFileReport>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the report for a run.
    ///
    /// # Example
    ///
    /// ```
    /// use armpup::output::json::JsonOutput;
    /// use armpup::reconcile::ReconcileSummary;
    ///
    /// let output = JsonOutput::new(&[], &ReconcileSummary::default());
    /// assert_eq!(output.summary.exit_code_name, "AP000");
    /// ```
    #[must_use]
    pub fn new(reports: &[FileReport], summary: &ReconcileSummary) -> Self {
        Self {
            files: reports.iter().map(JsonFileReport::from).collect(),
            summary: JsonSummary::from(summary),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
