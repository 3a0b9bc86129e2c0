//! HTML report of a reconciliation run.
//!
//! One table row per local file, with the local photo next to its remote
//! match. Files with no capture time are highlighted amber and files with no
//! remote match red. All CSS is embedded so the report can be opened
//! straight from a temporary directory.
//!
//! # Usage
//!
//! ```rust,ignore
//! use armpup::output::html::HtmlOutput;
//!
//! let output = HtmlOutput::new(&reports, &summary);
//! let html = output.to_html().unwrap();
//! ```

use std::io::Write;
use std::path::Path;

use askama::Template;
use bytesize::ByteSize;
use chrono::Local;
use url::Url;

use crate::reconcile::{FileReport, Outcome, ReconcileSummary, RemoteMatch};

/// Complete HTML output structure for the Askama template.
#[derive(Template)]
#[template(path = "report.html")]
pub struct HtmlOutput {
    /// Formatted generation timestamp
    pub timestamp: String,
    /// Application version
    pub version: String,
    pub summary: ReconcileSummary,
    /// Human-readable run duration
    pub duration: String,
    pub rows: Vec<HtmlRow>,
}

/// A checked file formatted for HTML presentation.
pub struct HtmlRow {
    /// Row CSS class: empty, `warning` or `danger`
    pub class: &'static str,
    /// File name
    pub name: String,
    /// Full path, shown as a tooltip
    pub path: String,
    /// `file://` URL of the local image
    pub local_src: String,
    /// Human-readable file size
    pub size: String,
    /// Capture time, when known
    pub captured_at: String,
    /// Matching remote item
    pub remote: Option<RemoteMatch>,
    /// Status text for unmatched rows
    pub message: String,
}

impl From<&FileReport> for HtmlRow {
    fn from(report: &FileReport) -> Self {
        let (class, remote, message) = match &report.outcome {
            Outcome::Matched(remote) => ("", Some(remote.clone()), String::new()),
            Outcome::NotFound => ("danger", None, "Not Found!".to_string()),
            Outcome::NoCaptureTime(_) => ("warning", None, "No EXIF date found.".to_string()),
        };
        Self {
            class,
            name: report.file.name.clone(),
            path: report.file.path.to_string_lossy().into_owned(),
            local_src: file_url(&report.file.path),
            size: ByteSize::b(report.file.size).to_string(),
            captured_at: report
                .captured_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S %:z").to_string())
                .unwrap_or_default(),
            remote,
            message,
        }
    }
}

impl HtmlOutput {
    /// Build the report for a run.
    #[must_use]
    pub fn new(reports: &[FileReport], summary: &ReconcileSummary) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            summary: summary.clone(),
            duration: format_duration(summary.duration),
            rows: reports.iter().map(HtmlRow::from).collect(),
        }
    }

    /// Generate the HTML string using the embedded template.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn to_html(&self) -> Result<String, askama::Error> {
        self.render()
    }

    /// Write HTML report to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), HtmlOutputError> {
        let html = self.to_html()?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }
}

/// `file://` URL for a local path, falling back to the path itself.
fn file_url(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|()| path.to_string_lossy().into_owned())
}

/// Format a duration as a human-readable string.
fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, duration.subsec_millis())
    } else {
        format!("{}ms", duration.subsec_millis())
    }
}

/// Errors that can occur during HTML output generation.
#[derive(thiserror::Error, Debug)]
pub enum HtmlOutputError {
    /// Template rendering error
    #[error("HTML template error: {0}")]
    Template(#[from] askama::Error),

    /// I/O error during writing
    #[error("I/O error during HTML generation: {0}")]
    Io(#[from] std::io::Error),
}
