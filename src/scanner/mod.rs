//! Local file enumeration.
//!
//! This module provides functionality for listing the photo files of a
//! directory that will be checked against the remote library.
//!
//! # Example
//!
//! ```no_run
//! use armpup::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for file in walker.collect_files().unwrap() {
//!     println!("{}: {} bytes", file.path.display(), file.size);
//! }
//! ```

pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

pub use walker::Walker;

/// A local file to reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Path to the file
    pub path: PathBuf,
    /// File name as shown in the report
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl LocalFile {
    /// Create a new LocalFile, deriving the display name from the path.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            path,
            name,
            size,
            modified,
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Descend into subdirectories.
    pub recursive: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl WalkerConfig {
    #[must_use]
    pub fn new(recursive: bool, skip_hidden: bool) -> Self {
        Self {
            recursive,
            skip_hidden,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
