//! Directory walker built on `walkdir`.
//!
//! Lists the regular files of a directory in file-name order. Only the top
//! level is read unless [`WalkerConfig::recursive`] is set. Entries that
//! cannot be read are logged and skipped so one unreadable folder does not
//! abort the run.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::{LocalFile, ScanError, WalkerConfig};

/// Directory walker for local photo discovery.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    }

    /// Check that the root exists and is a directory.
    fn validate_root(&self) -> Result<(), ScanError> {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScanError::NotFound(self.root.clone()))
            }
            Err(source) => Err(ScanError::Io {
                path: self.root.clone(),
                source,
            }),
        }
    }

    /// Collect every file under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or is not a directory.
    pub fn collect_files(&self) -> Result<Vec<LocalFile>, ScanError> {
        self.validate_root()?;

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let skip_hidden = self.config.skip_hidden;

        let mut files = Vec::new();
        let walk = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(skip_hidden && Self::is_hidden(e)));

        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    log::warn!("Cannot read metadata for {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.push(LocalFile::new(
                entry.into_path(),
                metadata.len(),
                modified,
            ));
        }

        log::debug!("Found {} files under {}", files.len(), self.root.display());
        Ok(files)
    }
}
