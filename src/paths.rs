//! Platform paths for configuration and the credential cache.
//!
//! The credential cache directory holds `oauth.json` (client id and secret)
//! and `token.json` (the access and refresh tokens). It is
//! `blachniet.com/AreMyPhotosUploaded` under `$XDG_CACHE_HOME` when that is
//! set, otherwise under `~/.cache` (`%LOCALAPPDATA%` on Windows). Files saved
//! by earlier sign-ins are found in either case.

use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

const XDG_VENDOR_DIR: &str = "blachniet.com";
const XDG_APP_DIR: &str = "AreMyPhotosUploaded";

/// Resolved locations used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Directory holding OAuth files
    pub cache_dir: PathBuf,
    /// OAuth client configuration
    pub oauth_config: PathBuf,
    /// Persisted OAuth token
    pub token: PathBuf,
}

impl AppPaths {
    /// Paths rooted at an explicit cache directory.
    #[must_use]
    pub fn from_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        Self {
            oauth_config: cache_dir.join("oauth.json"),
            token: cache_dir.join("token.json"),
            cache_dir,
        }
    }

    /// Resolve the cache directory, honouring an override first.
    ///
    /// # Errors
    ///
    /// Fails when no home directory can be determined.
    pub fn resolve(cache_override: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(dir) = cache_override {
            return Ok(Self::from_cache_dir(dir));
        }
        let root = match std::env::var_os("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
            Some(xdg) => PathBuf::from(xdg),
            None => fallback_cache_root()?,
        };
        Ok(Self::from_cache_dir(vendor_cache_dir(&root)))
    }

    /// Create the cache directory, owner-only on Unix.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn ensure_cache_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.cache_dir, fs::Permissions::from_mode(0o700))?;
        }
        Ok(())
    }
}

fn vendor_cache_dir(root: &Path) -> PathBuf {
    root.join(XDG_VENDOR_DIR).join(XDG_APP_DIR)
}

fn fallback_cache_root() -> anyhow::Result<PathBuf> {
    let base =
        BaseDirs::new().ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))?;
    if cfg!(windows) {
        Ok(base.cache_dir().to_path_buf())
    } else {
        Ok(base.home_dir().join(".cache"))
    }
}

fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("com", "blachniet", XDG_APP_DIR)
        .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))
}

/// Default location of `config.toml`.
///
/// # Errors
///
/// Fails when no home directory can be determined.
pub fn default_config_file() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cache_dir() {
        let paths = AppPaths::from_cache_dir("/tmp/armpup");
        assert_eq!(paths.oauth_config, PathBuf::from("/tmp/armpup/oauth.json"));
        assert_eq!(paths.token, PathBuf::from("/tmp/armpup/token.json"));
    }

    #[test]
    fn test_override_wins() {
        let paths = AppPaths::resolve(Some(Path::new("/custom"))).unwrap();
        assert_eq!(paths.cache_dir, PathBuf::from("/custom"));
    }

    #[test]
    fn test_vendor_cache_dir_layout() {
        let dir = vendor_cache_dir(Path::new("/home/me/.cache"));
        assert_eq!(
            dir,
            PathBuf::from("/home/me/.cache/blachniet.com/AreMyPhotosUploaded")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_fallback_root_is_home_dot_cache() {
        let base = BaseDirs::new().unwrap();
        assert_eq!(fallback_cache_root().unwrap(), base.home_dir().join(".cache"));
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_cache_dir_is_private() {
        use std::os::unix::fs::PermissionsExt;
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let paths = AppPaths::from_cache_dir(dir.path().join("a").join("b"));
        paths.ensure_cache_dir().unwrap();

        let mode = fs::metadata(&paths.cache_dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
