//! Application configuration management.
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` (platform config directory, or `--config`)
//! 3. `ARMPUP_*` environment variables (e.g. `ARMPUP_PAGE_SIZE=50`)
//! 4. Command-line flags
//!
//! # Example
//!
//! ```toml
//! page_size = 100
//! request_timeout_secs = 30
//! recursive = false
//! skip_hidden = true
//! format = "html"
//! open_report = false
//! ```

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{CheckArgs, ReportFormat};
use crate::library::google::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, MAX_PAGE_SIZE};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "ARMPUP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Override for the OAuth credential cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Root URL of the Photos Library API.
    pub api_base_url: String,
    /// Items requested per search page.
    pub page_size: u32,
    /// HTTP timeout for each request.
    pub request_timeout_secs: u64,
    /// Check subdirectories too.
    pub recursive: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Report format.
    pub format: ReportFormat,
    /// Open the report in a browser when done.
    pub open_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            api_base_url: DEFAULT_API_BASE.to_string(),
            page_size: MAX_PAGE_SIZE,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            recursive: false,
            skip_hidden: false,
            format: ReportFormat::Html,
            open_report: false,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or did not match the schema.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A value is outside its allowed range.
    #[error("Invalid configuration value for '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl Config {
    /// Load configuration from `path` (if given) or the default location.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if !path.exists() => Err(ConfigError::Invalid {
                field: "config",
                message: format!("file not found: {}", path.display()),
            }),
            Some(path) => Self::load_from_path(path),
            None => match crate::paths::default_config_file() {
                Ok(path) => Self::load_from_path(&path),
                Err(e) => {
                    log::debug!("No default config location, using defaults: {}", e);
                    Self::from_figment(Self::figment(None))
                }
            },
        }
    }

    /// Load configuration layered over the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading configuration from {}", path.display());
        Self::from_figment(Self::figment(Some(path)))
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                field: "page_size",
                message: format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                message: format!("not an http(s) URL: {}", self.api_base_url),
            });
        }
        Ok(())
    }

    /// Apply flags from the `check` subcommand on top of this configuration.
    pub fn apply_check_args(&mut self, args: &CheckArgs) {
        if let Some(format) = args.format {
            self.format = format;
        }
        if let Some(page_size) = args.page_size {
            self.page_size = page_size;
        }
        self.recursive |= args.recursive;
        self.skip_hidden |= args.skip_hidden;
        self.open_report |= args.open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 100);
        assert_eq!(config.format, ReportFormat::Html);
    }

    #[test]
    fn test_validate_page_size() {
        let config = Config {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "page_size", .. })
        ));
    }

    #[test]
    fn test_validate_api_base() {
        let config = Config {
            api_base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_check_args() {
        let mut config = Config::default();
        let args = CheckArgs {
            path: PathBuf::from("/photos"),
            format: Some(ReportFormat::Json),
            output_file: None,
            open: true,
            recursive: false,
            skip_hidden: true,
            page_size: Some(25),
        };
        config.apply_check_args(&args);

        assert_eq!(config.format, ReportFormat::Json);
        assert_eq!(config.page_size, 25);
        assert!(config.open_report);
        assert!(config.skip_hidden);
        assert!(!config.recursive);
    }
}
