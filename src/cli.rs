//! Command-line interface definitions for armpup.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Check a folder and write an HTML report to a temp file
//! armpup check ~/Pictures/2021-06
//!
//! # JSON report to a chosen path, walking subfolders
//! armpup check ~/Pictures --recursive --format json --output-file report.json
//!
//! # Sign in without checking anything
//! armpup auth
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Check whether the photos in a folder have been uploaded to Google Photos.
///
/// Each local photo is matched to a remote item by its EXIF capture time.
#[derive(Debug, Parser)]
#[command(name = "armpup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check a directory of photos against the remote library
    Check(CheckArgs),
    /// Run the OAuth sign-in and store the token
    Auth,
    /// Print the configuration and cache paths in use
    Paths,
}

/// Arguments for the check subcommand.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Directory containing the photos to check
    #[arg(value_name = "DIR")]
    pub path: PathBuf,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Write the report here instead of a new temporary file
    #[arg(short, long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Open the report in the default browser when done
    #[arg(long)]
    pub open: bool,

    /// Also check photos in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Items requested per search page (1-100)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: Option<u32>,
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Self-contained HTML table with thumbnails
    #[default]
    Html,
    /// Machine-readable JSON
    Json,
}

impl ReportFormat {
    /// File extension for reports in this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
