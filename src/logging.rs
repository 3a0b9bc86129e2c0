//! Logging setup on the `log` facade with an `env_logger` backend.
//!
//! The level comes from, in priority order:
//!
//! 1. `RUST_LOG` (if set)
//! 2. `--quiet` (errors only) or `--verbose` (debug, trace)
//! 3. Default: info
//!
//! HTTP client internals are capped at `warn` unless tracing (`-vv`), so
//! `-v` shows the searches issued without connection-pool chatter.
//!
//! # Example
//!
//! ```rust,no_run
//! use armpup::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("Searching 2021-05-31..2021-06-03");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Crates whose logs are only shown when tracing.
const NOISY_DEPENDENCIES: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls"];

/// Initialize the logger from CLI verbosity flags.
///
/// Call once, before any logging.
///
/// # Panics
///
/// Panics if a logger is already installed.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        let level = determine_level(verbose, quiet);
        builder.filter_level(level);
        if level < LevelFilter::Trace {
            for name in NOISY_DEPENDENCIES {
                builder.filter_module(name, level.min(LevelFilter::Warn));
            }
        }
    }

    configure_format(&mut builder, verbose);
    builder.init();
    log::debug!("Logging initialized at level {}", log::max_level());
}

/// Map CLI flags to a level; `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Debug builds and `-v` runs get timestamps and module paths; plain
/// release runs get level and message only.
fn configure_format(builder: &mut Builder, verbose: u8) {
    let detailed = cfg!(debug_assertions) || verbose > 0;
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if detailed {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });
}
