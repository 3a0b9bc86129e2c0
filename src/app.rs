//! Command dispatch for the `armpup` binary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use yansi::Paint;

use crate::auth::{self, Authenticator, StdinPrompt};
use crate::capture::ExifReader;
use crate::cli::{CheckArgs, Cli, Commands, ReportFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::library::{DayCache, GooglePhotosClient};
use crate::logging::init_logging;
use crate::output::{HtmlOutput, JsonOutput};
use crate::paths::{default_config_file, AppPaths};
use crate::platform::open_in_browser;
use crate::progress::Progress;
use crate::reconcile::{FileReport, ReconcileSummary, Reconciler};
use crate::scanner::{Walker, WalkerConfig};
use crate::signal;

/// Run the parsed command line and return the process exit code.
///
/// # Errors
///
/// Returns any configuration, sign-in, enumeration, remote search or report
/// failure, with context.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match &cli.command {
        Commands::Check(args) => check(&cli, args, config),
        Commands::Auth => {
            let paths = prepare_cache_dir(&config)?;
            let oauth = auth::load_or_prompt_config(&paths.oauth_config, &mut StdinPrompt)?;
            Authenticator::new(oauth, &paths)?.sign_in(&mut StdinPrompt)?;
            println!("Token saved to {}", paths.token.display());
            Ok(ExitCode::Success)
        }
        Commands::Paths => {
            let paths = AppPaths::resolve(config.cache_dir.as_deref())?;
            let config_file = match &cli.config {
                Some(path) => path.clone(),
                None => default_config_file()?,
            };
            println!("config:  {}", config_file.display());
            println!("cache:   {}", paths.cache_dir.display());
            println!("oauth:   {}", paths.oauth_config.display());
            println!("token:   {}", paths.token.display());
            Ok(ExitCode::Success)
        }
    }
}

fn prepare_cache_dir(config: &Config) -> anyhow::Result<AppPaths> {
    let paths = AppPaths::resolve(config.cache_dir.as_deref())?;
    paths.ensure_cache_dir().with_context(|| {
        format!(
            "Failed to create cache directory {}",
            paths.cache_dir.display()
        )
    })?;
    Ok(paths)
}

fn check(cli: &Cli, args: &CheckArgs, mut config: Config) -> anyhow::Result<ExitCode> {
    config.apply_check_args(args);
    config.validate()?;
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler()?;

    let walker = Walker::new(
        &args.path,
        WalkerConfig::new(config.recursive, config.skip_hidden),
    );
    let files = walker.collect_files()?;
    log::info!("Found {} files in {}", files.len(), args.path.display());

    let paths = prepare_cache_dir(&config)?;
    let oauth = auth::load_or_prompt_config(&paths.oauth_config, &mut StdinPrompt)
        .context("Failed to load OAuth client configuration")?;
    let token = Authenticator::new(oauth, &paths)?
        .access_token(&mut StdinPrompt)
        .context("Failed to obtain an access token")?;

    let client = GooglePhotosClient::with_timeout(
        token.access_token,
        Duration::from_secs(config.request_timeout_secs),
    )?
    .with_api_base(&config.api_base_url)
    .with_page_size(config.page_size);

    let mut reconciler = Reconciler::new(DayCache::new(client), ExifReader)
        .with_shutdown(shutdown)
        .with_progress(Arc::new(Progress::new(cli.quiet)));
    let (reports, summary) = reconciler
        .run(files)
        .context("Failed to query the remote library")?;

    let report_path = write_report(
        &reports,
        &summary,
        config.format,
        args.output_file.as_deref(),
    )?;

    if !cli.quiet {
        print_summary(&summary);
    }
    println!("Output written to {}", report_path.display());

    if config.open_report {
        if let Err(e) = open_in_browser(&report_path) {
            log::warn!("Failed to open {}: {}", report_path.display(), e);
        }
    }

    Ok(summary.exit_code())
}

/// Write the report to `output`, or a new `armpup-*` temp file, and return
/// its path.
fn write_report(
    reports: &[FileReport],
    summary: &ReconcileSummary,
    format: ReportFormat,
    output: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let (file, path) = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            (file, path.to_path_buf())
        }
        None => tempfile::Builder::new()
            .prefix("armpup-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()
            .context("Failed to create report file")?
            .keep()
            .context("Failed to keep report file")?,
    };

    let mut writer = BufWriter::new(file);
    match format {
        ReportFormat::Html => HtmlOutput::new(reports, summary).write_to(&mut writer)?,
        ReportFormat::Json => JsonOutput::new(reports, summary).write_to(&mut writer, true)?,
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn print_summary(summary: &ReconcileSummary) {
    if summary.interrupted {
        println!(
            "{} after {} of {} files",
            "Interrupted".yellow().bold(),
            summary.checked_files,
            summary.total_files
        );
    }
    let not_found = if summary.not_found > 0 {
        summary.not_found.red().bold()
    } else {
        summary.not_found.green()
    };
    println!(
        "{} uploaded, {} not found, {} without EXIF date ({} remote searches in {:.1?})",
        summary.matched.green(),
        not_found,
        summary.no_capture_time.yellow(),
        summary.remote_queries,
        summary.duration
    );
}
