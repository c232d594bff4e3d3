//! # CLI Module
//!
//! Command-line interface for the media organizer.
//!
//! ## Usage
//! ```bash
//! # Move everything from the inbox into the dated library
//! media-foldering organize --input ~/Inbox --output ~/Pictures
//!
//! # Preview with settings from a file
//! media-foldering organize --config settings.json --dry-run
//!
//! # Show what timestamp a file would be filed under
//! media-foldering resolve ~/Inbox/IMG_0001.HEIC --utc-offset +01:00
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_foldering::config::Settings;
use media_foldering::core::organize::{FileOutcome, OrganizeReport, Organizer};
use media_foldering::core::timestamp::{CaptureTimestamp, TargetZone, TimestampResolver};
use media_foldering::error::Result;
use media_foldering::events::{Event, EventChannel, OrganizeEvent, PipelineEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Media Foldering - file photos and videos by when they were taken
#[derive(Parser, Debug)]
#[command(name = "media-foldering")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move media from the input directory into the dated output tree
    Organize {
        /// Settings file (JSON). Defaults to the user config directory if present
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory to take files from
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Root of the dated tree
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// strftime naming pattern, e.g. "%Y/%m/%d/%Y-%m-%d %H-%M"
        #[arg(short, long)]
        pattern: Option<String>,

        /// Show where files would go without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Zone for file names: local, utc or an offset like +01:00
        #[arg(long, allow_hyphen_values = true)]
        utc_offset: Option<String>,

        /// Seconds to wait for each video probe
        #[arg(long)]
        probe_timeout: Option<u64>,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Print the capture timestamp of files without moving them
    Resolve {
        /// Files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Zone for the printed times: local, utc or an offset like +01:00
        #[arg(long, default_value = "local", allow_hyphen_values = true)]
        utc_offset: String,

        /// Seconds to wait for each video probe
        #[arg(long, default_value = "30")]
        probe_timeout: u64,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    media_foldering::init_tracing(cli.verbose);

    match cli.command {
        Commands::Organize {
            config,
            input,
            output,
            pattern,
            dry_run,
            utc_offset,
            probe_timeout,
            include_hidden,
            format,
        } => {
            let flags = Settings {
                input_dir: input,
                output_dir: output,
                name_pattern: pattern,
                extensions: None,
                include_hidden: include_hidden.then_some(true),
                probe_timeout_secs: probe_timeout,
                utc_offset,
            };
            let settings = Settings::discover(config.as_deref())?.merge(flags);
            run_organize(settings, dry_run, format, cli.verbose)
        }
        Commands::Resolve {
            files,
            utc_offset,
            probe_timeout,
            format,
        } => run_resolve(&files, &utc_offset, probe_timeout, format),
    }
}

fn run_organize(settings: Settings, dry_run: bool, format: OutputFormat, verbose: bool) -> Result<()> {
    let term = Term::stderr();
    let config = settings.into_config(dry_run)?;

    if matches!(format, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Media Foldering").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line(&format!(
            "  {} → {}{}",
            display_path(&config.input_dir),
            display_path(&config.output_dir),
            if dry_run {
                style(" (dry run)").yellow().to_string()
            } else {
                String::new()
            }
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(format, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_events = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_events else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Organize(OrganizeEvent::Progress(p)) => {
                    pb.set_position(p.processed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Organize(OrganizeEvent::Failed { path, message }) => {
                    pb.println(format!(
                        "{} {}: {}",
                        style("✗").red(),
                        display_path(&path),
                        message
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = Organizer::new(config).run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = result?;
    match format {
        OutputFormat::Pretty => print_pretty_report(&term, &report, verbose),
        OutputFormat::Json => print_json(&report),
    }

    Ok(())
}

fn print_pretty_report(term: &Term, report: &OrganizeReport, verbose: bool) {
    let heading = if report.dry_run {
        "Dry Run Complete"
    } else {
        "Organize Complete"
    };
    term.write_line(&format!("{} {}", style("✓").green().bold(), heading))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files handled in {:.1}s",
        style(report.total_files()).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();

    let relocated_label = if report.dry_run { "would be moved" } else { "moved" };
    term.write_line(&format!(
        "  {} {}",
        style(report.moved + report.planned).cyan(),
        relocated_label
    ))
    .ok();

    if report.unresolved > 0 {
        term.write_line(&format!(
            "  {} without a capture time (No EXIF)",
            style(report.unresolved).yellow()
        ))
        .ok();
    }
    term.write_line(&format!(
        "  {} duplicates left in place",
        style(report.duplicates).cyan()
    ))
    .ok();
    if report.skipped > 0 {
        term.write_line(&format!("  {} skipped", style(report.skipped).dim()))
            .ok();
    }
    if report.failed > 0 {
        term.write_line(&format!("  {} failed", style(report.failed).red().bold()))
            .ok();
    }
    if !report.scan_errors.is_empty() {
        term.write_line(&format!(
            "  {} unreadable entries",
            style(report.scan_errors.len()).red()
        ))
        .ok();
    }

    if verbose || report.dry_run {
        term.write_line("").ok();
        for outcome in &report.outcomes {
            term.write_line(&format!("  {}", describe_outcome(outcome))).ok();
        }
    }

    if report.failed > 0 {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style("Failed files were left where they were.").dim()
        ))
        .ok();
    }
}

fn describe_outcome(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Moved { from, to, .. } | FileOutcome::Planned { from, to, .. } => format!(
            "{} {} → {}",
            style("→").green(),
            display_path(from),
            display_path(to)
        ),
        FileOutcome::Duplicate { path, existing } => format!(
            "{} {} (same as {})",
            style("=").dim(),
            display_path(path),
            display_path(existing)
        ),
        FileOutcome::Skipped { path, reason } => {
            format!("{} {} ({})", style("-").dim(), display_path(path), reason)
        }
        FileOutcome::Failed { path, message } => {
            format!("{} {}: {}", style("✗").red(), display_path(path), message)
        }
    }
}

fn run_resolve(files: &[PathBuf], utc_offset: &str, probe_timeout: u64, format: OutputFormat) -> Result<()> {
    let zone: TargetZone = utc_offset.parse()?;
    let resolver = TimestampResolver::new(zone).with_probe_timeout(Duration::from_secs(probe_timeout));

    let resolved: Vec<(PathBuf, CaptureTimestamp)> = files
        .iter()
        .map(|file| (file.clone(), resolver.resolve(file)))
        .collect();

    match format {
        OutputFormat::Pretty => {
            let term = Term::stdout();
            for (file, timestamp) in &resolved {
                let line = match timestamp {
                    CaptureTimestamp::Resolved { time, source } => format!(
                        "{}  {}  {}",
                        style(time.format("%Y-%m-%d %H:%M:%S %:z")).cyan(),
                        style(source).dim(),
                        display_path(file)
                    ),
                    CaptureTimestamp::Unresolved => format!(
                        "{}  {}",
                        style("unresolved").yellow(),
                        display_path(file)
                    ),
                };
                term.write_line(&line).ok();
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = resolved
                .iter()
                .map(|(file, timestamp)| serde_json::json!({ "path": file, "timestamp": timestamp }))
                .collect();
            print_json(&entries);
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "failed to serialize output"),
    }
}

/// Home-relative display of a path
fn display_path(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => match path.strip_prefix(&home) {
            Ok(relative) => format!("~/{}", relative.display()),
            Err(_) => path.display().to_string(),
        },
        None => path.display().to_string(),
    }
}
