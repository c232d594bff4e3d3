//! Run orchestration: validate, scan, then plan and move each file in order.

use super::executor::MoveExecutor;
use super::planner::{Decision, OrganizePlanner};
use super::types::{FileOutcome, OrganizeConfig, OrganizeReport, SkipReason};
use crate::core::allocate::PathAllocator;
use crate::core::scanner::{MediaScanner, ScanConfig, WalkDirScanner};
use crate::core::timestamp::{CaptureTimestamp, TimestampResolver};
use crate::error::{ConfigError, FolderingError, MoveError};
use crate::events::{
    null_sender, Event, EventSender, OrganizeEvent, OrganizeProgress, PipelineEvent,
    PipelinePhase,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Times a destination is re-allocated after it was taken between
/// allocation and move
pub const MAX_MOVE_ATTEMPTS: usize = 8;

/// Organizes one input tree into one output tree
pub struct Organizer {
    config: OrganizeConfig,
    resolver: Option<TimestampResolver>,
    scanner: Option<Box<dyn MediaScanner>>,
}

impl Organizer {
    pub fn new(config: OrganizeConfig) -> Self {
        Self {
            config,
            resolver: None,
            scanner: None,
        }
    }

    /// Use a custom resolver instead of EXIF + ffprobe in the configured zone
    pub fn with_resolver(mut self, resolver: TimestampResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Use a custom scanner instead of walking the input directory
    pub fn with_scanner(mut self, scanner: Box<dyn MediaScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn config(&self) -> &OrganizeConfig {
        &self.config
    }

    /// Run without events
    pub fn run(self) -> Result<OrganizeReport, FolderingError> {
        self.run_with_events(&null_sender())
    }

    /// Run with event reporting.
    ///
    /// Configuration problems abort before any file is touched. Everything
    /// after that is per file: failures are recorded and the run goes on.
    pub fn run_with_events(self, events: &EventSender) -> Result<OrganizeReport, FolderingError> {
        let start = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Validating,
        }));

        let (input_dir, output_dir) = match self.validated_roots() {
            Ok(roots) => roots,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        let Organizer {
            config,
            resolver,
            scanner,
        } = self;
        let dry_run = config.dry_run;
        let mut report = OrganizeReport::new(dry_run);

        tracing::info!(
            run = %report.id,
            input = %input_dir.display(),
            output = %output_dir.display(),
            pattern = %config.pattern,
            zone = %config.zone,
            dry_run,
            "organize started"
        );

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner: Box<dyn MediaScanner> = match scanner {
            Some(scanner) => scanner,
            None => Box::new(WalkDirScanner::new(ScanConfig {
                follow_symlinks: false,
                include_hidden: config.include_hidden,
                extensions: config.extensions.clone(),
                exclude: Some(output_dir.clone()),
            })),
        };
        let scanned = scanner.scan_with_events(&input_dir, events)?;
        report.scan_errors = scanned.errors.iter().map(ToString::to_string).collect();

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Organizing,
        }));

        let resolver = resolver.unwrap_or_else(|| {
            TimestampResolver::new(config.zone).with_probe_timeout(config.probe_timeout)
        });
        let allocator = PathAllocator::new(output_dir, config.pattern.clone());
        let mut planner = OrganizePlanner::new(resolver, allocator, input_dir);

        let total = scanned.files.len();
        events.send(Event::Organize(OrganizeEvent::Started { total_files: total }));

        for (index, file) in scanned.files.iter().enumerate() {
            let outcome = organize_file(&mut planner, &file.path, dry_run);
            emit_outcome(events, &outcome);
            events.send(Event::Organize(OrganizeEvent::Progress(OrganizeProgress {
                processed: index + 1,
                total,
                current_path: file.path.clone(),
            })));
            report.record(outcome);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            run = %report.id,
            moved = report.moved,
            planned = report.planned,
            duplicates = report.duplicates,
            skipped = report.skipped,
            failed = report.failed,
            unresolved = report.unresolved,
            duration_ms = report.duration_ms,
            "organize finished"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: report.summary(),
        }));
        Ok(report)
    }

    /// Check the configuration and return canonical roots
    fn validated_roots(&self) -> Result<(PathBuf, PathBuf), ConfigError> {
        self.config.validate()?;
        let input = fs::canonicalize(&self.config.input_dir).map_err(|_| {
            ConfigError::InputNotFound {
                path: self.config.input_dir.clone(),
            }
        })?;
        let output = fs::canonicalize(&self.config.output_dir).map_err(|_| {
            ConfigError::OutputNotFound {
                path: self.config.output_dir.clone(),
            }
        })?;
        Ok((input, output))
    }
}

/// Decide and (unless dry-running) carry out the move for one file
fn organize_file(planner: &mut OrganizePlanner, source: &Path, dry_run: bool) -> FileOutcome {
    let failed = |message: String| {
        tracing::warn!(path = %source.display(), error = %message, "file not organized");
        FileOutcome::Failed {
            path: source.to_path_buf(),
            message,
        }
    };

    let (destination, timestamp) = match planner.plan(source) {
        Ok(Decision::NotAFile) => {
            tracing::debug!(path = %source.display(), "no longer a regular file");
            return FileOutcome::Skipped {
                path: source.to_path_buf(),
                reason: SkipReason::NotAFile,
            };
        }
        Ok(Decision::Duplicate(existing)) => {
            tracing::debug!(
                path = %source.display(),
                existing = %existing.display(),
                "duplicate left in place"
            );
            return FileOutcome::Duplicate {
                path: source.to_path_buf(),
                existing,
            };
        }
        Ok(Decision::Relocate {
            destination,
            timestamp,
        }) => (destination, timestamp),
        Err(e) => return failed(e.to_string()),
    };

    if dry_run {
        planner.reserve(destination.clone(), source.to_path_buf());
        return FileOutcome::Planned {
            from: source.to_path_buf(),
            to: destination,
            timestamp,
        };
    }

    match move_with_retry(planner, source, destination, &timestamp) {
        Ok(to) => {
            tracing::debug!(from = %source.display(), to = %to.display(), "moved");
            FileOutcome::Moved {
                from: source.to_path_buf(),
                to,
                timestamp,
            }
        }
        Err(e) => failed(e.to_string()),
    }
}

/// Move, re-allocating when the destination was claimed in the meantime
fn move_with_retry(
    planner: &OrganizePlanner,
    source: &Path,
    mut destination: PathBuf,
    timestamp: &CaptureTimestamp,
) -> Result<PathBuf, FolderingError> {
    for attempt in 1..=MAX_MOVE_ATTEMPTS {
        match MoveExecutor::relocate(source, &destination) {
            Ok(()) => return Ok(destination),
            Err(MoveError::DestinationExists { path }) => {
                tracing::debug!(path = %path.display(), attempt, "destination taken, re-allocating");
                destination = planner.allocate(timestamp, source)?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(MoveError::Contended {
        path: source.to_path_buf(),
        attempts: MAX_MOVE_ATTEMPTS,
    }
    .into())
}

fn emit_outcome(events: &EventSender, outcome: &FileOutcome) {
    let event = match outcome {
        FileOutcome::Moved { from, to, .. } => OrganizeEvent::Moved {
            from: from.clone(),
            to: to.clone(),
        },
        FileOutcome::Planned { from, to, .. } => OrganizeEvent::Planned {
            from: from.clone(),
            to: to.clone(),
        },
        FileOutcome::Duplicate { path, existing } => OrganizeEvent::Duplicate {
            path: path.clone(),
            existing: existing.clone(),
        },
        FileOutcome::Skipped { path, reason } => OrganizeEvent::Skipped {
            path: path.clone(),
            reason: reason.to_string(),
        },
        FileOutcome::Failed { path, message } => OrganizeEvent::Failed {
            path: path.clone(),
            message: message.clone(),
        },
    };
    events.send(Event::Organize(event));
}
