//! Types for the organize module.

use crate::core::allocate::NamingPattern;
use crate::core::metadata::DEFAULT_PROBE_TIMEOUT;
use crate::core::timestamp::{CaptureTimestamp, TargetZone};
use crate::error::ConfigError;
use crate::events::PipelineSummary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Configuration for an organize run
#[derive(Debug, Clone)]
pub struct OrganizeConfig {
    /// Tree the files are taken from
    pub input_dir: PathBuf,
    /// Root of the date-structured tree
    pub output_dir: PathBuf,
    /// Naming pattern for files with a capture timestamp
    pub pattern: NamingPattern,
    /// Extensions to pick up (None = image and video defaults, empty = everything)
    pub extensions: Option<Vec<String>>,
    /// Include hidden files and directories
    pub include_hidden: bool,
    /// Plan destinations without touching the filesystem
    pub dry_run: bool,
    /// Zone that capture times are rendered in
    pub zone: TargetZone,
    /// Upper bound for each container probe
    pub probe_timeout: Duration,
}

impl OrganizeConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            pattern: NamingPattern::default(),
            extensions: None,
            include_hidden: false,
            dry_run: false,
            zone: TargetZone::default(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_pattern(mut self, pattern: NamingPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_zone(mut self, zone: TargetZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Both roots must be existing directories
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }
        if !self.output_dir.is_dir() {
            return Err(ConfigError::OutputNotFound {
                path: self.output_dir.clone(),
            });
        }
        Ok(())
    }
}

/// Why a file was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The path vanished or stopped being a regular file after the scan
    NotAFile,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotAFile => write!(f, "not a regular file"),
        }
    }
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Moved {
        from: PathBuf,
        to: PathBuf,
        timestamp: CaptureTimestamp,
    },
    /// Destination chosen in a dry run
    Planned {
        from: PathBuf,
        to: PathBuf,
        timestamp: CaptureTimestamp,
    },
    /// Identical content already in the output tree; the file stays put
    Duplicate { path: PathBuf, existing: PathBuf },
    Skipped { path: PathBuf, reason: SkipReason },
    Failed { path: PathBuf, message: String },
}

impl FileOutcome {
    /// The input file this outcome is about
    pub fn source(&self) -> &Path {
        match self {
            FileOutcome::Moved { from, .. } | FileOutcome::Planned { from, .. } => from,
            FileOutcome::Duplicate { path, .. }
            | FileOutcome::Skipped { path, .. }
            | FileOutcome::Failed { path, .. } => path,
        }
    }
}

/// Result of an organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeReport {
    /// Run id
    pub id: String,
    pub dry_run: bool,
    pub moved: usize,
    pub planned: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Moved or planned files that landed in the no-timestamp bucket
    pub unresolved: usize,
    /// One entry per scanned file, in processing order
    pub outcomes: Vec<FileOutcome>,
    /// Entries the scanner could not read
    pub scan_errors: Vec<String>,
    pub duration_ms: u64,
}

impl OrganizeReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            dry_run,
            moved: 0,
            planned: 0,
            duplicates: 0,
            skipped: 0,
            failed: 0,
            unresolved: 0,
            outcomes: Vec::new(),
            scan_errors: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Count and store an outcome
    pub fn record(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Moved { timestamp, .. } => {
                self.moved += 1;
                self.unresolved += usize::from(!timestamp.is_resolved());
            }
            FileOutcome::Planned { timestamp, .. } => {
                self.planned += 1;
                self.unresolved += usize::from(!timestamp.is_resolved());
            }
            FileOutcome::Duplicate { .. } => self.duplicates += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn total_files(&self) -> usize {
        self.outcomes.len()
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total_files: self.total_files(),
            relocated: self.moved + self.planned,
            duplicates: self.duplicates,
            not_relocated: self.skipped + self.failed,
            duration_ms: self.duration_ms,
        }
    }
}
