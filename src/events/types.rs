//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted during an organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Input traversal events
    Scan(ScanEvent),
    /// Per-file organize events
    Organize(OrganizeEvent),
    /// Run-level events
    Pipeline(PipelineEvent),
}

/// Events while walking the input tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// A media file was found
    FileFound { path: PathBuf },
    /// An entry could not be read, scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_files: usize },
}

/// Events while organizing individual files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// Organizing has started
    Started { total_files: usize },
    /// Progress update
    Progress(OrganizeProgress),
    /// A file was moved into the output tree
    Moved { from: PathBuf, to: PathBuf },
    /// A destination was chosen but nothing was moved (dry run)
    Planned { from: PathBuf, to: PathBuf },
    /// Identical content already exists in the output tree
    Duplicate { path: PathBuf, existing: PathBuf },
    /// The file was skipped
    Skipped { path: PathBuf, reason: String },
    /// The file could not be moved, organizing continues
    Failed { path: PathBuf, message: String },
}

/// Progress information while organizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeProgress {
    /// Files handled so far (whatever their outcome)
    pub processed: usize,
    /// Total files discovered
    pub total: usize,
    /// File currently being handled
    pub current_path: PathBuf,
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Run has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Run completed
    Completed { summary: PipelineSummary },
    /// Run aborted with a fatal error
    Error { message: String },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Validating,
    Scanning,
    Organizing,
}

/// Summary of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Files discovered in the input tree
    pub total_files: usize,
    /// Files moved (or planned, in a dry run)
    pub relocated: usize,
    /// Files left in place because identical content already exists
    pub duplicates: usize,
    /// Files skipped or failed
    pub not_relocated: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Validating => write!(f, "Validating"),
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Organizing => write!(f, "Organizing"),
        }
    }
}
