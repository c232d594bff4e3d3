//! # Error Module
//!
//! Error types for the media organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Degrade metadata failures** - a file that cannot be dated is still organized
//! - **Fail fast on configuration** - nothing is touched when the roots are wrong

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum FolderingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Path allocation error: {0}")]
    Allocate(#[from] AllocateError),

    #[error("Move error: {0}")]
    Move(#[from] MoveError),
}

/// Errors in the run configuration. These abort the run before any file is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Output directory not found: {path}")]
    OutputNotFound { path: PathBuf },

    #[error("No {field} given. Pass it on the command line or in the settings file.")]
    Missing { field: &'static str },

    #[error("Invalid naming pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid UTC offset {value:?} (expected +HH:MM or -HH:MM)")]
    InvalidOffset { value: String },

    #[error("Failed to read settings file {path}: {source}")]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that occur while walking the input tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from destination path allocation
#[derive(Error, Debug)]
pub enum AllocateError {
    #[error("Ran out of counter values for {template}")]
    CounterExhausted { template: PathBuf },
}

/// Errors while relocating a file
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy verification failed for {path}: source {expected} bytes, destination {actual} bytes")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Gave up on {path} after {attempts} allocation attempts")]
    Contended { path: PathBuf, attempts: usize },
}

/// Failures reading capture metadata.
///
/// The timestamp resolver never surfaces these; they are logged and the file
/// is treated as having no timestamp.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No readable EXIF block in {path}: {reason}")]
    Exif { path: PathBuf, reason: String },

    #[error("Failed to run {program} on {path}: {source}")]
    Spawn {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Probe of {path} exited unsuccessfully ({status})")]
    ProbeFailed { path: PathBuf, status: String },

    #[error("Probe of {path} timed out after {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("Failed to read probe output for {path}: {source}")]
    ProbeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable probe output for {path}: {source}")]
    ProbeOutput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FolderingError>;
