//! # Core Module
//!
//! The front-end-agnostic organizing engine.
//!
//! ## Modules
//! - `scanner` - Discovers media files in the input directory
//! - `metadata` - Reads EXIF date tags and probes video containers
//! - `timestamp` - Resolves a file's capture timestamp
//! - `allocate` - Chooses collision-free destination paths
//! - `duplicate` - Finds byte-identical files in the output tree
//! - `organize` - Orchestrates the per-file flow and the moves

pub mod allocate;
pub mod duplicate;
pub mod metadata;
pub mod organize;
pub mod scanner;
pub mod timestamp;

// Re-export commonly used types
pub use allocate::{NamingPattern, PathAllocator};
pub use duplicate::DuplicateDetector;
pub use organize::{FileOutcome, OrganizeConfig, OrganizeReport, Organizer};
pub use scanner::MediaFile;
pub use timestamp::{CaptureTimestamp, TargetZone, TimestampResolver};
