//! # Scanner Module
//!
//! Discovers media files under the input directory.
//!
//! ## Supported Formats
//! - Images: JPEG, PNG, HEIC/HEIF, WebP, GIF, BMP, TIFF and common RAW formats
//! - Videos: MP4, MOV, AVI, MKV, WMV, WebM, M4V, MTS/M2TS, 3GP, MPEG
//!
//! The extension list is configurable. The kind derived from the extension
//! is informational only: timestamp resolution tries image metadata, then
//! container metadata, for every file.
//!
//! ## Example
//! ```rust,ignore
//! use media_foldering::core::scanner::{MediaScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Users/me/Inbox"))?;
//! ```

mod filter;
mod walker;

pub use filter::{MediaFilter, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes at discovery time
    pub size: u64,
    /// Kind implied by the extension
    pub kind: MediaKind,
}

/// Media kind implied by a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify an extension (without the dot), ignoring case
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered files, sorted by path
    pub files: Vec<MediaFile>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for media scanners
///
/// Implement this trait to feed the organizer from another source (e.g. in tests).
pub trait MediaScanner: Send + Sync {
    /// Scan a directory tree
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(&self, root: &Path, events: &EventSender) -> Result<ScanResult, ScanError>;
}
