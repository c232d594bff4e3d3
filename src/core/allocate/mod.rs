//! # Allocate Module
//!
//! Chooses the destination path for a file.
//!
//! ## Layout
//! - Resolved timestamp: `root/<pattern rendered with the timestamp> NNN.ext`
//! - Unresolved: `root/No EXIF/<original stem> NNN.ext`
//!
//! `NNN` is a zero-padded counter that starts at `000` and is bumped until
//! the candidate does not exist. Existence is an injected predicate, so the
//! same code plans against the real filesystem, a simulated one (dry runs)
//! or a set of paths in tests.
//!
//! Allocation is not atomic with the move that follows it; the organizer's
//! no-clobber move closes that window.

mod pattern;

pub use pattern::NamingPattern;

use crate::core::timestamp::CaptureTimestamp;
use crate::error::AllocateError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Directory for files without a usable capture timestamp
pub const NO_TIMESTAMP_DIR: &str = "No EXIF";

/// Allocates collision-free destination paths under one root.
#[derive(Debug, Clone)]
pub struct PathAllocator {
    root: PathBuf,
    pattern: NamingPattern,
}

impl PathAllocator {
    pub fn new(root: impl Into<PathBuf>, pattern: NamingPattern) -> Self {
        Self {
            root: root.into(),
            pattern,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination without counter or extension, e.g.
    /// `root/2023/01/05/2023-01-05 14-30` or `root/No EXIF/IMG_0001`
    pub fn template(&self, timestamp: &CaptureTimestamp, source: &Path) -> PathBuf {
        match timestamp {
            CaptureTimestamp::Resolved { time, .. } => self.root.join(self.pattern.render(time)),
            CaptureTimestamp::Unresolved => {
                let stem = source.file_stem().unwrap_or(source.as_os_str());
                self.root.join(NO_TIMESTAMP_DIR).join(stem)
            }
        }
    }

    /// First candidate for which `exists` returns false.
    ///
    /// The source's extension is kept as-is (case included) and is part of
    /// every compared candidate.
    pub fn allocate<F>(
        &self,
        timestamp: &CaptureTimestamp,
        source: &Path,
        mut exists: F,
    ) -> Result<PathBuf, AllocateError>
    where
        F: FnMut(&Path) -> bool,
    {
        let template = self.template(timestamp, source);
        let mut counter: u32 = 0;

        loop {
            let candidate = candidate_path(&template, counter, source);
            if !exists(&candidate) {
                return Ok(candidate);
            }
            counter = counter
                .checked_add(1)
                .ok_or_else(|| AllocateError::CounterExhausted {
                    template: template.clone(),
                })?;
        }
    }
}

/// `template` with ` NNN` and the source's extension appended to its file name
pub fn candidate_path(template: &Path, counter: u32, source: &Path) -> PathBuf {
    let mut name: OsString = template
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(" {:03}", counter));
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    template.with_file_name(name)
}
