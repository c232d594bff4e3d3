//! Per-file destination planning.

use crate::core::allocate::PathAllocator;
use crate::core::duplicate::DuplicateDetector;
use crate::core::timestamp::{CaptureTimestamp, TimestampResolver};
use crate::error::AllocateError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// What should happen to a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No longer a regular file
    NotAFile,
    /// Identical content already exists at this path
    Duplicate(PathBuf),
    /// Move it here
    Relocate {
        destination: PathBuf,
        timestamp: CaptureTimestamp,
    },
}

/// Decides where each file goes.
///
/// Destinations handed out in a dry run are remembered, so later files see
/// them as taken and identical later files are reported as duplicates.
pub struct OrganizePlanner {
    resolver: TimestampResolver,
    allocator: PathAllocator,
    /// Input root, left out of duplicate searches when nested in the output
    input_dir: PathBuf,
    /// Planned destination -> source, dry run only
    planned: HashMap<PathBuf, PathBuf>,
}

impl OrganizePlanner {
    pub fn new(resolver: TimestampResolver, allocator: PathAllocator, input_dir: PathBuf) -> Self {
        Self {
            resolver,
            allocator,
            input_dir,
            planned: HashMap::new(),
        }
    }

    /// Check the file, look for a duplicate, resolve and allocate
    pub fn plan(&self, source: &Path) -> Result<Decision, AllocateError> {
        if !fs::metadata(source).map(|m| m.is_file()).unwrap_or(false) {
            return Ok(Decision::NotAFile);
        }
        if let Some(existing) = self.find_duplicate(source) {
            return Ok(Decision::Duplicate(existing));
        }

        let timestamp = self.resolver.resolve(source);
        let destination = self.allocate(&timestamp, source)?;
        Ok(Decision::Relocate {
            destination,
            timestamp,
        })
    }

    /// Next free destination, treating planned paths as taken
    pub fn allocate(
        &self,
        timestamp: &CaptureTimestamp,
        source: &Path,
    ) -> Result<PathBuf, AllocateError> {
        self.allocator.allocate(timestamp, source, |candidate| {
            candidate.exists() || self.planned.contains_key(candidate)
        })
    }

    /// Remember a dry-run destination
    pub fn reserve(&mut self, destination: PathBuf, source: PathBuf) {
        self.planned.insert(destination, source);
    }

    fn find_duplicate(&self, source: &Path) -> Option<PathBuf> {
        let output = self.allocator.root();
        let nested_input = self.input_dir.starts_with(output) && self.input_dir != output;
        let exclude = nested_input.then_some(self.input_dir.as_path());

        if let Some(existing) = DuplicateDetector::find_duplicate_excluding(source, output, exclude)
        {
            return Some(existing);
        }
        if self.planned.is_empty() {
            return None;
        }

        let planned_sources = self.planned.values().filter(|s| s.as_path() != source);
        DuplicateDetector::find_among(source, planned_sources).and_then(|matched| {
            self.planned
                .iter()
                .find(|(_, s)| **s == matched)
                .map(|(destination, _)| destination.clone())
        })
    }
}
