//! Directory walking implementation using walkdir.

use super::{filter::MediaFilter, MediaFile, MediaScanner, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Extensions to include (None = image and video defaults, empty = everything)
    pub extensions: Option<Vec<String>>,
    /// Subtree to leave out, typically an output directory nested in the input
    pub exclude: Option<PathBuf>,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: MediaFilter,
    /// Canonical form of `config.exclude`, resolved once
    excluded: Option<PathBuf>,
}

impl WalkDirScanner {
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = MediaFilter::new().with_hidden(config.include_hidden);
        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions);
        }
        let excluded = config
            .exclude
            .as_ref()
            .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.clone()));

        Self {
            config,
            filter,
            excluded,
        }
    }

    /// Directories to descend into. The root itself is always walked.
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        if !self.config.include_hidden && MediaFilter::is_hidden(entry.path()) {
            return false;
        }
        match &self.excluded {
            Some(excluded) => {
                let path = fs::canonicalize(entry.path()).unwrap_or_else(|_| entry.path().to_path_buf());
                &path != excluded
            }
            None => true,
        }
    }

    fn walk_error(error: walkdir::Error) -> ScanError {
        let path = error.path().map(Path::to_path_buf).unwrap_or_default();
        if error.io_error().map(io::Error::kind) == Some(io::ErrorKind::PermissionDenied) {
            ScanError::PermissionDenied { path }
        } else {
            ScanError::ReadDirectory {
                path,
                source: io::Error::other(error.to_string()),
            }
        }
    }
}

impl MediaScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &null_sender())
    }

    fn scan_with_events(&self, root: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.keep_entry(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let error = Self::walk_error(e);
                    tracing::warn!(error = %error, "skipping unreadable entry");
                    events.send(Event::Scan(ScanEvent::Error {
                        path: PathBuf::new(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.filter.should_include(entry.path()) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    let path = entry.into_path();
                    events.send(Event::Scan(ScanEvent::FileFound { path: path.clone() }));
                    files.push(MediaFile {
                        kind: MediaFilter::kind(&path),
                        size: metadata.len(),
                        path,
                    });
                }
                Err(e) => {
                    let error = Self::walk_error(e);
                    events.send(Event::Scan(ScanEvent::Error {
                        path: entry.path().to_path_buf(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        // Path order, independent of how the platform lists directories
        files.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::debug!(root = %root.display(), found = files.len(), "scan complete");
        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        Ok(ScanResult { files, errors })
    }
}
