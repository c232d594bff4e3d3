//! # Duplicate Module
//!
//! Decides whether a file's exact content already exists somewhere under a
//! destination tree.
//!
//! ## Rules
//! - Only files with the same extension (ignoring case) are candidates
//! - Equality is byte-for-byte; sizes are compared first so most candidates
//!   are rejected without being read
//! - Every candidate is checked until one matches
//! - An excluded subtree (the input, when nested in the output) is not searched
//! - A file is never a duplicate of itself
//! - Read errors make a candidate "not equal" and the search continues

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const CHUNK_SIZE: usize = 64 * 1024;

/// Content-identity search over a destination tree
pub struct DuplicateDetector;

impl DuplicateDetector {
    /// Whether identical content with the same extension exists under `subtree`
    pub fn is_duplicate(file: &Path, subtree: &Path) -> bool {
        Self::find_duplicate(file, subtree).is_some()
    }

    /// The first file under `subtree` that is byte-identical to `file`
    pub fn find_duplicate(file: &Path, subtree: &Path) -> Option<PathBuf> {
        Self::find_duplicate_excluding(file, subtree, None)
    }

    /// Like [`find_duplicate`](Self::find_duplicate), without descending into
    /// `exclude` (e.g. an input directory nested in the output tree)
    pub fn find_duplicate_excluding(
        file: &Path,
        subtree: &Path,
        exclude: Option<&Path>,
    ) -> Option<PathBuf> {
        if !subtree.is_dir() {
            return None;
        }
        let excluded = exclude.and_then(|p| fs::canonicalize(p).ok());

        let candidates = WalkDir::new(subtree)
            .into_iter()
            .filter_entry(|entry| match &excluded {
                Some(excluded) if entry.file_type().is_dir() => {
                    fs::canonicalize(entry.path()).ok().as_ref() != Some(excluded)
                }
                _ => true,
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path());

        Self::find_among(file, candidates)
    }

    /// The first of `candidates` that is byte-identical to `file` and shares
    /// its extension
    pub fn find_among<I>(file: &Path, candidates: I) -> Option<PathBuf>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let metadata = fs::metadata(file).ok().filter(|m| m.is_file())?;
        let extension = normalized_extension(file);
        let own_path = fs::canonicalize(file).ok();

        candidates
            .into_iter()
            .filter(|candidate| normalized_extension(candidate.as_ref()) == extension)
            .filter(|candidate| {
                fs::metadata(candidate.as_ref())
                    .map(|m| m.is_file() && m.len() == metadata.len())
                    .unwrap_or(false)
            })
            .filter(|candidate| {
                own_path.is_none() || fs::canonicalize(candidate.as_ref()).ok() != own_path
            })
            .find(|candidate| Self::files_identical(file, candidate.as_ref()))
            .map(|candidate| candidate.as_ref().to_path_buf())
    }

    /// Byte-for-byte comparison. Unreadable files compare as different.
    pub fn files_identical(a: &Path, b: &Path) -> bool {
        match contents_equal(a, b) {
            Ok(equal) => equal,
            Err(e) => {
                tracing::debug!(a = %a.display(), b = %b.display(), error = %e, "comparison failed");
                false
            }
        }
    }
}

/// Lowercased extension; `None` for files without one
fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

fn contents_equal(a: &Path, b: &Path) -> io::Result<bool> {
    let len_a = fs::metadata(a)?.len();
    let len_b = fs::metadata(b)?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a)?);
    let mut reader_b = BufReader::new(File::open(b)?);
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let n_a = fill(&mut reader_a, &mut buf_a)?;
        let n_b = fill(&mut reader_b, &mut buf_b)?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or the reader is exhausted
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
