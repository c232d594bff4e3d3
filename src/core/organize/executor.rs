//! Moves files without ever replacing an existing destination.

use crate::error::MoveError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;

/// Relocates single files into the output tree
pub struct MoveExecutor;

impl MoveExecutor {
    /// Move `source` to `destination`, creating parent directories.
    ///
    /// Fails with [`MoveError::DestinationExists`] instead of overwriting.
    /// A hard link claims the destination atomically; where links are not
    /// possible (another filesystem) the content is copied into a freshly
    /// created file and checked by size before the source is removed.
    pub fn relocate(source: &Path, destination: &Path) -> Result<(), MoveError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| MoveError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        match fs::hard_link(source, destination) {
            Ok(()) => Self::remove_source(source, destination),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(MoveError::DestinationExists {
                path: destination.to_path_buf(),
            }),
            Err(e) => {
                tracing::debug!(
                    from = %source.display(),
                    to = %destination.display(),
                    error = %e,
                    "hard link failed, copying instead"
                );
                Self::copy_new(source, destination)?;
                Self::remove_source(source, destination)
            }
        }
    }

    /// Copy into a file that must not exist yet, verifying the size
    fn copy_new(source: &Path, destination: &Path) -> Result<(), MoveError> {
        let io_error = |e: io::Error| MoveError::Io {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        };

        let mut reader = File::open(source).map_err(io_error)?;
        let source_meta = reader.metadata().map_err(io_error)?;
        let expected = source_meta.len();

        let mut writer = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(MoveError::DestinationExists {
                    path: destination.to_path_buf(),
                })
            }
            Err(e) => return Err(io_error(e)),
        };

        let copied = io::copy(&mut reader, &mut writer).and_then(|n| writer.sync_all().map(|_| n));
        let actual = match copied {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(destination);
                return Err(io_error(e));
            }
        };

        if actual != expected {
            let _ = fs::remove_file(destination);
            return Err(MoveError::SizeMismatch {
                path: destination.to_path_buf(),
                expected,
                actual,
            });
        }

        Self::copy_attributes(&source_meta, &writer, destination);
        Ok(())
    }

    /// Carry permissions and modification time over to the copy. The content
    /// is already in place, so failures are only logged.
    fn copy_attributes(source_meta: &fs::Metadata, writer: &File, destination: &Path) {
        match source_meta.modified() {
            Ok(mtime) => {
                if let Err(e) = writer.set_modified(mtime) {
                    tracing::debug!(path = %destination.display(), error = %e, "could not copy mtime");
                }
            }
            Err(e) => tracing::debug!(error = %e, "source mtime unavailable"),
        }
        if let Err(e) = writer.set_permissions(source_meta.permissions()) {
            tracing::debug!(path = %destination.display(), error = %e, "could not copy permissions");
        }
    }

    /// Drop the source once the destination holds the content. If that
    /// fails, the destination is removed again so the file exists once.
    fn remove_source(source: &Path, destination: &Path) -> Result<(), MoveError> {
        fs::remove_file(source).map_err(|e| {
            let _ = fs::remove_file(destination);
            MoveError::Io {
                from: source.to_path_buf(),
                to: destination.to_path_buf(),
                source: e,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap().write_all(content).unwrap();
    }

    #[test]
    fn moves_into_new_directories() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("in/a.jpg");
        let destination = temp.path().join("out/2024/01/15/2024-01-15 09-00 000.jpg");
        write(&source, b"test content");

        MoveExecutor::relocate(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"test content");
    }

    #[test]
    fn never_overwrites_existing_destination() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.jpg");
        let destination = temp.path().join("taken.jpg");
        write(&source, b"new");
        write(&destination, b"old");

        let err = MoveExecutor::relocate(&source, &destination).unwrap_err();

        assert!(matches!(err, MoveError::DestinationExists { .. }));
        assert_eq!(fs::read(&source).unwrap(), b"new");
        assert_eq!(fs::read(&destination).unwrap(), b"old");
    }

    #[test]
    fn copy_fallback_refuses_existing_destination() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.jpg");
        let destination = temp.path().join("taken.jpg");
        write(&source, b"new");
        write(&destination, b"old");

        let err = MoveExecutor::copy_new(&source, &destination).unwrap_err();

        assert!(matches!(err, MoveError::DestinationExists { .. }));
        assert_eq!(fs::read(&destination).unwrap(), b"old");
    }

    #[test]
    fn copy_fallback_copies_content() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.mov");
        let destination = temp.path().join("b.mov");
        write(&source, &vec![3u8; 100_000]);

        MoveExecutor::copy_new(&source, &destination).unwrap();

        assert!(source.exists());
        assert_eq!(fs::read(&destination).unwrap().len(), 100_000);
    }

    #[test]
    fn copy_fallback_keeps_mtime_and_permissions() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.mov");
        let destination = temp.path().join("b.mov");
        write(&source, b"clip");

        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        let file = OpenOptions::new().write(true).open(&source).unwrap();
        file.set_modified(mtime).unwrap();
        let mut permissions = file.metadata().unwrap().permissions();
        permissions.set_readonly(true);
        file.set_permissions(permissions).unwrap();
        drop(file);

        MoveExecutor::copy_new(&source, &destination).unwrap();

        let copied = fs::metadata(&destination).unwrap();
        assert_eq!(copied.modified().unwrap(), mtime);
        assert!(copied.permissions().readonly());
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = MoveExecutor::relocate(&temp.path().join("gone.jpg"), &temp.path().join("x.jpg"))
            .unwrap_err();
        assert!(matches!(err, MoveError::Io { .. }));
        assert!(!temp.path().join("x.jpg").exists());
    }
}
