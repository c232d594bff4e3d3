//! Container metadata via the `ffprobe` command line tool.
//!
//! Only the `format` section is requested; that is where containers keep
//! `creation_time`. Every probe runs under a deadline so a malformed file
//! that hangs ffprobe cannot stall the run.

use super::traits::VideoProber;
use crate::error::MetadataError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Default upper bound for one probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs `ffprobe -v quiet -print_format json -show_format <file>`.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    /// Probe with the `ffprobe` found on `PATH`
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffprobe"),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Use a specific executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Bound each probe to `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn timed_out(&self, child: &mut Child, path: &Path) -> MetadataError {
        let _ = child.kill();
        let _ = child.wait();
        MetadataError::Timeout {
            path: path.to_path_buf(),
            timeout: self.timeout,
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<serde_json::Value, MetadataError> {
        let deadline = Instant::now() + self.timeout;

        let mut child = Command::new(&self.program)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| MetadataError::Spawn {
                program: self.program.display().to_string(),
                path: path.to_path_buf(),
                source,
            })?;

        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(MetadataError::ProbeRead {
                path: path.to_path_buf(),
                source: std::io::Error::other("stdout was not captured"),
            });
        };

        // Drain stdout on a helper thread so the deadline also covers a probe
        // that never closes its output.
        let (sender, receiver) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            let mut buf = Vec::new();
            let result = stdout.read_to_end(&mut buf).map(|_| buf);
            let _ = sender.send(result);
        });

        let output = match receiver.recv_deadline(deadline) {
            Ok(result) => result,
            Err(_) => return Err(self.timed_out(&mut child, path)),
        };

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() < deadline => thread::sleep(POLL_INTERVAL),
                Ok(None) => return Err(self.timed_out(&mut child, path)),
                Err(source) => {
                    let _ = child.kill();
                    return Err(MetadataError::ProbeRead {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        };

        let output = output.map_err(|source| MetadataError::ProbeRead {
            path: path.to_path_buf(),
            source,
        })?;

        if !status.success() {
            return Err(MetadataError::ProbeFailed {
                path: path.to_path_buf(),
                status: status.to_string(),
            });
        }

        serde_json::from_slice(&output).map_err(|source| MetadataError::ProbeOutput {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_spawn_error() {
        let prober = FfprobeProber::new().with_program("/nonexistent/bin/ffprobe-missing");
        let result = prober.probe(Path::new("/tmp/clip.mp4"));
        assert!(matches!(result, Err(MetadataError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn scripted_probes_cover_success_failure_and_timeout() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        // Run sequentially: writing and executing scripts from parallel
        // threads can hit ETXTBSY.
        let temp = TempDir::new().unwrap();
        let script = |name: &str, body: &str| {
            let path = temp.path().join(name);
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        };

        let ok = script(
            "ok.sh",
            r#"echo '{"format":{"tags":{"creation_time":"2023-01-05T05:30:00.000000Z"}}}'"#,
        );
        let value = FfprobeProber::new()
            .with_program(&ok)
            .probe(Path::new("clip.mp4"))
            .unwrap();
        assert_eq!(
            value["format"]["tags"]["creation_time"],
            "2023-01-05T05:30:00.000000Z"
        );

        let failing = script("fail.sh", "exit 1");
        let result = FfprobeProber::new()
            .with_program(&failing)
            .probe(Path::new("clip.mp4"));
        assert!(matches!(result, Err(MetadataError::ProbeFailed { .. })));

        let garbage = script("garbage.sh", "echo not json");
        let result = FfprobeProber::new()
            .with_program(&garbage)
            .probe(Path::new("clip.mp4"));
        assert!(matches!(result, Err(MetadataError::ProbeOutput { .. })));

        let hanging = script("hang.sh", "exec sleep 5");
        let started = Instant::now();
        let result = FfprobeProber::new()
            .with_program(&hanging)
            .with_timeout(Duration::from_millis(200))
            .probe(Path::new("clip.mp4"));
        assert!(matches!(result, Err(MetadataError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
