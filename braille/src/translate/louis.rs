//! Adapter for the liblouis `lou_translate` command-line tool.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{ServiceError, TableId, TranslationService};
use crate::cell::{Cell, CellSequence};
use crate::codec::{cells_to_unicode, unicode_to_cells};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs `lou_translate` once per call, text on stdin, result on stdout.
///
/// A child still running at the deadline is killed and reaped, so a hung
/// tool never outlives the call.
#[derive(Debug, Clone)]
pub struct LouService {
    exec: PathBuf,
    table_dir: Option<PathBuf>,
    display: String,
    timeout: Option<Duration>,
}

impl LouService {
    pub fn new(exec: impl Into<PathBuf>) -> Self {
        Self {
            exec: exec.into(),
            table_dir: None,
            display: "unicode.dis".to_string(),
            timeout: Some(Duration::from_secs(10)),
        }
    }

    /// Directory exported as `LOUIS_TABLEPATH`.
    pub fn with_table_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.table_dir = Some(dir.into());
        self
    }

    /// Display table listed before the translation table.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// Deadline per invocation; `None` waits for the tool to exit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn table_list(&self, table: &TableId) -> String {
        format!("{},{}", self.display, table)
    }

    fn run(&self, direction: &str, table: &TableId, input: &str) -> Result<String, ServiceError> {
        let mut cmd = Command::new(&self.exec);
        cmd.arg(direction)
            .arg(self.table_list(table))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.table_dir {
            cmd.env("LOUIS_TABLEPATH", dir);
        }
        debug!(exec = %self.exec.display(), direction, %table, "running lou_translate");

        let mut child = cmd.spawn().map_err(|e| {
            ServiceError::transient(format!("spawning {}: {e}", self.exec.display()))
        })?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        if let Some(mut stdin) = child.stdin.take() {
            // A tool that exits without reading closes the pipe; its exit
            // status is reported below.
            let written = stdin
                .write_all(input.as_bytes())
                .or_else(|e| match e.kind() {
                    std::io::ErrorKind::BrokenPipe => Ok(()),
                    _ => Err(e),
                });
            if let Err(e) = written {
                reap(&mut child);
                return Err(ServiceError::transient(format!(
                    "writing to lou_translate: {e}"
                )));
            }
        }

        let status = self.wait(&mut child)?;
        let stdout = join(stdout);
        if !status.success() {
            let stderr = join(stderr);
            return Err(ServiceError::permanent(format!(
                "lou_translate {direction} with {table} failed ({status}): {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&stdout)
            .trim_end_matches(['\n', '\r'])
            .to_string())
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, ServiceError> {
        let Some(limit) = self.timeout else {
            return child
                .wait()
                .map_err(|e| ServiceError::transient(format!("waiting for lou_translate: {e}")));
        };
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if start.elapsed() > limit => {
                    warn!(
                        pid = child.id(),
                        limit_ms = limit.as_millis() as u64,
                        "lou_translate over deadline, killing"
                    );
                    reap(child);
                    return Err(ServiceError::permanent(format!(
                        "lou_translate killed after {} ms",
                        limit.as_millis()
                    )));
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    reap(child);
                    return Err(ServiceError::transient(format!(
                        "waiting for lou_translate: {e}"
                    )));
                }
            }
        }
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Read a pipe to the end on its own thread so the child never blocks on
/// a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

impl TranslationService for LouService {
    fn translate(&self, table: &TableId, text: &str) -> Result<CellSequence, ServiceError> {
        let out = self.run("--forward", table, text)?;
        unicode_to_cells(&out).map_err(|e| ServiceError::permanent(format!("unexpected output: {e}")))
    }

    fn back_translate(&self, table: &TableId, cells: &[Cell]) -> Result<String, ServiceError> {
        self.run("--backward", table, &cells_to_unicode(cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_list_puts_display_first() {
        let svc = LouService::new("lou_translate");
        assert_eq!(
            svc.table_list(&TableId::new("en-us-g2.ctb")),
            "unicode.dis,en-us-g2.ctb"
        );
    }

    #[cfg(unix)]
    fn stub(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("lou_translate");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn output_of_the_tool_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let svc = LouService::new(stub(dir.path(), "cat"));
        let cells: CellSequence = [1u8, 3].iter().map(|&v| Cell::from_bits_truncate(v)).collect();
        let text = svc.back_translate(&TableId::new("en-us-g2.ctb"), &cells).unwrap();
        assert_eq!(text, "⠁⠃");
    }

    #[cfg(unix)]
    #[test]
    fn hung_tool_is_killed_at_the_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let svc = LouService::new(stub(dir.path(), "exec sleep 30"))
            .with_timeout(Some(Duration::from_millis(100)));
        let start = Instant::now();
        let err = svc.translate(&TableId::new("en-us-g2.ctb"), "hello").unwrap_err();
        assert!(err.message.contains("killed"), "{}", err.message);
        assert!(!err.transient);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_is_permanent_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let svc = LouService::new(stub(dir.path(), "echo 'no table' >&2; exit 3"));
        let err = svc.translate(&TableId::new("xx.ctb"), "a").unwrap_err();
        assert!(!err.transient);
        assert!(err.message.contains("no table"), "{}", err.message);
    }

    #[test]
    fn missing_executable_is_transient() {
        let svc = LouService::new("/nonexistent/lou_translate").with_table_dir("/tmp");
        let err = svc.translate(&TableId::new("en-us-g2.ctb"), "hello").unwrap_err();
        assert!(err.transient);
    }
}
