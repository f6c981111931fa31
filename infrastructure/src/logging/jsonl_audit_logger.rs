//! JSONL audit trail.
//!
//! Every [`AuditEvent`] becomes one line: the payload's fields plus `type`
//! and `timestamp`. Non-object payloads are kept under `data`. Each line is
//! flushed before `log` returns.
//!
//! Auditing never fails an operation. A failed write is counted and the
//! first failure in a run of failures is reported with `warn!`; the next
//! successful write reports the recovery.

use chrono::{SecondsFormat, Utc};
use runtime_application::ports::audit_logger::{AuditEvent, AuditLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Audit logger appending JSON lines to a file (or any [`Write`] sink).
pub struct JsonlAuditLogger<W: Write + Send = File> {
    sink: Mutex<BufWriter<W>>,
    path: Option<PathBuf>,
    failing: AtomicBool,
    failed_writes: AtomicU64,
}

impl JsonlAuditLogger<File> {
    /// Open (or create) the log at `path` for appending.
    ///
    /// Missing parent directories are created. Returns `None` when the file
    /// cannot be opened; the runtime then runs without an audit trail.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(error) = std::fs::create_dir_all(parent)
        {
            warn!(dir = %parent.display(), %error, "Cannot create audit log directory");
            return None;
        }

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let mut logger = Self::from_writer(file);
                logger.path = Some(path.to_path_buf());
                Some(logger)
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "Cannot open audit log");
                None
            }
        }
    }
}

impl<W: Write + Send> JsonlAuditLogger<W> {
    /// Audit into an arbitrary sink, such as stderr or a socket.
    pub fn from_writer(writer: W) -> Self {
        Self {
            sink: Mutex::new(BufWriter::new(writer)),
            path: None,
            failing: AtomicBool::new(false),
            failed_writes: AtomicU64::new(0),
        }
    }

    /// Path of the log file, when the sink is a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of records whose write or flush failed.
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    // A writer poisoned by a panicking thread holds at most one partial
    // line; later records still start on their own line.
    fn sink(&self) -> MutexGuard<'_, BufWriter<W>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut sink = self.sink();
        writeln!(sink, "{line}")?;
        sink.flush()
    }

    fn record_failure(&self, event_type: &str, error: &io::Error) {
        let failed = self.failed_writes.fetch_add(1, Ordering::Relaxed) + 1;
        if !self.failing.swap(true, Ordering::Relaxed) {
            warn!(
                path = ?self.path,
                event_type,
                failed,
                %error,
                "Audit log write failed"
            );
        }
    }

    fn record_success(&self) {
        if self.failing.swap(false, Ordering::Relaxed) {
            info!(
                path = ?self.path,
                failed = self.failed_writes(),
                "Audit log writes recovered"
            );
        }
    }
}

/// One audit line for `event`, stamped with `timestamp`.
fn audit_line(event: AuditEvent, timestamp: String) -> serde_json::Result<String> {
    let mut record = match event.payload {
        Value::Object(fields) => fields,
        data => Map::from_iter([("data".to_string(), data)]),
    };
    record.insert("type".to_string(), Value::from(event.event_type));
    record.insert("timestamp".to_string(), Value::String(timestamp));
    serde_json::to_string(&record)
}

impl<W: Write + Send> AuditLogger for JsonlAuditLogger<W> {
    fn log(&self, event: AuditEvent) {
        let event_type = event.event_type;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let outcome = audit_line(event, timestamp)
            .map_err(io::Error::from)
            .and_then(|line| self.write_line(&line));
        match outcome {
            Ok(()) => self.record_success(),
            Err(error) => self.record_failure(event_type, &error),
        }
    }
}

impl<W: Write + Send> Drop for JsonlAuditLogger<W> {
    fn drop(&mut self) {
        if let Err(error) = self.sink().flush()
            && !self.failing.load(Ordering::Relaxed)
        {
            warn!(path = ?self.path, %error, "Audit log flush failed on close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    // ==================== Test Mocks ====================

    /// Sink that rejects every write while `broken` is set.
    #[derive(Clone, Default)]
    struct FlakySink {
        broken: Arc<AtomicBool>,
        written: Arc<Mutex<Vec<u8>>>,
    }

    impl FlakySink {
        fn lines(&self) -> Vec<Value> {
            let written = self.written.lock().unwrap();
            String::from_utf8_lossy(&written)
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    impl Write for FlakySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(io::Error::other("disk full"));
            }
            self.written.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    // ==================== Tests ====================

    #[test]
    fn test_writes_one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let logger = JsonlAuditLogger::new(&path).unwrap();

        logger.log(AuditEvent::new(
            "invocation",
            json!({"tool": "file_reader", "state": "completed", "duration_ms": 3}),
        ));
        logger.log(AuditEvent::new(
            "memory_write",
            json!({"op": "update", "key": "prefs", "version": 2}),
        ));

        // Flushed per record, readable before the logger is dropped.
        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r["timestamp"].is_string()));
        assert_eq!(records[0]["type"], "invocation");
        assert_eq!(records[0]["tool"], "file_reader");
        assert_eq!(records[1]["type"], "memory_write");
        assert_eq!(records[1]["version"], 2);
        assert_eq!(logger.failed_writes(), 0);
    }

    #[test]
    fn test_appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.jsonl");

        let first = JsonlAuditLogger::new(&path).unwrap();
        first.log(AuditEvent::new("a", json!({})));
        drop(first);

        let second = JsonlAuditLogger::new(&path).unwrap();
        second.log(AuditEvent::new("b", json!({})));
        assert_eq!(second.path(), Some(path.as_path()));
        drop(second);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["type"], "b");
    }

    #[test]
    fn test_non_object_payload_kept_under_data() {
        let sink = FlakySink::default();
        let logger = JsonlAuditLogger::from_writer(sink.clone());

        logger.log(AuditEvent::new("note", json!("just a string")));

        let records = sink.lines();
        assert_eq!(records[0]["type"], "note");
        assert_eq!(records[0]["data"], "just a string");
        assert_eq!(logger.path(), None);
    }

    #[test]
    fn test_unopenable_path_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a log file.
        assert!(JsonlAuditLogger::new(dir.path()).is_none());
    }

    #[test]
    fn test_write_failures_are_counted_and_recover() {
        let sink = FlakySink::default();
        let logger = JsonlAuditLogger::from_writer(sink.clone());

        sink.broken.store(true, Ordering::SeqCst);
        logger.log(AuditEvent::new("invocation", json!({"tool": "a"})));
        logger.log(AuditEvent::new("invocation", json!({"tool": "b"})));
        assert_eq!(logger.failed_writes(), 2);
        assert!(logger.failing.load(Ordering::SeqCst));
        assert!(sink.lines().is_empty());

        sink.broken.store(false, Ordering::SeqCst);
        logger.log(AuditEvent::new("memory_write", json!({"key": "k"})));
        assert_eq!(logger.failed_writes(), 2);
        assert!(!logger.failing.load(Ordering::SeqCst));

        let records = sink.lines();
        assert_eq!(records.last().unwrap()["type"], "memory_write");
    }

    #[test]
    fn test_poisoned_writer_still_logs() {
        let sink = FlakySink::default();
        let logger = Arc::new(JsonlAuditLogger::from_writer(sink.clone()));

        let poisoner = Arc::clone(&logger);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sink.lock().unwrap();
            panic!("poison the audit writer");
        })
        .join();
        assert!(logger.sink.is_poisoned());

        logger.log(AuditEvent::new("access_denied", json!({"caller": "bob"})));
        assert_eq!(logger.failed_writes(), 0);
        assert_eq!(sink.lines()[0]["caller"], "bob");
    }
}
