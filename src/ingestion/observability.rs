use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;

use crate::error::FrameError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O or other infrastructure failures).
    Critical,
}

impl LoadSeverity {
    /// Classify a load failure.
    pub fn for_error(e: &FrameError) -> Self {
        match e {
            FrameError::Io(_) | FrameError::ThreadPool(_) => Self::Critical,
            FrameError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            FrameError::ConcurrencyError { failures, .. } => failures
                .iter()
                .map(|f| Self::for_error(&f.error))
                .max()
                .unwrap_or(Self::Error),
            _ => Self::Error,
        }
    }
}

/// How a source was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadMode {
    Sequential,
    /// One source of a concurrent batch, with its position in the request.
    Concurrent { index: usize },
    Stream,
}

/// Context about a load attempt.
#[derive(Debug, Clone, Serialize)]
pub struct LoadContext {
    /// Source name as given to the loader.
    pub source: String,
    pub mode: LoadMode,
}

/// Minimal stats reported on successful loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub rows: usize,
    pub columns: usize,
}

impl fmt::Display for LoadSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        })
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Concurrent { index } => write!(f, "concurrent #{index}"),
            Self::Stream => f.write_str("stream"),
        }
    }
}

impl fmt::Display for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.source, self.mode)
    }
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts. Observers attached to a concurrent
/// load are called from worker threads.
pub trait LoadObserver: Send + Sync {
    /// Called when a load succeeds.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when a load fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &FrameError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FrameError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans every callback out to a list of observers, in registration order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }

    /// Builder-style registration of one more observer.
    pub fn with(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    fn each(&self, f: impl Fn(&dyn LoadObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FrameError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FrameError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Prints one line per event to stderr, e.g. `csv-frames: jan.csv (concurrent #0): 2x2`.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl LoadObserver for StdErrObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        eprintln!("csv-frames: {ctx}: {}x{}", stats.rows, stats.columns);
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FrameError) {
        eprintln!("csv-frames: {ctx}: {severity}: {error}");
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FrameError) {
        eprintln!("csv-frames: ALERT {ctx}: {severity}: {error}");
    }
}

#[derive(Serialize)]
struct EventRecord<'a> {
    ts_ms: i64,
    event: &'static str,
    #[serde(flatten)]
    ctx: &'a LoadContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<LoadSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<LoadStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Appends load events to a local file, one JSON object per line.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, record: &EventRecord<'_>) {
        let Ok(line) = serde_json::to_string(record) else {
            return;
        };
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }

    fn failure_record<'a>(
        event: &'static str,
        ctx: &'a LoadContext,
        severity: LoadSeverity,
        error: &FrameError,
    ) -> EventRecord<'a> {
        EventRecord {
            ts_ms: Utc::now().timestamp_millis(),
            event,
            ctx,
            severity: Some(severity),
            stats: None,
            error: Some(error.to_string()),
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append(&EventRecord {
            ts_ms: Utc::now().timestamp_millis(),
            event: "ok",
            ctx,
            severity: None,
            stats: Some(stats),
            error: None,
        });
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FrameError) {
        self.append(&Self::failure_record("fail", ctx, severity, error));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FrameError) {
        self.append(&Self::failure_record("alert", ctx, severity, error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failures_are_critical() {
        let io = FrameError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "x"));
        assert_eq!(LoadSeverity::for_error(&io), LoadSeverity::Critical);

        let parse = FrameError::ParseError {
            line: 3,
            message: "bad".into(),
        };
        assert_eq!(LoadSeverity::for_error(&parse), LoadSeverity::Error);
    }

    #[test]
    fn context_display_names_source_and_mode() {
        let ctx = LoadContext {
            source: "jan.csv".into(),
            mode: LoadMode::Concurrent { index: 0 },
        };
        assert_eq!(ctx.to_string(), "jan.csv (concurrent #0)");
        assert_eq!(LoadMode::Stream.to_string(), "stream");
        assert_eq!(LoadSeverity::Critical.to_string(), "critical");
    }

    #[derive(Default)]
    struct Counter {
        calls: Mutex<usize>,
    }

    impl LoadObserver for Counter {
        fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {
            *self.calls.lock().unwrap() += 1;
        }
    }

    #[test]
    fn composite_fans_out_to_every_observer() {
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        let composite = CompositeObserver::default().with(a.clone()).with(b.clone());
        assert_eq!(composite.len(), 2);

        let ctx = LoadContext {
            source: "x.csv".into(),
            mode: LoadMode::Sequential,
        };
        composite.on_success(&ctx, LoadStats { rows: 1, columns: 1 });
        assert_eq!(*a.calls.lock().unwrap(), 1);
        assert_eq!(*b.calls.lock().unwrap(), 1);
    }

    #[test]
    fn file_observer_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let obs = FileObserver::new(&path);
        let ctx = LoadContext {
            source: "a.csv".into(),
            mode: LoadMode::Concurrent { index: 2 },
        };
        obs.on_success(&ctx, LoadStats { rows: 3, columns: 2 });
        obs.on_failure(
            &ctx,
            LoadSeverity::Error,
            &FrameError::ParseError {
                line: 4,
                message: "expected 2 fields, found 1".into(),
            },
        );

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "ok");
        assert_eq!(lines[0]["source"], "a.csv");
        assert_eq!(lines[0]["stats"]["rows"], 3);
        assert!(lines[0]["ts_ms"].as_i64().unwrap() > 0);
        assert_eq!(lines[1]["event"], "fail");
        assert_eq!(lines[1]["severity"], "Error");
        assert!(lines[1]["error"].as_str().unwrap().contains("line 4"));
    }
}
