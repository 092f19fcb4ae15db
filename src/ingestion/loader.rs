//! Sequential loading by source name.
//!
//! [`load_sequential`] opens one source through a [`Storage`], decodes it into a [`Table`] and
//! reports the outcome to the configured [`LoadObserver`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{FrameError, FrameResult};
use crate::types::Table;

use super::csv::{load_csv_from_reader, CsvFormat};
use super::observability::{LoadContext, LoadMode, LoadObserver, LoadSeverity, LoadStats};
use super::source::{FsStorage, Storage};

/// Options controlling how sources are loaded.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// Delimited-text dialect.
    pub format: CsvFormat,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
    /// Upper bound on concurrently loading sources.
    ///
    /// If `None`, a concurrent load runs one worker per source.
    pub max_parallel: Option<usize>,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("max_parallel", &self.max_parallel)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: CsvFormat::default(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
            max_parallel: None,
        }
    }
}

/// Load one named source from `storage` into a [`Table`].
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use std::sync::Arc;
///
/// use csv_frames::ingestion::{load_sequential, FsStorage, LoadOptions, StdErrObserver};
///
/// # fn main() -> Result<(), csv_frames::FrameError> {
/// let storage = FsStorage::new("data");
/// let opts = LoadOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// let table = load_sequential(&storage, "people.csv", &opts)?;
/// println!("rows={}", table.row_count());
/// # Ok(())
/// # }
/// ```
pub fn load_sequential<S: Storage + ?Sized>(
    storage: &S,
    name: &str,
    options: &LoadOptions,
) -> FrameResult<Table> {
    load_with_mode(storage, name, options, LoadMode::Sequential)
}

/// Load a single file from disk, reporting to the configured observer.
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> FrameResult<Table> {
    let path = path.as_ref();
    let storage = FsStorage::new(path.parent().unwrap_or_else(|| Path::new("")));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    load_sequential(&storage, &name, options)
}

pub(crate) fn load_with_mode<S: Storage + ?Sized>(
    storage: &S,
    name: &str,
    options: &LoadOptions,
    mode: LoadMode,
) -> FrameResult<Table> {
    let result = storage
        .open(name)
        .and_then(|source| load_csv_from_reader(source, &options.format));

    match &result {
        Ok(table) => tracing::debug!(
            source = name,
            rows = table.row_count(),
            columns = table.columns().len(),
            "loaded table"
        ),
        Err(e) => tracing::debug!(source = name, error = %e, "load failed"),
    }

    let ctx = LoadContext {
        source: name.to_owned(),
        mode,
    };
    report(
        options,
        &ctx,
        result.as_ref().map(|t| LoadStats {
            rows: t.row_count(),
            columns: t.columns().len(),
        }),
    );
    result
}

pub(crate) fn report(
    options: &LoadOptions,
    ctx: &LoadContext,
    outcome: Result<LoadStats, &FrameError>,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match outcome {
        Ok(stats) => obs.on_success(ctx, stats),
        Err(e) => {
            let sev = LoadSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}
