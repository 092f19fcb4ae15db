//! Parallel multi-source loading with ordered reassembly.
//!
//! Each source is loaded by its own task on a rayon pool. Tasks share nothing but the read-only
//! storage handle; every task sends an `(index, result)` pair back, and the pairs are put back in
//! request order once all tasks have finished. The batch is all-or-nothing.

use std::path::Path;
use std::sync::mpsc;

use rayon::ThreadPoolBuilder;

use crate::error::{FrameError, FrameResult, SourceFailure};
use crate::types::Table;

use super::loader::{load_with_mode, LoadOptions};
use super::observability::LoadMode;
use super::source::{FsStorage, Storage};

/// Load every named source in parallel.
///
/// The returned tables are in the same order as `names`, regardless of completion order. All
/// loads run to completion; if any fails, every table is discarded and a single
/// [`FrameError::ConcurrencyError`] lists each failing source.
pub fn load_concurrent<S, N>(storage: &S, names: &[N], options: &LoadOptions) -> FrameResult<Vec<Table>>
where
    S: Storage + ?Sized,
    N: AsRef<str> + Sync,
{
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let workers = options
        .max_parallel
        .unwrap_or(names.len())
        .clamp(1, names.len());
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("csv-frames-load-{i}"))
        .build()?;

    tracing::debug!(sources = names.len(), workers, "dispatching concurrent load");

    let (tx, rx) = mpsc::channel::<(usize, FrameResult<Table>)>();
    pool.scope(|s| {
        for (index, name) in names.iter().enumerate() {
            let tx = tx.clone();
            s.spawn(move |_| {
                let result = load_with_mode(storage, name.as_ref(), options, LoadMode::Concurrent { index });
                // The receiver outlives the scope, so the send cannot fail.
                let _ = tx.send((index, result));
            });
        }
    });
    drop(tx);

    let mut slots: Vec<(usize, FrameResult<Table>)> = rx.into_iter().collect();
    slots.sort_by_key(|(index, _)| *index);

    let mut tables = Vec::with_capacity(names.len());
    let mut failures = Vec::new();
    for (index, result) in slots {
        match result {
            Ok(table) => tables.push(table),
            Err(error) => failures.push(SourceFailure {
                index,
                name: names[index].as_ref().to_owned(),
                error,
            }),
        }
    }

    if !failures.is_empty() {
        tracing::warn!(
            failed = failures.len(),
            total = names.len(),
            "concurrent load failed; discarding batch"
        );
        return Err(FrameError::ConcurrencyError {
            total: names.len(),
            failures,
        });
    }
    Ok(tables)
}

/// [`load_concurrent`] over files in a base directory.
pub fn load_concurrent_from_dir<N>(
    base: impl AsRef<Path>,
    names: &[N],
    options: &LoadOptions,
) -> FrameResult<Vec<Table>>
where
    N: AsRef<str> + Sync,
{
    load_concurrent(&FsStorage::new(base), names, options)
}

/// Load every file under `base` matching `pattern` (e.g. `"*.csv"`), in sorted name order.
///
/// Returns the matched names alongside their tables.
pub fn load_glob(
    base: impl AsRef<Path>,
    pattern: &str,
    options: &LoadOptions,
) -> FrameResult<Vec<(String, Table)>> {
    let base = base.as_ref();
    // Only `pattern` is a glob; the base directory is matched literally.
    let full = Path::new(&glob::Pattern::escape(&base.to_string_lossy())).join(pattern);
    let mut names = Vec::new();
    for entry in glob::glob(&full.to_string_lossy())? {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if !path.is_file() {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(base) {
            names.push(rel.to_string_lossy().into_owned());
        }
    }
    names.sort();

    let tables = load_concurrent_from_dir(base, &names, options)?;
    Ok(names.into_iter().zip(tables).collect())
}
