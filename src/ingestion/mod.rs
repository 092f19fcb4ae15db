//! Loading entrypoints and implementations.
//!
//! - [`load_sequential`]: one named source into a [`crate::types::Table`]
//! - [`load_concurrent`]: many sources in parallel, returned in request order (all-or-nothing)
//! - [`stream_rows`]: one row at a time, without materializing a table
//!
//! Sources are reached through a [`Storage`]; [`FsStorage`] and [`MemoryStorage`] are provided.
//! Every load can report success/failure/alerts to a [`LoadObserver`].

pub mod concurrent;
pub mod csv;
pub mod loader;
pub mod observability;
pub mod source;
pub mod stream;

pub use concurrent::{load_concurrent, load_concurrent_from_dir, load_glob};
pub use csv::{load_csv_from_bytes, load_csv_from_path, load_csv_from_reader, CsvFormat};
pub use loader::{load_from_path, load_sequential, LoadOptions};
pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadMode, LoadObserver, LoadSeverity, LoadStats,
    StdErrObserver,
};
pub use source::{FsStorage, MemoryStorage, Storage};
pub use stream::{stream_csv_from_reader, stream_rows, RowStream};
