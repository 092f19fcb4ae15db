//! `csv-frames` is an in-memory table engine for delimited text.
//!
//! Sources are loaded into a [`types::Table`] of raw string cells, either one at a time
//! ([`ingestion::load_sequential`]), many in parallel ([`ingestion::load_concurrent`]), or row by
//! row without materializing a table ([`ingestion::stream_rows`]). Tables can then be filtered,
//! projected, concatenated and merged on a key column ([`processing`]).
//!
//! ## Data model
//!
//! - A [`types::Header`] is an ordered set of unique column names.
//! - A [`types::Row`] holds one string per column.
//! - A [`types::Table`] owns its header and rows; `clone()` gives a fully decoupled copy.
//!
//! Cells carry no type. Numeric and date views are computed on demand
//! ([`types::RowView::as_f64`], [`types::RowView::as_date`]) and report
//! [`FrameError::ConversionError`] instead of panicking.
//!
//! ## Quick examples: load data
//!
//! ```no_run
//! use csv_frames::ingestion::{load_concurrent, load_sequential, FsStorage, LoadOptions};
//!
//! # fn main() -> Result<(), csv_frames::FrameError> {
//! let storage = FsStorage::new("data");
//! let opts = LoadOptions::default();
//!
//! let people = load_sequential(&storage, "people.csv", &opts)?;
//! println!("rows={}", people.row_count());
//!
//! // Returned in request order, whatever order the loads finish in.
//! let months = load_concurrent(&storage, &["jan.csv", "feb.csv", "mar.csv"], &opts)?;
//! assert_eq!(months.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! Streaming keeps memory flat and can be stopped early:
//!
//! ```no_run
//! use csv_frames::ingestion::{stream_rows, FsStorage, LoadOptions};
//!
//! # fn main() -> Result<(), csv_frames::FrameError> {
//! let storage = FsStorage::new("data");
//! let mut stream = stream_rows(&storage, "huge.csv", &LoadOptions::default())?;
//! let id = stream.header().require("id")?;
//! for row in stream.by_ref() {
//!     if row?[id] == "42" {
//!         break;
//!     }
//! }
//! stream.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Processing example
//!
//! ```rust
//! use csv_frames::processing::{filter_including, inner_merge};
//! use csv_frames::types::Table;
//!
//! let mut a = Table::new(["id", "name"]).unwrap();
//! a.add_row(["1", "Ann"]).unwrap();
//! a.add_row(["2", "Bob"]).unwrap();
//! let mut b = Table::new(["id", "city"]).unwrap();
//! b.add_row(["2", "NYC"]).unwrap();
//! b.add_row(["3", "LA"]).unwrap();
//!
//! let joined = inner_merge(&a, &b, "id", &[]).unwrap();
//! assert_eq!(joined.columns(), ["id", "name", "city"]);
//! assert_eq!(joined.rows()[0], vec!["2", "Bob", "NYC"]);
//!
//! let bobs = filter_including(&joined, "name", &["Bob"]).unwrap();
//! assert_eq!(bobs.row_count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: storage, sequential/concurrent/streaming loaders, observers
//! - [`types`]: header, row and table types
//! - [`processing`]: filters, merges, concatenation, aggregates
//! - [`export`]: writing tables back out as delimited text
//! - [`convert`]: on-demand numeric/date interpretation of cells
//! - [`error`]: error types used across the crate

pub mod convert;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{FrameError, FrameResult, SchemaError, SourceFailure};
pub use types::{Header, Row, Table};
