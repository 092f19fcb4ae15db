use std::fmt;

use thiserror::Error;

/// Convenience result type used across the crate.
pub type FrameResult<T> = Result<T, FrameError>;

/// Header-level failures: a column that should exist does not, or one that must not exist does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The named column is not part of the header.
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    /// The named column already exists in the header.
    #[error("column '{column}' already exists")]
    DuplicateColumn { column: String },
}

impl SchemaError {
    pub(crate) fn not_found(column: &str) -> Self {
        Self::ColumnNotFound {
            column: column.to_owned(),
        }
    }

    pub(crate) fn duplicate(column: &str) -> Self {
        Self::DuplicateColumn {
            column: column.to_owned(),
        }
    }
}

/// Error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the delimited-text decoder/encoder.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Column lookup or header uniqueness failure.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A line of input (or a row handed to `add_row`) does not fit the header.
    #[error("parse error at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// A cell could not be interpreted as the requested type.
    #[error("cannot convert value '{raw}' in column '{column}' to {target}")]
    ConversionError {
        column: String,
        raw: String,
        target: &'static str,
    },

    /// One or more sources of a concurrent load failed; no table of the batch is returned.
    #[error("{} of {total} sources failed to load (first: {})", .failures.len(), first_failure(.failures))]
    ConcurrencyError {
        total: usize,
        failures: Vec<SourceFailure>,
    },

    /// A row index past the end of the table.
    #[error("row {row} out of range ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    /// Two tables are structurally incompatible for the requested operation.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The worker pool for a concurrent load could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A glob pattern used to select sources is invalid.
    #[error("invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// A single failed source within a [`FrameError::ConcurrencyError`].
#[derive(Debug)]
pub struct SourceFailure {
    /// Position of the source in the requested name list.
    pub index: usize,
    /// Source name as requested.
    pub name: String,
    /// Why loading this source failed.
    pub error: FrameError,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} '{}': {}", self.index, self.name, self.error)
    }
}

fn first_failure(failures: &[SourceFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string())
}

impl FrameError {
    pub(crate) fn conversion(column: &str, raw: &str, target: &'static str) -> Self {
        Self::ConversionError {
            column: column.to_owned(),
            raw: raw.to_owned(),
            target,
        }
    }

    /// Returns the schema error carried by this error, if any.
    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}
