//! CSV decoding into a [`Table`].

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};
use crate::types::{Header, Row, Table};

/// Delimited-text dialect shared by the loaders, the streamer and the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvFormat {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Quote byte used around fields containing delimiters or newlines.
    pub quote: u8,
    /// Trim surrounding whitespace from headers and fields.
    pub trim: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
        }
    }
}

impl CsvFormat {
    pub(crate) fn reader<R: Read>(&self, source: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            // Field counts are checked by hand to report our own ParseError.
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::None })
            .from_reader(source)
    }

    pub(crate) fn writer<W: std::io::Write>(&self, sink: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .from_writer(sink)
    }
}

/// Load a CSV file into an in-memory [`Table`] using the default format.
pub fn load_csv_from_path(path: impl AsRef<Path>) -> FrameResult<Table> {
    let file = std::fs::File::open(path)?;
    load_csv_from_reader(file, &CsvFormat::default())
}

/// Load CSV data held in memory.
pub fn load_csv_from_bytes(bytes: &[u8], format: &CsvFormat) -> FrameResult<Table> {
    load_csv_from_reader(bytes, format)
}

/// Load CSV data from any reader.
///
/// Rules:
///
/// - The first line is the header; names must be unique.
/// - Every following line becomes one row; cells are kept verbatim as strings.
/// - A line whose field count differs from the header aborts the whole load with
///   [`FrameError::ParseError`] carrying its 1-based line number.
pub fn load_csv_from_reader<R: Read>(source: R, format: &CsvFormat) -> FrameResult<Table> {
    let mut rdr = format.reader(source);
    let header = read_header(&mut rdr)?;

    let mut rows: Vec<Row> = Vec::new();
    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record)? {
        rows.push(record_to_row(&record, header.len())?);
    }

    Ok(Table::from_parts_unchecked(header, rows))
}

pub(crate) fn read_header<R: Read>(rdr: &mut csv::Reader<R>) -> FrameResult<Header> {
    let names = rdr.headers()?;
    if names.is_empty() {
        return Err(FrameError::ParseError {
            line: 1,
            message: "missing header line".to_string(),
        });
    }
    Ok(Header::new(names.iter())?)
}

pub(crate) fn record_to_row(record: &csv::StringRecord, width: usize) -> FrameResult<Row> {
    if record.len() != width {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        return Err(FrameError::ParseError {
            line,
            message: format!("expected {width} fields, found {}", record.len()),
        });
    }
    Ok(record.iter().map(str::to_owned).collect())
}
