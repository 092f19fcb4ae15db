//! Encoding tables back to delimited text.

use std::io::Write;

use crate::error::FrameResult;
use crate::ingestion::{CsvFormat, Storage};
use crate::types::Table;

/// Write `table` (header line first) to `sink`.
pub fn write_csv<W: Write>(table: &Table, sink: W, format: &CsvFormat) -> FrameResult<()> {
    let mut wtr = format.writer(sink);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Encode `table` into an in-memory buffer.
pub fn to_csv_bytes(table: &Table, format: &CsvFormat) -> FrameResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf, format)?;
    Ok(buf)
}

/// Encode `table` and store it under `name`.
pub fn save<S: Storage + ?Sized>(
    table: &Table,
    storage: &S,
    name: &str,
    format: &CsvFormat,
) -> FrameResult<()> {
    let mut sink = storage.create(name)?;
    write_csv(table, &mut sink, format)?;
    sink.flush()?;
    tracing::debug!(name, rows = table.row_count(), "saved table");
    Ok(())
}
