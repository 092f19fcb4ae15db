//! On-demand interpretation of raw string cells.
//!
//! Cells are stored as text. Numeric and date views are computed at the point of use and every
//! failure is reported as [`FrameError::ConversionError`].

use chrono::NaiveDate;

use crate::error::{FrameError, FrameResult};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a cell as `f64` (surrounding whitespace ignored).
pub fn parse_f64(column: &str, raw: &str) -> FrameResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| FrameError::conversion(column, raw, "f64"))
}

/// Parse a cell as `i64` (surrounding whitespace ignored).
pub fn parse_i64(column: &str, raw: &str) -> FrameResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| FrameError::conversion(column, raw, "i64"))
}

/// Parse a cell as a date.
///
/// Accepted layouts: `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`, `M/D/YYYY`. A trailing time part
/// separated by a space or `T` is ignored.
pub fn parse_date(column: &str, raw: &str) -> FrameResult<NaiveDate> {
    let date_part = raw.trim().split([' ', 'T']).next().unwrap_or_default();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| FrameError::conversion(column, raw, "date"))
}
