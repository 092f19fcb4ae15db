//! Core data model: [`Header`], [`Row`] and [`Table`].
//!
//! A [`Table`] owns its header and every row. Cells are stored as raw strings; typed views are
//! available on demand through [`RowView`] and fail with a conversion error instead of panicking.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::convert;
use crate::error::{FrameError, FrameResult, SchemaError};

/// One record's cells, aligned positionally with the owning table's [`Header`].
pub type Row = Vec<String>;

/// Ordered, unique set of column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    /// Build a header from column names.
    ///
    /// Fails with [`SchemaError::DuplicateColumn`] if a name appears twice.
    pub fn new<I, S>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut header = Self::default();
        for name in names {
            header.push(name.into())?;
        }
        Ok(header)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a column, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Position of a column, or [`SchemaError::ColumnNotFound`].
    pub fn require(&self, name: &str) -> Result<usize, SchemaError> {
        self.position(name).ok_or_else(|| SchemaError::not_found(name))
    }

    fn push(&mut self, name: String) -> Result<(), SchemaError> {
        if self.positions.contains_key(&name) {
            return Err(SchemaError::duplicate(&name));
        }
        self.positions.insert(name.clone(), self.names.len());
        self.names.push(name);
        Ok(())
    }

    fn remove_at(&mut self, idx: usize) {
        let name = self.names.remove(idx);
        self.positions.remove(&name);
        for pos in self.positions.values_mut() {
            if *pos > idx {
                *pos -= 1;
            }
        }
    }

    fn rename_at(&mut self, idx: usize, new: String) {
        let old = std::mem::replace(&mut self.names[idx], new.clone());
        self.positions.remove(&old);
        self.positions.insert(new, idx);
    }
}

/// Read-only view of one row together with the header that names its cells.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    header: &'a Header,
    cells: &'a [String],
}

impl<'a> RowView<'a> {
    pub fn cells(&self) -> &'a [String] {
        self.cells
    }

    /// Raw cell value of `column`.
    pub fn value_at(&self, column: &str) -> FrameResult<&'a str> {
        let idx = self.header.require(column)?;
        Ok(self.cells[idx].as_str())
    }

    pub fn as_f64(&self, column: &str) -> FrameResult<f64> {
        convert::parse_f64(column, self.value_at(column)?)
    }

    pub fn as_i64(&self, column: &str) -> FrameResult<i64> {
        convert::parse_i64(column, self.value_at(column)?)
    }

    pub fn as_date(&self, column: &str) -> FrameResult<NaiveDate> {
        convert::parse_date(column, self.value_at(column)?)
    }
}

/// Mutable handle to a live row inside its owning [`Table`].
///
/// Updates through this handle change the table itself; there is no detached copy.
#[derive(Debug)]
pub struct RowMut<'a> {
    header: &'a Header,
    cells: &'a mut Row,
}

impl RowMut<'_> {
    pub fn value_at(&self, column: &str) -> FrameResult<&str> {
        let idx = self.header.require(column)?;
        Ok(self.cells[idx].as_str())
    }

    /// Overwrite the cell of `column` in place.
    pub fn update(&mut self, column: &str, value: impl Into<String>) -> FrameResult<()> {
        let idx = self.header.require(column)?;
        self.cells[idx] = value.into();
        Ok(())
    }

    pub fn view(&self) -> RowView<'_> {
        RowView {
            header: self.header,
            cells: self.cells.as_slice(),
        }
    }
}

/// In-memory table of string cells.
///
/// Every row has exactly one cell per header column. `Clone` produces a fully decoupled copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Header,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> FrameResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            header: Header::new(columns)?,
            rows: Vec::new(),
        })
    }

    /// Create a table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a table from a header and rows, validating every row length.
    ///
    /// Row `i` is reported as line `i + 2` (the header occupies line 1).
    pub fn from_parts(header: Header, rows: Vec<Row>) -> FrameResult<Self> {
        if let Some(bad) = rows.iter().position(|r| r.len() != header.len()) {
            return Err(FrameError::ParseError {
                line: bad as u64 + 2,
                message: format!(
                    "expected {} fields, found {}",
                    header.len(),
                    rows[bad].len()
                ),
            });
        }
        Ok(Self { header, rows })
    }

    pub(crate) fn from_parts_unchecked(header: Header, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == header.len()));
        Self { header, rows }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        self.header.names()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<RowView<'_>> {
        self.rows.get(idx).map(|cells| RowView {
            header: &self.header,
            cells,
        })
    }

    /// Addressable mutable access to the row at `idx`.
    pub fn row_mut(&mut self, idx: usize) -> Option<RowMut<'_>> {
        let header = &self.header;
        self.rows.get_mut(idx).map(|cells| RowMut { header, cells })
    }

    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        let header = &self.header;
        self.rows.iter().map(move |cells| RowView { header, cells })
    }

    /// Iterate live rows; updates through the yielded handles mutate this table.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = RowMut<'_>> {
        let header = &self.header;
        self.rows.iter_mut().map(move |cells| RowMut { header, cells })
    }

    /// Raw cell at (`row`, `column`).
    pub fn value_at(&self, row: usize, column: &str) -> FrameResult<&str> {
        let idx = self.header.require(column)?;
        self.rows
            .get(row)
            .map(|r| r[idx].as_str())
            .ok_or(FrameError::RowOutOfRange {
                row,
                rows: self.rows.len(),
            })
    }

    /// Iterate the cells of one column.
    pub fn column<'a>(&'a self, name: &str) -> FrameResult<impl Iterator<Item = &'a str> + use<'a>> {
        let idx = self.header.require(name)?;
        Ok(self.rows.iter().map(move |r| r[idx].as_str()))
    }

    /// Distinct values of `column` in first-seen order.
    pub fn unique(&self, column: &str) -> FrameResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for value in self.column(column)? {
            if seen.insert(value) {
                out.push(value.to_owned());
            }
        }
        Ok(out)
    }

    /// Append a row. Fails with [`FrameError::ParseError`] if the length does not match the
    /// header; the table is left unchanged.
    pub fn add_row<I, S>(&mut self, values: I) -> FrameResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Row = values.into_iter().map(Into::into).collect();
        if row.len() != self.header.len() {
            return Err(FrameError::ParseError {
                line: self.rows.len() as u64 + 2,
                message: format!(
                    "expected {} fields, found {}",
                    self.header.len(),
                    row.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a column, filling every existing row with `default`.
    pub fn add_column(&mut self, name: &str, default: &str) -> FrameResult<()> {
        self.header.push(name.to_owned())?;
        for row in &mut self.rows {
            row.push(default.to_owned());
        }
        Ok(())
    }

    /// Remove a column and its cell from every row.
    pub fn remove_column(&mut self, name: &str) -> FrameResult<()> {
        let idx = self.header.require(name)?;
        self.header.remove_at(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        Ok(())
    }

    /// Rename a column in place. Renaming a column to itself is a no-op.
    pub fn rename(&mut self, old: &str, new: &str) -> FrameResult<()> {
        let idx = self.header.require(old)?;
        if old == new {
            return Ok(());
        }
        if self.header.contains(new) {
            return Err(SchemaError::duplicate(new).into());
        }
        self.header.rename_at(idx, new.to_owned());
        Ok(())
    }

    /// New table containing only `names`, in the given order.
    pub fn keep_columns(&self, names: &[&str]) -> FrameResult<Table> {
        let idxs = names
            .iter()
            .map(|n| self.header.require(n))
            .collect::<Result<Vec<_>, _>>()?;
        let header = Header::new(names.iter().copied())?;
        let rows = self
            .rows
            .iter()
            .map(|r| idxs.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(Self::from_parts_unchecked(header, rows))
    }

    /// New table without `names`; remaining columns keep their relative order.
    pub fn remove_columns(&self, names: &[&str]) -> FrameResult<Table> {
        for n in names {
            self.header.require(n)?;
        }
        let kept: Vec<&str> = self
            .header
            .names()
            .iter()
            .map(String::as_str)
            .filter(|n| !names.contains(n))
            .collect();
        self.keep_columns(&kept)
    }

    /// New table containing only rows that match `predicate`.
    ///
    /// The returned table preserves the original header.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Table
    where
        F: FnMut(RowView<'_>) -> bool,
    {
        let rows = self
            .iter()
            .filter(|row| predicate(*row))
            .map(|row| row.cells().to_vec())
            .collect();
        Self::from_parts_unchecked(self.header.clone(), rows)
    }

    /// Like [`Table::filter_rows`], but the predicate may fail; the first failure is returned.
    pub fn try_filter_rows<F>(&self, mut predicate: F) -> FrameResult<Table>
    where
        F: FnMut(RowView<'_>) -> FrameResult<bool>,
    {
        let mut rows = Vec::new();
        for row in self.iter() {
            if predicate(row)? {
                rows.push(row.cells().to_vec());
            }
        }
        Ok(Self::from_parts_unchecked(self.header.clone(), rows))
    }

    pub(crate) fn push_unchecked(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    pub(crate) fn into_parts(self) -> (Header, Vec<Row>) {
        (self.header, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        let mut t = Table::new(["id", "name", "score"]).unwrap();
        t.add_row(["1", "Ann", "9.5"]).unwrap();
        t.add_row(["2", "Bob", "7"]).unwrap();
        t.add_row(["3", "Cy", "oops"]).unwrap();
        t
    }

    #[test]
    fn header_rejects_duplicate_names() {
        let err = Header::new(["a", "b", "a"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumn {
                column: "a".to_string()
            }
        );
    }

    #[test]
    fn value_at_reports_missing_column() {
        let t = people();
        let err = t.row(0).unwrap().value_at("city").unwrap_err();
        assert_eq!(
            err.as_schema(),
            Some(&SchemaError::ColumnNotFound {
                column: "city".to_string()
            })
        );
        assert_eq!(t.value_at(1, "name").unwrap(), "Bob");
    }

    #[test]
    fn value_at_past_last_row_is_out_of_range() {
        let t = people();
        let err = t.value_at(5, "name").unwrap_err();
        assert!(matches!(err, FrameError::RowOutOfRange { row: 5, rows: 3 }));
        assert_eq!(err.to_string(), "row 5 out of range (3 rows)");
    }

    #[test]
    fn add_row_with_wrong_length_leaves_table_unchanged() {
        let mut t = people();
        let before = t.clone();
        let err = t.add_row(["4", "Dee"]).unwrap_err();
        assert!(matches!(err, FrameError::ParseError { line: 5, .. }));
        assert_eq!(t, before);
    }

    #[test]
    fn iter_mut_updates_live_rows() {
        let mut t = people();
        for mut row in t.iter_mut() {
            if row.value_at("name").unwrap() == "Bob" {
                row.update("score", "10").unwrap();
            }
        }
        assert_eq!(t.value_at(1, "score").unwrap(), "10");

        let mut first = t.row_mut(0).unwrap();
        first.update("name", "Anne").unwrap();
        assert!(first.update("missing", "x").is_err());
        assert_eq!(t.value_at(0, "name").unwrap(), "Anne");
    }

    #[test]
    fn clone_is_decoupled() {
        let original = people();
        let mut copy = original.clone();
        copy.row_mut(0).unwrap().update("name", "Zed").unwrap();
        copy.add_column("city", "").unwrap();
        assert_eq!(original.value_at(0, "name").unwrap(), "Ann");
        assert_eq!(original.columns(), ["id", "name", "score"]);
    }

    #[test]
    fn add_column_fills_default_and_rejects_duplicates() {
        let mut t = people();
        t.add_column("city", "NYC").unwrap();
        assert!(t.rows().iter().all(|r| r.len() == 4 && r[3] == "NYC"));

        let err = t.add_column("name", "").unwrap_err();
        assert!(matches!(
            err,
            FrameError::Schema(SchemaError::DuplicateColumn { .. })
        ));
        assert!(t.rows().iter().all(|r| r.len() == 4));
    }

    #[test]
    fn remove_then_add_column_restores_name_set() {
        let mut t = people();
        t.remove_column("name").unwrap();
        assert_eq!(t.columns(), ["id", "score"]);
        assert_eq!(t.header().position("score"), Some(1));
        assert_eq!(t.rows()[0], vec!["1", "9.5"]);

        t.add_column("name", "?").unwrap();
        let mut names = t.columns().to_vec();
        names.sort();
        assert_eq!(names, ["id", "name", "score"]);
        assert!(t.remove_column("nope").is_err());
    }

    #[test]
    fn rename_checks_both_names() {
        let mut t = people();
        t.rename("score", "points").unwrap();
        assert_eq!(t.header().position("points"), Some(2));
        assert!(!t.header().contains("score"));
        assert!(t.rename("score", "x").is_err());
        assert!(t.rename("points", "id").is_err());
        t.rename("id", "id").unwrap();
    }

    #[test]
    fn keep_and_remove_columns_project_rows() {
        let t = people();
        let kept = t.keep_columns(&["score", "id"]).unwrap();
        assert_eq!(kept.columns(), ["score", "id"]);
        assert_eq!(kept.rows()[1], vec!["7", "2"]);

        let removed = t.remove_columns(&["score"]).unwrap();
        assert_eq!(removed.columns(), ["id", "name"]);
        assert!(t.keep_columns(&["nope"]).is_err());
    }

    #[test]
    fn typed_accessors_report_conversion_errors() {
        let t = people();
        assert_eq!(t.row(0).unwrap().as_f64("score").unwrap(), 9.5);
        assert_eq!(t.row(1).unwrap().as_i64("id").unwrap(), 2);
        let err = t.row(2).unwrap().as_f64("score").unwrap_err();
        assert!(matches!(err, FrameError::ConversionError { target: "f64", .. }));
    }

    #[test]
    fn unique_keeps_first_seen_order() {
        let mut t = Table::new(["k"]).unwrap();
        for v in ["b", "a", "b", "c", "a"] {
            t.add_row([v]).unwrap();
        }
        assert_eq!(t.unique("k").unwrap(), ["b", "a", "c"]);
    }

    #[test]
    fn from_parts_validates_row_lengths() {
        let header = Header::new(["a", "b"]).unwrap();
        let err = Table::from_parts(header, vec![vec!["1".into(), "2".into()], vec!["3".into()]])
            .unwrap_err();
        assert!(matches!(err, FrameError::ParseError { line: 3, .. }));
    }
}
