//! Row filtering for [`crate::types::Table`].
//!
//! Every function returns a new table with the original header and the relative order of the
//! matching rows. The source table is never modified.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::convert::{parse_date, parse_f64};
use crate::error::FrameResult;
use crate::types::{RowView, Table};

/// Returns a new [`Table`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`Table::filter_rows`].
pub fn filter<F>(table: &Table, predicate: F) -> Table
where
    F: FnMut(RowView<'_>) -> bool,
{
    table.filter_rows(predicate)
}

/// Like [`filter`], for predicates that can fail (e.g. on a conversion error).
pub fn try_filter<F>(table: &Table, predicate: F) -> FrameResult<Table>
where
    F: FnMut(RowView<'_>) -> FrameResult<bool>,
{
    table.try_filter_rows(predicate)
}

/// Rows whose `column` equals one of `values`.
pub fn filter_including(table: &Table, column: &str, values: &[&str]) -> FrameResult<Table> {
    membership(table, column, values, true)
}

/// Rows whose `column` equals none of `values`.
pub fn filter_excluding(table: &Table, column: &str, values: &[&str]) -> FrameResult<Table> {
    membership(table, column, values, false)
}

fn membership(table: &Table, column: &str, values: &[&str], keep_members: bool) -> FrameResult<Table> {
    let idx = table.header().require(column)?;
    let set: HashSet<&str> = values.iter().copied().collect();
    Ok(table.filter_rows(|row| set.contains(row.cells()[idx].as_str()) == keep_members))
}

/// Rows whose date in `column` is strictly before `bound`.
pub fn filter_before(table: &Table, column: &str, bound: &str) -> FrameResult<Table> {
    let bound = parse_date(column, bound)?;
    dated(table, column, |d| d < bound)
}

/// Rows whose date in `column` is strictly after `bound`.
pub fn filter_after(table: &Table, column: &str, bound: &str) -> FrameResult<Table> {
    let bound = parse_date(column, bound)?;
    dated(table, column, |d| d > bound)
}

/// Rows whose date in `column` lies strictly between `start` and `end`.
pub fn filter_between(table: &Table, column: &str, start: &str, end: &str) -> FrameResult<Table> {
    let start = parse_date(column, start)?;
    let end = parse_date(column, end)?;
    dated(table, column, |d| d > start && d < end)
}

fn dated(table: &Table, column: &str, keep: impl Fn(NaiveDate) -> bool) -> FrameResult<Table> {
    let idx = table.header().require(column)?;
    try_filter(table, |row| Ok(keep(parse_date(column, &row.cells()[idx])?)))
}

/// Rows whose numeric value in `column` is `> threshold`.
pub fn filter_greater_than(table: &Table, column: &str, threshold: f64) -> FrameResult<Table> {
    numeric(table, column, |v| v > threshold)
}

/// Rows whose numeric value in `column` is `< threshold`.
pub fn filter_less_than(table: &Table, column: &str, threshold: f64) -> FrameResult<Table> {
    numeric(table, column, |v| v < threshold)
}

/// Rows whose numeric value in `column` is `>= threshold`.
pub fn filter_at_least(table: &Table, column: &str, threshold: f64) -> FrameResult<Table> {
    numeric(table, column, |v| v >= threshold)
}

/// Rows whose numeric value in `column` is `<= threshold`.
pub fn filter_at_most(table: &Table, column: &str, threshold: f64) -> FrameResult<Table> {
    numeric(table, column, |v| v <= threshold)
}

fn numeric(table: &Table, column: &str, keep: impl Fn(f64) -> bool) -> FrameResult<Table> {
    let idx = table.header().require(column)?;
    try_filter(table, |row| Ok(keep(parse_f64(column, &row.cells()[idx])?)))
}
