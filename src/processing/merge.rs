//! Key-based merges and concatenation.
//!
//! Both merges build a lookup index over the secondary table (key value → first row carrying
//! it), then walk the primary table once. Keys compare as exact strings.

use std::collections::HashMap;

use crate::error::{FrameError, FrameResult, SchemaError};
use crate::types::{Header, Row, Table};

/// Map each key value of `table[key]` to the index of the first row carrying it.
///
/// Later rows with an already-seen key are ignored.
pub fn build_index<'a>(table: &'a Table, key: &str) -> FrameResult<HashMap<&'a str, usize>> {
    let mut index = HashMap::with_capacity(table.row_count());
    for (i, value) in table.column(key)?.enumerate() {
        index.entry(value).or_insert(i);
    }
    Ok(index)
}

/// Left-outer merge of `right` into `left` on `key`.
///
/// Every row of `left` is kept. Matched rows are extended with `columns` from the first `right`
/// row carrying the same key (all non-key `right` columns when `columns` is empty); unmatched
/// rows get empty strings.
///
/// ```rust
/// use csv_frames::processing::merge;
/// use csv_frames::types::Table;
///
/// let mut a = Table::new(["id", "name"]).unwrap();
/// a.add_row(["1", "Ann"]).unwrap();
/// a.add_row(["2", "Bob"]).unwrap();
/// let mut b = Table::new(["id", "city"]).unwrap();
/// b.add_row(["2", "NYC"]).unwrap();
/// b.add_row(["3", "LA"]).unwrap();
///
/// let out = merge(&a, &b, "id", &[]).unwrap();
/// assert_eq!(out.columns(), ["id", "name", "city"]);
/// assert_eq!(out.rows()[0], vec!["1", "Ann", ""]);
/// assert_eq!(out.rows()[1], vec!["2", "Bob", "NYC"]);
/// ```
pub fn merge(left: &Table, right: &Table, key: &str, columns: &[&str]) -> FrameResult<Table> {
    join(left, right, key, columns, false)
}

/// Inner merge: like [`merge`], but rows of `left` without a match are dropped.
pub fn inner_merge(left: &Table, right: &Table, key: &str, columns: &[&str]) -> FrameResult<Table> {
    join(left, right, key, columns, true)
}

fn join(
    left: &Table,
    right: &Table,
    key: &str,
    columns: &[&str],
    inner: bool,
) -> FrameResult<Table> {
    let left_key = left.header().require(key)?;
    let right_key = right.header().require(key)?;

    let appended: Vec<usize> = if columns.is_empty() {
        (0..right.header().len()).filter(|&i| i != right_key).collect()
    } else {
        columns
            .iter()
            .map(|c| right.header().require(c))
            .collect::<Result<_, _>>()?
    };

    let mut names: Vec<&str> = left.columns().iter().map(String::as_str).collect();
    for &i in &appended {
        let name = right.columns()[i].as_str();
        if names.contains(&name) {
            return Err(SchemaError::duplicate(name).into());
        }
        names.push(name);
    }
    let header = Header::new(names)?;
    let width = header.len();

    let index = build_index(right, key)?;
    let mut out = Table::from_parts_unchecked(header, Vec::new());
    for row in left.rows() {
        let matched = index.get(row[left_key].as_str()).map(|&i| &right.rows()[i]);
        if inner && matched.is_none() {
            continue;
        }
        let mut extended: Row = Vec::with_capacity(width);
        extended.extend(row.iter().cloned());
        match matched {
            Some(m) => extended.extend(appended.iter().map(|&i| m[i].clone())),
            None => extended.extend(appended.iter().map(|_| String::new())),
        }
        out.push_unchecked(extended);
    }

    tracing::debug!(
        key,
        inner,
        left_rows = left.row_count(),
        right_rows = right.row_count(),
        out_rows = out.row_count(),
        "merged tables"
    );
    Ok(out)
}

/// Append all rows of `right` to a copy of `left`.
///
/// Headers must match exactly (same names, same order); otherwise
/// [`FrameError::SchemaMismatch`] is returned.
pub fn concat(left: &Table, right: &Table) -> FrameResult<Table> {
    if left.columns() != right.columns() {
        return Err(FrameError::SchemaMismatch {
            message: format!(
                "cannot concatenate tables with different headers: {:?} vs {:?}",
                left.columns(),
                right.columns()
            ),
        });
    }
    let (header, mut rows) = left.clone().into_parts();
    rows.extend(right.rows().iter().cloned());
    Ok(Table::from_parts_unchecked(header, rows))
}
