//! Numeric aggregates over a single column of a [`crate::types::Table`].

use crate::convert::parse_f64;
use crate::error::FrameResult;
use crate::types::Table;

/// Built-in aggregate operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    /// Count of non-empty cells.
    Count,
    /// Sum of numeric values.
    Sum,
    /// Arithmetic mean.
    Average,
    /// Minimum numeric value.
    Min,
    /// Maximum numeric value.
    Max,
    /// Population standard deviation.
    StdDev,
}

/// Aggregate a column using a built-in [`AggregateOp`].
///
/// - Empty (or whitespace-only) cells are skipped.
/// - Any other cell that is not a number fails with a conversion error.
/// - `Count` and `Sum` over no values give `Some(0.0)`; the other operations give `None`.
pub fn aggregate(table: &Table, column: &str, op: AggregateOp) -> FrameResult<Option<f64>> {
    let mut values = Vec::with_capacity(table.row_count());
    for raw in table.column(column)? {
        if raw.trim().is_empty() {
            continue;
        }
        values.push(parse_f64(column, raw)?);
    }

    let n = values.len() as f64;
    let out = match op {
        AggregateOp::Count => Some(n),
        AggregateOp::Sum => Some(values.iter().sum()),
        _ if values.is_empty() => None,
        AggregateOp::Average => Some(values.iter().sum::<f64>() / n),
        AggregateOp::Min => values.iter().copied().reduce(f64::min),
        AggregateOp::Max => values.iter().copied().reduce(f64::max),
        AggregateOp::StdDev => {
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            Some(var.sqrt())
        }
    };
    Ok(out)
}
