//! In-memory table transformations.
//!
//! Every transformation returns a new [`crate::types::Table`]; inputs are never modified, so a
//! failed call leaves the caller's tables exactly as they were.
//!
//! - [`filter()`] and friends: row selection by predicate, membership, date order or threshold
//! - [`merge()`] / [`inner_merge()`]: key-based left-outer / inner merges
//! - [`concat()`]: row concatenation of tables with identical headers
//! - [`aggregate()`]: numeric aggregates (count/sum/average/min/max/stddev)
//!
//! ## Example: merge → filter → aggregate
//!
//! ```rust
//! use csv_frames::processing::{aggregate, filter_including, merge, AggregateOp};
//! use csv_frames::types::Table;
//!
//! let mut orders = Table::new(["customer", "amount"]).unwrap();
//! orders.add_row(["1", "10"]).unwrap();
//! orders.add_row(["2", "25"]).unwrap();
//! orders.add_row(["1", "5"]).unwrap();
//!
//! let mut customers = Table::new(["customer", "region"]).unwrap();
//! customers.add_row(["1", "east"]).unwrap();
//! customers.add_row(["2", "west"]).unwrap();
//!
//! let merged = merge(&orders, &customers, "customer", &["region"]).unwrap();
//! let east = filter_including(&merged, "region", &["east"]).unwrap();
//! let total = aggregate(&east, "amount", AggregateOp::Sum).unwrap();
//! assert_eq!(total, Some(15.0));
//! ```

pub mod filter;
pub mod merge;
pub mod reduce;

pub use filter::{
    filter, filter_after, filter_at_least, filter_at_most, filter_before, filter_between,
    filter_excluding, filter_greater_than, filter_including, filter_less_than, try_filter,
};
pub use merge::{build_index, concat, inner_merge, merge};
pub use reduce::{aggregate, AggregateOp};
