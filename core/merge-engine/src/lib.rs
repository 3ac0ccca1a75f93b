//! FILENAME: core/merge-engine/src/lib.rs
//! Merged-cell grouping for tabular views.
//!
//! This crate computes which cells of a table collapse into one visual
//! cell: for every configured column it walks the rows in display order,
//! groups adjacent rows that share the same key fields, and reports a
//! `(row_span, col_span)` pair for each row. The first row of a group
//! carries the full span, every other row of the group is hidden `(0, 0)`.
//!
//! Layers:
//! - `value` / `record`: What a row IS (field values and record access)
//! - `definition`: Rules and their serializable configuration
//! - `engine`: Group scanning (HOW we calculate)
//! - `view`: The span map and helpers for renderers (WHAT we display)

pub mod logging;

mod error;
pub mod value;
pub mod record;
pub mod definition;
pub mod engine;
pub mod view;


pub use error::{MergeError, Result};
pub use value::FieldValue;
pub use record::{rows_from_json, FieldRecord, Row};
pub use definition::*;
pub use engine::{compute_spans, compute_spans_from_config, SpanCalculator};
pub use view::*;
