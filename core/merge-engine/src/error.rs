//! FILENAME: core/merge-engine/src/error.rs

use thiserror::Error;

use crate::definition::ColumnId;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("Unsupported value for field '{field}': arrays and objects cannot be compared")]
    UnsupportedValue { field: String },

    #[error("Column {0} has more than one merge rule")]
    DuplicateColumn(ColumnId),

    #[error("Invalid span override for column {column}: [{row_span}, {col_span}]")]
    InvalidSpan {
        column: ColumnId,
        row_span: u32,
        col_span: u32,
    },
}

pub type Result<T> = std::result::Result<T, MergeError>;
