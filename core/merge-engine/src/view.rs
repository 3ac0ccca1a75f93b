//! FILENAME: core/merge-engine/src/view.rs
//! Span View - The engine's output and the queries renderers make on it.
//!
//! The span map is keyed by column, then by row index. Renderers either
//! ask cell by cell (`cell_span`, the shape of a table "span method"
//! callback) or take whole rectangles (`merged_regions`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::definition::{ColumnId, Span};
use crate::error::Result;

/// Row index -> span, for one column.
pub type ColumnSpans = BTreeMap<usize, Span>;

// ============================================================================
// SPAN MAP
// ============================================================================

/// Column -> row index -> `(row_span, col_span)`.
///
/// Serializes to `{"<column>": {"<row>": [row_span, col_span]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanMap {
    columns: BTreeMap<ColumnId, ColumnSpans>,
}

impl SpanMap {
    pub fn new() -> Self {
        SpanMap {
            columns: BTreeMap::new(),
        }
    }

    /// A map with an empty entry for each of `columns`.
    pub fn with_columns<I: IntoIterator<Item = ColumnId>>(columns: I) -> Self {
        SpanMap {
            columns: columns.into_iter().map(|c| (c, ColumnSpans::new())).collect(),
        }
    }

    pub fn column_mut(&mut self, column: ColumnId) -> &mut ColumnSpans {
        self.columns.entry(column).or_default()
    }

    pub fn column(&self, column: ColumnId) -> Option<&ColumnSpans> {
        self.columns.get(&column)
    }

    /// Annotated columns, ascending.
    pub fn columns(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &ColumnSpans)> + '_ {
        self.columns.iter().map(|(c, spans)| (*c, spans))
    }

    /// Number of annotated columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total number of written entries across all columns.
    pub fn entry_count(&self) -> usize {
        self.columns.values().map(|c| c.len()).sum()
    }

    /// The span written for `(column, row)`, if any.
    pub fn span_at(&self, column: ColumnId, row: usize) -> Option<Span> {
        self.columns.get(&column).and_then(|c| c.get(&row)).copied()
    }

    /// The span to render at `(row, column)`. Unannotated cells are single cells.
    pub fn cell_span(&self, row: usize, column: ColumnId) -> Span {
        self.span_at(column, row).unwrap_or(Span::SINGLE)
    }

    /// True if the cell is covered by another cell and must not be rendered.
    pub fn is_hidden(&self, row: usize, column: ColumnId) -> bool {
        self.span_at(column, row).map_or(false, |s| s.is_hidden())
    }

    /// The visible anchors of `column`, in row order.
    pub fn runs(&self, column: ColumnId) -> Vec<RowRun> {
        let Some(spans) = self.columns.get(&column) else {
            return Vec::new();
        };

        spans
            .iter()
            .filter(|(_, span)| !span.is_hidden())
            .map(|(row, span)| RowRun {
                start_row: *row,
                row_span: span.row_span,
                col_span: span.col_span,
            })
            .collect()
    }

    /// Every anchor covering more than one cell, as an inclusive rectangle.
    /// Ordered by column, then row. Anchors whose rectangle does not fit in
    /// `u32` coordinates are left out.
    pub fn merged_regions(&self) -> Vec<MergedRegion> {
        let mut regions = Vec::new();

        for (column, spans) in &self.columns {
            for (row, span) in spans {
                if span.is_hidden() || (span.row_span == 1 && span.col_span == 1) {
                    continue;
                }
                if let Some(region) = MergedRegion::from_anchor(*row, *column, *span) {
                    regions.push(region);
                }
            }
        }

        regions
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// RUNS AND REGIONS
// ============================================================================

/// A visible anchor cell within one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRun {
    pub start_row: usize,
    pub row_span: u32,
    pub col_span: u32,
}

impl RowRun {
    /// One past the last row the run covers.
    pub fn end_row(&self) -> usize {
        self.start_row + self.row_span as usize
    }
}

/// A merged cell region, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRegion {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl MergedRegion {
    /// The rectangle drawn by `span` anchored at `(row, column)`.
    /// None for hidden spans or when an edge would pass `u32::MAX`.
    pub fn from_anchor(row: usize, column: ColumnId, span: Span) -> Option<Self> {
        if span.is_hidden() {
            return None;
        }
        let start_row = u32::try_from(row).ok()?;
        Some(MergedRegion {
            start_row,
            start_col: column,
            end_row: start_row.checked_add(span.row_span - 1)?,
            end_col: column.checked_add(span.col_span - 1)?,
        })
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> u32 {
        self.end_col - self.start_col + 1
    }
}
