//! FILENAME: core/merge-engine/src/engine.rs
//! Merge Engine - Turns rows and rules into a span map.
//!
//! One pass over the rows in display order. Every rule keeps its own
//! group state, so columns never influence each other:
//! - A span override closes the open group, writes the override and
//!   forgets the previous row, so the next row always starts fresh.
//! - A row matching its predecessor (all keys equal, filter passed) is
//!   hidden `(0, 0)` and extends the group.
//! - Any other row closes the open group at its start index with
//!   `(count, 1)` and opens a new one.

use crate::definition::{MergeConfig, MergeRule, Span};
use crate::error::Result;
use crate::record::FieldRecord;
use crate::view::{ColumnSpans, SpanMap};
use crate::{log_debug, log_enter, log_exit};

// ============================================================================
// GROUP STATE
// ============================================================================

/// The open group of one rule while scanning.
struct GroupState<'r, R> {
    /// Rows accumulated in the open group.
    count: usize,
    /// Index where the open group began.
    start: Option<usize>,
    /// Last row compared. None at the start and right after an override.
    previous: Option<&'r R>,
}

impl<'r, R> GroupState<'r, R> {
    fn new() -> Self {
        GroupState {
            count: 0,
            start: None,
            previous: None,
        }
    }

    fn open(&mut self, index: usize) {
        self.start = Some(index);
        self.count = 1;
    }

    fn extend(&mut self) {
        self.count += 1;
    }

    /// The anchor index and span of the open group, if any.
    ///
    /// `Span` stores `u32`, so a run longer than `u32::MAX` rows is
    /// reported as `u32::MAX` rows.
    fn anchor(&self) -> Option<(usize, Span)> {
        let start = self.start.filter(|_| self.count > 0)?;
        let rows = u32::try_from(self.count).unwrap_or(u32::MAX);
        Some((start, Span::rows(rows)))
    }

    /// Writes the anchor span of the open group, if any.
    fn close_into(&self, column: &mut ColumnSpans) {
        if let Some((start, span)) = self.anchor() {
            column.insert(start, span);
        }
    }

    fn reset(&mut self) {
        self.count = 0;
        self.start = None;
        self.previous = None;
    }
}

// ============================================================================
// SPAN CALCULATOR
// ============================================================================

/// Runs the rules of one table over its rows.
pub struct SpanCalculator<'r, 'a, R> {
    rows: &'r [R],
    rules: &'r [MergeRule<'a, R>],
}

impl<'r, 'a, R: FieldRecord> SpanCalculator<'r, 'a, R> {
    pub fn new(rows: &'r [R], rules: &'r [MergeRule<'a, R>]) -> Self {
        SpanCalculator { rows, rules }
    }

    /// Executes the scan and returns the span map.
    pub fn calculate(&self) -> SpanMap {
        let rows: &'r [R] = self.rows;
        let mut map = SpanMap::with_columns(self.rules.iter().map(|r| r.column));
        let mut states: Vec<GroupState<'r, R>> =
            self.rules.iter().map(|_| GroupState::new()).collect();

        for (index, row) in rows.iter().enumerate() {
            for (rule, state) in self.rules.iter().zip(states.iter_mut()) {
                let column = map.column_mut(rule.column);
                Self::scan_row(rule, state, column, index, row);
            }
        }

        // Close whatever is still open after the last row
        for (rule, state) in self.rules.iter().zip(states.iter()) {
            state.close_into(map.column_mut(rule.column));
        }

        map
    }

    fn scan_row(
        rule: &MergeRule<'a, R>,
        state: &mut GroupState<'r, R>,
        column: &mut ColumnSpans,
        index: usize,
        row: &'r R,
    ) {
        if let Some(span) = rule.span_override(row) {
            state.close_into(column);
            column.insert(index, span);
            state.reset();
            return;
        }

        match state.previous {
            None => state.open(index),
            Some(previous) => {
                let is_same = rule.is_same(row, previous);
                let filter_passed = rule.accepts(row);

                if is_same && filter_passed {
                    column.insert(index, Span::HIDDEN);
                    state.extend();
                } else {
                    state.close_into(column);
                    state.open(index);
                }
            }
        }

        state.previous = Some(row);
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Computes the span map of `rows` under `rules`.
///
/// Every column named by a rule is present in the result, even for an
/// empty `rows`. Columns without a rule are absent.
pub fn compute_spans<R: FieldRecord>(rows: &[R], rules: &[MergeRule<'_, R>]) -> SpanMap {
    log_enter!("MERGE", "compute_spans", "rows={} rules={}", rows.len(), rules.len());

    let map = SpanCalculator::new(rows, rules).calculate();

    log_exit!("MERGE", "compute_spans", "columns={} entries={}", map.len(), map.entry_count());
    map
}

/// Validates `config`, compiles its rules and runs them over `rows`.
pub fn compute_spans_from_config<R: FieldRecord>(rows: &[R], config: &MergeConfig) -> Result<SpanMap> {
    config.validate()?;
    let rules: Vec<MergeRule<'_, R>> = config.to_rules();
    log_debug!("MERGE", "compiled {} rules from config", rules.len());
    Ok(compute_spans(rows, &rules))
}
