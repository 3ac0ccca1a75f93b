//! FILENAME: core/merge-engine/src/definition.rs
//! Merge Definition - How each column decides which rows belong together.
//!
//! Two layers live here:
//! - `MergeRule`: the runtime rule, with closures for span overrides and
//!   filters. This is what the engine consumes.
//! - `RuleDefinition` / `MergeConfig`: the serializable form of rules,
//!   built from declarative predicates so it can be stored as JSON and
//!   compiled into `MergeRule`s on demand.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{MergeError, Result};
use crate::record::FieldRecord;
use crate::value::FieldValue;
use crate::{log_info, log_warn};

/// Identifier of an output column.
pub type ColumnId = u32;

// ============================================================================
// SPAN
// ============================================================================

/// A `(row_span, col_span)` pair. Serialized as `[row_span, col_span]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Span {
    pub row_span: u32,
    pub col_span: u32,
}

impl Span {
    /// A plain, unmerged cell.
    pub const SINGLE: Span = Span { row_span: 1, col_span: 1 };

    /// A cell covered by another cell's span.
    pub const HIDDEN: Span = Span { row_span: 0, col_span: 0 };

    pub const fn new(row_span: u32, col_span: u32) -> Self {
        Span { row_span, col_span }
    }

    /// Anchor of a vertical group of `rows` rows.
    pub const fn rows(rows: u32) -> Self {
        Span { row_span: rows, col_span: 1 }
    }

    pub fn is_hidden(&self) -> bool {
        self.row_span == 0 || self.col_span == 0
    }

    /// Exactly one side is zero. Renderers cannot draw this.
    pub fn is_degenerate(&self) -> bool {
        (self.row_span == 0) != (self.col_span == 0)
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::SINGLE
    }
}

impl From<(u32, u32)> for Span {
    fn from((row_span, col_span): (u32, u32)) -> Self {
        Span { row_span, col_span }
    }
}

impl From<Span> for (u32, u32) {
    fn from(span: Span) -> Self {
        (span.row_span, span.col_span)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row_span, self.col_span)
    }
}

// ============================================================================
// RUNTIME RULE
// ============================================================================

/// Forces a span for a row, bypassing adjacency comparison.
pub type SpanFn<'a, R> = Box<dyn Fn(&R) -> Option<Span> + 'a>;

/// Decides whether a row may join the currently open group.
pub type FilterFn<'a, R> = Box<dyn Fn(&R) -> bool + 'a>;

/// Merge behavior of one output column.
pub struct MergeRule<'a, R> {
    /// The column this rule annotates.
    pub column: ColumnId,

    /// Fields that must all be equal for two adjacent rows to merge.
    /// Empty means no row ever merges with its predecessor.
    pub keys: SmallVec<[String; 4]>,

    /// Explicit span for special rows (e.g. section titles).
    pub get_span: Option<SpanFn<'a, R>>,

    /// When present and false, the row starts a new group even if the keys match.
    pub filter: Option<FilterFn<'a, R>>,
}

impl<'a, R> MergeRule<'a, R> {
    pub fn new(column: ColumnId) -> Self {
        MergeRule {
            column,
            keys: SmallVec::new(),
            get_span: None,
            filter: None,
        }
    }

    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn span_with<F>(mut self, get_span: F) -> Self
    where
        F: Fn(&R) -> Option<Span> + 'a,
    {
        self.get_span = Some(Box::new(get_span));
        self
    }

    pub fn filter_with<F>(mut self, filter: F) -> Self
    where
        F: Fn(&R) -> bool + 'a,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// The override span for `row`, if the rule forces one.
    pub fn span_override(&self, row: &R) -> Option<Span> {
        self.get_span.as_ref().and_then(|f| f(row))
    }

    /// Whether `row` passes the filter. Rules without a filter accept every row.
    pub fn accepts(&self, row: &R) -> bool {
        self.filter.as_ref().map_or(true, |f| f(row))
    }
}

impl<'a, R: FieldRecord> MergeRule<'a, R> {
    /// True iff the rule has keys and every key holds the same value on
    /// both rows. A field missing on both rows counts as equal.
    pub fn is_same(&self, current: &R, previous: &R) -> bool {
        !self.keys.is_empty()
            && self
                .keys
                .iter()
                .all(|key| current.field(key) == previous.field(key))
    }
}

impl<'a, R> fmt::Debug for MergeRule<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeRule")
            .field("column", &self.column)
            .field("keys", &self.keys)
            .field("get_span", &self.get_span.is_some())
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// PREDICATES
// ============================================================================

/// A serializable condition over a row's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldPredicate {
    /// The field exists on the row (any value, including null).
    Present(String),
    /// The field exists and its value is truthy.
    Truthy(String),
    /// The field exists and equals `value`.
    Equals { field: String, value: FieldValue },
    /// The field is missing or differs from `value`.
    NotEquals { field: String, value: FieldValue },
    All(Vec<FieldPredicate>),
    Any(Vec<FieldPredicate>),
    Not(Box<FieldPredicate>),
}

impl FieldPredicate {
    pub fn evaluate<R: FieldRecord + ?Sized>(&self, row: &R) -> bool {
        match self {
            FieldPredicate::Present(field) => row.field(field).is_some(),
            FieldPredicate::Truthy(field) => row.field(field).map_or(false, FieldValue::is_truthy),
            FieldPredicate::Equals { field, value } => row.field(field) == Some(value),
            FieldPredicate::NotEquals { field, value } => row.field(field) != Some(value),
            FieldPredicate::All(preds) => preds.iter().all(|p| p.evaluate(row)),
            FieldPredicate::Any(preds) => preds.iter().any(|p| p.evaluate(row)),
            FieldPredicate::Not(pred) => !pred.evaluate(row),
        }
    }
}

/// Forces `span` on every row matching `when`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanOverride {
    pub when: FieldPredicate,
    pub span: Span,
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// The serializable description of a `MergeRule`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub column: ColumnId,

    #[serde(default)]
    pub keys: SmallVec<[String; 4]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_override: Option<SpanOverride>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FieldPredicate>,
}

impl RuleDefinition {
    pub fn new(column: ColumnId) -> Self {
        RuleDefinition {
            column,
            ..Default::default()
        }
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_span_override(mut self, when: FieldPredicate, span: Span) -> Self {
        self.span_override = Some(SpanOverride { when, span });
        self
    }

    pub fn with_filter(mut self, filter: FieldPredicate) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Compiles the definition into a runtime rule.
    pub fn to_rule<'a, R: FieldRecord + 'a>(&self) -> MergeRule<'a, R> {
        let mut rule = MergeRule::new(self.column).keys(self.keys.iter().cloned());

        if let Some(SpanOverride { when, span }) = self.span_override.clone() {
            rule = rule.span_with(move |row: &R| when.evaluate(row).then_some(span));
        }
        if let Some(filter) = self.filter.clone() {
            rule = rule.filter_with(move |row: &R| filter.evaluate(row));
        }
        rule
    }
}

// ============================================================================
// MERGE CONFIG
// ============================================================================

/// A full set of rules for one table, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConfig {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl MergeConfig {
    pub fn new(rules: Vec<RuleDefinition>) -> Self {
        MergeConfig { rules }
    }

    /// Parses and validates a config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MergeConfig = serde_json::from_str(json)?;
        config.validate()?;
        log_info!("CONFIG", "loaded merge config rules={}", config.rules.len());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rejects configs the engine would render ambiguously: two rules for
    /// one column, or an override span with exactly one zero side.
    pub fn validate(&self) -> Result<()> {
        let mut seen: FxHashSet<ColumnId> = FxHashSet::default();

        for rule in &self.rules {
            if !seen.insert(rule.column) {
                log_warn!("CONFIG", "duplicate rule for column {}", rule.column);
                return Err(MergeError::DuplicateColumn(rule.column));
            }

            if let Some(ref ov) = rule.span_override {
                if ov.span.is_degenerate() {
                    log_warn!("CONFIG", "invalid span {} for column {}", ov.span, rule.column);
                    return Err(MergeError::InvalidSpan {
                        column: rule.column,
                        row_span: ov.span.row_span,
                        col_span: ov.span.col_span,
                    });
                }
            }
        }
        Ok(())
    }

    /// Compiles every definition. Does not validate.
    pub fn to_rules<'a, R: FieldRecord + 'a>(&self) -> Vec<MergeRule<'a, R>> {
        self.rules.iter().map(|def| def.to_rule()).collect()
    }
}
