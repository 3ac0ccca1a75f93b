//! FILENAME: core/merge-engine/tests/common/mod.rs
//! Fixtures for merge-engine integration tests.
//!
//! The party table: two sections ("Individual", "FinOrg"), each led by a
//! title row that spans three columns, followed by detail rows grouped by
//! type, group and sub type.

#![allow(dead_code)]

use merge_engine::{FieldValue, MergeRule, Row, Span};

pub const PARTY_TABLE_JSON: &str = r#"[
    { "title": "Individual", "type": "Individual" },
    { "type": "Individual", "subType": "ID", "name": "ID number", "_addBtn": true, "_canAddGroup": true, "group": "1" },
    { "type": "Individual", "subType": "OtherInfo", "name": "Other info", "_addBtn": true, "_canAddGroup": true, "group": "1" },
    { "type": "Individual", "subType": "ID", "name": "ID number", "_addBtn": true, "_delBtn": true, "_canAddGroup": true, "group": "2" },
    { "type": "Individual", "subType": "OtherInfo", "name": "Other info", "_addBtn": true, "_delBtn": true, "_canAddGroup": true, "group": "2" },
    { "title": "Financial institution", "type": "FinOrg" },
    { "type": "FinOrg", "subType": "FinRemitter", "name": "Remitting bank", "_addBtn": true, "group": "1" },
    { "type": "FinOrg", "subType": "FinRemitter", "name": "Remitting bank", "_addBtn": true, "_delBtn": true, "group": "1" },
    { "type": "FinOrg", "subType": "FinReceiver", "name": "Receiving bank", "group": "1" }
]"#;

pub const PARTY_CONFIG_JSON: &str = r#"{
    "rules": [
        {
            "column": 0,
            "keys": ["type"],
            "spanOverride": { "when": { "present": "title" }, "span": [1, 3] }
        },
        {
            "column": 1,
            "keys": ["type", "group"],
            "spanOverride": { "when": { "present": "title" }, "span": [0, 0] },
            "filter": { "truthy": "_canAddGroup" }
        },
        {
            "column": 2,
            "keys": ["type", "subType"],
            "spanOverride": { "when": { "present": "title" }, "span": [0, 0] }
        }
    ]
}"#;

pub const PARTY_ROW_COUNT: usize = 9;

/// Expected spans per column, indexed by row.
pub const EXPECTED_COLUMN_0: [(u32, u32); PARTY_ROW_COUNT] =
    [(1, 3), (4, 1), (0, 0), (0, 0), (0, 0), (1, 3), (3, 1), (0, 0), (0, 0)];
pub const EXPECTED_COLUMN_1: [(u32, u32); PARTY_ROW_COUNT] =
    [(0, 0), (2, 1), (0, 0), (2, 1), (0, 0), (0, 0), (1, 1), (1, 1), (1, 1)];
pub const EXPECTED_COLUMN_2: [(u32, u32); PARTY_ROW_COUNT] =
    [(0, 0), (1, 1), (1, 1), (1, 1), (1, 1), (0, 0), (2, 1), (0, 0), (1, 1)];

fn is_title(row: &Row) -> bool {
    row.get("title").is_some()
}

/// The closure-based equivalent of `PARTY_CONFIG_JSON`.
pub fn party_rules() -> Vec<MergeRule<'static, Row>> {
    vec![
        MergeRule::new(0)
            .keys(["type"])
            .span_with(|row: &Row| is_title(row).then_some(Span::new(1, 3))),
        MergeRule::new(1)
            .keys(["type", "group"])
            .span_with(|row: &Row| is_title(row).then_some(Span::HIDDEN))
            .filter_with(|row: &Row| row.get("_canAddGroup").map_or(false, FieldValue::is_truthy)),
        MergeRule::new(2)
            .keys(["type", "subType"])
            .span_with(|row: &Row| is_title(row).then_some(Span::HIDDEN)),
    ]
}

/// Rows grouped in blocks of `block` equal `g` values.
pub fn blocked_rows(count: usize, block: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            Row::new()
                .with("g", (i / block) as i64)
                .with("parity", ((i / block) % 2) as i64)
        })
        .collect()
}
