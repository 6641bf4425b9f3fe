use indexmap::IndexMap;
use tracing::debug;

use matchday_core::{FieldValue, SnapshotRow};

use crate::result::AthenaQueryResult;

/// Column renames applied to every snapshot so downstream consumers see one
/// naming scheme regardless of which batch table was read.
pub const COLUMN_ALIASES: &[(&str, &str)] = &[("name", "web_name")];

/// Rename aliased columns. A rename is skipped when the target already exists.
pub fn apply_column_aliases(mut result: AthenaQueryResult) -> AthenaQueryResult {
    for (from, to) in COLUMN_ALIASES {
        if result.rename_column(from, to) {
            debug!(from = %from, to = %to, "Aliased column");
        }
    }
    result
}

/// Convert a query result into typed rows, one per result row.
///
/// # Type Mapping
///
/// - `bigint`, `int`, `integer`, `smallint`, `tinyint` → `Integer`
/// - `double`, `float`, `decimal(p,s)`, `real` → `Float`
/// - `boolean` → `Boolean`
/// - everything else → `Text`
///
/// Values that fail to parse as their declared type are kept as `Text`.
/// NULL cells become [`FieldValue::Null`] so every row carries every column.
pub fn result_to_rows(result: &AthenaQueryResult) -> Vec<SnapshotRow> {
    result
        .rows
        .iter()
        .map(|row| {
            let fields: IndexMap<String, FieldValue> = result
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let value = match row.get(i) {
                        Some(Some(raw)) => parse_field_value(raw, &col.data_type),
                        _ => FieldValue::Null,
                    };
                    (col.name.clone(), value)
                })
                .collect();
            SnapshotRow::new(fields)
        })
        .collect()
}

/// Parse a string value into a `FieldValue` based on Athena data type.
pub fn parse_field_value(value: &str, data_type: &str) -> FieldValue {
    let normalized = data_type.to_lowercase();
    // decimal(10,2) -> decimal
    let base = normalized
        .split('(')
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "bigint" | "int" | "integer" | "smallint" | "tinyint" => value
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .unwrap_or_else(|_| FieldValue::Text(value.to_string())),
        "double" | "float" | "decimal" | "real" => value
            .trim()
            .parse::<f64>()
            .map(FieldValue::Float)
            .unwrap_or_else(|_| FieldValue::Text(value.to_string())),
        "boolean" => match value.trim().to_lowercase().as_str() {
            "true" | "1" => FieldValue::Boolean(true),
            "false" | "0" => FieldValue::Boolean(false),
            _ => FieldValue::Text(value.to_string()),
        },
        _ => FieldValue::Text(value.to_string()),
    }
}
