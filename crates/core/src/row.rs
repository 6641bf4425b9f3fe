use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Typed field value. Query results arrive as strings; the column type decides the variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    /// Extract as string, returning None for non-text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view; text is parsed leniently, anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Boolean(_) | FieldValue::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Float(f) if f.is_finite() => Some(*f as i64),
            FieldValue::Text(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
            }
            _ => None,
        }
    }
}

/// One deduplicated record, columns kept in result-set order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SnapshotRow {
    pub fields: IndexMap<String, FieldValue>,
}

impl SnapshotRow {
    pub fn new(fields: IndexMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_str)
    }

    /// Stat column as an integer; NULL, missing and unparseable values read as 0.
    pub fn int_or_zero(&self, column: &str) -> i64 {
        self.get(column).and_then(FieldValue::as_i64).unwrap_or(0)
    }

    /// Stat column as a float; NULL, missing and unparseable values read as 0.0.
    pub fn float_or_zero(&self, column: &str) -> f64 {
        self.get(column).and_then(FieldValue::as_f64).unwrap_or(0.0)
    }

    pub fn timestamp(&self, column: &str) -> Option<DateTime<Utc>> {
        self.text(column).and_then(parse_timestamp)
    }
}

/// Newest parseable ingestion timestamp across `rows`.
pub fn last_updated(rows: &[SnapshotRow], column: &str) -> Option<DateTime<Utc>> {
    rows.iter().filter_map(|r| r.timestamp(column)).max()
}

/// Parse a timestamp string into a `DateTime<Utc>`.
///
/// Tries, in order:
/// 1. RFC3339: `"2025-06-14T10:30:00Z"`
/// 2. Space-separated, optional fraction: `"2025-06-14 10:30:00.123"`
/// 3. Just date: `"2025-06-14"` (assumes midnight UTC)
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // %.f also accepts no fractional part.
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }

    if let Ok(nd) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(nd.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}
