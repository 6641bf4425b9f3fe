//! SQL builders for the handful of queries the dashboard issues.
//!
//! Every identifier goes through [`quote_ident`] (double quotes, Trino DML)
//! or [`quote_ddl_ident`] (backticks, Hive DDL) so table and column names
//! taken from configuration cannot break out of their position.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SnapshotConfig;
use crate::error::AthenaError;

/// Helper column added by the ranking CTE and stripped from results.
pub const RANK_COLUMN: &str = "snapshot_rank";

/// A catalog table: `database.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetRef {
    pub database: String,
    pub table: String,
}

impl DatasetRef {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }

    /// Parse `db.table`, or a bare `table` in `default_database`.
    pub fn parse(identifier: &str, default_database: &str) -> Result<Self, AthenaError> {
        let identifier = identifier.trim();
        let (database, table) = match identifier.split_once('.') {
            Some((db, table)) => (db.trim(), table.trim()),
            None => (default_database, identifier),
        };
        validate_ident(database)?;
        validate_ident(table)?;
        Ok(Self::new(database, table))
    }

    /// `"database"."table"`
    pub fn qualified(&self) -> Result<String, AthenaError> {
        Ok(format!(
            "{}.{}",
            quote_ident(&self.database)?,
            quote_ident(&self.table)?
        ))
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

fn validate_ident(name: &str) -> Result<(), AthenaError> {
    if name.trim().is_empty() || name.chars().any(char::is_control) {
        return Err(AthenaError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Double-quote an identifier for DML, doubling embedded quotes.
pub fn quote_ident(name: &str) -> Result<String, AthenaError> {
    validate_ident(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Backtick-quote an identifier for DDL statements (`SHOW TABLES IN`).
pub fn quote_ddl_ident(name: &str) -> Result<String, AthenaError> {
    validate_ident(name)?;
    if name.contains('`') {
        return Err(AthenaError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{name}`"))
}

/// `ranked` CTE numbering each key's rows newest-first.
fn ranked_cte(
    dataset: &DatasetRef,
    snapshot: &SnapshotConfig,
    filter_required: bool,
) -> Result<String, AthenaError> {
    let key = quote_ident(&snapshot.key_column)?;
    let ts = quote_ident(&snapshot.timestamp_column)?;

    let mut order = format!("{ts} DESC");
    if let Some(tie) = &snapshot.tie_breaker {
        order.push_str(&format!(", {} DESC", quote_ident(tie)?));
    }

    let filter = match (&snapshot.required_column, filter_required) {
        (Some(col), true) => format!("\n    WHERE {} IS NOT NULL", quote_ident(col)?),
        _ => String::new(),
    };

    Ok(format!(
        "WITH ranked AS (\n    \
         SELECT *, ROW_NUMBER() OVER (PARTITION BY {key} ORDER BY {order}) AS {RANK_COLUMN}\n    \
         FROM {table}{filter}\n)",
        table = dataset.qualified()?,
    ))
}

/// Freshest row per key, ordered by key so repeated runs are identical.
pub fn latest_snapshot_sql(
    dataset: &DatasetRef,
    snapshot: &SnapshotConfig,
) -> Result<String, AthenaError> {
    Ok(format!(
        "{cte}\nSELECT * FROM ranked WHERE {RANK_COLUMN} = 1 ORDER BY {key}",
        cte = ranked_cte(dataset, snapshot, true)?,
        key = quote_ident(&snapshot.key_column)?,
    ))
}

/// Per-rank summary of the `depth` most recent versions of every key.
///
/// Rank 1 is the live snapshot, rank 2 the one it superseded, and so on.
pub fn snapshot_versions_sql(
    dataset: &DatasetRef,
    snapshot: &SnapshotConfig,
    depth: u32,
) -> Result<String, AthenaError> {
    let ts = quote_ident(&snapshot.timestamp_column)?;
    let populated = match &snapshot.required_column {
        Some(col) => format!(", count({}) AS populated_rows", quote_ident(col)?),
        None => String::new(),
    };

    Ok(format!(
        "{cte}\nSELECT {RANK_COLUMN}, count(*) AS total_rows{populated}, max({ts}) AS latest_ingestion\n\
         FROM ranked\nWHERE {RANK_COLUMN} <= {depth}\nGROUP BY {RANK_COLUMN}\nORDER BY {RANK_COLUMN}",
        cte = ranked_cte(dataset, snapshot, false)?,
        depth = depth.max(1),
    ))
}

pub fn row_count_sql(dataset: &DatasetRef) -> Result<String, AthenaError> {
    Ok(format!(
        "SELECT count(*) AS row_count FROM {}",
        dataset.qualified()?
    ))
}

/// Total rows versus rows where `column` is non-NULL.
pub fn column_coverage_sql(dataset: &DatasetRef, column: &str) -> Result<String, AthenaError> {
    Ok(format!(
        "SELECT count(*) AS total_rows, count({col}) AS populated_rows FROM {table}",
        col = quote_ident(column)?,
        table = dataset.qualified()?,
    ))
}

pub fn show_tables_sql(database: &str) -> Result<String, AthenaError> {
    Ok(format!("SHOW TABLES IN {}", quote_ddl_ident(database)?))
}
