//! Catalog inspection: which snapshot tables exist, how big they are and how
//! well a column is populated.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AthenaError;
use crate::result::AthenaQueryResult;
use crate::snapshot::QueryRunner;
use crate::sql::{column_coverage_sql, row_count_sql, show_tables_sql, DatasetRef};

/// Row count of one table, or the error that prevented counting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub row_count: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCoverage {
    pub table: String,
    pub column: String,
    pub total_rows: u64,
    pub populated_rows: u64,
}

impl ColumnCoverage {
    /// Fraction of rows where the column is non-NULL; 0.0 for an empty table.
    pub fn ratio(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.populated_rows as f64 / self.total_rows as f64
        }
    }
}

pub struct Catalog<'a, R: ?Sized> {
    runner: &'a R,
    database: String,
}

impl<'a, R: QueryRunner + ?Sized> Catalog<'a, R> {
    pub fn new(runner: &'a R, database: impl Into<String>) -> Self {
        Self {
            runner,
            database: database.into(),
        }
    }

    /// Tables in the database, optionally filtered by name prefix, in batch
    /// order (`raw_2` before `raw_10`).
    pub async fn list_tables(&self, prefix: Option<&str>) -> Result<Vec<String>, AthenaError> {
        let result = self.runner.run(&show_tables_sql(&self.database)?).await?;

        let mut tables: Vec<String> = result
            .rows
            .iter()
            .filter_map(|row| row.first().cloned().flatten())
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .filter(|name| prefix.map_or(true, |p| name.starts_with(p)))
            .collect();
        tables.sort_by(|a, b| batch_order(a, b));

        debug!(database = %self.database, count = tables.len(), "Listed tables");
        Ok(tables)
    }

    /// Newest batch table with the given prefix.
    pub async fn latest_table(&self, prefix: &str) -> Result<Option<String>, AthenaError> {
        Ok(self.list_tables(Some(prefix)).await?.pop())
    }

    /// Count rows table by table. A table that fails to count is reported in
    /// its entry and does not stop the others.
    pub async fn row_counts(&self, prefix: Option<&str>) -> Result<Vec<TableCount>, AthenaError> {
        let tables = self.list_tables(prefix).await?;
        let mut counts = Vec::with_capacity(tables.len());

        for table in tables {
            let dataset = DatasetRef::new(&self.database, &table);
            let counted = match row_count_sql(&dataset) {
                Ok(sql) => self
                    .runner
                    .run(&sql)
                    .await
                    .and_then(|r| first_u64(&r, "row_count")),
                Err(e) => Err(e),
            };

            let entry = match counted {
                Ok(n) => {
                    info!(table = %dataset, row_count = n, "Counted rows");
                    TableCount {
                        table,
                        row_count: Some(n),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(table = %dataset, error = %e, "Row count failed");
                    TableCount {
                        table,
                        row_count: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            counts.push(entry);
        }

        Ok(counts)
    }

    pub async fn column_coverage(
        &self,
        dataset: &DatasetRef,
        column: &str,
    ) -> Result<ColumnCoverage, AthenaError> {
        let result = self.runner.run(&column_coverage_sql(dataset, column)?).await?;

        Ok(ColumnCoverage {
            table: dataset.to_string(),
            column: column.to_string(),
            total_rows: first_u64(&result, "total_rows")?,
            populated_rows: first_u64(&result, "populated_rows")?,
        })
    }
}

fn first_u64(result: &AthenaQueryResult, column: &str) -> Result<u64, AthenaError> {
    let raw = result
        .get_value(0, column)
        .ok_or_else(|| AthenaError::ParseError(format!("missing {column} in result")))?;
    raw.trim()
        .parse()
        .map_err(|_| AthenaError::ParseError(format!("{column} is not a count: {raw:?}")))
}

/// Split `raw_fpl_live_data_12` into `("raw_fpl_live_data_", Some(12))`.
fn split_batch_suffix(name: &str) -> (&str, Option<u64>) {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    (stem, name[stem.len()..].parse().ok())
}

/// Order by stem, then numeric suffix, then full name.
fn batch_order(a: &str, b: &str) -> Ordering {
    let (stem_a, n_a) = split_batch_suffix(a);
    let (stem_b, n_b) = split_batch_suffix(b);
    stem_a
        .cmp(stem_b)
        .then(n_a.cmp(&n_b))
        .then_with(|| a.cmp(b))
}
