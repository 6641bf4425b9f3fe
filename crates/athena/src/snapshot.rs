//! Freshest-snapshot retrieval.
//!
//! The data lake keeps every ingestion batch, so a player appears once per
//! batch. [`SnapshotExecutor::fetch_latest`] asks the engine for rank-1 rows
//! and then re-applies the same policy locally with [`latest_per_key`], so the
//! returned table holds exactly one row per key whatever the runner produced.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use matchday_core::{parse_timestamp, CredentialResolver};

use crate::client::AthenaClient;
use crate::config::{AthenaConfig, SnapshotConfig};
use crate::convert::apply_column_aliases;
use crate::error::{AthenaError, SnapshotError};
use crate::result::AthenaQueryResult;
use crate::sql::{latest_snapshot_sql, snapshot_versions_sql, DatasetRef, RANK_COLUMN};

/// Anything that can execute SQL and return a table.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self, sql: &str) -> Result<AthenaQueryResult, AthenaError>;
}

#[async_trait]
impl<T: QueryRunner + ?Sized> QueryRunner for &T {
    async fn run(&self, sql: &str) -> Result<AthenaQueryResult, AthenaError> {
        (**self).run(sql).await
    }
}

#[async_trait]
impl<T: QueryRunner + ?Sized> QueryRunner for Arc<T> {
    async fn run(&self, sql: &str) -> Result<AthenaQueryResult, AthenaError> {
        (**self).run(sql).await
    }
}

/// Runs the deduplication query for a dataset.
pub struct SnapshotExecutor<R> {
    runner: R,
    snapshot: SnapshotConfig,
}

impl<R: QueryRunner> SnapshotExecutor<R> {
    pub fn new(runner: R, snapshot: SnapshotConfig) -> Self {
        Self { runner, snapshot }
    }

    /// One row per key, newest ingestion only, ordered by key.
    ///
    /// Any failure is fatal: no partial table is returned.
    pub async fn fetch_latest(
        &self,
        dataset: &DatasetRef,
    ) -> Result<AthenaQueryResult, SnapshotError> {
        let sql = latest_snapshot_sql(dataset, &self.snapshot)?;
        info!(
            dataset = %dataset,
            key = %self.snapshot.key_column,
            timestamp = %self.snapshot.timestamp_column,
            "Fetching latest snapshot"
        );

        let raw = self.runner.run(&sql).await.map_err(|e| {
            warn!(dataset = %dataset, error = %e, "Snapshot query failed");
            e
        })?;
        let fetched = raw.row_count();

        let latest = latest_per_key(raw.drop_column(RANK_COLUMN), &self.snapshot)?;
        let latest = apply_column_aliases(latest);

        info!(
            dataset = %dataset,
            query_id = %latest.metadata.query_id,
            fetched,
            rows = latest.row_count(),
            "Loaded latest snapshot"
        );
        Ok(latest)
    }

    /// Per-rank summary of the `depth` newest versions of each key.
    pub async fn versions(
        &self,
        dataset: &DatasetRef,
        depth: u32,
    ) -> Result<AthenaQueryResult, SnapshotError> {
        let sql = snapshot_versions_sql(dataset, &self.snapshot, depth)?;
        debug!(dataset = %dataset, depth, "Comparing snapshot versions");
        Ok(self.runner.run(&sql).await?)
    }
}

/// Resolve credentials, connect and fetch the latest snapshot of `dataset`.
pub async fn load_latest_snapshot(
    resolver: &CredentialResolver,
    config: &AthenaConfig,
    dataset: &DatasetRef,
) -> Result<AthenaQueryResult, SnapshotError> {
    let resolved = resolver.resolve().await?;
    debug!(provider = %resolved.provider, "Using credentials");

    let client = AthenaClient::new(&resolved.bundle, config.clone()).await;
    SnapshotExecutor::new(&client, config.snapshot.clone())
        .fetch_latest(dataset)
        .await
}

/// Keep the freshest row for every key.
///
/// A row replaces the current winner for its key only when its timestamp is
/// strictly greater, or equal with a strictly greater tie-breaker. Without a
/// tie-breaker the first row seen wins a tie. NULL timestamps lose to any
/// value; NULL keys form a single group. Rows missing `required_column` are
/// dropped first. Output is sorted by key (numbers, then timestamps, then
/// text), NULL keys last.
pub fn latest_per_key(
    mut result: AthenaQueryResult,
    snapshot: &SnapshotConfig,
) -> Result<AthenaQueryResult, AthenaError> {
    let key_idx = require_column(&result, &snapshot.key_column)?;
    let ts_idx = require_column(&result, &snapshot.timestamp_column)?;
    let tie_idx = snapshot
        .tie_breaker
        .as_deref()
        .map(|c| require_column(&result, c))
        .transpose()?;
    let required_idx = snapshot
        .required_column
        .as_deref()
        .and_then(|c| result.column_index(c));

    let total = result.rows.len();
    let mut winners: IndexMap<Option<String>, Vec<Option<String>>> = IndexMap::new();

    for row in std::mem::take(&mut result.rows) {
        if let Some(idx) = required_idx {
            if cell(&row, idx).is_none() {
                continue;
            }
        }

        let key = cell(&row, key_idx).map(str::to_string);
        match winners.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                let fresher = match compare_nullable(cell(&row, ts_idx), cell(current, ts_idx)) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => tie_idx.is_some_and(|idx| {
                        compare_nullable(cell(&row, idx), cell(current, idx)) == Ordering::Greater
                    }),
                };
                if fresher {
                    slot.insert(row);
                }
            }
        }
    }

    let mut rows: Vec<(Option<String>, Vec<Option<String>>)> = winners.into_iter().collect();
    rows.sort_by_cached_key(|(key, _)| (key.is_none(), key.as_deref().map(CellKey::parse)));

    result.rows = rows.into_iter().map(|(_, row)| row).collect();
    debug!(
        input = total,
        output = result.rows.len(),
        key = %snapshot.key_column,
        "Selected freshest row per key"
    );
    Ok(result)
}

fn cell(row: &[Option<String>], idx: usize) -> Option<&str> {
    row.get(idx).and_then(|v| v.as_deref())
}

fn require_column(result: &AthenaQueryResult, name: &str) -> Result<usize, AthenaError> {
    result
        .column_index(name)
        .ok_or_else(|| AthenaError::ParseError(format!("result has no column {name:?}")))
}

/// NULL sorts below every value.
fn compare_nullable(a: Option<&str>, b: Option<&str>) -> Ordering {
    a.map(CellKey::parse).cmp(&b.map(CellKey::parse))
}

/// Sort key for a raw cell.
///
/// Numbers sort before timestamps, timestamps before text; within a class the
/// natural order applies. Every cell lands in exactly one class, so the order
/// is total even on columns that mix classes. Non-finite floats are text.
#[derive(Debug, Clone)]
enum CellKey {
    Int(i64),
    Float(f64),
    Time(DateTime<Utc>),
    Text(String),
}

impl CellKey {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return CellKey::Int(n);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                // -0.0 and 0.0 are the same value
                return CellKey::Float(if f == 0.0 { 0.0 } else { f });
            }
        }
        if let Some(ts) = parse_timestamp(raw) {
            return CellKey::Time(ts);
        }
        CellKey::Text(raw.to_string())
    }

    fn class(&self) -> u8 {
        match self {
            CellKey::Int(_) | CellKey::Float(_) => 0,
            CellKey::Time(_) => 1,
            CellKey::Text(_) => 2,
        }
    }
}

/// Exact comparison of an integer with a finite float.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    match (i as f64).total_cmp(&f) {
        // Equal after rounding means `f` is integral and within i128 range.
        Ordering::Equal => (i as i128).cmp(&(f as i128)),
        other => other,
    }
}

impl Ord for CellKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellKey::Int(a), CellKey::Int(b)) => a.cmp(b),
            (CellKey::Float(a), CellKey::Float(b)) => a.total_cmp(b),
            (CellKey::Int(a), CellKey::Float(b)) => cmp_int_float(*a, *b),
            (CellKey::Float(a), CellKey::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (CellKey::Time(a), CellKey::Time(b)) => a.cmp(b),
            (CellKey::Text(a), CellKey::Text(b)) => a.cmp(b),
            _ => self.class().cmp(&other.class()),
        }
    }
}

impl PartialOrd for CellKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CellKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellKey {}
