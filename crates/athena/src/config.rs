use serde::{Deserialize, Serialize};

use matchday_core::config::{
    active_profile, profiled_env_opt, profiled_env_or, profiled_env_u32, profiled_env_u64,
};

use crate::sql::DatasetRef;

const DEFAULT_DATABASE: &str = "football_db";
const DEFAULT_TABLE: &str = "live_portfolio_projected";
const DEFAULT_WORKGROUP: &str = "primary";

/// 10 GB in bytes (10 * 1024^3).
const DEFAULT_MAX_SCAN_BYTES: u64 = 10_737_418_240;

const DEFAULT_TIMEOUT_SECONDS: u32 = 300;

// ── SnapshotConfig ───────────────────────────────────────────────

/// Columns driving freshest-row selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Logical entity key (one surviving row per value).
    pub key_column: String,
    /// Ingestion timestamp / batch id; the maximum wins.
    pub timestamp_column: String,
    /// Secondary descending sort for rows sharing the maximum timestamp.
    pub tie_breaker: Option<String>,
    /// When set, rows where this column is NULL never take part.
    pub required_column: Option<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            key_column: "id".into(),
            timestamp_column: "ingested_at".into(),
            tie_breaker: None,
            required_column: None,
        }
    }
}

impl SnapshotConfig {
    pub fn from_env_profiled(profile: &str) -> Self {
        let defaults = Self::default();
        Self {
            key_column: profiled_env_or(profile, "SNAPSHOT_KEY_COLUMN", &defaults.key_column),
            timestamp_column: profiled_env_or(
                profile,
                "SNAPSHOT_TIMESTAMP_COLUMN",
                &defaults.timestamp_column,
            ),
            tie_breaker: profiled_env_opt(profile, "SNAPSHOT_TIE_BREAKER"),
            required_column: profiled_env_opt(profile, "SNAPSHOT_REQUIRED_COLUMN"),
        }
    }
}

// ── AthenaConfig ─────────────────────────────────────────────────

/// Query-service settings. Region and keys come from the credential bundle,
/// not from here.
///
/// When `MATCHDAY_PROFILE=LIVE`, checks `LIVE_ATHENA_DATABASE` before `ATHENA_DATABASE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// Catalog database holding the snapshot tables.
    pub database: String,
    /// Default snapshot table.
    pub table: String,
    /// Athena workgroup.
    pub workgroup: String,
    /// S3 path for query results; `None` uses the workgroup's location.
    pub output_location: Option<String>,
    /// Endpoint override (local emulators, VPC endpoints).
    pub endpoint_url: Option<String>,
    /// Maximum bytes to scan per query (0 = unlimited).
    pub max_scan_bytes: u64,
    /// Query timeout in seconds.
    pub timeout_seconds: u32,
    pub snapshot: SnapshotConfig,
}

impl Default for AthenaConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.into(),
            table: DEFAULT_TABLE.into(),
            workgroup: DEFAULT_WORKGROUP.into(),
            output_location: None,
            endpoint_url: None,
            max_scan_bytes: DEFAULT_MAX_SCAN_BYTES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl AthenaConfig {
    /// Build config from environment variables, profile from `MATCHDAY_PROFILE`.
    pub fn from_env() -> Self {
        Self::from_env_profiled(&active_profile())
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        Self {
            database: profiled_env_or(profile, "ATHENA_DATABASE", DEFAULT_DATABASE),
            table: profiled_env_or(profile, "ATHENA_TABLE", DEFAULT_TABLE),
            workgroup: profiled_env_or(profile, "ATHENA_WORKGROUP", DEFAULT_WORKGROUP),
            output_location: profiled_env_opt(profile, "ATHENA_OUTPUT_LOCATION"),
            endpoint_url: profiled_env_opt(profile, "ATHENA_ENDPOINT_URL"),
            max_scan_bytes: profiled_env_u64(
                profile,
                "ATHENA_MAX_SCAN_BYTES",
                DEFAULT_MAX_SCAN_BYTES,
            ),
            timeout_seconds: profiled_env_u32(
                profile,
                "ATHENA_TIMEOUT_SECONDS",
                DEFAULT_TIMEOUT_SECONDS,
            ),
            snapshot: SnapshotConfig::from_env_profiled(profile),
        }
    }

    /// Scan budget, or `None` when unlimited.
    pub fn scan_limit(&self) -> Option<u64> {
        (self.max_scan_bytes > 0).then_some(self.max_scan_bytes)
    }

    pub fn default_dataset(&self) -> DatasetRef {
        DatasetRef::new(&self.database, &self.table)
    }

    /// Parse a `db.table` or bare `table` identifier against this config's database.
    pub fn dataset(&self, identifier: Option<&str>) -> Result<DatasetRef, crate::AthenaError> {
        match identifier {
            Some(id) => DatasetRef::parse(id, &self.database),
            None => Ok(self.default_dataset()),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
