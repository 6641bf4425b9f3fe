pub mod catalog;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod result;
pub mod snapshot;
pub mod sql;

pub use catalog::{Catalog, ColumnCoverage, TableCount};
pub use client::AthenaClient;
pub use config::{AthenaConfig, SnapshotConfig};
pub use convert::{apply_column_aliases, result_to_rows};
pub use error::{AthenaError, SnapshotError};
pub use result::{AthenaColumn, AthenaQueryResult, QueryMetadata};
pub use snapshot::{latest_per_key, load_latest_snapshot, QueryRunner, SnapshotExecutor};
pub use sql::DatasetRef;
