//! AWS Athena query execution client.
//!
//! Provides [`AthenaClient`] for executing SQL queries against AWS Athena,
//! with exponential-backoff polling, timeout enforcement, scan-limit checks,
//! and paginated result parsing into [`AthenaQueryResult`].

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_athena::config::Region;
use aws_sdk_athena::types::{
    QueryExecution, QueryExecutionContext, QueryExecutionState, ResultConfiguration,
};
use tracing::{debug, error, info, warn};

use matchday_core::CredentialBundle;

use crate::config::AthenaConfig;
use crate::error::{classify_sdk_error, AthenaError};
use crate::result::{AthenaColumn, AthenaQueryResult, QueryMetadata};
use crate::snapshot::QueryRunner;

const INITIAL_DELAY_MS: u64 = 200;
const MAX_DELAY_MS: u64 = 2000;
const BACKOFF_FACTOR: f64 = 1.5;

/// Largest page `GetQueryResults` accepts.
const PAGE_SIZE: i32 = 1000;

/// Name reported by the static credentials provider.
const CREDENTIALS_PROVIDER_NAME: &str = "matchday";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for executing queries against AWS Athena.
///
/// Wraps the AWS SDK Athena client and adds:
/// - Exponential-backoff polling with jitter
/// - Timeout enforcement with automatic cancellation
/// - Scan-limit checking (post-execution)
/// - Paginated result parsing into [`AthenaQueryResult`]
pub struct AthenaClient {
    config: AthenaConfig,
    athena_client: aws_sdk_athena::Client,
}

impl AthenaClient {
    /// Create a client that signs with the given static credentials.
    ///
    /// The region comes from the bundle; nothing is read from the ambient
    /// AWS credential chain.
    pub async fn new(bundle: &CredentialBundle, config: AthenaConfig) -> Self {
        let credentials = Credentials::new(
            &bundle.access_key_id,
            &bundle.secret_access_key,
            bundle.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(bundle.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_cfg = loader.load().await;

        let athena_client = aws_sdk_athena::Client::new(&aws_cfg);

        info!(
            region = %bundle.region,
            database = %config.database,
            workgroup = %config.workgroup,
            "AthenaClient initialised"
        );

        Self {
            config,
            athena_client,
        }
    }

    pub fn config(&self) -> &AthenaConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Execute a SQL query against Athena and return the parsed results.
    ///
    /// This performs the full lifecycle:
    /// 1. Start query execution
    /// 2. Poll until completion (with exponential backoff)
    /// 3. Fetch every result page on success
    pub async fn execute_query(&self, sql: &str) -> Result<AthenaQueryResult, AthenaError> {
        debug!(sql = %sql, "Starting Athena query");

        let mut ctx = QueryExecutionContext::builder();
        if !self.config.database.is_empty() {
            ctx = ctx.database(&self.config.database);
        }

        let start_resp = self
            .athena_client
            .start_query_execution()
            .query_string(sql)
            .query_execution_context(ctx.build())
            .set_result_configuration(
                self.config
                    .output_location
                    .as_ref()
                    .map(|loc| ResultConfiguration::builder().output_location(loc).build()),
            )
            .work_group(&self.config.workgroup)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let query_id = start_resp
            .query_execution_id()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution ID returned".into()))?
            .to_string();

        info!(query_id = %query_id, "Query execution started");

        let query_execution = self.poll_until_complete(&query_id).await?;
        let metadata = Self::extract_metadata(&query_id, &query_execution);

        self.fetch_results(metadata).await
    }

    /// Execute a SQL query and check that bytes scanned does not exceed `max_scan_bytes`.
    ///
    /// Athena has no pre-execution scan estimate, so the check runs after the
    /// query completes and the result is discarded when over budget.
    pub async fn execute_query_with_limit(
        &self,
        sql: &str,
        max_scan_bytes: u64,
    ) -> Result<AthenaQueryResult, AthenaError> {
        let result = self.execute_query(sql).await?;

        if result.metadata.bytes_scanned > max_scan_bytes {
            warn!(
                bytes_scanned = result.metadata.bytes_scanned,
                limit = max_scan_bytes,
                query_id = %result.metadata.query_id,
                "Query exceeded scan limit"
            );
            return Err(AthenaError::ScanLimitExceeded {
                bytes_scanned: result.metadata.bytes_scanned,
                limit: max_scan_bytes,
            });
        }

        Ok(result)
    }

    /// Cancel a running Athena query.
    pub async fn cancel_query(&self, query_id: &str) -> Result<(), AthenaError> {
        info!(query_id = %query_id, "Cancelling query");

        self.athena_client
            .stop_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    async fn query_execution(&self, query_id: &str) -> Result<QueryExecution, AthenaError> {
        let resp = self
            .athena_client
            .get_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        resp.query_execution()
            .cloned()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution in response".into()))
    }

    /// Poll `GetQueryExecution` with exponential backoff until the query
    /// reaches a terminal state or the configured timeout is exceeded.
    async fn poll_until_complete(&self, query_id: &str) -> Result<QueryExecution, AthenaError> {
        let start = Instant::now();
        let timeout = Duration::from_secs(self.config.timeout_seconds as u64);
        let mut delay_ms = INITIAL_DELAY_MS;

        loop {
            let qe = self.query_execution(query_id).await?;
            let status = qe.status();
            let state = status
                .and_then(|s| s.state())
                .cloned()
                .unwrap_or(QueryExecutionState::Queued);

            debug!(
                query_id = %query_id,
                state = ?state,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Polling query status"
            );

            match state {
                QueryExecutionState::Succeeded => return Ok(qe),

                QueryExecutionState::Failed => {
                    let reason = status
                        .and_then(|s| s.state_change_reason())
                        .unwrap_or("unknown")
                        .to_string();
                    let retryable = status
                        .and_then(|s| s.athena_error())
                        .map(|e| e.retryable())
                        .unwrap_or(false);

                    error!(query_id = %query_id, reason = %reason, retryable, "Query failed");
                    return Err(AthenaError::QueryFailed {
                        query_id: query_id.to_string(),
                        reason,
                        retryable,
                    });
                }

                QueryExecutionState::Cancelled => {
                    warn!(query_id = %query_id, "Query was cancelled");
                    return Err(AthenaError::QueryCancelled {
                        query_id: query_id.to_string(),
                    });
                }

                // Queued | Running | unknown future variant
                _ => {}
            }

            if start.elapsed() > timeout {
                warn!(
                    query_id = %query_id,
                    timeout_seconds = self.config.timeout_seconds,
                    "Query timed out, cancelling"
                );
                if let Err(e) = self.cancel_query(query_id).await {
                    warn!(query_id = %query_id, error = %e, "Cancel after timeout failed");
                }
                return Err(AthenaError::QueryTimeout {
                    query_id: query_id.to_string(),
                    seconds: self.config.timeout_seconds,
                });
            }

            tokio::time::sleep(Duration::from_millis(delay_ms + jitter_ms())).await;
            delay_ms = next_delay(delay_ms);
        }
    }

    /// Read every page of `GetQueryResults` into one table.
    async fn fetch_results(
        &self,
        metadata: QueryMetadata,
    ) -> Result<AthenaQueryResult, AthenaError> {
        let mut columns: Vec<AthenaColumn> = Vec::new();
        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let output = self
                .athena_client
                .get_query_results()
                .query_execution_id(&metadata.query_id)
                .max_results(PAGE_SIZE)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(classify_sdk_error)?;

            let result_set = output
                .result_set()
                .ok_or_else(|| AthenaError::ParseError("No ResultSet in response".into()))?;

            if pages == 0 {
                columns = result_set
                    .result_set_metadata()
                    .map(|meta| {
                        meta.column_info()
                            .iter()
                            .map(|ci| AthenaColumn::new(ci.name(), ci.r#type()))
                            .collect()
                    })
                    .unwrap_or_default();
            }

            let mut page: Vec<Vec<Option<String>>> = result_set
                .rows()
                .iter()
                .map(|row| {
                    row.data()
                        .iter()
                        .map(|datum| datum.var_char_value().map(str::to_string))
                        .collect()
                })
                .collect();

            // SELECT results echo the column names as the first row of the
            // first page; DDL results such as SHOW TABLES do not.
            if pages == 0 && page.first().is_some_and(|r| is_header_echo(&columns, r)) {
                page.remove(0);
            }

            rows.append(&mut page);
            pages += 1;

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(
            columns = columns.len(),
            rows = rows.len(),
            pages,
            query_id = %metadata.query_id,
            "Parsed Athena results"
        );

        Ok(AthenaQueryResult {
            columns,
            rows,
            metadata,
        })
    }

    fn extract_metadata(query_id: &str, qe: &QueryExecution) -> QueryMetadata {
        let stats = qe.statistics();

        QueryMetadata {
            query_id: query_id.to_string(),
            bytes_scanned: stats
                .and_then(|s| s.data_scanned_in_bytes())
                .unwrap_or(0)
                .max(0) as u64,
            execution_time_ms: stats
                .and_then(|s| s.engine_execution_time_in_millis())
                .unwrap_or(0)
                .max(0) as u64,
            state: qe
                .status()
                .and_then(|s| s.state())
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            output_location: qe
                .result_configuration()
                .and_then(|rc| rc.output_location())
                .map(|s| s.to_string()),
        }
    }
}

#[async_trait]
impl QueryRunner for AthenaClient {
    /// Runs under the configured scan budget.
    async fn run(&self, sql: &str) -> Result<AthenaQueryResult, AthenaError> {
        match self.config.scan_limit() {
            Some(limit) => self.execute_query_with_limit(sql, limit).await,
            None => self.execute_query(sql).await,
        }
    }
}

/// Jitter in `[0, 100)` ms without pulling in `rand`.
fn jitter_ms() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 100) as u64
}

fn next_delay(delay_ms: u64) -> u64 {
    ((delay_ms as f64 * BACKOFF_FACTOR) as u64).min(MAX_DELAY_MS)
}

/// True when `row` repeats the column names exactly.
fn is_header_echo(columns: &[AthenaColumn], row: &[Option<String>]) -> bool {
    !columns.is_empty()
        && columns.len() == row.len()
        && columns
            .iter()
            .zip(row)
            .all(|(col, cell)| cell.as_deref() == Some(col.name.as_str()))
}

// ---------------------------------------------------------------------------
// Tests: helpers only, no AWS calls
// ---------------------------------------------------------------------------
