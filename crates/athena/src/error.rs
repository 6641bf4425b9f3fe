use aws_sdk_athena::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use matchday_core::CredentialError;

/// SDK error codes that signal a transient service-side condition.
const TRANSIENT_ERROR_CODES: &[&str] = &[
    "InternalServerException",
    "TooManyRequestsException",
    "ThrottlingException",
    "ServiceUnavailableException",
];

/// Errors that can occur during Athena operations.
#[derive(Debug, thiserror::Error)]
pub enum AthenaError {
    /// The query execution failed on the Athena side.
    #[error("Query {query_id} failed: {reason}")]
    QueryFailed {
        query_id: String,
        reason: String,
        /// Athena flagged the failure as retryable (system-side).
        retryable: bool,
    },

    /// The query was cancelled (either by the user or by Athena).
    #[error("Query {query_id} was cancelled")]
    QueryCancelled { query_id: String },

    /// The query exceeded the configured timeout.
    #[error("Query {query_id} timed out after {seconds}s")]
    QueryTimeout { query_id: String, seconds: u32 },

    /// The query scanned more bytes than the configured limit.
    #[error("Scan limit exceeded: {bytes_scanned} bytes scanned, limit is {limit} bytes")]
    ScanLimitExceeded { bytes_scanned: u64, limit: u64 },

    /// Transport failure, throttling or an internal service error.
    #[error("Athena unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other AWS SDK error (stringified).
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// Failed to parse Athena result data.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A database, table or column name that cannot be embedded in SQL.
    #[error("Invalid identifier {0:?}")]
    InvalidIdentifier(String),
}

impl AthenaError {
    /// Transient failures the caller may retry later; everything else is a
    /// problem with the query itself.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            AthenaError::ServiceUnavailable(_)
                | AthenaError::QueryTimeout { .. }
                | AthenaError::QueryFailed { retryable: true, .. }
        )
    }
}

/// Map an SDK error onto [`AthenaError`], separating transient conditions.
pub(crate) fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> AthenaError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let transport = matches!(
        err,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_)
    );
    let transient_code = err
        .code()
        .map(|code| TRANSIENT_ERROR_CODES.contains(&code))
        .unwrap_or(false);
    let message = DisplayErrorContext(&err).to_string();

    if transport || transient_code {
        AthenaError::ServiceUnavailable(message)
    } else {
        AthenaError::AwsSdk(message)
    }
}

/// The failure taxonomy surfaced to callers of a snapshot fetch. Every
/// variant is fatal to the current attempt.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// Malformed SQL, permissions, missing catalog table, bad result shape.
    #[error("query execution failed: {0}")]
    QueryExecution(AthenaError),

    /// Transient failure of the managed engine or its transport.
    #[error("query service unavailable: {0}")]
    ServiceUnavailable(AthenaError),
}

impl From<AthenaError> for SnapshotError {
    fn from(err: AthenaError) -> Self {
        if err.is_service_unavailable() {
            SnapshotError::ServiceUnavailable(err)
        } else {
            SnapshotError::QueryExecution(err)
        }
    }
}
