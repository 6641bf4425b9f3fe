//! Integration tests for matchday-athena.
//!
//! These drive the public API end to end with an in-memory query runner.
//! Tests marked with `#[ignore]` need real AWS credentials and must be run
//! explicitly.

mod catalog;
mod credentials;
mod live;
mod snapshot;

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use matchday_athena::{AthenaColumn, AthenaError, AthenaQueryResult, QueryMetadata, QueryRunner};

/// Replays queued responses in order and records every statement.
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<Result<AthenaQueryResult, AthenaError>>>,
    pub statements: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(responses: Vec<Result<AthenaQueryResult, AthenaError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            statements: Mutex::new(Vec::new()),
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryRunner for ScriptedRunner {
    async fn run(&self, sql: &str) -> Result<AthenaQueryResult, AthenaError> {
        self.statements.lock().unwrap().push(sql.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AthenaError::ParseError("no scripted response".into())))
    }
}

pub fn varchar_table(columns: &[&str], rows: &[&[Option<&str>]]) -> AthenaQueryResult {
    AthenaQueryResult {
        columns: columns
            .iter()
            .map(|c| AthenaColumn::new(*c, "varchar"))
            .collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|v| v.map(str::to_string)).collect())
            .collect(),
        metadata: QueryMetadata {
            query_id: "scripted".into(),
            bytes_scanned: 1_048_576,
            execution_time_ms: 1200,
            state: "SUCCEEDED".into(),
            output_location: None,
        },
    }
}
