use matchday_athena::*;
use matchday_core::FieldValue;

use crate::{varchar_table, ScriptedRunner};

fn player_snapshot() -> SnapshotConfig {
    SnapshotConfig {
        key_column: "player".into(),
        timestamp_column: "ts".into(),
        ..SnapshotConfig::default()
    }
}

/// Three ingestion rows for two players, the way a runner without ranking
/// support would return them.
fn three_rows() -> AthenaQueryResult {
    varchar_table(
        &["player", "ts", "points"],
        &[
            &[Some("P1"), Some("1"), Some("2")],
            &[Some("P1"), Some("2"), Some("3")],
            &[Some("P2"), Some("1"), Some("0")],
        ],
    )
}

#[tokio::test]
async fn freshest_row_per_player() {
    let runner = ScriptedRunner::new(vec![Ok(three_rows())]);
    let executor = SnapshotExecutor::new(&runner, player_snapshot());

    let latest = executor
        .fetch_latest(&DatasetRef::new("football_db", "raw_fpl_live_data_3"))
        .await
        .unwrap();

    assert_eq!(latest.row_count(), 2);
    assert_eq!(latest.get_value(0, "player"), Some("P1"));
    assert_eq!(latest.get_value(0, "ts"), Some("2"));
    assert_eq!(latest.get_value(0, "points"), Some("3"));
    assert_eq!(latest.get_value(1, "player"), Some("P2"));
    assert_eq!(latest.get_value(1, "points"), Some("0"));
}

#[tokio::test]
async fn one_row_per_key_and_it_is_the_newest() {
    let raw = varchar_table(
        &["id", "ingested_at", "total_points", "snapshot_rank"],
        &[
            &[Some("3"), Some("2025-08-17 09:00:00"), Some("12"), Some("1")],
            &[Some("1"), Some("2025-08-16 09:00:00"), Some("4"), Some("2")],
            &[Some("3"), Some("2025-08-16 09:00:00"), Some("8"), Some("2")],
            &[Some("1"), Some("2025-08-17 09:00:00"), Some("6"), Some("1")],
            &[Some("2"), Some("2025-08-15 09:00:00"), Some("1"), Some("1")],
        ],
    );
    let runner = ScriptedRunner::new(vec![Ok(raw.clone())]);
    let executor = SnapshotExecutor::new(&runner, SnapshotConfig::default());

    let latest = executor
        .fetch_latest(&DatasetRef::new("football_db", "live_portfolio_projected"))
        .await
        .unwrap();

    let ids: Vec<&str> = (0..latest.row_count())
        .filter_map(|i| latest.get_value(i, "id"))
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert!(latest.column_index("snapshot_rank").is_none());

    for i in 0..latest.row_count() {
        let id = latest.get_value(i, "id").unwrap();
        let newest = (0..raw.row_count())
            .filter(|&r| raw.get_value(r, "id") == Some(id))
            .filter_map(|r| raw.get_value(r, "ingested_at"))
            .max()
            .unwrap();
        assert_eq!(latest.get_value(i, "ingested_at"), Some(newest));
    }
}

#[tokio::test]
async fn missing_table_returns_no_partial_result() {
    let runner = ScriptedRunner::new(vec![Err(AthenaError::QueryFailed {
        query_id: "q-404".into(),
        reason: "TABLE_NOT_FOUND: line 4:10: Table 'awsdatacatalog.football_db.nope' does not exist"
            .into(),
        retryable: false,
    })]);
    let executor = SnapshotExecutor::new(&runner, SnapshotConfig::default());

    let outcome = executor
        .fetch_latest(&DatasetRef::new("football_db", "nope"))
        .await;

    match outcome {
        Err(SnapshotError::QueryExecution(AthenaError::QueryFailed { reason, .. })) => {
            assert!(reason.contains("TABLE_NOT_FOUND"));
        }
        other => panic!("expected QueryExecution, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_is_service_unavailable() {
    let runner = ScriptedRunner::new(vec![Err(AthenaError::QueryTimeout {
        query_id: "q-slow".into(),
        seconds: 300,
    })]);
    let executor = SnapshotExecutor::new(&runner, SnapshotConfig::default());

    let err = executor
        .fetch_latest(&DatasetRef::new("football_db", "players"))
        .await
        .unwrap_err();
    assert!(matches!(err, SnapshotError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn unchanged_data_gives_identical_tables() {
    let runner = ScriptedRunner::new(vec![Ok(three_rows()), Ok(three_rows())]);
    let executor = SnapshotExecutor::new(&runner, player_snapshot());
    let dataset = DatasetRef::new("football_db", "raw_fpl_live_data_3");

    let first = executor.fetch_latest(&dataset).await.unwrap();
    let second = executor.fetch_latest(&dataset).await.unwrap();

    assert_eq!(first, second);
    let statements = runner.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0], statements[1]);
}

#[tokio::test]
async fn rows_convert_with_aliases_and_zero_fill() {
    let mut raw = varchar_table(
        &["id", "name", "ingested_at", "assists"],
        &[
            &[Some("7"), Some("Saka"), Some("2025-08-17 09:00:00"), Some("4")],
            &[Some("9"), Some("Havertz"), Some("2025-08-17 09:00:00"), None],
        ],
    );
    raw.columns[0].data_type = "bigint".into();
    raw.columns[3].data_type = "integer".into();

    let runner = ScriptedRunner::new(vec![Ok(raw)]);
    let executor = SnapshotExecutor::new(&runner, SnapshotConfig::default());
    let latest = executor
        .fetch_latest(&DatasetRef::new("football_db", "live_portfolio_projected"))
        .await
        .unwrap();

    let rows = result_to_rows(&latest);
    assert_eq!(rows[0].text("web_name"), Some("Saka"));
    assert_eq!(rows[0].get("id"), Some(&FieldValue::Integer(7)));
    assert_eq!(rows[1].int_or_zero("assists"), 0);

    let updated = matchday_core::last_updated(&rows, "ingested_at").unwrap();
    assert_eq!(updated.to_rfc3339(), "2025-08-17T09:00:00+00:00");
}
