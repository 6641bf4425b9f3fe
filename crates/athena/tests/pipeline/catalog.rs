use matchday_athena::*;

use crate::{varchar_table, ScriptedRunner};

#[tokio::test]
async fn latest_batch_table_then_snapshot() {
    let tables = varchar_table(
        &["tab_name"],
        &[
            &[Some("raw_fpl_live_data_9")],
            &[Some("raw_fpl_live_data_11")],
            &[Some("live_portfolio_projected")],
        ],
    );
    let runner = ScriptedRunner::new(vec![Ok(tables)]);
    let catalog = Catalog::new(&runner, "football_db");

    let latest = catalog.latest_table("raw_fpl_live_data_").await.unwrap();
    assert_eq!(latest.as_deref(), Some("raw_fpl_live_data_11"));
    assert_eq!(runner.statements(), vec!["SHOW TABLES IN `football_db`"]);
}

#[tokio::test]
async fn counts_continue_past_failures() {
    let runner = ScriptedRunner::new(vec![
        Ok(varchar_table(
            &["tab_name"],
            &[&[Some("raw_a_1")], &[Some("raw_a_2")]],
        )),
        Err(AthenaError::AwsSdk("AccessDeniedException".into())),
        Ok(varchar_table(&["row_count"], &[&[Some("612")]])),
    ]);
    let catalog = Catalog::new(&runner, "football_db");

    let counts = catalog.row_counts(None).await.unwrap();

    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].table, "raw_a_1");
    assert!(counts[0].error.as_deref().unwrap().contains("AccessDenied"));
    assert_eq!(counts[1].row_count, Some(612));
    assert_eq!(
        runner.statements()[2],
        "SELECT count(*) AS row_count FROM \"football_db\".\"raw_a_2\""
    );
}

#[tokio::test]
async fn coverage_rejects_non_numeric_counts() {
    let runner = ScriptedRunner::new(vec![Ok(varchar_table(
        &["total_rows", "populated_rows"],
        &[&[Some("600"), Some("lots")]],
    ))]);
    let catalog = Catalog::new(&runner, "football_db");

    let err = catalog
        .column_coverage(&DatasetRef::new("football_db", "players"), "assists")
        .await
        .unwrap_err();
    assert!(matches!(err, AthenaError::ParseError(_)));
}
