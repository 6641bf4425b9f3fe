//! Live tests. Require AWS credentials reachable through the standard chain
//! and a populated `ATHENA_DATABASE` / `ATHENA_TABLE`.

use std::collections::HashSet;

use matchday_athena::*;
use matchday_core::{CredentialResolver, CredentialSources};

#[tokio::test]
#[ignore]
async fn live_select_one() {
    matchday_core::load_dotenv();
    let resolved = CredentialResolver::standard(&CredentialSources::from_env())
        .resolve()
        .await
        .expect("credentials");
    let client = AthenaClient::new(&resolved.bundle, AthenaConfig::from_env()).await;

    let result = client
        .execute_query("SELECT 1 AS test_column")
        .await
        .expect("query");

    assert_eq!(result.column_names(), vec!["test_column"]);
    assert_eq!(result.get_value(0, "test_column"), Some("1"));
    assert_eq!(result.metadata.state, "SUCCEEDED");
}

#[tokio::test]
#[ignore]
async fn live_latest_snapshot_has_unique_keys() {
    matchday_core::load_dotenv();
    let config = AthenaConfig::from_env();
    let resolver = CredentialResolver::standard(&CredentialSources::from_env());

    let latest = load_latest_snapshot(&resolver, &config, &config.default_dataset())
        .await
        .expect("snapshot");

    let key = &config.snapshot.key_column;
    let keys: Vec<&str> = (0..latest.row_count())
        .filter_map(|i| latest.get_value(i, key))
        .collect();
    let unique: HashSet<&str> = keys.iter().copied().collect();
    assert_eq!(unique.len(), keys.len(), "duplicate keys in latest snapshot");
}
