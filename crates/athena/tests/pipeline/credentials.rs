use std::fs;

use matchday_athena::*;
use matchday_core::{CredentialError, CredentialResolver, SharedCredentialsFileProvider};

#[tokio::test]
async fn missing_credentials_stop_before_any_query() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = CredentialResolver::new(vec![Box::new(SharedCredentialsFileProvider::new(
        Some(dir.path().join("credentials")),
        Some(dir.path().join("config")),
        "default".to_string(),
    ))]);

    let err = load_latest_snapshot(
        &resolver,
        &AthenaConfig::default(),
        &DatasetRef::new("football_db", "live_portfolio_projected"),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        SnapshotError::Credentials(CredentialError::Missing { .. })
    ));
}

#[tokio::test]
async fn incomplete_credentials_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let credentials = dir.path().join("credentials");
    fs::write(&credentials, "[default]\naws_access_key_id = AKIDEXAMPLE\n").unwrap();

    let resolver = CredentialResolver::new(vec![Box::new(SharedCredentialsFileProvider::new(
        Some(credentials),
        Some(dir.path().join("config")),
        "default".to_string(),
    ))]);

    let err = load_latest_snapshot(
        &resolver,
        &AthenaConfig::default(),
        &DatasetRef::new("football_db", "live_portfolio_projected"),
    )
    .await
    .unwrap_err();

    match err {
        SnapshotError::Credentials(CredentialError::Incomplete { missing, .. }) => {
            assert!(missing.contains(&"secret_access_key"));
            assert!(missing.contains(&"region"));
        }
        other => panic!("expected Incomplete, got {other:?}"),
    }
}
