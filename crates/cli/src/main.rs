mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use matchday_athena::{AthenaClient, AthenaConfig, Catalog, SnapshotExecutor};
use matchday_core::{
    active_profile, load_dotenv, load_dotenv_from, profile_label, CredentialResolver,
    CredentialSources,
};

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    if let Some(path) = &args.env_file {
        load_dotenv_from(path)
            .with_context(|| format!("failed to load env file {}", path.display()))?;
    }

    let profile = args
        .profile
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(active_profile);
    info!(profile = profile_label(&profile), "matchday starting");

    let config = AthenaConfig::from_env_profiled(&profile);
    let resolver = CredentialResolver::standard(&CredentialSources::from_env_profiled(&profile));

    let resolved = resolver
        .resolve()
        .await
        .context("failed to resolve AWS credentials")?;

    if let Command::Credentials = args.command {
        output::print_credentials(&resolved);
        return Ok(());
    }

    let client = AthenaClient::new(&resolved.bundle, config.clone()).await;
    let catalog = Catalog::new(&client, &config.database);
    let executor = SnapshotExecutor::new(&client, config.snapshot.clone());

    match args.command {
        Command::Credentials => {}

        Command::Snapshot {
            dataset,
            format,
            limit,
        } => {
            let dataset = config.dataset(dataset.as_deref())?;
            let mut result = executor
                .fetch_latest(&dataset)
                .await
                .with_context(|| format!("failed to load latest snapshot of {dataset}"))?;
            if let Some(n) = limit {
                result = result.head(n);
            }
            output::print_snapshot(
                &dataset,
                &result,
                &config.snapshot.timestamp_column,
                format,
            )?;
        }

        Command::Tables { prefix } => {
            let tables = catalog
                .list_tables(prefix.as_deref())
                .await
                .context("failed to list tables")?;
            let latest = prefix.as_ref().and_then(|_| tables.last().map(String::as_str));
            output::print_tables(&tables, latest);
        }

        Command::Counts { prefix } => {
            let counts = catalog
                .row_counts(prefix.as_deref())
                .await
                .context("failed to count rows")?;
            output::print_counts(&counts);
        }

        Command::Versions { dataset, depth } => {
            let dataset = config.dataset(dataset.as_deref())?;
            let summary = executor
                .versions(&dataset, depth)
                .await
                .with_context(|| format!("failed to compare versions of {dataset}"))?;
            println!("{summary}");
        }

        Command::Coverage { column, dataset } => {
            let dataset = config.dataset(dataset.as_deref())?;
            let coverage = catalog
                .column_coverage(&dataset, &column)
                .await
                .with_context(|| format!("failed to measure coverage of {column}"))?;
            output::print_coverage(&coverage);
        }
    }

    Ok(())
}
