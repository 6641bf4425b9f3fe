use anyhow::Result;
use serde_json::json;

use matchday_athena::{result_to_rows, AthenaQueryResult, ColumnCoverage, DatasetRef, TableCount};
use matchday_core::{last_updated, ResolvedCredentials};

use crate::cli::OutputFormat;

pub fn print_credentials(resolved: &ResolvedCredentials) {
    println!("source:     {}", resolved.provider);
    println!("access key: {}", resolved.bundle.masked_access_key());
    println!("region:     {}", resolved.bundle.region);
    if resolved.bundle.session_token.is_some() {
        println!("session:    temporary");
    }
}

pub fn print_snapshot(
    dataset: &DatasetRef,
    result: &AthenaQueryResult,
    timestamp_column: &str,
    format: OutputFormat,
) -> Result<()> {
    let rows = result_to_rows(result);
    let updated = last_updated(&rows, timestamp_column);

    match format {
        OutputFormat::Table => {
            println!("{result}");
            match updated {
                Some(ts) => println!("Last updated: {}", ts.format("%Y-%m-%d %H:%M UTC")),
                None => println!("Last updated: unknown"),
            }
        }
        OutputFormat::Json => {
            let doc = json!({
                "dataset": dataset.to_string(),
                "query_id": result.metadata.query_id,
                "bytes_scanned": result.metadata.bytes_scanned,
                "last_updated": updated,
                "rows": rows,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

pub fn print_tables(tables: &[String], latest: Option<&str>) {
    for table in tables {
        println!("{table}");
    }
    println!("\n{} tables", tables.len());
    if let Some(latest) = latest {
        println!("latest batch: {latest}");
    }
}

pub fn print_counts(counts: &[TableCount]) {
    let width = counts.iter().map(|c| c.table.len()).max().unwrap_or(5).max(5);
    println!("{:<width$}  rows", "table");
    for count in counts {
        match (&count.row_count, &count.error) {
            (Some(n), _) => println!("{:<width$}  {n}", count.table),
            (None, Some(e)) => println!("{:<width$}  error: {e}", count.table),
            (None, None) => println!("{:<width$}  -", count.table),
        }
    }
}

pub fn print_coverage(coverage: &ColumnCoverage) {
    println!(
        "{}.{}: {}/{} rows populated ({:.1}%)",
        coverage.table,
        coverage.column,
        coverage.populated_rows,
        coverage.total_rows,
        coverage.ratio() * 100.0
    );
}
