use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Latest-snapshot queries against the football data lake.
///
/// Credentials come from the platform secrets document, the `AWS_*`
/// environment, or `~/.aws/credentials`, in that order.
#[derive(Parser, Debug)]
#[command(name = "matchday", version, about = "Latest-snapshot queries against the football data lake")]
pub struct CliArgs {
    /// Configuration profile; `LIVE` reads `LIVE_ATHENA_DATABASE` before `ATHENA_DATABASE`
    #[arg(long, global = true, env = "MATCHDAY_PROFILE")]
    pub profile: Option<String>,

    /// Extra env file loaded after `.env`
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve credentials and show where they came from
    Credentials,

    /// Freshest row per key
    Snapshot {
        /// `db.table` or bare table (default: ATHENA_DATABASE.ATHENA_TABLE)
        #[arg(long)]
        dataset: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Print at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List tables in the database
    Tables {
        /// Only tables starting with this prefix; also reports the newest batch
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Row count per table
    Counts {
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Compare the newest snapshot versions of every key
    Versions {
        #[arg(long)]
        dataset: Option<String>,

        /// How many versions back to summarise
        #[arg(long, default_value_t = 2)]
        depth: u32,
    },

    /// Share of rows where a column is populated
    Coverage {
        #[arg(long)]
        column: String,

        #[arg(long)]
        dataset: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snapshot_flags() {
        let args = CliArgs::try_parse_from([
            "matchday",
            "snapshot",
            "--dataset",
            "football_db.raw_fpl_live_data_4",
            "--format",
            "json",
            "--limit",
            "20",
            "--profile",
            "live",
        ])
        .unwrap();

        assert_eq!(args.profile.as_deref(), Some("live"));
        match args.command {
            Command::Snapshot {
                dataset,
                format,
                limit,
            } => {
                assert_eq!(dataset.as_deref(), Some("football_db.raw_fpl_live_data_4"));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(limit, Some(20));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn coverage_requires_column() {
        assert!(CliArgs::try_parse_from(["matchday", "coverage"]).is_err());

        let args =
            CliArgs::try_parse_from(["matchday", "coverage", "--column", "assists"]).unwrap();
        assert!(matches!(args.command, Command::Coverage { ref column, dataset: None } if column == "assists"));
    }

    #[test]
    fn versions_default_depth() {
        let args = CliArgs::try_parse_from(["matchday", "versions"]).unwrap();
        assert!(matches!(args.command, Command::Versions { depth: 2, .. }));
    }
}
