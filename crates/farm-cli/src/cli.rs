//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use farm_entity::AssetId;
use farm_log::QueryCriteria;

/// Record and query farm logs.
#[derive(Parser, Debug, Clone)]
#[command(name = "farmlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Entity store file.
    #[arg(short, long, env = "FARMLOG_STORE", default_value = "farm.json")]
    pub store: PathBuf,

    /// Log type configuration file. Core log types are used when omitted.
    #[arg(short, long, env = "FARMLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Asset commands.
    Asset {
        /// Asset subcommand to execute.
        #[command(subcommand)]
        command: AssetCommands,
    },

    /// Log commands.
    Log {
        /// Log subcommand to execute.
        #[command(subcommand)]
        command: LogCommands,
    },
}

/// Asset subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AssetCommands {
    /// Create an asset.
    Create {
        /// Asset type.
        #[arg(short = 't', long = "type")]
        asset_type: String,

        /// Asset name.
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List logs referencing an asset, most recent first.
    Logs {
        /// Asset ID.
        id: u64,

        /// Only logs of this type.
        #[arg(short = 't', long = "type")]
        log_type: Option<String>,
    },

    /// Show the most recent log referencing an asset.
    FirstLog {
        /// Asset ID.
        id: u64,
    },
}

/// Log subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum LogCommands {
    /// Create a log. Status defaults per log type.
    Create(CreateLogArgs),

    /// Query logs, most recent first.
    Query(QueryArgs),

    /// Show one log.
    Show {
        /// Log ID.
        id: u64,

        /// Render notes in their processed form instead of raw input.
        #[arg(long)]
        processed: bool,
    },

    /// Change the status of a log.
    SetStatus {
        /// Log ID.
        id: u64,

        /// New status.
        status: String,
    },
}

/// Arguments for creating a log.
#[derive(Args, Debug, Clone)]
pub struct CreateLogArgs {
    /// Log type.
    #[arg(short = 't', long = "type")]
    pub log_type: String,

    /// Log name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Timestamp in epoch seconds. Defaults to now.
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Explicit status. Overrides the type default.
    #[arg(long)]
    pub status: Option<String>,

    /// Referenced asset IDs.
    #[arg(short, long = "asset")]
    pub assets: Vec<u64>,

    /// Notes, stored as plain text.
    #[arg(long)]
    pub notes: Option<String>,
}

/// Arguments for querying logs.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Only logs of this type.
    #[arg(short = 't', long = "type")]
    pub log_type: Option<String>,

    /// Only logs at or before this epoch-seconds timestamp.
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Only logs with this status.
    #[arg(long)]
    pub status: Option<String>,

    /// Only logs referencing this asset.
    #[arg(short, long)]
    pub asset: Option<u64>,

    /// Maximum number of results.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

impl From<&QueryArgs> for QueryCriteria {
    fn from(args: &QueryArgs) -> Self {
        Self {
            log_type: args.log_type.clone(),
            timestamp: args.timestamp,
            status: args.status.clone(),
            asset: args.asset.map(AssetId),
            limit: args.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags() {
        let cli = Cli::parse_from([
            "farmlog", "--store", "/tmp/f.json", "-f", "json", "log", "query",
        ]);
        assert_eq!(cli.store, PathBuf::from("/tmp/f.json"));
        assert_eq!(cli.format, Format::Json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_log_create() {
        let cli = Cli::parse_from([
            "farmlog", "log", "create", "--type", "harvest", "--asset", "1", "--asset", "2",
            "--timestamp", "100",
        ]);
        let args = match cli.command {
            Commands::Log {
                command: LogCommands::Create(args),
            } => Some(args),
            _ => None,
        };
        let args = args.expect("log create command");
        assert_eq!(args.log_type, "harvest");
        assert_eq!(args.assets, vec![1, 2]);
        assert_eq!(args.timestamp, Some(100));
        assert!(args.status.is_none());
    }

    #[test]
    fn query_args_become_criteria() {
        let cli = Cli::parse_from([
            "farmlog", "log", "query", "-t", "foo", "--timestamp", "5", "--status", "done", "-a",
            "3", "-l", "2",
        ]);
        let criteria = match &cli.command {
            Commands::Log {
                command: LogCommands::Query(args),
            } => Some(QueryCriteria::from(args)),
            _ => None,
        };
        assert_eq!(
            criteria,
            Some(
                QueryCriteria::new()
                    .with_type("foo")
                    .with_timestamp(5)
                    .with_status("done")
                    .with_asset(AssetId(3))
                    .with_limit(2)
            )
        );
    }

    #[test]
    fn parses_asset_first_log() {
        let cli = Cli::parse_from(["farmlog", "asset", "first-log", "7"]);
        assert!(matches!(
            cli.command,
            Commands::Asset {
                command: AssetCommands::FirstLog { id: 7 }
            }
        ));
    }

    #[test]
    fn empty_query_args_are_empty_criteria() {
        assert!(QueryCriteria::from(&QueryArgs::default()).is_empty());
    }
}
