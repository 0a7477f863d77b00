// Command-line definition and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{self, Session};
use crate::error::{CliError, CliResult};
use crate::settings::CliSettings;

/// dashrev - revision history for dashboards
#[derive(Parser, Debug)]
#[command(name = "dashrev")]
#[command(bin_name = "dashrev")]
#[command(about = "List, compare and restore saved versions of a dashboard")]
#[command(version)]
#[command(author = "Dashrev Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Dashboard id
    #[arg(short, long, global = true)]
    pub dashboard: Option<i64>,

    /// Current version of the dashboard (default: newest saved version)
    #[arg(long, global = true, value_name = "VERSION")]
    pub current_version: Option<u32>,

    /// Config file (default: <config dir>/dashrev/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the revision log
    Log {
        /// Revisions per page
        #[arg(short, long)]
        limit: Option<usize>,

        /// Keep loading pages until the initial save
        #[arg(short, long)]
        all: bool,
    },

    /// Compare two versions
    Diff {
        /// One side of the comparison
        a: u32,

        /// Other side of the comparison
        b: u32,

        /// Diff view: basic, html, json or a custom server view
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Restore an earlier version as a new version
    Restore {
        /// Version to restore
        version: u32,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Routes a parsed command line to its handler
pub struct CommandRouter;

impl CommandRouter {
    /// Connect to the configured server and run the command
    pub async fn route(cli: Cli, mut settings: CliSettings) -> CliResult<()> {
        let dashboard = cli
            .dashboard
            .ok_or_else(|| CliError::invalid_argument("--dashboard <ID> is required"))?;
        if dashboard <= 0 {
            return Err(CliError::invalid_argument("dashboard id must be positive"));
        }

        if let Commands::Log {
            limit: Some(limit), ..
        } = &cli.command
        {
            settings.history.page_size = *limit;
            settings.validate()?;
        }

        let session = Session::connect(&settings, dashboard, cli.current_version).await?;
        match cli.command {
            Commands::Log { all, .. } => commands::log::run(&session, all).await,
            Commands::Diff { a, b, format } => {
                commands::diff::run(&session, a, b, format.as_deref()).await
            }
            Commands::Restore { version, yes } => {
                commands::restore::run(&session, version, yes).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diff_with_format() {
        let cli = Cli::parse_from(["dashrev", "-d", "1", "diff", "4", "6", "--format", "html"]);
        assert_eq!(cli.dashboard, Some(1));
        match cli.command {
            Commands::Diff { a, b, format } => {
                assert_eq!((a, b), (4, 6));
                assert_eq!(format.as_deref(), Some("html"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_restore_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["dashrev", "restore", "4", "--yes", "--dashboard", "2"]);
        assert_eq!(cli.dashboard, Some(2));
        assert!(matches!(
            cli.command,
            Commands::Restore {
                version: 4,
                yes: true
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_dashboard_is_rejected() {
        let cli = Cli::parse_from(["dashrev", "log"]);
        let err = CommandRouter::route(cli, CliSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }
}
