//! Command-line interface for acp-checklists.
//!
//! This module provides the CLI structure and the interactive checklist
//! session of the `acpcheck` binary.

mod commands;
pub mod repl;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    CacheCommand, ConfigCommand, FavoriteCommand, OutputFormat, RecapCommand, RunCommand,
    ShowCommand, StatusCommand,
};

/// acpcheck - Interactive aircraft checklists
///
/// Step through the checklists of the club aircraft, keep a favorite, compare
/// the fleet performance and keep the resources available offline.
#[derive(Debug, Parser)]
#[command(name = "acpcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the tabs
    Tabs,

    /// Print a tab, optionally after checking items
    Show(ShowCommand),

    /// Step through checklists interactively
    Run(RunCommand),

    /// Show the fleet performance recap
    Recap(RecapCommand),

    /// Manage the favorite tab
    #[command(subcommand)]
    Favorite(FavoriteCommand),

    /// Manage the offline resource cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Show storage and catalog status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Tabs,
        }
    }

    #[test]
    fn test_cli_debug() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "acpcheck");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_quiet() {
        assert_eq!(cli_with(2, true).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Info);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_tabs() {
        let cli = Cli::try_parse_from(["acpcheck", "tabs"]).unwrap();
        assert!(matches!(cli.command, Command::Tabs));
    }

    #[test]
    fn test_parse_show_with_checks() {
        let cli =
            Cli::try_parse_from(["acpcheck", "show", "GIYA", "-k", "0-0", "--check", "0-1"])
                .unwrap();
        match cli.command {
            Command::Show(cmd) => {
                assert_eq!(cmd.tab, "GIYA");
                assert_eq!(cmd.checks, vec!["0-0", "0-1"]);
                assert_eq!(cmd.format, OutputFormat::Plain);
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_parse_show_json() {
        let cli = Cli::try_parse_from(["acpcheck", "show", "GIYA", "--format", "json"]).unwrap();
        match cli.command {
            Command::Show(cmd) => assert_eq!(cmd.format, OutputFormat::Json),
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_parse_run_without_tab() {
        let cli = Cli::try_parse_from(["acpcheck", "run"]).unwrap();
        match cli.command {
            Command::Run(cmd) => assert!(cmd.tab.is_none()),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_parse_recap_table_conflicts_with_tab() {
        assert!(Cli::try_parse_from(["acpcheck", "recap", "--table"]).is_ok());
        assert!(Cli::try_parse_from(["acpcheck", "recap", "GIYA", "--table"]).is_err());
    }

    #[test]
    fn test_parse_favorite_toggle() {
        let cli = Cli::try_parse_from(["acpcheck", "favorite", "toggle", "HPPL"]).unwrap();
        match cli.command {
            Command::Favorite(FavoriteCommand::Toggle { tab }) => assert_eq!(tab, "HPPL"),
            _ => panic!("Expected Favorite Toggle command"),
        }
    }

    #[test]
    fn test_parse_cache_get() {
        let cli = Cli::try_parse_from([
            "acpcheck",
            "cache",
            "get",
            "index.html",
            "--origin",
            "/srv/www",
        ])
        .unwrap();
        match cli.command {
            Command::Cache(CacheCommand::Get { url, method, origin }) => {
                assert_eq!(url, "index.html");
                assert_eq!(method, "GET");
                assert_eq!(origin, Some(PathBuf::from("/srv/www")));
            }
            _ => panic!("Expected Cache Get command"),
        }
    }

    #[test]
    fn test_parse_status_json() {
        let cli = Cli::try_parse_from(["acpcheck", "status", "--json"]).unwrap();
        match cli.command {
            Command::Status(cmd) => assert!(cmd.json),
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["acpcheck", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: false })
        ));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli =
            Cli::try_parse_from(["acpcheck", "-vv", "--config", "/tmp/acp.toml", "tabs"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/acp.toml")));
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["acpcheck"]).is_err());
    }
}
