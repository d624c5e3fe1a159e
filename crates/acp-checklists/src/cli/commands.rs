//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Tab to show (aircraft registration without `F-`, or a view)
    pub tab: String,

    /// Toggle these items first, in order (e.g. `0-1`)
    #[arg(short = 'k', long = "check", value_name = "KEY")]
    pub checks: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Run command arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Tab to open instead of the favorite or default tab
    pub tab: Option<String>,
}

/// Recap command arguments.
#[derive(Debug, Args)]
pub struct RecapCommand {
    /// Only this aircraft
    pub tab: Option<String>,

    /// Append the passenger briefing card
    #[arg(short, long)]
    pub briefing: bool,

    /// Show the whole fleet as one table
    #[arg(short, long, conflicts_with = "tab")]
    pub table: bool,
}

/// Favorite tab commands.
#[derive(Debug, Subcommand)]
pub enum FavoriteCommand {
    /// Show the favorite tab and the selectable tabs
    Show,

    /// Select a favorite, or clear it if it already is
    Toggle {
        /// Tab to toggle
        tab: String,
    },

    /// Clear the favorite tab
    Clear,
}

/// Offline cache commands.
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show stored cache generations
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Fetch and store every precached resource
    Install {
        /// Directory to fetch resources from
        #[arg(short, long, value_name = "DIR")]
        origin: Option<PathBuf>,
    },

    /// Fetch one resource through the cache
    Get {
        /// Resource path, e.g. `index.html`
        url: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Directory to fetch resources from
        #[arg(short, long, value_name = "DIR")]
        origin: Option<PathBuf>,
    },

    /// Delete every cache generation but the current one
    Activate,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_output_format_value_enum() {
        let variants = OutputFormat::value_variants();
        assert_eq!(variants.len(), 2);
        assert!(variants.contains(&OutputFormat::Json));
    }
}
