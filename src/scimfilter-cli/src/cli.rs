//! Command-line interface for scimfilter
//!
//! This module defines the clap argument structure and the [`CliConfig`]
//! overrides derived from it.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// scimfilter - parse and check SCIM filter expressions
#[derive(Parser, Debug)]
#[command(name = "scimfilter")]
#[command(author, version, about)]
#[command(
    long_about = "scimfilter - parse and check SCIM filter expressions\n\n\
    Converts filters such as 'userName eq \"bjensen\" and not (title pr)' into\n\
    their JSON statement tree, or reports why a filter is invalid."
)]
#[command(after_help = "EXAMPLES:\n  \
    # Parse a filter into its JSON tree\n  \
    scimfilter parse 'userName eq \"bjensen\" and title pr'\n\n  \
    # Read the filter from stdin\n  \
    echo 'emails[type eq \"work\"]' | scimfilter parse --compact\n\n  \
    # Print the canonical form of a filter\n  \
    scimfilter parse --canonical 'A EQ 1 AND (b pr OR c pr)'\n\n  \
    # Validate a filter\n  \
    scimfilter check 'userName eq'")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file to use
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Deepest group nesting to accept
    #[arg(long, value_name = "N", global = true)]
    pub max_depth: Option<usize>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a filter and print its statement tree
    #[command(after_help = "EXAMPLES:\n  \
        scimfilter parse 'title pr or userType eq \"Intern\"'\n  \
        scimfilter parse --file filter.txt --compact")]
    Parse {
        /// Filter expression (stdin if not specified)
        #[arg(value_name = "FILTER")]
        filter: Option<String>,

        /// File containing the filter expression
        #[arg(short, long, value_name = "FILE", conflicts_with = "filter")]
        file: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check that a filter is valid
    Check {
        /// Filter expression (stdin if not specified)
        #[arg(value_name = "FILTER")]
        filter: Option<String>,

        /// File containing the filter expression
        #[arg(short, long, value_name = "FILE", conflicts_with = "filter")]
        file: Option<PathBuf>,
    },

    /// Print the filter selecting a single resource by id
    Id {
        /// Resource identifier
        id: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Output flags shared by the printing subcommands
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Use compact output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Print the canonical filter text instead of JSON
    #[arg(long)]
    pub canonical: bool,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init {
        /// Path to create config file
        #[arg(default_value = "scimfilter.toml")]
        path: PathBuf,

        /// Force overwrite if file exists
        #[arg(short, long)]
        force: bool,
    },
}

/// Overrides taken from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Count of `-v` flags
    pub verbose: u8,
    /// Explicit `--config` file, merged after the discovered one
    pub config_file: Option<PathBuf>,
    /// Nesting limit from `--max-depth`
    pub max_depth: Option<usize>,
    /// `--compact` was given
    pub compact: bool,
    /// `--canonical` was given
    pub canonical: bool,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        let output = match &cli.command {
            Commands::Parse { output, .. } | Commands::Id { output, .. } => *output,
            Commands::Check { .. } | Commands::Config { .. } => OutputArgs::default(),
        };

        CliConfig {
            verbose: cli.verbose,
            config_file: cli.config.clone(),
            max_depth: cli.max_depth,
            compact: output.compact,
            canonical: output.canonical,
        }
    }
}

/// Parse command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Parse arguments from an iterator (for testing)
pub fn parse_args_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
