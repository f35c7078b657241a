//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pkgreview - Package review assistant.
#[derive(Debug, Parser)]
#[command(name = "pkgreview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .pkgreview/config.yml discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Only print the report and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the review and print the report (default if no command specified)
    Review(ReviewArgs),

    /// List registered checks
    List(ListArgs),

    /// List declared flags and their values
    Flags(FlagsArgs),

    /// Print the JSON schema of data check definitions
    Schema,
}

/// Arguments for the `review` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ReviewArgs {
    /// Set a flag: NAME or NAME=VALUE (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    pub define: Vec<String>,

    /// Run only this check and what it needs
    #[arg(short, long, value_name = "CHECK")]
    pub single: Option<String>,

    /// Leave out these checks (comma-separated)
    #[arg(short = 'x', long, value_delimiter = ',', value_name = "CHECKS")]
    pub exclude: Vec<String>,

    /// Source package to build
    #[arg(long, value_name = "FILE")]
    pub srpm: Option<PathBuf>,

    /// Use already built packages from the result dir
    #[arg(long)]
    pub prebuilt: bool,

    /// Re-use an earlier build instead of rebuilding
    #[arg(long = "no-build")]
    pub nobuild: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with status 1 when any check fails
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Only list checks of this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `flags` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FlagsArgs {
    /// Set a flag before listing: NAME or NAME=VALUE (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    pub define: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
