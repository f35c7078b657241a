//! Command-line interface for pkgreview.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FlagsArgs, ListArgs, ReviewArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
