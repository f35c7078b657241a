//! Error types for review operations.
//!
//! This module defines [`ReviewError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration errors (duplicate checks, dependency cycles, unknown or
//!   conflicting flags) abort a review before any check executes
//! - Faults raised while a check runs are recovered by the scheduler and
//!   downgraded to a pending result carrying the error text
//! - Use `anyhow::Error` (via `ReviewError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Two checks registered under the same name.
    #[error("Duplicate check name '{name}' (registered by groups '{first}' and '{second}')")]
    DuplicateCheck {
        name: String,
        first: String,
        second: String,
    },

    /// Two registries claim the same group name.
    #[error("Duplicate registry for group '{group}'")]
    DuplicateRegistry { group: String },

    /// A cycle among check `needs`.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// A check needs a name that is never registered.
    #[error("Check '{check}' needs unknown check '{needed}'")]
    UnknownDependency { check: String, needed: String },

    /// A check name that does not exist was requested.
    #[error("Unknown check: {name}")]
    UnknownCheck { name: String },

    /// A value was assigned to a flag nobody declared.
    #[error("Unknown flag: {name}")]
    UnknownFlag { name: String },

    /// A flag was declared twice with different documentation.
    #[error("Flag '{name}' declared by {first} conflicts with declaration by {second}")]
    ConflictingFlag {
        name: String,
        first: String,
        second: String,
    },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// A required input file (package description, source package) is missing.
    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Failed to parse a configuration or package description file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// An external check definition could not be adapted.
    #[error("Bad check definition in {path}: {message}")]
    CheckDefinitionError { path: PathBuf, message: String },

    /// A check gave up in a way that is not a guideline verdict.
    #[error("Check '{check}' aborted: {message}")]
    CheckFault { check: String, message: String },

    /// The build result directory holds leftovers from an earlier build.
    #[error("The result dir is not empty: {path}")]
    ResultdirNotEmpty { path: PathBuf },

    /// External command exited unsuccessfully where success was required.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// External tool could not be started at all.
    #[error("Cannot execute '{command}': {message}")]
    ToolUnavailable { command: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReviewError {
    /// Whether this error must abort the review before execution.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ReviewError::DuplicateCheck { .. }
                | ReviewError::DuplicateRegistry { .. }
                | ReviewError::CircularDependency { .. }
                | ReviewError::UnknownDependency { .. }
                | ReviewError::UnknownCheck { .. }
                | ReviewError::UnknownFlag { .. }
                | ReviewError::ConflictingFlag { .. }
                | ReviewError::ConfigNotFound { .. }
                | ReviewError::ConfigParseError { .. }
                | ReviewError::ConfigValidationError { .. }
                | ReviewError::CheckDefinitionError { .. }
        )
    }
}

/// Result type alias for review operations.
pub type Result<T> = std::result::Result<T, ReviewError>;
