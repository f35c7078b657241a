//! External build and lint tools.
//!
//! Checks never spawn tools directly; they go through the
//! [`BuildProvider`] and [`LintRunner`] traits so tests can substitute
//! fakes. All calls block until the tool exits.

pub mod command;
mod fake;
mod mock;
mod rpmlint;

pub use command::{CommandOptions, CommandOutput};
pub use fake::{FakeBuilder, FakeLinter};
pub use mock::MockBuilder;
pub use rpmlint::{parse_summary, LintSummary, Rpmlint};

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Outcome of a build or install step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// Raw captured output.
    pub output: String,
}

impl ToolOutput {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

impl From<CommandOutput> for ToolOutput {
    fn from(out: CommandOutput) -> Self {
        Self {
            success: out.success,
            output: out.combined(),
        }
    }
}

/// Result of a lint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintReport {
    /// No errors and no warnings.
    pub clean: bool,
    /// Raw report text.
    pub output: String,
}

/// Builds and installs the package under review.
pub trait BuildProvider {
    /// Directory where build artifacts and logs land.
    fn resultdir(&self) -> PathBuf;

    /// Build binary packages from a source package.
    fn build(&self, srpm: &Path) -> Result<ToolOutput>;

    /// Install built artifacts into the build root.
    fn install(&self, artifacts: &[PathBuf]) -> Result<ToolOutput>;

    /// Whether the result dir holds a usable earlier build of `name`.
    fn have_cache_for(&self, name: &str) -> bool;

    /// Artifact built for one binary package.
    fn artifact_path(&self, package: &str) -> Option<PathBuf>;

    /// Unpack and patch the sources for inspection.
    fn prepare_sources(&self, srpm: &Path) -> Result<ToolOutput>;

    /// Artifacts for all packages that resolve.
    fn artifact_paths(&self, packages: &[String]) -> Vec<PathBuf> {
        packages
            .iter()
            .filter_map(|p| self.artifact_path(p))
            .collect()
    }
}

/// Runs the package linter.
pub trait LintRunner {
    /// Lint package files.
    fn lint(&self, paths: &[PathBuf]) -> Result<LintReport>;

    /// Lint packages installed in the build root.
    fn lint_installed(&self, packages: &[String]) -> Result<LintReport>;
}
