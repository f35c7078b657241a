//! In-memory tool implementations for testing.
//!
//! `FakeBuilder` and `FakeLinter` implement the tool traits without
//! spawning anything. Responses are configured up front and every call is
//! captured for later assertion.
//!
//! # Example
//!
//! ```
//! use pkgreview::tools::{BuildProvider, FakeBuilder};
//! use std::path::Path;
//!
//! let builder = FakeBuilder::new("/tmp/results").failing_build("error: no gcc");
//! let output = builder.build(Path::new("foo-1.0-1.src.rpm")).unwrap();
//!
//! assert!(!output.success);
//! assert_eq!(builder.calls(), vec!["build foo-1.0-1.src.rpm".to_string()]);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{BuildProvider, LintReport, LintRunner, ToolOutput};
use crate::error::Result;

/// Build provider with canned results.
#[derive(Debug)]
pub struct FakeBuilder {
    resultdir: PathBuf,
    build: ToolOutput,
    install: ToolOutput,
    prepare: ToolOutput,
    cached: bool,
    artifacts: BTreeMap<String, PathBuf>,
    calls: RefCell<Vec<String>>,
}

impl FakeBuilder {
    /// A builder where every step succeeds and nothing is cached.
    pub fn new(resultdir: impl Into<PathBuf>) -> Self {
        Self {
            resultdir: resultdir.into(),
            build: ToolOutput::ok("build ok"),
            install: ToolOutput::ok("install ok"),
            prepare: ToolOutput::ok(""),
            cached: false,
            artifacts: BTreeMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_build(mut self, log: &str) -> Self {
        self.build = ToolOutput::failed(log);
        self
    }

    pub fn failing_install(mut self, log: &str) -> Self {
        self.install = ToolOutput::failed(log);
        self
    }

    pub fn failing_prepare(mut self, log: &str) -> Self {
        self.prepare = ToolOutput::failed(log);
        self
    }

    pub fn with_cache(mut self) -> Self {
        self.cached = true;
        self
    }

    /// Register a built artifact for a binary package.
    pub fn with_artifact(mut self, package: &str, path: impl Into<PathBuf>) -> Self {
        self.artifacts.insert(package.to_string(), path.into());
        self
    }

    /// Calls made so far, as `"<operation> <argument>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl BuildProvider for FakeBuilder {
    fn resultdir(&self) -> PathBuf {
        self.resultdir.clone()
    }

    fn build(&self, srpm: &Path) -> Result<ToolOutput> {
        self.record(format!("build {}", file_name(srpm)));
        Ok(self.build.clone())
    }

    fn install(&self, artifacts: &[PathBuf]) -> Result<ToolOutput> {
        let names: Vec<String> = artifacts.iter().map(|p| file_name(p)).collect();
        self.record(format!("install {}", names.join(" ")));
        Ok(self.install.clone())
    }

    fn have_cache_for(&self, _name: &str) -> bool {
        self.cached
    }

    fn artifact_path(&self, package: &str) -> Option<PathBuf> {
        self.artifacts.get(package).cloned()
    }

    fn prepare_sources(&self, srpm: &Path) -> Result<ToolOutput> {
        self.record(format!("prepare {}", file_name(srpm)));
        Ok(self.prepare.clone())
    }
}

/// Lint runner returning a fixed report.
#[derive(Debug)]
pub struct FakeLinter {
    report: LintReport,
    calls: RefCell<Vec<String>>,
}

impl FakeLinter {
    /// A linter that reports nothing.
    pub fn clean() -> Self {
        Self::with_output(true, "0 packages and 0 specfiles checked; 0 errors, 0 warnings.")
    }

    pub fn with_output(clean: bool, output: &str) -> Self {
        Self {
            report: LintReport {
                clean,
                output: output.to_string(),
            },
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl LintRunner for FakeLinter {
    fn lint(&self, artifacts: &[PathBuf]) -> Result<LintReport> {
        let names: Vec<String> = artifacts.iter().map(|p| file_name(p)).collect();
        self.calls
            .borrow_mut()
            .push(format!("lint {}", names.join(" ")));
        Ok(self.report.clone())
    }

    fn lint_installed(&self, packages: &[String]) -> Result<LintReport> {
        self.calls
            .borrow_mut()
            .push(format!("lint-installed {}", packages.join(" ")));
        Ok(self.report.clone())
    }
}
