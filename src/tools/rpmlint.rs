//! Lint runner backed by `rpmlint`.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::command::{execute_program, CommandOptions};
use super::{LintReport, LintRunner};
use crate::error::Result;

/// Counts from the final rpmlint summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintSummary {
    pub errors: u32,
    pub warnings: u32,
}

impl LintSummary {
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}

static SUMMARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) packages? and (\d+) specfiles? checked;\s*(\d+) errors?, (\d+) warnings?")
        .unwrap()
});

/// Find the summary line in rpmlint output.
pub fn parse_summary(output: &str) -> Option<LintSummary> {
    let caps = SUMMARY_REGEX.captures_iter(output).last()?;
    Some(LintSummary {
        errors: caps[3].parse().ok()?,
        warnings: caps[4].parse().ok()?,
    })
}

/// Runs `rpmlint`, directly or inside the mock root.
#[derive(Debug, Clone, Default)]
pub struct Rpmlint {
    mock_config: Option<String>,
}

impl Rpmlint {
    pub fn new(mock_config: Option<String>) -> Self {
        Self { mock_config }
    }

    fn mock_args(&self) -> Vec<String> {
        match &self.mock_config {
            Some(config) => vec!["-r".to_string(), config.clone()],
            None => Vec::new(),
        }
    }

    fn report(header: String, output: String) -> LintReport {
        let clean = match parse_summary(&output) {
            Some(summary) => summary.is_clean(),
            None => {
                warn!("Cannot parse rpmlint summary");
                false
            }
        };
        LintReport {
            clean,
            output: format!("{}\n{}", header, output),
        }
    }
}

impl LintRunner for Rpmlint {
    fn lint(&self, paths: &[PathBuf]) -> Result<LintReport> {
        let args: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        let out = execute_program("rpmlint", &args, &CommandOptions::default())?;

        let names: Vec<String> = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect();
        let header = format!("Checking: {}", names.join(&format!("\n{}", " ".repeat(10))));
        Ok(Self::report(header, out.combined()))
    }

    fn lint_installed(&self, packages: &[String]) -> Result<LintReport> {
        let mut install = self.mock_args();
        install.extend(["install".to_string(), "rpmlint".to_string()]);
        let installed = execute_program("mock", &install, &CommandOptions::default())?;
        if !installed.success {
            return Ok(LintReport {
                clean: false,
                output: installed.combined(),
            });
        }

        let mut run = self.mock_args();
        run.extend([
            "--chroot".to_string(),
            format!("rpmlint {}", packages.join(" ")),
        ]);
        let out = execute_program("mock", &run, &CommandOptions::default())?;
        Ok(Self::report(
            format!("Checking installed: {}", packages.join(", ")),
            out.combined(),
        ))
    }
}
