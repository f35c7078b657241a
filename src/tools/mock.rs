//! Build provider backed by the `mock` chroot builder.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::command::{execute_program, CommandOptions};
use super::{BuildProvider, ToolOutput};
use crate::error::Result;

/// Builds and installs packages with `mock`.
#[derive(Debug, Clone)]
pub struct MockBuilder {
    resultdir: PathBuf,
    config: Option<String>,
}

impl MockBuilder {
    pub fn new(resultdir: impl Into<PathBuf>, config: Option<String>) -> Self {
        Self {
            resultdir: resultdir.into(),
            config,
        }
    }

    fn base_args(&self) -> Vec<String> {
        match &self.config {
            Some(config) => vec!["-r".to_string(), config.clone()],
            None => Vec::new(),
        }
    }

    fn mock(&self, args: Vec<String>) -> Result<ToolOutput> {
        let mut full = self.base_args();
        full.extend(args);
        let output = execute_program("mock", &full, &CommandOptions::default())?;
        Ok(output.into())
    }

    fn rpm_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.resultdir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".rpm"))
            .collect();
        names.sort();
        names
    }
}

/// Package name of an rpm file name (`name-version-release.arch.rpm`).
fn package_name(file_name: &str) -> Option<&str> {
    let mut parts = file_name.rsplitn(3, '-');
    let _release = parts.next()?;
    let _version = parts.next()?;
    parts.next()
}

impl BuildProvider for MockBuilder {
    fn resultdir(&self) -> PathBuf {
        self.resultdir.clone()
    }

    fn build(&self, srpm: &Path) -> Result<ToolOutput> {
        info!("Building {} using mock", srpm.display());
        self.mock(vec![
            "--no-cleanup-after".to_string(),
            format!("--resultdir={}", self.resultdir.display()),
            "--rebuild".to_string(),
            srpm.display().to_string(),
        ])
    }

    fn install(&self, artifacts: &[PathBuf]) -> Result<ToolOutput> {
        info!("Installing {} package(s)", artifacts.len());
        let mut args = vec!["install".to_string()];
        args.extend(artifacts.iter().map(|p| p.display().to_string()));
        self.mock(args)
    }

    fn have_cache_for(&self, name: &str) -> bool {
        let files: Vec<String> = self
            .rpm_files()
            .into_iter()
            .filter(|f| f.starts_with(name))
            .collect();
        let has_srpm = files.iter().any(|f| f.ends_with(".src.rpm"));
        debug!("Cache for {}: {} rpm file(s)", name, files.len());
        has_srpm && files.len() >= 2
    }

    fn artifact_path(&self, package: &str) -> Option<PathBuf> {
        self.rpm_files()
            .into_iter()
            .filter(|f| !f.ends_with(".src.rpm"))
            .find(|f| package_name(f) == Some(package))
            .map(|f| self.resultdir.join(f))
    }

    fn prepare_sources(&self, srpm: &Path) -> Result<ToolOutput> {
        let file_name = srpm
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.mock(vec![
            "--copyin".to_string(),
            srpm.display().to_string(),
            format!("/builddir/{}", file_name),
        ])?;
        self.mock(vec![
            "--chroot".to_string(),
            format!(
                "rpm -i /builddir/{} && rpmbuild -bp --nodeps /builddir/build/SPECS/*.spec",
                file_name
            ),
        ])
    }
}
