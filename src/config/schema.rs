//! Review settings schema.
//!
//! [`ReviewSettings`] maps to the YAML configuration file format and is the
//! single settings object handed to the scheduler and to every check.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings for one review run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Use already built packages from the result dir instead of building.
    #[serde(skip_serializing_if = "is_false")]
    pub prebuilt: bool,

    /// Re-use an earlier build instead of rebuilding.
    #[serde(skip_serializing_if = "is_false")]
    pub nobuild: bool,

    /// Source package to build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srpm: Option<PathBuf>,

    /// Package description file (relative to the project root).
    #[serde(default = "default_package")]
    pub package: PathBuf,

    /// Working directory for script checks (relative to the project root).
    #[serde(default = "default_review_dir")]
    pub review_dir: PathBuf,

    /// Where built artifacts land.
    #[serde(default = "default_resultdir")]
    pub resultdir: PathBuf,

    /// Mock configuration name (`mock -r`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_config: Option<String>,

    /// Directories scanned for script checks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugin_dirs: Vec<PathBuf>,

    /// Directories scanned for data check definitions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_dirs: Vec<PathBuf>,

    /// Flag overrides, applied after script defaults.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, String>,

    /// Check names removed before scheduling.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Run only this check and what it needs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single: Option<String>,

    /// Load the data checks shipped with the binary.
    #[serde(default = "default_true")]
    pub builtin_data_checks: bool,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            prebuilt: false,
            nobuild: false,
            srpm: None,
            package: default_package(),
            review_dir: default_review_dir(),
            resultdir: default_resultdir(),
            mock_config: None,
            plugin_dirs: Vec::new(),
            data_dirs: Vec::new(),
            flags: BTreeMap::new(),
            exclude: Vec::new(),
            single: None,
            builtin_data_checks: true,
        }
    }
}

impl ReviewSettings {
    /// Make relative paths absolute against `root`.
    pub fn resolve_paths(&mut self, root: &std::path::Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        resolve(&mut self.package);
        resolve(&mut self.review_dir);
        resolve(&mut self.resultdir);
        if let Some(srpm) = self.srpm.as_mut() {
            resolve(srpm);
        }
        self.plugin_dirs.iter_mut().for_each(resolve);
        self.data_dirs.iter_mut().for_each(resolve);
    }
}

fn default_package() -> PathBuf {
    PathBuf::from("package.yml")
}

fn default_review_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_resultdir() -> PathBuf {
    PathBuf::from("results")
}

fn default_true() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}
