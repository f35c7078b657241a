//! Package description loaded from YAML.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::PackageMetadata;
use crate::error::{ReviewError, Result};

/// One binary package built from the source package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subpackage {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

/// A package description.
///
/// ```yaml
/// name: libfoo
/// version: "1.2"
/// release: 1.fc40
/// tags:
///   BuildRoot: ["%{_tmppath}/%{name}-root"]
/// build_requires: [gcc]
/// packages:
///   - name: libfoo
///     files: [/usr/lib64/libfoo.so.1]
///   - name: libfoo-devel
///     files: [/usr/include/foo.h, /usr/lib64/libfoo.so]
/// sections:
///   - ["%post", ["/sbin/ldconfig"]]
/// source_files: [src/foo.c]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub release: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub build_requires: Vec<String>,
    /// Binary packages; the first one is the base package.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Subpackage>,
    /// Section body lines keyed by section header.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<(String, Vec<String>)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_files: Vec<String>,
}

impl PackageInfo {
    /// Load a package description from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            ReviewError::ConfigParseError { message, .. } => ReviewError::ConfigParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse a package description from YAML text.
    pub fn parse(content: &str) -> Result<Self> {
        let mut info: PackageInfo =
            serde_yaml::from_str(content).map_err(|e| ReviewError::ConfigParseError {
                path: Default::default(),
                message: e.to_string(),
            })?;
        if info.name.trim().is_empty() {
            return Err(ReviewError::ConfigValidationError {
                message: "package description has no name".to_string(),
            });
        }
        if info.packages.is_empty() {
            info.packages.push(Subpackage {
                name: info.name.clone(),
                ..Default::default()
            });
        }
        Ok(info)
    }

    fn package(&self, name: Option<&str>) -> Option<&Subpackage> {
        match name {
            None => self.packages.first(),
            Some(name) => self.packages.iter().find(|p| p.name == name),
        }
    }
}

impl PackageMetadata for PackageInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn release(&self) -> &str {
        &self.release
    }

    fn tag(&self, tag: &str) -> Vec<String> {
        self.tags
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(tag))
            .flat_map(|(_, values)| values.iter().cloned())
            .collect()
    }

    fn tags(&self) -> BTreeMap<String, Vec<String>> {
        self.tags.clone()
    }

    fn build_requires(&self) -> Vec<String> {
        self.build_requires.clone()
    }

    fn requires(&self, package: Option<&str>) -> Vec<String> {
        self.package(package)
            .map(|p| p.requires.clone())
            .unwrap_or_default()
    }

    fn packages(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }

    fn files(&self, package: &str) -> Vec<String> {
        self.package(Some(package))
            .map(|p| p.files.clone())
            .unwrap_or_default()
    }

    fn section(&self, prefix: &str) -> BTreeMap<String, Vec<String>> {
        self.sections
            .iter()
            .filter(|(header, _)| header.starts_with(prefix))
            .map(|(header, lines)| (header.trim().to_string(), lines.clone()))
            .collect()
    }

    fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|(h, _)| h.clone()).collect()
    }

    fn source_files(&self) -> Vec<String> {
        self.source_files.clone()
    }
}
