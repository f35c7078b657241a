//! Configuration file discovery and loading.
//!
//! This module handles finding and loading configuration files from
//! various locations in the correct priority order.

use crate::config::layers::SettingsLayers;
use crate::config::schema::ReviewSettings;
use crate::error::{ReviewError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory holding project configuration.
pub const PROJECT_DIR: &str = ".pkgreview";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User config (`$XDG_CONFIG_HOME/pkgreview/config.yml`)
/// 2. Project config (`.pkgreview/config.yml`)
/// 3. Local overrides (`.pkgreview/config.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub user_global: Option<PathBuf>,

    pub project: Option<PathBuf>,

    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            user_global: Self::find_user_global(),
            project: existing(project_root.join(PROJECT_DIR).join("config.yml")),
            project_local: existing(project_root.join(PROJECT_DIR).join("config.local.yml")),
        }
    }

    fn find_user_global() -> Option<PathBuf> {
        existing(dirs::config_dir()?.join("pkgreview").join("config.yml"))
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the project root by walking up from `start`.
///
/// Looks for a `.pkgreview` directory first, then `.git`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(PROJECT_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a config file as raw YAML Value (for merging).
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReviewError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ReviewError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| ReviewError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse YAML content into settings.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<ReviewSettings> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ReviewError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
    let mut layers = SettingsLayers::new();
    layers.push(source_path, value)?;
    layers.into_settings(source_path)
}

/// Load and merge all config files for a project.
///
/// A project without any config file gets default settings.
pub fn load_merged_settings(project_root: &Path) -> Result<ReviewSettings> {
    let paths = ConfigPaths::discover(project_root);

    let mut layers = SettingsLayers::new();
    for path in paths.all_existing() {
        debug!("Loading settings from {}", path.display());
        layers.push(path, load_config_value(path)?)?;
    }

    layers.into_settings(&project_root.join(PROJECT_DIR).join("config.yml"))
}

/// Load settings, resolving relative paths against the project root.
///
/// If `config_override` is provided, loads only that file without merging.
pub fn load_settings(project_root: &Path, config_override: Option<&Path>) -> Result<ReviewSettings> {
    let mut settings = match config_override {
        Some(path) => {
            let mut layers = SettingsLayers::new();
            layers.push(path, load_config_value(path)?)?;
            layers.into_settings(path)?
        }
        None => load_merged_settings(project_root)?,
    };
    settings.resolve_paths(project_root);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_with(config: &str, local: Option<&str>) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(PROJECT_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        if let Some(local) = local {
            fs::write(dir.join("config.local.yml"), local).unwrap();
        }
        temp
    }

    #[test]
    fn discover_finds_project_and_local() {
        let temp = project_with("", Some(""));
        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.project.is_some());
        assert!(paths.project_local.is_some());
    }

    #[test]
    fn discover_returns_none_for_missing_configs() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.project.is_none());
        assert!(paths.project_local.is_none());
    }

    #[test]
    fn find_project_root_prefers_nearest_marker() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("nested").join("project");
        fs::create_dir_all(&subdir).unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::create_dir_all(subdir.join(PROJECT_DIR)).unwrap();

        assert_eq!(find_project_root(&subdir), Some(subdir.clone()));
        assert_eq!(
            find_project_root(&temp.path().join("nested")),
            Some(temp.path().to_path_buf())
        );
    }

    #[test]
    fn local_overrides_project() {
        let temp = project_with(
            "nobuild: true\nflags:\n  EPEL5: \"1\"\n  MODE: a\n",
            Some("flags:\n  MODE: b\n"),
        );
        let settings = load_merged_settings(temp.path()).unwrap();
        assert!(settings.nobuild);
        assert_eq!(settings.flags.get("EPEL5").map(String::as_str), Some("1"));
        assert_eq!(settings.flags.get("MODE").map(String::as_str), Some("b"));
    }

    #[test]
    fn missing_config_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = load_settings(temp.path(), None).unwrap();
        assert_eq!(settings.package, temp.path().join("package.yml"));
    }

    #[test]
    fn empty_config_file_is_accepted() {
        let temp = project_with("", None);
        let settings = load_merged_settings(temp.path()).unwrap();
        assert!(!settings.prebuilt);
    }

    #[test]
    fn override_file_skips_discovery() {
        let temp = project_with("nobuild: true\n", None);
        let other = temp.path().join("other.yml");
        fs::write(&other, "prebuilt: true\n").unwrap();

        let settings = load_settings(temp.path(), Some(&other)).unwrap();
        assert!(settings.prebuilt);
        assert!(!settings.nobuild);
    }

    #[test]
    fn missing_override_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_settings(temp.path(), Some(Path::new("/nonexistent/config.yml")));
        assert!(matches!(result, Err(ReviewError::ConfigNotFound { .. })));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let result = parse_settings("nobuild: [", Path::new("test.yml"));
        assert!(matches!(result, Err(ReviewError::ConfigParseError { .. })));
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let result = parse_settings("exclude: 42\n", Path::new("test.yml"));
        assert!(matches!(result, Err(ReviewError::ConfigParseError { .. })));
    }
}
