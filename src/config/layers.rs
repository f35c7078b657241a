//! Layering of settings files.
//!
//! Each settings file contributes one YAML mapping. Layers are folded into
//! a single mapping, later files winning:
//!
//! - nested mappings such as `flags:` combine key by key
//! - sequences (`exclude:`, `plugin_dirs:`) and scalars replace what was there
//! - `null` removes an inherited key, at any depth

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::config::schema::ReviewSettings;
use crate::error::{ReviewError, Result};

/// Settings files folded in load order.
#[derive(Debug, Default)]
pub struct SettingsLayers {
    merged: Mapping,
    /// Top-level key -> file that last set it.
    origins: BTreeMap<String, PathBuf>,
    sources: Vec<PathBuf>,
}

impl SettingsLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's content over the layers pushed so far.
    ///
    /// An empty file contributes nothing. Anything but a mapping at the
    /// top of a settings file is rejected.
    pub fn push(&mut self, source: &Path, layer: Value) -> Result<()> {
        let map = match layer {
            Value::Null => Mapping::new(),
            Value::Mapping(map) => map,
            _ => {
                return Err(ReviewError::ConfigValidationError {
                    message: format!("{} must contain a mapping of settings", source.display()),
                })
            }
        };

        for (key, value) in map {
            if let Some(name) = key.as_str() {
                if value.is_null() {
                    self.origins.remove(name);
                } else {
                    self.origins.insert(name.to_string(), source.to_path_buf());
                }
            }
            overlay(&mut self.merged, key, value);
        }
        self.sources.push(source.to_path_buf());
        Ok(())
    }

    /// File that supplied a top-level setting.
    pub fn origin(&self, key: &str) -> Option<&Path> {
        self.origins.get(key).map(PathBuf::as_path)
    }

    /// Files pushed so far, in load order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Deserialize the folded mapping.
    ///
    /// A type error is reported against the file that set the offending
    /// key when it can be told, else the last file loaded, else `fallback`.
    pub fn into_settings(self, fallback: &Path) -> Result<ReviewSettings> {
        serde_yaml::from_value(Value::Mapping(self.merged)).map_err(|e| {
            let message = e.to_string();
            let path = self
                .origins
                .iter()
                .find(|(key, _)| message.starts_with(&format!("{}:", key)))
                .map(|(_, path)| path)
                .or_else(|| self.sources.last())
                .cloned()
                .unwrap_or_else(|| fallback.to_path_buf());
            ReviewError::ConfigParseError { path, message }
        })
    }
}

fn overlay(target: &mut Mapping, key: Value, value: Value) {
    match value {
        Value::Null => {
            target.remove(&key);
        }
        Value::Mapping(incoming) => {
            if !matches!(target.get(&key), Some(Value::Mapping(_))) {
                target.insert(key.clone(), Value::Mapping(Mapping::new()));
            }
            if let Some(Value::Mapping(existing)) = target.get_mut(&key) {
                for (k, v) in incoming {
                    overlay(existing, k, v);
                }
            }
        }
        value => {
            target.insert(key, value);
        }
    }
}
