//! Configuration loading for reviews.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layering of settings files in [`layers`]
//!
//! # Example
//!
//! ```
//! use pkgreview::config::load_settings;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".pkgreview");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "nobuild: true\nexclude: [CheckRPATH]").unwrap();
//!
//! let settings = load_settings(temp.path(), None).unwrap();
//! assert!(settings.nobuild);
//! assert_eq!(settings.exclude, vec!["CheckRPATH".to_string()]);
//! ```
//!
//! # Configuration File Locations
//!
//! Settings are discovered and merged in this order:
//! 1. User config (`$XDG_CONFIG_HOME/pkgreview/config.yml`)
//! 2. Project config (`.pkgreview/config.yml`)
//! 3. Local overrides (`.pkgreview/config.local.yml`)

pub mod layers;
pub mod loader;
pub mod schema;

pub use layers::SettingsLayers;
pub use loader::{
    find_project_root, load_config_value, load_merged_settings, load_settings, parse_settings,
    ConfigPaths, PROJECT_DIR,
};
pub use schema::ReviewSettings;
