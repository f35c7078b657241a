//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that need checks share
//! [`ProjectLocation::open`] to load settings, the package description and
//! the built-in registries.
//!
//! Exit codes: 0 success, 1 configuration error (or failed checks with
//! `--strict`), 2 missing inputs.

pub mod dispatcher;
pub mod flags;
pub mod list;
pub mod review;
pub mod schema;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{load_settings, ReviewSettings};
use crate::context::ReviewEnv;
use crate::error::{ReviewError, Result};
use crate::package::PackageInfo;
use crate::plugins::builtin_registries;
use crate::scheduler::CheckCollection;
use crate::tools::{MockBuilder, Rpmlint};
use crate::ui::UserInterface;

/// Exit code for configuration errors and strict-mode failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for missing input files.
pub const EXIT_MISSING_INPUT: i32 = 2;

/// Where a command finds its project and configuration.
#[derive(Debug, Clone)]
pub struct ProjectLocation {
    pub project_root: PathBuf,
    pub config: Option<PathBuf>,
}

impl ProjectLocation {
    pub fn new(project_root: &Path, config: Option<&Path>) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
        }
    }

    /// Load the merged settings for this project.
    pub fn settings(&self) -> Result<ReviewSettings> {
        load_settings(&self.project_root, self.config.as_deref())
    }

    /// Build the review environment and collect every registered check.
    pub fn open(&self, settings: ReviewSettings) -> Result<CheckCollection> {
        if !settings.package.is_file() {
            return Err(ReviewError::InputNotFound {
                path: settings.package.clone(),
            });
        }
        if let Some(srpm) = settings.srpm.as_ref().filter(|p| !p.is_file()) {
            return Err(ReviewError::InputNotFound { path: srpm.clone() });
        }

        debug!("Loading package description {}", settings.package.display());
        let package = PackageInfo::load(&settings.package)?;
        let builder = MockBuilder::new(settings.resultdir.clone(), settings.mock_config.clone());
        let linter = Rpmlint::new(settings.mock_config.clone());
        let env = ReviewEnv::new(
            settings,
            Box::new(package),
            Box::new(builder),
            Box::new(linter),
        );

        CheckCollection::collect(env, builtin_registries()?)
    }
}

/// Merge `-D NAME[=VALUE]` assignments into the settings' flag overrides.
pub fn apply_defines(settings: &mut ReviewSettings, defines: &[String]) {
    for assignment in defines {
        let (name, value) = crate::flags::parse_assignment(assignment);
        settings.flags.insert(name.to_string(), value.to_string());
    }
}

/// Turn a setup error into an exit status, or pass it on.
///
/// Missing inputs and configuration errors are reported through the UI;
/// anything else propagates.
pub fn setup_failure(ui: &mut dyn UserInterface, err: ReviewError) -> Result<CommandResult> {
    match err {
        ReviewError::InputNotFound { path } => {
            ui.error(&format!("Input not found: {}", path.display()));
            Ok(CommandResult::failure(EXIT_MISSING_INPUT))
        }
        err if err.is_configuration_error() => {
            ui.error(&err.to_string());
            Ok(CommandResult::failure(EXIT_FAILURE))
        }
        err => Err(err),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn defines_activate_and_assign() {
        let mut settings = ReviewSettings::default();
        apply_defines(&mut settings, &["EPEL5".to_string(), "DIST = fc40".to_string()]);
        assert_eq!(settings.flags.get("EPEL5").map(String::as_str), Some("1"));
        assert_eq!(settings.flags.get("DIST").map(String::as_str), Some("fc40"));
    }

    #[test]
    fn missing_package_is_missing_input() {
        let temp = tempfile::TempDir::new().unwrap();
        let location = ProjectLocation::new(temp.path(), None);
        let err = location.open(location.settings().unwrap()).unwrap_err();
        assert!(matches!(err, ReviewError::InputNotFound { .. }));

        let mut ui = MockUI::new();
        let result = setup_failure(&mut ui, err).unwrap();
        assert_eq!(result.exit_code, EXIT_MISSING_INPUT);
        assert!(ui.has_error("package.yml"));
    }

    #[test]
    fn missing_srpm_is_missing_input() {
        let temp = test_project::project("name: foo\n");
        let location = ProjectLocation::new(temp.path(), None);
        let mut settings = location.settings().unwrap();
        settings.srpm = Some(temp.path().join("foo-1.0-1.src.rpm"));
        let err = location.open(settings).unwrap_err();
        assert!(matches!(err, ReviewError::InputNotFound { path } if path.ends_with("foo-1.0-1.src.rpm")));
    }

    #[test]
    fn unknown_flag_is_configuration_failure() {
        let temp = test_project::project("name: foo\n");
        let location = ProjectLocation::new(temp.path(), None);
        let mut settings = location.settings().unwrap();
        apply_defines(&mut settings, &["NO_SUCH_FLAG".to_string()]);
        let err = location.open(settings).unwrap_err();

        let mut ui = MockUI::new();
        let result = setup_failure(&mut ui, err).unwrap();
        assert_eq!(result.exit_code, EXIT_FAILURE);
        assert!(ui.has_error("NO_SUCH_FLAG"));
    }

    #[test]
    fn open_collects_builtin_checks() {
        let temp = test_project::project("name: foo\nversion: '1.0'\nrelease: '1'\n");
        let location = ProjectLocation::new(temp.path(), None);
        let collection = location.open(location.settings().unwrap()).unwrap();
        assert!(collection.check("CheckBuild").is_some());
        assert!(collection.check("CheckBuildroot").is_some());
        assert!(collection.flags().is_declared("EPEL5"));
    }
}
