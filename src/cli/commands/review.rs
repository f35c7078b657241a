//! Review command implementation.
//!
//! The `pkgreview review` command runs the checks and prints the report.

use chrono::Utc;
use tracing::info;

use crate::cli::args::ReviewArgs;
use crate::config::ReviewSettings;
use crate::error::Result;
use crate::report::{render_json, render_text, Report};
use crate::ui::{format_duration, CheckProgress, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::{apply_defines, setup_failure, ProjectLocation, EXIT_FAILURE};

/// The review command implementation.
pub struct ReviewCommand {
    location: ProjectLocation,
    args: ReviewArgs,
}

impl ReviewCommand {
    pub fn new(location: ProjectLocation, args: ReviewArgs) -> Self {
        Self { location, args }
    }

    pub fn args(&self) -> &ReviewArgs {
        &self.args
    }

    /// Command-line options on top of the merged configuration.
    fn apply_args(&self, settings: &mut ReviewSettings) {
        settings.prebuilt |= self.args.prebuilt;
        settings.nobuild |= self.args.nobuild;
        if let Some(srpm) = &self.args.srpm {
            settings.srpm = Some(self.location.project_root.join(srpm));
        }
        if self.args.single.is_some() {
            settings.single = self.args.single.clone();
        }
        settings.exclude.extend(self.args.exclude.iter().cloned());
        apply_defines(settings, &self.args.define);
    }
}

impl Command for ReviewCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut settings = match self.location.settings() {
            Ok(s) => s,
            Err(e) => return setup_failure(ui, e),
        };
        self.apply_args(&mut settings);

        let mut collection = match self.location.open(settings) {
            Ok(c) => c,
            Err(e) => return setup_failure(ui, e),
        };

        ui.show_header(&format!("Reviewing {}", collection.env().package.nvr()));
        ui.message(&format!("Collected {} checks", collection.len()));

        let show_progress = ui.output_mode().shows_progress() && ui.is_interactive();
        let mut progress = CheckProgress::new(show_progress);
        let outcome = match collection.settings().single.clone() {
            Some(name) => {
                info!("Running {} and the checks it needs", name);
                collection.run_single_observed(&name, &mut progress)
            }
            None => collection.run_observed(&mut progress),
        };
        let elapsed = progress.finish();
        let summary = match outcome {
            Ok(summary) => summary,
            Err(e) => return setup_failure(ui, e),
        };

        let report = Report::from_collection(&collection, Utc::now());
        let rendered = if self.args.json {
            render_json(&report)?
        } else {
            render_text(&report)?
        };
        ui.report(&rendered);

        ui.success(&format!(
            "{} passed, {} failed, {} pending, {} not applicable ({})",
            summary.passed,
            summary.failed,
            summary.pending,
            summary.not_applicable,
            format_duration(elapsed)
        ));

        if self.args.strict && summary.has_failures() {
            ui.warning(&format!("{} check(s) failed", summary.failed));
            return Ok(CommandResult::failure(EXIT_FAILURE));
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_project::{project, with_config};
    use crate::ui::MockUI;

    fn review(temp: &tempfile::TempDir, args: ReviewArgs) -> (CommandResult, MockUI) {
        let location = ProjectLocation::new(temp.path(), None);
        let mut ui = MockUI::new();
        let result = ReviewCommand::new(location, args).execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn args_override_settings() {
        let temp = project("name: foo\n");
        let location = ProjectLocation::new(temp.path(), None);
        let cmd = ReviewCommand::new(
            location,
            ReviewArgs {
                define: vec!["EPEL5".to_string()],
                exclude: vec!["CheckRPATH".to_string()],
                srpm: Some("foo-1.0-1.src.rpm".into()),
                nobuild: true,
                ..Default::default()
            },
        );
        let mut settings = ReviewSettings {
            exclude: vec!["CheckSoFiles".to_string()],
            ..Default::default()
        };
        cmd.apply_args(&mut settings);
        assert!(settings.nobuild);
        assert!(!settings.prebuilt);
        assert_eq!(settings.exclude, vec!["CheckSoFiles", "CheckRPATH"]);
        assert_eq!(settings.flags.get("EPEL5").map(String::as_str), Some("1"));
        assert_eq!(settings.srpm, Some(temp.path().join("foo-1.0-1.src.rpm")));
    }

    #[test]
    fn missing_package_exits_with_missing_input() {
        let temp = tempfile::TempDir::new().unwrap();
        let (result, ui) = review(&temp, ReviewArgs::default());
        assert_eq!(result.exit_code, 2);
        assert!(ui.reports().is_empty());
    }

    #[test]
    fn unknown_single_check_is_configuration_error() {
        let temp = project("name: foo\n");
        let (result, ui) = review(
            &temp,
            ReviewArgs {
                single: Some("CheckNothing".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("CheckNothing"));
    }

    #[test]
    fn invalid_config_is_configuration_error() {
        let temp = project("name: foo\n");
        with_config(&temp, "flags: [not, a, mapping]\n");
        let (result, _) = review(&temp, ReviewArgs::default());
        assert_eq!(result.exit_code, 1);
    }
}
