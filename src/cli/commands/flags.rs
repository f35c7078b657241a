//! Flags command implementation.
//!
//! The `pkgreview flags` command shows every declared flag with its current
//! value after configuration and `-D` overrides.

use crate::cli::args::FlagsArgs;
use crate::error::{ReviewError, Result};
use crate::flags::Flag;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::{apply_defines, setup_failure, ProjectLocation};

/// The flags command implementation.
pub struct FlagsCommand {
    location: ProjectLocation,
    args: FlagsArgs,
}

impl FlagsCommand {
    pub fn new(location: ProjectLocation, args: FlagsArgs) -> Self {
        Self { location, args }
    }
}

impl Command for FlagsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let opened = self.location.settings().and_then(|mut settings| {
            apply_defines(&mut settings, &self.args.define);
            self.location.open(settings)
        });
        let collection = match opened {
            Ok(c) => c,
            Err(e) => return setup_failure(ui, e),
        };

        let flags: Vec<&Flag> = collection.flags().iter().collect();

        if self.args.json {
            let json = serde_json::to_string_pretty(&flags)
                .map_err(|e| ReviewError::Other(e.into()))?;
            ui.report(&json);
            return Ok(CommandResult::success());
        }

        if flags.is_empty() {
            ui.message("No flags declared");
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["Flag", "Value", "Description", "Declared in"]);
        for flag in &flags {
            table.add_row(&[
                flag.name.as_str(),
                flag.value.as_deref().unwrap_or("(unset)"),
                flag.doc.as_str(),
                flag.defined_in.as_str(),
            ]);
        }
        ui.report(&table.render());

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_project::{project, with_config};
    use crate::ui::MockUI;

    fn flags(temp: &tempfile::TempDir, args: FlagsArgs) -> (CommandResult, MockUI) {
        let location = ProjectLocation::new(temp.path(), None);
        let mut ui = MockUI::new();
        let result = FlagsCommand::new(location, args).execute(&mut ui).unwrap();
        (result, ui)
    }

    fn epel5_line(ui: &MockUI) -> String {
        ui.reports()[0]
            .lines()
            .find(|l| l.starts_with("EPEL5"))
            .unwrap()
            .to_string()
    }

    #[test]
    fn epel5_is_listed_unset() {
        let temp = project("name: foo\n");
        let (result, ui) = flags(&temp, FlagsArgs::default());
        assert!(result.success);
        let line = epel5_line(&ui);
        assert!(line.contains("(unset)"));
        assert!(line.contains("Review package for EPEL5"));
    }

    #[test]
    fn define_overrides_config_value() {
        let temp = project("name: foo\n");
        with_config(&temp, "flags:\n  EPEL5: \"0\"\n");
        let (_, ui) = flags(
            &temp,
            FlagsArgs {
                define: vec!["EPEL5=yes".to_string()],
                json: false,
            },
        );
        assert!(epel5_line(&ui).contains("yes"));
    }

    #[test]
    fn undeclared_define_fails() {
        let temp = project("name: foo\n");
        let (result, ui) = flags(
            &temp,
            FlagsArgs {
                define: vec!["EPEL9".to_string()],
                json: false,
            },
        );
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("EPEL9"));
    }

    #[test]
    fn json_lists_values() {
        let temp = project("name: foo\n");
        let (_, ui) = flags(
            &temp,
            FlagsArgs {
                define: vec!["EPEL5".to_string()],
                json: true,
            },
        );
        let value: serde_json::Value = serde_json::from_str(&ui.reports()[0]).unwrap();
        let epel5 = value
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "EPEL5")
            .unwrap();
        assert_eq!(epel5["value"], "1");
    }
}
