//! List command implementation.
//!
//! The `pkgreview list` command lists the registered checks.

use serde::Serialize;

use crate::check::{CheckType, Implementation};
use crate::cli::args::ListArgs;
use crate::error::{ReviewError, Result};
use crate::scheduler::CheckCollection;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::{setup_failure, ProjectLocation};

/// One row of the listing.
#[derive(Debug, Serialize)]
struct CheckListing<'a> {
    name: &'a str,
    group: &'a str,
    #[serde(rename = "type")]
    check_type: CheckType,
    needs: Vec<&'a str>,
    deprecates: &'a [String],
    automatic: bool,
    implementation: Implementation,
    defined_in: &'a str,
}

fn listings<'a>(collection: &'a CheckCollection, group: Option<&str>) -> Vec<CheckListing<'a>> {
    collection
        .checks()
        .map(|check| check.info())
        .filter(|info| group.is_none_or(|g| info.group == g))
        .map(|info| CheckListing {
            name: &info.name,
            group: &info.group,
            check_type: info.check_type,
            needs: collection.needs_of(&info.name).unwrap_or_default(),
            deprecates: &info.deprecates,
            automatic: info.automatic,
            implementation: info.implementation,
            defined_in: &info.defined_in,
        })
        .collect()
}

/// The list command implementation.
pub struct ListCommand {
    location: ProjectLocation,
    args: ListArgs,
}

impl ListCommand {
    pub fn new(location: ProjectLocation, args: ListArgs) -> Self {
        Self { location, args }
    }

    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let collection = match self.location.settings().and_then(|s| self.location.open(s)) {
            Ok(c) => c,
            Err(e) => return setup_failure(ui, e),
        };

        let rows = listings(&collection, self.args.group.as_deref());

        if self.args.json {
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| ReviewError::Other(e.into()))?;
            ui.report(&json);
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["Name", "Group", "Type", "Needs", "Deprecates"]);
        for row in &rows {
            table.add_row(&[
                row.name.to_string(),
                row.group.to_string(),
                row.check_type.to_string(),
                row.needs.join(", "),
                row.deprecates.join(", "),
            ]);
        }
        ui.report(&table.render());
        ui.message(&format!("{} checks", rows.len()));

        Ok(CommandResult::success())
    }
}
