//! Schema command implementation.
//!
//! The `pkgreview schema` command prints the JSON schema of data check
//! definition files.

use crate::error::{ReviewError, Result};
use crate::plugins::data::definition_schema;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand;

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let json = serde_json::to_string_pretty(&definition_schema())
            .map_err(|e| ReviewError::Other(e.into()))?;
        ui.report(&json);
        Ok(CommandResult::success())
    }
}
