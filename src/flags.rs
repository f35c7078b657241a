//! User-overridable flags declared by checks.
//!
//! Checks (native or script) declare flags while they are registered.
//! Values come from script defaults first and external configuration
//! second; assigning a value to an undeclared flag is an error.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{ReviewError, Result};

/// Value given to a flag activated without an explicit value.
pub const ACTIVATED: &str = "1";

/// A declared flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flag {
    pub name: String,
    pub doc: String,
    /// Where the flag was declared.
    pub defined_in: String,
    /// Unset until a default or override is applied.
    pub value: Option<String>,
}

impl Flag {
    /// Whether the flag carries a value.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value.as_deref().unwrap_or(""))
    }
}

/// Registry of declared flags for one review.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    flags: BTreeMap<String, Flag>,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a flag.
    ///
    /// Redeclaring with the same doc string is a no-op; a different doc
    /// string is a conflict.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
        defined_in: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        let doc = doc.into();
        let defined_in = defined_in.into();

        if let Some(existing) = self.flags.get(&name) {
            if existing.doc == doc {
                debug!("Flag {} already declared by {}", name, existing.defined_in);
                return Ok(());
            }
            return Err(ReviewError::ConflictingFlag {
                name,
                first: existing.defined_in.clone(),
                second: defined_in,
            });
        }

        debug!("Declaring flag {} ({})", name, defined_in);
        self.flags.insert(
            name.clone(),
            Flag {
                name,
                doc,
                defined_in,
                value: None,
            },
        );
        Ok(())
    }

    /// Assign a value to a declared flag.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let flag = self
            .flags
            .get_mut(name)
            .ok_or_else(|| ReviewError::UnknownFlag {
                name: name.to_string(),
            })?;
        flag.value = Some(value.into());
        Ok(())
    }

    /// Apply a `NAME` or `NAME=VALUE` assignment.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = parse_assignment(assignment);
        self.set(name, value)
    }

    /// Apply overrides in order; the first unknown name aborts.
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, value) in overrides {
            self.set(name, value.clone())?;
        }
        Ok(())
    }

    /// Current value, `None` when unset or undeclared.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(|f| f.value.as_deref())
    }

    /// Whether the flag is declared and carries a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.get(name).is_some_and(Flag::is_set)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Iterate flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Split `NAME=VALUE`; a bare `NAME` activates the flag.
pub fn parse_assignment(assignment: &str) -> (&str, &str) {
    match assignment.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => (assignment.trim(), ACTIVATED),
    }
}
