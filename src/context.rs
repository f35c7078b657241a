//! The explicit review context.
//!
//! [`ReviewEnv`] bundles the settings and external collaborators of one
//! review. [`ReviewContext`] adds the scheduler's view of the run (flags,
//! registry gates, outcomes so far) and is handed to every check.

use std::collections::HashMap;

use crate::check::Outcome;
use crate::config::ReviewSettings;
use crate::flags::Flags;
use crate::package::PackageMetadata;
use crate::tools::{BuildProvider, LintRunner};

/// Settings and collaborators for one review run.
pub struct ReviewEnv {
    pub settings: ReviewSettings,
    pub package: Box<dyn PackageMetadata>,
    pub builder: Box<dyn BuildProvider>,
    pub linter: Box<dyn LintRunner>,
}

impl ReviewEnv {
    pub fn new(
        settings: ReviewSettings,
        package: Box<dyn PackageMetadata>,
        builder: Box<dyn BuildProvider>,
        linter: Box<dyn LintRunner>,
    ) -> Self {
        Self {
            settings,
            package,
            builder,
            linter,
        }
    }
}

/// What a running check can see.
#[derive(Clone, Copy)]
pub struct ReviewContext<'a> {
    env: &'a ReviewEnv,
    flags: &'a Flags,
    gates: &'a HashMap<String, bool>,
    outcomes: &'a HashMap<String, Outcome>,
}

impl<'a> ReviewContext<'a> {
    pub fn new(
        env: &'a ReviewEnv,
        flags: &'a Flags,
        gates: &'a HashMap<String, bool>,
        outcomes: &'a HashMap<String, Outcome>,
    ) -> Self {
        Self {
            env,
            flags,
            gates,
            outcomes,
        }
    }

    pub fn env(&self) -> &'a ReviewEnv {
        self.env
    }

    pub fn settings(&self) -> &'a ReviewSettings {
        &self.env.settings
    }

    pub fn package(&self) -> &'a dyn PackageMetadata {
        self.env.package.as_ref()
    }

    pub fn builder(&self) -> &'a dyn BuildProvider {
        self.env.builder.as_ref()
    }

    pub fn linter(&self) -> &'a dyn LintRunner {
        self.env.linter.as_ref()
    }

    pub fn flags(&self) -> &'a Flags {
        self.flags
    }

    /// Cached applicability of a group, `None` if no registry owns it.
    pub fn group_applicable(&self, group: &str) -> Option<bool> {
        self.gates.get(group).copied()
    }

    /// Whether a registry owns `group`.
    pub fn has_group(&self, group: &str) -> bool {
        self.gates.contains_key(group)
    }

    /// Outcome of a check that already reached a terminal state.
    pub fn outcome_of(&self, check: &str) -> Option<Outcome> {
        self.outcomes.get(check).copied()
    }

    pub fn is_passed(&self, check: &str) -> bool {
        self.outcome_of(check) == Some(Outcome::Pass)
    }

    pub fn is_failed(&self, check: &str) -> bool {
        self.outcome_of(check) == Some(Outcome::Fail)
    }
}
