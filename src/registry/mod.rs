//! Check registries.
//!
//! A [`Registry`] owns one group of related checks and decides, once per
//! run, whether the whole group is relevant to the package under review.
//! [`RegistrySet`] merges registries keyed by group name.

use tracing::debug;

use crate::check::Check;
use crate::context::ReviewEnv;
use crate::error::{ReviewError, Result};
use crate::flags::Flags;

/// A named family of checks gated by one applicability predicate.
pub trait Registry {
    /// Group name; unique across a [`RegistrySet`].
    fn group(&self) -> &str;

    /// Whether the group applies to the package. Evaluated once per run.
    fn is_applicable(&self, env: &ReviewEnv) -> bool;

    /// Contribute this group's checks, declaring any flags they use.
    fn register(&self, env: &ReviewEnv, flags: &mut Flags) -> Result<Vec<Box<dyn Check>>>;
}

/// Registries merged by group name, kept in insertion order.
#[derive(Default)]
pub struct RegistrySet {
    registries: Vec<Box<dyn Registry>>,
}

impl RegistrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registry, rejecting a second registry for the same group.
    pub fn add(&mut self, registry: Box<dyn Registry>) -> Result<()> {
        if self.get(registry.group()).is_some() {
            return Err(ReviewError::DuplicateRegistry {
                group: registry.group().to_string(),
            });
        }
        debug!("Adding registry for group {}", registry.group());
        self.registries.push(registry);
        Ok(())
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, registry: Box<dyn Registry>) -> Result<Self> {
        self.add(registry)?;
        Ok(self)
    }

    pub fn get(&self, group: &str) -> Option<&dyn Registry> {
        self.registries
            .iter()
            .find(|r| r.group() == group)
            .map(|r| r.as_ref())
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Registry> {
        self.registries.iter().map(|r| r.as_ref())
    }

    /// Group names in insertion order.
    pub fn groups(&self) -> Vec<&str> {
        self.registries.iter().map(|r| r.group()).collect()
    }

    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}

impl std::fmt::Debug for RegistrySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySet")
            .field("groups", &self.groups())
            .finish()
    }
}
