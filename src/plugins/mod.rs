//! Built-in check registries.
//!
//! - [`build`] - Startup chain: result dir, build, lint, install
//! - [`generic`] - Checks for every package
//! - [`ccpp`], [`php`], [`sugar`] - Language and ecosystem checks
//! - [`script`] - Shell-script checks from the plugin dirs
//! - [`data`] - YAML-defined checks, built-in and from the data dirs

pub mod build;
pub mod ccpp;
pub mod data;
pub mod generic;
pub mod php;
pub mod script;
pub mod sugar;

use std::path::PathBuf;

use crate::context::ReviewContext;
use crate::error::Result;
use crate::registry::RegistrySet;

/// All built-in registries in report order.
pub fn builtin_registries() -> Result<RegistrySet> {
    RegistrySet::new()
        .with(Box::new(build::SetupRegistry))?
        .with(Box::new(generic::GenericRegistry))?
        .with(Box::new(ccpp::CCppRegistry))?
        .with(Box::new(php::PhpRegistry))?
        .with(Box::new(sugar::SugarRegistry))?
        .with(Box::new(script::ScriptRegistry))?
        .with(Box::new(data::DataRegistry))
}

/// Source package (if any) followed by every binary package artifact that
/// resolves.
pub(crate) fn built_artifacts(ctx: &ReviewContext<'_>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = ctx.settings().srpm.iter().cloned().collect();
    paths.extend(ctx.builder().artifact_paths(&ctx.package().packages()));
    paths
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_groups_are_in_report_order() {
        let registries = builtin_registries().unwrap();
        assert_eq!(
            registries.groups(),
            vec!["Setup", "Generic", "C/C++", "PHP", "SugarActivity", "Shell-api", "Data"]
        );
    }
}
