//! Checks that apply to every package.

use crate::check::{Check, CheckInfo, CheckType, Outcome, Verdict};
use crate::context::{ReviewContext, ReviewEnv};
use crate::error::Result;
use crate::flags::Flags;
use crate::registry::Registry;

pub const GROUP: &str = "Generic";

/// Flag selecting the stricter EPEL5 rules.
pub const EPEL5: &str = "EPEL5";

const VALID_BUILDROOTS: &[&str] = &[
    "%(mktemp -ud %{_tmppath}/%{name}-%{version}-%{release}-XXXXXX)",
    "%{_tmppath}/%{name}-%{version}-%{release}-root-%(%{__id_u} -n)",
];

pub struct GenericRegistry;

impl Registry for GenericRegistry {
    fn group(&self) -> &str {
        GROUP
    }

    fn is_applicable(&self, _env: &ReviewEnv) -> bool {
        true
    }

    fn register(&self, _env: &ReviewEnv, flags: &mut Flags) -> Result<Vec<Box<dyn Check>>> {
        flags.declare(EPEL5, "Review package for EPEL5", file!())?;
        Ok(vec![Box::new(CheckBuildroot::new())])
    }
}

/// The BuildRoot tag is only needed (and then must be valid) for EPEL5.
pub struct CheckBuildroot {
    info: CheckInfo,
}

impl CheckBuildroot {
    pub fn new() -> Self {
        Self {
            info: CheckInfo::new("CheckBuildroot", GROUP)
                .with_type(CheckType::Should)
                .with_url("http://fedoraproject.org/wiki/Packaging/Guidelines#BuildRoot_tag")
                .with_text("Buildroot is not present")
                .automatic(true)
                .defined_in(file!()),
        }
    }
}

impl Check for CheckBuildroot {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let epel5 = ctx.flags().is_set(EPEL5);
        let buildroots = ctx.package().tag("BuildRoot");
        match buildroots.as_slice() {
            [] if epel5 => verdict.set_with_note(false, "Missing buildroot (required for EPEL5)"),
            [] => verdict.set(true),
            [_, _, ..] => verdict.set_with_note(false, "Multiple BuildRoot tags"),
            [root] if epel5 => {
                if VALID_BUILDROOTS.contains(&root.trim()) {
                    verdict.set(true);
                } else {
                    verdict.set_with_note(
                        Outcome::Pending,
                        format!("Invalid buildroot found: {}", root),
                    );
                }
            }
            [_] => verdict.set_with_note(
                Outcome::Pending,
                "Buildroot is not needed unless packager plans to package for EPEL5",
            ),
        }
        Ok(())
    }
}
