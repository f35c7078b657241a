//! PHP packaging checks.

use crate::check::{Check, CheckInfo, Verdict};
use crate::context::{ReviewContext, ReviewEnv};
use crate::error::Result;
use crate::flags::Flags;
use crate::registry::Registry;

pub const GROUP: &str = "PHP";

/// Applies to packages named `php-*`.
pub struct PhpRegistry;

impl Registry for PhpRegistry {
    fn group(&self) -> &str {
        GROUP
    }

    fn is_applicable(&self, env: &ReviewEnv) -> bool {
        env.package.name().starts_with("php-")
    }

    fn register(&self, _env: &ReviewEnv, _flags: &mut Flags) -> Result<Vec<Box<dyn Check>>> {
        Ok(vec![Box::new(PhpCheckPhpRequire::new())])
    }
}

pub struct PhpCheckPhpRequire {
    info: CheckInfo,
}

impl PhpCheckPhpRequire {
    pub fn new() -> Self {
        Self {
            info: CheckInfo::new("PhpCheckPhpRequire", GROUP)
                .with_url("http://fedoraproject.org/wiki/Packaging:PHP")
                .with_text("Package requires php-common instead of php.")
                .automatic(true)
                .defined_in(file!()),
        }
    }
}

impl Check for PhpCheckPhpRequire {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let requires = ctx.package().requires(None);
        let has = |name: &str| requires.iter().any(|r| r == name);
        if has("php") && !has("php-common") {
            verdict.set_with_note(false, "Package should require php-common rather than php.");
        } else {
            verdict.set(has("php-common"));
        }
        Ok(())
    }
}
