//! Sugar activity checks.

use crate::check::{Check, CheckInfo, Outcome, Verdict};
use crate::context::{ReviewContext, ReviewEnv};
use crate::error::Result;
use crate::flags::Flags;
use crate::registry::Registry;

pub const GROUP: &str = "SugarActivity";

const ACTIVITY_DIR: &str = "^/usr/(share|lib|lib64)/sugar/activities/";

const GUIDELINES: &str = "https://fedoraproject.org/wiki/Packaging:SugarActivityGuidelines";

/// Applies to packages installing Sugar activities.
pub struct SugarRegistry;

impl Registry for SugarRegistry {
    fn group(&self) -> &str {
        GROUP
    }

    fn is_applicable(&self, env: &ReviewEnv) -> bool {
        env.package.has_files_re(ACTIVITY_DIR)
    }

    fn register(&self, _env: &ReviewEnv, _flags: &mut Flags) -> Result<Vec<Box<dyn Check>>> {
        Ok(vec![
            Box::new(SugarCheck::new(
                "SugarActivityCheckNaming",
                "Naming",
                "Sugar activities must be named sugar-<activity name>",
                SugarRule::Naming,
            )),
            Box::new(SugarCheck::new(
                "SugarActivityCheckBuildRequires",
                "Necessary_BuildRequires",
                "Sugar activities depend on sugar-toolkit",
                SugarRule::BuildRequires,
            )),
            Box::new(SugarCheck::new(
                "SugarActivityCheckRuntimeDeps",
                "Runtime_Dependencies",
                "All runtime dependency information need to be manually added.",
                SugarRule::Manual,
            )),
        ])
    }
}

enum SugarRule {
    /// `sugar-` prefix required; the rest of the name needs a human.
    Naming,
    BuildRequires,
    Manual,
}

pub struct SugarCheck {
    info: CheckInfo,
    rule: SugarRule,
}

impl SugarCheck {
    fn new(name: &str, anchor: &str, text: &str, rule: SugarRule) -> Self {
        Self {
            info: CheckInfo::new(name, GROUP)
                .with_url(format!("{}#{}", GUIDELINES, anchor))
                .with_text(text)
                .automatic(!matches!(rule, SugarRule::Manual))
                .defined_in(file!()),
            rule,
        }
    }
}

impl Check for SugarCheck {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        match self.rule {
            SugarRule::Naming if !ctx.package().name().starts_with("sugar-") => verdict.set(false),
            SugarRule::Naming | SugarRule::Manual => verdict.set(Outcome::Pending),
            SugarRule::BuildRequires => verdict.set(
                ctx.package()
                    .build_requires()
                    .iter()
                    .any(|r| r == "sugar-toolkit"),
            ),
        }
        Ok(())
    }
}
