//! Startup sequence: result dir, build, lint, install.
//!
//! The chain ends in [`BUILD_COMPLETED`], the default dependency of every
//! check that declares no needs of its own.

use tracing::{info, warn};

use crate::check::{Attachment, Check, CheckInfo, CheckType, Outcome, Verdict, BUILD_COMPLETED};
use crate::context::{ReviewContext, ReviewEnv};
use crate::error::{ReviewError, Result};
use crate::flags::Flags;
use crate::registry::Registry;

pub const GROUP: &str = "Setup";

const RPMLINT_URL: &str = "http://fedoraproject.org/wiki/Packaging/Guidelines#rpmlint";

/// Registers the startup checks; always applicable.
pub struct SetupRegistry;

impl Registry for SetupRegistry {
    fn group(&self) -> &str {
        GROUP
    }

    fn is_applicable(&self, _env: &ReviewEnv) -> bool {
        true
    }

    fn register(&self, _env: &ReviewEnv, _flags: &mut Flags) -> Result<Vec<Box<dyn Check>>> {
        Ok(vec![
            Box::new(CheckResultdir::new()),
            Box::new(CheckBuild::new()),
            Box::new(CheckRpmlint::new()),
            Box::new(CheckPackageInstalls::new()),
            Box::new(CheckRpmlintInstalled::new()),
            Box::new(CheckBuildCompleted::new()),
        ])
    }
}

fn setup_info(name: &str, needs: &[&str]) -> CheckInfo {
    CheckInfo::new(name, GROUP)
        .with_needs(needs.iter().copied())
        .automatic(true)
        .defined_in(file!())
}

fn lint_text(clean: bool) -> &'static str {
    if clean {
        "No rpmlint messages."
    } else {
        "There are rpmlint messages (see attachment)."
    }
}

/// The result dir must be empty; anything there is assumed to come from
/// the build.
pub struct CheckResultdir {
    info: CheckInfo,
}

impl CheckResultdir {
    pub fn new() -> Self {
        Self {
            info: setup_info("CheckResultdir", &[]).with_type(CheckType::Extra),
        }
    }
}

impl Check for CheckResultdir {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let settings = ctx.settings();
        let resultdir = ctx.builder().resultdir();
        if !(settings.nobuild || settings.prebuilt) && has_build_leftovers(&resultdir) {
            return Err(ReviewError::ResultdirNotEmpty { path: resultdir });
        }
        verdict.set(true);
        Ok(())
    }
}

fn has_build_leftovers(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.file_name().to_string_lossy().contains('.'))
        })
        .unwrap_or(false)
}

/// The package builds into binary packages.
pub struct CheckBuild {
    info: CheckInfo,
}

impl CheckBuild {
    pub fn new() -> Self {
        Self {
            info: setup_info("CheckBuild", &["CheckResultdir"])
                .with_url("http://fedoraproject.org/wiki/Packaging/Guidelines#Architecture_Support")
                .with_text(
                    "Package successfully compiles and builds into binary rpms \
                     on at least one supported primary architecture.",
                ),
        }
    }
}

impl Check for CheckBuild {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let settings = ctx.settings();
        if settings.prebuilt {
            verdict.set_with_note(Outcome::Pending, "Using prebuilt packages");
            return Ok(());
        }
        if settings.nobuild {
            if ctx.builder().have_cache_for(ctx.package().name()) {
                verdict.set_with_note(Outcome::Pending, "Re-using old build in mock");
                return Ok(());
            }
            info!("No valid cache, building despite --no-build.");
        }

        let srpm = settings
            .srpm
            .as_ref()
            .ok_or_else(|| ReviewError::CheckFault {
                check: self.name().to_string(),
                message: "no source package configured".to_string(),
            })?;
        let output = ctx.builder().build(srpm)?;
        if output.success {
            verdict.set(true);
        } else {
            verdict.set_full(
                false,
                Some("Build failed (see attachment)".to_string()),
                vec![Attachment::new("Build log", output.output, 3)],
            );
        }
        Ok(())
    }
}

/// Rpmlint runs on the source package and all binary packages.
pub struct CheckRpmlint {
    info: CheckInfo,
}

impl CheckRpmlint {
    pub fn new() -> Self {
        Self {
            info: setup_info("CheckRpmlint", &["CheckBuild"])
                .with_url(RPMLINT_URL)
                .with_text("Rpmlint is run on all rpms the build produces."),
        }
    }
}

impl Check for CheckRpmlint {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        if ctx.is_failed("CheckBuild") {
            verdict.set_with_note(false, "Mock build failed");
            return Ok(());
        }
        let report = ctx.linter().lint(&super::built_artifacts(ctx))?;
        verdict.set_full(
            true,
            Some(lint_text(report.clean).to_string()),
            vec![Attachment::new("Rpmlint", report.output, 5)],
        );
        Ok(())
    }
}

/// The built packages install into the build root.
pub struct CheckPackageInstalls {
    info: CheckInfo,
}

impl CheckPackageInstalls {
    pub fn new() -> Self {
        Self {
            info: setup_info("CheckPackageInstalls", &["CheckRpmlint"])
                .with_url("https://fedoraproject.org/wiki/Packaging:Guidelines")
                .with_text("Package installs properly."),
        }
    }
}

impl Check for CheckPackageInstalls {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let packages = ctx.package().packages();
        if ctx.settings().nobuild {
            let missing: Vec<&String> = packages
                .iter()
                .filter(|p| ctx.builder().artifact_path(p).is_none())
                .collect();
            if missing.is_empty() {
                verdict.set(true);
            } else {
                info!(
                    "Packages required by --no-build are not installed: {}",
                    missing
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                verdict.set_with_note(false, "--no-build: package(s) not installed");
            }
            return Ok(());
        }

        info!("Installing built package(s)");
        let output = ctx
            .builder()
            .install(&ctx.builder().artifact_paths(&packages))?;
        if output.success {
            verdict.set(true);
        } else {
            verdict.set_full(
                false,
                Some("Installation errors (see attachment)".to_string()),
                vec![Attachment::new("Installation errors", output.output, 3)],
            );
        }
        Ok(())
    }
}

/// Rpmlint on the installed packages.
pub struct CheckRpmlintInstalled {
    info: CheckInfo,
}

impl CheckRpmlintInstalled {
    pub fn new() -> Self {
        Self {
            info: setup_info("CheckRpmlintInstalled", &["CheckPackageInstalls"])
                .with_type(CheckType::Extra)
                .with_url(RPMLINT_URL)
                .with_text("Rpmlint is run on all installed packages."),
        }
    }
}

impl Check for CheckRpmlintInstalled {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        if !ctx.is_passed("CheckPackageInstalls") {
            verdict.set_with_note(false, "Mock build failed");
            return Ok(());
        }
        let report = ctx.linter().lint_installed(&ctx.package().packages())?;
        verdict.set_full(
            true,
            Some(lint_text(report.clean).to_string()),
            vec![Attachment::new(
                "Rpmlint (installed packages)",
                format!("{}\n", report.output),
                5,
            )],
        );
        Ok(())
    }
}

/// Checkpoint: build, lint and install are done and the sources are
/// unpacked. Never shows up in the report.
pub struct CheckBuildCompleted {
    info: CheckInfo,
}

impl CheckBuildCompleted {
    pub fn new() -> Self {
        Self {
            info: setup_info(BUILD_COMPLETED, &["CheckRpmlintInstalled"])
                .with_type(CheckType::Extra)
                .with_url("")
                .with_text("This text is never shown"),
        }
    }
}

impl Check for CheckBuildCompleted {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        if let Some(srpm) = &ctx.settings().srpm {
            let output = ctx.builder().prepare_sources(srpm)?;
            if !output.success {
                warn!("Cannot prepare sources: {}", output.output.trim());
            }
        }
        verdict.set(Outcome::NotApplicable);
        Ok(())
    }
}
