//! C and C++ packaging checks.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::check::{Attachment, Check, CheckInfo, Outcome, Verdict};
use crate::context::{ReviewContext, ReviewEnv};
use crate::error::Result;
use crate::flags::Flags;
use crate::registry::Registry;

pub const GROUP: &str = "C/C++";

const GUIDELINES: &str = "http://fedoraproject.org/wiki/Packaging/Guidelines";

/// Versioned shared library directly in the library dir.
const VERSIONED_SO: &str = r"/usr/(lib|lib64)/[\w\-]*\.so\.[0-9]";

/// Unversioned shared library directly in the library dir.
static UNVERSIONED_SO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/usr/(lib|lib64)/[\w\-]*\.so$").unwrap());

const LDCONFIG: &str = "/sbin/ldconfig";

pub struct CCppRegistry;

impl Registry for CCppRegistry {
    fn group(&self) -> &str {
        GROUP
    }

    fn is_applicable(&self, env: &ReviewEnv) -> bool {
        let package = env.package.as_ref();
        package.has_files_re(VERSIONED_SO)
            || package.has_files("*.h")
            || package.has_files("*.a")
            || ["*.c", "*.C", "*.cpp"]
                .iter()
                .any(|p| package.sources_have_files(p))
    }

    fn register(&self, _env: &ReviewEnv, _flags: &mut Flags) -> Result<Vec<Box<dyn Check>>> {
        Ok(vec![
            Box::new(CheckLDConfig::new()),
            Box::new(CheckHeaderFiles::new()),
            Box::new(CheckStaticLibs::new()),
            Box::new(manual(
                "CheckNoStaticExecutables",
                "Staticly_Linking_Executables",
                "Package contains no static executables.",
            )),
            Box::new(CheckSoFiles::new()),
            Box::new(CheckLibToolArchives::new()),
            Box::new(CheckRPATH::new()),
            Box::new(manual(
                "CheckNoKernelModules",
                "No_External_Kernel_Modules",
                "Package does not contain kernel modules.",
            )),
        ])
    }
}

fn ccpp_info(name: &str, anchor: &str, text: &str) -> CheckInfo {
    CheckInfo::new(name, GROUP)
        .with_url(format!("{}#{}", GUIDELINES, anchor))
        .with_text(text)
        .automatic(true)
        .defined_in(file!())
}

/// A check a human has to perform.
pub struct ManualCheck {
    info: CheckInfo,
}

impl Check for ManualCheck {
    fn info(&self) -> &CheckInfo {
        &self.info
    }
}

fn manual(name: &str, anchor: &str, text: &str) -> ManualCheck {
    ManualCheck {
        info: ccpp_info(name, anchor, text).automatic(false),
    }
}

/// `pkg : path` lines for every matched file outside the allowed packages.
fn misplaced(
    files: &BTreeMap<String, Vec<String>>,
    allowed: impl Fn(&str, &str) -> bool,
) -> Vec<String> {
    files
        .iter()
        .flat_map(|(pkg, paths)| paths.iter().map(move |path| (pkg, path)))
        .filter(|(pkg, path)| !allowed(pkg, path))
        .map(|(pkg, path)| format!("{} : {}", pkg, path))
        .collect()
}

fn set_misplaced(verdict: &mut Verdict, lines: Vec<String>) {
    if lines.is_empty() {
        verdict.set(true);
    } else {
        verdict.set_with_note(false, lines.join("\n"));
    }
}

/// Shared libraries in the linker path need ldconfig in %post and %postun.
pub struct CheckLDConfig {
    info: CheckInfo,
}

impl CheckLDConfig {
    pub fn new() -> Self {
        Self {
            info: ccpp_info(
                "CheckLDConfig",
                "Shared_Libraries",
                "ldconfig called in %post and %postun if required.",
            ),
        }
    }
}

impl Check for CheckLDConfig {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn is_applicable(&self, ctx: &ReviewContext<'_>) -> bool {
        ctx.package().has_files_re(VERSIONED_SO)
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        for section in ["%post", "%postun"] {
            // `section("%post")` also yields `%postun` headers, so match
            // the header word exactly.
            let called = ctx
                .package()
                .section(section)
                .iter()
                .filter(|(header, _)| header.split_whitespace().next() == Some(section))
                .any(|(header, lines)| {
                    header.contains(LDCONFIG) || lines.iter().any(|l| l.contains(LDCONFIG))
                });
            if !called {
                verdict.set_with_note(false, format!("{} not called in {}", LDCONFIG, section));
                return Ok(());
            }
        }
        verdict.set(true);
        Ok(())
    }
}

/// Header files belong in -devel.
pub struct CheckHeaderFiles {
    info: CheckInfo,
}

impl CheckHeaderFiles {
    pub fn new() -> Self {
        Self {
            info: ccpp_info(
                "CheckHeaderFiles",
                "DevelPackages",
                "Header files in -devel subpackage, if present.",
            ),
        }
    }
}

impl Check for CheckHeaderFiles {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn is_applicable(&self, ctx: &ReviewContext<'_>) -> bool {
        ctx.package().has_files("*.h")
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let headers = ctx.package().files_by_pattern("*.h");
        let lines = misplaced(&headers, |pkg, path| {
            pkg.contains("-devel")
                || (path.starts_with("/usr/src/debug/") && pkg.contains("-debuginfo"))
        });
        set_misplaced(verdict, lines);
        Ok(())
    }
}

/// Static libraries belong in -static.
pub struct CheckStaticLibs {
    info: CheckInfo,
}

impl CheckStaticLibs {
    pub fn new() -> Self {
        Self {
            info: ccpp_info(
                "CheckStaticLibs",
                "StaticLibraries",
                "Static libraries in -static subpackage, if present.",
            )
            .automatic(false),
        }
    }
}

impl Check for CheckStaticLibs {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn is_applicable(&self, ctx: &ReviewContext<'_>) -> bool {
        ctx.package().has_files("*.a")
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let archives = ctx.package().files_by_pattern("*.a");
        set_misplaced(verdict, misplaced(&archives, |pkg, _| pkg.contains("-static")));
        Ok(())
    }
}

/// Unversioned .so files belong in -devel.
pub struct CheckSoFiles {
    info: CheckInfo,
}

impl CheckSoFiles {
    pub fn new() -> Self {
        Self {
            info: ccpp_info(
                "CheckSoFiles",
                "DevelPackages",
                "Development (unversioned) .so files in -devel subpackage, if present.",
            ),
        }
    }
}

impl Check for CheckSoFiles {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    // Decides applicability from the .so files it finds, once the group applies.
    fn run(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let so_files = ctx.package().files_by_pattern("*.so");
        if so_files.is_empty() {
            verdict.set(Outcome::NotApplicable);
            return Ok(());
        }

        let mut in_libdir = false;
        let mut in_private = false;
        let mut bad = Vec::new();
        for (pkg, paths) in so_files.iter().filter(|(pkg, _)| !pkg.contains("-devel")) {
            for path in paths {
                bad.push(format!("{}: {}", pkg, path));
                if UNVERSIONED_SO.is_match(path) {
                    in_libdir = true;
                } else {
                    in_private = true;
                }
            }
        }

        let (outcome, note) = if in_libdir {
            (Outcome::Fail, Some("Unversioned so-files directly in %_libdir."))
        } else if in_private {
            (
                Outcome::Pending,
                Some(
                    "Unversioned so-files in private %_libdir subdirectory \
                     (see attachment). Verify they are not in ld path.",
                ),
            )
        } else {
            (Outcome::Pass, None)
        };
        let attachments = if bad.is_empty() {
            Vec::new()
        } else {
            vec![Attachment::new("Unversioned so-files", bad.join("\n"), 10)]
        };
        verdict.set_full(outcome, note.map(str::to_string), attachments);
        Ok(())
    }
}

/// No libtool archives.
pub struct CheckLibToolArchives {
    info: CheckInfo,
}

impl CheckLibToolArchives {
    pub fn new() -> Self {
        Self {
            info: ccpp_info(
                "CheckLibToolArchives",
                "StaticLibraries",
                "Package does not contain any libtool archives (.la)",
            ),
        }
    }
}

impl Check for CheckLibToolArchives {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let archives = ctx.package().files_by_pattern("*.la");
        set_misplaced(verdict, misplaced(&archives, |_, _| false));
        Ok(())
    }
}

/// Rpath only for internal libraries; rpmlint flags the rest.
pub struct CheckRPATH {
    info: CheckInfo,
}

impl CheckRPATH {
    pub fn new() -> Self {
        Self {
            info: ccpp_info(
                "CheckRPATH",
                "Beware_of_Rpath",
                "Rpath absent or only used for internal libs.",
            ),
        }
    }
}

impl Check for CheckRPATH {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let artifacts = super::built_artifacts(ctx);
        if artifacts.is_empty() {
            verdict.set_with_note(Outcome::Pending, "No built packages to inspect");
            return Ok(());
        }
        let report = ctx.linter().lint(&artifacts)?;
        if report
            .output
            .lines()
            .any(|l| l.contains("binary-or-shlib-defines-rpath"))
        {
            verdict.set_with_note(Outcome::Pending, "See rpmlint output");
        } else {
            verdict.set(true);
        }
        Ok(())
    }
}
