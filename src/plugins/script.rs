//! Checks written as shell scripts.
//!
//! Each `*.sh` file in a plugin dir is one check. Registration data lives
//! in header comments:
//!
//! ```text
//! # @name: CheckManPages
//! # @group: Generic
//! # @type: SHOULD
//! # @text: Man pages are present
//! # @text: for all binaries.
//! # @url: https://example.org/guidelines#man
//! # @needs: CheckBuild, CheckRpmlint
//! # @deprecates: CheckOldManPages
//! # @register-flag: MANLESS Skip man page checks
//! # @set-flag: MANLESS 0
//! ```
//!
//! Scripts run with `review-env.sh` sourced and report through their exit
//! code (`$FR_PASS`, `$FR_FAIL`, `$FR_PENDING`, `$FR_NOT_APPLICABLE`).
//! Standard output becomes the note; the `attach` shell function adds
//! attachments.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::check::{
    Attachment, Check, CheckInfo, CheckType, Implementation, Outcome, Verdict, SCRIPT_FAIL,
    SCRIPT_NOT_APPLICABLE, SCRIPT_PASS, SCRIPT_PENDING,
};
use crate::context::{ReviewContext, ReviewEnv};
use crate::error::{ReviewError, Result};
use crate::flags::Flags;
use crate::registry::Registry;
use crate::tools::command;

pub const GROUP: &str = "Shell-api";

/// Check that writes the script environment; every script needs it.
pub const CREATE_ENV: &str = "CreateEnvCheck";

/// Environment file sourced by every script, relative to the review dir.
pub const ENV_FILE: &str = "review-env.sh";

/// Directory scripts drop attachments into, relative to the review dir.
pub const ATTACHMENT_DIR: &str = ".attachments";

const MAX_ATTACHMENT_BYTES: u64 = 8192;
const DEFAULT_ATTACHMENT_HINT: u8 = 7;

const TAGS: &[&str] = &["name", "version", "release", "group", "license", "url"];
const SECTIONS: &[&str] = &["prep", "build", "install", "check"];

const ENV_FUNCTIONS: &str = r#"
function get_used_rpms()
# List the binary rpms of the build on stdout, or return 1.
{
    cd "$FR_REVIEWDIR"
    if test "${FR_SETTINGS[prebuilt]}" = 1
    then
        files=( $(ls ../*.rpm 2>/dev/null | grep -v .src.rpm) ) \
               || files=( '@@' )
    else
        files=( $(ls "$FR_RESULTDIR"/*.rpm 2>/dev/null | grep -v .src.rpm) ) \
               || files=( '@@' )
    fi
    test -e ${files[0]} || return 1
    echo "${files[@]}"
    cd "$OLDPWD"
}

function unpack_rpms()
# Unpack all binary rpms into rpms-unpacked, one dir per rpm.
{
    [ -d rpms-unpacked ] && return 0
    rpms=( $( get_used_rpms ) ) || return 1
    mkdir rpms-unpacked
    cd rpms-unpacked
    for rpm_path in ${rpms[@]};  do
        rpm=$( basename $rpm_path)
        mkdir $rpm
        cd $rpm
        rpm2cpio $rpm_path | cpio -id &>/dev/null
        cd ..
    done
    cd ..
}

function attach()
# Usage: attach <sorting hint> <header>
# Reads the attachment body from stdin.
{
    startdir=$(pwd)
    cd "$FR_REVIEWDIR"
    for (( i = 0; i < 10; i++ )); do
        test -e "$FR_REVIEWDIR"/.attachments/*$i || break
    done
    if [ $i -eq 10 ]; then
        echo "More than 10 attachments! Giving up" >&2
        exit 1
    fi
    sort_hint=$1
    shift
    title=${*//\/ }
    file="$sort_hint;${title/;/:};$i"
    cat > .attachments/"$file"
    cd "$startdir"
}
"#;

/// Registers [`CreateEnvCheck`] and one check per script.
pub struct ScriptRegistry;

impl Registry for ScriptRegistry {
    fn group(&self) -> &str {
        GROUP
    }

    fn is_applicable(&self, _env: &ReviewEnv) -> bool {
        true
    }

    fn register(&self, env: &ReviewEnv, flags: &mut Flags) -> Result<Vec<Box<dyn Check>>> {
        let mut definitions = Vec::new();
        for path in discover_scripts(&env.settings.plugin_dirs)? {
            let content = fs::read_to_string(&path)?;
            definitions.push(ScriptDefinition::parse(&path, &content)?);
        }

        // Declare everything first so a script may set a flag another
        // script registers.
        for def in &definitions {
            for (name, doc) in &def.register_flags {
                flags.declare(name.as_str(), doc.as_str(), def.path.display().to_string())?;
            }
        }
        for def in &definitions {
            for (name, value) in &def.set_flags {
                flags.set(name, value.as_str())?;
            }
        }

        let mut checks: Vec<Box<dyn Check>> = vec![Box::new(CreateEnvCheck::new())];
        checks.extend(
            definitions
                .into_iter()
                .map(|def| Box::new(ScriptCheck::new(def)) as Box<dyn Check>),
        );
        Ok(checks)
    }
}

/// `*.sh` files in the given dirs, dir by dir, sorted by file name.
pub fn discover_scripts(dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut scripts = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            debug!("Skipping missing plugin dir {}", dir.display());
            continue;
        }
        let mut found: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "sh"))
            .collect();
        found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        scripts.extend(found);
    }
    Ok(scripts)
}

/// Registration data parsed from a script header.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDefinition {
    pub path: PathBuf,
    pub name: String,
    pub group: String,
    pub check_type: CheckType,
    pub url: Option<String>,
    pub text: String,
    pub needs: Vec<String>,
    pub deprecates: Vec<String>,
    pub register_flags: Vec<(String, String)>,
    pub set_flags: Vec<(String, String)>,
}

/// Value of `@key:` in a line, trimmed. Empty values count as absent.
fn find_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let marker = format!("@{}:", key);
    line.rfind(&marker)
        .map(|pos| line[pos + marker.len()..].trim())
        .filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(String::from)
        .collect()
}

impl ScriptDefinition {
    /// Parse the header directives of a script.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let invalid = |message: String| ReviewError::CheckDefinitionError {
            path: path.to_path_buf(),
            message,
        };

        let name = content
            .lines()
            .find_map(|l| find_value(l, "name"))
            .map(String::from)
            .or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .ok_or_else(|| invalid("cannot derive a check name".to_string()))?;

        let mut def = ScriptDefinition {
            path: path.to_path_buf(),
            name,
            group: super::generic::GROUP.to_string(),
            check_type: CheckType::Must,
            url: None,
            text: String::new(),
            needs: vec![CREATE_ENV.to_string()],
            deprecates: Vec::new(),
            register_flags: Vec::new(),
            set_flags: Vec::new(),
        };

        for line in content.lines() {
            if let Some(group) = find_value(line, "group") {
                def.group = group.to_string();
            }
            if let Some(url) = find_value(line, "url") {
                def.url = Some(url.to_string());
            }
            if let Some(check_type) = find_value(line, "type") {
                def.check_type = check_type.parse().map_err(invalid)?;
            }
            if let Some(flag) = find_value(line, "register-flag") {
                let (name, doc) = flag
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| invalid(format!("flag {} has no description", flag)))?;
                def.register_flags
                    .push((name.to_string(), doc.trim().to_string()));
            }
            if let Some(assignment) = find_value(line, "set-flag") {
                let mut words = assignment.split_whitespace();
                match (words.next(), words.next()) {
                    (Some(name), Some(value)) => {
                        def.set_flags.push((name.to_string(), value.to_string()))
                    }
                    _ => return Err(invalid(format!("set-flag needs a value: {}", assignment))),
                }
            }
            if let Some(text) = find_value(line, "text") {
                if !def.text.is_empty() {
                    def.text.push(' ');
                }
                def.text.push_str(text);
            }
            if let Some(victims) = find_value(line, "deprecates") {
                def.deprecates = split_list(victims);
            }
            if let Some(needed) = find_value(line, "needs") {
                def.needs.extend(split_list(needed));
            }
        }
        Ok(def)
    }
}

/// A check backed by a shell script.
pub struct ScriptCheck {
    info: CheckInfo,
    path: PathBuf,
}

impl ScriptCheck {
    pub fn new(def: ScriptDefinition) -> Self {
        let mut info = CheckInfo::new(def.name, def.group)
            .with_type(def.check_type)
            .with_needs(def.needs)
            .with_deprecates(def.deprecates)
            .automatic(true)
            .with_implementation(Implementation::Script)
            .defined_in(def.path.display().to_string());
        if !def.text.is_empty() {
            info = info.with_text(def.text);
        }
        if let Some(url) = def.url {
            info = info.with_url(url);
        }
        Self {
            info,
            path: def.path,
        }
    }

    fn execute_script(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let review_dir = &ctx.settings().review_dir;
        let cmd = format!(
            "source ./{}; source '{}'",
            ENV_FILE,
            quote(&self.path.display().to_string())
        );
        let output = command::execute_in(&cmd, review_dir);
        let attachments = collect_attachments(&review_dir.join(ATTACHMENT_DIR));

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                warn!("Cannot execute {}: {}", cmd, e);
                verdict.set_with_note(
                    Outcome::Pending,
                    format!("Cannot execute shell command {}", cmd),
                );
                return Ok(());
            }
        };

        let note = Some(output.stdout.clone()).filter(|s| !s.trim().is_empty());
        let outcome = output
            .exit_code
            .filter(|_| output.stderr.is_empty())
            .and_then(Outcome::from_script_code);
        match outcome {
            Some(Outcome::NotApplicable) => verdict.set(Outcome::NotApplicable),
            Some(outcome) => verdict.set_full(outcome, note, attachments),
            None => {
                warn!(
                    "Illegal return from {}, code {:?}, stdout: {} stderr: {}",
                    self.path.display(),
                    output.exit_code,
                    output.stdout.trim(),
                    output.stderr.trim()
                );
                verdict.set_with_note(Outcome::Pending, "Test run failed");
            }
        }
        Ok(())
    }
}

impl Check for ScriptCheck {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        if !ctx.has_group(&self.info.group) {
            warn!(
                "Illegal group {} in {}",
                self.info.group, self.info.defined_in
            );
            verdict.set_with_note(Outcome::Pending, "Test run failed: illegal group");
            return Ok(());
        }
        if !self.is_applicable(ctx) {
            verdict.set(Outcome::NotApplicable);
            return Ok(());
        }
        self.execute_script(ctx, verdict)
    }
}

/// Pick up and remove the attachments a script left behind.
fn collect_attachments(dir: &Path) -> Vec<Attachment> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().matches(';').count() >= 2)
        })
        .collect();
    paths.sort();

    let mut attachments = Vec::new();
    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut parts = file_name.splitn(3, ';');
        let hint = parts.next().unwrap_or_default();
        let header = parts.next().unwrap_or_default();
        let hint = hint.parse::<u8>().unwrap_or_else(|_| {
            warn!(
                "Cannot decode attachment sorting hint: {}, defaulting to {}",
                hint, DEFAULT_ATTACHMENT_HINT
            );
            DEFAULT_ATTACHMENT_HINT
        });

        let mut body = Vec::new();
        match fs::File::open(&path).and_then(|f| f.take(MAX_ATTACHMENT_BYTES).read_to_end(&mut body)) {
            Ok(_) => attachments.push(Attachment::new(
                header,
                String::from_utf8_lossy(&body).into_owned(),
                hint,
            )),
            Err(e) => warn!("Cannot read attachment {}: {}", path.display(), e),
        }
        if let Err(e) = fs::remove_file(&path) {
            warn!("Cannot remove attachment {}: {}", path.display(), e);
        }
    }
    attachments
}

/// Writes the script environment and clears old attachments.
pub struct CreateEnvCheck {
    info: CheckInfo,
}

impl CreateEnvCheck {
    pub fn new() -> Self {
        Self {
            info: CheckInfo::new(CREATE_ENV, super::generic::GROUP)
                .with_type(CheckType::Extra)
                .with_text("Create review-env.sh")
                .automatic(true)
                .defined_in(file!()),
        }
    }
}

impl Check for CreateEnvCheck {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let review_dir = &ctx.settings().review_dir;
        fs::create_dir_all(review_dir)?;
        fs::write(review_dir.join(ENV_FILE), render_env(ctx))?;

        let attachments = review_dir.join(ATTACHMENT_DIR);
        if attachments.exists() {
            fs::remove_dir_all(&attachments)?;
        }
        fs::create_dir_all(&attachments)?;
        verdict.set(Outcome::NotApplicable);
        Ok(())
    }
}

/// Make a string safe inside single quotes.
fn quote(s: &str) -> String {
    s.replace('\'', "'\\''")
}

/// Package owning a `%description` header, if the header is one.
fn description_owner(header: &str, base: &str) -> Option<String> {
    let mut words = header.split_whitespace();
    if words.next() != Some("%description") {
        return None;
    }
    match (words.next(), words.next()) {
        (None, _) => Some(base.to_string()),
        (Some("-n"), Some(name)) => Some(name.to_string()),
        (Some("-n"), None) => None,
        (Some(sub), _) => Some(format!("{}-{}", base, sub)),
    }
}

fn is_source_tag(tag: &str) -> bool {
    let lower = tag.to_ascii_lowercase();
    ["source", "patch"].iter().any(|prefix| {
        lower
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
    })
}

/// Render `review-env.sh` for the current review.
pub fn render_env(ctx: &ReviewContext<'_>) -> String {
    let settings = ctx.settings();
    let package = ctx.package();
    let mut env = String::new();

    env.push_str("unset $(env | sed -n 's/^\\([A-Za-z_][A-Za-z0-9_]*\\)=.*/\\1/p') 2>/dev/null\n");
    env.push_str("PATH=/bin:/usr/bin:/sbin/:/usr/sbin\n\n");

    env.push_str("declare -A FR_FLAGS\n");
    for flag in ctx.flags().iter() {
        env.push_str(&format!("FR_FLAGS[{}]='{}'\n", flag.name, quote(&flag.to_string())));
    }

    let path_setting = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };
    let bool_setting = |b: bool| if b { "1" } else { "" };
    env.push_str("declare -A FR_SETTINGS\n");
    for (key, value) in [
        ("prebuilt", bool_setting(settings.prebuilt).to_string()),
        ("nobuild", bool_setting(settings.nobuild).to_string()),
        ("srpm", path_setting(&settings.srpm)),
        ("resultdir", settings.resultdir.display().to_string()),
        ("mock_config", settings.mock_config.clone().unwrap_or_default()),
    ] {
        env.push_str(&format!("FR_SETTINGS[{}]='{}'\n", key, quote(&value)));
    }

    let review_dir = quote(&settings.review_dir.display().to_string());
    env.push_str(&format!("export FR_REVIEWDIR='{}'\n", review_dir));
    env.push_str(&format!(
        "export FR_RESULTDIR='{}'\n",
        quote(&settings.resultdir.display().to_string())
    ));
    env.push_str("export HOME=\"$FR_REVIEWDIR\"\ncd \"$HOME\"\n\n");

    for tag in TAGS {
        let value = match *tag {
            "name" => package.name().to_string(),
            "version" => package.version().to_string(),
            "release" => package.release().to_string(),
            other => package.tag(other).into_iter().next().unwrap_or_default(),
        };
        env.push_str(&format!(
            "export FR_{}='{}'\n",
            tag.to_uppercase(),
            quote(&value)
        ));
    }
    env.push('\n');

    for (tag, values) in package.tags() {
        if !is_source_tag(&tag) {
            continue;
        }
        if let Some(value) = values.first() {
            env.push_str(&format!("export {}='{}'\n", tag, quote(value)));
        }
    }

    for section in SECTIONS {
        let header = format!("%{}", section);
        let lines: Vec<String> = package
            .section(&header)
            .into_iter()
            .filter(|(h, _)| h.split_whitespace().next() == Some(header.as_str()))
            .flat_map(|(_, lines)| lines)
            .collect();
        let body = if lines.is_empty() {
            String::new()
        } else {
            format!("'{}'", quote(&lines.join("\n")))
        };
        env.push_str(&format!("export FR_{}={}\n", section.to_uppercase(), body));
    }
    env.push('\n');

    env.push_str("declare -A FR_FILES\n");
    for pkg in package.packages() {
        env.push_str(&format!(
            "FR_FILES[{}]='{}'\n",
            pkg,
            quote(&package.files(&pkg).join("\n"))
        ));
    }
    env.push_str("declare -A FR_DESCRIPTION\n");
    for (header, lines) in package.section("%description") {
        if let Some(owner) = description_owner(&header, package.name()) {
            env.push_str(&format!(
                "FR_DESCRIPTION[{}]='{}'\n",
                owner,
                quote(&lines.join("\n"))
            ));
        }
    }
    env.push('\n');

    env.push_str(&format!("export FR_PASS={}\n", SCRIPT_PASS));
    env.push_str(&format!("export FR_FAIL={}\n", SCRIPT_FAIL));
    env.push_str(&format!("export FR_PENDING={}\n", SCRIPT_PENDING));
    env.push_str(&format!("export FR_NOT_APPLICABLE={}\n", SCRIPT_NOT_APPLICABLE));
    env.push_str(ENV_FUNCTIONS);
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::generic::GenericRegistry;
    use crate::plugins::test_support::env_for;
    use crate::registry::RegistrySet;
    use crate::scheduler::{CheckCollection, Resolution};
    use tempfile::TempDir;

    #[test]
    fn find_value_takes_text_after_marker() {
        assert_eq!(find_value("# @group: C/C++ ", "group"), Some("C/C++"));
        assert_eq!(find_value("# @group:", "group"), None);
        assert_eq!(find_value("# nothing here", "group"), None);
    }

    #[test]
    fn parse_reads_all_directives() {
        let content = "\
#!/bin/bash
# @name: CheckManPages
# @group: C/C++
# @type: should
# @text: Man pages are present
# @text: for all binaries.
# @url: https://example.org/man
# @needs: CheckBuild, CheckRpmlint
# @deprecates: CheckOld CheckOlder
# @register-flag: MANLESS Skip man page checks
# @set-flag: MANLESS 0
exit $FR_PASS
";
        let def = ScriptDefinition::parse(Path::new("/p/man.sh"), content).unwrap();
        assert_eq!(def.name, "CheckManPages");
        assert_eq!(def.group, "C/C++");
        assert_eq!(def.check_type, CheckType::Should);
        assert_eq!(def.text, "Man pages are present for all binaries.");
        assert_eq!(def.needs, vec![CREATE_ENV, "CheckBuild", "CheckRpmlint"]);
        assert_eq!(def.deprecates, vec!["CheckOld", "CheckOlder"]);
        assert_eq!(
            def.register_flags,
            vec![("MANLESS".to_string(), "Skip man page checks".to_string())]
        );
        assert_eq!(def.set_flags, vec![("MANLESS".to_string(), "0".to_string())]);
    }

    #[test]
    fn parse_defaults_name_to_file_stem() {
        let def = ScriptDefinition::parse(Path::new("/p/check-desktop.sh"), "exit 80\n").unwrap();
        assert_eq!(def.name, "check-desktop");
        assert_eq!(def.group, "Generic");
        assert_eq!(def.needs, vec![CREATE_ENV]);
    }

    #[test]
    fn parse_rejects_bad_type() {
        let err = ScriptDefinition::parse(Path::new("/p/x.sh"), "# @type: SOMETIMES\n").unwrap_err();
        assert!(matches!(err, ReviewError::CheckDefinitionError { .. }));
    }

    #[test]
    fn parse_rejects_flag_without_doc() {
        let err =
            ScriptDefinition::parse(Path::new("/p/x.sh"), "# @register-flag: LONELY\n").unwrap_err();
        assert!(matches!(err, ReviewError::CheckDefinitionError { .. }));
    }

    #[test]
    fn description_headers_map_to_packages() {
        assert_eq!(description_owner("%description", "foo").unwrap(), "foo");
        assert_eq!(description_owner("%description devel", "foo").unwrap(), "foo-devel");
        assert_eq!(description_owner("%description -n libbar", "foo").unwrap(), "libbar");
        assert!(description_owner("%descriptionx", "foo").is_none());
    }

    #[test]
    fn source_tags_are_recognized() {
        assert!(is_source_tag("Source0"));
        assert!(is_source_tag("Patch12"));
        assert!(is_source_tag("Source"));
        assert!(!is_source_tag("SourceURL"));
    }

    #[test]
    fn scripts_are_discovered_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["b.sh", "a.sh", "notes.txt"] {
            fs::write(temp.path().join(name), "").unwrap();
        }
        let found = discover_scripts(&[temp.path().to_path_buf(), temp.path().join("missing")])
            .unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.sh", "b.sh"]);
    }

    #[test]
    fn attachments_are_read_and_removed() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("3;Build notes;0"), "body").unwrap();
        fs::write(temp.path().join("x;Odd hint;1"), "odd").unwrap();
        fs::write(temp.path().join("stray"), "ignored").unwrap();
        let attachments = collect_attachments(temp.path());
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].header, "Build notes");
        assert_eq!(attachments[0].order_hint, 3);
        assert_eq!(attachments[1].order_hint, DEFAULT_ATTACHMENT_HINT);
        assert!(!temp.path().join("3;Build notes;0").exists());
        assert!(temp.path().join("stray").exists());
    }

    fn review_with_script(script: &str) -> (TempDir, CheckCollection) {
        let temp = TempDir::new().unwrap();
        let plugins = temp.path().join("plugins");
        fs::create_dir(&plugins).unwrap();
        fs::write(plugins.join("check.sh"), script).unwrap();

        let mut env = env_for("name: foo\nversion: '1.0'\nrelease: '1'\n");
        env.settings.review_dir = temp.path().join("review");
        env.settings.plugin_dirs = vec![plugins];
        let registries = RegistrySet::new()
            .with(Box::new(GenericRegistry))
            .unwrap()
            .with(Box::new(ScriptRegistry))
            .unwrap();
        let mut collection = CheckCollection::collect(env, registries).unwrap();
        collection.run().unwrap();
        (temp, collection)
    }

    #[test]
    fn passing_script_reports_stdout_and_attachments() {
        let script = "\
# @name: CheckFromScript
echo 'second' | attach 7 'Later'
echo 'first' | attach 3 'Earlier'
echo \"Looks fine for $FR_NAME\"
exit $FR_PASS
";
        let (_temp, collection) = review_with_script(script);
        let record = collection.get("CheckFromScript").unwrap();
        assert_eq!(record.outcome, Outcome::Pass);
        let result = record.result.as_ref().unwrap();
        assert_eq!(result.note.as_deref(), Some("Looks fine for foo"));
        let headers: Vec<_> = result.attachments.iter().map(|a| a.header.as_str()).collect();
        assert_eq!(headers, vec!["Earlier", "Later"]);
    }

    #[test]
    fn pending_script_keeps_attachments_in_hint_order() {
        let script = "\
# @name: CheckNeedsEyes
echo 'build log excerpt' | attach 7 'Build log'
echo 'license list' | attach 3 'Licenses'
echo 'Please review the license breakdown'
exit $FR_PENDING
";
        let (_temp, collection) = review_with_script(script);
        let record = collection.get("CheckNeedsEyes").unwrap();
        assert_eq!(record.outcome, Outcome::Pending);
        assert_eq!(record.resolution, Resolution::Ran);
        let result = record.result.as_ref().unwrap();
        assert_eq!(
            result.note.as_deref(),
            Some("Please review the license breakdown")
        );
        let hints: Vec<_> = result.attachments.iter().map(|a| a.order_hint).collect();
        assert_eq!(hints, vec![3, 7]);
        assert_eq!(result.attachments[0].header, "Licenses");
        assert_eq!(result.attachments[1].text.trim(), "build log excerpt");
    }

    #[test]
    fn stderr_output_fails_the_run() {
        let (_temp, collection) = review_with_script("echo oops >&2\nexit $FR_PASS\n");
        let record = collection.get("check").unwrap();
        assert_eq!(record.outcome, Outcome::Pending);
        assert_eq!(
            record.result.as_ref().unwrap().note.as_deref(),
            Some("Test run failed")
        );
    }

    #[test]
    fn not_applicable_exit_code_maps_to_na() {
        let (_temp, collection) = review_with_script("exit $FR_NOT_APPLICABLE\n");
        assert!(collection.get("check").unwrap().is_na());
    }

    #[test]
    fn unknown_group_is_pending() {
        let (_temp, collection) = review_with_script("# @group: Haskell\nexit $FR_PASS\n");
        let record = collection.get("check").unwrap();
        assert_eq!(record.outcome, Outcome::Pending);
        assert_eq!(
            record.result.as_ref().unwrap().note.as_deref(),
            Some("Test run failed: illegal group")
        );
    }

    #[test]
    fn create_env_writes_env_file() {
        let (temp, collection) = review_with_script("exit $FR_FAIL\n");
        assert!(collection.get(CREATE_ENV).unwrap().is_na());
        assert!(collection.get("check").unwrap().is_failed());
        let env = fs::read_to_string(temp.path().join("review").join(ENV_FILE)).unwrap();
        assert!(env.contains("export FR_NAME='foo'"));
        assert!(env.contains("FR_FLAGS[EPEL5]=''"));
        assert!(env.contains("export FR_PASS=80"));
        assert!(temp.path().join("review").join(ATTACHMENT_DIR).is_dir());
    }

    #[test]
    fn script_flags_are_declared_and_set() {
        let script = "# @register-flag: NOMAN Skip man pages\n# @set-flag: NOMAN yes\nexit 80\n";
        let (_temp, collection) = review_with_script(script);
        assert_eq!(collection.flags().get("NOMAN"), Some("yes"));
    }

    #[test]
    fn registry_registers_env_check_first() {
        let registries = RegistrySet::new().with(Box::new(ScriptRegistry)).unwrap();
        let collection = CheckCollection::collect(env_for("name: foo"), registries).unwrap();
        assert_eq!(collection.checks().next().unwrap().name(), CREATE_ENV);
    }
}
