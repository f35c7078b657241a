//! Checks defined declaratively in YAML.
//!
//! A definition file holds one check or a list of checks:
//!
//! ```yaml
//! name: CheckDesktopFile
//! type: SHOULD
//! text: Desktop files are installed with desktop-file-install.
//! rule:
//!   files_present: /usr/share/applications/*.desktop
//! ```
//!
//! Built-in definitions are embedded from `data/checks`; more are loaded
//! from the configured data dirs.

use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::check::{Check, CheckInfo, CheckType, Implementation, Outcome, Verdict};
use crate::context::{ReviewContext, ReviewEnv};
use crate::error::{ReviewError, Result};
use crate::flags::Flags;
use crate::registry::Registry;

pub const GROUP: &str = "Data";

static BUILTIN_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/data/checks");

/// How a data check decides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Pass if no packaged file matches the glob, fail listing the matches.
    FilesAbsent(String),
    /// Not applicable without a matching file, pending review otherwise.
    FilesPresent(String),
    /// Pass if a section line or tag value matches the regex.
    SpecMatches(String),
    /// Pass if the base package requires the named capability.
    Requires(String),
    /// Always pending.
    Manual,
}

/// One check definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DataCheckDefinition {
    /// Unique check name.
    pub name: String,

    /// Group binding the check to a registry.
    #[serde(default = "default_group")]
    pub group: String,

    #[serde(default, rename = "type")]
    pub check_type: CheckType,

    /// One-line report text; defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Checks that must run first; omitted means after the build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deprecates: Vec<String>,

    #[serde(default = "default_true")]
    pub automatic: bool,

    pub rule: Rule,
}

fn default_group() -> String {
    super::generic::GROUP.to_string()
}

fn default_true() -> bool {
    true
}

/// A definition file: one check or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DefinitionFile {
    One(DataCheckDefinition),
    Many(Vec<DataCheckDefinition>),
}

impl DefinitionFile {
    fn into_vec(self) -> Vec<DataCheckDefinition> {
        match self {
            DefinitionFile::One(def) => vec![def],
            DefinitionFile::Many(defs) => defs,
        }
    }
}

/// JSON schema of the definition format.
pub fn definition_schema() -> schemars::Schema {
    schemars::schema_for!(DataCheckDefinition)
}

/// Parse definitions from YAML text.
pub fn parse_definitions(content: &str, path: &Path) -> Result<Vec<DataCheckDefinition>> {
    let file: DefinitionFile =
        serde_yaml::from_str(content).map_err(|e| ReviewError::CheckDefinitionError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(file.into_vec())
}

/// Definitions shipped with the binary, in file name order.
pub fn builtin_definitions() -> Result<Vec<(PathBuf, DataCheckDefinition)>> {
    let mut files: Vec<_> = BUILTIN_DIR.files().filter(|f| is_definition(f.path())).collect();
    files.sort_by(|a, b| a.path().cmp(b.path()));

    let mut defs = Vec::new();
    for file in files {
        let path = Path::new("data/checks").join(file.path());
        let content = file
            .contents_utf8()
            .ok_or_else(|| ReviewError::CheckDefinitionError {
                path: path.clone(),
                message: "Invalid UTF-8".to_string(),
            })?;
        for def in parse_definitions(content, &path)? {
            defs.push((path.clone(), def));
        }
    }
    Ok(defs)
}

/// Definitions from data dirs, dir by dir, in file name order.
pub fn load_definitions(dirs: &[PathBuf]) -> Result<Vec<(PathBuf, DataCheckDefinition)>> {
    let mut defs = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            debug!("Skipping missing data dir {}", dir.display());
            continue;
        }
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_definition(p))
            .collect();
        files.sort();
        for path in files {
            let content = fs::read_to_string(&path)?;
            for def in parse_definitions(&content, &path)? {
                defs.push((path.clone(), def));
            }
        }
    }
    Ok(defs)
}

fn is_definition(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yml" || ext == "yaml")
}

/// Registers built-in and user data checks.
pub struct DataRegistry;

impl Registry for DataRegistry {
    fn group(&self) -> &str {
        GROUP
    }

    fn is_applicable(&self, _env: &ReviewEnv) -> bool {
        true
    }

    fn register(&self, env: &ReviewEnv, _flags: &mut Flags) -> Result<Vec<Box<dyn Check>>> {
        let mut defs = Vec::new();
        if env.settings.builtin_data_checks {
            defs.extend(builtin_definitions()?);
        }
        defs.extend(load_definitions(&env.settings.data_dirs)?);

        defs.into_iter()
            .map(|(path, def)| DataCheck::new(def, &path).map(|c| Box::new(c) as Box<dyn Check>))
            .collect()
    }
}

/// Compiled form of a [`Rule`].
#[derive(Debug)]
enum CompiledRule {
    FilesAbsent(String),
    FilesPresent(String),
    SpecMatches(Regex),
    Requires(String),
    Manual,
}

/// A check backed by a YAML definition.
#[derive(Debug)]
pub struct DataCheck {
    info: CheckInfo,
    rule: CompiledRule,
}

impl DataCheck {
    pub fn new(def: DataCheckDefinition, path: &Path) -> Result<Self> {
        let rule = match def.rule {
            Rule::FilesAbsent(glob) => CompiledRule::FilesAbsent(glob),
            Rule::FilesPresent(glob) => CompiledRule::FilesPresent(glob),
            Rule::SpecMatches(pattern) => {
                CompiledRule::SpecMatches(Regex::new(&pattern).map_err(|e| {
                    ReviewError::CheckDefinitionError {
                        path: path.to_path_buf(),
                        message: format!("{}: {}", def.name, e),
                    }
                })?)
            }
            Rule::Requires(name) => CompiledRule::Requires(name),
            Rule::Manual => CompiledRule::Manual,
        };

        let mut info = CheckInfo::new(def.name, def.group)
            .with_type(def.check_type)
            .with_deprecates(def.deprecates)
            .automatic(def.automatic && !matches!(rule, CompiledRule::Manual))
            .with_implementation(Implementation::Data)
            .defined_in(path.display().to_string());
        if let Some(text) = def.text {
            info = info.with_text(text);
        }
        if let Some(url) = def.url {
            info = info.with_url(url);
        }
        if let Some(needs) = def.needs {
            info = info.with_needs(needs);
        }
        Ok(Self { info, rule })
    }
}

impl Check for DataCheck {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn run_on_applicable(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        let package = ctx.package();
        match &self.rule {
            CompiledRule::FilesAbsent(glob) => {
                let found = package.files_by_pattern(glob);
                if found.is_empty() {
                    verdict.set(true);
                } else {
                    let lines: Vec<String> = found
                        .iter()
                        .flat_map(|(pkg, paths)| paths.iter().map(move |p| format!("{} : {}", pkg, p)))
                        .collect();
                    verdict.set_with_note(false, lines.join("\n"));
                }
            }
            CompiledRule::FilesPresent(glob) => {
                if package.has_files(glob) {
                    verdict.set(Outcome::Pending);
                } else {
                    verdict.set(Outcome::NotApplicable);
                }
            }
            CompiledRule::SpecMatches(re) => {
                let in_sections = package
                    .section_names()
                    .iter()
                    .flat_map(|header| package.section(header).into_values())
                    .flatten()
                    .any(|line| re.is_match(&line));
                let in_tags = package
                    .tags()
                    .values()
                    .flatten()
                    .any(|value| re.is_match(value));
                verdict.set(in_sections || in_tags);
            }
            CompiledRule::Requires(name) => {
                verdict.set(package.requires(None).iter().any(|r| r == name));
            }
            CompiledRule::Manual => verdict.set(Outcome::Pending),
        }
        Ok(())
    }
}
