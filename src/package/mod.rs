//! Package metadata consumed by checks.
//!
//! Parsing real spec files and RPM headers happens outside this crate.
//! Checks see the package only through the read-only [`PackageMetadata`]
//! trait; [`PackageInfo`] is a serde-loadable implementation.

mod info;

pub use info::{PackageInfo, Subpackage};

use std::collections::BTreeMap;

use regex::Regex;

/// Read-only view of the package under review.
pub trait PackageMetadata {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn release(&self) -> &str;

    /// All values of a header tag (e.g. `BuildRoot`), matched case-insensitively.
    fn tag(&self, tag: &str) -> Vec<String>;

    /// All tags with their values.
    fn tags(&self) -> BTreeMap<String, Vec<String>>;

    fn build_requires(&self) -> Vec<String>;

    /// Requires of a subpackage, or of the base package when `None`.
    fn requires(&self, package: Option<&str>) -> Vec<String>;

    /// Names of all binary packages, base package first.
    fn packages(&self) -> Vec<String>;

    /// Files shipped by one binary package.
    fn files(&self, package: &str) -> Vec<String>;

    /// Sections whose header starts with `prefix` (e.g. `%post`), keyed
    /// by full header.
    fn section(&self, prefix: &str) -> BTreeMap<String, Vec<String>>;

    /// Names of all sections in file order.
    fn section_names(&self) -> Vec<String>;

    /// Files contained in the unpacked sources.
    fn source_files(&self) -> Vec<String>;

    /// `name-version-release`.
    fn nvr(&self) -> String {
        format!("{}-{}-{}", self.name(), self.version(), self.release())
    }

    /// Files matching a glob, keyed by package. Packages without matches
    /// are left out.
    fn files_by_pattern(&self, pattern: &str) -> BTreeMap<String, Vec<String>> {
        match glob_to_regex(pattern) {
            Some(re) => self.files_by_regex(&re),
            None => BTreeMap::new(),
        }
    }

    /// Files matching a regex, keyed by package.
    fn files_by_regex(&self, re: &Regex) -> BTreeMap<String, Vec<String>> {
        self.packages()
            .into_iter()
            .filter_map(|pkg| {
                let matches: Vec<String> = self
                    .files(&pkg)
                    .into_iter()
                    .filter(|f| re.is_match(f))
                    .collect();
                (!matches.is_empty()).then_some((pkg, matches))
            })
            .collect()
    }

    /// Whether any package ships a file matching the glob.
    fn has_files(&self, pattern: &str) -> bool {
        !self.files_by_pattern(pattern).is_empty()
    }

    /// Whether any package ships a file matching the regex.
    fn has_files_re(&self, pattern: &str) -> bool {
        Regex::new(pattern)
            .map(|re| !self.files_by_regex(&re).is_empty())
            .unwrap_or(false)
    }

    /// Whether the sources contain a file matching the glob.
    fn sources_have_files(&self, pattern: &str) -> bool {
        match glob_to_regex(pattern) {
            Some(re) => self.source_files().iter().any(|f| re.is_match(f)),
            None => false,
        }
    }
}

/// Translate a shell glob into an anchored regex.
///
/// `*` matches any run of characters including `/`, `?` any single one.
pub fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_star_crosses_directories() {
        let re = glob_to_regex("*.h").unwrap();
        assert!(re.is_match("/usr/include/foo/bar.h"));
        assert!(!re.is_match("/usr/include/foo.hpp"));
    }

    #[test]
    fn glob_escapes_regex_metacharacters() {
        let re = glob_to_regex("lib+.so.?").unwrap();
        assert!(re.is_match("lib+.so.1"));
        assert!(!re.is_match("libb.so.1"));
    }

    #[test]
    fn glob_is_case_sensitive() {
        let re = glob_to_regex("*.C").unwrap();
        assert!(re.is_match("src/main.C"));
        assert!(!re.is_match("src/main.c"));
    }
}
