//! Static description of a check.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Name of the checkpoint check every check needs by default.
pub const BUILD_COMPLETED: &str = "CheckBuildCompleted";

/// URL shown for checks that do not declare one.
pub const NO_URL: &str = "(this test has no URL)";

/// Severity classification of a check.
///
/// Ordering follows report order: `Must` sorts first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckType {
    #[default]
    Must,
    Should,
    Extra,
    Undefined,
}

impl std::fmt::Display for CheckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckType::Must => "MUST",
            CheckType::Should => "SHOULD",
            CheckType::Extra => "EXTRA",
            CheckType::Undefined => "UNDEFINED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CheckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MUST" => Ok(Self::Must),
            "SHOULD" => Ok(Self::Should),
            "EXTRA" => Ok(Self::Extra),
            "UNDEFINED" => Ok(Self::Undefined),
            _ => Err(format!("unknown check type: {}", s)),
        }
    }
}

/// How a check is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    Native,
    Script,
    Data,
}

/// Metadata shared by all check variants.
#[derive(Debug, Clone)]
pub struct CheckInfo {
    /// Unique name across the whole review.
    pub name: String,
    /// Group binding the check to a registry.
    pub group: String,
    pub check_type: CheckType,
    /// One-line text shown in the report.
    pub text: String,
    pub description: String,
    pub url: String,
    /// `None` means the default dependency on [`BUILD_COMPLETED`].
    pub needs: Option<Vec<String>>,
    pub deprecates: Vec<String>,
    /// Whether the check can decide without a human.
    pub automatic: bool,
    pub implementation: Implementation,
    /// File or module the check comes from.
    pub defined_in: String,
}

impl CheckInfo {
    /// Create metadata with defaults for a native check.
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            text: name.clone(),
            name,
            group: group.into(),
            check_type: CheckType::Must,
            description: "This test has no description".to_string(),
            url: NO_URL.to_string(),
            needs: None,
            deprecates: Vec::new(),
            automatic: false,
            implementation: Implementation::Native,
            defined_in: String::new(),
        }
    }

    pub fn with_type(mut self, check_type: CheckType) -> Self {
        self.check_type = check_type;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declare explicit needs, replacing the default dependency.
    pub fn with_needs<I, S>(mut self, needs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs = Some(needs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_deprecates<I, S>(mut self, deprecates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deprecates = deprecates.into_iter().map(Into::into).collect();
        self
    }

    pub fn automatic(mut self, automatic: bool) -> Self {
        self.automatic = automatic;
        self
    }

    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementation = implementation;
        self
    }

    pub fn defined_in(mut self, source: impl Into<String>) -> Self {
        self.defined_in = source.into();
        self
    }

    /// Needs after applying the default dependency.
    ///
    /// The default only applies when the checkpoint is registered, and
    /// never to the checkpoint itself.
    pub fn effective_needs(&self, checkpoint_registered: bool) -> Vec<String> {
        match &self.needs {
            Some(needs) => needs.clone(),
            None if checkpoint_registered && self.name != BUILD_COMPLETED => {
                vec![BUILD_COMPLETED.to_string()]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_type_orders_by_severity() {
        assert!(CheckType::Must < CheckType::Should);
        assert!(CheckType::Should < CheckType::Extra);
        assert!(CheckType::Extra < CheckType::Undefined);
    }

    #[test]
    fn check_type_parses_any_case() {
        assert_eq!("should".parse::<CheckType>().unwrap(), CheckType::Should);
        assert_eq!(" EXTRA ".parse::<CheckType>().unwrap(), CheckType::Extra);
        assert!("sometimes".parse::<CheckType>().is_err());
    }

    #[test]
    fn new_info_has_defaults() {
        let info = CheckInfo::new("CheckFoo", "Generic");
        assert_eq!(info.text, "CheckFoo");
        assert_eq!(info.url, NO_URL);
        assert_eq!(info.check_type, CheckType::Must);
        assert!(info.needs.is_none());
    }

    #[test]
    fn default_needs_point_at_checkpoint() {
        let info = CheckInfo::new("CheckFoo", "Generic");
        assert_eq!(info.effective_needs(true), vec![BUILD_COMPLETED.to_string()]);
        assert!(info.effective_needs(false).is_empty());
    }

    #[test]
    fn explicit_empty_needs_are_kept() {
        let info = CheckInfo::new("CheckFoo", "Generic").with_needs(Vec::<String>::new());
        assert!(info.effective_needs(true).is_empty());
    }

    #[test]
    fn checkpoint_does_not_need_itself() {
        let info = CheckInfo::new(BUILD_COMPLETED, "Setup");
        assert!(info.effective_needs(true).is_empty());
    }
}
