//! Check outcomes and the spellings accepted for them.
//!
//! Every executed check ends in exactly one [`Outcome`]. Checks (and the
//! adapters for external checks) may report their verdict as a boolean, a
//! string token, or a script sentinel code; [`OutcomeValue`] captures those
//! spellings and [`OutcomeValue::normalize`] folds them into the enum.

use serde::Serialize;
use tracing::warn;

/// Script exit code meaning pass.
pub const SCRIPT_PASS: i32 = 80;
/// Script exit code meaning fail.
pub const SCRIPT_FAIL: i32 = 81;
/// Script exit code meaning pending (manual review).
pub const SCRIPT_PENDING: i32 = 82;
/// Script exit code meaning not applicable.
pub const SCRIPT_NOT_APPLICABLE: i32 = 83;

/// Terminal state of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The package conforms.
    Pass,
    /// The package violates the guideline.
    Fail,
    /// Needs human judgment, or the check could not complete.
    Pending,
    /// The check does not apply to this package.
    NotApplicable,
}

impl Outcome {
    /// Report glyph for this outcome.
    pub fn glyph(&self) -> &'static str {
        match self {
            Outcome::Pass => "[x]",
            Outcome::Fail => "[!]",
            Outcome::Pending => "[ ]",
            Outcome::NotApplicable => "[-]",
        }
    }

    /// Whether the outcome counts in pass/fail statistics.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Outcome::NotApplicable)
    }

    /// Map a script sentinel exit code, if it is one.
    pub fn from_script_code(code: i32) -> Option<Self> {
        match code {
            SCRIPT_PASS => Some(Outcome::Pass),
            SCRIPT_FAIL => Some(Outcome::Fail),
            SCRIPT_PENDING => Some(Outcome::Pending),
            SCRIPT_NOT_APPLICABLE => Some(Outcome::NotApplicable),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Pending => "pending",
            Outcome::NotApplicable => "na",
        };
        write!(f, "{}", s)
    }
}

/// A verdict as spelled by a check, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeValue {
    Bool(bool),
    Token(String),
    Code(i32),
    Outcome(Outcome),
}

impl OutcomeValue {
    /// Fold the spelling into an [`Outcome`].
    ///
    /// Unrecognized spellings become [`Outcome::Fail`] and are logged.
    pub fn normalize(&self) -> Outcome {
        match self {
            OutcomeValue::Bool(true) => Outcome::Pass,
            OutcomeValue::Bool(false) => Outcome::Fail,
            OutcomeValue::Outcome(outcome) => *outcome,
            OutcomeValue::Token(token) => match token.trim().to_lowercase().as_str() {
                "pass" => Outcome::Pass,
                "fail" => Outcome::Fail,
                "pending" | "inconclusive" => Outcome::Pending,
                "na" | "not_applicable" => Outcome::NotApplicable,
                other => {
                    warn!("Illegal return code: {}", other);
                    Outcome::Fail
                }
            },
            OutcomeValue::Code(code) => Outcome::from_script_code(*code).unwrap_or_else(|| {
                warn!("Illegal return code: {}", code);
                Outcome::Fail
            }),
        }
    }
}

impl From<bool> for OutcomeValue {
    fn from(value: bool) -> Self {
        OutcomeValue::Bool(value)
    }
}

impl From<&str> for OutcomeValue {
    fn from(value: &str) -> Self {
        OutcomeValue::Token(value.to_string())
    }
}

impl From<String> for OutcomeValue {
    fn from(value: String) -> Self {
        OutcomeValue::Token(value)
    }
}

impl From<i32> for OutcomeValue {
    fn from(value: i32) -> Self {
        OutcomeValue::Code(value)
    }
}

impl From<Outcome> for OutcomeValue {
    fn from(value: Outcome) -> Self {
        OutcomeValue::Outcome(value)
    }
}
