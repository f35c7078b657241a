//! Check results and the verdict recorder handed to running checks.

use serde::Serialize;
use tracing::warn;

use super::info::{CheckInfo, CheckType};
use super::outcome::{Outcome, OutcomeValue};

/// Highest (last-sorting) attachment order hint.
pub const MAX_ORDER_HINT: u8 = 10;

/// Text written after the result lines of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Short header, under 40 characters.
    pub header: String,
    /// Body, printed as-is.
    pub text: String,
    /// Sorting hint in `0..=10`, lower goes first.
    pub order_hint: u8,
}

impl Attachment {
    pub fn new(header: impl Into<String>, text: impl Into<String>, order_hint: u8) -> Self {
        Self {
            header: header.into(),
            text: text.into(),
            order_hint: order_hint.min(MAX_ORDER_HINT),
        }
    }
}

impl std::fmt::Display for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.header)?;
        writeln!(f, "{}", "-".repeat(self.header.chars().count()))?;
        write!(f, "{}", self.text)
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Immutable outcome record of one executed check.
///
/// Never holds [`Outcome::NotApplicable`]; an inapplicable check has no
/// result at all.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub group: String,
    #[serde(rename = "type")]
    pub check_type: CheckType,
    pub url: String,
    pub deprecates: Vec<String>,
    pub state: Outcome,
    /// Whitespace-normalized check text.
    pub text: String,
    /// Whitespace-normalized explanatory note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Attachments in report order.
    pub attachments: Vec<Attachment>,
}

impl CheckResult {
    /// Build a result for `info`. Returns `None` for NA.
    pub fn new(
        info: &CheckInfo,
        state: Outcome,
        note: Option<&str>,
        mut attachments: Vec<Attachment>,
    ) -> Option<Self> {
        if state == Outcome::NotApplicable {
            return None;
        }
        // Stable sort keeps insertion order among equal hints.
        attachments.sort_by_key(|a| a.order_hint);
        let note = note
            .map(normalize_whitespace)
            .filter(|n| !n.is_empty());
        Some(Self {
            name: info.name.clone(),
            group: info.group.clone(),
            check_type: info.check_type,
            url: info.url.clone(),
            deprecates: info.deprecates.clone(),
            state,
            text: normalize_whitespace(&info.text),
            note,
            attachments,
        })
    }
}

/// What a check reported through its [`Verdict`].
#[derive(Debug, Clone)]
pub struct Reported {
    pub outcome: Outcome,
    pub note: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Write-once outcome recorder passed to [`Check::run`](super::Check::run).
#[derive(Debug, Default)]
pub struct Verdict {
    reported: Option<Reported>,
}

impl Verdict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome without a note.
    pub fn set(&mut self, value: impl Into<OutcomeValue>) {
        self.record(value.into(), None, Vec::new());
    }

    /// Record the outcome with an explanatory note.
    pub fn set_with_note(&mut self, value: impl Into<OutcomeValue>, note: impl Into<String>) {
        self.record(value.into(), Some(note.into()), Vec::new());
    }

    /// Record the outcome with an optional note and attachments.
    pub fn set_full(
        &mut self,
        value: impl Into<OutcomeValue>,
        note: Option<String>,
        attachments: Vec<Attachment>,
    ) {
        self.record(value.into(), note, attachments);
    }

    fn record(&mut self, value: OutcomeValue, note: Option<String>, attachments: Vec<Attachment>) {
        let outcome = value.normalize();
        if let Some(previous) = &self.reported {
            warn!(
                "Outcome already set to {}, ignoring {}",
                previous.outcome, outcome
            );
            return;
        }
        self.reported = Some(Reported {
            outcome,
            note,
            attachments,
        });
    }

    /// Whether an outcome has been recorded.
    pub fn is_set(&self) -> bool {
        self.reported.is_some()
    }

    /// The recorded outcome, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        self.reported.as_ref().map(|r| r.outcome)
    }

    pub fn into_reported(self) -> Option<Reported> {
        self.reported
    }
}
