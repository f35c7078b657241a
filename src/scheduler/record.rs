//! Per-check run records and run summaries.

use serde::Serialize;

use crate::check::{CheckResult, Outcome};

/// How a check reached its terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "by", rename_all = "snake_case")]
pub enum Resolution {
    /// The check's `run` completed and reported an outcome.
    Ran,
    /// The check (or its group) does not apply; never run.
    Inapplicable,
    /// Suppressed by an applicable check that supersedes it.
    DeprecatedBy(String),
    /// A needed check did not complete; never run.
    Blocked(String),
    /// `run` failed, panicked, or returned without an outcome.
    Faulted,
}

impl Resolution {
    /// Whether dependents of this check may still run.
    pub fn completed(&self) -> bool {
        !matches!(self, Resolution::Blocked(_) | Resolution::Faulted)
    }
}

/// Terminal state of one check in a run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRecord {
    pub name: String,
    pub outcome: Outcome,
    /// `None` iff the outcome is NA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CheckResult>,
    /// Position in the run, starting at 0.
    pub sequence: usize,
    pub resolution: Resolution,
}

impl CheckRecord {
    pub fn is_passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    pub fn is_failed(&self) -> bool {
        self.outcome == Outcome::Fail
    }

    pub fn is_pending(&self) -> bool {
        self.outcome == Outcome::Pending
    }

    pub fn is_na(&self) -> bool {
        self.outcome == Outcome::NotApplicable
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub not_applicable: usize,
    /// Check names in execution order.
    pub order: Vec<String>,
}

impl RunSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CheckRecord>) -> Self {
        let mut records: Vec<&CheckRecord> = records.into_iter().collect();
        records.sort_by_key(|r| r.sequence);

        let mut summary = RunSummary::default();
        for record in records {
            match record.outcome {
                Outcome::Pass => summary.passed += 1,
                Outcome::Fail => summary.failed += 1,
                Outcome::Pending => summary.pending += 1,
                Outcome::NotApplicable => summary.not_applicable += 1,
            }
            summary.order.push(record.name.clone());
        }
        summary
    }

    /// Checks that count in pass/fail statistics.
    pub fn reportable(&self) -> usize {
        self.passed + self.failed + self.pending
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
