//! JSON report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{PackageIdentity, Report};
use crate::check::CheckResult;
use crate::error::{ReviewError, Result};
use crate::scheduler::RunSummary;

#[derive(Serialize)]
struct JsonReport<'r> {
    package: &'r PackageIdentity,
    generated: DateTime<Utc>,
    summary: &'r RunSummary,
    results: Vec<&'r CheckResult>,
}

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &Report<'_>) -> Result<String> {
    let json = JsonReport {
        package: &report.package,
        generated: report.generated,
        summary: &report.summary,
        results: report.results().collect(),
    };
    serde_json::to_string_pretty(&json).map_err(|e| ReviewError::Other(e.into()))
}
