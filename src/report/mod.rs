//! Review reports.
//!
//! A [`Report`] is a snapshot of a finished run, built from a
//! [`CheckCollection`]. It renders as text for humans ([`text`]) or as
//! JSON for tooling ([`json`]).

pub mod json;
pub mod text;

pub use json::render_json;
pub use text::{render_text, wrap, write_text, INDENT, WIDTH};

use chrono::{DateTime, Utc};

use crate::check::CheckResult;
use crate::scheduler::{CheckCollection, RunSummary};

/// Name, version and release of the reviewed package.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
    pub release: String,
    pub nvr: String,
}

/// Results of one run, grouped for rendering.
#[derive(Debug)]
pub struct Report<'a> {
    pub package: PackageIdentity,
    pub generated: DateTime<Utc>,
    pub summary: RunSummary,
    /// Groups in registry order, results sorted by type then registration.
    pub groups: Vec<(String, Vec<&'a CheckResult>)>,
}

impl<'a> Report<'a> {
    pub fn from_collection(collection: &'a CheckCollection, generated: DateTime<Utc>) -> Self {
        let package = collection.env().package.as_ref();
        Self {
            package: PackageIdentity {
                name: package.name().to_string(),
                version: package.version().to_string(),
                release: package.release().to_string(),
                nvr: package.nvr(),
            },
            generated,
            summary: collection.summary(),
            groups: collection.results_by_group(),
        }
    }

    /// All results in report order.
    pub fn results(&self) -> impl Iterator<Item = &'a CheckResult> + '_ {
        self.groups.iter().flat_map(|(_, results)| results.iter().copied())
    }

    /// Failed results in report order.
    pub fn issues(&self) -> impl Iterator<Item = &'a CheckResult> + '_ {
        self.results()
            .filter(|r| r.state == crate::check::Outcome::Fail)
    }
}
