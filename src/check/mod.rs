//! The check contract.
//!
//! A check is a named, self-describing test of one packaging property:
//!
//! - [`CheckInfo`] - Static metadata (group, type, text, needs, deprecates)
//! - [`Check`] - The trait every check variant implements
//! - [`Verdict`] - Write-once recorder the check reports its outcome through
//! - [`CheckResult`] - Immutable record of an executed check
//! - [`Outcome`] - The four terminal states
//!
//! # Example
//!
//! ```
//! use pkgreview::check::{Check, CheckInfo, Verdict};
//! use pkgreview::context::ReviewContext;
//!
//! struct AlwaysPasses(CheckInfo);
//!
//! impl Check for AlwaysPasses {
//!     fn info(&self) -> &CheckInfo {
//!         &self.0
//!     }
//!
//!     fn run_on_applicable(
//!         &self,
//!         _ctx: &ReviewContext<'_>,
//!         verdict: &mut Verdict,
//!     ) -> pkgreview::Result<()> {
//!         verdict.set(true);
//!         Ok(())
//!     }
//! }
//!
//! let check = AlwaysPasses(CheckInfo::new("CheckAlwaysPasses", "Generic"));
//! assert_eq!(check.name(), "CheckAlwaysPasses");
//! ```

pub mod info;
pub mod outcome;
pub mod result;

pub use info::{CheckInfo, CheckType, Implementation, BUILD_COMPLETED, NO_URL};
pub use outcome::{
    Outcome, OutcomeValue, SCRIPT_FAIL, SCRIPT_NOT_APPLICABLE, SCRIPT_PASS, SCRIPT_PENDING,
};
pub use result::{normalize_whitespace, Attachment, CheckResult, Reported, Verdict};

use crate::context::ReviewContext;
use crate::error::Result;

/// A single review check.
///
/// Checks are immutable; their run state lives in the scheduler. `run` is
/// called at most once per review and must record an outcome through the
/// verdict before returning `Ok`. Returning `Err` (or panicking) is treated
/// as a fault and recorded as pending.
pub trait Check {
    /// Static metadata.
    fn info(&self) -> &CheckInfo;

    /// Unique check name.
    fn name(&self) -> &str {
        &self.info().name
    }

    /// Whether the check applies to the package under review.
    ///
    /// Defaults to the applicability of the check's group. Must be pure.
    fn is_applicable(&self, ctx: &ReviewContext<'_>) -> bool {
        ctx.group_applicable(&self.info().group).unwrap_or(true)
    }

    /// Perform the check.
    fn run(&self, ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        if self.is_applicable(ctx) {
            self.run_on_applicable(ctx, verdict)
        } else {
            verdict.set(Outcome::NotApplicable);
            Ok(())
        }
    }

    /// Check logic for an applicable package. Defaults to a manual check.
    fn run_on_applicable(&self, _ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        verdict.set(Outcome::Pending);
        Ok(())
    }
}

impl std::fmt::Debug for dyn Check + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.info().name)
            .field("group", &self.info().group)
            .finish()
    }
}
