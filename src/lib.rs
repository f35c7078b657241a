//! pkgreview - Package review assistant.
//!
//! pkgreview runs packaging-guideline checks against a package description
//! and its build, and renders a review report. Checks come from registries
//! (native Rust checks, shell scripts and YAML definitions), are ordered by
//! what they need, run once each, and never bring the review down when one
//! of them faults.
//!
//! # Modules
//!
//! - [`check`] - The check contract, outcomes and results
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings loading and merging
//! - [`context`] - The review environment handed to checks
//! - [`error`] - Error types and result aliases
//! - [`flags`] - User-overridable flags declared by checks
//! - [`package`] - Package metadata
//! - [`plugins`] - Built-in registries and their checks
//! - [`registry`] - Registry trait and registry sets
//! - [`report`] - Text and JSON reports
//! - [`scheduler`] - Ordering and running checks
//! - [`tools`] - Build and lint tool integration
//! - [`ui`] - Terminal output and run progress
//!
//! # Example
//!
//! ```
//! use pkgreview::check::Outcome;
//! use pkgreview::config::ReviewSettings;
//! use pkgreview::context::ReviewEnv;
//! use pkgreview::package::PackageInfo;
//! use pkgreview::registry::RegistrySet;
//! use pkgreview::plugins::generic::GenericRegistry;
//! use pkgreview::scheduler::CheckCollection;
//! use pkgreview::tools::{FakeBuilder, FakeLinter};
//!
//! let env = ReviewEnv::new(
//!     ReviewSettings::default(),
//!     Box::new(PackageInfo::parse("name: foo").unwrap()),
//!     Box::new(FakeBuilder::new("/tmp/results")),
//!     Box::new(FakeLinter::clean()),
//! );
//! let registries = RegistrySet::new().with(Box::new(GenericRegistry)).unwrap();
//!
//! let mut collection = CheckCollection::collect(env, registries).unwrap();
//! let summary = collection.run().unwrap();
//! assert_eq!(summary.passed, 1);
//! assert_eq!(collection.get("CheckBuildroot").unwrap().outcome, Outcome::Pass);
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod flags;
pub mod package;
pub mod plugins;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod tools;
pub mod ui;

pub use error::{ReviewError, Result};
