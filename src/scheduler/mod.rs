//! Check scheduling and execution.
//!
//! [`CheckCollection`] merges the checks of all registries, orders them by
//! their `needs`, resolves applicability and deprecation, runs each check
//! at most once with fault isolation, and indexes the results.
//!
//! Checks run strictly sequentially: they share the build root, the review
//! directory and the result dir.

pub mod collection;
pub mod graph;
pub mod record;

pub use collection::{CheckCollection, RunObserver};
pub use graph::{DependencyGraph, DependencyGraphBuilder};
pub use record::{CheckRecord, Resolution, RunSummary};
