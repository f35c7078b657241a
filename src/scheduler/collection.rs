//! The check collection: collect, order, execute, index.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use super::graph::DependencyGraph;
use super::record::{CheckRecord, Resolution, RunSummary};
use crate::check::{Attachment, Check, CheckResult, Outcome, Verdict, BUILD_COMPLETED};
use crate::config::ReviewSettings;
use crate::context::{ReviewContext, ReviewEnv};
use crate::error::{ReviewError, Result};
use crate::flags::Flags;
use crate::registry::RegistrySet;

/// Receives progress while checks execute.
pub trait RunObserver {
    /// Called before a check is resolved; `position` counts from 0.
    fn check_started(&mut self, _name: &str, _position: usize, _total: usize) {}

    /// Called once the check has its terminal state.
    fn check_finished(&mut self, _record: &CheckRecord) {}
}

impl RunObserver for () {}

#[derive(Debug, Default)]
struct RunState {
    gates: HashMap<String, bool>,
    gates_ready: bool,
    records: HashMap<String, CheckRecord>,
    outcomes: HashMap<String, Outcome>,
    sequence: usize,
}

/// All checks of a review, merged from every registry.
pub struct CheckCollection {
    env: ReviewEnv,
    registries: RegistrySet,
    /// Registration order; indices match the graph.
    checks: Vec<Box<dyn Check>>,
    graph: DependencyGraph,
    flags: Flags,
    state: RunState,
}

impl CheckCollection {
    /// Collect checks from all registries and validate the schedule.
    ///
    /// Fails before any check runs on duplicate names, unknown needs,
    /// dependency cycles, and flag overrides for undeclared flags.
    pub fn collect(env: ReviewEnv, registries: RegistrySet) -> Result<Self> {
        let mut flags = Flags::new();
        let mut checks: Vec<Box<dyn Check>> = Vec::new();
        let mut owners: HashMap<String, String> = HashMap::new();

        for registry in registries.iter() {
            let contributed = registry.register(&env, &mut flags)?;
            debug!(
                "Registry {} contributed {} check(s)",
                registry.group(),
                contributed.len()
            );
            for check in contributed {
                let name = check.name().to_string();
                if let Some(first) = owners.get(&name) {
                    return Err(ReviewError::DuplicateCheck {
                        name,
                        first: first.clone(),
                        second: registry.group().to_string(),
                    });
                }
                owners.insert(name, registry.group().to_string());
                checks.push(check);
            }
        }

        let excluded: HashSet<&str> = env.settings.exclude.iter().map(String::as_str).collect();
        for name in &excluded {
            if !owners.contains_key(*name) {
                warn!("Excluded check {} is not registered", name);
            }
        }
        checks.retain(|c| {
            let keep = !excluded.contains(c.name());
            if !keep {
                debug!("Excluding {}", c.name());
            }
            keep
        });

        let checkpoint = checks.iter().any(|c| c.name() == BUILD_COMPLETED);
        let mut builder = DependencyGraph::builder();
        for check in &checks {
            builder.push(check.name(), check.info().effective_needs(checkpoint));
        }
        let graph = builder.build()?;
        graph.topological_order()?;

        flags.apply_overrides(&env.settings.flags)?;

        info!("Collected {} checks", checks.len());
        Ok(Self {
            env,
            registries,
            checks,
            graph,
            flags,
            state: RunState::default(),
        })
    }

    pub fn env(&self) -> &ReviewEnv {
        &self.env
    }

    pub fn settings(&self) -> &ReviewSettings {
        &self.env.settings
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn registries(&self) -> &RegistrySet {
        &self.registries
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Checks in registration order.
    pub fn checks(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }

    pub fn check(&self, name: &str) -> Option<&dyn Check> {
        self.graph.index_of(name).map(|i| self.checks[i].as_ref())
    }

    /// Resolved needs of a check, default dependency included.
    pub fn needs_of(&self, name: &str) -> Option<Vec<&str>> {
        self.graph.dependencies_of(name)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.run_observed(&mut ())
    }

    pub fn run_observed(&mut self, observer: &mut dyn RunObserver) -> Result<RunSummary> {
        let all: HashSet<usize> = (0..self.checks.len()).collect();
        self.execute(&all, observer)
    }

    /// Run one check and, transitively, only what it needs.
    ///
    /// Checks keep their records: a later [`run`](Self::run) executes only
    /// the checks that have none yet.
    pub fn run_single(&mut self, name: &str) -> Result<RunSummary> {
        self.run_single_observed(name, &mut ())
    }

    pub fn run_single_observed(
        &mut self,
        name: &str,
        observer: &mut dyn RunObserver,
    ) -> Result<RunSummary> {
        let idx = self
            .graph
            .index_of(name)
            .ok_or_else(|| ReviewError::UnknownCheck {
                name: name.to_string(),
            })?;
        let mut subset = self.graph.transitive_dependencies(idx);
        subset.insert(idx);
        self.execute(&subset, observer)
    }

    /// Forget all run state so the collection can run again.
    pub fn reset(&mut self) {
        debug!("Resetting run state");
        self.state = RunState::default();
    }

    /// Whether every check has reached a terminal state.
    pub fn is_run(&self) -> bool {
        self.state.records.len() == self.checks.len()
    }

    /// Record of a check that reached a terminal state.
    pub fn get(&self, name: &str) -> Option<&CheckRecord> {
        self.state.records.get(name)
    }

    /// Records in execution order.
    pub fn records(&self) -> Vec<&CheckRecord> {
        let mut records: Vec<&CheckRecord> = self.state.records.values().collect();
        records.sort_by_key(|r| r.sequence);
        records
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_records(self.state.records.values())
    }

    /// Results grouped by group, groups in registry order.
    ///
    /// Within a group results sort by type, then registration order.
    /// NA checks have no result and are left out.
    pub fn results_by_group(&self) -> Vec<(String, Vec<&CheckResult>)> {
        let mut groups: Vec<String> = self
            .registries
            .groups()
            .into_iter()
            .map(str::to_string)
            .collect();
        for check in &self.checks {
            if !groups.contains(&check.info().group) {
                groups.push(check.info().group.clone());
            }
        }

        groups
            .into_iter()
            .filter_map(|group| {
                let mut results: Vec<(usize, &CheckResult)> = self
                    .state
                    .records
                    .values()
                    .filter_map(|r| r.result.as_ref())
                    .filter(|r| r.group == group)
                    .filter_map(|r| self.graph.index_of(&r.name).map(|i| (i, r)))
                    .collect();
                if results.is_empty() {
                    return None;
                }
                results.sort_by_key(|(idx, r)| (r.check_type, *idx));
                Some((group, results.into_iter().map(|(_, r)| r).collect()))
            })
            .collect()
    }

    /// All results in report order.
    pub fn results_in_report_order(&self) -> Vec<&CheckResult> {
        self.results_by_group()
            .into_iter()
            .flat_map(|(_, results)| results)
            .collect()
    }

    fn execute(
        &mut self,
        subset: &HashSet<usize>,
        observer: &mut dyn RunObserver,
    ) -> Result<RunSummary> {
        // Checks with a record keep it; only the rest of the subset runs.
        let pending: HashSet<usize> = subset
            .iter()
            .copied()
            .filter(|&idx| !self.state.records.contains_key(self.graph.name(idx)))
            .collect();
        if pending.is_empty() {
            warn!("Checks already run, reset before running again");
            return Ok(self.summary());
        }
        if pending.len() < subset.len() {
            debug!(
                "{} check(s) already have results",
                subset.len() - pending.len()
            );
        }

        let order = self.graph.topological_order_of(&pending)?;
        debug!(
            "Execution order: {}",
            order
                .iter()
                .map(|&i| self.graph.name(i))
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.ensure_gates();
        let applicable = self.resolve_applicability();
        let deprecated = self.resolve_deprecation(&applicable);

        let total = order.len();
        for (position, &idx) in order.iter().enumerate() {
            let name = self.checks[idx].name().to_string();
            observer.check_started(&name, position, total);

            let (outcome, note, attachments, resolution) = if !applicable[&idx] {
                debug!("{} is not applicable", name);
                (Outcome::NotApplicable, None, Vec::new(), Resolution::Inapplicable)
            } else if let Some(by) = deprecated.get(&idx) {
                debug!("{} is deprecated by {}", name, by);
                (
                    Outcome::NotApplicable,
                    None,
                    Vec::new(),
                    Resolution::DeprecatedBy(by.clone()),
                )
            } else if let Some(blocker) = self.blocking_need(idx) {
                warn!("{} not run: {} did not complete", name, blocker);
                (
                    Outcome::Pending,
                    Some(format!(
                        "Not run: required check '{}' did not complete",
                        blocker
                    )),
                    Vec::new(),
                    Resolution::Blocked(blocker),
                )
            } else {
                self.run_check(idx)
            };

            self.record(idx, outcome, note, attachments, resolution);
            if let Some(record) = self.state.records.get(&name) {
                observer.check_finished(record);
            }
        }

        Ok(self.summary())
    }

    fn ensure_gates(&mut self) {
        if self.state.gates_ready {
            return;
        }
        for registry in self.registries.iter() {
            let applicable = registry.is_applicable(&self.env);
            debug!("Group {} applicable: {}", registry.group(), applicable);
            self.state
                .gates
                .insert(registry.group().to_string(), applicable);
        }
        self.state.gates_ready = true;
    }

    fn context(&self) -> ReviewContext<'_> {
        ReviewContext::new(
            &self.env,
            &self.flags,
            &self.state.gates,
            &self.state.outcomes,
        )
    }

    /// Applicability of every check, so deprecations by checks outside a
    /// single-check run still apply.
    fn resolve_applicability(&self) -> HashMap<usize, bool> {
        let ctx = self.context();
        (0..self.checks.len())
            .map(|idx| {
                let check = &self.checks[idx];
                // An inapplicable group short-circuits the check's own predicate.
                let applicable = match ctx.group_applicable(&check.info().group) {
                    Some(false) => false,
                    _ => check.is_applicable(&ctx),
                };
                (idx, applicable)
            })
            .collect()
    }

    fn resolve_deprecation(&self, applicable: &HashMap<usize, bool>) -> HashMap<usize, String> {
        let mut suppressed: HashMap<usize, String> = HashMap::new();

        for idx in 0..self.checks.len() {
            if !applicable.get(&idx).copied().unwrap_or(false) {
                continue;
            }
            let check = &self.checks[idx];
            for victim in &check.info().deprecates {
                match self.graph.index_of(victim) {
                    Some(v) if v == idx => {
                        debug!("{} deprecates itself, ignored", victim);
                    }
                    Some(v) => {
                        suppressed
                            .entry(v)
                            .or_insert_with(|| check.name().to_string());
                    }
                    None => debug!(
                        "{} deprecates unknown check {}, ignored",
                        check.name(),
                        victim
                    ),
                }
            }
        }
        suppressed
    }

    fn blocking_need(&self, idx: usize) -> Option<String> {
        self.graph
            .dependency_indices(idx)
            .iter()
            .map(|&dep| self.graph.name(dep))
            .find(|dep| {
                self.state
                    .records
                    .get(*dep)
                    .is_some_and(|r| !r.resolution.completed())
            })
            .map(str::to_string)
    }

    fn run_check(&self, idx: usize) -> (Outcome, Option<String>, Vec<Attachment>, Resolution) {
        let check = &self.checks[idx];
        let ctx = self.context();
        let mut verdict = Verdict::new();

        debug!("Running {}", check.name());
        let result = panic::catch_unwind(AssertUnwindSafe(|| check.run(&ctx, &mut verdict)));

        match result {
            Ok(Ok(())) => match verdict.into_reported() {
                Some(reported) => (
                    reported.outcome,
                    reported.note,
                    reported.attachments,
                    Resolution::Ran,
                ),
                None => {
                    warn!("{} finished without reporting an outcome", check.name());
                    (
                        Outcome::Pending,
                        Some("Check finished without reporting an outcome".to_string()),
                        Vec::new(),
                        Resolution::Faulted,
                    )
                }
            },
            Ok(Err(e)) => {
                warn!("{} failed: {}", check.name(), e);
                (
                    Outcome::Pending,
                    Some(e.to_string()),
                    Vec::new(),
                    Resolution::Faulted,
                )
            }
            Err(payload) => {
                let message = panic_payload_to_string(payload.as_ref());
                warn!("{} panicked: {}", check.name(), message);
                (
                    Outcome::Pending,
                    Some(format!("Check panicked: {}", message)),
                    Vec::new(),
                    Resolution::Faulted,
                )
            }
        }
    }

    fn record(
        &mut self,
        idx: usize,
        outcome: Outcome,
        note: Option<String>,
        attachments: Vec<Attachment>,
        resolution: Resolution,
    ) {
        let info = self.checks[idx].info();
        let result = CheckResult::new(info, outcome, note.as_deref(), attachments);
        let record = CheckRecord {
            name: info.name.clone(),
            outcome,
            result,
            sequence: self.state.sequence,
            resolution,
        };
        debug!("{} -> {}", record.name, outcome);

        self.state.sequence += 1;
        self.state.outcomes.insert(record.name.clone(), outcome);
        self.state.records.insert(record.name.clone(), record);
    }
}

impl std::fmt::Debug for CheckCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckCollection")
            .field("checks", &self.checks.len())
            .field("registries", &self.registries)
            .field("is_run", &self.is_run())
            .finish()
    }
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
