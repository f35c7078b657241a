//! Integration tests for the scheduler public API.

use std::cell::RefCell;
use std::rc::Rc;

use pkgreview::check::{Check, CheckInfo, Outcome, Verdict, BUILD_COMPLETED};
use pkgreview::config::ReviewSettings;
use pkgreview::context::{ReviewContext, ReviewEnv};
use pkgreview::flags::Flags;
use pkgreview::package::PackageInfo;
use pkgreview::registry::{Registry, RegistrySet};
use pkgreview::scheduler::{CheckCollection, Resolution};
use pkgreview::tools::{FakeBuilder, FakeLinter};
use pkgreview::{ReviewError, Result};

type RunLog = Rc<RefCell<Vec<String>>>;

#[derive(Clone)]
enum Behavior {
    Report(&'static str),
    Error,
    Panic,
    Silent,
    Inapplicable,
}

struct TestCheck {
    info: CheckInfo,
    behavior: Behavior,
    log: RunLog,
}

impl Check for TestCheck {
    fn info(&self) -> &CheckInfo {
        &self.info
    }

    fn is_applicable(&self, _ctx: &ReviewContext<'_>) -> bool {
        !matches!(self.behavior, Behavior::Inapplicable)
    }

    fn run_on_applicable(&self, _ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> Result<()> {
        self.log.borrow_mut().push(self.info.name.clone());
        match &self.behavior {
            Behavior::Report(value) => verdict.set(*value),
            Behavior::Error => {
                return Err(ReviewError::CheckFault {
                    check: self.info.name.clone(),
                    message: "tool exploded".to_string(),
                })
            }
            Behavior::Panic => panic!("check bug"),
            Behavior::Silent | Behavior::Inapplicable => {}
        }
        Ok(())
    }
}

struct TestRegistry {
    group: &'static str,
    applicable: bool,
    checks: Vec<(CheckInfo, Behavior)>,
    flags: Vec<&'static str>,
    log: RunLog,
}

impl TestRegistry {
    fn new(group: &'static str, log: &RunLog) -> Self {
        Self {
            group,
            applicable: true,
            checks: Vec::new(),
            flags: Vec::new(),
            log: Rc::clone(log),
        }
    }

    fn inapplicable(mut self) -> Self {
        self.applicable = false;
        self
    }

    fn flag(mut self, name: &'static str) -> Self {
        self.flags.push(name);
        self
    }

    fn check(mut self, name: &str, needs: &[&str], behavior: Behavior) -> Self {
        let info = CheckInfo::new(name, self.group).with_needs(needs.iter().copied());
        self.checks.push((info, behavior));
        self
    }

    fn check_info(mut self, info: CheckInfo, behavior: Behavior) -> Self {
        self.checks.push((info, behavior));
        self
    }
}

impl Registry for TestRegistry {
    fn group(&self) -> &str {
        self.group
    }

    fn is_applicable(&self, _env: &ReviewEnv) -> bool {
        self.applicable
    }

    fn register(&self, _env: &ReviewEnv, flags: &mut Flags) -> Result<Vec<Box<dyn Check>>> {
        for flag in &self.flags {
            flags.declare(*flag, format!("Test flag {}", flag), "tests")?;
        }
        Ok(self
            .checks
            .iter()
            .map(|(info, behavior)| {
                Box::new(TestCheck {
                    info: info.clone(),
                    behavior: behavior.clone(),
                    log: Rc::clone(&self.log),
                }) as Box<dyn Check>
            })
            .collect())
    }
}

fn env(settings: ReviewSettings) -> ReviewEnv {
    ReviewEnv::new(
        settings,
        Box::new(PackageInfo::parse("name: foo\nversion: '1.0'\nrelease: '1'").unwrap()),
        Box::new(FakeBuilder::new("/nonexistent/results")),
        Box::new(FakeLinter::clean()),
    )
}

fn collect_with(
    settings: ReviewSettings,
    registries: Vec<TestRegistry>,
) -> Result<CheckCollection> {
    let mut set = RegistrySet::new();
    for registry in registries {
        set.add(Box::new(registry))?;
    }
    CheckCollection::collect(env(settings), set)
}

fn collect(registries: Vec<TestRegistry>) -> Result<CheckCollection> {
    collect_with(ReviewSettings::default(), registries)
}

fn new_log() -> RunLog {
    Rc::new(RefCell::new(Vec::new()))
}

fn note_of(collection: &CheckCollection, name: &str) -> Option<String> {
    collection
        .get(name)
        .and_then(|r| r.result.as_ref())
        .and_then(|r| r.note.clone())
}

#[test]
fn needs_run_first_and_independent_checks_keep_registration_order() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckC", &[], Behavior::Report("pass"))
        .check("CheckA", &["CheckB"], Behavior::Report("pass"))
        .check("CheckB", &[], Behavior::Report("pass"))
        .check("CheckD", &[], Behavior::Report("pass"));
    let mut collection = collect(vec![registry]).unwrap();

    let summary = collection.run().unwrap();

    assert_eq!(summary.order, vec!["CheckC", "CheckB", "CheckA", "CheckD"]);
    assert_eq!(*log.borrow(), summary.order);
    assert_eq!(summary.passed, 4);
}

#[test]
fn scheduling_is_deterministic() {
    let orders: Vec<Vec<String>> = (0..3)
        .map(|_| {
            let log = new_log();
            let registry = TestRegistry::new("Generic", &log)
                .check("CheckZ", &[], Behavior::Report("pass"))
                .check("CheckY", &["CheckZ"], Behavior::Report("pass"))
                .check("CheckX", &[], Behavior::Report("fail"))
                .check("CheckW", &["CheckX", "CheckY"], Behavior::Report("pass"));
            let mut collection = collect(vec![registry]).unwrap();
            collection.run().unwrap().order
        })
        .collect();
    assert_eq!(orders[0], orders[1]);
    assert_eq!(orders[1], orders[2]);
}

#[test]
fn duplicate_names_across_groups_are_rejected() {
    let log = new_log();
    let err = collect(vec![
        TestRegistry::new("Generic", &log).check("CheckSame", &[], Behavior::Report("pass")),
        TestRegistry::new("PHP", &log).check("CheckSame", &[], Behavior::Report("pass")),
    ])
    .unwrap_err();
    assert!(
        matches!(err, ReviewError::DuplicateCheck { ref name, ref first, ref second }
            if name == "CheckSame" && first == "Generic" && second == "PHP")
    );
    assert!(err.is_configuration_error());
}

#[test]
fn dependency_cycle_is_rejected_before_running() {
    let log = new_log();
    let err = collect(vec![TestRegistry::new("Generic", &log)
        .check("CheckA", &["CheckB"], Behavior::Report("pass"))
        .check("CheckB", &["CheckA"], Behavior::Report("pass"))])
    .unwrap_err();
    assert!(matches!(err, ReviewError::CircularDependency { .. }));
    assert!(log.borrow().is_empty());
}

#[test]
fn unknown_need_is_rejected() {
    let log = new_log();
    let err = collect(vec![TestRegistry::new("Generic", &log).check(
        "CheckA",
        &["CheckMissing"],
        Behavior::Report("pass"),
    )])
    .unwrap_err();
    assert!(
        matches!(err, ReviewError::UnknownDependency { ref check, ref needed }
            if check == "CheckA" && needed == "CheckMissing")
    );
}

#[test]
fn override_for_undeclared_flag_is_rejected() {
    let log = new_log();
    let mut settings = ReviewSettings::default();
    settings.flags.insert("EPEL9".to_string(), "1".to_string());
    let err = collect_with(
        settings,
        vec![TestRegistry::new("Generic", &log)
            .flag("EPEL5")
            .check("CheckA", &[], Behavior::Report("pass"))],
    )
    .unwrap_err();
    assert!(matches!(err, ReviewError::UnknownFlag { name } if name == "EPEL9"));
}

#[test]
fn override_for_declared_flag_is_applied() {
    let log = new_log();
    let mut settings = ReviewSettings::default();
    settings.flags.insert("EPEL5".to_string(), "yes".to_string());
    let collection = collect_with(
        settings,
        vec![TestRegistry::new("Generic", &log).flag("EPEL5")],
    )
    .unwrap();
    assert_eq!(collection.flags().get("EPEL5"), Some("yes"));
}

#[test]
fn applicable_check_suppresses_what_it_deprecates() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckOld", &[], Behavior::Report("fail"))
        .check_info(
            CheckInfo::new("CheckNew", "Generic")
                .with_needs(Vec::<String>::new())
                .with_deprecates(["CheckOld"]),
            Behavior::Report("pass"),
        );
    let mut collection = collect(vec![registry]).unwrap();
    collection.run().unwrap();

    let old = collection.get("CheckOld").unwrap();
    assert_eq!(old.outcome, Outcome::NotApplicable);
    assert_eq!(old.resolution, Resolution::DeprecatedBy("CheckNew".to_string()));
    assert!(old.result.is_none());
    assert_eq!(*log.borrow(), vec!["CheckNew"]);
}

#[test]
fn inapplicable_check_does_not_deprecate() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckOld", &[], Behavior::Report("pass"))
        .check_info(
            CheckInfo::new("CheckNew", "Generic")
                .with_needs(Vec::<String>::new())
                .with_deprecates(["CheckOld"]),
            Behavior::Inapplicable,
        );
    let mut collection = collect(vec![registry]).unwrap();
    collection.run().unwrap();

    assert_eq!(collection.get("CheckOld").unwrap().outcome, Outcome::Pass);
    assert_eq!(
        collection.get("CheckNew").unwrap().resolution,
        Resolution::Inapplicable
    );
}

#[test]
fn inapplicable_group_short_circuits_its_checks() {
    let log = new_log();
    let mut collection = collect(vec![
        TestRegistry::new("Generic", &log).check("CheckA", &[], Behavior::Report("pass")),
        TestRegistry::new("PHP", &log)
            .inapplicable()
            .check("PhpCheckB", &[], Behavior::Report("fail")),
    ])
    .unwrap();
    let summary = collection.run().unwrap();

    let php = collection.get("PhpCheckB").unwrap();
    assert_eq!(php.outcome, Outcome::NotApplicable);
    assert!(php.result.is_none());
    assert_eq!(summary.not_applicable, 1);
    assert_eq!(*log.borrow(), vec!["CheckA"]);
    assert_eq!(collection.results_in_report_order().len(), 1);
}

#[test]
fn error_fault_is_pending_and_blocks_dependents() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckBroken", &[], Behavior::Error)
        .check("CheckAfter", &["CheckBroken"], Behavior::Report("pass"))
        .check("CheckLater", &["CheckAfter"], Behavior::Report("pass"))
        .check("CheckOther", &[], Behavior::Report("pass"));
    let mut collection = collect(vec![registry]).unwrap();
    let summary = collection.run().unwrap();

    let broken = collection.get("CheckBroken").unwrap();
    assert_eq!(broken.outcome, Outcome::Pending);
    assert_eq!(broken.resolution, Resolution::Faulted);
    assert!(note_of(&collection, "CheckBroken")
        .unwrap()
        .contains("tool exploded"));

    let after = collection.get("CheckAfter").unwrap();
    assert_eq!(after.outcome, Outcome::Pending);
    assert_eq!(after.resolution, Resolution::Blocked("CheckBroken".to_string()));
    assert_eq!(
        note_of(&collection, "CheckAfter").unwrap(),
        "Not run: required check 'CheckBroken' did not complete"
    );
    assert_eq!(
        collection.get("CheckLater").unwrap().resolution,
        Resolution::Blocked("CheckAfter".to_string())
    );

    assert_eq!(collection.get("CheckOther").unwrap().outcome, Outcome::Pass);
    assert_eq!(*log.borrow(), vec!["CheckBroken", "CheckOther"]);
    assert_eq!(summary.pending, 3);
    assert_eq!(summary.passed, 1);
}

#[test]
fn panicking_check_is_isolated() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckPanics", &[], Behavior::Panic)
        .check("CheckFine", &[], Behavior::Report("pass"));
    let mut collection = collect(vec![registry]).unwrap();
    collection.run().unwrap();

    let panicked = collection.get("CheckPanics").unwrap();
    assert_eq!(panicked.outcome, Outcome::Pending);
    assert_eq!(panicked.resolution, Resolution::Faulted);
    assert!(note_of(&collection, "CheckPanics")
        .unwrap()
        .contains("check bug"));
    assert_eq!(collection.get("CheckFine").unwrap().outcome, Outcome::Pass);
}

#[test]
fn check_without_outcome_is_a_fault() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckSilent", &[], Behavior::Silent)
        .check("CheckNext", &["CheckSilent"], Behavior::Report("pass"));
    let mut collection = collect(vec![registry]).unwrap();
    collection.run().unwrap();

    assert_eq!(
        collection.get("CheckSilent").unwrap().resolution,
        Resolution::Faulted
    );
    assert_eq!(collection.get("CheckNext").unwrap().outcome, Outcome::Pending);
}

#[test]
fn failed_or_inapplicable_needs_do_not_block() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckFails", &[], Behavior::Report("fail"))
        .check("CheckNA", &[], Behavior::Report("na"))
        .check("CheckAfter", &["CheckFails", "CheckNA"], Behavior::Report("pass"));
    let mut collection = collect(vec![registry]).unwrap();
    collection.run().unwrap();

    assert_eq!(collection.get("CheckFails").unwrap().outcome, Outcome::Fail);
    assert_eq!(
        collection.get("CheckNA").unwrap().outcome,
        Outcome::NotApplicable
    );
    assert_eq!(collection.get("CheckAfter").unwrap().outcome, Outcome::Pass);
}

#[test]
fn outcome_spellings_are_normalized() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckInconclusive", &[], Behavior::Report("inconclusive"))
        .check("CheckBogus", &[], Behavior::Report("maybe"));
    let mut collection = collect(vec![registry]).unwrap();
    collection.run().unwrap();

    assert_eq!(
        collection.get("CheckInconclusive").unwrap().outcome,
        Outcome::Pending
    );
    assert_eq!(collection.get("CheckBogus").unwrap().outcome, Outcome::Fail);
}

#[test]
fn run_single_runs_only_what_is_needed() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckBase", &[], Behavior::Report("pass"))
        .check("CheckMiddle", &["CheckBase"], Behavior::Report("pass"))
        .check("CheckTarget", &["CheckMiddle"], Behavior::Report("fail"))
        .check("CheckUnrelated", &[], Behavior::Report("pass"));
    let mut collection = collect(vec![registry]).unwrap();

    let summary = collection.run_single("CheckTarget").unwrap();

    assert_eq!(summary.order, vec!["CheckBase", "CheckMiddle", "CheckTarget"]);
    assert!(collection.get("CheckUnrelated").is_none());
    assert_eq!(summary.failed, 1);
}

#[test]
fn full_run_after_single_completes_the_rest() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckBase", &[], Behavior::Report("pass"))
        .check("CheckTarget", &["CheckBase"], Behavior::Report("pass"))
        .check("CheckUnrelated", &[], Behavior::Report("fail"));
    let mut collection = collect(vec![registry]).unwrap();

    collection.run_single("CheckTarget").unwrap();
    assert!(!collection.is_run());
    let summary = collection.run().unwrap();

    assert!(collection.is_run());
    assert_eq!(
        summary.order,
        vec!["CheckBase", "CheckTarget", "CheckUnrelated"]
    );
    assert_eq!(
        collection.get("CheckUnrelated").unwrap().outcome,
        Outcome::Fail
    );
    assert_eq!(
        *log.borrow(),
        vec!["CheckBase", "CheckTarget", "CheckUnrelated"]
    );
}

#[test]
fn single_run_honors_deprecation_from_outside_its_needs() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckOld", &[], Behavior::Report("fail"))
        .check_info(
            CheckInfo::new("CheckNew", "Generic")
                .with_needs(std::iter::empty::<&str>())
                .with_deprecates(["CheckOld"]),
            Behavior::Report("pass"),
        );
    let mut collection = collect(vec![registry]).unwrap();

    collection.run_single("CheckOld").unwrap();

    let old = collection.get("CheckOld").unwrap();
    assert_eq!(old.outcome, Outcome::NotApplicable);
    assert_eq!(old.resolution, Resolution::DeprecatedBy("CheckNew".to_string()));
    assert!(log.borrow().is_empty());
}

#[test]
fn run_single_unknown_check_is_an_error() {
    let log = new_log();
    let mut collection = collect(vec![
        TestRegistry::new("Generic", &log).check("CheckA", &[], Behavior::Report("pass"))
    ])
    .unwrap();
    let err = collection.run_single("CheckNope").unwrap_err();
    assert!(matches!(err, ReviewError::UnknownCheck { name } if name == "CheckNope"));
}

#[test]
fn checks_run_once_until_reset() {
    let log = new_log();
    let registry = TestRegistry::new("Generic", &log)
        .check("CheckA", &[], Behavior::Report("pass"))
        .check("CheckB", &[], Behavior::Report("fail"));
    let mut collection = collect(vec![registry]).unwrap();

    let first = collection.run().unwrap();
    assert!(collection.is_run());
    let again = collection.run().unwrap();
    assert_eq!(first, again);
    assert_eq!(log.borrow().len(), 2);

    collection.reset();
    assert!(!collection.is_run());
    assert!(collection.get("CheckA").is_none());
    let third = collection.run().unwrap();
    assert_eq!(first, third);
    assert_eq!(log.borrow().len(), 4);
}

#[test]
fn exclusion_removes_checks_before_scheduling() {
    let log = new_log();
    let mut settings = ReviewSettings::default();
    settings.exclude = vec!["CheckLeaf".to_string()];
    let mut collection = collect_with(
        settings,
        vec![TestRegistry::new("Generic", &log)
            .check("CheckRoot", &[], Behavior::Report("pass"))
            .check("CheckLeaf", &["CheckRoot"], Behavior::Report("pass"))],
    )
    .unwrap();
    assert!(collection.check("CheckLeaf").is_none());
    let summary = collection.run().unwrap();
    assert_eq!(summary.order, vec!["CheckRoot"]);
}

#[test]
fn excluding_a_needed_check_is_an_unknown_need() {
    let log = new_log();
    let mut settings = ReviewSettings::default();
    settings.exclude = vec!["CheckRoot".to_string()];
    let err = collect_with(
        settings,
        vec![TestRegistry::new("Generic", &log)
            .check("CheckRoot", &[], Behavior::Report("pass"))
            .check("CheckLeaf", &["CheckRoot"], Behavior::Report("pass"))],
    )
    .unwrap_err();
    assert!(matches!(err, ReviewError::UnknownDependency { .. }));
}

#[test]
fn checks_without_explicit_needs_wait_for_the_checkpoint() {
    let log = new_log();
    let registry = TestRegistry::new("Setup", &log)
        .check_info(CheckInfo::new("CheckPlain", "Setup"), Behavior::Report("pass"))
        .check(BUILD_COMPLETED, &[], Behavior::Report("na"));
    let mut collection = collect(vec![registry]).unwrap();

    assert_eq!(collection.needs_of("CheckPlain").unwrap(), vec![BUILD_COMPLETED]);
    let summary = collection.run().unwrap();
    assert_eq!(summary.order, vec![BUILD_COMPLETED, "CheckPlain"]);
}
