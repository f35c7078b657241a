//! Integration tests for a full review through the public API.

use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use pkgreview::check::Outcome;
use pkgreview::config::{load_settings, ReviewSettings};
use pkgreview::context::ReviewEnv;
use pkgreview::package::PackageInfo;
use pkgreview::plugins::builtin_registries;
use pkgreview::report::{render_json, render_text, Report};
use pkgreview::scheduler::{CheckCollection, Resolution};
use pkgreview::tools::{FakeBuilder, FakeLinter};
use tempfile::TempDir;

const LIBFOO: &str = r#"
name: libfoo
version: "1.2"
release: "1"
packages:
  - name: libfoo
    files:
      - /usr/lib64/libfoo.so.1
      - /usr/lib64/libfoo.la
  - name: libfoo-devel
    files:
      - /usr/include/foo.h
      - /usr/lib64/libfoo.so
sections:
  - ["%post -p /sbin/ldconfig", []]
  - ["%postun -p /sbin/ldconfig", []]
source_files: [src/foo.c]
"#;

fn settings() -> ReviewSettings {
    ReviewSettings {
        srpm: Some(PathBuf::from("/srv/review/libfoo-1.2-1.src.rpm")),
        resultdir: PathBuf::from("/nonexistent/results"),
        builtin_data_checks: false,
        ..Default::default()
    }
}

/// Run all built-in registries; script checks work in the returned dir.
fn review(settings: ReviewSettings, builder: FakeBuilder) -> (TempDir, CheckCollection) {
    let review_dir = TempDir::new().unwrap();
    let env = ReviewEnv::new(
        ReviewSettings {
            review_dir: review_dir.path().to_path_buf(),
            ..settings
        },
        Box::new(PackageInfo::parse(LIBFOO).unwrap()),
        Box::new(builder),
        Box::new(FakeLinter::clean()),
    );
    let mut collection = CheckCollection::collect(env, builtin_registries().unwrap()).unwrap();
    collection.run().unwrap();
    (review_dir, collection)
}

fn outcome(collection: &CheckCollection, name: &str) -> Outcome {
    collection.get(name).unwrap().outcome
}

#[test]
fn startup_chain_runs_before_package_checks() {
    let (_dir, collection) = review(settings(), FakeBuilder::new("/nonexistent/results"));
    let order = collection.summary().order;
    let position = |name: &str| order.iter().position(|n| n == name).unwrap();

    assert!(position("CheckResultdir") < position("CheckBuild"));
    assert!(position("CheckBuild") < position("CheckRpmlint"));
    assert!(position("CheckPackageInstalls") < position("CheckBuildCompleted"));
    assert!(position("CheckBuildCompleted") < position("CheckBuildroot"));
    assert!(position("CheckBuildCompleted") < position("CheckLibToolArchives"));

    assert_eq!(outcome(&collection, "CheckBuild"), Outcome::Pass);
    assert_eq!(outcome(&collection, "CheckRpmlint"), Outcome::Pass);
    assert_eq!(
        outcome(&collection, "CheckBuildCompleted"),
        Outcome::NotApplicable
    );
}

#[test]
fn group_gates_decide_language_checks() {
    let (_dir, collection) = review(settings(), FakeBuilder::new("/nonexistent/results"));

    assert_eq!(outcome(&collection, "CheckLibToolArchives"), Outcome::Fail);
    assert_eq!(outcome(&collection, "CheckLDConfig"), Outcome::Pass);
    let php = collection.get("PhpCheckPhpRequire").unwrap();
    assert_eq!(php.outcome, Outcome::NotApplicable);
    assert_eq!(php.resolution, Resolution::Inapplicable);
}

#[test]
fn failed_build_does_not_stop_the_review() {
    let builder = FakeBuilder::new("/nonexistent/results").failing_build("gcc: not found");
    let (_dir, collection) = review(settings(), builder);

    assert_eq!(outcome(&collection, "CheckBuild"), Outcome::Fail);
    assert_eq!(outcome(&collection, "CheckRpmlint"), Outcome::Fail);
    assert_eq!(outcome(&collection, "CheckBuildroot"), Outcome::Pass);
}

#[test]
fn missing_source_package_blocks_everything_after_the_build() {
    let settings = ReviewSettings {
        srpm: None,
        ..settings()
    };
    let (_dir, collection) = review(settings, FakeBuilder::new("/nonexistent/results"));

    let build = collection.get("CheckBuild").unwrap();
    assert_eq!(build.outcome, Outcome::Pending);
    assert_eq!(build.resolution, Resolution::Faulted);
    assert_eq!(
        collection.get("CheckBuildroot").unwrap().resolution,
        Resolution::Blocked("CheckBuildCompleted".to_string())
    );
    assert_eq!(collection.summary().failed, 0);
}

#[test]
fn data_checks_load_from_data_dirs() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("libtool.yml"),
        r#"
- name: CheckNoLaInBase
  type: SHOULD
  text: No libtool archives in the base package.
  rule:
    files_absent: /usr/lib64/*.la
- name: CheckLinksLibc
  rule:
    requires: glibc
"#,
    )
    .unwrap();
    let settings = ReviewSettings {
        data_dirs: vec![temp.path().to_path_buf()],
        ..settings()
    };
    let (_dir, collection) = review(settings, FakeBuilder::new("/nonexistent/results"));

    let la = collection.get("CheckNoLaInBase").unwrap();
    assert_eq!(la.outcome, Outcome::Fail);
    let note = la.result.as_ref().unwrap().note.clone().unwrap();
    assert!(note.contains("libfoo : /usr/lib64/libfoo.la"));
    assert_eq!(outcome(&collection, "CheckLinksLibc"), Outcome::Fail);
}

#[test]
fn reports_render_from_the_collection() {
    let (_dir, collection) = review(settings(), FakeBuilder::new("/nonexistent/results"));
    let generated = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let report = Report::from_collection(&collection, generated);

    let text = render_text(&report).unwrap();
    assert!(text.contains("Package: libfoo-1.2-1"));
    assert!(text.contains("Generated: 2024-05-01 12:00:00 UTC"));
    assert!(text.contains("Issues:"));
    assert!(text.contains("===== C/C++ ====="));
    assert!(!text.contains("===== PHP ====="));

    let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
    assert_eq!(json["package"]["name"], "libfoo");
    assert_eq!(
        json["summary"]["failed"].as_u64().unwrap() as usize,
        collection.summary().failed
    );
}

#[test]
fn layered_settings_feed_the_review() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join(".pkgreview");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("config.yml"),
        "flags:\n  EPEL5: \"1\"\nexclude: [CheckRPATH]\n",
    )
    .unwrap();
    fs::write(dir.join("config.local.yml"), "flags:\n  EPEL5: null\n").unwrap();

    let loaded = load_settings(temp.path(), None).unwrap();
    assert!(loaded.flags.is_empty());
    assert_eq!(loaded.exclude, vec!["CheckRPATH"]);
    assert_eq!(loaded.package, temp.path().join("package.yml"));

    let settings = ReviewSettings {
        exclude: loaded.exclude,
        ..settings()
    };
    let (_dir, collection) = review(settings, FakeBuilder::new("/nonexistent/results"));
    assert!(collection.check("CheckRPATH").is_none());
}
