// tests/matcher_rules.rs

mod common;
use crate::common::{init_tracing, matcher};

use std::collections::BTreeSet;
use std::error::Error;
use std::path::{Path, PathBuf};

use folderwatch::errors::{CollectionKind, FolderWatchError};
use folderwatch::matcher::{FileMatcherBuilder, Rule};

type TestResult = Result<(), Box<dyn Error>>;

fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn single_star_glob_only_matches_at_root_level() {
    init_tracing();
    let m = matcher(FileMatcherBuilder::new("/proj").include("*.scss"));

    assert!(m.is_match(Path::new("/proj/x.scss")));
    assert!(!m.is_match(Path::new("/proj/scss/x.scss")));
    assert!(!m.is_match(Path::new("/proj/x.css")));
}

#[test]
fn double_star_glob_matches_at_any_depth() {
    init_tracing();
    let m = matcher(FileMatcherBuilder::new("/proj").include("**.scss"));

    assert!(m.is_match(Path::new("/proj/x.scss")));
    assert!(m.is_match(Path::new("/proj/scss/x.scss")));
    assert!(m.is_match(Path::new("/proj/a/b/c/x.scss")));
    assert!(!m.is_match(Path::new("/proj/a/b/c/x.txt")));
}

#[test]
fn folder_prefixed_globs_stay_inside_that_folder() {
    init_tracing();
    let flat = matcher(FileMatcherBuilder::new("/proj").include("nice/*.txt"));
    assert!(flat.is_match(Path::new("/proj/nice/a.txt")));
    assert!(!flat.is_match(Path::new("/proj/nice/deeper/a.txt")));
    assert!(!flat.is_match(Path::new("/proj/a.txt")));

    let deep = matcher(FileMatcherBuilder::new("/proj").include("nice/**.txt"));
    assert!(deep.is_match(Path::new("/proj/nice/a.txt")));
    assert!(deep.is_match(Path::new("/proj/nice/deeper/a.txt")));
    assert!(!deep.is_match(Path::new("/proj/other/a.txt")));
}

#[test]
fn glued_double_star_crosses_directories() {
    init_tracing();
    let trailing = matcher(FileMatcherBuilder::new("/proj").include("foo**"));
    assert!(trailing.is_match(Path::new("/proj/foo")));
    assert!(trailing.is_match(Path::new("/proj/foobar.txt")));
    assert!(trailing.is_match(Path::new("/proj/foo/x.txt")));
    assert!(trailing.is_match(Path::new("/proj/food/a/b.txt")));
    assert!(!trailing.is_match(Path::new("/proj/bar/foo.txt")));

    let inner = matcher(FileMatcherBuilder::new("/proj").include("src**.rs"));
    assert!(inner.is_match(Path::new("/proj/src_main.rs")));
    assert!(inner.is_match(Path::new("/proj/src/deep/lib.rs")));
    assert!(!inner.is_match(Path::new("/proj/src/deep/lib.txt")));
}

#[test]
fn glob_prefix_is_optional() {
    init_tracing();
    let m = matcher(FileMatcherBuilder::new("/proj").include("glob:*.md"));
    assert!(m.is_match(Path::new("/proj/README.md")));
    assert!(!m.is_match(Path::new("/proj/docs/README.md")));
}

#[test]
fn regex_rules_see_the_absolute_path() {
    init_tracing();
    let m = matcher(FileMatcherBuilder::new("/proj").include(r"regex:.*/sub/x\.txt$"));

    assert!(m.is_match(Path::new("/proj/sub/x.txt")));
    assert!(m.is_match(Path::new("/proj/deep/sub/x.txt")));
    assert!(!m.is_match(Path::new("/proj/x.txt")));
}

#[test]
fn predicate_rules_receive_the_relative_path() {
    init_tracing();
    let m = matcher(
        FileMatcherBuilder::new("/proj")
            .include_rule(Rule::predicate("short names", |rel| rel.len() <= 5)),
    );

    assert!(m.is_match(Path::new("/proj/a.rs")));
    assert!(!m.is_match(Path::new("/proj/longer_name.rs")));
}

#[test]
fn no_rules_accepts_everything_under_root() {
    init_tracing();
    let m = matcher(FileMatcherBuilder::new("/proj"));

    assert!(m.offer(Path::new("/proj/a")));
    assert!(m.offer(Path::new("/proj/x/y/z.bin")));
    assert!(!m.offer(Path::new("/elsewhere/a")));
}

#[test]
fn exclude_wins_over_include() {
    init_tracing();
    let m = matcher(
        FileMatcherBuilder::new("/proj")
            .include("**.scss")
            .exclude("vendor/**"),
    );

    assert!(m.offer(Path::new("/proj/site.scss")));
    assert!(!m.offer(Path::new("/proj/vendor/bootstrap.scss")));
    assert!(m.is_excluded(Path::new("/proj/vendor/bootstrap.scss")));
}

#[test]
fn malformed_patterns_fail_at_build_time() {
    init_tracing();

    let err = FileMatcherBuilder::new("/proj")
        .include("regex:(unclosed")
        .build()
        .unwrap_err();
    assert!(matches!(err, FolderWatchError::InvalidPattern { .. }));

    let err = FileMatcherBuilder::new("/proj").exclude("a[").build().unwrap_err();
    assert!(matches!(err, FolderWatchError::InvalidPattern { .. }));

    let err = FileMatcherBuilder::new("/proj").include("").build().unwrap_err();
    assert!(matches!(err, FolderWatchError::InvalidPattern { .. }));
}

#[test]
fn empty_root_is_a_config_error() {
    init_tracing();
    let err = FileMatcherBuilder::new("").build().unwrap_err();
    assert!(matches!(err, FolderWatchError::ConfigError(_)));
}

#[test]
fn offer_records_in_exactly_one_set() -> TestResult {
    init_tracing();
    let m = matcher(
        FileMatcherBuilder::new("/proj")
            .include("*.scss")
            .collect_excluded(true),
    );

    assert!(m.offer(Path::new("/proj/x.scss")));
    assert!(!m.offer(Path::new("/proj/y.txt")));

    assert_eq!(m.matched()?, BTreeSet::from([p("x.scss")]));
    assert_eq!(m.excluded()?, BTreeSet::from([p("y.txt")]));
    assert_eq!(m.matched_count()?, 1);
    assert_eq!(m.excluded_count()?, 1);
    Ok(())
}

#[test]
fn reading_a_disabled_collection_is_a_distinct_error() -> TestResult {
    init_tracing();
    let m = matcher(FileMatcherBuilder::new("/proj").collect_matched(false));

    match m.matched() {
        Err(FolderWatchError::NotCollecting { kind, root }) => {
            assert_eq!(kind, CollectionKind::Matched);
            assert_eq!(root, p("/proj"));
        }
        other => panic!("expected NotCollecting, got {other:?}"),
    }
    assert!(matches!(
        m.excluded(),
        Err(FolderWatchError::NotCollecting {
            kind: CollectionKind::Excluded,
            ..
        })
    ));

    // Offering still works; it just isn't recorded.
    assert!(m.offer(Path::new("/proj/a.txt")));
    Ok(())
}

#[test]
fn file_deleted_is_idempotent() -> TestResult {
    init_tracing();
    let m = matcher(
        FileMatcherBuilder::new("/proj")
            .include("*.scss")
            .collect_excluded(true),
    );
    m.offer(Path::new("/proj/x.scss"));
    m.offer(Path::new("/proj/y.txt"));

    m.file_deleted(Path::new("/proj/x.scss"));
    let once = (m.matched()?, m.excluded()?);
    m.file_deleted(Path::new("/proj/x.scss"));
    let twice = (m.matched()?, m.excluded()?);

    assert_eq!(once, twice);
    assert!(!once.0.contains(&p("x.scss")));
    assert!(once.1.contains(&p("y.txt")));
    Ok(())
}

#[test]
fn dir_invalid_only_touches_direct_children() -> TestResult {
    init_tracing();
    let m = matcher(FileMatcherBuilder::new("/proj").collect_excluded(true).exclude("*.log"));
    for f in [
        "/proj/top.txt",
        "/proj/top.log",
        "/proj/sub/a.txt",
        "/proj/sub/b.txt",
        "/proj/sub/deep/c.txt",
        "/proj/sibling/d.txt",
    ] {
        m.offer(Path::new(f));
    }

    assert_eq!(m.dir_invalid(Path::new("/proj/sub")), 2);

    let matched = m.matched()?;
    assert!(!matched.contains(&p("sub/a.txt")));
    assert!(!matched.contains(&p("sub/b.txt")));
    assert!(matched.contains(&p("sub/deep/c.txt")));
    assert!(matched.contains(&p("sibling/d.txt")));
    assert!(matched.contains(&p("top.txt")));

    // The root itself: drops root-level files from both sets.
    assert_eq!(m.dir_invalid(Path::new("/proj")), 2);
    assert!(m.excluded()?.is_empty());
    assert!(!m.matched()?.contains(&p("top.txt")));
    Ok(())
}

#[test]
fn relativize_handles_absolute_and_relative_inputs() {
    init_tracing();
    let m = matcher(FileMatcherBuilder::new("/proj/./web/../site"));

    assert_eq!(m.root_path(), Path::new("/proj/site"));
    assert_eq!(m.relativize(Path::new("/proj/site/a/b.txt")), Some(p("a/b.txt")));
    assert_eq!(m.relativize(Path::new("a/./b.txt")), Some(p("a/b.txt")));
    assert_eq!(m.relativize(Path::new("/other/b.txt")), None);
}

#[test]
fn should_descend_respects_recursion_and_excludes() {
    init_tracing();
    let flat = matcher(FileMatcherBuilder::new("/proj").recursive(false));
    assert!(flat.should_descend(Path::new("/proj")));
    assert!(!flat.should_descend(Path::new("/proj/sub")));

    let deep = matcher(FileMatcherBuilder::new("/proj").exclude("node_modules"));
    assert!(deep.should_descend(Path::new("/proj/src")));
    assert!(!deep.should_descend(Path::new("/proj/node_modules")));
}

#[test]
fn display_uses_name_or_root() {
    init_tracing();
    let named = matcher(FileMatcherBuilder::new("/proj").name("styles"));
    assert_eq!(named.to_string(), "styles");

    let anonymous = matcher(FileMatcherBuilder::new("/proj"));
    assert_eq!(anonymous.to_string(), "FileMatcher:/proj");
}
