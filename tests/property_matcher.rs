// tests/property_matcher.rs

use std::path::PathBuf;

use folderwatch::matcher::FileMatcherBuilder;
use proptest::prelude::*;

// Root-relative paths of one to four segments with a small set of extensions.
fn rel_path_strategy() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec("[a-z][a-z0-9_]{0,7}", 0..4),
        "[a-z][a-z0-9]{0,7}",
        prop_oneof![Just("txt"), Just("log"), Just("scss"), Just("rs")],
    )
        .prop_map(|(dirs, stem, ext)| {
            let mut parts = dirs;
            parts.push(format!("{stem}.{ext}"));
            parts.join("/")
        })
}

proptest! {
    #[test]
    fn no_rules_accepts_every_path(rel in rel_path_strategy()) {
        let m = FileMatcherBuilder::new("/proj").build().unwrap();
        let path = PathBuf::from("/proj").join(&rel);
        prop_assert!(m.offer(&path));
        prop_assert!(m.matched().unwrap().contains(&PathBuf::from(&rel)));
    }

    #[test]
    fn exclude_always_wins(
        rel in rel_path_strategy(),
        include in prop_oneof![Just("**"), Just("**.log"), Just("*.log"), Just("regex:.*")],
    ) {
        let m = FileMatcherBuilder::new("/proj")
            .include(include)
            .exclude("**.log")
            .collect_excluded(true)
            .build()
            .unwrap();
        let path = PathBuf::from("/proj").join(&rel);

        let accepted = m.offer(&path);
        if rel.ends_with(".log") {
            prop_assert!(!accepted);
            prop_assert!(m.excluded().unwrap().contains(&PathBuf::from(&rel)));
            prop_assert!(!m.matched().unwrap().contains(&PathBuf::from(&rel)));
        }
        prop_assert_eq!(accepted, m.is_match(&path));
    }

    #[test]
    fn deleting_twice_equals_deleting_once(
        files in proptest::collection::vec(rel_path_strategy(), 1..12),
        victim in 0usize..12,
    ) {
        let m = FileMatcherBuilder::new("/proj")
            .exclude("**.log")
            .collect_excluded(true)
            .build()
            .unwrap();
        for f in &files {
            m.offer(&PathBuf::from("/proj").join(f));
        }
        let target = PathBuf::from("/proj").join(&files[victim % files.len()]);

        m.file_deleted(&target);
        let once = (m.matched().unwrap(), m.excluded().unwrap());
        m.file_deleted(&target);
        let twice = (m.matched().unwrap(), m.excluded().unwrap());

        prop_assert_eq!(&once, &twice);
        let rel = PathBuf::from(&files[victim % files.len()]);
        prop_assert!(!once.0.contains(&rel) && !once.1.contains(&rel));
    }

    #[test]
    fn dir_invalid_leaves_no_direct_children(
        files in proptest::collection::vec(rel_path_strategy(), 1..16),
        pick in 0usize..16,
    ) {
        let m = FileMatcherBuilder::new("/proj")
            .exclude("**.log")
            .collect_excluded(true)
            .build()
            .unwrap();
        for f in &files {
            m.offer(&PathBuf::from("/proj").join(f));
        }
        let rel = PathBuf::from(&files[pick % files.len()]);
        let dir = rel.parent().map(PathBuf::from).unwrap_or_default();
        let before: Vec<PathBuf> = m
            .matched()
            .unwrap()
            .into_iter()
            .chain(m.excluded().unwrap())
            .filter(|p| p.parent() != Some(dir.as_path()))
            .collect();

        m.dir_invalid(&PathBuf::from("/proj").join(&dir));

        let after: Vec<PathBuf> = m
            .matched()
            .unwrap()
            .into_iter()
            .chain(m.excluded().unwrap())
            .collect();
        prop_assert!(after.iter().all(|p| p.parent() != Some(dir.as_path())));
        for untouched in before {
            prop_assert!(after.contains(&untouched));
        }
    }
}
