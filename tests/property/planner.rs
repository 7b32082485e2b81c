//! Property-based tests for plan correctness

use proptest::prelude::*;
use reposync::sync::plan;
use reposync::tree::TreeSnapshot;
use std::collections::{BTreeMap, BTreeSet};

/// Small key and hash alphabets so local and remote overlap often
fn tree_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-c]{1,2}(/[a-c]{1,2}){0,2}", "h[0-3]", 0..12)
}

fn snapshot(entries: &BTreeMap<String, String>) -> TreeSnapshot {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// A plan against itself is always empty
#[test]
fn test_identical_trees_plan_nothing() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&tree_strategy(), |entries| {
            let tree = snapshot(&entries);
            let result = plan(&tree, &tree);

            assert!(result.is_empty());
            assert_eq!(result.unchanged, entries.len());

            Ok(())
        })
        .unwrap();
}

/// Deletes are exactly local-minus-remote; downloads are exactly new or differing paths
#[test]
fn test_plan_sets_are_exact() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(tree_strategy(), tree_strategy()), |(local, remote)| {
            let result = plan(&snapshot(&local), &snapshot(&remote));

            let expected_deletes: BTreeSet<String> = local
                .keys()
                .filter(|k| !remote.contains_key(*k))
                .cloned()
                .collect();
            assert_eq!(result.to_delete, expected_deletes);

            let expected_downloads: BTreeSet<&str> = remote
                .iter()
                .filter(|(k, v)| local.get(*k) != Some(*v))
                .map(|(k, _)| k.as_str())
                .collect();
            assert_eq!(result.download_paths(), expected_downloads);
            assert_eq!(result.download_paths().len(), result.to_download.len());

            for task in &result.to_download {
                assert_eq!(
                    remote.get(&task.path).map(String::as_str),
                    Some(task.remote_hash.as_str())
                );
            }

            assert!(result
                .download_paths()
                .iter()
                .all(|p| !result.to_delete.contains(*p)));
            assert_eq!(
                result.unchanged + result.to_download.len(),
                remote.len()
            );

            Ok(())
        })
        .unwrap();
}

/// Applying a plan to the local map yields the remote map
#[test]
fn test_applied_plan_converges() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(tree_strategy(), tree_strategy()), |(local, remote)| {
            let result = plan(&snapshot(&local), &snapshot(&remote));

            let mut applied = local.clone();
            for path in &result.to_delete {
                applied.remove(path);
            }
            for task in &result.to_download {
                applied.insert(task.path.clone(), task.remote_hash.as_str().to_string());
            }
            assert_eq!(applied, remote);

            let again = plan(&snapshot(&applied), &snapshot(&remote));
            assert!(again.is_empty());

            Ok(())
        })
        .unwrap();
}
