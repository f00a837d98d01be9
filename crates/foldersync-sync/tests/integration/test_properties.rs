//! Properties every pass must hold regardless of the tree contents

use foldersync_core::domain::outcome::{MutationOperation, MutationOutcome};

use crate::common::{applied_count, mtime_of, snapshot, summarize, write_file, Mirror};

fn populate_mixed_tree(mirror: &Mirror) {
    write_file(&mirror.source, "top.txt", b"top", 1_000);
    write_file(&mirror.source, "docs/readme.md", b"# readme", 2_000);
    write_file(&mirror.source, "docs/guide/intro.md", b"intro", 3_000);
    write_file(&mirror.source, "empty.bin", b"", 4_000);
    std::fs::create_dir_all(mirror.source.join("empty-dir/nested")).unwrap();
}

#[tokio::test]
async fn test_convergence_from_empty_replica() {
    let mirror = Mirror::new();
    populate_mixed_tree(&mirror);

    mirror.pass().await;

    assert_eq!(snapshot(&mirror.replica), snapshot(&mirror.source));
}

#[tokio::test]
async fn test_convergence_from_divergent_replica() {
    let mirror = Mirror::new();
    populate_mixed_tree(&mirror);
    write_file(&mirror.replica, "top.txt", b"stale", 500);
    write_file(&mirror.replica, "docs/orphan.txt", b"orphan", 500);
    write_file(&mirror.replica, "junk/deep/file", b"junk", 500);

    mirror.pass().await;

    assert_eq!(snapshot(&mirror.replica), snapshot(&mirror.source));
}

#[tokio::test]
async fn test_second_pass_applies_nothing() {
    let mirror = Mirror::new();
    populate_mixed_tree(&mirror);
    write_file(&mirror.replica, "orphan.txt", b"orphan", 500);

    let first = mirror.pass().await;
    assert!(applied_count(&first) > 0);

    let second = mirror.pass().await;
    assert_eq!(applied_count(&second), 0);
    assert!(second
        .iter()
        .all(|r| r.outcome == MutationOutcome::SkippedUpToDate));
}

#[tokio::test]
async fn test_replica_only_entries_are_removed() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "kept.txt", b"kept", 100);
    write_file(&mirror.replica, "kept.txt", b"kept", 100);
    write_file(&mirror.replica, "gone.txt", b"gone", 100);
    write_file(&mirror.replica, "gone-dir/inner.txt", b"inner", 100);
    std::fs::create_dir_all(mirror.replica.join("empty-gone")).unwrap();

    mirror.pass().await;

    assert!(mirror.replica.join("kept.txt").exists());
    assert!(!mirror.replica.join("gone.txt").exists());
    assert!(!mirror.replica.join("gone-dir").exists());
    assert!(!mirror.replica.join("empty-gone").exists());
}

#[tokio::test]
async fn test_equal_mtime_is_left_alone() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "same.txt", b"source bytes", 100);
    write_file(&mirror.replica, "same.txt", b"replica bytes", 100);

    let records = mirror.pass().await;

    let replica_file = mirror.replica.join("same.txt");
    assert_eq!(std::fs::read(&replica_file).unwrap(), b"replica bytes");
    assert_eq!(mtime_of(&replica_file), 100);
    assert!(summarize(&records, &mirror.replica).contains(&(
        MutationOperation::CopyFile,
        MutationOutcome::SkippedUpToDate,
        "same.txt".to_string()
    )));
}

#[tokio::test]
async fn test_newer_replica_file_is_not_overwritten() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "f.txt", b"older source", 100);
    write_file(&mirror.replica, "f.txt", b"newer replica", 500);

    mirror.pass().await;

    assert_eq!(
        std::fs::read(mirror.replica.join("f.txt")).unwrap(),
        b"newer replica"
    );
}

#[tokio::test]
async fn test_nested_removal_is_bottom_up_without_failures() {
    let mirror = Mirror::new();
    write_file(&mirror.replica, "a/b/c/file.txt", b"x", 100);

    let records = mirror.pass().await;

    assert!(!mirror.replica.join("a").exists());
    assert!(records.iter().all(|r| !r.outcome.is_failure()));
    assert_eq!(
        summarize(&records, &mirror.replica),
        vec![
            (
                MutationOperation::DeleteFile,
                MutationOutcome::Applied,
                "a/b/c/file.txt".to_string()
            ),
            (
                MutationOperation::DeleteDirectory,
                MutationOutcome::Applied,
                "a/b/c".to_string()
            ),
            (
                MutationOperation::DeleteDirectory,
                MutationOutcome::Applied,
                "a/b".to_string()
            ),
            (
                MutationOperation::DeleteDirectory,
                MutationOutcome::Applied,
                "a".to_string()
            ),
            (
                MutationOperation::CreateDirectory,
                MutationOutcome::SkippedUpToDate,
                String::new()
            ),
        ]
    );
}

#[tokio::test]
async fn test_file_replaced_by_directory() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "node/child.txt", b"child", 100);
    write_file(&mirror.replica, "node", b"was a file", 100);

    mirror.pass().await;

    assert_eq!(snapshot(&mirror.replica), snapshot(&mirror.source));
}
