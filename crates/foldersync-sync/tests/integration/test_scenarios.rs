//! Concrete before/after scenarios

use foldersync_core::domain::outcome::{MutationOperation, MutationOutcome};

use crate::common::{mtime_of, snapshot, summarize, write_file, Mirror};

#[tokio::test]
async fn test_fresh_mirror() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "file1.txt", b"hello", 100);

    mirror.pass().await;

    let copied = mirror.replica.join("file1.txt");
    assert_eq!(std::fs::read(&copied).unwrap(), b"hello");
    assert_eq!(mtime_of(&copied), 100);
    assert_eq!(snapshot(&mirror.replica).len(), 1);
}

#[tokio::test]
async fn test_stale_overwrite() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "file1.txt", b"fresh", 200);
    write_file(&mirror.replica, "file1.txt", b"stale", 100);

    let records = mirror.pass().await;

    let replica_file = mirror.replica.join("file1.txt");
    assert_eq!(std::fs::read(&replica_file).unwrap(), b"fresh");
    assert_eq!(mtime_of(&replica_file), 200);
    assert!(summarize(&records, &mirror.replica).contains(&(
        MutationOperation::CopyFile,
        MutationOutcome::Applied,
        "file1.txt".to_string()
    )));
}

#[tokio::test]
async fn test_orphan_removal() {
    let mirror = Mirror::new();
    write_file(&mirror.replica, "old.txt", b"old", 100);

    mirror.pass().await;

    assert!(mirror.replica.is_dir());
    assert!(snapshot(&mirror.replica).is_empty());
}

#[tokio::test]
async fn test_nested_creation_order() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "dir1/dir2/file.txt", b"deep", 100);

    let records = mirror.pass().await;

    assert_eq!(
        summarize(&records, &mirror.replica),
        vec![
            (
                MutationOperation::CreateDirectory,
                MutationOutcome::Applied,
                String::new()
            ),
            (
                MutationOperation::CreateDirectory,
                MutationOutcome::Applied,
                "dir1".to_string()
            ),
            (
                MutationOperation::CreateDirectory,
                MutationOutcome::Applied,
                "dir1/dir2".to_string()
            ),
            (
                MutationOperation::CopyFile,
                MutationOutcome::Applied,
                "dir1/dir2/file.txt".to_string()
            ),
        ]
    );
    assert_eq!(
        std::fs::read(mirror.replica.join("dir1/dir2/file.txt")).unwrap(),
        b"deep"
    );
}

#[tokio::test]
async fn test_source_change_between_passes_is_picked_up() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "notes.txt", b"v1", 100);
    mirror.pass().await;

    std::fs::rename(mirror.source.join("notes.txt"), mirror.source.join("renamed.txt")).unwrap();
    mirror.pass().await;

    assert!(!mirror.replica.join("notes.txt").exists());
    assert_eq!(
        std::fs::read(mirror.replica.join("renamed.txt")).unwrap(),
        b"v1"
    );
    assert_eq!(mtime_of(&mirror.replica.join("renamed.txt")), 100);
}

#[cfg(unix)]
#[tokio::test]
async fn test_file_link_mirrors_target_into_empty_replica() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "real.txt", b"current", 200);
    std::os::unix::fs::symlink(mirror.source.join("real.txt"), mirror.source.join("link.txt"))
        .unwrap();

    mirror.pass().await;

    let copied = mirror.replica.join("link.txt");
    assert_eq!(std::fs::read(&copied).unwrap(), b"current");
    assert_eq!(mtime_of(&copied), 200);

    let before = snapshot(&mirror.replica);
    let records = mirror.pass().await;
    assert!(records.iter().all(|r| !r.outcome.is_applied()));
    assert_eq!(snapshot(&mirror.replica), before);
}

#[cfg(unix)]
#[tokio::test]
async fn test_file_link_refreshes_stale_replica_copy() {
    let mirror = Mirror::new();
    write_file(&mirror.source, "real.txt", b"current", 200);
    std::os::unix::fs::symlink(mirror.source.join("real.txt"), mirror.source.join("link.txt"))
        .unwrap();
    write_file(&mirror.replica, "link.txt", b"v1", 100);

    mirror.pass().await;
    mirror.pass().await;

    let copied = mirror.replica.join("link.txt");
    assert_eq!(std::fs::read(&copied).unwrap(), b"current");
    assert_eq!(mtime_of(&copied), 200);
}
