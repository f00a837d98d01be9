//! Shared helpers for reconciliation integration tests
//!
//! Each test gets a fresh temporary directory holding a `source` and a
//! `replica` root, a real filesystem adapter, and a reporter that keeps
//! every mutation record for later assertions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use filetime::{set_file_mtime, FileTime};
use foldersync_core::{
    domain::{
        outcome::{MutationOperation, MutationOutcome, MutationRecord},
        roots::MirrorRoots,
    },
    ports::outcome_reporter::IOutcomeReporter,
};
use foldersync_sync::{filesystem::LocalFileSystemAdapter, reconciler::Reconciler};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Reporter that keeps every record it receives
#[derive(Default)]
pub struct Recorder {
    records: Mutex<Vec<MutationRecord>>,
}

impl Recorder {
    pub fn take(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut *self.records.lock().unwrap())
    }
}

impl IOutcomeReporter for Recorder {
    fn record(&self, record: &MutationRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// A source/replica pair inside a temporary directory
pub struct Mirror {
    _dir: TempDir,
    pub source: PathBuf,
    pub replica: PathBuf,
    pub recorder: Arc<Recorder>,
    reconciler: Reconciler,
}

impl Mirror {
    /// Creates an empty source root; the replica root does not exist yet
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        let replica = dir.path().join("replica");
        std::fs::create_dir(&source).unwrap();

        let recorder = Arc::new(Recorder::default());
        let roots = MirrorRoots::new(&source, &replica).unwrap();
        let reconciler = Reconciler::new(
            roots,
            Arc::new(LocalFileSystemAdapter::new()),
            recorder.clone(),
        );

        Self {
            _dir: dir,
            source,
            replica,
            recorder,
            reconciler,
        }
    }

    /// Runs one pass and returns the records it produced
    pub async fn pass(&self) -> Vec<MutationRecord> {
        self.reconciler
            .reconcile(&CancellationToken::new())
            .await
            .expect("pass failed");
        self.recorder.take()
    }
}

/// Writes `content` at `root/rel` with the given mtime, creating parents
pub fn write_file(root: &Path, rel: &str, content: &[u8], mtime: i64) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

pub fn mtime_of(path: &Path) -> i64 {
    FileTime::from_last_modification_time(&std::fs::metadata(path).unwrap()).unix_seconds()
}

/// What a tree looks like: relative path → `None` for directories,
/// `Some((content, mtime))` for files
pub type Snapshot = BTreeMap<String, Option<(Vec<u8>, i64)>>;

pub fn snapshot(root: &Path) -> Snapshot {
    fn visit(root: &Path, dir: &Path, out: &mut Snapshot) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries {
            let path = entry.unwrap().path();
            let rel = path.strip_prefix(root).unwrap().display().to_string();
            if path.is_dir() {
                out.insert(rel, None);
                visit(root, &path, out);
            } else {
                let content = std::fs::read(&path).unwrap();
                out.insert(rel, Some((content, mtime_of(&path))));
            }
        }
    }

    let mut out = Snapshot::new();
    visit(root, root, &mut out);
    out
}

/// `(operation, outcome, replica-relative target)` triples, in report order
pub fn summarize(records: &[MutationRecord], replica: &Path) -> Vec<(MutationOperation, MutationOutcome, String)> {
    records
        .iter()
        .map(|r| {
            let rel = r.target.strip_prefix(replica).unwrap().display().to_string();
            (r.operation, r.outcome, rel)
        })
        .collect()
}

pub fn applied_count(records: &[MutationRecord]) -> usize {
    records.iter().filter(|r| r.outcome.is_applied()).count()
}
