//! Test doubles shared by the unit tests of this crate

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use foldersync_core::{
    domain::{
        entry::EntryState,
        outcome::{MutationRecord, PassSummary},
    },
    ports::{
        mirror_filesystem::{DirEntry, IMirrorFileSystem},
        outcome_reporter::IOutcomeReporter,
    },
};

use crate::filesystem::LocalFileSystemAdapter;

/// Port operation a fault is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Classify,
    List,
    Copy,
    CreateDir,
    RemoveFile,
    RemoveDir,
}

/// Real filesystem with per-path injected failures
///
/// Running as root makes permission bits useless for tests, so permission
/// errors are injected here instead. Copy faults match the target path.
#[derive(Default)]
pub struct FaultyFs {
    inner: LocalFileSystemAdapter,
    faults: Mutex<Vec<(Op, PathBuf, ErrorKind)>>,
    calls: Mutex<Vec<(Op, PathBuf)>>,
}

impl FaultyFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: Op, path: impl Into<PathBuf>, kind: ErrorKind) {
        self.faults.lock().unwrap().push((op, path.into(), kind));
    }

    /// Mutating calls made so far, in order
    pub fn mutations(&self) -> Vec<(Op, PathBuf)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| !matches!(op, Op::Classify | Op::List))
            .cloned()
            .collect()
    }

    fn check(&self, op: Op, path: &Path) -> io::Result<()> {
        self.calls.lock().unwrap().push((op, path.to_path_buf()));
        let faults = self.faults.lock().unwrap();
        match faults.iter().find(|(o, p, _)| *o == op && p == path) {
            Some((_, _, kind)) => Err(io::Error::new(*kind, "injected failure")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IMirrorFileSystem for FaultyFs {
    async fn classify(&self, path: &Path) -> EntryState {
        match self.check(Op::Classify, path) {
            Ok(()) => self.inner.classify(path).await,
            Err(e) => EntryState::Inaccessible(e.kind()),
        }
    }

    async fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.check(Op::List, path)?;
        self.inner.list_dir(path).await
    }

    async fn copy_file(&self, source: &Path, target: &Path) -> io::Result<()> {
        self.check(Op::Copy, target)?;
        self.inner.copy_file(source, target).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check(Op::CreateDir, path)?;
        self.inner.create_dir_all(path).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.check(Op::RemoveFile, path)?;
        self.inner.remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check(Op::RemoveDir, path)?;
        self.inner.remove_dir_all(path).await
    }
}

/// Reporter that keeps everything it is told
#[derive(Default)]
pub struct RecordingReporter {
    pub records: Mutex<Vec<MutationRecord>>,
    pub passes: Mutex<Vec<(u64, Option<PassSummary>)>>,
}

impl RecordingReporter {
    pub fn records(&self) -> Vec<MutationRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl IOutcomeReporter for RecordingReporter {
    fn record(&self, record: &MutationRecord) {
        self.records.lock().unwrap().push(record.clone());
    }

    fn pass_started(&self, pass: u64) {
        self.passes.lock().unwrap().push((pass, None));
    }

    fn pass_finished(&self, pass: u64, summary: &PassSummary) {
        self.passes.lock().unwrap().push((pass, Some(summary.clone())));
    }
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes DEBUG and above on the current thread into a [`CapturedLogs`]
/// until the guard is dropped
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
