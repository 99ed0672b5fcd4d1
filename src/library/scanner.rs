use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use walkdir::WalkDir;

use crate::library::factory::{TrackFactory, TrackSource};
use crate::library::pool::WorkerPool;
use crate::logging::OperationTimer;
use crate::playlist::Playlist;

const SLOW_SCAN: Duration = Duration::from_secs(30);

/// Result of a library scan
#[derive(Debug)]
pub struct ScanOutcome {
    pub playlist: Playlist,
    /// The deadline passed before every file was examined
    pub timed_out: bool,
    /// Files handed to the worker pool
    pub submitted: usize,
    /// Files the pool finished examining before the deadline
    pub completed: usize,
}

impl ScanOutcome {
    /// Files that were never examined; the "songs may be missing" count
    pub fn pending(&self) -> usize {
        self.submitted.saturating_sub(self.completed)
    }
}

/// Walks directory trees and builds the master playlist from every audio file found
pub struct LibraryScanner<S: TrackSource = TrackFactory> {
    pool: Arc<WorkerPool>,
    source: Arc<S>,
    master_name: String,
}

impl LibraryScanner<TrackFactory> {
    pub fn new(pool: Arc<WorkerPool>, master_name: impl Into<String>) -> Self {
        Self::with_source(pool, TrackFactory, master_name)
    }
}

impl<S: TrackSource + 'static> LibraryScanner<S> {
    /// Scanner that builds tracks through a custom source
    pub fn with_source(pool: Arc<WorkerPool>, source: S, master_name: impl Into<String>) -> Self {
        Self {
            pool,
            source: Arc::new(source),
            master_name: master_name.into(),
        }
    }

    pub fn master_name(&self) -> &str {
        &self.master_name
    }

    /// Scan `directories` recursively, waiting at most `timeout` for the
    /// per-file work.
    ///
    /// Traversal runs on the calling thread; each file is examined on the
    /// worker pool. Bad directories and unreadable files are logged and
    /// contribute nothing. The order of the resulting tracks is not defined.
    pub fn scan<P: AsRef<Path>>(&self, directories: &[P], timeout: Duration) -> ScanOutcome {
        let timer = OperationTimer::new(format!("scan {} directories", directories.len()));

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for directory in directories {
            let directory = directory.as_ref();
            if seen.insert(directory.to_path_buf()) {
                collect_files(directory, &mut files);
            }
        }

        let source = Arc::clone(&self.source);
        let outcome = self
            .pool
            .run(files, timeout, move |path: PathBuf| source.create_or_skip(&path));

        let mut playlist = Playlist::new(self.master_name.clone());
        playlist.add_all(&outcome.results);

        if outcome.timed_out {
            warn!(
                "Scan timed out after {:?}; {} files were not examined",
                timeout,
                outcome.pending()
            );
        }
        timer.finish_with_threshold(SLOW_SCAN);
        info!(
            "Scanned {} files into '{}' ({} tracks)",
            outcome.submitted,
            playlist.name(),
            playlist.len()
        );

        ScanOutcome {
            playlist,
            timed_out: outcome.timed_out,
            submitted: outcome.submitted,
            completed: outcome.completed,
        }
    }
}

/// Append every regular file under `directory` to `files`
fn collect_files(directory: &Path, files: &mut Vec<PathBuf>) {
    if directory.as_os_str().is_empty() {
        error!("Skipping scan of an empty directory path");
        return;
    }
    if !directory.is_dir() {
        error!("Skipping scan of {}: not a directory", directory.display());
        return;
    }

    for entry in WalkDir::new(directory).follow_links(true) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!("Skipping part of {}: {}", directory.display(), e),
        }
    }
}
