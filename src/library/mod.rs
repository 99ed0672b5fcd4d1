pub mod factory;
pub mod pool;
pub mod scanner;
pub mod track;

use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use crate::config::{roots, LibraryConfig};
use crate::error::LibraryError;
use crate::playlist::{LoadOutcome, PlaylistStore};

pub use factory::{TrackFactory, TrackSource};
pub use pool::{PoolOutcome, WorkerPool};
pub use scanner::{LibraryScanner, ScanOutcome};
pub use track::Track;

/// Handle tying the scanner, the playlist store and the configured roots together.
///
/// Front ends hold one of these instead of reaching for global state.
pub struct Library {
    config: LibraryConfig,
    scanner: LibraryScanner,
    store: PlaylistStore,
}

impl Library {
    /// Build the worker pool, scanner and store described by `config`
    pub fn open(config: LibraryConfig) -> Result<Self, LibraryError> {
        let pool = Arc::new(WorkerPool::new(config.worker_threads)?);
        let scanner = LibraryScanner::new(Arc::clone(&pool), config.master_playlist_name.clone());
        let store = PlaylistStore::new(config.playlist_directory.clone(), pool, config.scan_timeout())?;

        info!(
            "Opened library with {} workers, playlists in {}",
            config.worker_threads,
            config.playlist_directory.display()
        );
        Ok(Self {
            config,
            scanner,
            store,
        })
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn scanner(&self) -> &LibraryScanner {
        &self.scanner
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    /// Directories listed in the roots file
    pub fn roots(&self) -> Result<Vec<PathBuf>, LibraryError> {
        Ok(roots::load(&self.config.roots_file)?)
    }

    pub fn set_roots(&self, directories: &[PathBuf]) -> Result<(), LibraryError> {
        Ok(roots::save(&self.config.roots_file, directories)?)
    }

    /// Rebuild the master playlist from every configured root
    pub fn refresh(&self) -> Result<ScanOutcome, LibraryError> {
        let directories = self.roots()?;
        Ok(self.scanner.scan(&directories, self.config.scan_timeout()))
    }

    /// Every playlist saved in the configured directory.
    ///
    /// Check `timed_out` on each outcome before saving one back: a partial
    /// load written over its file loses the missing lines.
    pub fn load_playlists(&self) -> Vec<LoadOutcome> {
        crate::time_operation!("load playlists", { self.store.list_all(self.store.directory()) })
    }
}
