use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::error::PlaylistError;
use crate::library::{TrackFactory, TrackSource, WorkerPool};
use crate::logging::OperationTimer;
use crate::models::LINE_ENDING;
use crate::playlist::Playlist;
use crate::staging;

/// Suffix of playlist files
pub const PLAYLIST_EXTENSION: &str = "m3u";

const SLOW_LOAD: Duration = Duration::from_secs(5);

/// A playlist read back from disk
#[derive(Debug)]
pub struct LoadOutcome {
    pub playlist: Playlist,
    /// Some lines were still being resolved when the deadline hit
    pub timed_out: bool,
    /// Lines that were malformed or did not resolve to a track
    pub skipped: usize,
    /// Lines still unresolved at the deadline. Saving a playlist with
    /// pending lines back over its file drops them.
    pub pending: usize,
}

impl LoadOutcome {
    /// Every line of the file was accounted for
    pub fn is_complete(&self) -> bool {
        !self.timed_out && self.pending == 0
    }
}

/// Result of moving a playlist to a new name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// Saved under the new name, but the old file could not be removed
    StaleFileRemains(PathBuf),
}

/// Saves and loads playlists as one-absolute-path-per-line files
pub struct PlaylistStore<S: TrackSource = TrackFactory> {
    directory: PathBuf,
    pool: Arc<WorkerPool>,
    source: Arc<S>,
    load_timeout: Duration,
}

impl PlaylistStore<TrackFactory> {
    /// Create a store rooted at `directory`, creating it if needed
    pub fn new(directory: PathBuf, pool: Arc<WorkerPool>, load_timeout: Duration) -> Result<Self, PlaylistError> {
        Self::with_source(directory, pool, TrackFactory, load_timeout)
    }
}

impl<S: TrackSource + 'static> PlaylistStore<S> {
    /// Store that resolves playlist lines through a custom source
    pub fn with_source(
        directory: PathBuf,
        pool: Arc<WorkerPool>,
        source: S,
        load_timeout: Duration,
    ) -> Result<Self, PlaylistError> {
        if !directory.exists() {
            fs::create_dir_all(&directory)?;
        }

        Ok(Self {
            directory,
            pool,
            source: Arc::new(source),
            load_timeout,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File that backs playlist `name` inside `directory`
    pub fn path_for(name: &str, directory: &Path) -> Result<PathBuf, PlaylistError> {
        validate_name(name)?;
        Ok(directory.join(format!("{}.{}", name, PLAYLIST_EXTENSION)))
    }

    /// Read a playlist file.
    ///
    /// Each line is resolved independently on the worker pool. Lines that
    /// fail are logged and dropped; the rest keep their file order.
    pub fn load(&self, path: &Path) -> Result<LoadOutcome, PlaylistError> {
        let timer = OperationTimer::new(format!("load playlist {}", path.display()));
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| PlaylistError::InvalidName {
                name: path.to_string_lossy().to_string(),
            })?;

        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PlaylistError::PlaylistNotFound { name: name.clone() },
            _ => PlaylistError::IoError(e),
        })?;

        let (entries, malformed) = read_entries(BufReader::new(file), path);
        let line_count = entries.len();

        let source = Arc::clone(&self.source);
        let outcome = self.pool.run(entries, self.load_timeout, move |entry: PathBuf| {
            match source.create(&entry) {
                Ok(track) => Some(track),
                Err(e) => {
                    warn!("Dropping playlist entry {}: {}", entry.display(), e);
                    None
                }
            }
        });

        let skipped = malformed + outcome.completed.saturating_sub(outcome.results.len());
        let mut playlist = Playlist::new(name);
        playlist.add_all(&outcome.results);

        if outcome.timed_out {
            warn!(
                "Loading {} timed out; {} of {} entries may be missing",
                path.display(),
                outcome.pending(),
                line_count
            );
        }
        timer.finish_with_threshold(SLOW_LOAD);
        debug!("Loaded playlist '{}' with {} tracks", playlist.name(), playlist.len());

        Ok(LoadOutcome {
            playlist,
            timed_out: outcome.timed_out,
            skipped,
            pending: outcome.pending(),
        })
    }

    /// Load playlist `name` from this store's directory
    pub fn load_named(&self, name: &str) -> Result<LoadOutcome, PlaylistError> {
        let path = Self::path_for(name, &self.directory)?;
        self.load(&path)
    }

    /// Write `playlist` into `directory`, replacing any file of the same name.
    ///
    /// The file is staged next to its destination and renamed into place,
    /// so readers see either the old contents or the new ones.
    pub fn save(&self, playlist: &Playlist, directory: &Path) -> Result<PathBuf, PlaylistError> {
        let destination = Self::path_for(playlist.name(), directory)?;
        fs::create_dir_all(directory)?;

        let staged = tempfile::Builder::new()
            .prefix(".tunejar-")
            .suffix(".m3u.tmp")
            .tempfile_in(directory)?;

        {
            let mut writer = BufWriter::new(staged.as_file());
            for track in playlist {
                match track.path().to_str() {
                    Some(line) => {
                        writer.write_all(line.as_bytes())?;
                        writer.write_all(LINE_ENDING.as_bytes())?;
                    }
                    None => warn!(
                        "Leaving {} out of '{}': path is not valid UTF-8",
                        track.path().display(),
                        playlist.name()
                    ),
                }
            }
            writer.flush()?;
        }
        staging::inherit_permissions(staged.as_file(), &destination)?;
        staged.as_file().sync_all()?;
        staged.persist(&destination).map_err(|e| PlaylistError::IoError(e.error))?;

        info!("Saved playlist '{}' to {}", playlist.name(), destination.display());
        Ok(destination)
    }

    /// Load every playlist file directly inside `directory`, sorted by name.
    ///
    /// Each entry carries its own timeout and skip counts. An unreadable
    /// directory yields nothing; files that fail to load are skipped.
    pub fn list_all(&self, directory: &Path) -> Vec<LoadOutcome> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Cannot list playlists in {}: {}", directory.display(), e);
                return Vec::new();
            }
        };

        let mut outcomes = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    error!("Cannot read entry in {}: {}", directory.display(), e);
                    continue;
                }
            };

            let is_playlist = path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(PLAYLIST_EXTENSION);
            if !is_playlist {
                continue;
            }

            match self.load(&path) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Skipping playlist {}: {}", path.display(), e),
            }
        }

        outcomes.sort_by(|a, b| a.playlist.name().cmp(b.playlist.name()));
        outcomes
    }

    /// Remove the file backing playlist `name`
    pub fn delete(&self, name: &str, directory: &Path) -> Result<(), PlaylistError> {
        let path = Self::path_for(name, directory)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted playlist '{}'", name);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PlaylistError::PlaylistNotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(PlaylistError::IoError(e)),
        }
    }

    /// Save `playlist` as `new_name`, then remove the file under its old name.
    ///
    /// If the save fails the playlist keeps its old name. A leftover old file
    /// does not undo the rename; it is reported in the outcome instead. When
    /// both names lead to the same file (a case-only rename on a
    /// case-insensitive filesystem) nothing is removed.
    pub fn rename(
        &self,
        playlist: &mut Playlist,
        new_name: &str,
        directory: &Path,
    ) -> Result<RenameOutcome, PlaylistError> {
        validate_name(new_name)?;
        let old_name = playlist.name().to_string();
        if old_name == new_name {
            self.save(playlist, directory)?;
            return Ok(RenameOutcome::Renamed);
        }

        playlist.set_name(new_name);
        let new_path = match self.save(playlist, directory) {
            Ok(path) => path,
            Err(e) => {
                playlist.set_name(old_name);
                return Err(e);
            }
        };

        let old_path = match Self::path_for(&old_name, directory) {
            Ok(path) => path,
            Err(_) => return Ok(RenameOutcome::Renamed),
        };
        if same_file(&old_path, &new_path) {
            debug!("'{}' and '{}' share {}", old_name, new_name, new_path.display());
            return Ok(RenameOutcome::Renamed);
        }

        match fs::remove_file(&old_path) {
            Ok(()) => Ok(RenameOutcome::Renamed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(RenameOutcome::Renamed),
            Err(e) => {
                warn!(
                    "Renamed '{}' to '{}' but could not remove {}: {}",
                    old_name,
                    new_name,
                    old_path.display(),
                    e
                );
                Ok(RenameOutcome::StaleFileRemains(old_path))
            }
        }
    }
}

/// Playlist names become file names, so they may not leave the directory
fn validate_name(name: &str) -> Result<(), PlaylistError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        Err(PlaylistError::InvalidName {
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Whether both paths currently resolve to one file on disk
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

/// Whether both paths currently resolve to one file on disk
#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Split a playlist file into candidate paths, counting the lines that are not
fn read_entries<R: BufRead>(reader: R, source: &Path) -> (Vec<PathBuf>, usize) {
    let mut entries = Vec::new();
    let mut malformed = 0;

    for (number, line) in reader.split(b'\n').enumerate() {
        let bytes = match line {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Stopped reading {} at line {}: {}", source.display(), number + 1, e);
                malformed += 1;
                break;
            }
        };

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                warn!("{}:{}: not valid UTF-8", source.display(), number + 1);
                malformed += 1;
                continue;
            }
        };

        let text = text.strip_suffix('\r').unwrap_or(&text);
        if text.trim().is_empty() {
            continue;
        }

        let path = PathBuf::from(text);
        if path.is_absolute() {
            entries.push(path);
        } else {
            warn!("{}:{}: '{}' is not an absolute path", source.display(), number + 1, text);
            malformed += 1;
        }
    }

    (entries, malformed)
}
