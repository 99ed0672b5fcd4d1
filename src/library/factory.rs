use std::env;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::audio::MetadataCodec;
use crate::error::TrackError;
use crate::library::track::Track;
use crate::models::{AudioFormat, TrackMetadata};

/// Something that can turn a file into a Track.
///
/// The scanner and the playlist store are generic over this so the
/// construction step can be swapped out.
pub trait TrackSource: Send + Sync {
    /// Strict construction: unsupported or missing files are errors
    fn create(&self, path: &Path) -> Result<Track, TrackError>;

    /// Lenient construction: anything that cannot become a Track is `None`
    fn create_or_skip(&self, path: &Path) -> Option<Track> {
        match self.create(path) {
            Ok(track) => Some(track),
            Err(TrackError::UnsupportedFileType { path }) => {
                debug!("Skipping unsupported file {}", path.display());
                None
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Dispatches files to the matching codec and builds Tracks
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackFactory;

impl TrackFactory {
    pub fn new() -> Self {
        Self
    }

    /// Build a Track, failing on unrecognised extensions
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Track, TrackError> {
        let path = Self::absolute(path.as_ref())?;

        let format = AudioFormat::from_path(&path);
        if !format.is_supported() {
            return Err(TrackError::UnsupportedFileType { path });
        }
        if !path.is_file() {
            return Err(TrackError::NotFound { path });
        }

        let metadata = match format {
            AudioFormat::Mp3 | AudioFormat::Mp4 => Self::read_or_fallback(&path, format),
            AudioFormat::Wav => TrackMetadata::new(),
            AudioFormat::Unsupported => return Err(TrackError::UnsupportedFileType { path }),
        };

        Ok(Track::from_metadata(path, format, metadata))
    }

    /// Build a Track, or `None` when the file cannot be one
    pub fn create_or_skip<P: AsRef<Path>>(path: P) -> Option<Track> {
        TrackSource::create_or_skip(&TrackFactory, path.as_ref())
    }

    /// Produce an independent Track with identical metadata and path.
    ///
    /// # Panics
    ///
    /// Panics if `track` has a format without duplication support. No
    /// constructor produces such a track, so reaching it is a bug.
    pub fn duplicate(track: &Track) -> Track {
        match track.format() {
            AudioFormat::Mp3 | AudioFormat::Mp4 | AudioFormat::Wav => track.copy_parts(),
            AudioFormat::Unsupported => panic!(
                "track {} has a format without duplication support",
                track.path().display()
            ),
        }
    }

    /// Unreadable tags degrade to the file-name title instead of failing
    fn read_or_fallback(path: &Path, format: AudioFormat) -> TrackMetadata {
        match MetadataCodec::read(path, format) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("{}; using file name as title", e);
                TrackMetadata::new()
            }
        }
    }

    fn absolute(path: &Path) -> Result<PathBuf, TrackError> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(env::current_dir()?.join(path))
        }
    }
}

impl TrackSource for TrackFactory {
    fn create(&self, path: &Path) -> Result<Track, TrackError> {
        TrackFactory::create(path)
    }
}
