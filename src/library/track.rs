use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::info;

use crate::audio::MetadataCodec;
use crate::error::{CodecError, TrackError};
use crate::models::{AudioFormat, TagField, TrackMetadata};

/// One playable file plus its cached title/artist/album.
///
/// Equality (and hashing) only looks at the three metadata fields, so the
/// same song reached through two paths compares equal.
#[derive(Debug)]
pub struct Track {
    title: String,
    artist: String,
    album: String,
    path: PathBuf,
    format: AudioFormat,
    editable: OnceLock<bool>,
}

impl Track {
    /// Build a track from raw tag values, applying the file-name fallback
    pub(crate) fn from_metadata(path: PathBuf, format: AudioFormat, metadata: TrackMetadata) -> Self {
        let title = metadata
            .title
            .unwrap_or_else(|| Self::fallback_title(&path));

        Self {
            title,
            artist: metadata.artist.unwrap_or_default(),
            album: metadata.album.unwrap_or_default(),
            path,
            format,
            editable: OnceLock::new(),
        }
    }

    /// Field-for-field copy, including any cached editability verdict
    pub(crate) fn copy_parts(&self) -> Self {
        let editable = OnceLock::new();
        if let Some(verdict) = self.editable.get() {
            let _ = editable.set(*verdict);
        }

        Self {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            path: self.path.clone(),
            format: self.format,
            editable,
        }
    }

    /// File name without its extension
    pub fn fallback_title(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn get(&self, field: TagField) -> &str {
        match field {
            TagField::Title => &self.title,
            TagField::Artist => &self.artist,
            TagField::Album => &self.album,
        }
    }

    /// Absolute path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Whether every field survives a write-then-read cycle on this file.
    ///
    /// Evaluated on first call against a scratch copy and cached.
    pub fn can_edit(&self) -> bool {
        *self.editable.get_or_init(|| {
            self.format.supports_tag_write()
                && MetadataCodec::verify_round_trip(&self.path, self.format, &self.metadata())
        })
    }

    /// Current values as a tag set (fallback title included)
    pub fn metadata(&self) -> TrackMetadata {
        let mut metadata = TrackMetadata::new();
        for field in TagField::ALL {
            metadata.set(field, Some(self.get(field).to_string()));
        }
        metadata
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), TrackError> {
        self.set(TagField::Title, title)
    }

    pub fn set_artist(&mut self, artist: &str) -> Result<(), TrackError> {
        self.set(TagField::Artist, artist)
    }

    pub fn set_album(&mut self, album: &str) -> Result<(), TrackError> {
        self.set(TagField::Album, album)
    }

    /// Write a field to the file, then mirror it in memory.
    ///
    /// On failure the in-memory value is left unchanged.
    pub fn set(&mut self, field: TagField, value: &str) -> Result<(), TrackError> {
        if !self.format.supports_tag_write() {
            return Err(TrackError::Codec(CodecError::UnsupportedFormat {
                format: self.format.name().to_string(),
            }));
        }

        MetadataCodec::write(&self.path, self.format, field, value)?;

        let blank = value.trim().is_empty();
        match field {
            TagField::Title if blank => self.title = Self::fallback_title(&self.path),
            TagField::Title => self.title = value.to_string(),
            TagField::Artist if blank => self.artist.clear(),
            TagField::Artist => self.artist = value.to_string(),
            TagField::Album if blank => self.album.clear(),
            TagField::Album => self.album = value.to_string(),
        }

        info!("Updated {} of {}", field.as_str(), self.path.display());
        Ok(())
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.artist == other.artist && self.album == other.album
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.artist.hash(state);
        self.album.hash(state);
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artist.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.artist, self.title)
        }
    }
}
