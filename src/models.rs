use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Separator written after each line of playlist and directory-list files
#[cfg(windows)]
pub(crate) const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub(crate) const LINE_ENDING: &str = "\n";

/// Audio container formats the library knows how to classify
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mp3,
    Mp4,
    Wav,
    Unsupported,
}

impl AudioFormat {
    /// Classify a file by its name suffix.
    ///
    /// The match is case-sensitive: `song.MP3` is `Unsupported`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let name = match path.as_ref().file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return AudioFormat::Unsupported,
        };

        if name.ends_with(".mp3") {
            AudioFormat::Mp3
        } else if name.ends_with(".mp4") || name.ends_with(".m4a") {
            AudioFormat::Mp4
        } else if name.ends_with(".wav") {
            AudioFormat::Wav
        } else {
            AudioFormat::Unsupported
        }
    }

    /// Get the human-readable name of the format
    pub fn name(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Mp4 => "MP4/M4A",
            AudioFormat::Wav => "WAV",
            AudioFormat::Unsupported => "Unsupported",
        }
    }

    /// Whether a Track can be built from a file of this format
    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unsupported)
    }

    /// Whether tags can be written back into files of this format
    pub fn supports_tag_write(&self) -> bool {
        matches!(self, AudioFormat::Mp3 | AudioFormat::Mp4)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the three editable text fields of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Title,
    Artist,
    Album,
}

impl TagField {
    pub const ALL: [TagField; 3] = [TagField::Title, TagField::Artist, TagField::Album];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagField::Title => "title",
            TagField::Artist => "artist",
            TagField::Album => "album",
        }
    }
}

/// Raw tag values as found in a file. `None` means the field is absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl TrackMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if metadata has any information
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.album.is_none()
    }

    pub fn get(&self, field: TagField) -> Option<&str> {
        match field {
            TagField::Title => self.title.as_deref(),
            TagField::Artist => self.artist.as_deref(),
            TagField::Album => self.album.as_deref(),
        }
    }

    /// Set a field; blank values clear it.
    pub fn set(&mut self, field: TagField, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        match field {
            TagField::Title => self.title = value,
            TagField::Artist => self.artist = value,
            TagField::Album => self.album = value,
        }
    }

    /// Fill every absent field from `other`
    pub fn merge_missing(&mut self, other: TrackMetadata) {
        if self.title.is_none() {
            self.title = other.title;
        }
        if self.artist.is_none() {
            self.artist = other.artist;
        }
        if self.album.is_none() {
            self.album = other.album;
        }
    }
}
