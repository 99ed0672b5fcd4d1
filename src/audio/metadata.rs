use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::TaggedFile;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{Tag, TagType};
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::CodecError;
use crate::models::{AudioFormat, TagField, TrackMetadata};
use crate::staging;

/// Reads and writes the title/artist/album tags of audio files using lofty
pub struct MetadataCodec;

impl MetadataCodec {
    /// Read the raw tag values of a file.
    ///
    /// WAV files carry no readable metadata here, so they always yield an
    /// empty set and the caller falls back to the file name.
    pub fn read<P: AsRef<Path>>(path: P, format: AudioFormat) -> Result<TrackMetadata, CodecError> {
        let path = path.as_ref();
        match format {
            AudioFormat::Mp3 | AudioFormat::Mp4 => {
                let tagged_file = Self::open(path)?;
                Ok(Self::metadata_of(&tagged_file, format))
            }
            AudioFormat::Wav | AudioFormat::Unsupported => Ok(TrackMetadata::new()),
        }
    }

    /// Change a single field and commit it to disk.
    ///
    /// The file is copied to a temporary sibling, the copy is re-tagged and
    /// then renamed over the original. Symlinks are resolved first so the
    /// link stays in place. A blank value removes the field.
    pub fn write<P: AsRef<Path>>(
        path: P,
        format: AudioFormat,
        field: TagField,
        value: &str,
    ) -> Result<(), CodecError> {
        Self::write_fields(path, format, &[(field, value)])
    }

    /// Change several fields in one commit
    pub fn write_fields<P: AsRef<Path>>(
        path: P,
        format: AudioFormat,
        changes: &[(TagField, &str)],
    ) -> Result<(), CodecError> {
        let path = path.as_ref();
        if !format.supports_tag_write() {
            return Err(CodecError::UnsupportedFormat {
                format: format.name().to_string(),
            });
        }

        // Commit to the file a symlink points at, not over the link itself
        let target = fs::canonicalize(path)?;
        let staged = Self::stage_copy(&target)?;
        Self::apply(staged.path(), format, changes)?;

        staged.persist(&target).map_err(|e| CodecError::Commit {
            path: target.clone(),
            reason: e.error.to_string(),
        })?;

        debug!("Committed {} tag change(s) to {}", changes.len(), target.display());
        Ok(())
    }

    /// Check that `expected` survives a write-then-read cycle.
    ///
    /// Works on a throwaway copy; the original file is never modified.
    pub fn verify_round_trip<P: AsRef<Path>>(path: P, format: AudioFormat, expected: &TrackMetadata) -> bool {
        let path = path.as_ref();
        if !format.supports_tag_write() {
            return false;
        }

        match Self::try_round_trip(path, format, expected) {
            Ok(true) => true,
            Ok(false) => {
                warn!("Tags of {} did not survive a write-then-read check", path.display());
                false
            }
            Err(e) => {
                warn!("Tags of {} are not editable: {}", path.display(), e);
                false
            }
        }
    }

    fn try_round_trip(path: &Path, format: AudioFormat, expected: &TrackMetadata) -> Result<bool, CodecError> {
        let mut normalized = TrackMetadata::new();
        for field in TagField::ALL {
            normalized.set(field, expected.get(field).map(str::to_string));
        }

        let staged = Self::stage_copy(path)?;
        let changes: Vec<(TagField, &str)> = TagField::ALL
            .iter()
            .map(|field| (*field, normalized.get(*field).unwrap_or("")))
            .collect();
        Self::apply(staged.path(), format, &changes)?;

        let reread = Self::read(staged.path(), format)?;
        Ok(reread == normalized)
    }

    fn open(path: &Path) -> Result<TaggedFile, CodecError> {
        Probe::open(path)
            .and_then(|probe| probe.options(ParseOptions::new().read_properties(false)).read())
            .map_err(|source| CodecError::TagRead {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Collect the fields of the tag types relevant to `format`.
    ///
    /// MP3 prefers ID3v2 and only consults ID3v1 for fields ID3v2 lacks.
    fn metadata_of(tagged_file: &TaggedFile, format: AudioFormat) -> TrackMetadata {
        match format {
            AudioFormat::Mp3 => {
                let mut metadata = tagged_file
                    .tag(TagType::Id3v2)
                    .map(Self::fields_of)
                    .unwrap_or_default();
                if let Some(v1) = tagged_file.tag(TagType::Id3v1) {
                    metadata.merge_missing(Self::fields_of(v1));
                }
                metadata
            }
            AudioFormat::Mp4 => tagged_file
                .tag(TagType::Mp4Ilst)
                .map(Self::fields_of)
                .unwrap_or_default(),
            AudioFormat::Wav | AudioFormat::Unsupported => TrackMetadata::new(),
        }
    }

    fn fields_of(tag: &Tag) -> TrackMetadata {
        let mut metadata = TrackMetadata::new();
        metadata.set(TagField::Title, tag.title().map(|v| v.to_string()));
        metadata.set(TagField::Artist, tag.artist().map(|v| v.to_string()));
        metadata.set(TagField::Album, tag.album().map(|v| v.to_string()));
        metadata
    }

    fn primary_tag_type(format: AudioFormat) -> Option<TagType> {
        match format {
            AudioFormat::Mp3 => Some(TagType::Id3v2),
            AudioFormat::Mp4 => Some(TagType::Mp4Ilst),
            AudioFormat::Wav | AudioFormat::Unsupported => None,
        }
    }

    /// Re-tag `target` in place
    fn apply(target: &Path, format: AudioFormat, changes: &[(TagField, &str)]) -> Result<(), CodecError> {
        let tag_type = Self::primary_tag_type(format).ok_or_else(|| CodecError::UnsupportedFormat {
            format: format.name().to_string(),
        })?;

        let mut tagged_file = Self::open(target)?;

        if tagged_file.tag(tag_type).is_none() {
            // Seed a new container so untouched fields keep their values
            let current = Self::metadata_of(&tagged_file, format);
            let mut seeded = Tag::new(tag_type);
            for field in TagField::ALL {
                if let Some(value) = current.get(field) {
                    Self::set_field(&mut seeded, field, value);
                }
            }
            tagged_file.insert_tag(seeded);
        }

        let tag = tagged_file.tag_mut(tag_type).ok_or_else(|| CodecError::Commit {
            path: target.to_path_buf(),
            reason: format!("no {:?} tag available", tag_type),
        })?;
        for (field, value) in changes {
            Self::set_field(tag, *field, value);
        }

        // Keep a trailing ID3v1 tag in step so cleared fields stay cleared
        if let Some(v1) = tagged_file.tag_mut(TagType::Id3v1) {
            for (field, value) in changes {
                Self::set_field(v1, *field, value);
            }
        }

        tagged_file
            .save_to_path(target, WriteOptions::default())
            .map_err(|e| CodecError::Commit {
                path: target.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn set_field(tag: &mut Tag, field: TagField, value: &str) {
        let blank = value.trim().is_empty();
        match field {
            TagField::Title if blank => tag.remove_title(),
            TagField::Title => tag.set_title(value.to_string()),
            TagField::Artist if blank => tag.remove_artist(),
            TagField::Artist => tag.set_artist(value.to_string()),
            TagField::Album if blank => tag.remove_album(),
            TagField::Album => tag.set_album(value.to_string()),
        }
    }

    /// Copy `path` to a hidden temporary file in the same directory.
    ///
    /// The copy keeps the original suffix (lofty detects the container from
    /// it) and the original permissions.
    fn stage_copy(path: &Path) -> Result<NamedTempFile, CodecError> {
        let directory = Self::parent_dir(path);
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let mut staged = tempfile::Builder::new()
            .prefix(".tunejar-")
            .suffix(&suffix)
            .tempfile_in(&directory)?;

        let mut source = File::open(path)?;
        io::copy(&mut source, staged.as_file_mut())?;
        staged.as_file_mut().flush()?;
        staging::inherit_permissions(staged.as_file(), path)?;

        Ok(staged)
    }

    fn parent_dir(path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
