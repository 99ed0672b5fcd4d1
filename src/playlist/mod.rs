pub mod store;

use std::ops::Index;
use std::path::PathBuf;
use std::slice::{self, SliceIndex};

use crate::error::PlaylistError;
use crate::library::{Track, TrackFactory, TrackSource};

pub use store::{LoadOutcome, PlaylistStore, RenameOutcome, PLAYLIST_EXTENSION};

/// A named, ordered list of tracks.
///
/// Every track handed to `add`, `insert` or `set` is duplicated first, so a
/// playlist never shares a Track with its caller or with another playlist.
/// Equal tracks may appear more than once.
#[derive(Debug)]
pub struct Playlist {
    name: String,
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename in memory only. Use `PlaylistStore::rename` to move the file.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Borrow a sub-range, or `None` if it is out of bounds
    pub fn slice<R>(&self, range: R) -> Option<&[Track]>
    where
        R: SliceIndex<[Track], Output = [Track]>,
    {
        self.tracks.get(range)
    }

    /// Append a copy of `track`. Always inserts.
    pub fn add(&mut self, track: &Track) -> bool {
        self.tracks.push(TrackFactory::duplicate(track));
        true
    }

    /// Append copies of every track in order; true if anything was added
    pub fn add_all<'a, I>(&mut self, tracks: I) -> bool
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let mut changed = false;
        for track in tracks {
            changed |= self.add(track);
        }
        changed
    }

    /// Insert a copy of `track` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, track: &Track) {
        self.tracks.insert(index, TrackFactory::duplicate(track));
    }

    /// Replace the track at `index` with a copy of `track`, returning the old one
    pub fn set(&mut self, index: usize, track: &Track) -> Option<Track> {
        let slot = self.tracks.get_mut(index)?;
        Some(std::mem::replace(slot, TrackFactory::duplicate(track)))
    }

    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index < self.tracks.len() {
            Some(self.tracks.remove(index))
        } else {
            None
        }
    }

    /// Remove the first track equal to `track`
    pub fn remove_track(&mut self, track: &Track) -> bool {
        match self.index_of(track) {
            Some(index) => {
                self.tracks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, track: &Track) -> bool {
        self.tracks.contains(track)
    }

    pub fn index_of(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|t| t == track)
    }

    pub fn last_index_of(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().rposition(|t| t == track)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Write this playlist into the store's directory, replacing any previous file
    pub fn save<S: TrackSource + 'static>(&self, store: &PlaylistStore<S>) -> Result<PathBuf, PlaylistError> {
        store.save(self, store.directory())
    }
}

impl Clone for Playlist {
    fn clone(&self) -> Self {
        let mut copy = Playlist::new(self.name.clone());
        copy.add_all(&self.tracks);
        copy
    }
}

impl Index<usize> for Playlist {
    type Output = Track;

    fn index(&self, index: usize) -> &Track {
        &self.tracks[index]
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
