pub mod audio;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod playlist;

mod staging;

#[cfg(test)]
mod test_support;


pub use error::*;
pub use library::{Library, LibraryScanner, ScanOutcome, Track, TrackFactory, TrackSource, WorkerPool};
pub use models::*;
pub use playlist::{LoadOutcome, Playlist, PlaylistStore, RenameOutcome};
