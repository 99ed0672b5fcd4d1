pub mod metadata;

// Re-export metadata codec
pub use metadata::MetadataCodec;

// Re-export models for convenience
pub use crate::models::{AudioFormat, TagField, TrackMetadata};
