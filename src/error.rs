use std::path::PathBuf;
use thiserror::Error;

/// Main library error type
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),
}

impl LibraryError {
    /// Get user-friendly error message with suggested solutions
    pub fn user_message(&self) -> String {
        match self {
            LibraryError::Codec(err) => err.user_message(),
            LibraryError::Track(err) => err.user_message(),
            LibraryError::File(err) => Self::format_file_error(err),
            LibraryError::Config(err) => err.user_message(),
            LibraryError::Playlist(err) => err.user_message(),
        }
    }

    /// Get suggested recovery actions for the error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            LibraryError::Codec(err) => err.recovery_suggestions(),
            LibraryError::Track(err) => err.recovery_suggestions(),
            LibraryError::File(err) => Self::file_error_suggestions(err),
            LibraryError::Config(err) => err.recovery_suggestions(),
            LibraryError::Playlist(err) => err.recovery_suggestions(),
        }
    }

    /// Check if this error allows for automatic recovery
    pub fn is_recoverable(&self) -> bool {
        match self {
            LibraryError::Codec(err) => err.is_recoverable(),
            LibraryError::Track(err) => err.is_recoverable(),
            LibraryError::File(_) => false,
            LibraryError::Config(err) => err.is_recoverable(),
            LibraryError::Playlist(err) => err.is_recoverable(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LibraryError::Codec(CodecError::UnsupportedFormat { .. }) => ErrorSeverity::Info,
            LibraryError::Codec(CodecError::TagRead { .. }) => ErrorSeverity::Warning,
            LibraryError::Codec(_) => ErrorSeverity::Error,
            LibraryError::Track(TrackError::UnsupportedFileType { .. }) => ErrorSeverity::Info,
            LibraryError::Track(_) => ErrorSeverity::Warning,
            LibraryError::File(_) => ErrorSeverity::Error,
            LibraryError::Config(_) => ErrorSeverity::Warning,
            LibraryError::Playlist(PlaylistError::IoError(_)) => ErrorSeverity::Error,
            LibraryError::Playlist(_) => ErrorSeverity::Warning,
        }
    }

    fn format_file_error(err: &std::io::Error) -> String {
        match err.kind() {
            std::io::ErrorKind::NotFound => "File or directory not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "Permission denied - cannot access file".to_string(),
            std::io::ErrorKind::InvalidData => "File contains invalid or corrupted data".to_string(),
            _ => format!("File system error: {}", err),
        }
    }

    fn file_error_suggestions(err: &std::io::Error) -> Vec<String> {
        match err.kind() {
            std::io::ErrorKind::NotFound => vec![
                "Check that the file path is correct".to_string(),
                "Refresh the library to pick up moved files".to_string(),
            ],
            std::io::ErrorKind::PermissionDenied => vec![
                "Check file permissions".to_string(),
                "Ensure the file is not locked by another application".to_string(),
            ],
            _ => vec!["Try the operation again".to_string()],
        }
    }
}

/// Error severity levels for logging and user feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
        }
    }

    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        }
    }
}

/// Tag reading and writing errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Tag editing is not supported for {format} files")]
    UnsupportedFormat { format: String },

    #[error("Failed to read tags from {}: {source}", .path.display())]
    TagRead {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("Failed to commit tags to {}: {reason}", .path.display())]
    Commit { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub fn user_message(&self) -> String {
        match self {
            CodecError::UnsupportedFormat { format } => {
                format!("Song information cannot be edited for {} files", format)
            }
            CodecError::TagRead { path, .. } => {
                format!("The tags of '{}' could not be read", path.display())
            }
            CodecError::Commit { path, .. } => {
                format!("Changes could not be saved to '{}'", path.display())
            }
            CodecError::Io(err) => format!("Cannot access audio file: {}", err),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            CodecError::UnsupportedFormat { .. } => vec![
                "Convert the file to MP3 or M4A to edit its tags".to_string(),
            ],
            CodecError::TagRead { .. } => vec![
                "The file may be damaged - try re-copying it".to_string(),
                "Re-tag the file with another tag editor".to_string(),
            ],
            CodecError::Commit { .. } | CodecError::Io(_) => vec![
                "Check that the file is not read-only".to_string(),
                "Ensure the disk is not full".to_string(),
                "Close other applications using the file".to_string(),
            ],
        }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            CodecError::UnsupportedFormat { .. } => false,
            CodecError::TagRead { .. } => true, // falls back to the file name
            CodecError::Commit { .. } => true,
            CodecError::Io(_) => true,
        }
    }
}

/// Track construction and editing errors
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Unsupported file type: {}", .path.display())]
    UnsupportedFileType { path: PathBuf },

    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackError {
    pub fn user_message(&self) -> String {
        match self {
            TrackError::UnsupportedFileType { path } => {
                format!("File '{}' is not a supported audio format", path.display())
            }
            TrackError::NotFound { path } => {
                format!("Cannot find audio file: {}", path.display())
            }
            TrackError::Codec(err) => err.user_message(),
            TrackError::Io(err) => format!("Cannot access audio file: {}", err),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            TrackError::UnsupportedFileType { .. } => vec![
                "Supported formats: MP3, M4A/MP4, WAV".to_string(),
                "File extensions are case-sensitive (.mp3, not .MP3)".to_string(),
            ],
            TrackError::NotFound { .. } => vec![
                "Check that the file path is correct".to_string(),
                "The file may have been moved or deleted".to_string(),
            ],
            TrackError::Codec(err) => err.recovery_suggestions(),
            TrackError::Io(_) => vec!["Try the operation again".to_string()],
        }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            TrackError::UnsupportedFileType { .. } => false,
            TrackError::NotFound { .. } => false,
            TrackError::Codec(err) => err.is_recoverable(),
            TrackError::Io(_) => true,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    ConfigDirNotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::ConfigDirNotFound => {
                "Cannot find or create configuration directory".to_string()
            }
            ConfigError::IoError(err) => {
                format!("Cannot access configuration file: {}", err)
            }
            ConfigError::SerializationError(_) => {
                "Failed to save configuration settings".to_string()
            }
            ConfigError::DeserializationError(_) => {
                "Configuration file is corrupted or has invalid format".to_string()
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::ConfigDirNotFound => vec![
                "Check that you have write permissions to your home directory".to_string(),
                "Try creating the directory manually: ~/.config/tunejar/".to_string(),
            ],
            ConfigError::IoError(_) => vec![
                "Check file permissions for the configuration directory".to_string(),
                "Ensure the disk is not full".to_string(),
            ],
            ConfigError::SerializationError(_) => vec![
                "Try resetting configuration to defaults".to_string(),
            ],
            ConfigError::DeserializationError(_) => vec![
                "Delete the configuration file to reset to defaults".to_string(),
                "Check the configuration file format manually".to_string(),
            ],
        }
    }

    pub fn is_recoverable(&self) -> bool {
        true // defaults are always available
    }
}

/// Playlist-related errors
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Playlist not found: {name}")]
    PlaylistNotFound { name: String },

    #[error("Invalid playlist name: {name:?}")]
    InvalidName { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PlaylistError {
    pub fn user_message(&self) -> String {
        match self {
            PlaylistError::PlaylistNotFound { name } => {
                format!("Playlist '{}' does not exist", name)
            }
            PlaylistError::InvalidName { name } => {
                format!("'{}' cannot be used as a playlist name", name)
            }
            PlaylistError::IoError(err) => {
                format!("Cannot access playlist file: {}", err)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PlaylistError::PlaylistNotFound { .. } => vec![
                "Check the playlist name spelling".to_string(),
                "The playlist file may have been removed outside the application".to_string(),
            ],
            PlaylistError::InvalidName { .. } => vec![
                "Playlist names cannot be empty".to_string(),
                "Playlist names cannot contain '/' or '\\'".to_string(),
            ],
            PlaylistError::IoError(_) => vec![
                "Check file permissions for the playlist directory".to_string(),
                "Ensure the disk is not full".to_string(),
            ],
        }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            PlaylistError::PlaylistNotFound { .. } => false,
            PlaylistError::InvalidName { .. } => false,
            PlaylistError::IoError(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_library_error_from_codec_error() {
        let codec_error = CodecError::UnsupportedFormat {
            format: "WAV".to_string(),
        };
        let library_error: LibraryError = codec_error.into();

        match library_error {
            LibraryError::Codec(CodecError::UnsupportedFormat { format }) => {
                assert_eq!(format, "WAV");
            }
            _ => panic!("Expected Codec error variant"),
        }
    }

    #[test]
    fn test_library_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let library_error: LibraryError = io_error.into();

        assert!(matches!(library_error, LibraryError::File(_)));
        assert_eq!(library_error.user_message(), "File or directory not found");
        assert!(!library_error.is_recoverable());
    }

    #[test]
    fn test_track_error_display() {
        let error = TrackError::UnsupportedFileType {
            path: PathBuf::from("/music/cover.jpg"),
        };
        assert_eq!(format!("{}", error), "Unsupported file type: /music/cover.jpg");

        let error = TrackError::NotFound {
            path: PathBuf::from("/music/gone.mp3"),
        };
        assert_eq!(format!("{}", error), "File not found: /music/gone.mp3");
    }

    #[test]
    fn test_codec_error_display() {
        let error = CodecError::UnsupportedFormat {
            format: "WAV".to_string(),
        };
        assert_eq!(format!("{}", error), "Tag editing is not supported for WAV files");

        let error = CodecError::Commit {
            path: PathBuf::from("/music/a.mp3"),
            reason: "disk full".to_string(),
        };
        assert_eq!(format!("{}", error), "Failed to commit tags to /music/a.mp3: disk full");
    }

    #[test]
    fn test_track_error_wraps_codec_error_transparently() {
        let error: TrackError = CodecError::UnsupportedFormat {
            format: "WAV".to_string(),
        }
        .into();
        assert_eq!(format!("{}", error), "Tag editing is not supported for WAV files");
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_playlist_error_display() {
        let error = PlaylistError::PlaylistNotFound {
            name: "Road Trip".to_string(),
        };
        assert_eq!(format!("{}", error), "Playlist not found: Road Trip");

        let error = PlaylistError::InvalidName {
            name: "a/b".to_string(),
        };
        assert_eq!(format!("{}", error), "Invalid playlist name: \"a/b\"");
    }

    #[test]
    fn test_severity_mapping() {
        let error = LibraryError::Track(TrackError::UnsupportedFileType {
            path: PathBuf::from("x.txt"),
        });
        assert_eq!(error.severity(), ErrorSeverity::Info);
        assert_eq!(error.severity().log_level(), log::Level::Info);

        let error = LibraryError::Playlist(PlaylistError::IoError(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        )));
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert_eq!(error.severity().as_str(), "ERROR");
    }

    #[test]
    fn test_every_severity_is_produced() {
        let errors: Vec<LibraryError> = vec![
            CodecError::UnsupportedFormat {
                format: "WAV".to_string(),
            }
            .into(),
            PlaylistError::InvalidName {
                name: "..".to_string(),
            }
            .into(),
            io::Error::new(io::ErrorKind::Other, "disk").into(),
        ];
        let produced: Vec<_> = errors.iter().map(LibraryError::severity).collect();

        for severity in [ErrorSeverity::Info, ErrorSeverity::Warning, ErrorSeverity::Error] {
            // Exhaustive, so a new level has to be listed here
            let level = match severity {
                ErrorSeverity::Info => log::Level::Info,
                ErrorSeverity::Warning => log::Level::Warn,
                ErrorSeverity::Error => log::Level::Error,
            };
            assert!(produced.contains(&severity), "{} is never produced", severity.as_str());
            assert_eq!(severity.log_level(), level);
        }
    }

    #[test]
    fn test_error_chain() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "Config file not found");
        let config_error: ConfigError = io_error.into();
        let library_error: LibraryError = config_error.into();

        let error_string = format!("{}", library_error);
        assert!(error_string.contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied");
        let playlist_error = PlaylistError::IoError(io_error);
        let library_error = LibraryError::Playlist(playlist_error);

        let mut current_error: &dyn Error = &library_error;
        let mut error_count = 0;

        while let Some(source) = current_error.source() {
            current_error = source;
            error_count += 1;
        }

        assert!(error_count >= 1);
    }

    #[test]
    fn test_recovery_suggestions_not_empty() {
        let errors = vec![
            LibraryError::Codec(CodecError::UnsupportedFormat { format: "WAV".to_string() }),
            LibraryError::Track(TrackError::NotFound { path: PathBuf::from("a.mp3") }),
            LibraryError::Config(ConfigError::ConfigDirNotFound),
            LibraryError::Playlist(PlaylistError::InvalidName { name: String::new() }),
        ];

        for error in errors {
            assert!(!error.recovery_suggestions().is_empty(), "no suggestions for {}", error);
        }
    }
}
