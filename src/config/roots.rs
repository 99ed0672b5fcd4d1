//! The directory list file: which folders the library scans.
//!
//! Plain text, one absolute directory path per line. Lines are parsed
//! independently so one bad line never loses the rest of the list.

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::ConfigError;
use crate::models::LINE_ENDING;
use crate::staging;

/// Read the directory list. A missing file is an empty list.
pub fn load(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No directory list at {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(ConfigError::IoError(e)),
    };

    let mut directories: Vec<PathBuf> = Vec::new();
    for (number, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = String::from_utf8(line?);
        let text = match &line {
            Ok(text) => text.strip_suffix('\r').unwrap_or(text),
            Err(_) => {
                warn!("{}:{}: not valid UTF-8", path.display(), number + 1);
                continue;
            }
        };
        if text.trim().is_empty() {
            continue;
        }

        let directory = PathBuf::from(text);
        if !directory.is_absolute() {
            warn!("{}:{}: '{}' is not an absolute path", path.display(), number + 1, text);
        } else if !directories.contains(&directory) {
            directories.push(directory);
        }
    }

    Ok(directories)
}

/// Replace the directory list with `directories`, atomically
pub fn save(path: &Path, directories: &[PathBuf]) -> Result<(), ConfigError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let staged = tempfile::Builder::new()
        .prefix(".tunejar-")
        .suffix(".tmp")
        .tempfile_in(&parent)?;

    {
        let mut writer = BufWriter::new(staged.as_file());
        for directory in directories {
            match directory.to_str() {
                Some(line) => {
                    writer.write_all(line.as_bytes())?;
                    writer.write_all(LINE_ENDING.as_bytes())?;
                }
                None => warn!("Not saving {}: path is not valid UTF-8", directory.display()),
            }
        }
        writer.flush()?;
    }
    staging::inherit_permissions(staged.as_file(), path)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| ConfigError::IoError(e.error))?;

    debug!("Saved {} directories to {}", directories.len(), path.display());
    Ok(())
}
