//! Permissions for files written through a temporary sibling.
//!
//! Temporary files are created owner-only, so a staged file has to pick up
//! the mode its destination should have before it is renamed into place.

use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Mode for newly created playlist and directory-list files
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Give `staged` the permissions of `destination`, or the default mode for
/// new files when there is no destination yet
pub(crate) fn inherit_permissions(staged: &File, destination: &Path) -> io::Result<()> {
    match fs::metadata(destination) {
        Ok(existing) => staged.set_permissions(existing.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => new_file_permissions(staged),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn new_file_permissions(staged: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    staged.set_permissions(fs::Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
fn new_file_permissions(_staged: &File) -> io::Result<()> {
    Ok(())
}
