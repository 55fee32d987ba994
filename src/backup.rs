// Backup and restore of target files
//
// A target is always copied to `<file>.backup` before it is touched. The copy keeps
// the source timestamps and is verified by size and BLAKE3 digest before the
// caller is allowed to mutate anything.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::constants::BACKUP_SUFFIX;
use crate::error::{MaintenanceError, Result};
use crate::hash;

/// `name.ext` -> `name.ext.backup`, same directory.
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Copy `path` to its backup location, overwriting any previous backup.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(MaintenanceError::NotFound(path.to_path_buf()));
    }

    let backup = backup_path_for(path);
    copy_with_verify(path, &backup).map_err(|e| MaintenanceError::BackupFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    log::debug!("Backup of {} written to {}", path.display(), backup.display());
    Ok(backup)
}

/// Overwrite `target` with the bytes of `backup`.
pub fn restore_from_backup(backup: &Path, target: &Path) -> Result<()> {
    if !backup.is_file() {
        return Err(MaintenanceError::RestoreFailed {
            backup: backup.to_path_buf(),
            reason: "backup file is missing".to_string(),
        });
    }

    copy_with_verify(backup, target).map_err(|e| MaintenanceError::RestoreFailed {
        backup: backup.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Copy file, preserve timestamps, then read back and compare digests.
fn copy_with_verify(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest)?;
    fs::OpenOptions::new().write(true).open(dest)?.sync_all()?;

    let source_meta = fs::metadata(source)?;
    let mtime = FileTime::from_last_modification_time(&source_meta);
    let atime = FileTime::from_last_access_time(&source_meta);
    if let Err(e) = filetime::set_file_times(dest, atime, mtime) {
        log::warn!("Could not preserve timestamps on {}: {}", dest.display(), e);
    }

    if !hash::files_match(source, dest)? {
        return Err(MaintenanceError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("verification failed: {} differs from {}", dest.display(), source.display()),
        )));
    }

    Ok(())
}
