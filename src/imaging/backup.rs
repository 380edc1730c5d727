//! Backups taken before any image is overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::error::PrepError;

/// `{prefix}_%Y%m%d_%H%M%S` directory under `root`, named from the local clock.
pub fn timestamped_backup_dir(root: &Path, prefix: &str) -> PathBuf {
    root.join(format!("{prefix}_{}", Local::now().format("%Y%m%d_%H%M%S")))
}

fn backup_path(file: &Path, dir: &Path) -> Result<PathBuf, PrepError> {
    let name = file
        .file_name()
        .ok_or_else(|| PrepError::NotFound(file.to_path_buf()))?;
    Ok(dir.join(name))
}

fn ensure_dir(dir: &Path) -> Result<(), PrepError> {
    fs::create_dir_all(dir).map_err(|err| PrepError::io(dir, err))
}

/// Copy `file` into `dir` byte for byte, creating `dir`. Returns the backup path.
pub fn backup_copy(file: &Path, dir: &Path) -> Result<PathBuf, PrepError> {
    ensure_dir(dir)?;
    let target = backup_path(file, dir)?;
    fs::copy(file, &target).map_err(|err| PrepError::io(file, err))?;
    debug!(file = %file.display(), backup = %target.display(), "backup copied");
    Ok(target)
}

/// Move `file` into `dir` unless a backup of the same name already exists.
///
/// An earlier backup is kept as the pristine original and `file` stays where it is.
pub fn move_to_backup(file: &Path, dir: &Path) -> Result<PathBuf, PrepError> {
    ensure_dir(dir)?;
    let target = backup_path(file, dir)?;
    if target.exists() {
        debug!(backup = %target.display(), "keeping earlier backup");
        return Ok(target);
    }
    fs::rename(file, &target).map_err(|err| PrepError::io(file, err))?;
    debug!(file = %file.display(), backup = %target.display(), "moved to backup");
    Ok(target)
}

/// Move a backup back over the original path.
pub fn restore(backup: &Path, original: &Path) -> Result<(), PrepError> {
    fs::rename(backup, original).map_err(|err| PrepError::io(backup, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_byte_identically() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.png");
        fs::write(&file, [0u8, 1, 2, 255]).unwrap();

        let backup = backup_copy(&file, &dir.path().join("nested/backup")).unwrap();
        assert_eq!(fs::read(&backup).unwrap(), fs::read(&file).unwrap());
    }

    #[test]
    fn move_keeps_existing_backup() {
        let dir = tempdir().unwrap();
        let backups = dir.path().join("compressed_backup");
        let file = dir.path().join("a.png");
        fs::create_dir_all(&backups).unwrap();
        fs::write(backups.join("a.png"), b"first").unwrap();
        fs::write(&file, b"second").unwrap();

        let backup = move_to_backup(&file, &backups).unwrap();
        assert_eq!(fs::read(&backup).unwrap(), b"first");
        assert!(file.exists());
    }

    #[test]
    fn move_and_restore_round_trip() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.png");
        fs::write(&file, b"data").unwrap();

        let backup = move_to_backup(&file, &dir.path().join("bk")).unwrap();
        assert!(!file.exists());
        restore(&backup, &file).unwrap();
        assert_eq!(fs::read(&file).unwrap(), b"data");
    }

    #[test]
    fn timestamped_names_use_prefix() {
        let dir = timestamped_backup_dir(Path::new("site"), "backup_instant_optimization");
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("backup_instant_optimization_"));
        assert_eq!(name.len(), "backup_instant_optimization_".len() + 15);
    }
}
