//! File shuffling for the deploy pass: variants to the root, then everything into `images/`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use same_file::is_same_file;
use tracing::{debug, info};

use crate::error::PrepError;

/// Extensions moved into the published images directory.
pub const PUBLISHED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Copy `source` to `destination`, replacing a different file but leaving the same file alone.
///
/// Returns `false` when both paths already name the same file.
pub fn install_file(source: &Path, destination: &Path) -> std::io::Result<bool> {
    if destination.exists() {
        if is_same_file(source, destination)? {
            return Ok(false);
        }
        fs::remove_file(destination)?;
    }

    match fs::copy(source, destination) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err),
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy();
        extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted))
    })
}

/// Regular files directly inside `dir` with one of `extensions`, sorted. A missing `dir` is empty.
pub fn files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, PrepError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(PrepError::io(dir, err)),
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .map(|entry| entry.path())
        .filter(|path| has_extension(path, extensions))
        .collect();
    files.sort();
    Ok(files)
}

/// Copy every file of `extension` in `dir` into `root`. Returns the number copied.
pub fn copy_variants_to_root(dir: &Path, extension: &str, root: &Path) -> Result<usize, PrepError> {
    let mut copied = 0;
    for source in files_with_extensions(dir, &[extension])? {
        let Some(name) = source.file_name() else {
            continue;
        };
        let destination = root.join(name);
        if install_file(&source, &destination).map_err(|err| PrepError::io(&destination, err))? {
            copied += 1;
            debug!(file = %destination.display(), "variant copied");
        }
    }
    info!(dir = %dir.display(), copied, "variants copied to root");
    Ok(copied)
}

/// Move every published image in `root` into `images_dir`, creating it. Returns the number moved.
pub fn move_images_into(root: &Path, images_dir: &Path) -> Result<usize, PrepError> {
    fs::create_dir_all(images_dir).map_err(|err| PrepError::io(images_dir, err))?;
    let mut moved = 0;
    for source in files_with_extensions(root, &PUBLISHED_EXTENSIONS)? {
        let Some(name) = source.file_name() else {
            continue;
        };
        let destination = images_dir.join(name);
        fs::rename(&source, &destination).map_err(|err| PrepError::io(&source, err))?;
        moved += 1;
        debug!(file = %destination.display(), "moved into images");
    }
    info!(moved, dir = %images_dir.display(), "images organised");
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn install_file_skips_same_file_and_replaces_others() -> std::io::Result<()> {
        let temp = tempdir()?;
        let source = temp.path().join("a.webp");
        fs::write(&source, b"new")?;

        assert!(!install_file(&source, &source)?);

        let destination = temp.path().join("copy.webp");
        fs::write(&destination, b"old")?;
        assert!(install_file(&source, &destination)?);
        assert_eq!(fs::read(&destination)?, b"new");
        Ok(())
    }

    #[test]
    fn copies_only_matching_variants() {
        let temp = tempdir().unwrap();
        let webp = temp.path().join("images_webp");
        fs::create_dir_all(&webp).unwrap();
        fs::write(webp.join("a.webp"), b"w").unwrap();
        fs::write(webp.join("notes.txt"), b"t").unwrap();

        assert_eq!(copy_variants_to_root(&webp, "webp", temp.path()).unwrap(), 1);
        assert!(temp.path().join("a.webp").exists());
        assert!(!temp.path().join("notes.txt").exists());
        assert_eq!(
            copy_variants_to_root(&temp.path().join("absent"), "jpg", temp.path()).unwrap(),
            0
        );
    }

    #[test]
    fn moves_root_images_and_leaves_documents() {
        let temp = tempdir().unwrap();
        for name in ["a.png", "b.JPG", "c.webp", "page.html"] {
            fs::write(temp.path().join(name), name).unwrap();
        }
        let images = temp.path().join("images");

        assert_eq!(move_images_into(temp.path(), &images).unwrap(), 3);
        assert!(images.join("b.JPG").exists());
        assert!(temp.path().join("page.html").exists());
        assert!(!temp.path().join("a.png").exists());
    }
}
