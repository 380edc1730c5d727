//! Directory listing for the image passes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PrepError;

/// PNG files directly inside `dir`, sorted by name, skipping hidden entries.
pub fn list_png_files(dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
    let entries = fs::read_dir(dir).map_err(|err| PrepError::io(dir, err))?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .map(|entry| entry.path())
        .filter(|path| is_png(path))
        .collect();
    files.sort();
    Ok(files)
}

fn is_png(path: &Path) -> bool {
    path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_sorted_visible_pngs_only() {
        let dir = tempdir().unwrap();
        for name in ["b.png", "a.PNG", ".hidden.png", "c.jpg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("dir.png")).unwrap();

        let names: Vec<String> = list_png_files(dir.path())
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG".to_string(), "b.png".to_string()]);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            list_png_files(&dir.path().join("nope")),
            Err(PrepError::NotFound(_))
        ));
    }
}
