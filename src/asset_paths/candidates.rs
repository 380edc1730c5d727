use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when looking an image up by stem.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Generate candidate files for an image referenced by `stem`.
///
/// Every search directory is tried with every extension, directory order first. The
/// generator drops duplicates so a directory listed twice is only probed once.
pub fn generate_image_candidates(search_dirs: &[PathBuf], stem: &str) -> Vec<PathBuf> {
    if stem.trim().is_empty() {
        return Vec::new();
    }

    let mut builder = CandidateBuilder::new(stem);
    for dir in search_dirs {
        builder.add_directory(dir);
    }
    builder.finish()
}

/// Return the first existing candidate for `stem`.
pub fn find_image_file(search_dirs: &[PathBuf], stem: &str) -> Option<PathBuf> {
    generate_image_candidates(search_dirs, stem)
        .into_iter()
        .find(|candidate| candidate.is_file())
}

struct CandidateBuilder<'a> {
    stem: &'a str,
    seen: BTreeSet<PathBuf>,
    result: Vec<PathBuf>,
}

impl<'a> CandidateBuilder<'a> {
    fn new(stem: &'a str) -> Self {
        Self {
            stem,
            seen: BTreeSet::new(),
            result: Vec::new(),
        }
    }

    fn add_directory(&mut self, dir: &Path) {
        for extension in IMAGE_EXTENSIONS {
            self.push(dir.join(format!("{}.{extension}", self.stem)));
        }
    }

    fn finish(self) -> Vec<PathBuf> {
        self.result
    }

    fn push(&mut self, candidate: PathBuf) {
        if self.seen.insert(candidate.clone()) {
            self.result.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn returns_empty_for_blank_stems() {
        assert!(generate_image_candidates(&[PathBuf::from(".")], " ").is_empty());
    }

    #[test]
    fn orders_by_directory_then_extension() {
        let dirs = vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("a")];
        let candidates = generate_image_candidates(&dirs, "hero");

        assert_eq!(candidates.len(), 10);
        assert_eq!(candidates[0], PathBuf::from("a/hero.png"));
        assert_eq!(candidates[4], PathBuf::from("a/hero.webp"));
        assert_eq!(candidates[5], PathBuf::from("b/hero.png"));
    }

    #[test]
    fn finds_first_existing_file() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(first.join("hero.webp"), b"w").unwrap();
        std::fs::write(second.join("hero.png"), b"p").unwrap();

        let found = find_image_file(&[first.clone(), second], "hero").unwrap();
        assert_eq!(found, first.join("hero.webp"));
        assert!(find_image_file(&[first], "missing").is_none());
    }
}
