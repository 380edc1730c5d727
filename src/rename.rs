//! Rename legacy image files on disk to their canonical ASCII names.

use std::fs;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::error::PrepError;
use crate::mapping::FilenameMapping;
use crate::models::PassCounts;
use crate::project::SiteLayout;
use crate::rewrite::references::update_renamed_references;

/// Outcome of the rename pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    /// Files moved to their canonical name.
    pub renamed: usize,
    /// Legacy names with no file on disk.
    pub missing: usize,
    /// Moves that failed or would have overwritten an existing file.
    pub failed: usize,
    /// Documents updated afterwards.
    pub documents: PassCounts,
}

/// Rename every legacy file in the images directory, then update the documents that link them.
pub fn rename_images(layout: &SiteLayout) -> Result<RenameReport> {
    let images = layout.images_dir();
    if !images.is_dir() {
        error!(dir = %images.display(), "images directory not found");
        return Err(PrepError::NotFound(images).into());
    }

    let mut report = RenameReport::default();
    for (legacy, canonical) in FilenameMapping::renames().iter() {
        let source = images.join(legacy);
        let target = images.join(canonical);

        if !source.exists() {
            warn!(file = legacy, "legacy file not found");
            report.missing += 1;
            continue;
        }
        if target.exists() {
            warn!(file = legacy, target = canonical, "target already exists, skipping");
            report.failed += 1;
            continue;
        }

        match fs::rename(&source, &target) {
            Ok(()) => {
                report.renamed += 1;
                info!(from = legacy, to = canonical, "renamed");
            }
            Err(err) => {
                report.failed += 1;
                error!(file = legacy, error = %PrepError::io(&source, err), "rename failed");
            }
        }
    }

    report.documents = update_renamed_references(layout);
    info!(
        renamed = report.renamed,
        missing = report.missing,
        documents = report.documents.changed,
        "rename finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrepConfig;
    use tempfile::tempdir;

    #[test]
    fn renames_files_and_updates_documents() {
        let dir = tempdir().unwrap();
        let images = dir.path().join("images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("案例墙.png"), b"png").unwrap();
        fs::write(images.join("技术_thumb.jpg"), b"jpg").unwrap();
        fs::write(
            dir.path().join("simple_test.html"),
            r#"<img src="images/案例墙.png"><img src="images/技术_thumb.jpg">"#,
        )
        .unwrap();

        let layout = PrepConfig::default().into_layout(dir.path());
        let report = rename_images(&layout).unwrap();

        assert_eq!(report.renamed, 2);
        assert_eq!(report.missing, FilenameMapping::renames().len() - 2);
        assert_eq!(fs::read(images.join("case-wall.png")).unwrap(), b"png");
        assert!(images.join("technology-thumb.jpg").exists());
        assert!(!images.join("案例墙.png").exists());
        assert_eq!(report.documents.changed, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("simple_test.html")).unwrap(),
            r#"<img src="images/case-wall.png"><img src="images/technology-thumb.jpg">"#
        );
    }

    #[test]
    fn never_overwrites_an_existing_canonical_file() {
        let dir = tempdir().unwrap();
        let images = dir.path().join("images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("案例墙.png"), b"legacy").unwrap();
        fs::write(images.join("case-wall.png"), b"canonical").unwrap();

        let report = rename_images(&PrepConfig::default().into_layout(dir.path())).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(fs::read(images.join("case-wall.png")).unwrap(), b"canonical");
    }

    #[test]
    fn missing_images_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(rename_images(&PrepConfig::default().into_layout(dir.path())).is_err());
    }
}
