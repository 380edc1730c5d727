//! Publish the optimised page: swap in the optimised HTML, organise images, report and push.

pub mod files;
pub mod git;
pub mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::{error, info};

use crate::project::SiteLayout;
use crate::rewrite::deploy_paths::rewrite_deploy_paths;
use crate::rewrite::substitute::{read_document, write_document};

use self::files::{copy_variants_to_root, move_images_into};
use self::git::commit_and_push;
use self::report::{ImageStats, write_report};

/// Summary of the local part of a deploy.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// Copy of the page taken before it was replaced.
    pub html_backup: PathBuf,
    /// Variant files copied to the root.
    pub variants_copied: usize,
    /// Images moved into the images directory.
    pub images_moved: usize,
    /// Statistics written to the report.
    pub stats: ImageStats,
    /// Written report.
    pub report: PathBuf,
}

/// Run every local deploy step, leaving the tree ready to commit.
pub fn stage_site(layout: &SiteLayout) -> Result<StageReport> {
    let config = layout.config();
    let root = layout.root();
    let page = layout.main_html();
    let optimized = layout.optimized_html();

    let mut backup_name = page.as_os_str().to_os_string();
    backup_name.push(".backup");
    let html_backup = PathBuf::from(backup_name);
    if page.exists() {
        fs::copy(&page, &html_backup)
            .with_context(|| format!("failed to back up {}", page.display()))?;
        info!(backup = %html_backup.display(), "page backed up");
    }

    if !optimized.exists() {
        return Err(anyhow!("optimised page not found: {}", optimized.display()));
    }
    fs::copy(&optimized, &page)
        .with_context(|| {
            format!("failed to replace {} with {}", page.display(), optimized.display())
        })?;
    info!(page = %page.display(), "page replaced with optimised version");

    let mut variants_copied = 0;
    for (dir, extension) in [
        (layout.webp_dir(), "webp"),
        (layout.compressed_dir(), "jpg"),
        (layout.thumbnails_dir(), "jpg"),
    ] {
        variants_copied += copy_variants_to_root(&dir, extension, root)
            .with_context(|| format!("failed to copy variants from {}", dir.display()))?;
    }

    let images_dir = layout.images_dir();
    let images_moved = move_images_into(root, &images_dir)
        .with_context(|| format!("failed to move images into {}", images_dir.display()))?;

    let html = read_document(&page).with_context(|| format!("failed to read {}", page.display()))?;
    write_document(&page, &rewrite_deploy_paths(&html, config))
        .with_context(|| format!("failed to write {}", page.display()))?;
    info!("image paths updated");

    let report = layout.resolve(&config.report_file);
    let stats = write_report(&report, &images_dir)
        .with_context(|| format!("failed to write {}", report.display()))?;
    info!(report = %report.display(), images = stats.count, "report written");

    Ok(StageReport {
        html_backup,
        variants_copied,
        images_moved,
        stats,
        report,
    })
}

/// Stage the site and publish it with git.
pub fn deploy(layout: &SiteLayout) -> Result<StageReport> {
    let staged = stage_site(layout)?;
    let publish = &layout.config().publish;
    if let Err(err) = commit_and_push(layout.root(), publish) {
        error!(error = %err, "git publish failed");
        return Err(err).context("deploy failed");
    }
    info!(url = %publish.site_url, report = %staged.report.display(), "deploy finished");
    Ok(staged)
}
