//! Resolved on-disk layout of the page being prepared.

use std::path::{Path, PathBuf};

use crate::config::PrepConfig;

/// Configuration paired with the directory every relative path is resolved against.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    root: PathBuf,
    config: PrepConfig,
}

impl SiteLayout {
    /// Create a layout for `config` rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, config: PrepConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Directory the page lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Underlying configuration.
    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    /// Resolve a configured relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        if relative == "." || relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    /// Main page path.
    pub fn main_html(&self) -> PathBuf {
        self.resolve(&self.config.main_html)
    }

    /// Published images directory.
    pub fn images_dir(&self) -> PathBuf {
        self.resolve(&self.config.images_dir)
    }

    /// WebP variant directory.
    pub fn webp_dir(&self) -> PathBuf {
        self.resolve(&self.config.webp_dir)
    }

    /// Compressed JPEG variant directory.
    pub fn compressed_dir(&self) -> PathBuf {
        self.resolve(&self.config.compressed_dir)
    }

    /// Thumbnail directory.
    pub fn thumbnails_dir(&self) -> PathBuf {
        self.resolve(&self.config.thumbnails_dir)
    }

    /// Backup directory for the smart compression pass.
    pub fn compress_backup_dir(&self) -> PathBuf {
        self.resolve(&self.config.compress_backup_dir)
    }

    /// Sibling of `html` with `suffix` appended to its stem (`page.html` → `page_instant.html`).
    pub fn derived_html(html: &Path, suffix: &str) -> PathBuf {
        let stem = html
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = html
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "html".into());
        html.with_file_name(format!("{stem}{suffix}.{extension}"))
    }

    /// Main page with the `_instant` suffix.
    pub fn instant_html(&self) -> PathBuf {
        Self::derived_html(&self.main_html(), "_instant")
    }

    /// Main page with the `_optimized` suffix.
    pub fn optimized_html(&self) -> PathBuf {
        Self::derived_html(&self.main_html(), "_optimized")
    }

    /// Image search directories for the inline pass, followed by timestamped backups.
    ///
    /// Timestamped backups are listed newest first so the most recent original wins.
    pub fn inline_search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .config
            .inline_search_dirs
            .iter()
            .map(|dir| self.resolve(dir))
            .collect();

        let prefix = format!("{}_", self.config.instant_backup_prefix);
        let mut stamped: Vec<PathBuf> = std::fs::read_dir(&self.root)
            .map(|entries| {
                entries
                    .flatten()
                    .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
                    .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
                    .map(|entry| entry.path())
                    .collect()
            })
            .unwrap_or_default();
        stamped.sort();
        stamped.reverse();

        for dir in stamped {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }
}
