//! Configuration loader for the page preparation passes.
//!
//! Every value has an embedded default so the passes run with no file at all. A
//! `page-prep.config.json` next to the page overrides individual fields.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PrepError;
use crate::project::SiteLayout;

/// File name searched for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "page-prep.config.json";

/// Discoverable configuration describing the page, its asset directories and pass limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// The page every single-document pass works on.
    pub main_html: String,
    /// Documents touched by the reference-fix pass.
    pub reference_html_files: Vec<String>,
    /// Documents updated after image files are renamed.
    pub rename_html_files: Vec<String>,
    /// Directory that holds published images.
    pub images_dir: String,
    /// Output directory for WebP variants.
    pub webp_dir: String,
    /// Output directory for compressed JPEG variants.
    pub compressed_dir: String,
    /// Output directory for thumbnails.
    pub thumbnails_dir: String,
    /// Backup directory used by the smart compression pass.
    pub compress_backup_dir: String,
    /// Prefix of the timestamped backup directory written by the instant pass.
    pub instant_backup_prefix: String,
    /// Directories searched, in order, when inlining images.
    pub inline_search_dirs: Vec<String>,
    /// Image handled by the fix-large pass.
    pub oversized_image: String,
    /// JSON log written by the variants pass.
    pub optimization_log: String,
    /// Markdown report written during deploy.
    pub report_file: String,
    /// WebP files preloaded by the lazy-loading script.
    pub critical_images: Vec<String>,
    /// Version control settings used by deploy.
    pub publish: PublishConfig,
    /// Size and quality limits used by the image passes.
    pub limits: ImageLimits,
}

/// Version control settings for the deploy pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Remote pushed to.
    pub remote: String,
    /// Branch pushed to.
    pub branch: String,
    /// Commit message.
    pub commit_message: String,
    /// Public URL printed after a successful push.
    pub site_url: String,
}

/// Size and quality limits for the image passes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageLimits {
    /// Width cap for the smart compression pass.
    pub compress_max_width: u32,
    /// Width cap for compressed JPEG variants.
    pub variant_max_width: u32,
    /// JPEG quality for compressed variants.
    pub variant_quality: u8,
    /// Bounding box edge for thumbnails.
    pub thumbnail_size: u32,
    /// JPEG quality for thumbnails.
    pub thumbnail_quality: u8,
    /// Longest side allowed by the fix-large pass.
    pub max_dimension: u32,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            main_html: "infimind_iclip3.0_sales.html".into(),
            reference_html_files: vec![
                "infimind_iclip3.0_sales.html".into(),
                "infimind_iclip3.0_sales_fixed.html".into(),
                "simple_test.html".into(),
                "test_images.html".into(),
                "english_filename_test.html".into(),
            ],
            rename_html_files: vec![
                "infimind_iclip3.0_sales.html".into(),
                "infimind_iclip3.0_sales_fixed.html".into(),
                "simple_test.html".into(),
                "test_images.html".into(),
            ],
            images_dir: "images".into(),
            webp_dir: "images_webp".into(),
            compressed_dir: "images_compressed".into(),
            thumbnails_dir: "images_thumbnails".into(),
            compress_backup_dir: "compressed_backup".into(),
            instant_backup_prefix: "backup_instant_optimization".into(),
            inline_search_dirs: vec![
                ".".into(),
                "images".into(),
                "images_compressed".into(),
                "compressed_backup".into(),
                "original_images_backup".into(),
            ],
            oversized_image: "极睿直播智能体 iClip 3.0 - 短视频智能剪辑平台.png".into(),
            optimization_log: "optimization_log.json".into(),
            report_file: "OPTIMIZATION_REPORT.md".into(),
            critical_images: vec![
                "images_webp/main-title.webp".into(),
                "images_webp/product-overview.webp".into(),
            ],
            publish: PublishConfig::default(),
            limits: ImageLimits::default(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: "origin".into(),
            branch: "main".into(),
            commit_message:
                "Deploy optimized images: WebP variants, lazy loading, compressed JPEG fallbacks"
                    .into(),
            site_url: "https://zxy36277-jpg.github.io/iclip3-sales-page/".into(),
        }
    }
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            compress_max_width: 1920,
            variant_max_width: 1200,
            variant_quality: 85,
            thumbnail_size: 300,
            thumbnail_quality: 75,
            max_dimension: 4000,
        }
    }
}

impl PrepConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// When the configuration file does not exist or fails to parse we fall back to default
    /// values so every pass can still run with the embedded constants.
    pub fn discover(root: &Path) -> Self {
        let candidate = root.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Read an explicitly requested configuration file, reporting why it could not be used.
    pub fn load(path: &Path) -> Result<Self, PrepError> {
        let content = fs::read_to_string(path).map_err(|err| PrepError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|err| PrepError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Convert the configuration into a layout rooted at `root`.
    pub fn into_layout(self, root: impl Into<PathBuf>) -> SiteLayout {
        SiteLayout::new(root, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = PrepConfig::discover(dir.path());
        assert_eq!(config.main_html, "infimind_iclip3.0_sales.html");
        assert_eq!(config.limits.variant_max_width, 1200);
        assert_eq!(config.publish.branch, "main");
    }

    #[test]
    fn discover_ignores_malformed_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{ not json").unwrap();
        let config = PrepConfig::discover(dir.path());
        assert_eq!(config.images_dir, "images");
    }

    #[test]
    fn partial_files_override_only_named_fields() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            concat!(
                r#"{"main_html": "landing.html", "limits": {"thumbnail_size": 200}, "#,
                r#""publish": {"branch": "gh-pages"}}"#,
            ),
        )
        .unwrap();

        let config = PrepConfig::discover(dir.path());
        assert_eq!(config.main_html, "landing.html");
        assert_eq!(config.limits.thumbnail_size, 200);
        assert_eq!(config.limits.thumbnail_quality, 75);
        assert_eq!(config.publish.branch, "gh-pages");
        assert_eq!(config.publish.remote, "origin");
    }

    #[test]
    fn explicit_load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = PrepConfig::load(&path).unwrap_err();
        assert!(matches!(err, PrepError::Config { .. }));
    }
}
