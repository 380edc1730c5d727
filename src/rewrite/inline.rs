//! Embed page images as base64 `data:` URIs so they render without extra requests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose};
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::asset_paths::{find_image_file, reference_stem, should_ignore_asset_reference};
use crate::error::PrepError;
use crate::models::megabytes;
use crate::project::SiteLayout;
use crate::rewrite::substitute::{read_document, write_document};

fn img_src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<img\b[^>]*?\ssrc="([^"]+)"[^>]*>"#).expect("invalid img src regex")
    })
}

/// MIME type for an image path, defaulting to PNG for unknown extensions.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Read an image file and encode it as a `data:` URI.
pub fn data_uri(path: &Path) -> Result<String, PrepError> {
    let bytes = fs::read(path).map_err(|err| PrepError::io(path, err))?;
    Ok(format!(
        "data:{};base64,{}",
        mime_type_for(path),
        general_purpose::STANDARD.encode(bytes)
    ))
}

/// Counters for one inline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineCounts {
    /// Distinct local `src` references found.
    pub references: usize,
    /// References replaced by a data URI.
    pub converted: usize,
    /// References with no matching file in any search directory.
    pub missing: Vec<String>,
    /// References whose file could not be read.
    pub failed: Vec<String>,
}

/// Replace every local `<img src>` in `html` with a data URI looked up in `search_dirs`.
pub fn inline_images_in(html: &str, search_dirs: &[PathBuf]) -> (String, InlineCounts) {
    let mut resolved: BTreeMap<String, Option<String>> = BTreeMap::new();
    let mut counts = InlineCounts::default();

    for caps in img_src_pattern().captures_iter(html) {
        let reference = caps[1].to_string();
        if should_ignore_asset_reference(&reference) || resolved.contains_key(&reference) {
            continue;
        }
        counts.references += 1;

        let stem = reference_stem(&reference);
        let Some(image_path) = find_image_file(search_dirs, stem) else {
            warn!(reference = %reference, "image file not found");
            counts.missing.push(reference.clone());
            resolved.insert(reference, None);
            continue;
        };

        debug!(reference = %reference, file = %image_path.display(), "inlining image");
        match data_uri(&image_path) {
            Ok(uri) => {
                counts.converted += 1;
                info!(reference = %reference, "converted");
                resolved.insert(reference, Some(uri));
            }
            Err(err) => {
                warn!(reference = %reference, error = %err, "conversion failed");
                counts.failed.push(reference.clone());
                resolved.insert(reference, None);
            }
        }
    }

    let updated = img_src_pattern().replace_all(html, |caps: &Captures| {
        let tag = caps.get(0).expect("whole match");
        let src = caps.get(1).expect("src group");
        match resolved.get(src.as_str()).and_then(|uri| uri.as_deref()) {
            Some(uri) => {
                let offset = tag.start();
                format!(
                    "{}{}{}",
                    &tag.as_str()[..src.start() - offset],
                    uri,
                    &tag.as_str()[src.end() - offset..]
                )
            }
            None => tag.as_str().to_string(),
        }
    });

    (updated.into_owned(), counts)
}

/// Summary of an inline run on the main page.
#[derive(Debug, Clone)]
pub struct InlineReport {
    /// Written document.
    pub output: PathBuf,
    /// Per-reference counters.
    pub counts: InlineCounts,
    /// Input size in bytes.
    pub original_size: u64,
    /// Output size in bytes.
    pub new_size: u64,
}

/// Inline the main page's images into `<stem>_instant.html`.
pub fn inline_html_images(layout: &SiteLayout) -> Result<InlineReport> {
    let input = layout.main_html();
    let html =
        read_document(&input).with_context(|| format!("failed to read {}", input.display()))?;
    let search_dirs = layout.inline_search_dirs();

    let (updated, counts) = inline_images_in(&html, &search_dirs);
    info!(references = counts.references, "image references found");

    let output = layout.instant_html();
    write_document(&output, &updated)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let original_size = html.len() as u64;
    let new_size = updated.len() as u64;
    info!(
        converted = counts.converted,
        output = %output.display(),
        original_mb = %format!("{:.2}", megabytes(original_size)),
        new_mb = %format!("{:.2}", megabytes(new_size)),
        increase_mb = %format!("{:.2}", megabytes(new_size) - megabytes(original_size)),
        "inline finished"
    );

    Ok(InlineReport {
        output,
        counts,
        original_size,
        new_size,
    })
}
