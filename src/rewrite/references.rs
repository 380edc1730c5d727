//! Passes that bring HTML image references in line with the renamed assets.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::error::PrepError;
use crate::mapping::FilenameMapping;
use crate::models::{PassCounts, PassOutcome};
use crate::project::SiteLayout;
use crate::rewrite::substitute::{Substitution, SubstitutionPass, read_document, write_document};

fn legacy_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r#"images/[^"'>\s]*"#,
            r"[\x{4e00}-\x{9fa5}\x{3000}-\x{303f}\x{ff00}-\x{ffef}]",
            r#"[^"'>\s]*"#,
        ))
        .expect("invalid legacy reference regex")
    })
}

/// Rewrite every legacy name in `html` using the reference table.
pub fn fix_references_in(html: &str) -> String {
    FilenameMapping::references().rewrite(html)
}

/// `images/…` references that still contain CJK characters.
pub fn find_legacy_references(html: &str) -> Vec<String> {
    legacy_reference_pattern()
        .find_iter(html)
        .map(|found| found.as_str().to_string())
        .collect()
}

/// Build the repair pass that normalises variant paths in the main page.
///
/// `.jpg` lazy-load sources become `.png` and doubled or variant directory prefixes collapse
/// onto the images directory.
pub fn path_repair_pass(layout: &SiteLayout) -> SubstitutionPass {
    let config = layout.config();
    let images = config.images_dir.trim_end_matches('/');
    let escaped = regex::escape(images);

    let data_src = Substitution::pattern(
        &format!(r#"data-src="{escaped}/([^"]+)\.jpg""#),
        format!(r#"data-src="{images}/${{1}}.png""#),
    )
    .expect("invalid data-src regex");

    let mut pass = SubstitutionPass::new().with(data_src);
    pass.push(Substitution::literal(
        format!(r#"data-webp="{images}/{}/"#, config.webp_dir),
        format!(r#"data-webp="{images}/"#),
    ));
    pass.push(Substitution::literal(
        format!(r#"srcset="{}/"#, config.webp_dir),
        format!(r#"srcset="{images}/"#),
    ));
    pass.push(Substitution::literal(
        format!(r#"srcset="{}/"#, config.compressed_dir),
        format!(r#"srcset="{images}/"#),
    ));
    pass
}

/// Fix legacy references in every configured document and audit the result.
pub fn fix_html_references(layout: &SiteLayout) -> Result<PassCounts> {
    let mut counts = PassCounts::default();
    let files: Vec<PathBuf> = layout
        .config()
        .reference_html_files
        .iter()
        .map(|file| layout.resolve(file))
        .collect();

    for path in &files {
        if !path.exists() {
            warn!(file = %path.display(), "document not found, skipping");
            continue;
        }
        counts.seen += 1;

        match fix_references_file(path) {
            Ok(PassOutcome::Changed) => {
                counts.changed += 1;
                info!(file = %path.display(), "references fixed");
            }
            Ok(PassOutcome::Unchanged) => info!(file = %path.display(), "no legacy references"),
            Err(err) => {
                counts.failed += 1;
                warn!(file = %path.display(), error = %err, "failed to fix references");
            }
        }
    }

    info!(fixed = counts.changed, "reference fix finished");
    audit_legacy_references(&files)?;
    Ok(counts)
}

fn fix_references_file(path: &Path) -> Result<PassOutcome, PrepError> {
    let html = read_document(path)?;
    let fixed = fix_references_in(&html);
    if fixed == html {
        return Ok(PassOutcome::Unchanged);
    }
    write_document(path, &fixed)?;
    Ok(PassOutcome::Changed)
}

/// Log any `images/` reference that still carries a non-ASCII name.
///
/// Returns the number of documents with leftovers.
pub fn audit_legacy_references(files: &[PathBuf]) -> Result<usize> {
    let mut dirty = 0;
    for path in files.iter().filter(|path| path.exists()) {
        let html = read_document(path)
            .with_context(|| format!("failed to audit {}", path.display()))?;
        let leftovers = find_legacy_references(&html);
        if leftovers.is_empty() {
            info!(file = %path.display(), "no legacy references remain");
        } else {
            dirty += 1;
            warn!(file = %path.display(), references = ?leftovers, "legacy references remain");
        }
    }
    Ok(dirty)
}

/// Update `images/<legacy>` references after the files were renamed on disk.
pub fn update_renamed_references(layout: &SiteLayout) -> PassCounts {
    let mapping = FilenameMapping::renames();
    let prefix = format!("{}/", layout.config().images_dir.trim_end_matches('/'));
    let mut counts = PassCounts::default();

    for file in &layout.config().rename_html_files {
        let path = layout.resolve(file);
        if !path.exists() {
            continue;
        }
        counts.seen += 1;

        let result = read_document(&path).and_then(|html| {
            let updated = mapping.rewrite_with_prefix(&html, &prefix);
            if updated == html {
                Ok(PassOutcome::Unchanged)
            } else {
                write_document(&path, &updated).map(|_| PassOutcome::Changed)
            }
        });

        match result {
            Ok(outcome) => {
                if outcome.changed() {
                    counts.changed += 1;
                }
                info!(file = %path.display(), changed = outcome.changed(), "image paths updated");
            }
            Err(err) => {
                counts.failed += 1;
                warn!(file = %path.display(), error = %err, "failed to update image paths");
            }
        }
    }

    counts
}

/// Run the path repair pass on the main page.
pub fn repair_image_paths(layout: &SiteLayout) -> Result<PassOutcome> {
    let html = layout.main_html();
    let outcome = path_repair_pass(layout)
        .apply_file(&html, None)
        .with_context(|| format!("failed to repair image paths in {}", html.display()))?;
    info!(file = %html.display(), changed = outcome.changed(), "image paths repaired");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrepConfig;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn fixes_jpg_reference_to_canonical_png() {
        let fixed = fix_references_in(r#"<img src="images/产品全景图.jpg" alt="产品">"#);
        assert_eq!(fixed, r#"<img src="images/product-overview.png" alt="产品">"#);
    }

    #[test]
    fn fixes_every_quote_and_attribute_form() {
        let html = concat!(
            r#"<img src='images/功能一.png' srcset="images/功能一.webp">"#,
            r#"<source srcset=images/功能一_thumb.jpg>"#,
        );
        let fixed = fix_references_in(html);
        assert_eq!(
            fixed,
            concat!(
                r#"<img src='images/feature-1.png' srcset="images/feature-1.webp">"#,
                r#"<source srcset=images/feature-1-thumb.jpg>"#,
            )
        );
        assert!(find_legacy_references(&fixed).is_empty());
    }

    #[test]
    fn audit_detects_unknown_cjk_names() {
        let leftovers =
            find_legacy_references(r#"<img src="images/新图片.png"><img src="images/ok.png">"#);
        assert_eq!(leftovers, vec!["images/新图片.png".to_string()]);
    }

    #[test]
    fn path_repair_normalises_variant_prefixes() {
        let layout = PrepConfig::default().into_layout(".");
        let pass = path_repair_pass(&layout);
        let html = concat!(
            r#"<img data-src="images/hero.jpg" data-webp="images/images_webp/hero.webp">"#,
            r#"<source srcset="images_webp/hero.webp">"#,
            r#"<source srcset="images_compressed/hero.jpg">"#,
        );
        let repaired = pass.apply(html);
        assert_eq!(
            repaired,
            concat!(
                r#"<img data-src="images/hero.png" data-webp="images/hero.webp">"#,
                r#"<source srcset="images/hero.webp"><source srcset="images/hero.jpg">"#,
            )
        );
        assert_eq!(pass.apply(&repaired), repaired);
    }

    #[test]
    fn fix_html_references_counts_changed_documents() {
        let dir = tempdir().unwrap();
        let layout = PrepConfig::default().into_layout(dir.path());
        fs::write(
            dir.path().join("infimind_iclip3.0_sales.html"),
            r#"<img src="images/案例墙.jpg">"#,
        )
        .unwrap();
        fs::write(dir.path().join("simple_test.html"), "<p>no images</p>").unwrap();

        let counts = fix_html_references(&layout).unwrap();
        assert_eq!(counts.seen, 2);
        assert_eq!(counts.changed, 1);
        let html = fs::read_to_string(dir.path().join("infimind_iclip3.0_sales.html")).unwrap();
        assert_eq!(html, r#"<img src="images/case-wall.png">"#);
    }

    #[test]
    fn second_reference_fix_leaves_documents_untouched() {
        let dir = tempdir().unwrap();
        let layout = PrepConfig::default().into_layout(dir.path());
        let page = dir.path().join("infimind_iclip3.0_sales.html");
        fs::write(
            &page,
            r#"<img src='images/功能一.png'><img src="images/产品全景图.jpg">"#,
        )
        .unwrap();

        assert_eq!(fix_html_references(&layout).unwrap().changed, 1);
        let fixed = fs::read_to_string(&page).unwrap();
        assert_eq!(
            fixed,
            r#"<img src='images/feature-1.png'><img src="images/product-overview.png">"#
        );

        let again = fix_html_references(&layout).unwrap();
        assert_eq!((again.seen, again.changed, again.failed), (1, 0, 0));
        assert_eq!(fs::read_to_string(&page).unwrap(), fixed);
    }

    #[test]
    fn renamed_references_require_images_prefix() {
        let dir = tempdir().unwrap();
        let layout = PrepConfig::default().into_layout(dir.path());
        let page = dir.path().join("test_images.html");
        fs::write(&page, r#"<img src="images/技术.png"><p>技术.png</p>"#).unwrap();

        let counts = update_renamed_references(&layout);
        assert_eq!(counts.changed, 1);
        assert_eq!(
            fs::read_to_string(page).unwrap(),
            r#"<img src="images/technology.png"><p>技术.png</p>"#
        );
    }
}
