//! Lazy-loading markup, styles and bootstrap script injected into the page.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use tracing::info;

use crate::asset_paths::{VariantPaths, file_name};
use crate::project::SiteLayout;
use crate::rewrite::substitute::{read_document, write_document};

const STYLE_MARKER: &str = "/* lazy-load styles */";
const SCRIPT_MARKER: &str = "data-lazy-loader";
const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

const LOADING_STYLES: &str = r#"
        /* lazy-load styles */
        .lazy-load {
            position: relative;
            overflow: hidden;
        }

        .lazy-img {
            opacity: 0;
            transition: opacity 0.3s ease;
            width: 100%;
            height: auto;
        }

        .lazy-img.loaded {
            opacity: 1;
        }

        .lazy-load::before {
            content: '';
            position: absolute;
            top: 0;
            left: 0;
            width: 100%;
            height: 100%;
            background: linear-gradient(90deg, #f0f0f0 25%, #e0e0e0 50%, #f0f0f0 75%);
            background-size: 200% 100%;
            animation: loading 1.5s infinite;
            z-index: 1;
        }

        .lazy-img.loaded + .lazy-load::before {
            display: none;
        }

        @keyframes loading {
            0% { background-position: 200% 0; }
            100% { background-position: -200% 0; }
        }

        picture {
            display: block;
            width: 100%;
        }

        @media (max-width: 768px) {
            .lazy-img {
                max-width: 100%;
                height: auto;
            }
        }"#;

const LAZY_SCRIPT_TEMPLATE: &str = r#"
    <script data-lazy-loader>
        document.addEventListener('DOMContentLoaded', function() {
            function supportsWebP() {
                const canvas = document.createElement('canvas');
                canvas.width = 1;
                canvas.height = 1;
                return canvas.toDataURL('image/webp').indexOf('data:image/webp') === 0;
            }

            function lazyLoadImages() {
                const images = document.querySelectorAll('img[data-src]');
                const imageObserver = new IntersectionObserver((entries, observer) => {
                    entries.forEach(entry => {
                        if (entry.isIntersecting) {
                            const img = entry.target;
                            const webpSrc = img.getAttribute('data-webp');
                            const fallbackSrc = img.getAttribute('data-src');

                            if (supportsWebP() && webpSrc) {
                                img.src = webpSrc;
                            } else {
                                img.src = fallbackSrc;
                            }

                            img.onload = function() {
                                img.style.opacity = '1';
                                img.classList.add('loaded');
                            };

                            img.removeAttribute('data-src');
                            img.removeAttribute('data-webp');

                            observer.unobserve(img);
                        }
                    });
                }, {
                    rootMargin: '50px 0px',
                    threshold: 0.01
                });

                images.forEach(img => {
                    imageObserver.observe(img);
                });
            }

            lazyLoadImages();

            function preloadCriticalImages() {
                const criticalImages = __CRITICAL_IMAGES__;

                criticalImages.forEach(src => {
                    const link = document.createElement('link');
                    link.rel = 'preload';
                    link.as = 'image';
                    link.href = src;
                    document.head.appendChild(link);
                });
            }

            preloadCriticalImages();
        });
    </script>"#;

const PERFORMANCE_META: &str = r##"
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="X-UA-Compatible" content="IE=edge">
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <meta name="theme-color" content="#0a1628">"##;

fn png_img_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<img\b[^>]*?\ssrc=["']([^"']*\.png)["'][^>]*>"#)
            .expect("invalid png img regex")
    })
}

fn alt_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)\salt\s*=\s*["']([^"']*)["']"#).expect("invalid alt attribute regex")
    })
}

fn class_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)\sclass\s*=\s*["']([^"']*)["']"#).expect("invalid class attribute regex")
    })
}

/// First value captured by an attribute `pattern` in a single tag.
fn extract_attribute(tag: &str, pattern: &Regex) -> Option<String> {
    pattern.captures(tag).map(|caps| caps[1].to_string())
}

/// Build the `<picture>` block that replaces an `<img>` pointing at a PNG.
pub fn picture_block(original_tag: &str, variants: &VariantPaths) -> String {
    let alt = extract_attribute(original_tag, alt_pattern()).unwrap_or_default();
    let css_class = extract_attribute(original_tag, class_pattern()).unwrap_or_default();

    format!(
        r#"<picture class="lazy-load {css_class}">
            <source srcset="{webp}" type="image/webp">
            <source srcset="{compressed}" type="image/jpeg">
            <img
                src="{thumbnail}"
                data-src="{compressed}"
                data-webp="{webp}"
                alt="{alt}"
                class="lazy-img {css_class}"
                loading="lazy"
                decoding="async"
                style="transition: opacity 0.3s ease;"
            >
        </picture>"#,
        webp = variants.webp,
        compressed = variants.compressed,
        thumbnail = variants.thumbnail,
    )
}

/// Replace every PNG `<img>` with a lazy `<picture>` block, returning the number replaced.
pub fn wrap_png_images(html: &str, layout: &SiteLayout) -> (String, usize) {
    let config = layout.config();
    let mut replaced = 0;
    let updated = png_img_pattern().replace_all(html, |caps: &Captures| {
        let png_path = &caps[1];
        let variants = VariantPaths::for_reference(
            png_path,
            &config.webp_dir,
            &config.compressed_dir,
            &config.thumbnails_dir,
        );
        replaced += 1;
        info!(image = file_name(png_path), "wrapped in lazy picture");
        picture_block(&caps[0], &variants)
    });
    (updated.into_owned(), replaced)
}

/// Insert the loading styles before `</style>`, or a new style block before `</head>`.
pub fn inject_loading_styles(html: &str) -> String {
    if html.contains(STYLE_MARKER) {
        return html.to_string();
    }
    if html.contains("</style>") {
        html.replacen("</style>", &format!("{LOADING_STYLES}\n</style>"), 1)
    } else if html.contains("</head>") {
        html.replacen("</head>", &format!("<style>{LOADING_STYLES}\n</style>\n</head>"), 1)
    } else {
        html.to_string()
    }
}

/// Insert the lazy-loading script before `</body>`, preloading `critical_images`.
pub fn inject_lazy_script(html: &str, critical_images: &[String]) -> String {
    if html.contains(SCRIPT_MARKER) {
        return html.to_string();
    }
    let critical = serde_json::to_string(critical_images).unwrap_or_else(|_| "[]".into());
    let script = LAZY_SCRIPT_TEMPLATE.replace("__CRITICAL_IMAGES__", &critical);
    if html.contains("</body>") {
        html.replacen("</body>", &format!("{script}\n</body>"), 1)
    } else {
        format!("{html}{script}\n")
    }
}

/// Expand the viewport meta tag into the performance meta block.
pub fn inject_performance_meta(html: &str) -> String {
    if html.contains(r#"name="theme-color""#) {
        return html.to_string();
    }
    html.replacen(VIEWPORT_META, PERFORMANCE_META, 1)
}

/// Apply every lazy-loading transformation to `html`.
pub fn optimize_html_in(html: &str, layout: &SiteLayout) -> (String, usize) {
    let (wrapped, replaced) = wrap_png_images(html, layout);
    let styled = inject_loading_styles(&wrapped);
    let scripted = inject_lazy_script(&styled, &layout.config().critical_images);
    (inject_performance_meta(&scripted), replaced)
}

/// Optimise the main page into `<stem>_optimized.html`.
pub fn optimize_html(layout: &SiteLayout) -> Result<std::path::PathBuf> {
    let input = layout.main_html();
    let html =
        read_document(&input).with_context(|| format!("failed to read {}", input.display()))?;

    let (updated, replaced) = optimize_html_in(&html, layout);

    let output = layout.optimized_html();
    write_document(&output, &updated)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(images = replaced, output = %output.display(), "html optimized");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrepConfig;
    use std::fs;
    use tempfile::tempdir;

    const PAGE: &str = r#"<html><head>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>body { margin: 0; }</style>
</head><body>
<img class="hero" src='images/main-title.png' alt="Main title">
<img src="images/photo.jpg" alt="keep">
</body></html>"#;

    fn layout() -> SiteLayout {
        PrepConfig::default().into_layout(".")
    }

    #[test]
    fn extracts_attributes_with_either_quote() {
        let tag = r#"<img class='a b' alt="Title" src=x>"#;
        assert_eq!(extract_attribute(tag, class_pattern()).as_deref(), Some("a b"));
        assert_eq!(extract_attribute(tag, alt_pattern()).as_deref(), Some("Title"));
        assert_eq!(extract_attribute(r#"<img src="x.png">"#, alt_pattern()), None);
    }

    #[test]
    fn attribute_patterns_ignore_prefixed_names() {
        let tag = r#"<img data-alt="no" subclass="no" alt='yes'>"#;
        assert_eq!(extract_attribute(tag, alt_pattern()).as_deref(), Some("yes"));
        assert_eq!(extract_attribute(tag, class_pattern()), None);
    }

    #[test]
    fn wraps_only_png_images() {
        let (html, replaced) = wrap_png_images(PAGE, &layout());
        assert_eq!(replaced, 1);
        assert!(html.contains(r#"<picture class="lazy-load hero">"#));
        assert!(
            html.contains(r#"<source srcset="images_webp/main-title.webp" type="image/webp">"#)
        );
        assert!(html.contains(r#"src="images_thumbnails/main-title_thumb.jpg""#));
        assert!(html.contains(r#"data-src="images_compressed/main-title.jpg""#));
        assert!(html.contains(r#"class="lazy-img hero""#));
        assert!(html.contains(r#"alt="Main title""#));
        assert!(html.contains(r#"<img src="images/photo.jpg" alt="keep">"#));
    }

    #[test]
    fn injects_styles_script_and_meta() {
        let (html, _) = optimize_html_in(PAGE, &layout());
        assert!(html.contains(".lazy-img.loaded"));
        assert!(html.find(STYLE_MARKER).unwrap() < html.find("</style>").unwrap());
        assert!(html.contains("IntersectionObserver"));
        assert!(html.contains(concat!(
            r#"const criticalImages = ["images_webp/main-title.webp","#,
            r#""images_webp/product-overview.webp"];"#,
        )));
        assert!(html.find(SCRIPT_MARKER).unwrap() < html.find("</body>").unwrap());
        assert!(html.contains(r##"<meta name="theme-color" content="#0a1628">"##));
    }

    #[test]
    fn optimisation_is_idempotent() {
        let (once, _) = optimize_html_in(PAGE, &layout());
        let (twice, replaced) = optimize_html_in(&once, &layout());
        assert_eq!(replaced, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn adds_style_block_when_page_has_none() {
        let html = inject_loading_styles("<head></head>");
        assert!(html.starts_with("<head><style>"));
        assert!(html.ends_with("</style>\n</head>"));
    }

    #[test]
    fn writes_optimized_copy() {
        let dir = tempdir().unwrap();
        let layout = PrepConfig::default().into_layout(dir.path());
        fs::write(layout.main_html(), PAGE).unwrap();

        let output = optimize_html(&layout).unwrap();
        assert_eq!(output, dir.path().join("infimind_iclip3.0_sales_optimized.html"));
        assert!(fs::read_to_string(output).unwrap().contains("<picture"));
        assert_eq!(fs::read_to_string(layout.main_html()).unwrap(), PAGE);
    }
}
