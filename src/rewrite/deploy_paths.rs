//! Point published image references at the images directory after deploy moves files there.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::asset_paths::{IMAGE_EXTENSIONS, should_ignore_asset_reference};
use crate::config::PrepConfig;

fn image_attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(\s(?:data-src|data-webp|srcset|src)\s*=\s*)(["'])([^"']*)(["'])"#)
            .expect("invalid image attribute regex")
    })
}

/// Rewrites single references onto the images directory.
#[derive(Debug, Clone)]
pub struct DeployPathRewriter {
    images_prefix: String,
    variant_prefixes: Vec<String>,
}

impl DeployPathRewriter {
    /// Rewriter for the directories named in `config`.
    pub fn new(config: &PrepConfig) -> Self {
        let prefix = |dir: &str| format!("{}/", dir.trim_end_matches('/'));
        Self {
            images_prefix: prefix(&config.images_dir),
            variant_prefixes: [&config.webp_dir, &config.compressed_dir, &config.thumbnails_dir]
                .into_iter()
                .map(|dir| prefix(dir.as_str()))
                .collect(),
        }
    }

    /// Rewrite one image reference, leaving external, non-image and already-published ones alone.
    pub fn rewrite_reference(&self, reference: &str) -> String {
        if should_ignore_asset_reference(reference)
            || reference.starts_with(&self.images_prefix)
            || !is_image_reference(reference)
        {
            return reference.to_string();
        }
        let bare = self
            .variant_prefixes
            .iter()
            .find_map(|prefix| reference.strip_prefix(prefix.as_str()))
            .unwrap_or(reference);
        format!("{}{}", self.images_prefix, bare)
    }

    /// Rewrite each candidate of a `srcset` value, keeping width/density descriptors.
    fn rewrite_srcset(&self, value: &str) -> String {
        value
            .split(',')
            .map(|candidate| {
                let trimmed = candidate.trim_start();
                let leading = &candidate[..candidate.len() - trimmed.len()];
                match trimmed.split_once(char::is_whitespace) {
                    Some((url, descriptor)) => {
                        format!("{leading}{} {descriptor}", self.rewrite_reference(url))
                    }
                    None if trimmed.is_empty() => candidate.to_string(),
                    None => format!("{leading}{}", self.rewrite_reference(trimmed)),
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Rewrite every image attribute in `html`.
    pub fn rewrite_html(&self, html: &str) -> String {
        image_attribute_pattern()
            .replace_all(html, |caps: &Captures| {
                let attribute = &caps[1];
                let value = &caps[3];
                let rewritten = if attribute.trim_start().starts_with("srcset") {
                    self.rewrite_srcset(value)
                } else {
                    self.rewrite_reference(value)
                };
                format!("{attribute}{}{rewritten}{}", &caps[2], &caps[4])
            })
            .into_owned()
    }
}

fn is_image_reference(reference: &str) -> bool {
    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    path.rsplit_once('.').is_some_and(|(_, extension)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| extension.eq_ignore_ascii_case(known))
    })
}

/// Rewrite image references in `html` for the layout in `config`.
pub fn rewrite_deploy_paths(html: &str, config: &PrepConfig) -> String {
    DeployPathRewriter::new(config).rewrite_html(html)
}
