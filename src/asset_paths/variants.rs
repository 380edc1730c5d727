use std::path::Path;

/// Basename of a reference with its extension removed (`images/a.b.png` → `a.b`).
pub fn reference_stem(reference: &str) -> &str {
    let name = file_name(reference);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(index) => &name[..index],
    }
}

/// Final path segment of a reference, accepting either separator.
pub fn file_name(reference: &str) -> &str {
    reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference)
}

/// Paths of the generated variants of a source image, as written into HTML.
///
/// The generated path always uses forward slashes so the markup is portable regardless of
/// the separator used by the directory settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPaths {
    /// WebP variant, `{webp_dir}/{stem}.webp`.
    pub webp: String,
    /// Compressed JPEG variant, `{compressed_dir}/{stem}.jpg`.
    pub compressed: String,
    /// Thumbnail, `{thumbnails_dir}/{stem}_thumb.jpg`.
    pub thumbnail: String,
}

impl VariantPaths {
    /// Derive the variant paths for `reference`.
    pub fn for_reference(
        reference: &str,
        webp_dir: &str,
        compressed_dir: &str,
        thumbnails_dir: &str,
    ) -> Self {
        let stem = reference_stem(reference);
        Self {
            webp: join_web_path(webp_dir, &format!("{stem}.webp")),
            compressed: join_web_path(compressed_dir, &format!("{stem}.jpg")),
            thumbnail: join_web_path(thumbnails_dir, &format!("{stem}_thumb.jpg")),
        }
    }
}

/// On-disk name of a variant for a source file (`a.png` → `a_thumb.jpg`).
pub fn variant_file_name(source: &Path, suffix: &str, extension: &str) -> String {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}{suffix}.{extension}")
}

fn join_web_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches(['/', '\\']);
    if dir.is_empty() || dir == "." {
        name.to_string()
    } else {
        format!("{dir}/{name}").replace('\\', "/")
    }
}
