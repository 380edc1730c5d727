//! Legacy (non-ASCII) image filenames and their canonical ASCII replacements.

/// Files that exist on disk under a legacy name.
const RENAMED_FILES: &[(&str, &str)] = &[
    ("产品全景图.png", "product-overview.png"),
    ("产品全景图.webp", "product-overview.webp"),
    ("产品全景图_thumb.jpg", "product-overview-thumb.jpg"),
    ("功能一.png", "feature-1.png"),
    ("功能一.webp", "feature-1.webp"),
    ("功能一_thumb.jpg", "feature-1-thumb.jpg"),
    ("功能2.png", "feature-2.png"),
    ("功能2.webp", "feature-2.webp"),
    ("功能2_thumb.jpg", "feature-2-thumb.jpg"),
    ("功能3.png", "feature-3.png"),
    ("功能3.webp", "feature-3.webp"),
    ("功能3_thumb.jpg", "feature-3-thumb.jpg"),
    ("功能4.png", "feature-4.png"),
    ("功能4.webp", "feature-4.webp"),
    ("功能4_thumb.jpg", "feature-4-thumb.jpg"),
    ("技术.png", "technology.png"),
    ("技术.webp", "technology.webp"),
    ("技术_thumb.jpg", "technology-thumb.jpg"),
    ("工作流对比.png", "workflow-comparison.png"),
    ("工作流对比.webp", "workflow-comparison.webp"),
    ("工作流对比_thumb.jpg", "workflow-comparison-thumb.jpg"),
    ("工作流程.png", "workflow-process.png"),
    ("工作流程.webp", "workflow-process.webp"),
    ("工作流程_thumb.jpg", "workflow-process-thumb.jpg"),
    ("发布功能界面.png", "publish-interface.png"),
    ("发布功能界面.webp", "publish-interface.webp"),
    ("发布功能界面_thumb.jpg", "publish-interface-thumb.jpg"),
    ("直播录制界面.png", "live-recording-interface.png"),
    ("直播录制界面.webp", "live-recording-interface.webp"),
    ("直播录制界面_thumb.jpg", "live-recording-interface-thumb.jpg"),
    ("专有名称，敏感词配置.png", "tag-configuration.png"),
    ("专有名称，敏感词配置.webp", "tag-configuration.webp"),
    ("专有名称，敏感词配置_thumb.jpg", "tag-configuration-thumb.jpg"),
    ("案例墙.png", "case-wall.png"),
    ("案例墙.webp", "case-wall.webp"),
    ("案例墙_thumb.jpg", "case-wall-thumb.jpg"),
    ("极睿直播智能体 iClip 3.0 - 短视频智能剪辑平台.png", "main-title.png"),
    ("极睿直播智能体 iClip 3.0 - 短视频智能剪辑平台.webp", "main-title.webp"),
    ("极睿直播智能体 iClip 3.0 - 短视频智能剪辑平台_thumb.jpg", "main-title-thumb.jpg"),
    ("iclip3.0介绍.png", "iclip3-intro.png"),
    ("iclip3.0介绍.webp", "iclip3-intro.webp"),
    ("iclip3.0介绍_thumb.jpg", "iclip3-intro-thumb.jpg"),
    ("iClip3新功能介绍及后续迭代规划.png", "iclip3-features.png"),
    ("iClip3新功能介绍及后续迭代规划.webp", "iclip3-features.webp"),
    ("iClip3新功能介绍及后续迭代规划_thumb.jpg", "iclip3-features-thumb.jpg"),
];

/// `.jpg` names the page referenced although only the `.png` was ever produced.
const JPG_ALIASES: &[(&str, &str)] = &[
    ("产品全景图.jpg", "product-overview.png"),
    ("功能一.jpg", "feature-1.png"),
    ("功能2.jpg", "feature-2.png"),
    ("功能3.jpg", "feature-3.png"),
    ("功能4.jpg", "feature-4.png"),
    ("技术.jpg", "technology.png"),
    ("工作流对比.jpg", "workflow-comparison.png"),
    ("工作流程.jpg", "workflow-process.png"),
    ("发布功能界面.jpg", "publish-interface.png"),
    ("直播录制界面.jpg", "live-recording-interface.png"),
    ("专有名称，敏感词配置.jpg", "tag-configuration.png"),
    ("案例墙.jpg", "case-wall.png"),
];

/// Immutable legacy → canonical filename table.
///
/// Entries are held longest legacy name first so that a rewrite never replaces a shorter
/// name inside a longer one.
#[derive(Debug, Clone)]
pub struct FilenameMapping {
    entries: Vec<(&'static str, &'static str)>,
}

impl FilenameMapping {
    fn from_tables(tables: &[&[(&'static str, &'static str)]]) -> Self {
        let mut entries: Vec<_> = tables.iter().flat_map(|table| table.iter().copied()).collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        entries.dedup_by(|a, b| a.0 == b.0);
        Self { entries }
    }

    /// Table used to rename files on disk.
    pub fn renames() -> Self {
        Self::from_tables(&[RENAMED_FILES])
    }

    /// Table used to fix HTML references, including `.jpg` aliases of `.png` files.
    pub fn references() -> Self {
        Self::from_tables(&[RENAMED_FILES, JPG_ALIASES])
    }

    /// Canonical name for a legacy name, if known.
    pub fn canonical(&self, legacy: &str) -> Option<&'static str> {
        self
            .entries
            .iter()
            .find(|(old, _)| *old == legacy)
            .map(|(_, new)| *new)
    }

    /// Iterate `(legacy, canonical)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every legacy name in `text` with its canonical name.
    pub fn rewrite(&self, text: &str) -> String {
        self.rewrite_with_prefix(text, "")
    }

    /// Replace `{prefix}{legacy}` with `{prefix}{canonical}` for every entry.
    pub fn rewrite_with_prefix(&self, text: &str, prefix: &str) -> String {
        let mut output = text.to_string();
        for (legacy, canonical) in self.iter() {
            let needle = format!("{prefix}{legacy}");
            if output.contains(&needle) {
                output = output.replace(&needle, &format!("{prefix}{canonical}"));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_have_expected_sizes() {
        assert_eq!(FilenameMapping::renames().len(), 45);
        assert_eq!(FilenameMapping::references().len(), 57);
    }

    #[test]
    fn canonical_names_are_ascii_and_legacy_names_are_not() {
        for (legacy, canonical) in FilenameMapping::references().iter() {
            assert!(canonical.is_ascii(), "{canonical}");
            assert!(!legacy.is_ascii(), "{legacy}");
        }
    }

    #[test]
    fn jpg_aliases_point_at_png_files() {
        let mapping = FilenameMapping::references();
        assert_eq!(mapping.canonical("产品全景图.jpg"), Some("product-overview.png"));
        assert_eq!(mapping.canonical("案例墙.jpg"), Some("case-wall.png"));
        assert_eq!(FilenameMapping::renames().canonical("案例墙.jpg"), None);
    }

    #[test]
    fn rewrite_removes_every_legacy_name() {
        let mapping = FilenameMapping::references();
        for (legacy, canonical) in mapping.iter() {
            let doc = format!(r#"<img src="images/{legacy}" alt="x"><a href='{legacy}'>"#);
            let fixed = mapping.rewrite(&doc);
            assert!(!fixed.contains(legacy), "{legacy} survived in {fixed}");
            assert!(fixed.contains(canonical));
        }
    }

    #[test]
    fn rewrite_is_idempotent() {
        let mapping = FilenameMapping::references();
        let doc: String = mapping
            .iter()
            .map(|(legacy, _)| format!("<img src=\"images/{legacy}\">\n"))
            .collect();
        let once = mapping.rewrite(&doc);
        assert_eq!(mapping.rewrite(&once), once);
    }

    #[test]
    fn prefixed_rewrite_only_touches_prefixed_names() {
        let mapping = FilenameMapping::renames();
        let doc = "images/功能一.png and caption 功能一.png";
        assert_eq!(
            mapping.rewrite_with_prefix(doc, "images/"),
            "images/feature-1.png and caption 功能一.png"
        );
    }

    #[test]
    fn thumb_names_are_not_clobbered_by_their_base_names() {
        let mapping = FilenameMapping::references();
        let fixed = mapping.rewrite("images/技术_thumb.jpg images/技术.jpg");
        assert_eq!(fixed, "images/technology-thumb.jpg images/technology.png");
    }
}
