//! Helpers for classifying and deriving image references in HTML.
//!
//! Filtering external references, deriving variant paths and expanding lookup candidates
//! live in focused submodules so each can be tested on its own. The rewrite and image passes
//! share them.

mod candidates;
mod filters;
mod variants;

pub use candidates::{IMAGE_EXTENSIONS, find_image_file, generate_image_candidates};
pub use filters::should_ignore_asset_reference;
pub use variants::{VariantPaths, file_name, reference_stem, variant_file_name};
