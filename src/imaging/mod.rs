//! Image transforms: size policy, encoders, backups and the batch passes built on them.

pub mod backup;
pub mod dimensions;
pub mod encode;
pub mod passes;
pub mod scan;
pub mod tiers;

pub use encode::OutputFormat;
pub use passes::{
    CompressReport, FixLargeReport, InstantReport, VariantsReport, fix_large_image,
    run_compress_pass, run_instant_pass, run_variants_pass,
};
pub use tiers::{Tier, TierPolicy};
