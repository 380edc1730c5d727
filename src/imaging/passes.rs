//! Batch image passes run over the page's working directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::GenericImageView;
use tracing::{error, info, warn};

use crate::asset_paths::variant_file_name;
use crate::error::PrepError;
use crate::imaging::backup::{backup_copy, move_to_backup, restore, timestamped_backup_dir};
use crate::imaging::dimensions::{fit_longest_side, fit_width, fit_within};
use crate::imaging::encode::{
    OutputFormat, file_size, flatten_onto_white, load_image, load_image_unbounded, resize_to,
    save_image,
};
use crate::imaging::scan::list_png_files;
use crate::imaging::tiers::Tier;
use crate::models::{OptimizationRecord, SizeTotals, kilobytes, megabytes, reduction_percent};
use crate::project::SiteLayout;

/// Outcome of shrinking one file in the instant pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkResult {
    /// Tier the file was classified into.
    pub tier: Tier,
    /// Dimensions before.
    pub original_dimensions: (u32, u32),
    /// Dimensions after.
    pub new_dimensions: (u32, u32),
    /// Bytes before.
    pub original_size: u64,
    /// Bytes after.
    pub new_size: u64,
}

impl ShrinkResult {
    /// Whether the image was resampled.
    pub fn resized(&self) -> bool {
        self.original_dimensions != self.new_dimensions
    }
}

/// Totals for the instant pass.
#[derive(Debug, Clone, Default)]
pub struct InstantReport {
    /// Directory holding the untouched copies.
    pub backup_dir: PathBuf,
    /// PNG files found.
    pub files: usize,
    /// Files that were resampled.
    pub resized: usize,
    /// Files that failed.
    pub failed: usize,
    /// Byte totals over successfully processed files.
    pub totals: SizeTotals,
}

/// Back up `path` into `backup_dir`, then shrink it in place according to its tier.
pub fn shrink_for_instant(path: &Path, backup_dir: &Path) -> Result<ShrinkResult, PrepError> {
    backup_copy(path, backup_dir)?;
    let original_size = file_size(path)?;
    let image = load_image(path)?;
    let original_dimensions = image.dimensions();

    let tier = Tier::classify(
        megabytes(original_size),
        original_dimensions.0,
        original_dimensions.1,
    );
    let new_dimensions = tier.target_size(original_dimensions.0, original_dimensions.1);
    let resized = resize_to(image, new_dimensions.0, new_dimensions.1);
    let new_size = save_image(&resized, path, OutputFormat::Png)?;

    Ok(ShrinkResult {
        tier,
        original_dimensions,
        new_dimensions,
        original_size,
        new_size,
    })
}

/// Shrink every PNG in the page root by tier, after copying it to a timestamped backup.
pub fn run_instant_pass(layout: &SiteLayout) -> Result<InstantReport> {
    let root = layout.root();
    let files = list_png_files(root).with_context(|| format!("failed to list {}", root.display()))?;
    let backup_dir = timestamped_backup_dir(root, &layout.config().instant_backup_prefix);
    info!(files = files.len(), backup = %backup_dir.display(), "instant optimisation started");

    let mut report = InstantReport {
        backup_dir,
        files: files.len(),
        ..InstantReport::default()
    };

    for path in &files {
        match shrink_for_instant(path, &report.backup_dir) {
            Ok(result) => {
                report.totals.add(result.original_size, result.new_size);
                if result.resized() {
                    report.resized += 1;
                }
                info!(
                    file = %path.display(),
                    tier = %result.tier,
                    from = ?result.original_dimensions,
                    to = ?result.new_dimensions,
                    before_mb = %format!("{:.2}", megabytes(result.original_size)),
                    after_mb = %format!("{:.2}", megabytes(result.new_size)),
                    reduction = %format!(
                        "{:.1}%",
                        reduction_percent(result.original_size, result.new_size)
                    ),
                    "image optimised"
                );
                let budget = result.tier.policy().budget_mb;
                if megabytes(result.new_size) > budget {
                    warn!(
                        file = %path.display(),
                        tier = %result.tier,
                        budget_mb = budget,
                        "image still above tier budget"
                    );
                }
            }
            Err(err) => {
                report.failed += 1;
                error!(file = %path.display(), error = %err, "instant optimisation failed");
            }
        }
    }

    info!(
        files = report.files,
        resized = report.resized,
        original_mb = %format!("{:.1}", megabytes(report.totals.original)),
        optimized_mb = %format!("{:.1}", megabytes(report.totals.optimized)),
        reduction = %format!("{:.1}%", report.totals.reduction_percent()),
        saved_mb = %format!("{:.1}", megabytes(report.totals.saved())),
        backup = %report.backup_dir.display(),
        "instant optimisation finished"
    );
    Ok(report)
}

/// Totals for the smart compression pass.
#[derive(Debug, Clone, Default)]
pub struct CompressReport {
    /// PNG files found.
    pub files: usize,
    /// Files re-encoded successfully.
    pub compressed: usize,
    /// Byte totals over successfully compressed files.
    pub totals: SizeTotals,
}

/// Re-encode `backup` into `target` as a flattened PNG no wider than `max_width`.
pub fn compress_png(backup: &Path, target: &Path, max_width: u32) -> Result<u64, PrepError> {
    let image = flatten_onto_white(&load_image(backup)?);
    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_width(width, height, max_width);
    save_image(&resize_to(image, new_width, new_height), target, OutputFormat::Png)
}

/// Move every PNG into the compression backup and re-encode it in place.
///
/// A file whose re-encode fails is restored from its backup.
pub fn run_compress_pass(layout: &SiteLayout) -> Result<CompressReport> {
    let root = layout.root();
    let files = list_png_files(root).with_context(|| format!("failed to list {}", root.display()))?;
    if files.is_empty() {
        info!("no png files found");
        return Ok(CompressReport::default());
    }

    let backup_dir = layout.compress_backup_dir();
    let max_width = layout.config().limits.compress_max_width;
    let mut report = CompressReport {
        files: files.len(),
        ..CompressReport::default()
    };

    for path in &files {
        let original_size =
            file_size(path).with_context(|| format!("failed to stat {}", path.display()))?;
        let backup = move_to_backup(path, &backup_dir)
            .with_context(|| format!("failed to back up {}", path.display()))?;

        match compress_png(&backup, path, max_width) {
            Ok(compressed_size) => {
                report.compressed += 1;
                report.totals.add(original_size, compressed_size);
                info!(
                    file = %path.display(),
                    before_mb = %format!("{:.1}", megabytes(original_size)),
                    after_mb = %format!("{:.1}", megabytes(compressed_size)),
                    reduction =
                        %format!("{:.1}%", reduction_percent(original_size, compressed_size)),
                    "compressed"
                );
            }
            Err(err) => {
                warn!(
                    file = %path.display(),
                    error = %err,
                    "compression failed, restoring original"
                );
                restore(&backup, path)
                    .with_context(|| format!("failed to restore {}", path.display()))?;
            }
        }
    }

    info!(
        compressed = report.compressed,
        files = report.files,
        original_mb = %format!("{:.1}", megabytes(report.totals.original)),
        compressed_mb = %format!("{:.1}", megabytes(report.totals.optimized)),
        reduction = %format!("{:.1}%", report.totals.reduction_percent()),
        "compression finished"
    );
    Ok(report)
}

/// Totals and per-file records for the variants pass.
#[derive(Debug, Clone, Default)]
pub struct VariantsReport {
    /// One record per source PNG.
    pub records: Vec<OptimizationRecord>,
    /// Written JSON log.
    pub log_path: PathBuf,
}

impl VariantsReport {
    /// Sum of source sizes.
    pub fn original_total(&self) -> u64 {
        self.records.iter().map(|record| record.original_size).sum()
    }

    /// Sum of compressed JPEG sizes.
    pub fn compressed_total(&self) -> u64 {
        self.records.iter().map(|record| record.compressed_size).sum()
    }

    /// Sum of WebP sizes.
    pub fn webp_total(&self) -> u64 {
        self.records.iter().map(|record| record.webp_size).sum()
    }
}

fn variant_or_zero(kind: &str, source: &Path, result: Result<u64, PrepError>) -> u64 {
    match result {
        Ok(size) => {
            info!(
                file = %source.display(),
                variant = kind,
                kb = %format!("{:.1}", kilobytes(size)),
                "variant written"
            );
            size
        }
        Err(err) => {
            error!(file = %source.display(), variant = kind, error = %err, "variant failed");
            0
        }
    }
}

/// Write the compressed JPEG, WebP and thumbnail variants of one PNG.
pub fn write_variants(source: &Path, layout: &SiteLayout) -> Result<OptimizationRecord, PrepError> {
    let limits = &layout.config().limits;
    let original_size = file_size(source)?;
    let image = load_image(source)?;
    let (width, height) = image.dimensions();

    let compressed = {
        let (w, h) = fit_width(width, height, limits.variant_max_width);
        let target = layout.compressed_dir().join(variant_file_name(source, "", "jpg"));
        save_image(
            &resize_to(image.clone(), w, h),
            &target,
            OutputFormat::Jpeg {
                quality: limits.variant_quality,
            },
        )
    };

    let webp = {
        let target = layout.webp_dir().join(variant_file_name(source, "", "webp"));
        save_image(&flatten_onto_white(&image), &target, OutputFormat::WebP)
    };

    let thumbnail = {
        let (w, h) = fit_within(width, height, limits.thumbnail_size, limits.thumbnail_size);
        let target = layout.thumbnails_dir().join(variant_file_name(source, "_thumb", "jpg"));
        save_image(
            &resize_to(image, w, h),
            &target,
            OutputFormat::Jpeg {
                quality: limits.thumbnail_quality,
            },
        )
    };

    Ok(OptimizationRecord {
        file: source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        original_size,
        compressed_size: variant_or_zero("compressed", source, compressed),
        webp_size: variant_or_zero("webp", source, webp),
        thumbnail_size: variant_or_zero("thumbnail", source, thumbnail),
    })
}

/// Generate variants for every PNG in the page root and write the JSON log.
pub fn run_variants_pass(layout: &SiteLayout) -> Result<VariantsReport> {
    for dir in [layout.webp_dir(), layout.compressed_dir(), layout.thumbnails_dir()] {
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let root = layout.root();
    let files = list_png_files(root).with_context(|| format!("failed to list {}", root.display()))?;
    let mut report = VariantsReport {
        log_path: layout.resolve(&layout.config().optimization_log),
        ..VariantsReport::default()
    };

    for (index, path) in files.iter().enumerate() {
        info!(
            file = %path.display(),
            progress = %format!("{}/{}", index + 1, files.len()),
            "processing image"
        );
        match write_variants(path, layout) {
            Ok(record) => report.records.push(record),
            Err(err) => error!(file = %path.display(), error = %err, "failed to read source image"),
        }
    }

    let json = serde_json::to_string_pretty(&report.records)
        .context("failed to serialise optimisation log")?;
    fs::write(&report.log_path, json)
        .with_context(|| format!("failed to write {}", report.log_path.display()))?;

    let original = report.original_total();
    info!(
        original_mb = %format!("{:.1}", megabytes(original)),
        compressed_mb = %format!("{:.1}", megabytes(report.compressed_total())),
        webp_mb = %format!("{:.1}", megabytes(report.webp_total())),
        compressed_reduction =
            %format!("{:.1}%", reduction_percent(original, report.compressed_total())),
        webp_reduction = %format!("{:.1}%", reduction_percent(original, report.webp_total())),
        log = %report.log_path.display(),
        "variants finished"
    );
    Ok(report)
}

/// Result of the fix-large pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FixLargeReport {
    /// Dimensions before.
    pub original_dimensions: (u32, u32),
    /// Dimensions after.
    pub new_dimensions: (u32, u32),
    /// Bytes before.
    pub original_size: u64,
    /// Bytes after.
    pub new_size: u64,
    /// Where the original was kept.
    pub backup: PathBuf,
}

/// Shrink the configured oversized image so its longest side fits the limit.
///
/// The original is renamed to `<name>.backup` and the re-encoded PNG takes its place.
pub fn fix_large_image(layout: &SiteLayout) -> Result<FixLargeReport> {
    let input = layout.resolve(&layout.config().oversized_image);
    let image = load_image_unbounded(&input)?;
    let original_dimensions = image.dimensions();
    info!(
        file = %input.display(),
        dimensions = ?original_dimensions,
        color = ?image.color(),
        "processing oversized image"
    );

    let max = layout.config().limits.max_dimension;
    let new_dimensions = fit_longest_side(original_dimensions.0, original_dimensions.1, max);
    if new_dimensions != original_dimensions {
        info!(dimensions = ?new_dimensions, "downscaling");
    }
    let flattened = flatten_onto_white(&resize_to(image, new_dimensions.0, new_dimensions.1));

    let compressed = input.with_file_name(variant_file_name(&input, "_compressed", "png"));
    let new_size = save_image(&flattened, &compressed, OutputFormat::Png)?;
    let original_size = file_size(&input)?;

    let mut backup_name = input.as_os_str().to_os_string();
    backup_name.push(".backup");
    let backup = PathBuf::from(backup_name);
    fs::rename(&input, &backup)
        .with_context(|| format!("failed to move {} to {}", input.display(), backup.display()))?;
    fs::rename(&compressed, &input)
        .with_context(|| format!("failed to move {} into place", compressed.display()))?;

    info!(
        original_mb = %format!("{:.1}", megabytes(original_size)),
        new_mb = %format!("{:.1}", megabytes(new_size)),
        reduction = %format!("{:.1}%", reduction_percent(original_size, new_size)),
        "oversized image fixed"
    );

    Ok(FixLargeReport {
        original_dimensions,
        new_dimensions,
        original_size,
        new_size,
        backup,
    })
}
