//! `OPTIMIZATION_REPORT.md` written at the end of staging.

use std::fs;
use std::path::Path;
use std::process::Command;

use chrono::Local;

use crate::error::PrepError;
use crate::models::{kilobytes, megabytes};

/// Count and total size of the published images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageStats {
    /// Number of files.
    pub count: usize,
    /// Total bytes.
    pub total_bytes: u64,
}

impl ImageStats {
    /// Average size in kilobytes; zero when there are no images.
    pub fn average_kb(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            kilobytes(self.total_bytes) / self.count as f64
        }
    }
}

/// Sum the regular files directly inside `dir`. A missing directory has no images.
pub fn collect_image_stats(dir: &Path) -> Result<ImageStats, PrepError> {
    let mut stats = ImageStats::default();
    if !dir.is_dir() {
        return Ok(stats);
    }
    let entries = fs::read_dir(dir).map_err(|err| PrepError::io(dir, err))?;
    for entry in entries.flatten() {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if metadata.is_file() {
            stats.count += 1;
            stats.total_bytes += metadata.len();
        }
    }
    Ok(stats)
}

/// Deployment timestamp from the system `date` command, or the local clock when it is unavailable.
pub fn deployment_date() -> String {
    Command::new("date")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|date| !date.is_empty())
        .unwrap_or_else(|| Local::now().format("%a %b %e %H:%M:%S %Z %Y").to_string())
}

/// Render the Markdown report.
pub fn render_report(stats: &ImageStats, date: &str) -> String {
    format!(
        r#"# Image Optimization Report

## Statistics
- **Images**: {count}
- **Total size**: {total:.1}MB
- **Average size**: {average:.1}KB per image

## Features
- WebP variants with JPEG fallback
- Lazy loading with IntersectionObserver
- Thumbnail placeholders
- Critical image preloading
- Responsive layout rules
- Loading animation

## Delivery
- Formats: WebP + JPEG fallback
- Loading: lazy loading + preload
- Compression: tiered quality
- Responsive: mobile rules

Deployed: {date}
"#,
        count = stats.count,
        total = megabytes(stats.total_bytes),
        average = stats.average_kb(),
    )
}

/// Collect statistics for `images_dir` and write the report to `path`.
pub fn write_report(path: &Path, images_dir: &Path) -> Result<ImageStats, PrepError> {
    let stats = collect_image_stats(images_dir)?;
    fs::write(path, render_report(&stats, &deployment_date()))
        .map_err(|err| PrepError::io(path, err))?;
    Ok(stats)
}
