//! Data structures produced while running the passes.

use serde::{Deserialize, Serialize};

/// Bytes in a kilobyte as reported to the console.
const KIB: f64 = 1024.0;

/// Convert a byte count to megabytes.
pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / KIB / KIB
}

/// Convert a byte count to kilobytes.
pub fn kilobytes(bytes: u64) -> f64 {
    bytes as f64 / KIB
}

/// Percentage saved going from `before` to `after`; zero when `before` is zero.
pub fn reduction_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        0.0
    } else {
        (1.0 - after as f64 / before as f64) * 100.0
    }
}

/// One line of `optimization_log.json` written by the variants pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptimizationRecord {
    /// Source file name.
    pub file: String,
    /// Size of the source file in bytes.
    pub original_size: u64,
    /// Size of the compressed JPEG variant, zero when it failed.
    pub compressed_size: u64,
    /// Size of the WebP variant, zero when it failed.
    pub webp_size: u64,
    /// Size of the thumbnail, zero when it failed.
    pub thumbnail_size: u64,
}

/// Running byte totals for a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeTotals {
    /// Sum of input sizes.
    pub original: u64,
    /// Sum of output sizes.
    pub optimized: u64,
}

impl SizeTotals {
    /// Account for one processed file.
    pub fn add(&mut self, original: u64, optimized: u64) {
        self.original += original;
        self.optimized += optimized;
    }

    /// Bytes saved overall; zero when output grew.
    pub fn saved(&self) -> u64 {
        self.original.saturating_sub(self.optimized)
    }

    /// Overall reduction percentage.
    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.original, self.optimized)
    }
}

/// Outcome counters shared by the per-file passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    /// Files the pass looked at.
    pub seen: usize,
    /// Files that were changed.
    pub changed: usize,
    /// Files that failed and were skipped.
    pub failed: usize,
}

/// Result of a single-document rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The document content changed and was written.
    Changed,
    /// The document was already in the desired state.
    Unchanged,
}

impl PassOutcome {
    /// Whether the document changed.
    pub fn changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}
