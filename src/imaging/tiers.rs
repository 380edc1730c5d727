//! Size tiers for the instant-loading shrink pass.

use std::fmt;

use crate::imaging::dimensions::{even, fit_within};

/// Resize policy chosen for an image by its byte size and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Over 1 MB or beyond 1800×1400.
    UltraLarge,
    /// Over 0.5 MB or beyond 1500×1200.
    Large,
    /// Over 0.3 MB or beyond 1200×1000.
    Medium,
    /// Everything else.
    Small,
}

/// Limits applied to an image in a given tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierPolicy {
    /// Bounding box width.
    pub max_width: u32,
    /// Bounding box height.
    pub max_height: u32,
    /// Encoder quality hint.
    pub quality: u8,
    /// Output size above which a warning is logged, in megabytes.
    pub budget_mb: f64,
}

struct Trigger {
    tier: Tier,
    size_mb: f64,
    width: u32,
    height: u32,
}

const TRIGGERS: [Trigger; 3] = [
    Trigger {
        tier: Tier::UltraLarge,
        size_mb: 1.0,
        width: 1800,
        height: 1400,
    },
    Trigger {
        tier: Tier::Large,
        size_mb: 0.5,
        width: 1500,
        height: 1200,
    },
    Trigger {
        tier: Tier::Medium,
        size_mb: 0.3,
        width: 1200,
        height: 1000,
    },
];

impl Tier {
    /// Classify an image; the first tier whose size or dimension trigger fires wins.
    pub fn classify(size_mb: f64, width: u32, height: u32) -> Self {
        TRIGGERS
            .iter()
            .find(|trigger| {
                size_mb > trigger.size_mb || width > trigger.width || height > trigger.height
            })
            .map(|trigger| trigger.tier)
            .unwrap_or(Tier::Small)
    }

    /// Limits for this tier.
    pub fn policy(self) -> TierPolicy {
        let (max_width, max_height, quality, budget_mb) = match self {
            Tier::UltraLarge => (800, 600, 85, 0.1),
            Tier::Large => (1000, 800, 90, 0.2),
            Tier::Medium => (1200, 1000, 95, 0.3),
            Tier::Small => (1500, 1200, 98, 0.5),
        };
        TierPolicy {
            max_width,
            max_height,
            quality,
            budget_mb,
        }
    }

    /// Target dimensions for an image of this tier, rounded to even edges when resized.
    pub fn target_size(self, width: u32, height: u32) -> (u32, u32) {
        let policy = self.policy();
        let fitted = fit_within(width, height, policy.max_width, policy.max_height);
        if fitted == (width, height) {
            fitted
        } else {
            (even(fitted.0), even(fitted.1))
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::UltraLarge => "ultra_large",
            Tier::Large => "large",
            Tier::Medium => "medium",
            Tier::Small => "small",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_size_or_dimension() {
        assert_eq!(Tier::classify(1.5, 100, 100), Tier::UltraLarge);
        assert_eq!(Tier::classify(0.1, 1801, 100), Tier::UltraLarge);
        assert_eq!(Tier::classify(0.6, 100, 100), Tier::Large);
        assert_eq!(Tier::classify(0.1, 100, 1201), Tier::Large);
        assert_eq!(Tier::classify(0.31, 100, 100), Tier::Medium);
        assert_eq!(Tier::classify(0.1, 1200, 1000), Tier::Small);
    }

    #[test]
    fn policies_match_table() {
        let ultra = Tier::UltraLarge.policy();
        assert_eq!((ultra.max_width, ultra.max_height, ultra.quality), (800, 600, 85));
        assert_eq!(Tier::Small.policy().budget_mb, 0.5);
    }

    #[test]
    fn target_sizes_are_even_only_when_resized() {
        assert_eq!(Tier::UltraLarge.target_size(1003, 1200), (500, 600));
        assert_eq!(Tier::Small.target_size(641, 481), (641, 481));
    }

    #[test]
    fn displays_snake_case_names() {
        assert_eq!(Tier::UltraLarge.to_string(), "ultra_large");
    }
}
