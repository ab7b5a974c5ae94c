// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Named rate-limit tiers plus per-tenant overrides.

use serde::{Deserialize, Serialize};

/// Per-second/minute/hour request ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitTier {
    pub per_second: u32,
    pub per_minute: u32,
    pub per_hour: u32,
}

impl RateLimitTier {
    pub const FREE: RateLimitTier = RateLimitTier { per_second: 2, per_minute: 60, per_hour: 1_000 };
    pub const PRO: RateLimitTier = RateLimitTier { per_second: 20, per_minute: 600, per_hour: 20_000 };
    pub const ENTERPRISE: RateLimitTier =
        RateLimitTier { per_second: 200, per_minute: 6_000, per_hour: 200_000 };
    pub const UNLIMITED: RateLimitTier =
        RateLimitTier { per_second: u32::MAX, per_minute: u32::MAX, per_hour: u32::MAX };

    /// Stricter ceiling applied to requests identified only by source IP
    /// (no authenticated tenant).
    pub const ANONYMOUS: RateLimitTier = RateLimitTier { per_second: 1, per_minute: 20, per_hour: 200 };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_monotonically_more_permissive() {
        assert!(RateLimitTier::FREE.per_hour < RateLimitTier::PRO.per_hour);
        assert!(RateLimitTier::PRO.per_hour < RateLimitTier::ENTERPRISE.per_hour);
        assert!(RateLimitTier::ENTERPRISE.per_hour < RateLimitTier::UNLIMITED.per_hour);
    }

    #[test]
    fn anonymous_is_stricter_than_free() {
        assert!(RateLimitTier::ANONYMOUS.per_hour < RateLimitTier::FREE.per_hour);
    }
}
