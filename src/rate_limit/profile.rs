//! Named quota presets.

use super::RateLimitConfig;
use serde::{Deserialize, Serialize};

/// Application quotas published for the main endpoint families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaProfile {
    /// 20 requests per second, 100 per two minutes.
    #[default]
    Default,
    /// 100 requests per second, 2000 per two minutes.
    Match,
    /// 20 requests per second, 100 per two minutes.
    Spectator,
    /// 20 requests per second, 100 per two minutes.
    Status,
}

impl QuotaProfile {
    pub const ALL: [QuotaProfile; 4] =
        [QuotaProfile::Default, QuotaProfile::Match, QuotaProfile::Spectator, QuotaProfile::Status];

    pub fn config(self) -> RateLimitConfig {
        match self {
            QuotaProfile::Match => RateLimitConfig::new(100, 2000),
            QuotaProfile::Default | QuotaProfile::Spectator | QuotaProfile::Status => {
                RateLimitConfig::new(20, 100)
            }
        }
    }
}

impl From<QuotaProfile> for RateLimitConfig {
    fn from(profile: QuotaProfile) -> Self {
        profile.config()
    }
}
