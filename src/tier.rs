use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Daily limit value meaning "no cap".
pub const UNLIMITED: i64 = -1;

/// Reputation tiers, lowest first. Comparisons go through the derived
/// `Ord`, so ordering is by rank and never by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationTier {
    New,
    Active,
    Established,
    Trusted,
    Distinguished,
}

impl ReputationTier {
    pub const ALL: [ReputationTier; 5] = [
        ReputationTier::New,
        ReputationTier::Active,
        ReputationTier::Established,
        ReputationTier::Trusted,
        ReputationTier::Distinguished,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }

    /// How many new conversations with strictly-higher-tier users this
    /// tier may start per calendar day.
    pub fn daily_limit(self) -> i64 {
        match self {
            ReputationTier::New => 1,
            ReputationTier::Active => 3,
            ReputationTier::Established => 5,
            ReputationTier::Trusted => 10,
            ReputationTier::Distinguished => UNLIMITED,
        }
    }

    pub fn compare(a: ReputationTier, b: ReputationTier) -> Ordering {
        a.cmp(&b)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReputationTier::New => "new",
            ReputationTier::Active => "active",
            ReputationTier::Established => "established",
            ReputationTier::Trusted => "trusted",
            ReputationTier::Distinguished => "distinguished",
        }
    }
}

impl fmt::Display for ReputationTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReputationTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ReputationTier::New),
            "active" => Ok(ReputationTier::Active),
            "established" => Ok(ReputationTier::Established),
            "trusted" => Ok(ReputationTier::Trusted),
            "distinguished" => Ok(ReputationTier::Distinguished),
            _ => Err(anyhow::anyhow!("unknown reputation tier {s:?}")),
        }
    }
}
