use serde::Deserialize;

use crate::tier::ReputationTier;

/// Behavioral inputs collected by the surrounding app. The formula that
/// turns them into a score is a policy, not a fixed rule; swap the
/// `ScorePolicy` to change it without touching the tier mapping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReputationSignals {
    /// 0.0..=1.0
    pub profile_completion: f64,
    pub photo_verified: bool,
    /// 0.0..=1.0
    pub response_rate: f64,
    pub account_age_days: u32,
    pub conversations_completed: u32,
    pub reports_received: u32,
    pub blocks_received: u32,
}

pub trait ScorePolicy {
    fn score(&self, signals: &ReputationSignals) -> i64;
}

pub struct DefaultScorePolicy;

impl ScorePolicy for DefaultScorePolicy {
    fn score(&self, s: &ReputationSignals) -> i64 {
        let mut score = 0.0;
        score += 80.0 * s.profile_completion.clamp(0.0, 1.0);
        if s.photo_verified {
            score += 120.0;
        }
        score += 150.0 * s.response_rate.clamp(0.0, 1.0);
        score += f64::from(s.account_age_days.min(365)) * 1.5;
        score += f64::from(s.conversations_completed.min(500)) * 2.0;
        score -= 60.0 * f64::from(s.reports_received);
        score -= 40.0 * f64::from(s.blocks_received);
        score.max(0.0) as i64
    }
}

// Ascending floors; a score maps to the highest tier it clears.
const TIER_FLOORS: [(i64, ReputationTier); 5] = [
    (0, ReputationTier::New),
    (100, ReputationTier::Active),
    (300, ReputationTier::Established),
    (700, ReputationTier::Trusted),
    (1200, ReputationTier::Distinguished),
];

pub fn classify_score(score: i64) -> ReputationTier {
    let mut tier = ReputationTier::New;
    for (floor, t) in TIER_FLOORS {
        if score >= floor {
            tier = t;
        }
    }
    tier
}

pub fn classify(policy: &dyn ScorePolicy, signals: &ReputationSignals) -> (i64, ReputationTier) {
    let score = policy.score(signals);
    (score, classify_score(score))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_mapping_is_monotonic() {
        let mut last = classify_score(0);
        for score in 0..2000 {
            let tier = classify_score(score);
            assert!(tier >= last, "tier dropped at score {score}");
            last = tier;
        }
    }

    #[test]
    fn floors_map_to_their_tiers() {
        assert_eq!(classify_score(0), ReputationTier::New);
        assert_eq!(classify_score(99), ReputationTier::New);
        assert_eq!(classify_score(100), ReputationTier::Active);
        assert_eq!(classify_score(300), ReputationTier::Established);
        assert_eq!(classify_score(700), ReputationTier::Trusted);
        assert_eq!(classify_score(1199), ReputationTier::Trusted);
        assert_eq!(classify_score(1200), ReputationTier::Distinguished);
    }

    #[test]
    fn default_policy_rewards_and_penalizes() {
        let fresh = ReputationSignals::default();
        let (score, tier) = classify(&DefaultScorePolicy, &fresh);
        assert_eq!(score, 0);
        assert_eq!(tier, ReputationTier::New);

        let solid = ReputationSignals {
            profile_completion: 1.0,
            photo_verified: true,
            response_rate: 0.9,
            account_age_days: 200,
            conversations_completed: 150,
            ..Default::default()
        };
        let (solid_score, solid_tier) = classify(&DefaultScorePolicy, &solid);
        assert!(solid_tier >= ReputationTier::Trusted, "got {solid_tier:?}");

        let reported = ReputationSignals {
            reports_received: 5,
            blocks_received: 3,
            ..solid.clone()
        };
        let (reported_score, _) = classify(&DefaultScorePolicy, &reported);
        assert!(reported_score < solid_score);
    }

    #[test]
    fn policy_is_deterministic() {
        let signals = ReputationSignals {
            profile_completion: 0.5,
            response_rate: 0.5,
            account_age_days: 30,
            ..Default::default()
        };
        assert_eq!(
            classify(&DefaultScorePolicy, &signals),
            classify(&DefaultScorePolicy, &signals)
        );
    }
}
