//! Trust badges derived from a user's reputation score
//!
//! The score itself is accumulated elsewhere (returning items, confirmed
//! claims) and stored on the profile. This module only maps it to a tier:
//! - Tiers are evaluated highest-first, first match wins
//! - Any integer is accepted, negatives land in the base tier
//! - Badge size only changes presentation, never the tier

use serde::{Deserialize, Serialize};

use crate::{HERO_THRESHOLD, TRUSTED_THRESHOLD, VERIFIED_THRESHOLD};

/// Reputation tiers, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    NewMember,
    VerifiedMember,
    TrustedFinder,
    CommunityHero,
}

/// Icon shown next to a tier label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeIcon {
    Award,
    ShieldCheck,
    Shield,
}

impl BadgeIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeIcon::Award => "award",
            BadgeIcon::ShieldCheck => "shield-check",
            BadgeIcon::Shield => "shield",
        }
    }
}

/// Classify a trust score into its tier
pub fn classify(score: i64) -> TrustTier {
    if score >= HERO_THRESHOLD {
        TrustTier::CommunityHero
    } else if score >= TRUSTED_THRESHOLD {
        TrustTier::TrustedFinder
    } else if score >= VERIFIED_THRESHOLD {
        TrustTier::VerifiedMember
    } else {
        TrustTier::NewMember
    }
}

impl TrustTier {
    /// All tiers in ascending order
    pub const ALL: [TrustTier; 4] = [
        TrustTier::NewMember,
        TrustTier::VerifiedMember,
        TrustTier::TrustedFinder,
        TrustTier::CommunityHero,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrustTier::NewMember => "New Member",
            TrustTier::VerifiedMember => "Verified Member",
            TrustTier::TrustedFinder => "Trusted Finder",
            TrustTier::CommunityHero => "Community Hero",
        }
    }

    pub fn icon(&self) -> BadgeIcon {
        match self {
            TrustTier::CommunityHero => BadgeIcon::Award,
            TrustTier::TrustedFinder | TrustTier::VerifiedMember => BadgeIcon::ShieldCheck,
            TrustTier::NewMember => BadgeIcon::Shield,
        }
    }

    /// CSS color classes for the badge
    pub fn color_class(&self) -> &'static str {
        match self {
            TrustTier::CommunityHero => "bg-amber-100 text-amber-700",
            TrustTier::TrustedFinder => "bg-emerald-100 text-emerald-700",
            TrustTier::VerifiedMember => "bg-blue-100 text-blue-700",
            TrustTier::NewMember => "bg-gray-100 text-gray-600",
        }
    }

    /// Lowest score that still classifies into this tier
    pub fn min_score(&self) -> i64 {
        match self {
            TrustTier::CommunityHero => HERO_THRESHOLD,
            TrustTier::TrustedFinder => TRUSTED_THRESHOLD,
            TrustTier::VerifiedMember => VERIFIED_THRESHOLD,
            TrustTier::NewMember => i64::MIN,
        }
    }

    /// The tier above this one, if any
    pub fn next(&self) -> Option<TrustTier> {
        match self {
            TrustTier::NewMember => Some(TrustTier::VerifiedMember),
            TrustTier::VerifiedMember => Some(TrustTier::TrustedFinder),
            TrustTier::TrustedFinder => Some(TrustTier::CommunityHero),
            TrustTier::CommunityHero => None,
        }
    }
}

impl std::fmt::Display for TrustTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Points still needed to reach the next tier (None at the top)
pub fn points_to_next_tier(score: i64) -> Option<i64> {
    classify(score)
        .next()
        .map(|next| next.min_score().saturating_sub(score))
}

/// Rendered badge size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BadgeSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BadgeSize {
    pub fn icon_px(&self) -> u32 {
        match self {
            BadgeSize::Small => 14,
            BadgeSize::Medium => 16,
            BadgeSize::Large => 20,
        }
    }

    pub fn text_class(&self) -> &'static str {
        match self {
            BadgeSize::Small => "text-xs px-2 py-0.5",
            BadgeSize::Medium => "text-sm px-2.5 py-1",
            BadgeSize::Large => "text-base px-3 py-1.5",
        }
    }
}

impl std::str::FromStr for BadgeSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sm" | "small" => Ok(BadgeSize::Small),
            "md" | "medium" => Ok(BadgeSize::Medium),
            "lg" | "large" => Ok(BadgeSize::Large),
            other => Err(format!("unknown badge size: {}", other)),
        }
    }
}

/// Everything a renderer needs to draw a trust badge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustBadge {
    pub score: i64,
    pub tier: TrustTier,
    pub label: String,
    pub icon: BadgeIcon,
    pub color_class: String,
    pub size: BadgeSize,
    pub icon_px: u32,
}

impl TrustBadge {
    pub fn new(score: i64, size: BadgeSize) -> Self {
        let tier = classify(score);
        Self {
            score,
            tier,
            label: tier.label().to_string(),
            icon: tier.icon(),
            color_class: tier.color_class().to_string(),
            size,
            icon_px: size.icon_px(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0), TrustTier::NewMember);
        assert_eq!(classify(9), TrustTier::NewMember);
        assert_eq!(classify(10), TrustTier::VerifiedMember);
        assert_eq!(classify(49), TrustTier::VerifiedMember);
        assert_eq!(classify(50), TrustTier::TrustedFinder);
        assert_eq!(classify(99), TrustTier::TrustedFinder);
        assert_eq!(classify(100), TrustTier::CommunityHero);
        assert_eq!(classify(1000), TrustTier::CommunityHero);
    }

    #[test]
    fn test_negative_score_is_base_tier() {
        assert_eq!(classify(-1), TrustTier::NewMember);
        assert_eq!(classify(i64::MIN), TrustTier::NewMember);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut previous = classify(-20);
        for score in -20..=250 {
            let tier = classify(score);
            assert!(tier >= previous, "score {} dropped to {:?}", score, tier);
            previous = tier;
        }
    }

    #[test]
    fn test_tier_labels_and_icons() {
        assert_eq!(classify(150).label(), "Community Hero");
        assert_eq!(classify(150).icon(), BadgeIcon::Award);
        assert_eq!(classify(60).icon(), BadgeIcon::ShieldCheck);
        assert_eq!(classify(20).icon(), BadgeIcon::ShieldCheck);
        assert_eq!(classify(3).icon(), BadgeIcon::Shield);
        assert_eq!(BadgeIcon::ShieldCheck.as_str(), "shield-check");
    }

    #[test]
    fn test_min_score_classifies_into_own_tier() {
        for tier in TrustTier::ALL.iter().skip(1) {
            assert_eq!(classify(tier.min_score()), *tier);
            assert!(classify(tier.min_score() - 1) < *tier);
        }
    }

    #[test]
    fn test_points_to_next_tier() {
        assert_eq!(points_to_next_tier(0), Some(10));
        assert_eq!(points_to_next_tier(-5), Some(15));
        assert_eq!(points_to_next_tier(42), Some(8));
        assert_eq!(points_to_next_tier(99), Some(1));
        assert_eq!(points_to_next_tier(100), None);
    }

    #[test]
    fn test_badge_size_does_not_change_tier() {
        let small = TrustBadge::new(55, BadgeSize::Small);
        let large = TrustBadge::new(55, BadgeSize::Large);
        assert_eq!(small.tier, large.tier);
        assert_eq!(small.label, "Trusted Finder");
        assert!(small.icon_px < large.icon_px);
        assert_eq!("lg".parse::<BadgeSize>(), Ok(BadgeSize::Large));
        assert!("huge".parse::<BadgeSize>().is_err());
    }
}
