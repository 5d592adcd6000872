//! Append-only achievement unlocks.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstBreath,
    FoundationLaid,
    GoldenCore,
    SectFounder,
    TenDisciples,
    Enlightened,
    Reborn,
    StoneHoarder,
}

impl AchievementId {
    /// Checked in this order after every step.
    pub const ALL: [Self; 8] = [
        Self::FirstBreath,
        Self::FoundationLaid,
        Self::GoldenCore,
        Self::SectFounder,
        Self::TenDisciples,
        Self::Enlightened,
        Self::Reborn,
        Self::StoneHoarder,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstBreath => "first_breath",
            Self::FoundationLaid => "foundation_laid",
            Self::GoldenCore => "golden_core",
            Self::SectFounder => "sect_founder",
            Self::TenDisciples => "ten_disciples",
            Self::Enlightened => "enlightened",
            Self::Reborn => "reborn",
            Self::StoneHoarder => "stone_hoarder",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::FirstBreath => "First Breath",
            Self::FoundationLaid => "Foundation Laid",
            Self::GoldenCore => "Golden Core",
            Self::SectFounder => "Sect Founder",
            Self::TenDisciples => "Ten Disciples",
            Self::Enlightened => "Enlightened",
            Self::Reborn => "Reborn",
            Self::StoneHoarder => "Stone Hoarder",
        }
    }

    #[must_use]
    pub fn is_earned(self, state: &PlayerState) -> bool {
        match self {
            Self::FirstBreath => state.qi >= 100.0,
            Self::FoundationLaid => state.current_stage >= 2,
            Self::GoldenCore => state.current_stage >= 3,
            Self::SectFounder => state.sect_established(),
            Self::TenDisciples => state.disciples() >= 10,
            Self::Enlightened => state.dao_insights.len() >= 3,
            Self::Reborn => state.rebirths >= 1,
            Self::StoneHoarder => state.spirit_stones >= 1_000,
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record every newly earned achievement and return them in check order.
pub fn check(state: &mut PlayerState) -> Vec<AchievementId> {
    let mut unlocked = Vec::new();
    for id in AchievementId::ALL {
        if !state.achievements.contains(&id) && id.is_earned(state) {
            state.achievements.insert(id);
            unlocked.push(id);
        }
    }
    unlocked
}
