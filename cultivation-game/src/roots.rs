//! Spiritual roots chosen once at the start of a cultivation path.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiritualRoot {
    Fire,
    Water,
    Wood,
    Earth,
    Metal,
}

/// Modifier applied to the player when a root is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootEffect {
    MultiplyQi(f64),
    MeditationSafety,
    SpiritGrowth(f64),
    TribulationResist(f64),
    BreakthroughBonus(f64),
}

impl SpiritualRoot {
    pub const ALL: [Self; 5] = [Self::Fire, Self::Water, Self::Wood, Self::Earth, Self::Metal];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Wood => "wood",
            Self::Earth => "earth",
            Self::Metal => "metal",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Fire => "Fire",
            Self::Water => "Water",
            Self::Wood => "Wood",
            Self::Earth => "Earth",
            Self::Metal => "Metal",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Fire => "Fire Spiritual Root",
            Self::Water => "Water Spiritual Root",
            Self::Wood => "Wood Spiritual Root",
            Self::Earth => "Earth Spiritual Root",
            Self::Metal => "Metal Spiritual Root",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Fire => "Enhanced Qi absorption through yang energy",
            Self::Water => "Calm mind prevents cultivation deviation",
            Self::Wood => "Natural connection enhances spirit growth",
            Self::Earth => "Steady progress resists tribulation damage",
            Self::Metal => "Strong foundations improve breakthroughs",
        }
    }

    #[must_use]
    pub const fn effect(self) -> RootEffect {
        match self {
            Self::Fire => RootEffect::MultiplyQi(1.2),
            Self::Water => RootEffect::MeditationSafety,
            Self::Wood => RootEffect::SpiritGrowth(0.01),
            Self::Earth => RootEffect::TribulationResist(0.5),
            Self::Metal => RootEffect::BreakthroughBonus(1.2),
        }
    }

    /// Sect name derived from this root.
    #[must_use]
    pub fn sect_name(self) -> String {
        format!("{} Cloud Sect", self.title())
    }
}

impl RootEffect {
    pub fn apply(self, state: &mut PlayerState) {
        match self {
            Self::MultiplyQi(factor) => state.qi_multiplier *= factor,
            Self::MeditationSafety => state.meditation_safety = true,
            Self::SpiritGrowth(rate) => state.spirit_growth = rate,
            Self::TribulationResist(resist) => state.tribulation_resist = resist,
            Self::BreakthroughBonus(bonus) => state.breakthrough_bonus = bonus,
        }
    }
}

/// Sect name for an optional root.
#[must_use]
pub fn sect_name_for(root: Option<SpiritualRoot>) -> String {
    root.map_or_else(|| String::from("Lonely Cultivator"), SpiritualRoot::sect_name)
}

impl fmt::Display for SpiritualRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpiritualRoot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|root| root.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}
