//! Dao comprehension: costed, chance-based insight grants.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DaoCfg;
use crate::outcome::ActionOutcome;
use crate::rng::RandomSource;
use crate::roots::SpiritualRoot;
use crate::state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightId {
    WuWei,
    Unity,
    Cycle,
    Emptiness,
    Balance,
    /// Granted only by the Heavenly Revelation event.
    Revelation,
}

/// Gate an insight must pass before it can be comprehended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsightPrerequisite {
    MinSpirit(f64),
    MinStage(usize),
    MinRebirths(u32),
    MinQi(f64),
    RootIn(&'static [SpiritualRoot]),
    Never,
}

impl InsightPrerequisite {
    #[must_use]
    pub fn holds(self, state: &PlayerState) -> bool {
        match self {
            Self::MinSpirit(min) => state.spirit >= min,
            Self::MinStage(min) => state.current_stage >= min,
            Self::MinRebirths(min) => state.rebirths >= min,
            Self::MinQi(min) => state.qi >= min,
            Self::RootIn(roots) => state.root.is_some_and(|root| roots.contains(&root)),
            Self::Never => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsightEffect {
    MultiplyIdleGain(f64),
    AddFate(f64),
    SetRebirthBonus(f64),
    AddTribulationResist(f64),
    Harmony { qi_multiplier: f64 },
    /// Applied by the granting event instead.
    Inert,
}

impl InsightEffect {
    pub fn apply(self, state: &mut PlayerState) {
        match self {
            Self::MultiplyIdleGain(factor) => state.qi_idle_gain *= factor,
            Self::AddFate(amount) => state.fate += amount,
            Self::SetRebirthBonus(bonus) => state.rebirth_bonus = bonus,
            Self::AddTribulationResist(amount) => state.tribulation_resist += amount,
            Self::Harmony { qi_multiplier } => {
                state.qi_multiplier *= qi_multiplier;
                state.meditation_safety = true;
            }
            Self::Inert => {}
        }
    }
}

impl InsightId {
    /// Insights reachable through comprehension, in pool order.
    pub const POOL: [Self; 5] = [
        Self::WuWei,
        Self::Unity,
        Self::Cycle,
        Self::Emptiness,
        Self::Balance,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WuWei => "wu_wei",
            Self::Unity => "unity",
            Self::Cycle => "cycle",
            Self::Emptiness => "emptiness",
            Self::Balance => "balance",
            Self::Revelation => "revelation",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::WuWei => "The Principle of Wu Wei",
            Self::Unity => "Unity of Heaven and Man",
            Self::Cycle => "Cycle of Rebirth",
            Self::Emptiness => "The Virtue of Emptiness",
            Self::Balance => "Yin-Yang Balance",
            Self::Revelation => "Heavenly Revelation",
        }
    }

    /// Lore text shown when the insight is gained.
    #[must_use]
    pub const fn lore(self) -> &'static str {
        match self {
            Self::WuWei => "By non-action, all things are done. The sage cultivates without striving.",
            Self::Unity => "Heaven is eternal, Earth is lasting. The sage aligns with both.",
            Self::Cycle => "All things return to their root. Cultivation is the journey home.",
            Self::Emptiness => "The Dao is empty, yet infinitely useful. The sage embraces the void.",
            Self::Balance => "All things carry Yin and embrace Yang. The sage harmonizes these forces.",
            Self::Revelation => "The heavens part and speak directly to your soul.",
        }
    }

    #[must_use]
    pub const fn prerequisite(self) -> InsightPrerequisite {
        match self {
            Self::WuWei => InsightPrerequisite::MinSpirit(5.0),
            Self::Unity => InsightPrerequisite::MinStage(3),
            Self::Cycle => InsightPrerequisite::MinRebirths(1),
            Self::Emptiness => InsightPrerequisite::MinQi(10_000.0),
            Self::Balance => {
                InsightPrerequisite::RootIn(&[SpiritualRoot::Water, SpiritualRoot::Fire])
            }
            Self::Revelation => InsightPrerequisite::Never,
        }
    }

    #[must_use]
    pub const fn effect(self) -> InsightEffect {
        match self {
            Self::WuWei => InsightEffect::MultiplyIdleGain(1.1),
            Self::Unity => InsightEffect::AddFate(0.5),
            Self::Cycle => InsightEffect::SetRebirthBonus(1.2),
            Self::Emptiness => InsightEffect::AddTribulationResist(0.2),
            Self::Balance => InsightEffect::Harmony {
                qi_multiplier: 1.15,
            },
            Self::Revelation => InsightEffect::Inert,
        }
    }
}

impl fmt::Display for InsightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const KOANS: [&str; 5] = [
    "What was your original face before your parents were born?",
    "If you meet the Buddha on the road, kill him.",
    "The sound of one hand clapping.",
    "Not the wind, not the flag. Mind is moving.",
    "All things return to the One. What does the One return to?",
];

/// Insights the player could be granted right now.
#[must_use]
pub fn eligible_insights(state: &PlayerState) -> Vec<InsightId> {
    InsightId::POOL
        .into_iter()
        .filter(|id| !state.has_insight(*id) && id.prerequisite().holds(state))
        .collect()
}

/// How a comprehension attempt resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Comprehension {
    InsufficientQi { required: f64 },
    Gained(InsightId),
    NothingAvailable,
    Failed { koan: &'static str },
}

impl Comprehension {
    /// Player-facing outcome. Automatic attempts only surface gains.
    #[must_use]
    pub fn outcome(&self, automatic: bool) -> Option<ActionOutcome> {
        match self {
            Self::InsufficientQi { required } if !automatic => Some(ActionOutcome::rejected(format!(
                "You need at least {required:.0} Qi to comprehend the Dao"
            ))),
            Self::Gained(id) => Some(ActionOutcome::success(format!(
                "New Dao Insight: {}",
                id.title()
            ))),
            Self::NothingAvailable if !automatic => Some(ActionOutcome::info(
                "You've comprehended all currently available Dao insights",
            )),
            Self::Failed { koan } if !automatic => Some(ActionOutcome::info(format!(
                "Comprehension failed. Meditate on this: \"{koan}\""
            ))),
            _ => None,
        }
    }
}

/// Spend Qi on a comprehension attempt.
///
/// The cost is paid once the Qi precondition passes, whatever the outcome.
pub fn attempt_comprehension(
    state: &mut PlayerState,
    rng: &mut dyn RandomSource,
    cfg: &DaoCfg,
) -> Comprehension {
    if state.qi < cfg.cost {
        return Comprehension::InsufficientQi { required: cfg.cost };
    }
    state.lose_qi(cfg.cost);

    let chance = (cfg.base_chance + state.spirit * cfg.spirit_bonus).min(cfg.max_chance);
    if !rng.chance(chance) {
        state.spirit += cfg.failure_spirit;
        let koan = KOANS[rng.pick(KOANS.len())];
        return Comprehension::Failed { koan };
    }

    let eligible = eligible_insights(state);
    if eligible.is_empty() {
        state.spirit += cfg.exhausted_spirit;
        return Comprehension::NothingAvailable;
    }
    let insight = eligible[rng.pick(eligible.len())];
    state.dao_insights.insert(insight);
    insight.effect().apply(state);
    log::debug!("insight gained: {insight}");
    Comprehension::Gained(insight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedRolls;

    #[test]
    fn below_cost_is_rejected_without_mutation() {
        let mut state = PlayerState {
            qi: 499.0,
            ..PlayerState::default()
        };
        let before = state.clone();
        let mut rng = FixedRolls::constant(0.0);
        let result = attempt_comprehension(&mut state, &mut rng, &DaoCfg::default());
        assert_eq!(result, Comprehension::InsufficientQi { required: 500.0 });
        assert_eq!(state, before);
    }

    #[test]
    fn failure_still_costs_and_grows_spirit() {
        let mut state = PlayerState {
            qi: 800.0,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.99);
        let result = attempt_comprehension(&mut state, &mut rng, &DaoCfg::default());
        assert!(matches!(result, Comprehension::Failed { .. }));
        assert!((state.qi - 300.0).abs() <= f64::EPSILON);
        assert!((state.spirit - 1.1).abs() <= 1e-9);
        assert!(result.outcome(true).is_none());
        assert!(result.outcome(false).is_some_and(|o| o.ok));
    }

    #[test]
    fn nothing_eligible_grants_consolation() {
        let mut state = PlayerState {
            qi: 600.0,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.0);
        let result = attempt_comprehension(&mut state, &mut rng, &DaoCfg::default());
        assert_eq!(result, Comprehension::NothingAvailable);
        assert!((state.spirit - 1.2).abs() <= 1e-9);
        assert!(state.dao_insights.is_empty());
    }

    #[test]
    fn success_grants_eligible_insight_once() {
        let mut state = PlayerState {
            qi: 1_200.0,
            spirit: 6.0,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.0);
        let cfg = DaoCfg::default();
        assert_eq!(
            attempt_comprehension(&mut state, &mut rng, &cfg),
            Comprehension::Gained(InsightId::WuWei)
        );
        assert!((state.qi_idle_gain - 0.11).abs() <= 1e-9);
        assert_eq!(
            attempt_comprehension(&mut state, &mut rng, &cfg),
            Comprehension::NothingAvailable
        );
        assert_eq!(state.dao_insights.len(), 1);
    }

    #[test]
    fn balance_requires_water_or_fire_root() {
        let mut state = PlayerState::default();
        assert!(!InsightId::Balance.prerequisite().holds(&state));
        state.root = Some(SpiritualRoot::Fire);
        assert!(InsightId::Balance.prerequisite().holds(&state));
        state.root = Some(SpiritualRoot::Metal);
        assert!(!InsightId::Balance.prerequisite().holds(&state));
        assert!(!InsightId::Revelation.prerequisite().holds(&state));
    }

    #[test]
    fn chance_grows_with_spirit_up_to_cap() {
        let cfg = DaoCfg::default();
        let sage = PlayerState {
            qi: 500.0,
            spirit: 100.0,
            ..PlayerState::default()
        };

        let mut state = sage.clone();
        let result = attempt_comprehension(&mut state, &mut FixedRolls::constant(0.89), &cfg);
        assert_eq!(result, Comprehension::Gained(InsightId::WuWei));

        let mut state = sage;
        let result = attempt_comprehension(&mut state, &mut FixedRolls::constant(0.9), &cfg);
        assert!(matches!(result, Comprehension::Failed { .. }));
    }
}
