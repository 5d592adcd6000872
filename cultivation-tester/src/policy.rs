use std::fmt;

use clap::ValueEnum;
use cultivation_game::{Action, GameSession, SpiritualRoot, sect};
use serde::Serialize;

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick the next command, or `None` to let the clock run.
    fn next_action(&mut self, session: &GameSession) -> Option<Action>;
}

/// Built-in strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Never act beyond breaking through when ready
    Idle,
    /// Meditate continuously and seek insight
    Meditator,
    /// Use every system the game offers
    Balanced,
}

impl Strategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Meditator => "Meditator",
            Self::Balanced => "Balanced",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Idle => Box::new(IdlePolicy),
            Self::Meditator => Box::new(MeditatorPolicy),
            Self::Balanced => Box::new(BalancedPolicy::new(seed)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct IdlePolicy;
struct MeditatorPolicy;

struct BalancedPolicy {
    root: SpiritualRoot,
    turn: u64,
}

impl BalancedPolicy {
    #[allow(clippy::cast_possible_truncation)]
    fn new(seed: u64) -> Self {
        let index = (seed % SpiritualRoot::ALL.len() as u64) as usize;
        Self {
            root: SpiritualRoot::ALL[index],
            turn: 0,
        }
    }
}

/// Cost of an attempt plus a buffer so insight never starves a breakthrough.
fn can_afford_insight(session: &GameSession) -> bool {
    let cost = session.config().dao.cost;
    session.state().qi >= cost * 3.0
}

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn next_action(&mut self, session: &GameSession) -> Option<Action> {
        session
            .stage_status()
            .ready
            .then_some(Action::AttemptBreakthrough)
    }
}

impl PlayerPolicy for MeditatorPolicy {
    fn name(&self) -> &'static str {
        "Meditator"
    }

    fn next_action(&mut self, session: &GameSession) -> Option<Action> {
        if session.stage_status().ready {
            return Some(Action::AttemptBreakthrough);
        }
        if !session.is_meditating() {
            return Some(Action::StartMeditation);
        }
        can_afford_insight(session).then_some(Action::AttemptComprehension)
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn next_action(&mut self, session: &GameSession) -> Option<Action> {
        self.turn = self.turn.wrapping_add(1);
        let state = session.state();
        let config = session.config();

        if state.root.is_none() {
            return Some(Action::SelectRoot { root: self.root });
        }
        if state.current_stage >= config.rebirth.min_stage {
            return Some(Action::AttemptRebirth { confirmed: true });
        }
        if session.stage_status().ready {
            return Some(Action::AttemptBreakthrough);
        }
        if state.herbs >= config.alchemy.herbs_per_pill {
            return Some(Action::RefinePill);
        }
        if state.pills > 0 {
            return Some(Action::ConsumePill);
        }
        if state.sect_established()
            && state.spirit_stones >= sect::recruit_cost(state.disciples(), &config.sect)
        {
            return Some(Action::RecruitDisciple);
        }
        if state.disciples() > 0 && self.turn % 5 == 0 {
            return Some(Action::TrainDisciples);
        }
        if !session.is_meditating() && self.turn % 3 == 0 {
            return Some(Action::StartMeditation);
        }
        if can_afford_insight(session) {
            return Some(Action::AttemptComprehension);
        }
        Some(Action::GatherQi)
    }
}
