//! Qi accumulation and stage breakthroughs.
//!
//! Stage changes happen only through [`attempt_breakthrough`]. Passive Qi
//! gain never moves the player up the ladder on its own.
use serde::{Deserialize, Serialize};

use crate::config::ProgressionCfg;
use crate::rng::RandomSource;
use crate::sect;
use crate::stages::{self, STAGES};
use crate::state::{PlayerState, SkillId};

/// Applied Qi gain and whether it asked for a random event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QiGain {
    pub amount: f64,
    pub event_requested: bool,
}

/// Add `base × qi_multiplier` Qi, optionally rolling for a random event.
pub fn gain_qi(
    state: &mut PlayerState,
    rng: &mut dyn RandomSource,
    cfg: &ProgressionCfg,
    base: f64,
    trigger_random_event: bool,
) -> QiGain {
    let amount = (base * state.qi_multiplier).max(0.0);
    state.add_qi(amount);
    let event_requested = trigger_random_event && rng.chance(cfg.gain_event_chance);
    QiGain {
        amount,
        event_requested,
    }
}

/// Read-only view of where the player stands on the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageStatus {
    pub current: usize,
    pub next: Option<usize>,
    /// Fraction of the way from the current threshold to the next, in `[0, 1]`.
    pub progress: f64,
    /// Next stage exists and the breakthrough requirement holds.
    pub ready: bool,
}

#[must_use]
pub fn check_stage_advance(state: &PlayerState) -> StageStatus {
    let current = state.current_stage.min(stages::LAST_STAGE);
    let next = stages::next_stage_index(current);
    let Some(next_index) = next else {
        return StageStatus {
            current,
            next: None,
            progress: 1.0,
            ready: false,
        };
    };

    let floor = STAGES[current].qi_threshold;
    let ceiling = STAGES[next_index].qi_threshold;
    let span = ceiling - floor;
    let progress = if span > 0.0 {
        ((state.qi - floor) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };

    StageStatus {
        current,
        next,
        progress,
        ready: STAGES[current].breakthrough.is_met(state),
    }
}

/// Result of a breakthrough attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Breakthrough {
    /// Already at the final stage.
    AtPeak,
    /// Requirement not met; nothing changed.
    NotReady { hint: &'static str },
    Advanced {
        from: usize,
        to: usize,
        unlocked_skill: Option<SkillId>,
        founded_sect: Option<String>,
    },
    Failed { qi_lost: f64 },
}

impl Breakthrough {
    #[must_use]
    pub const fn mutated(&self) -> bool {
        matches!(self, Self::Advanced { .. } | Self::Failed { .. })
    }
}

/// Try to advance exactly one stage.
pub fn attempt_breakthrough(
    state: &mut PlayerState,
    rng: &mut dyn RandomSource,
    cfg: &ProgressionCfg,
) -> Breakthrough {
    let current = state.current_stage.min(stages::LAST_STAGE);
    let Some(target) = stages::next_stage_index(current) else {
        return Breakthrough::AtPeak;
    };
    let definition = &STAGES[current];
    if !definition.breakthrough.is_met(state) {
        return Breakthrough::NotReady {
            hint: definition.breakthrough_hint,
        };
    }

    let chance = (cfg.breakthrough_base_chance * state.breakthrough_bonus)
        .min(cfg.breakthrough_max_chance);
    let draw = rng.roll();
    log::debug!("breakthrough {current}->{target}: draw {draw:.4} vs chance {chance:.4}");

    if draw < chance {
        state.current_stage = target;
        let unlocked_skill = (target >= cfg.core_manifestation_stage
            && state.unlock_skill(SkillId::CoreManifestation))
        .then_some(SkillId::CoreManifestation);
        let founded_sect = if target >= cfg.sect_founding_stage {
            sect::establish(state)
        } else {
            None
        };
        log::info!("advanced to {}", STAGES[target].name);
        Breakthrough::Advanced {
            from: current,
            to: target,
            unlocked_skill,
            founded_sect,
        }
    } else {
        let resist = state.tribulation_resist.clamp(0.0, 1.0);
        let loss = (state.qi * cfg.failure_loss_fraction * (1.0 - resist)).floor();
        let qi_lost = state.lose_qi(loss);
        Breakthrough::Failed { qi_lost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedRolls;

    fn cfg() -> ProgressionCfg {
        ProgressionCfg::default()
    }

    #[test]
    fn gain_scales_by_multiplier() {
        let mut state = PlayerState {
            qi_multiplier: 1.5,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.99);
        let gain = gain_qi(&mut state, &mut rng, &cfg(), 10.0, true);
        assert!((gain.amount - 15.0).abs() <= f64::EPSILON);
        assert!((state.qi - 15.0).abs() <= f64::EPSILON);
        assert!(!gain.event_requested);
    }

    #[test]
    fn gain_without_trigger_never_draws() {
        let mut state = PlayerState::default();
        let mut rng = FixedRolls::constant(0.0);
        let gain = gain_qi(&mut state, &mut rng, &cfg(), 1.0, false);
        assert!(!gain.event_requested);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn low_draw_requests_event() {
        let mut state = PlayerState::default();
        let mut rng = FixedRolls::constant(0.05);
        assert!(gain_qi(&mut state, &mut rng, &cfg(), 1.0, true).event_requested);
    }

    #[test]
    fn passive_gain_never_changes_stage() {
        let mut state = PlayerState::default();
        let mut rng = FixedRolls::constant(0.5);
        gain_qi(&mut state, &mut rng, &cfg(), 600.0, false);
        assert_eq!(state.current_stage, 0);
        let status = check_stage_advance(&state);
        assert!(status.ready);
        assert_eq!(status.next, Some(1));
    }

    #[test]
    fn status_reports_progress_fraction() {
        let state = PlayerState {
            qi: 300.0,
            current_stage: 1,
            ..PlayerState::default()
        };
        let status = check_stage_advance(&state);
        assert!((status.progress - 0.5).abs() <= f64::EPSILON);
        assert!(!status.ready);
    }

    #[test]
    fn success_advances_one_stage() {
        let mut state = PlayerState {
            qi: 600.0,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.69);
        let result = attempt_breakthrough(&mut state, &mut rng, &cfg());
        assert!(matches!(result, Breakthrough::Advanced { from: 0, to: 1, .. }));
        assert_eq!(state.current_stage, 1);
        assert!((state.qi - 600.0).abs() <= f64::EPSILON);
    }

    #[test]
    fn failure_costs_thirty_percent() {
        let mut state = PlayerState {
            qi: 600.0,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.71);
        let result = attempt_breakthrough(&mut state, &mut rng, &cfg());
        assert_eq!(result, Breakthrough::Failed { qi_lost: 180.0 });
        assert!((state.qi - 420.0).abs() <= f64::EPSILON);
        assert_eq!(state.current_stage, 0);
    }

    #[test]
    fn resist_softens_failure() {
        let mut state = PlayerState {
            qi: 1_000.0,
            tribulation_resist: 0.5,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.9);
        let result = attempt_breakthrough(&mut state, &mut rng, &cfg());
        assert_eq!(result, Breakthrough::Failed { qi_lost: 150.0 });
    }

    #[test]
    fn unmet_requirement_is_rejected_without_draw() {
        let mut state = PlayerState {
            qi: 50.0,
            ..PlayerState::default()
        };
        let before = state.clone();
        let mut rng = FixedRolls::constant(0.0);
        let result = attempt_breakthrough(&mut state, &mut rng, &cfg());
        assert!(matches!(result, Breakthrough::NotReady { .. }));
        assert!(!result.mutated());
        assert_eq!(state, before);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn peak_stage_is_rejected() {
        let mut state = PlayerState {
            qi: 1.0e9,
            current_stage: stages::LAST_STAGE,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.0);
        assert_eq!(
            attempt_breakthrough(&mut state, &mut rng, &cfg()),
            Breakthrough::AtPeak
        );
    }

    #[test]
    fn reaching_foundation_founds_sect_and_core_unlocks_skill() {
        let mut state = PlayerState {
            qi: 2_500.0,
            spirit: 3.0,
            current_stage: 1,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.0);
        let result = attempt_breakthrough(&mut state, &mut rng, &cfg());
        assert!(matches!(
            result,
            Breakthrough::Advanced { founded_sect: Some(_), unlocked_skill: None, .. }
        ));
        assert!(state.sect_established());

        state.body = 5.0;
        let result = attempt_breakthrough(&mut state, &mut rng, &cfg());
        assert!(matches!(
            result,
            Breakthrough::Advanced {
                to: 3,
                founded_sect: None,
                unlocked_skill: Some(SkillId::CoreManifestation),
                ..
            }
        ));
        assert!(state.has_skill(SkillId::CoreManifestation));
    }

    #[test]
    fn chance_is_capped() {
        let mut state = PlayerState {
            qi: 200.0,
            breakthrough_bonus: 10.0,
            ..PlayerState::default()
        };
        let mut rng = FixedRolls::constant(0.96);
        assert!(matches!(
            attempt_breakthrough(&mut state, &mut rng, &cfg()),
            Breakthrough::Failed { .. }
        ));
    }
}
