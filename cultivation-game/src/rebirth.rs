//! Prestige reset.
use crate::config::RebirthCfg;
use crate::outcome::ActionOutcome;
use crate::stages;
use crate::state::PlayerState;

/// Seeds and bonuses carried into the next life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebirthSummary {
    pub rebirths: u32,
    pub qi: f64,
    pub spirit_stones: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rebirth {
    Unconfirmed,
    TooEarly { required: &'static str },
    Reborn(RebirthSummary),
}

impl Rebirth {
    #[must_use]
    pub fn outcome(&self) -> ActionOutcome {
        match self {
            Self::Unconfirmed => ActionOutcome::declined("Rebirth cancelled"),
            Self::TooEarly { required } => {
                ActionOutcome::rejected(format!("You must reach {required} to be reborn"))
            }
            Self::Reborn(summary) => ActionOutcome::success(format!(
                "You have been reborn! Rebirth #{} begins with {:.0} Qi and {} Spirit Stones",
                summary.rebirths, summary.qi, summary.spirit_stones
            )),
        }
    }
}

/// Replace the state with a fresh life seeded from the old one.
pub fn attempt_rebirth(state: &mut PlayerState, cfg: &RebirthCfg, confirmed: bool) -> Rebirth {
    if state.current_stage < cfg.min_stage {
        return Rebirth::TooEarly {
            required: stages::stage_name(cfg.min_stage),
        };
    }
    if !confirmed {
        return Rebirth::Unconfirmed;
    }

    let old = std::mem::take(state);
    let rebirths = old.rebirths.saturating_add(1);
    let count = f64::from(rebirths);
    let bonus = old.rebirth_bonus;

    state.rebirths = rebirths;
    state.qi = ((cfg.qi_fraction * old.qi + cfg.qi_per_rebirth * count) * bonus).max(0.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let stones = ((cfg.stone_fraction * old.spirit_stones as f64 + cfg.stones_per_rebirth * count)
        * bonus)
        .floor()
        .max(0.0) as u64;
    state.spirit_stones = stones;
    state.last_save = old.last_save;

    if let Some(root) = old.root {
        state.root = Some(root);
        root.effect().apply(state);
    }
    if cfg.keep_insights {
        for insight in &old.dao_insights {
            insight.effect().apply(state);
        }
        state.dao_insights = old.dao_insights;
    }
    if cfg.keep_achievements {
        state.achievements = old.achievements;
    }
    if cfg.keep_skills {
        state.skills = old.skills;
    }
    state.tribulation_resist += cfg.resist_per_rebirth * count;
    state.fate += cfg.fate_per_rebirth * count;

    log::info!("rebirth #{rebirths}: {:.0} qi, {stones} stones", state.qi);
    Rebirth::Reborn(RebirthSummary {
        rebirths,
        qi: state.qi,
        spirit_stones: stones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementId;
    use crate::dao::InsightId;
    use crate::roots::SpiritualRoot;
    use crate::state::SkillId;

    fn ascended() -> PlayerState {
        let mut state = PlayerState {
            qi: 60_000.0,
            spirit_stones: 500,
            current_stage: 6,
            root: Some(SpiritualRoot::Fire),
            ..PlayerState::default()
        };
        state.dao_insights.insert(InsightId::Unity);
        state.achievements.insert(AchievementId::GoldenCore);
        state.unlock_skill(SkillId::CoreManifestation);
        state
    }

    #[test]
    fn below_ascension_is_rejected() {
        let mut state = PlayerState {
            current_stage: 5,
            qi: 1.0e6,
            ..PlayerState::default()
        };
        let before = state.clone();
        let result = attempt_rebirth(&mut state, &RebirthCfg::default(), true);
        assert_eq!(
            result,
            Rebirth::TooEarly {
                required: "Immortal Ascension"
            }
        );
        assert!(!result.outcome().ok);
        assert_eq!(state, before);
    }

    #[test]
    fn unconfirmed_changes_nothing() {
        let mut state = ascended();
        let before = state.clone();
        assert_eq!(
            attempt_rebirth(&mut state, &RebirthCfg::default(), false),
            Rebirth::Unconfirmed
        );
        assert_eq!(state, before);
    }

    #[test]
    fn first_rebirth_seeds_new_life() {
        let mut state = ascended();
        let result = attempt_rebirth(&mut state, &RebirthCfg::default(), true);
        assert!(result.outcome().ok);
        assert_eq!(state.rebirths, 1);
        assert_eq!(state.current_stage, 0);
        assert!((state.qi - 6_100.0).abs() <= 1e-9);
        assert_eq!(state.spirit_stones, 100);
        assert!((state.qi_multiplier - 1.2).abs() <= f64::EPSILON);
        assert!((state.tribulation_resist - 0.05).abs() <= f64::EPSILON);
        // base fate, unity insight, rebirth bonus
        assert!((state.fate - 2.0).abs() <= f64::EPSILON);
        assert!(state.has_insight(InsightId::Unity));
        assert!(state.achievements.contains(&AchievementId::GoldenCore));
        assert!(!state.has_skill(SkillId::CoreManifestation));
        assert!(state.sect.is_none());
    }

    #[test]
    fn carry_forward_policy_is_configurable() {
        let cfg = RebirthCfg {
            keep_achievements: false,
            keep_insights: false,
            keep_skills: true,
            ..RebirthCfg::default()
        };
        let mut state = ascended();
        attempt_rebirth(&mut state, &cfg, true);
        assert!(state.dao_insights.is_empty());
        assert!(state.achievements.is_empty());
        assert!(state.has_skill(SkillId::CoreManifestation));
        assert!((state.fate - 1.5).abs() <= f64::EPSILON);
    }

    #[test]
    fn rebirth_bonus_is_read_before_reset() {
        let mut state = ascended();
        state.rebirths = 1;
        state.rebirth_bonus = 1.2;
        attempt_rebirth(&mut state, &RebirthCfg::default(), true);
        assert_eq!(state.rebirths, 2);
        assert!((state.qi - (6_000.0 + 200.0) * 1.2).abs() <= 1e-6);
        assert_eq!(state.spirit_stones, 180);
        assert!((state.tribulation_resist - 0.1).abs() <= 1e-9);
    }
}
