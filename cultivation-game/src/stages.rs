//! The cultivation ladder.
//!
//! Stages are static data. Each stage carries the Qi threshold that places a
//! cultivator in it and the [`Requirement`] that must hold before a
//! breakthrough out of it into the next stage may be attempted.
use serde::{Deserialize, Serialize};

use crate::state::PlayerState;

/// Conjunctive attribute gate. Absent bounds are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub min_qi: Option<f64>,
    #[serde(default)]
    pub min_spirit: Option<f64>,
    #[serde(default)]
    pub min_body: Option<f64>,
    #[serde(default)]
    pub min_fate: Option<f64>,
    #[serde(default)]
    pub min_karma: Option<f64>,
    #[serde(default)]
    pub min_rebirths: Option<u32>,
    #[serde(default)]
    pub min_insights: Option<usize>,
}

impl Requirement {
    const fn qi(min_qi: f64) -> Self {
        Self {
            min_qi: Some(min_qi),
            min_spirit: None,
            min_body: None,
            min_fate: None,
            min_karma: None,
            min_rebirths: None,
            min_insights: None,
        }
    }

    /// Whether every configured bound holds for the given state.
    #[must_use]
    pub fn is_met(&self, state: &PlayerState) -> bool {
        fn at_least(value: f64, bound: Option<f64>) -> bool {
            bound.is_none_or(|min| value >= min)
        }

        at_least(state.qi, self.min_qi)
            && at_least(state.spirit, self.min_spirit)
            && at_least(state.body, self.min_body)
            && at_least(state.fate, self.min_fate)
            && at_least(state.karma, self.min_karma)
            && self.min_rebirths.is_none_or(|min| state.rebirths >= min)
            && self
                .min_insights
                .is_none_or(|min| state.dao_insights.len() >= min)
    }

    /// Whether the requirement gates on anything besides Qi.
    #[must_use]
    pub const fn has_attribute_gate(&self) -> bool {
        self.min_spirit.is_some()
            || self.min_body.is_some()
            || self.min_fate.is_some()
            || self.min_karma.is_some()
            || self.min_rebirths.is_some()
            || self.min_insights.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub qi_threshold: f64,
    /// Gate for advancing out of this stage.
    pub breakthrough: Requirement,
    pub breakthrough_hint: &'static str,
}

pub const STAGES: [StageDefinition; 8] = [
    StageDefinition {
        name: "Mortal",
        description: "An ordinary mortal with no cultivation",
        qi_threshold: 0.0,
        breakthrough: Requirement::qi(100.0),
        breakthrough_hint: "Sense the flow of Qi in your surroundings",
    },
    StageDefinition {
        name: "Qi Refining",
        description: "Begin refining your body and absorbing Qi",
        qi_threshold: 100.0,
        breakthrough: Requirement {
            min_spirit: Some(3.0),
            ..Requirement::qi(500.0)
        },
        breakthrough_hint: "Establish your foundation in cultivation",
    },
    StageDefinition {
        name: "Foundation Establishment",
        description: "Solidify your cultivation base",
        qi_threshold: 500.0,
        breakthrough: Requirement {
            min_body: Some(5.0),
            ..Requirement::qi(2_000.0)
        },
        breakthrough_hint: "Form your golden core",
    },
    StageDefinition {
        name: "Core Formation",
        description: "Your golden core takes shape",
        qi_threshold: 2_000.0,
        breakthrough: Requirement {
            min_spirit: Some(10.0),
            ..Requirement::qi(5_000.0)
        },
        breakthrough_hint: "Nurture your nascent soul",
    },
    StageDefinition {
        name: "Nascent Soul",
        description: "Your soul begins its immortal journey",
        qi_threshold: 5_000.0,
        breakthrough: Requirement {
            min_fate: Some(3.0),
            ..Requirement::qi(10_000.0)
        },
        breakthrough_hint: "Face the heavenly tribulation",
    },
    StageDefinition {
        name: "Soul Transformation",
        description: "Your soul undergoes metamorphosis",
        qi_threshold: 10_000.0,
        breakthrough: Requirement {
            min_karma: Some(5.0),
            ..Requirement::qi(50_000.0)
        },
        breakthrough_hint: "Ascend to immortality",
    },
    StageDefinition {
        name: "Immortal Ascension",
        description: "You become an immortal being",
        qi_threshold: 50_000.0,
        breakthrough: Requirement {
            min_rebirths: Some(1),
            ..Requirement::qi(250_000.0)
        },
        breakthrough_hint: "Comprehend the void",
    },
    StageDefinition {
        name: "Void Sovereign",
        description: "Master of cosmic emptiness",
        qi_threshold: 250_000.0,
        breakthrough: Requirement {
            min_insights: Some(10),
            ..Requirement::qi(500_000.0)
        },
        breakthrough_hint: "Merge with the eternal Dao",
    },
];

/// Index of the final stage.
pub const LAST_STAGE: usize = STAGES.len() - 1;

/// Stage name, falling back to the final stage for out-of-range indices.
#[must_use]
pub fn stage_name(index: usize) -> &'static str {
    STAGES[index.min(LAST_STAGE)].name
}

#[must_use]
pub const fn next_stage_index(current: usize) -> Option<usize> {
    if current < LAST_STAGE {
        Some(current + 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_strictly_increase_from_zero() {
        assert!(STAGES[0].qi_threshold.abs() <= f64::EPSILON);
        for pair in STAGES.windows(2) {
            assert!(
                pair[0].qi_threshold < pair[1].qi_threshold,
                "{} !< {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn first_stage_gate_is_qi_only() {
        assert!(!STAGES[0].breakthrough.has_attribute_gate());
        assert!(STAGES[1].breakthrough.has_attribute_gate());
    }

    #[test]
    fn leave_requirement_matches_next_threshold() {
        for index in 0..LAST_STAGE {
            let gate = STAGES[index].breakthrough.min_qi.expect("qi gate");
            assert!((gate - STAGES[index + 1].qi_threshold).abs() <= f64::EPSILON);
        }
    }

    #[test]
    fn requirement_checks_every_bound() {
        let mut state = PlayerState::default();
        state.qi = 600.0;
        assert!(!STAGES[1].breakthrough.is_met(&state));
        state.spirit = 3.0;
        assert!(STAGES[1].breakthrough.is_met(&state));

        state.qi = 300_000.0;
        assert!(!STAGES[6].breakthrough.is_met(&state));
        state.rebirths = 1;
        assert!(STAGES[6].breakthrough.is_met(&state));
    }

    #[test]
    fn next_stage_stops_at_the_top() {
        assert_eq!(next_stage_index(0), Some(1));
        assert_eq!(next_stage_index(LAST_STAGE), None);
        assert_eq!(stage_name(99), "Void Sovereign");
    }
}
