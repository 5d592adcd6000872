//! Tunable rule parameters.
//!
//! Every section deserializes with defaults, so a config file only needs the
//! values it overrides.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants as k;

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a probability between 0 and 1 (got {value:.3})")]
    Probability { field: &'static str, value: f64 },
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("timer {field} must have a positive period")]
    ZeroPeriod { field: &'static str },
    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerCfg {
    pub idle_gain_ms: u64,
    pub general_event_ms: u64,
    pub general_event_cooldown_ms: u64,
    pub meditation_event_ms: u64,
    pub auto_comprehension_ms: u64,
    pub sect_production_ms: u64,
    pub autosave_ms: u64,
}

impl Default for TimerCfg {
    fn default() -> Self {
        Self {
            idle_gain_ms: k::IDLE_GAIN_PERIOD_MS,
            general_event_ms: k::GENERAL_EVENT_PERIOD_MS,
            general_event_cooldown_ms: k::GENERAL_EVENT_COOLDOWN_MS,
            meditation_event_ms: k::MEDITATION_EVENT_PERIOD_MS,
            auto_comprehension_ms: k::AUTO_COMPREHENSION_PERIOD_MS,
            sect_production_ms: k::SECT_PRODUCTION_PERIOD_MS,
            autosave_ms: k::AUTOSAVE_PERIOD_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionCfg {
    pub gather_base: f64,
    pub gain_event_chance: f64,
    pub breakthrough_base_chance: f64,
    pub breakthrough_max_chance: f64,
    pub failure_loss_fraction: f64,
    pub core_manifestation_stage: usize,
    pub sect_founding_stage: usize,
}

impl Default for ProgressionCfg {
    fn default() -> Self {
        Self {
            gather_base: k::GATHER_QI_BASE,
            gain_event_chance: k::GAIN_EVENT_CHANCE,
            breakthrough_base_chance: k::BREAKTHROUGH_BASE_CHANCE,
            breakthrough_max_chance: k::BREAKTHROUGH_MAX_CHANCE,
            failure_loss_fraction: k::BREAKTHROUGH_FAILURE_LOSS,
            core_manifestation_stage: k::CORE_MANIFESTATION_STAGE,
            sect_founding_stage: k::SECT_FOUNDING_STAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeditationCfg {
    pub tick_ms: u64,
    pub max_duration_ms: u64,
    pub tick_gain: f64,
    pub deviation_chance: f64,
    pub deviation_penalty: f64,
}

impl Default for MeditationCfg {
    fn default() -> Self {
        Self {
            tick_ms: k::MEDITATION_TICK_MS,
            max_duration_ms: k::MEDITATION_MAX_DURATION_MS,
            tick_gain: k::MEDITATION_TICK_GAIN,
            deviation_chance: k::DEVIATION_CHANCE,
            deviation_penalty: k::DEVIATION_QI_PENALTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaoCfg {
    pub cost: f64,
    pub base_chance: f64,
    pub spirit_bonus: f64,
    pub max_chance: f64,
    pub failure_spirit: f64,
    pub exhausted_spirit: f64,
    pub auto_chance: f64,
}

impl Default for DaoCfg {
    fn default() -> Self {
        Self {
            cost: k::COMPREHENSION_COST,
            base_chance: k::COMPREHENSION_BASE_CHANCE,
            spirit_bonus: k::COMPREHENSION_SPIRIT_BONUS,
            max_chance: k::COMPREHENSION_MAX_CHANCE,
            failure_spirit: k::COMPREHENSION_FAILURE_SPIRIT,
            exhausted_spirit: k::COMPREHENSION_EXHAUSTED_SPIRIT,
            auto_chance: k::AUTO_COMPREHENSION_CHANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventCfg {
    pub general_chance: f64,
    pub meditation_chance: f64,
    pub legendary_chance: f64,
}

impl Default for EventCfg {
    fn default() -> Self {
        Self {
            general_chance: k::GENERAL_EVENT_CHANCE,
            meditation_chance: k::MEDITATION_EVENT_CHANCE,
            legendary_chance: k::LEGENDARY_EVENT_CHANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectCfg {
    pub recruit_base_cost: u64,
    pub recruit_cost_per_disciple: u64,
    pub recruit_reputation: f64,
    pub train_qi_per_disciple: f64,
    pub train_reputation_per_disciple: f64,
    pub expand_cost: u64,
    pub expand_reputation: f64,
    pub technique_chance: f64,
    pub passive_reputation_rate: f64,
}

impl Default for SectCfg {
    fn default() -> Self {
        Self {
            recruit_base_cost: k::RECRUIT_BASE_COST,
            recruit_cost_per_disciple: k::RECRUIT_COST_PER_DISCIPLE,
            recruit_reputation: k::RECRUIT_REPUTATION,
            train_qi_per_disciple: k::TRAIN_QI_PER_DISCIPLE,
            train_reputation_per_disciple: k::TRAIN_REPUTATION_PER_DISCIPLE,
            expand_cost: k::EXPAND_COST,
            expand_reputation: k::EXPAND_REPUTATION,
            technique_chance: k::TECHNIQUE_DISCOVERY_CHANCE,
            passive_reputation_rate: k::PASSIVE_REPUTATION_RATE,
        }
    }
}

/// Rebirth seeds, permanent bonuses, and which collections survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebirthCfg {
    pub min_stage: usize,
    pub qi_fraction: f64,
    pub qi_per_rebirth: f64,
    pub stone_fraction: f64,
    pub stones_per_rebirth: f64,
    pub resist_per_rebirth: f64,
    pub fate_per_rebirth: f64,
    pub keep_achievements: bool,
    pub keep_insights: bool,
    pub keep_skills: bool,
}

impl Default for RebirthCfg {
    fn default() -> Self {
        Self {
            min_stage: k::REBIRTH_MIN_STAGE,
            qi_fraction: k::REBIRTH_QI_FRACTION,
            qi_per_rebirth: k::REBIRTH_QI_PER_REBIRTH,
            stone_fraction: k::REBIRTH_STONE_FRACTION,
            stones_per_rebirth: k::REBIRTH_STONES_PER_REBIRTH,
            resist_per_rebirth: k::REBIRTH_RESIST_PER_REBIRTH,
            fate_per_rebirth: k::REBIRTH_FATE_PER_REBIRTH,
            keep_achievements: true,
            keep_insights: true,
            keep_skills: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlchemyCfg {
    pub herbs_per_pill: f64,
    pub body_per_pill: f64,
}

impl Default for AlchemyCfg {
    fn default() -> Self {
        Self {
            herbs_per_pill: k::PILL_HERB_COST,
            body_per_pill: k::PILL_BODY_GAIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub timers: TimerCfg,
    pub progression: ProgressionCfg,
    pub meditation: MeditationCfg,
    pub dao: DaoCfg,
    pub events: EventCfg,
    pub sect: SectCfg,
    pub rebirth: RebirthCfg,
    pub alchemy: AlchemyCfg,
}

impl GameConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every range invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("progression.gain_event_chance", self.progression.gain_event_chance),
            ("progression.breakthrough_base_chance", self.progression.breakthrough_base_chance),
            ("progression.breakthrough_max_chance", self.progression.breakthrough_max_chance),
            ("progression.failure_loss_fraction", self.progression.failure_loss_fraction),
            ("meditation.deviation_chance", self.meditation.deviation_chance),
            ("dao.base_chance", self.dao.base_chance),
            ("dao.max_chance", self.dao.max_chance),
            ("dao.auto_chance", self.dao.auto_chance),
            ("events.general_chance", self.events.general_chance),
            ("events.meditation_chance", self.events.meditation_chance),
            ("events.legendary_chance", self.events.legendary_chance),
            ("sect.technique_chance", self.sect.technique_chance),
            ("rebirth.qi_fraction", self.rebirth.qi_fraction),
            ("rebirth.stone_fraction", self.rebirth.stone_fraction),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { field, value });
            }
        }

        let periods = [
            ("timers.idle_gain_ms", self.timers.idle_gain_ms),
            ("timers.general_event_ms", self.timers.general_event_ms),
            ("timers.meditation_event_ms", self.timers.meditation_event_ms),
            ("timers.auto_comprehension_ms", self.timers.auto_comprehension_ms),
            ("timers.sect_production_ms", self.timers.sect_production_ms),
            ("timers.autosave_ms", self.timers.autosave_ms),
            ("meditation.tick_ms", self.meditation.tick_ms),
            ("meditation.max_duration_ms", self.meditation.max_duration_ms),
        ];
        for (field, period) in periods {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { field });
            }
        }

        let minimums = [
            ("progression.gather_base", self.progression.gather_base),
            ("meditation.tick_gain", self.meditation.tick_gain),
            ("meditation.deviation_penalty", self.meditation.deviation_penalty),
            ("dao.cost", self.dao.cost),
            ("dao.spirit_bonus", self.dao.spirit_bonus),
            ("sect.recruit_reputation", self.sect.recruit_reputation),
            ("sect.train_qi_per_disciple", self.sect.train_qi_per_disciple),
            ("sect.expand_reputation", self.sect.expand_reputation),
            ("rebirth.qi_per_rebirth", self.rebirth.qi_per_rebirth),
            ("rebirth.stones_per_rebirth", self.rebirth.stones_per_rebirth),
            ("alchemy.body_per_pill", self.alchemy.body_per_pill),
        ];
        for (field, value) in minimums {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::MinViolation {
                    field,
                    min: 0.0,
                    value,
                });
            }
        }
        if self.alchemy.herbs_per_pill < 1.0 {
            return Err(ConfigError::MinViolation {
                field: "alchemy.herbs_per_pill",
                min: 1.0,
                value: self.alchemy.herbs_per_pill,
            });
        }
        Ok(())
    }
}
