//! Centralized balance and tuning constants for the cultivation engine.
//!
//! These values are the defaults behind [`crate::config::GameConfig`]. A
//! loaded configuration may override any of them; the engine itself never
//! reads them directly outside of the config defaults.

// Timer periods (logical milliseconds) -------------------------------------
pub(crate) const IDLE_GAIN_PERIOD_MS: u64 = 2_000;
pub(crate) const GENERAL_EVENT_PERIOD_MS: u64 = 30_000;
pub(crate) const GENERAL_EVENT_COOLDOWN_MS: u64 = 60_000;
pub(crate) const MEDITATION_EVENT_PERIOD_MS: u64 = 15_000;
pub(crate) const AUTO_COMPREHENSION_PERIOD_MS: u64 = 30_000;
pub(crate) const SECT_PRODUCTION_PERIOD_MS: u64 = 10_000;
pub(crate) const AUTOSAVE_PERIOD_MS: u64 = 30_000;
pub(crate) const MEDITATION_TICK_MS: u64 = 1_000;
pub(crate) const MEDITATION_MAX_DURATION_MS: u64 = 30_000;

// Progression --------------------------------------------------------------
pub(crate) const GATHER_QI_BASE: f64 = 1.0;
pub(crate) const GAIN_EVENT_CHANCE: f64 = 0.10;
pub(crate) const BREAKTHROUGH_BASE_CHANCE: f64 = 0.7;
pub(crate) const BREAKTHROUGH_MAX_CHANCE: f64 = 0.95;
pub(crate) const BREAKTHROUGH_FAILURE_LOSS: f64 = 0.3;
pub(crate) const CORE_MANIFESTATION_STAGE: usize = 3;
pub(crate) const SECT_FOUNDING_STAGE: usize = 2;

// Meditation ---------------------------------------------------------------
pub(crate) const MEDITATION_TICK_GAIN: f64 = 2.0;
pub(crate) const DEVIATION_CHANCE: f64 = 0.01;
pub(crate) const DEVIATION_QI_PENALTY: f64 = 100.0;

// Dao comprehension --------------------------------------------------------
pub(crate) const COMPREHENSION_COST: f64 = 500.0;
pub(crate) const COMPREHENSION_BASE_CHANCE: f64 = 0.3;
pub(crate) const COMPREHENSION_SPIRIT_BONUS: f64 = 0.05;
pub(crate) const COMPREHENSION_MAX_CHANCE: f64 = 0.9;
pub(crate) const COMPREHENSION_FAILURE_SPIRIT: f64 = 0.1;
pub(crate) const COMPREHENSION_EXHAUSTED_SPIRIT: f64 = 0.2;
pub(crate) const AUTO_COMPREHENSION_CHANCE: f64 = 0.01;

// Events -------------------------------------------------------------------
pub(crate) const GENERAL_EVENT_CHANCE: f64 = 0.15;
pub(crate) const MEDITATION_EVENT_CHANCE: f64 = 0.10;
pub(crate) const LEGENDARY_EVENT_CHANCE: f64 = 0.05;

// Sect ---------------------------------------------------------------------
pub(crate) const RECRUIT_BASE_COST: u64 = 10;
pub(crate) const RECRUIT_COST_PER_DISCIPLE: u64 = 5;
pub(crate) const RECRUIT_REPUTATION: f64 = 2.0;
pub(crate) const TRAIN_QI_PER_DISCIPLE: f64 = 0.5;
pub(crate) const TRAIN_REPUTATION_PER_DISCIPLE: f64 = 0.1;
pub(crate) const EXPAND_COST: u64 = 100;
pub(crate) const EXPAND_REPUTATION: f64 = 10.0;
pub(crate) const TECHNIQUE_DISCOVERY_CHANCE: f64 = 0.3;
pub(crate) const PASSIVE_REPUTATION_RATE: f64 = 0.01;

// Rebirth ------------------------------------------------------------------
pub(crate) const REBIRTH_MIN_STAGE: usize = 6;
pub(crate) const REBIRTH_QI_FRACTION: f64 = 0.1;
pub(crate) const REBIRTH_QI_PER_REBIRTH: f64 = 100.0;
pub(crate) const REBIRTH_STONE_FRACTION: f64 = 0.1;
pub(crate) const REBIRTH_STONES_PER_REBIRTH: f64 = 50.0;
pub(crate) const REBIRTH_RESIST_PER_REBIRTH: f64 = 0.05;
pub(crate) const REBIRTH_FATE_PER_REBIRTH: f64 = 0.5;

// Alchemy ------------------------------------------------------------------
pub(crate) const PILL_HERB_COST: f64 = 3.0;
pub(crate) const PILL_BODY_GAIN: f64 = 0.5;
