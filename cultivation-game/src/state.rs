use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::achievements::AchievementId;
use crate::dao::InsightId;
use crate::roots::SpiritualRoot;
use crate::sect::{TechniqueId, UpgradeId};
use crate::stages::{self, StageDefinition};

/// Permanent skill flags unlocked by progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    CoreManifestation,
}

impl SkillId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CoreManifestation => "core_manifestation",
        }
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary progression track, created lazily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sect {
    pub name: String,
    pub disciples: u32,
    pub reputation: f64,
    pub techniques: BTreeSet<TechniqueId>,
    pub upgrades: BTreeSet<UpgradeId>,
    pub training_efficiency: f64,
    pub herb_production: f64,
    pub reputation_growth: f64,
    pub qi_bonus: f64,
    pub research_speed: f64,
}

impl Default for Sect {
    fn default() -> Self {
        Self::named(String::from("Lonely Cultivator"))
    }
}

impl Sect {
    #[must_use]
    pub fn named(name: String) -> Self {
        Self {
            name,
            disciples: 0,
            reputation: 0.0,
            techniques: BTreeSet::new(),
            upgrades: BTreeSet::new(),
            training_efficiency: 1.0,
            herb_production: 0.0,
            reputation_growth: 0.0,
            qi_bonus: 1.0,
            research_speed: 1.0,
        }
    }
}

/// Every player-visible numeric and boolean progress value.
///
/// Missing fields in a stored snapshot fall back to the defaults below, so
/// older snapshots load into newer builds.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub qi: f64,
    pub spirit: f64,
    pub body: f64,
    pub fate: f64,
    pub karma: f64,
    pub spirit_stones: u64,
    pub herbs: f64,
    pub pills: u32,
    pub current_stage: usize,
    pub meditating: bool,

    pub qi_multiplier: f64,
    pub qi_idle_gain: f64,
    pub breakthrough_bonus: f64,
    pub tribulation_resist: f64,
    pub meditation_safety: bool,
    pub spirit_growth: f64,
    pub rebirth_bonus: f64,
    pub combat_power: f64,
    pub defense: f64,
    pub survival_chance: f64,
    pub qi_gain_bonus: f64,

    pub dao_insights: BTreeSet<InsightId>,
    pub skills: BTreeMap<SkillId, bool>,
    pub achievements: BTreeSet<AchievementId>,
    pub sect: Option<Sect>,
    pub rebirths: u32,
    pub root: Option<SpiritualRoot>,
    /// Unix seconds of the last successful save, stamped by the caller.
    pub last_save: Option<i64>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            qi: 0.0,
            spirit: 1.0,
            body: 1.0,
            fate: 1.0,
            karma: 0.0,
            spirit_stones: 0,
            herbs: 0.0,
            pills: 0,
            current_stage: 0,
            meditating: false,
            qi_multiplier: 1.0,
            qi_idle_gain: 0.1,
            breakthrough_bonus: 1.0,
            tribulation_resist: 0.0,
            meditation_safety: false,
            spirit_growth: 0.0,
            rebirth_bonus: 1.0,
            combat_power: 1.0,
            defense: 1.0,
            survival_chance: 0.0,
            qi_gain_bonus: 1.0,
            dao_insights: BTreeSet::new(),
            skills: BTreeMap::new(),
            achievements: BTreeSet::new(),
            sect: None,
            rebirths: 0,
            root: None,
            last_save: None,
        }
    }
}

impl PlayerState {
    #[must_use]
    pub fn stage(&self) -> &'static StageDefinition {
        &stages::STAGES[self.current_stage.min(stages::LAST_STAGE)]
    }

    #[must_use]
    pub fn stage_name(&self) -> &'static str {
        stages::stage_name(self.current_stage)
    }

    /// Remove Qi, clamping at zero. Returns the amount actually removed.
    pub fn lose_qi(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || !amount.is_finite() {
            return 0.0;
        }
        let removed = amount.min(self.qi);
        self.qi = (self.qi - removed).max(0.0);
        removed
    }

    /// Add Qi; non-positive amounts are ignored.
    pub fn add_qi(&mut self, amount: f64) {
        if amount > 0.0 && amount.is_finite() {
            self.qi += amount;
        }
    }

    /// Spend stones if affordable. Returns false without mutating otherwise.
    pub fn spend_stones(&mut self, cost: u64) -> bool {
        if self.spirit_stones < cost {
            return false;
        }
        self.spirit_stones -= cost;
        true
    }

    #[must_use]
    pub fn has_insight(&self, id: InsightId) -> bool {
        self.dao_insights.contains(&id)
    }

    #[must_use]
    pub fn has_skill(&self, id: SkillId) -> bool {
        self.skills.get(&id).copied().unwrap_or(false)
    }

    pub fn unlock_skill(&mut self, id: SkillId) -> bool {
        let previously = self.skills.insert(id, true);
        previously != Some(true)
    }

    #[must_use]
    pub const fn sect_established(&self) -> bool {
        self.sect.is_some()
    }

    #[must_use]
    pub fn disciples(&self) -> u32 {
        self.sect.as_ref().map_or(0, |sect| sect.disciples)
    }

    /// Clear activity flags that only make sense while timers are live.
    pub const fn settle_after_load(&mut self) {
        self.meditating = false;
    }

    /// Serialize the state as a flat JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
