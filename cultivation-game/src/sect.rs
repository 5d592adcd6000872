//! Sect management: founding, disciples, techniques, and upgrades.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SectCfg;
use crate::outcome::ActionOutcome;
use crate::rng::RandomSource;
use crate::roots::sect_name_for;
use crate::state::{PlayerState, Sect};

/// Martial techniques, in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueId {
    HeavenlySwordArt,
    PhoenixRebirthMethod,
    DragonSubduingPalm,
    TurtleShellDefense,
    FiveElementsCycle,
}

/// Player modifier granted by a technique.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TechniqueEffect {
    MultiplyCombatPower(f64),
    SetSurvivalChance(f64),
    MultiplyQiGainBonus(f64),
    MultiplyDefense(f64),
    ElementalCycle { qi_multiplier: f64, spirit_growth: f64 },
}

impl TechniqueId {
    pub const ALL: [Self; 5] = [
        Self::HeavenlySwordArt,
        Self::PhoenixRebirthMethod,
        Self::DragonSubduingPalm,
        Self::TurtleShellDefense,
        Self::FiveElementsCycle,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HeavenlySwordArt => "Heavenly Sword Art",
            Self::PhoenixRebirthMethod => "Phoenix Rebirth Method",
            Self::DragonSubduingPalm => "Dragon Subduing Palm",
            Self::TurtleShellDefense => "Turtle Shell Defense",
            Self::FiveElementsCycle => "Five Elements Cycle",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::HeavenlySwordArt => "A sword technique that channels Qi through the blade",
            Self::PhoenixRebirthMethod => "Allows recovery from near-fatal injuries",
            Self::DragonSubduingPalm => "A palm technique that can crush boulders",
            Self::TurtleShellDefense => "An impenetrable defensive stance",
            Self::FiveElementsCycle => "A balanced technique harnessing all elements",
        }
    }

    #[must_use]
    pub const fn effect(self) -> TechniqueEffect {
        match self {
            Self::HeavenlySwordArt => TechniqueEffect::MultiplyCombatPower(1.5),
            Self::PhoenixRebirthMethod => TechniqueEffect::SetSurvivalChance(0.9),
            Self::DragonSubduingPalm => TechniqueEffect::MultiplyQiGainBonus(1.2),
            Self::TurtleShellDefense => TechniqueEffect::MultiplyDefense(2.0),
            Self::FiveElementsCycle => TechniqueEffect::ElementalCycle {
                qi_multiplier: 1.1,
                spirit_growth: 0.005,
            },
        }
    }
}

impl TechniqueEffect {
    pub fn apply(self, state: &mut PlayerState) {
        match self {
            Self::MultiplyCombatPower(factor) => state.combat_power *= factor,
            Self::SetSurvivalChance(chance) => state.survival_chance = chance,
            Self::MultiplyQiGainBonus(factor) => state.qi_gain_bonus *= factor,
            Self::MultiplyDefense(factor) => state.defense *= factor,
            Self::ElementalCycle {
                qi_multiplier,
                spirit_growth,
            } => {
                state.qi_multiplier *= qi_multiplier;
                state.spirit_growth += spirit_growth;
            }
        }
    }
}

/// One-time sect buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    TrainingGround,
    HerbalGarden,
    QiGathering,
    Library,
    GrandHall,
}

/// Sect modifier granted by an upgrade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeEffect {
    TrainingEfficiency(f64),
    HerbProduction(f64),
    QiBonus(f64),
    ResearchSpeed(f64),
    ReputationGrowth(f64),
}

impl UpgradeId {
    pub const ALL: [Self; 5] = [
        Self::TrainingGround,
        Self::HerbalGarden,
        Self::QiGathering,
        Self::Library,
        Self::GrandHall,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrainingGround => "training_ground",
            Self::HerbalGarden => "herbal_garden",
            Self::QiGathering => "qi_gathering",
            Self::Library => "library",
            Self::GrandHall => "grand_hall",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TrainingGround => "Basic Training Ground",
            Self::HerbalGarden => "Herbal Garden",
            Self::QiGathering => "Qi Gathering Formation",
            Self::Library => "Library Pavilion",
            Self::GrandHall => "Grand Hall",
        }
    }

    #[must_use]
    pub const fn cost(self) -> u64 {
        match self {
            Self::TrainingGround => 100,
            Self::HerbalGarden => 200,
            Self::QiGathering => 300,
            Self::Library => 400,
            Self::GrandHall => 500,
        }
    }

    #[must_use]
    pub const fn effect(self) -> UpgradeEffect {
        match self {
            Self::TrainingGround => UpgradeEffect::TrainingEfficiency(1.2),
            Self::HerbalGarden => UpgradeEffect::HerbProduction(0.1),
            Self::QiGathering => UpgradeEffect::QiBonus(1.1),
            Self::Library => UpgradeEffect::ResearchSpeed(1.3),
            Self::GrandHall => UpgradeEffect::ReputationGrowth(1.5),
        }
    }
}

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UpgradeId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

impl UpgradeEffect {
    pub const fn apply(self, sect: &mut Sect) {
        match self {
            Self::TrainingEfficiency(value) => sect.training_efficiency = value,
            Self::HerbProduction(value) => sect.herb_production = value,
            Self::QiBonus(value) => sect.qi_bonus = value,
            Self::ResearchSpeed(value) => sect.research_speed = value,
            Self::ReputationGrowth(value) => sect.reputation_growth = value,
        }
    }
}

/// Found the sect if it does not exist yet. Returns the new sect's name.
pub fn establish(state: &mut PlayerState) -> Option<String> {
    if state.sect.is_some() {
        return None;
    }
    let name = sect_name_for(state.root);
    log::info!("sect founded: {name}");
    state.sect = Some(Sect::named(name.clone()));
    Some(name)
}

fn founded(name: &str) -> ActionOutcome {
    ActionOutcome::success(format!("You have established the {name}!"))
}

#[must_use]
pub const fn recruit_cost(disciples: u32, cfg: &SectCfg) -> u64 {
    cfg.recruit_base_cost + cfg.recruit_cost_per_disciple * disciples as u64
}

pub fn recruit_disciple(state: &mut PlayerState, cfg: &SectCfg) -> ActionOutcome {
    if let Some(name) = establish(state) {
        return founded(&name);
    }
    let cost = recruit_cost(state.disciples(), cfg);
    if !state.spend_stones(cost) {
        return ActionOutcome::rejected(format!("Need {cost} Spirit Stones to recruit"));
    }
    let Some(sect) = state.sect.as_mut() else {
        return ActionOutcome::rejected("No sect to recruit into");
    };
    sect.disciples += 1;
    sect.reputation += cfg.recruit_reputation;
    ActionOutcome::success(format!(
        "New disciple joins your sect! (Total: {})",
        sect.disciples
    ))
}

pub fn train_disciples(state: &mut PlayerState, cfg: &SectCfg) -> ActionOutcome {
    let Some(sect) = state.sect.as_mut().filter(|sect| sect.disciples >= 1) else {
        return ActionOutcome::rejected("No disciples to train");
    };
    let disciples = f64::from(sect.disciples);
    let qi = disciples * cfg.train_qi_per_disciple * sect.training_efficiency;
    let reputation = disciples * cfg.train_reputation_per_disciple;
    sect.reputation += reputation;
    state.add_qi(qi);
    ActionOutcome::success(format!(
        "Disciples trained! Gained {qi:.1} Qi and {reputation:.1} reputation"
    ))
}

/// Spend stones to grow reputation, with a chance to discover a technique.
pub fn expand_sect(
    state: &mut PlayerState,
    rng: &mut dyn RandomSource,
    cfg: &SectCfg,
) -> ActionOutcome {
    if let Some(name) = establish(state) {
        return founded(&name);
    }
    if !state.spend_stones(cfg.expand_cost) {
        return ActionOutcome::rejected(format!(
            "Need {} Spirit Stones to expand",
            cfg.expand_cost
        ));
    }
    let Some(sect) = state.sect.as_mut() else {
        return ActionOutcome::rejected("No sect to expand");
    };
    sect.reputation += cfg.expand_reputation;
    let reputation = sect.reputation;

    let discovered = if rng.chance(cfg.technique_chance) {
        TechniqueId::ALL
            .into_iter()
            .find(|technique| !sect.techniques.contains(technique))
    } else {
        None
    };

    match discovered {
        Some(technique) => {
            sect.techniques.insert(technique);
            technique.effect().apply(state);
            ActionOutcome::success(format!(
                "Sect expanded! Discovered new technique: {}! Reputation is now {reputation:.1}",
                technique.name()
            ))
        }
        None => ActionOutcome::success(format!(
            "Sect expanded! Reputation increased to {reputation:.1}"
        )),
    }
}

pub fn purchase_upgrade(state: &mut PlayerState, upgrade: UpgradeId) -> ActionOutcome {
    let Some(owned) = state.sect.as_ref().map(|sect| sect.upgrades.contains(&upgrade)) else {
        return ActionOutcome::rejected("Establish a sect before building upgrades");
    };
    if owned {
        return ActionOutcome::declined(format!("{} is already built", upgrade.name()));
    }
    let cost = upgrade.cost();
    if !state.spend_stones(cost) {
        return ActionOutcome::rejected(format!(
            "Need {cost} Spirit Stones for the {}",
            upgrade.name()
        ));
    }
    if let Some(sect) = state.sect.as_mut() {
        sect.upgrades.insert(upgrade);
        upgrade.effect().apply(sect);
    }
    ActionOutcome::success(format!("Built the {}!", upgrade.name()))
}

/// Idle herb and reputation output. Returns whether anything changed.
pub fn produce(state: &mut PlayerState, cfg: &SectCfg) -> bool {
    let Some(sect) = state.sect.as_mut() else {
        return false;
    };
    let mut changed = false;
    if sect.herb_production > 0.0 {
        state.herbs += sect.herb_production;
        changed = true;
    }
    if sect.reputation_growth > 0.0 {
        sect.reputation += cfg.passive_reputation_rate * sect.reputation_growth;
        changed = true;
    }
    changed
}
