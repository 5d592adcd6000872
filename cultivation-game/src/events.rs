//! Random encounters: the general pool and the meditation pool.
//!
//! Conditions and effects are plain data; the session decides when to roll
//! and owns the cooldown timer.
use serde::{Deserialize, Serialize};

use crate::config::EventCfg;
use crate::dao::InsightId;
use crate::outcome::OutcomeKind;
use crate::rng::RandomSource;
use crate::state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    /// Tone for the notice announcing an event of this rarity.
    #[must_use]
    pub const fn notice_kind(self) -> OutcomeKind {
        match self {
            Self::Legendary => OutcomeKind::Success,
            _ => OutcomeKind::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventCondition {
    Always,
    MinStage(usize),
    MinQi(f64),
    MinKarma(f64),
    MinStones(u64),
}

impl EventCondition {
    #[must_use]
    pub fn holds(self, state: &PlayerState) -> bool {
        match self {
            Self::Always => true,
            Self::MinStage(min) => state.current_stage >= min,
            Self::MinQi(min) => state.qi >= min,
            Self::MinKarma(min) => state.karma >= min,
            Self::MinStones(min) => state.spirit_stones >= min,
        }
    }
}

/// Auction offers: stone price and what it buys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuctionLot {
    Herbs { cost: u64, herbs: f64 },
    QiPill { cost: u64, qi: f64 },
    SpiritTonic { cost: u64, spirit: f64 },
}

impl AuctionLot {
    #[must_use]
    pub const fn cost(self) -> u64 {
        match self {
            Self::Herbs { cost, .. } | Self::QiPill { cost, .. } | Self::SpiritTonic { cost, .. } => {
                cost
            }
        }
    }
}

pub const AUCTION_LOTS: [AuctionLot; 3] = [
    AuctionLot::Herbs {
        cost: 100,
        herbs: 3.0,
    },
    AuctionLot::QiPill {
        cost: 200,
        qi: 1_000.0,
    },
    AuctionLot::SpiritTonic {
        cost: 300,
        spirit: 1.0,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventEffect {
    GainQi(f64),
    GainHerbs(f64),
    GainSpirit(f64),
    Ambush {
        base_win_chance: f64,
        loot_min: u64,
        loot_span: u64,
        loss_fraction: f64,
    },
    Revelation {
        fate: f64,
    },
    Auction,
    Lightning {
        harness_chance: f64,
        gain: f64,
        loss_fraction: f64,
    },
    QiSurge {
        gain: f64,
        safety_factor: f64,
    },
    InnerDemon {
        safe_spirit: f64,
        qi_loss: f64,
    },
}

impl EventEffect {
    /// Mutate the state and describe what happened.
    pub fn apply(self, state: &mut PlayerState, rng: &mut dyn RandomSource) -> String {
        match self {
            Self::GainQi(amount) => {
                state.add_qi(amount);
                format!("Gained {amount:.0} Qi from studying the manual")
            }
            Self::GainHerbs(amount) => {
                state.herbs += amount;
                format!("Found {amount:.0} rare spirit herb")
            }
            Self::GainSpirit(amount) => {
                state.spirit += amount;
                format!("Spirit increased by {amount}")
            }
            Self::Ambush {
                base_win_chance,
                loot_min,
                loot_span,
                loss_fraction,
            } => {
                if rng.chance(base_win_chance + state.combat_power) {
                    #[allow(clippy::cast_possible_truncation)]
                    let loot = loot_min + rng.pick(loot_span.max(1) as usize) as u64;
                    state.spirit_stones = state.spirit_stones.saturating_add(loot);
                    format!("Defeated the bandits! Gained {loot} Spirit Stones")
                } else {
                    let loss = state.lose_qi((state.qi * loss_fraction).floor());
                    format!("Lost the fight! {loss:.0} Qi damaged")
                }
            }
            Self::Revelation { fate } => {
                if state.dao_insights.insert(InsightId::Revelation) {
                    state.fate += fate;
                    format!("Gained Heavenly Revelation! Fate +{fate}")
                } else {
                    String::from("The heavens remain silent this time")
                }
            }
            Self::Auction => {
                let lot = AUCTION_LOTS[rng.pick(AUCTION_LOTS.len())];
                if !state.spend_stones(lot.cost()) {
                    return String::from("Not enough stones for the auction");
                }
                match lot {
                    AuctionLot::Herbs { herbs, .. } => {
                        state.herbs += herbs;
                        format!("Bought {herbs:.0} spirit herbs")
                    }
                    AuctionLot::QiPill { qi, .. } => {
                        state.add_qi(qi);
                        format!("Gained {qi:.0} Qi from spirit pill")
                    }
                    AuctionLot::SpiritTonic { spirit, .. } => {
                        state.spirit += spirit;
                        format!("Permanent Spirit +{spirit}")
                    }
                }
            }
            Self::Lightning {
                harness_chance,
                gain,
                loss_fraction,
            } => {
                if rng.chance(harness_chance) {
                    state.add_qi(gain);
                    format!("Harnessed the lightning! Gained {gain:.0} Qi")
                } else {
                    let loss = state.lose_qi((state.qi * loss_fraction).floor());
                    format!("Struck by lightning! Lost {loss:.0} Qi")
                }
            }
            Self::QiSurge {
                gain,
                safety_factor,
            } => {
                let amount = if state.meditation_safety {
                    gain * safety_factor
                } else {
                    gain
                };
                state.add_qi(amount);
                format!("Gained {amount:.0} Qi from energy surge")
            }
            Self::InnerDemon {
                safe_spirit,
                qi_loss,
            } => {
                if state.meditation_safety {
                    state.spirit += safe_spirit;
                    format!("Overcame inner demon! Spirit +{safe_spirit}")
                } else {
                    let lost = state.lose_qi(qi_loss);
                    format!("Lost {lost:.0} Qi to inner demon")
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventId {
    AncientManual,
    SpiritHerb,
    BanditAmbush,
    DaoistElder,
    HeavenlyRevelation,
    AuctionHouse,
    TribulationLightning,
    QiSurge,
    InnerDemon,
    Enlightenment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDef {
    pub id: EventId,
    pub title: &'static str,
    pub description: &'static str,
    pub condition: EventCondition,
    pub effect: EventEffect,
    pub rarity: Rarity,
}

pub const GENERAL_EVENTS: [EventDef; 7] = [
    EventDef {
        id: EventId::AncientManual,
        title: "Ancient Manual",
        description: "You discover an ancient cultivation manual in a forgotten cave.",
        condition: EventCondition::MinStage(2),
        effect: EventEffect::GainQi(500.0),
        rarity: Rarity::Uncommon,
    },
    EventDef {
        id: EventId::SpiritHerb,
        title: "Spirit Herb",
        description: "You find a rare spirit herb glowing with energy.",
        condition: EventCondition::Always,
        effect: EventEffect::GainHerbs(1.0),
        rarity: Rarity::Common,
    },
    EventDef {
        id: EventId::BanditAmbush,
        title: "Bandit Ambush",
        description: "A group of rogue cultivators attempts to rob you!",
        condition: EventCondition::MinQi(1_000.0),
        effect: EventEffect::Ambush {
            base_win_chance: 0.7,
            loot_min: 50,
            loot_span: 100,
            loss_fraction: 0.2,
        },
        rarity: Rarity::Common,
    },
    EventDef {
        id: EventId::DaoistElder,
        title: "Daoist Elder",
        description: "A wandering elder offers you guidance.",
        condition: EventCondition::MinKarma(3.0),
        effect: EventEffect::GainSpirit(2.0),
        rarity: Rarity::Rare,
    },
    EventDef {
        id: EventId::HeavenlyRevelation,
        title: "Heavenly Revelation",
        description: "The heavens part and you receive divine insight.",
        condition: EventCondition::MinStage(5),
        effect: EventEffect::Revelation { fate: 1.0 },
        rarity: Rarity::Legendary,
    },
    EventDef {
        id: EventId::AuctionHouse,
        title: "Auction House",
        description: "A traveling merchant offers rare goods.",
        condition: EventCondition::MinStones(100),
        effect: EventEffect::Auction,
        rarity: Rarity::Uncommon,
    },
    EventDef {
        id: EventId::TribulationLightning,
        title: "Tribulation Lightning",
        description: "A stray bolt of tribulation lightning strikes nearby!",
        condition: EventCondition::MinStage(4),
        effect: EventEffect::Lightning {
            harness_chance: 0.3,
            gain: 2_000.0,
            loss_fraction: 0.4,
        },
        rarity: Rarity::Rare,
    },
];

pub const MEDITATION_EVENTS: [EventDef; 3] = [
    EventDef {
        id: EventId::QiSurge,
        title: "Qi Surge",
        description: "Your meditation taps into a powerful energy vein.",
        condition: EventCondition::Always,
        effect: EventEffect::QiSurge {
            gain: 300.0,
            safety_factor: 1.5,
        },
        rarity: Rarity::Common,
    },
    EventDef {
        id: EventId::InnerDemon,
        title: "Inner Demon",
        description: "Dark thoughts arise during your meditation.",
        condition: EventCondition::Always,
        effect: EventEffect::InnerDemon {
            safe_spirit: 0.5,
            qi_loss: 200.0,
        },
        rarity: Rarity::Common,
    },
    EventDef {
        id: EventId::Enlightenment,
        title: "Enlightenment",
        description: "A moment of perfect clarity.",
        condition: EventCondition::Always,
        effect: EventEffect::GainSpirit(0.3),
        rarity: Rarity::Common,
    },
];

/// A resolved event, published to the display collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReport {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub result: String,
    pub rarity: Rarity,
}

fn resolve(def: &EventDef, state: &mut PlayerState, rng: &mut dyn RandomSource) -> EventReport {
    let result = def.effect.apply(state, rng);
    log::debug!("event {:?}: {result}", def.id);
    EventReport {
        id: def.id,
        title: def.title.to_string(),
        description: def.description.to_string(),
        result,
        rarity: def.rarity,
    }
}

/// Pick and apply one general event, or nothing when no candidate survives.
pub fn trigger_general(
    state: &mut PlayerState,
    rng: &mut dyn RandomSource,
    cfg: &EventCfg,
) -> Option<EventReport> {
    trigger_from_pool(&GENERAL_EVENTS, state, rng, cfg)
}

/// Filter `pool` by condition and the legendary gate, then resolve one
/// candidate uniformly. No candidate means no mutation.
pub fn trigger_from_pool(
    pool: &[EventDef],
    state: &mut PlayerState,
    rng: &mut dyn RandomSource,
    cfg: &EventCfg,
) -> Option<EventReport> {
    let mut candidates = Vec::with_capacity(pool.len());
    for def in pool {
        if !def.condition.holds(state) {
            continue;
        }
        if def.rarity == Rarity::Legendary && !rng.chance(cfg.legendary_chance) {
            continue;
        }
        candidates.push(def);
    }
    if candidates.is_empty() {
        return None;
    }
    let def = candidates[rng.pick(candidates.len())];
    Some(resolve(def, state, rng))
}

/// Apply one uniformly chosen meditation event.
pub fn trigger_meditation(state: &mut PlayerState, rng: &mut dyn RandomSource) -> EventReport {
    let def = &MEDITATION_EVENTS[rng.pick(MEDITATION_EVENTS.len())];
    resolve(def, state, rng)
}
