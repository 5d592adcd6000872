//! Cultivation Game Engine
//!
//! Platform-agnostic rules for an idle cultivation game: Qi accumulation,
//! stage breakthroughs, meditation, Dao comprehension, random encounters,
//! sect management, alchemy, and rebirth. Rendering, persistence media and
//! notification display live with the caller.

pub mod achievements;
pub mod alchemy;
pub mod config;
mod constants;
pub mod dao;
pub mod events;
pub mod meditation;
pub mod outcome;
pub mod persistence;
pub mod progression;
pub mod rebirth;
pub mod rng;
pub mod roots;
pub mod scheduler;
pub mod sect;
pub mod session;
pub mod stages;
pub mod state;

// Re-export commonly used types
pub use achievements::AchievementId;
pub use config::{
    AlchemyCfg, ConfigError, DaoCfg, EventCfg, GameConfig, MeditationCfg, ProgressionCfg,
    RebirthCfg, SectCfg, TimerCfg,
};
pub use dao::{Comprehension, InsightEffect, InsightId};
pub use events::{EventEffect, EventId, EventReport, Rarity};
pub use meditation::{MeditationController, TickResult};
pub use outcome::{ActionOutcome, Notice, OutcomeKind, UiSurfaceHint};
pub use persistence::{PersistenceError, SnapshotError, load_snapshot};
pub use progression::{Breakthrough, QiGain, StageStatus, check_stage_advance};
pub use rebirth::{Rebirth, RebirthSummary};
pub use rng::{FixedRolls, RandomSource, SeededRng};
pub use roots::{RootEffect, SpiritualRoot};
pub use scheduler::{Scheduler, TimerId, TimerJob};
pub use sect::{TechniqueId, UpgradeId};
pub use session::{Action, GameSession, SessionStats, TickReport};
pub use stages::{LAST_STAGE, Requirement, STAGES, StageDefinition};
pub use state::{PlayerState, Sect, SkillId};

/// Default storage slot for a single-player save.
pub const DEFAULT_SLOT: &str = "cultivation-save";

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this
pub trait SnapshotStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a serialized snapshot under `slot`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_snapshot(&self, slot: &str, snapshot: &str) -> Result<(), Self::Error>;

    /// Fetch the raw snapshot stored under `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load_snapshot(&self, slot: &str) -> Result<Option<String>, Self::Error>;

    /// Remove the snapshot stored under `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    fn delete_snapshot(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Binds a live [`GameSession`] to a storage backend.
pub struct GameEngine<S>
where
    S: SnapshotStorage,
{
    storage: S,
    config: GameConfig,
    slot: String,
    session: Option<GameSession>,
}

impl<S> GameEngine<S>
where
    S: SnapshotStorage,
{
    /// Create an engine with no active session.
    pub fn new(storage: S, config: GameConfig) -> Self {
        Self::with_slot(storage, config, DEFAULT_SLOT)
    }

    pub fn with_slot(storage: S, config: GameConfig, slot: impl Into<String>) -> Self {
        Self {
            storage,
            config,
            slot: slot.into(),
            session: None,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub const fn session_mut(&mut self) -> Option<&mut GameSession> {
        self.session.as_mut()
    }

    /// Begin a fresh game, discarding any active session.
    pub fn start_new(&mut self, rng: Box<dyn RandomSource>) -> &mut GameSession {
        self.session
            .insert(GameSession::new(self.config.clone(), rng))
    }

    /// Restore the stored snapshot, or start fresh when there is none.
    ///
    /// A snapshot that fails to decode is discarded: the slot is deleted, a
    /// fresh session starts, and a danger notice explains what happened.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage backend itself cannot be read.
    pub fn load_or_new(
        &mut self,
        rng: Box<dyn RandomSource>,
    ) -> Result<&mut GameSession, PersistenceError> {
        let stored = self
            .storage
            .load_snapshot(&self.slot)
            .map_err(PersistenceError::storage)?;

        let session = match stored.as_deref().map(persistence::load_snapshot) {
            None => GameSession::new(self.config.clone(), rng),
            Some(Ok(state)) => {
                log::info!("restored snapshot from slot {}", self.slot);
                GameSession::from_state(state, self.config.clone(), rng)
            }
            Some(Err(err)) => {
                log::warn!("discarding unreadable snapshot in slot {}: {err}", self.slot);
                if let Err(delete_err) = self.storage.delete_snapshot(&self.slot) {
                    log::warn!("failed to delete slot {}: {delete_err}", self.slot);
                }
                let mut session = GameSession::new(self.config.clone(), rng);
                session.push_notice(
                    "Saved progress was corrupted. Starting a new journey.",
                    OutcomeKind::Danger,
                );
                session
            }
        };
        Ok(self.session.insert(session))
    }

    /// Persist the active session, stamping `last_save` on success.
    ///
    /// On failure the in-memory state is left as it was and a danger notice is
    /// queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded or written.
    pub fn save(&mut self, unix_time: i64) -> Result<(), PersistenceError> {
        let Some(session) = self.session.as_mut() else {
            log::warn!("save requested with no active session");
            return Ok(());
        };
        let mut snapshot = session.state().clone();
        snapshot.last_save = Some(unix_time);
        let written = snapshot
            .to_snapshot_json()
            .map_err(PersistenceError::from)
            .and_then(|json| {
                self.storage
                    .save_snapshot(&self.slot, &json)
                    .map_err(PersistenceError::storage)
            });
        match written {
            Ok(()) => {
                session.state_mut().last_save = Some(unix_time);
                Ok(())
            }
            Err(err) => {
                log::warn!("save to slot {} failed: {err}", self.slot);
                session.push_notice("Failed to save progress!", OutcomeKind::Danger);
                Err(err)
            }
        }
    }

    /// Dispatch an action to the active session.
    pub fn perform(&mut self, action: Action) -> ActionOutcome {
        match self.session.as_mut() {
            Some(session) => session.perform(action),
            None => {
                log::warn!("{action:?} ignored: no active session");
                ActionOutcome::rejected("No active cultivation session")
            }
        }
    }

    /// Advance the active session's clock.
    pub fn advance(&mut self, ms: u64) -> TickReport {
        match self.session.as_mut() {
            Some(session) => session.advance(ms),
            None => {
                log::warn!("advance ignored: no active session");
                TickReport::default()
            }
        }
    }

    /// Reset the active session and drop the stored snapshot.
    pub fn reset(&mut self, confirmed: bool) -> ActionOutcome {
        let outcome = self.perform(Action::Reset { confirmed });
        if outcome.ok
            && let Err(err) = self.storage.delete_snapshot(&self.slot)
        {
            log::warn!("failed to delete slot {}: {err}", self.slot);
        }
        outcome
    }
}
