//! A running game: player state, logical clock, randomness, and the queues
//! the display collaborator drains.
//!
//! Every action and every timer fire is one atomic step. A step mutates
//! state, refreshes the stage status, checks achievements, then queues its
//! notices and marks the state changed.
use serde::{Deserialize, Serialize};

use crate::achievements::{self, AchievementId};
use crate::alchemy;
use crate::config::GameConfig;
use crate::dao::{self, Comprehension};
use crate::events::{self, EventReport};
use crate::meditation::{MeditationController, TickResult};
use crate::outcome::{ActionOutcome, Notice, OutcomeKind, UiSurfaceHint};
use crate::progression::{self, Breakthrough, StageStatus};
use crate::rebirth::{self, Rebirth};
use crate::rng::{RandomSource, SeededRng};
use crate::roots::SpiritualRoot;
use crate::scheduler::{Fired, Scheduler, TimerId, TimerJob};
use crate::sect::{self, UpgradeId};
use crate::stages;
use crate::state::{PlayerState, SkillId};

/// Player command, as sent by a UI or a scripted driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    GatherQi,
    StartMeditation,
    StopMeditation,
    AttemptBreakthrough,
    AttemptComprehension,
    RecruitDisciple,
    TrainDisciples,
    ExpandSect,
    PurchaseUpgrade { upgrade: UpgradeId },
    SelectRoot { root: SpiritualRoot },
    RefinePill,
    ConsumePill,
    AttemptRebirth { confirmed: bool },
    Reset { confirmed: bool },
}

/// Running counters for a session, reset only when the session is rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub breakthroughs: u32,
    pub failed_breakthroughs: u32,
    pub meditations: u32,
    pub deviations: u32,
    pub general_events: u32,
    pub meditation_events: u32,
    pub insights: u32,
    pub rebirths: u32,
}

/// Summary of one [`GameSession::advance`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Logical time after the advance.
    pub now: u64,
    pub fired: u32,
    /// An autosave timer fired; the caller should persist.
    pub autosave_due: bool,
    pub state_changed: bool,
}

pub struct GameSession {
    state: PlayerState,
    config: GameConfig,
    scheduler: Scheduler,
    rng: Box<dyn RandomSource>,
    meditation: MeditationController,
    event_cooldown: Option<TimerId>,
    status: StageStatus,
    pending: Vec<Notice>,
    notices: Vec<Notice>,
    events: Vec<EventReport>,
    state_changed: bool,
    stats: SessionStats,
}

impl GameSession {
    /// Fresh cultivator driven by the given random source.
    #[must_use]
    pub fn new(config: GameConfig, rng: Box<dyn RandomSource>) -> Self {
        Self::from_state(PlayerState::default(), config, rng)
    }

    /// Fresh cultivator on a seeded ChaCha stream.
    #[must_use]
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::new(config, Box::new(SeededRng::new(seed)))
    }

    /// Resume from a restored state. Timers always start from a clean slate.
    #[must_use]
    pub fn from_state(
        mut state: PlayerState,
        config: GameConfig,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        state.settle_after_load();
        let status = progression::check_stage_advance(&state);
        let mut session = Self {
            state,
            config,
            scheduler: Scheduler::new(),
            rng,
            meditation: MeditationController::new(),
            event_cooldown: None,
            status,
            pending: Vec::new(),
            notices: Vec::new(),
            events: Vec::new(),
            state_changed: false,
            stats: SessionStats::default(),
        };
        session.arm_timers();
        if session.state.current_stage >= session.config.progression.sect_founding_stage
            && let Some(name) = sect::establish(&mut session.state)
        {
            session.queue_success(format!("You have established the {name}!"));
            session.finish_timer();
        }
        session
    }

    fn arm_timers(&mut self) {
        let timers = &self.config.timers;
        self.scheduler
            .schedule_repeating(timers.idle_gain_ms, TimerJob::IdleGain);
        self.scheduler
            .schedule_repeating(timers.general_event_ms, TimerJob::GeneralEventRoll);
        self.scheduler
            .schedule_repeating(timers.meditation_event_ms, TimerJob::MeditationEventRoll);
        self.scheduler
            .schedule_repeating(timers.auto_comprehension_ms, TimerJob::AutoComprehension);
        self.scheduler
            .schedule_repeating(timers.sect_production_ms, TimerJob::SectProduction);
        self.scheduler
            .schedule_repeating(timers.autosave_ms, TimerJob::Autosave);
    }

    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut PlayerState {
        &mut self.state
    }

    #[must_use]
    pub fn into_state(self) -> PlayerState {
        self.state
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current logical time in milliseconds.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.scheduler.now()
    }

    #[must_use]
    pub const fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Stage status as of the last completed step.
    #[must_use]
    pub const fn stage_status(&self) -> StageStatus {
        self.status
    }

    #[must_use]
    pub const fn is_meditating(&self) -> bool {
        self.meditation.is_active()
    }

    #[must_use]
    pub const fn event_cooldown_active(&self) -> bool {
        self.event_cooldown.is_some()
    }

    /// Serialize the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        self.state.to_snapshot_json()
    }

    /// Read and clear the state-changed flag.
    pub const fn take_state_changed(&mut self) -> bool {
        std::mem::replace(&mut self.state_changed, false)
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn drain_events(&mut self) -> Vec<EventReport> {
        std::mem::take(&mut self.events)
    }

    /// Queue a notice from outside the rules engine, such as a failed save.
    pub fn push_notice(&mut self, message: impl Into<String>, kind: OutcomeKind) {
        let at = self.scheduler.now();
        self.notices.push(Notice::toast(message, kind, at));
    }

    pub fn perform(&mut self, action: Action) -> ActionOutcome {
        match action {
            Action::GatherQi => self.gather_qi(),
            Action::StartMeditation => self.start_meditation(),
            Action::StopMeditation => self.stop_meditation(),
            Action::AttemptBreakthrough => self.attempt_breakthrough(),
            Action::AttemptComprehension => self.attempt_comprehension(),
            Action::RecruitDisciple => self.recruit_disciple(),
            Action::TrainDisciples => self.train_disciples(),
            Action::ExpandSect => self.expand_sect(),
            Action::PurchaseUpgrade { upgrade } => self.purchase_upgrade(upgrade),
            Action::SelectRoot { root } => self.select_root(root),
            Action::RefinePill => self.refine_pill(),
            Action::ConsumePill => self.consume_pill(),
            Action::AttemptRebirth { confirmed } => self.attempt_rebirth(confirmed),
            Action::Reset { confirmed } => self.reset(confirmed),
        }
    }

    pub fn gather_qi(&mut self) -> ActionOutcome {
        let base = self.config.progression.gather_base;
        let gain = progression::gain_qi(
            &mut self.state,
            &mut *self.rng,
            &self.config.progression,
            base,
            true,
        );
        if gain.event_requested {
            self.trigger_general_event();
        }
        self.finish_action(ActionOutcome::success(format!(
            "Gathered {:.1} Qi",
            gain.amount
        )))
    }

    pub fn start_meditation(&mut self) -> ActionOutcome {
        let outcome =
            self.meditation
                .start(&mut self.state, &mut self.scheduler, &self.config.meditation);
        if outcome.ok {
            self.stats.meditations += 1;
        }
        self.finish_action(outcome)
    }

    pub fn stop_meditation(&mut self) -> ActionOutcome {
        let outcome = self.meditation.stop(&mut self.state, &mut self.scheduler);
        self.finish_action(outcome)
    }

    pub fn attempt_breakthrough(&mut self) -> ActionOutcome {
        let result = progression::attempt_breakthrough(
            &mut self.state,
            &mut *self.rng,
            &self.config.progression,
        );
        let outcome = match result {
            Breakthrough::AtPeak => {
                ActionOutcome::declined("You have reached the pinnacle of cultivation")
            }
            Breakthrough::NotReady { hint } => ActionOutcome::rejected(format!(
                "You don't meet the requirements for breakthrough ({hint})"
            )),
            Breakthrough::Advanced {
                to,
                unlocked_skill,
                founded_sect,
                ..
            } => {
                self.stats.breakthroughs += 1;
                if let Some(name) = founded_sect {
                    self.queue_success(format!("You have established the {name}!"));
                }
                if unlocked_skill == Some(SkillId::CoreManifestation) {
                    self.queue_success("Your golden core manifests a new skill");
                }
                ActionOutcome::success(format!(
                    "Breakthrough successful! You reached {} realm",
                    stages::stage_name(to)
                ))
            }
            Breakthrough::Failed { qi_lost } => {
                self.stats.failed_breakthroughs += 1;
                ActionOutcome::setback(format!("Breakthrough failed! Lost {qi_lost:.0} Qi"))
            }
        };
        self.finish_action(outcome)
    }

    pub fn attempt_comprehension(&mut self) -> ActionOutcome {
        let result = self.comprehend();
        let outcome = result
            .outcome(false)
            .unwrap_or_else(|| ActionOutcome::info("The Dao remains silent"));
        self.finish_action(outcome)
    }

    fn comprehend(&mut self) -> Comprehension {
        let result = dao::attempt_comprehension(&mut self.state, &mut *self.rng, &self.config.dao);
        if let Comprehension::Gained(insight) = result {
            self.stats.insights += 1;
            let at = self.scheduler.now();
            self.pending.push(Notice {
                message: format!("{}: {}", insight.title(), insight.lore()),
                kind: OutcomeKind::Info,
                surface: UiSurfaceHint::Modal,
                at,
            });
        }
        result
    }

    pub fn recruit_disciple(&mut self) -> ActionOutcome {
        let outcome = sect::recruit_disciple(&mut self.state, &self.config.sect);
        self.finish_action(outcome)
    }

    pub fn train_disciples(&mut self) -> ActionOutcome {
        let outcome = sect::train_disciples(&mut self.state, &self.config.sect);
        self.finish_action(outcome)
    }

    pub fn expand_sect(&mut self) -> ActionOutcome {
        let outcome = sect::expand_sect(&mut self.state, &mut *self.rng, &self.config.sect);
        self.finish_action(outcome)
    }

    pub fn purchase_upgrade(&mut self, upgrade: UpgradeId) -> ActionOutcome {
        let outcome = sect::purchase_upgrade(&mut self.state, upgrade);
        self.finish_action(outcome)
    }

    /// Choose the spiritual root. Allowed once per life line.
    pub fn select_root(&mut self, root: SpiritualRoot) -> ActionOutcome {
        if let Some(existing) = self.state.root {
            return self.finish_action(ActionOutcome::rejected(format!(
                "Your {} has already awakened",
                existing.display_name()
            )));
        }
        self.state.root = Some(root);
        root.effect().apply(&mut self.state);
        self.finish_action(ActionOutcome::success(format!(
            "You possess the {}!",
            root.display_name()
        )))
    }

    pub fn refine_pill(&mut self) -> ActionOutcome {
        let outcome = alchemy::refine_pill(&mut self.state, &self.config.alchemy);
        self.finish_action(outcome)
    }

    pub fn consume_pill(&mut self) -> ActionOutcome {
        let outcome = alchemy::consume_pill(&mut self.state, &self.config.alchemy);
        self.finish_action(outcome)
    }

    pub fn attempt_rebirth(&mut self, confirmed: bool) -> ActionOutcome {
        let result = rebirth::attempt_rebirth(&mut self.state, &self.config.rebirth, confirmed);
        if matches!(result, Rebirth::Reborn(_)) {
            self.meditation.abandon(&mut self.scheduler);
            self.stats.rebirths += 1;
        }
        self.finish_action(result.outcome())
    }

    /// Start over from a fresh state.
    pub fn reset(&mut self, confirmed: bool) -> ActionOutcome {
        if !confirmed {
            return self.finish_action(ActionOutcome::declined("Reset cancelled"));
        }
        self.meditation.abandon(&mut self.scheduler);
        if let Some(cooldown) = self.event_cooldown.take() {
            self.scheduler.cancel(cooldown);
        }
        self.state = PlayerState::default();
        log::info!("state reset");
        self.finish_action(ActionOutcome::success("Game has been reset."))
    }

    /// Walk the logical clock forward by `ms`, firing every timer that comes
    /// due along the way.
    pub fn advance(&mut self, ms: u64) -> TickReport {
        let until = self.scheduler.now().saturating_add(ms);
        let mut report = TickReport::default();
        while let Some(fired) = self.scheduler.pop_due(until) {
            report.fired += 1;
            self.on_timer(fired, &mut report);
        }
        self.scheduler.settle_at(until);
        report.now = until;
        report
    }

    fn on_timer(&mut self, fired: Fired, report: &mut TickReport) {
        log::debug!("timer {:?} fired at {}ms", fired.job, fired.at);
        let changed = match fired.job {
            TimerJob::IdleGain => self.idle_gain(),
            TimerJob::MeditationTick => self.meditation_tick(fired.id),
            TimerJob::MeditationTimeout => self.meditation_timeout(fired.id),
            TimerJob::GeneralEventRoll => self.general_event_roll(),
            TimerJob::EventCooldownEnd => {
                if self.event_cooldown == Some(fired.id) {
                    self.event_cooldown = None;
                }
                false
            }
            TimerJob::MeditationEventRoll => self.meditation_event_roll(),
            TimerJob::AutoComprehension => self.auto_comprehension(),
            TimerJob::SectProduction => sect::produce(&mut self.state, &self.config.sect),
            TimerJob::Autosave => {
                report.autosave_due = true;
                false
            }
        };
        if changed {
            self.finish_timer();
            report.state_changed = true;
        }
    }

    fn idle_gain(&mut self) -> bool {
        if !self.state.meditating {
            let base = self.state.qi_idle_gain;
            let gain = progression::gain_qi(
                &mut self.state,
                &mut *self.rng,
                &self.config.progression,
                base,
                true,
            );
            if gain.event_requested {
                self.trigger_general_event();
            }
        }
        self.state.spirit += self.state.spirit_growth;
        true
    }

    fn meditation_tick(&mut self, id: TimerId) -> bool {
        let result = self.meditation.on_tick(
            id,
            &mut self.state,
            &mut self.scheduler,
            &mut *self.rng,
            &self.config.meditation,
            &self.config.progression,
        );
        match result {
            TickResult::Stale => false,
            TickResult::Gained(_) => true,
            TickResult::Deviated { qi_lost, .. } => {
                self.stats.deviations += 1;
                let at = self.scheduler.now();
                self.pending.push(Notice::toast(
                    format!("Qi deviation! Lost {qi_lost:.0} Qi."),
                    OutcomeKind::Danger,
                    at,
                ));
                true
            }
        }
    }

    fn meditation_timeout(&mut self, id: TimerId) -> bool {
        if !self
            .meditation
            .on_timeout(id, &mut self.state, &mut self.scheduler)
        {
            return false;
        }
        self.queue_success("Meditation complete");
        true
    }

    fn general_event_roll(&mut self) -> bool {
        if self.event_cooldown.is_some() {
            return false;
        }
        if !self.rng.chance(self.config.events.general_chance) {
            return false;
        }
        let published = self.trigger_general_event();
        let cooldown = self.config.timers.general_event_cooldown_ms;
        self.event_cooldown = Some(
            self.scheduler
                .schedule_once(cooldown, TimerJob::EventCooldownEnd),
        );
        published
    }

    fn meditation_event_roll(&mut self) -> bool {
        if !self.state.meditating || !self.rng.chance(self.config.events.meditation_chance) {
            return false;
        }
        let report = events::trigger_meditation(&mut self.state, &mut *self.rng);
        self.stats.meditation_events += 1;
        self.publish(report);
        true
    }

    fn auto_comprehension(&mut self) -> bool {
        if !self.state.meditating || !self.rng.chance(self.config.dao.auto_chance) {
            return false;
        }
        let result = self.comprehend();
        if let Some(outcome) = result.outcome(true) {
            let at = self.scheduler.now();
            self.pending.push(Notice::from_outcome(&outcome, at));
        }
        !matches!(result, Comprehension::InsufficientQi { .. })
    }

    /// Resolve a general event now, bypassing the cooldown.
    fn trigger_general_event(&mut self) -> bool {
        match events::trigger_general(&mut self.state, &mut *self.rng, &self.config.events) {
            Some(report) => {
                self.stats.general_events += 1;
                self.publish(report);
                true
            }
            None => false,
        }
    }

    fn publish(&mut self, report: EventReport) {
        let at = self.scheduler.now();
        self.pending.push(Notice {
            message: format!("{}: {}", report.title, report.result),
            kind: report.rarity.notice_kind(),
            surface: UiSurfaceHint::Log,
            at,
        });
        self.events.push(report);
    }

    fn queue_success(&mut self, message: impl Into<String>) {
        let at = self.scheduler.now();
        self.pending
            .push(Notice::toast(message, OutcomeKind::Success, at));
    }

    fn finish_action(&mut self, outcome: ActionOutcome) -> ActionOutcome {
        let unlocked = self.refresh();
        let at = self.scheduler.now();
        self.notices.push(Notice::from_outcome(&outcome, at));
        self.flush(&unlocked);
        outcome
    }

    fn finish_timer(&mut self) {
        let unlocked = self.refresh();
        self.flush(&unlocked);
    }

    fn refresh(&mut self) -> Vec<AchievementId> {
        self.status = progression::check_stage_advance(&self.state);
        achievements::check(&mut self.state)
    }

    fn flush(&mut self, unlocked: &[AchievementId]) {
        self.notices.append(&mut self.pending);
        let at = self.scheduler.now();
        for id in unlocked {
            self.notices.push(Notice::toast(
                format!("Achievement unlocked: {}", id.title()),
                OutcomeKind::Success,
                at,
            ));
        }
        self.state_changed = true;
    }
}
