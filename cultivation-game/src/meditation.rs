//! Meditation sessions bound to scheduler timers.
//!
//! A session is either idle or meditating. Starting arms a repeating tick and
//! a one-shot timeout; every way out of a session cancels both before the
//! next timer can fire, so each session ends exactly once.
use crate::config::{MeditationCfg, ProgressionCfg};
use crate::outcome::ActionOutcome;
use crate::progression;
use crate::rng::RandomSource;
use crate::scheduler::{Scheduler, TimerId, TimerJob};
use crate::state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveSession {
    tick: TimerId,
    timeout: TimerId,
}

/// What a single meditation tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickResult {
    Gained(f64),
    Deviated { gained: f64, qi_lost: f64 },
    /// The timer belonged to a session that already ended.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct MeditationController {
    active: Option<ActiveSession>,
}

impl MeditationController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(
        &mut self,
        state: &mut PlayerState,
        scheduler: &mut Scheduler,
        cfg: &MeditationCfg,
    ) -> ActionOutcome {
        if self.active.is_some() || state.meditating {
            return ActionOutcome::rejected("You are already meditating");
        }
        let tick = scheduler.schedule_repeating(cfg.tick_ms, TimerJob::MeditationTick);
        let timeout = scheduler.schedule_once(cfg.max_duration_ms, TimerJob::MeditationTimeout);
        self.active = Some(ActiveSession { tick, timeout });
        state.meditating = true;
        ActionOutcome::info("You enter a meditative state...")
    }

    /// End the session explicitly.
    pub fn stop(&mut self, state: &mut PlayerState, scheduler: &mut Scheduler) -> ActionOutcome {
        if self.finish(state, scheduler).is_none() {
            return ActionOutcome::declined("You are not meditating");
        }
        ActionOutcome::info("You end your meditation")
    }

    /// Handle a tick timer. Ticks from an ended session are ignored.
    pub fn on_tick(
        &mut self,
        id: TimerId,
        state: &mut PlayerState,
        scheduler: &mut Scheduler,
        rng: &mut dyn RandomSource,
        cfg: &MeditationCfg,
        progression_cfg: &ProgressionCfg,
    ) -> TickResult {
        if self.active.is_none_or(|session| session.tick != id) {
            return TickResult::Stale;
        }
        let gained =
            progression::gain_qi(state, rng, progression_cfg, cfg.tick_gain, false).amount;
        if !state.meditation_safety && rng.chance(cfg.deviation_chance) {
            let qi_lost = state.lose_qi(cfg.deviation_penalty);
            self.finish(state, scheduler);
            log::debug!("qi deviation: lost {qi_lost:.0}");
            return TickResult::Deviated { gained, qi_lost };
        }
        TickResult::Gained(gained)
    }

    /// Handle the timeout timer. Returns whether it ended a live session.
    pub fn on_timeout(
        &mut self,
        id: TimerId,
        state: &mut PlayerState,
        scheduler: &mut Scheduler,
    ) -> bool {
        if self.active.is_none_or(|session| session.timeout != id) {
            return false;
        }
        self.finish(state, scheduler).is_some()
    }

    /// Drop the session without touching state, e.g. when the state is
    /// replaced wholesale.
    pub fn abandon(&mut self, scheduler: &mut Scheduler) {
        if let Some(session) = self.active.take() {
            scheduler.cancel(session.tick);
            scheduler.cancel(session.timeout);
        }
    }

    fn finish(&mut self, state: &mut PlayerState, scheduler: &mut Scheduler) -> Option<()> {
        let session = self.active.take()?;
        scheduler.cancel(session.tick);
        scheduler.cancel(session.timeout);
        state.meditating = false;
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedRolls;

    struct Rig {
        controller: MeditationController,
        state: PlayerState,
        scheduler: Scheduler,
        cfg: MeditationCfg,
        progression: ProgressionCfg,
    }

    impl Rig {
        fn new(state: PlayerState) -> Self {
            Self {
                controller: MeditationController::new(),
                state,
                scheduler: Scheduler::new(),
                cfg: MeditationCfg::default(),
                progression: ProgressionCfg::default(),
            }
        }

        fn start(&mut self) -> ActionOutcome {
            self.controller
                .start(&mut self.state, &mut self.scheduler, &self.cfg)
        }

        fn run(&mut self, until: u64, rng: &mut dyn RandomSource) -> Vec<TickResult> {
            let mut results = Vec::new();
            while let Some(fired) = self.scheduler.pop_due(until) {
                match fired.job {
                    TimerJob::MeditationTick => results.push(self.controller.on_tick(
                        fired.id,
                        &mut self.state,
                        &mut self.scheduler,
                        rng,
                        &self.cfg,
                        &self.progression,
                    )),
                    TimerJob::MeditationTimeout => {
                        self.controller
                            .on_timeout(fired.id, &mut self.state, &mut self.scheduler);
                    }
                    _ => {}
                }
            }
            results
        }
    }

    #[test]
    fn full_session_runs_thirty_ticks() {
        let mut rig = Rig::new(PlayerState::default());
        assert!(rig.start().ok);
        let results = rig.run(60_000, &mut FixedRolls::constant(0.5));
        assert_eq!(results.len(), 30);
        assert!((rig.state.qi - 60.0).abs() <= f64::EPSILON);
        assert!(!rig.state.meditating);
        assert!(!rig.controller.is_active());
        assert_eq!(rig.scheduler.active_count(), 0);
    }

    #[test]
    fn second_start_is_rejected() {
        let mut rig = Rig::new(PlayerState::default());
        assert!(rig.start().ok);
        let outcome = rig.start();
        assert!(!outcome.ok);
        assert_eq!(rig.scheduler.active_count(), 2);
    }

    #[test]
    fn deviation_ends_session_and_costs_qi() {
        let mut rig = Rig::new(PlayerState {
            qi: 150.0,
            ..PlayerState::default()
        });
        rig.start();
        let results = rig.run(60_000, &mut FixedRolls::constant(0.0));
        assert_eq!(
            results,
            vec![TickResult::Deviated {
                gained: 2.0,
                qi_lost: 100.0
            }]
        );
        assert!((rig.state.qi - 52.0).abs() <= f64::EPSILON);
        assert!(!rig.state.meditating);
        assert_eq!(rig.scheduler.active_count(), 0);
    }

    #[test]
    fn safety_prevents_deviation() {
        let mut rig = Rig::new(PlayerState {
            meditation_safety: true,
            ..PlayerState::default()
        });
        rig.start();
        let results = rig.run(60_000, &mut FixedRolls::constant(0.0));
        assert_eq!(results.len(), 30);
        assert!(results.iter().all(|r| matches!(r, TickResult::Gained(_))));
    }

    #[test]
    fn stop_cancels_timers_and_stale_ticks_are_ignored() {
        let mut rig = Rig::new(PlayerState::default());
        rig.start();
        let results = rig.run(3_000, &mut FixedRolls::constant(0.5));
        assert_eq!(results.len(), 3);
        assert!(rig.controller.stop(&mut rig.state, &mut rig.scheduler).ok);
        assert!(!rig.controller.stop(&mut rig.state, &mut rig.scheduler).ok);
        assert!(rig.run(60_000, &mut FixedRolls::constant(0.5)).is_empty());
        assert!((rig.state.qi - 6.0).abs() <= f64::EPSILON);

        let stale = rig.controller.on_tick(
            TimerId::default(),
            &mut rig.state,
            &mut rig.scheduler,
            &mut FixedRolls::constant(0.0),
            &rig.cfg,
            &rig.progression,
        );
        assert_eq!(stale, TickResult::Stale);
    }
}
