use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cultivation_game::{
    GameConfig, GameEngine, GameSession, InsightId, OutcomeKind, PlayerState, SeededRng,
    SnapshotStorage,
};
use serde::Serialize;

use crate::policy::Strategy;

/// Logical milliseconds between policy decisions.
const STEP_MS: u64 = 1_000;

/// Outcome of one seeded run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub strategy: Strategy,
    pub duration_secs: u64,
    pub final_stage: usize,
    pub stage_name: String,
    pub qi: f64,
    pub spirit_stones: u64,
    pub rebirths: u32,
    pub insights: Vec<String>,
    pub disciples: u32,
    pub achievements: Vec<String>,
    pub actions: u32,
    pub rejected_actions: u32,
    pub breakthroughs: u32,
    pub failed_breakthroughs: u32,
    pub meditations: u32,
    pub deviations: u32,
    pub general_events: u32,
    pub meditation_events: u32,
    pub danger_notices: u32,
    pub saves: u32,
    pub violations: Vec<String>,
    pub passed: bool,
    pub elapsed: Duration,
}

/// Insights granted through comprehension; event grants are excluded.
fn comprehended(state: &PlayerState) -> usize {
    state
        .dao_insights
        .iter()
        .filter(|id| InsightId::POOL.contains(id))
        .count()
}

/// Watches a session for rule violations between steps.
#[derive(Debug)]
struct InvariantTracker {
    stage: usize,
    rebirths: u32,
    insight_base: usize,
    violations: Vec<String>,
}

impl InvariantTracker {
    fn new(session: &GameSession) -> Self {
        let state = session.state();
        Self {
            stage: state.current_stage,
            rebirths: state.rebirths,
            insight_base: comprehended(state),
            violations: Vec::new(),
        }
    }

    fn observe(&mut self, at_ms: u64, session: &GameSession) {
        let state = session.state();
        let gained = session.stats().insights as usize;
        let held = comprehended(state);

        if state.qi < 0.0 || !state.qi.is_finite() {
            self.violations
                .push(format!("{at_ms}ms: qi out of range ({})", state.qi));
        }
        if state.rebirths > self.rebirths {
            self.rebirths = state.rebirths;
            self.insight_base = held.saturating_sub(gained);
        } else if state.current_stage < self.stage {
            self.violations.push(format!(
                "{at_ms}ms: stage fell from {} to {} without rebirth",
                self.stage, state.current_stage
            ));
        }
        if state.current_stage > self.stage + 1 {
            self.violations.push(format!(
                "{at_ms}ms: stage jumped from {} to {}",
                self.stage, state.current_stage
            ));
        }
        if held != self.insight_base + gained {
            self.violations.push(format!(
                "{at_ms}ms: {held} comprehended insights held but {gained} gained"
            ));
            self.insight_base = held.saturating_sub(gained);
        }
        self.stage = state.current_stage;
    }
}

pub struct RunParams<'a> {
    pub seed: u64,
    pub strategy: Strategy,
    pub duration_secs: u64,
    pub config: &'a GameConfig,
}

/// Play one seeded session to the end of its logical duration.
///
/// The session is saved on every autosave tick and once more at the end,
/// then reloaded from storage to confirm the snapshot round trip.
///
/// # Errors
///
/// Returns an error if the storage backend fails.
pub fn run_seed<S>(params: &RunParams<'_>, storage: S) -> Result<RunSummary>
where
    S: SnapshotStorage + Clone,
{
    let started = Instant::now();
    let slot = format!("seed-{:016x}", params.seed);
    let mut engine = GameEngine::with_slot(storage.clone(), params.config.clone(), slot.clone());
    engine.start_new(Box::new(SeededRng::new(params.seed)));

    let mut policy = params.strategy.create_policy(params.seed);
    let mut tally = Tally::default();
    let mut tracker = match engine.session() {
        Some(session) => InvariantTracker::new(session),
        None => anyhow::bail!("engine did not start a session"),
    };

    let total_ms = params.duration_secs.saturating_mul(1_000);
    let mut elapsed_ms = 0;
    while elapsed_ms < total_ms {
        let action = engine
            .session()
            .and_then(|session| policy.next_action(session));
        if let Some(action) = action {
            let outcome = engine.perform(action);
            tally.actions += 1;
            if !outcome.ok {
                tally.rejected_actions += 1;
                log::debug!("seed {} {action:?} rejected: {}", params.seed, outcome.message);
            }
        }

        let step = STEP_MS.min(total_ms - elapsed_ms);
        let report = engine.advance(step);
        elapsed_ms += step;

        if report.autosave_due {
            save(&mut engine, &mut tally)?;
        }
        if let Some(session) = engine.session_mut() {
            tally.drain(session);
            tracker.observe(elapsed_ms, session);
        }
    }

    save(&mut engine, &mut tally)?;
    let Some(session) = engine.session_mut() else {
        anyhow::bail!("session vanished during run {}", params.seed);
    };
    tally.drain(session);
    let stats = *session.stats();
    let final_state = session.state().clone();

    let mut reloaded = GameEngine::with_slot(storage, params.config.clone(), slot);
    let restored = reloaded
        .load_or_new(Box::new(SeededRng::new(params.seed)))
        .with_context(|| format!("failed to reload snapshot for seed {}", params.seed))?;
    tracker
        .violations
        .extend(compare_snapshots(&final_state, restored.state()));

    let passed = tracker.violations.is_empty();
    if !passed {
        log::warn!(
            "seed {} finished with {} violation(s)",
            params.seed,
            tracker.violations.len()
        );
    }

    Ok(RunSummary {
        seed: params.seed,
        strategy: params.strategy,
        duration_secs: params.duration_secs,
        final_stage: final_state.current_stage,
        stage_name: final_state.stage_name().to_string(),
        qi: final_state.qi,
        spirit_stones: final_state.spirit_stones,
        rebirths: final_state.rebirths,
        insights: final_state
            .dao_insights
            .iter()
            .map(ToString::to_string)
            .collect(),
        disciples: final_state.disciples(),
        achievements: final_state
            .achievements
            .iter()
            .map(ToString::to_string)
            .collect(),
        actions: tally.actions,
        rejected_actions: tally.rejected_actions,
        breakthroughs: stats.breakthroughs,
        failed_breakthroughs: stats.failed_breakthroughs,
        meditations: stats.meditations,
        deviations: stats.deviations,
        general_events: stats.general_events,
        meditation_events: stats.meditation_events,
        danger_notices: tally.danger_notices,
        saves: tally.saves,
        violations: tracker.violations,
        passed,
        elapsed: started.elapsed(),
    })
}

#[derive(Debug, Default)]
struct Tally {
    actions: u32,
    rejected_actions: u32,
    danger_notices: u32,
    saves: u32,
}

impl Tally {
    fn drain(&mut self, session: &mut GameSession) {
        for notice in session.drain_notices() {
            log::debug!("[{}ms] {:?}: {}", notice.at, notice.kind, notice.message);
            if notice.kind == OutcomeKind::Danger {
                self.danger_notices += 1;
            }
        }
        session.drain_events();
    }
}

fn save<S: SnapshotStorage>(engine: &mut GameEngine<S>, tally: &mut Tally) -> Result<()> {
    engine
        .save(chrono::Utc::now().timestamp())
        .context("failed to save snapshot")?;
    tally.saves += 1;
    Ok(())
}

fn compare_snapshots(live: &PlayerState, restored: &PlayerState) -> Vec<String> {
    let mut problems = Vec::new();
    if (live.qi - restored.qi).abs() > 1e-6 * live.qi.abs().max(1.0) {
        problems.push(format!(
            "snapshot qi {} does not match live {}",
            restored.qi, live.qi
        ));
    }
    if live.current_stage != restored.current_stage {
        problems.push(format!(
            "snapshot stage {} does not match live {}",
            restored.current_stage, live.current_stage
        ));
    }
    if live.rebirths != restored.rebirths
        || live.spirit_stones != restored.spirit_stones
        || live.dao_insights != restored.dao_insights
        || live.achievements != restored.achievements
        || live.disciples() != restored.disciples()
        || live.sect.as_ref().map(|sect| &sect.name) != restored.sect.as_ref().map(|sect| &sect.name)
    {
        problems.push("snapshot progress does not match live state".to_string());
    }
    problems
}
