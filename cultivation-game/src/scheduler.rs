//! Logical clock with one-shot and repeating timers.
//!
//! Nothing here waits on wall-clock time: the owner advances the clock and
//! drains due timers one at a time. Timers due at the same instant fire in
//! registration order, and a repeating timer keeps its registration slot for
//! every later occurrence.
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Work a timer performs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerJob {
    IdleGain,
    MeditationTick,
    MeditationTimeout,
    GeneralEventRoll,
    EventCooldownEnd,
    MeditationEventRoll,
    AutoComprehension,
    SectProduction,
    Autosave,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
struct Timer {
    job: TimerJob,
    due: u64,
    period: Option<u64>,
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub job: TimerJob,
    pub at: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    timers: BTreeMap<TimerId, Timer>,
    queue: BinaryHeap<Reverse<(u64, TimerId)>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time in milliseconds.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_once(&mut self, delay: u64, job: TimerJob) -> TimerId {
        self.insert(job, delay, None)
    }

    /// Schedule `job` every `period` ms, first firing one period from now.
    pub fn schedule_repeating(&mut self, period: u64, job: TimerJob) -> TimerId {
        self.insert(job, period, Some(period.max(1)))
    }

    fn insert(&mut self, job: TimerJob, delay: u64, period: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        self.timers.insert(id, Timer { job, due, period });
        self.queue.push(Reverse((due, id)));
        id
    }

    /// Cancel a timer. Returns false when it already fired (one-shot) or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    #[must_use]
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Repeating timers are re-armed before returning.
    pub fn pop_due(&mut self, until: u64) -> Option<Fired> {
        while let Some(Reverse((due, id))) = self.queue.peek().copied() {
            if due > until {
                return None;
            }
            self.queue.pop();
            let Some(timer) = self.timers.get(&id).copied() else {
                continue;
            };
            if timer.due != due {
                continue;
            }
            self.now = self.now.max(due);
            match timer.period {
                Some(period) => {
                    let next_due = due.saturating_add(period);
                    if let Some(live) = self.timers.get_mut(&id) {
                        live.due = next_due;
                    }
                    self.queue.push(Reverse((next_due, id)));
                }
                None => {
                    self.timers.remove(&id);
                }
            }
            return Some(Fired {
                id,
                job: timer.job,
                at: due,
            });
        }
        None
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn settle_at(&mut self, time: u64) {
        self.now = self.now.max(time);
    }
}
