//! The selection engine state machine.
//!
//! ```text
//! Idle --shuffle_display--> Shuffling --(delay)--> Idle
//! Idle --pick_prizes------> Picking   --(first revealed)--> Picked
//! any  --reset------------> Idle
//! ```
//!
//! The engine never reads a clock. Every operation takes the current
//! engine time, and `advance_to` fires whatever timers have come due.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shuffler_core::error::EngineError;
use shuffler_core::rng::DeterministicRng;
use shuffler_core::slot::{PerSlot, Slot};
use shuffler_core::timer::{TimerId, TimerQueue};

use super::config::{EngineConfig, GuardPolicy};
use super::events::{
    EngineEvent, EngineEventKind, EngineReset, PickStarted, PoolShuffled, PrizesPicked,
    ShuffleStarted, SlotRevealed,
};
use super::selection;

/// Engine status. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    /// Waiting for a control.
    #[default]
    Idle,
    /// A shuffle is waiting out its visual delay.
    Shuffling,
    /// Winners are drawn and being revealed.
    Picking,
    /// All three winners are revealed.
    Picked,
}

impl EngineStatus {
    /// Lowercase status name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EngineStatus::Idle => "idle",
            EngineStatus::Shuffling => "shuffling",
            EngineStatus::Picking => "picking",
            EngineStatus::Picked => "picked",
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a control call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// The call changed engine state.
    Applied,
    /// The call was made in the wrong status and had no effect.
    Ignored,
}

/// Purpose of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Shuffle,
    Flicker(Slot),
    Reveal(Slot),
}

/// One optional handle per timer purpose.
#[derive(Debug, Default)]
struct TimerHandles {
    shuffle: Option<TimerId>,
    flicker: PerSlot<Option<TimerId>>,
    reveal: PerSlot<Option<TimerId>>,
}

fn cancel(handle: &mut Option<TimerId>, timers: &mut TimerQueue<TimerKind>) {
    if let Some(id) = handle.take() {
        timers.cancel(id);
    }
}

impl TimerHandles {
    /// Cancels every tracked timer and returns how many were outstanding.
    fn cancel_all(&mut self, timers: &mut TimerQueue<TimerKind>) -> usize {
        let outstanding = timers.pending();
        cancel(&mut self.shuffle, timers);
        for slot in Slot::ALL {
            cancel(&mut self.flicker[slot], timers);
            cancel(&mut self.reveal[slot], timers);
        }
        // Anything left was untracked; it must not outlive the reset either.
        timers.clear();
        outstanding
    }
}

/// Payload for the results sink, available once all prizes are revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawResults {
    /// The three winners.
    pub prizes: PerSlot<Option<i64>>,
    /// The pool they were drawn from.
    pub pool: Vec<i64>,
    /// Catalog names for the winners.
    pub prize_names: PerSlot<Option<String>>,
}

/// Read-only copy of everything the render layer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSnapshot {
    /// Current status.
    pub status: EngineStatus,
    /// Working pool in display order.
    pub pool: Vec<i64>,
    /// Revealed winners.
    pub prizes: PerSlot<Option<i64>>,
    /// Value each slot should display right now.
    pub display: PerSlot<Option<i64>>,
    /// Which slots have been revealed in the current pick.
    pub revealed: PerSlot<bool>,
    /// Outstanding timers.
    pub pending_timers: usize,
}

/// The randomized selection and staged-reveal engine.
#[derive(Debug)]
pub struct SelectionEngine {
    config: EngineConfig,
    pool: Vec<i64>,
    prizes: PerSlot<Option<i64>>,
    spin: PerSlot<Option<i64>>,
    revealed: PerSlot<bool>,
    winners: Option<PerSlot<i64>>,
    status: EngineStatus,
    timers: TimerQueue<TimerKind>,
    handles: TimerHandles,
    uncommitted_events: Vec<EngineEvent>,
}

impl SelectionEngine {
    /// Creates an idle engine whose pool is a copy of the configured
    /// initial pool.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` if the configuration is
    /// inconsistent.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            pool: config.initial_pool.clone(),
            config,
            prizes: PerSlot::default(),
            spin: PerSlot::default(),
            revealed: PerSlot::default(),
            winners: None,
            status: EngineStatus::Idle,
            timers: TimerQueue::new(),
            handles: TimerHandles::default(),
            uncommitted_events: Vec::new(),
        })
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Working pool in display order.
    #[must_use]
    pub fn pool(&self) -> &[i64] {
        &self.pool
    }

    /// Revealed winners.
    #[must_use]
    pub fn prizes(&self) -> &PerSlot<Option<i64>> {
        &self.prizes
    }

    /// Flicker display values.
    #[must_use]
    pub fn spin(&self) -> &PerSlot<Option<i64>> {
        &self.spin
    }

    /// Whether `slot` has been revealed in the current pick.
    #[must_use]
    pub fn is_revealed(&self, slot: Slot) -> bool {
        self.revealed[slot]
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of outstanding timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Engine time of the next timer, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Value the render layer should show for `slot`: the flicker value
    /// while the slot is still spinning, otherwise the revealed prize.
    /// `None` renders as a placeholder.
    #[must_use]
    pub fn display(&self, slot: Slot) -> Option<i64> {
        if self.status == EngineStatus::Picking && !self.revealed[slot] {
            self.spin[slot]
        } else {
            self.prizes[slot]
        }
    }

    /// Captures the current render state.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            status: self.status,
            pool: self.pool.clone(),
            prizes: self.prizes,
            display: PerSlot::from_fn(|slot| self.display(slot)),
            revealed: self.revealed,
            pending_timers: self.timers.pending(),
        }
    }

    /// Returns and clears the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    fn record(&mut self, occurred_at: Duration, kind: EngineEventKind) {
        self.uncommitted_events.push(EngineEvent { occurred_at, kind });
    }

    /// Checks that the engine is in `required` status. Returns `Ok(false)`
    /// when the call should be ignored.
    fn guard(&self, operation: &'static str, required: EngineStatus) -> Result<bool, EngineError> {
        if self.status == required {
            return Ok(true);
        }
        match self.config.guard {
            GuardPolicy::Ignore => Ok(false),
            GuardPolicy::Strict => Err(EngineError::PreconditionViolated {
                operation,
                status: self.status.as_str(),
            }),
        }
    }

    /// Starts a shuffle. The pool is permuted once the shuffle delay has
    /// elapsed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PreconditionViolated` under the strict guard
    /// policy if the engine is not idle.
    pub fn shuffle_display(&mut self, now: Duration) -> Result<Transition, EngineError> {
        if !self.guard("shuffle_display", EngineStatus::Idle)? {
            return Ok(Transition::Ignored);
        }

        let applies_at = now + self.config.timing.shuffle_delay;
        cancel(&mut self.handles.shuffle, &mut self.timers);
        self.handles.shuffle = Some(self.timers.schedule_once(applies_at, TimerKind::Shuffle));
        self.status = EngineStatus::Shuffling;

        self.record(
            now,
            EngineEventKind::ShuffleStarted(ShuffleStarted {
                applies_at_ms: u64::try_from(applies_at.as_millis()).unwrap_or(u64::MAX),
            }),
        );
        Ok(Transition::Applied)
    }

    /// Draws the three winners up front and starts the staged reveal:
    /// every slot flickers until its reveal time, third first and first
    /// last.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyPool` if the pool is empty (state is left
    /// unchanged), or `EngineError::PreconditionViolated` under the strict
    /// guard policy if the engine is not idle.
    pub fn pick_prizes(
        &mut self,
        now: Duration,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Transition, EngineError> {
        if !self.guard("pick_prizes", EngineStatus::Idle)? {
            return Ok(Transition::Ignored);
        }

        let winners = selection::draw_winners(&self.pool, rng)?;

        self.prizes = PerSlot::default();
        self.spin = PerSlot::default();
        self.revealed = PerSlot::default();
        self.winners = Some(winners);
        self.status = EngineStatus::Picking;

        let timing = self.config.timing;
        for slot in Slot::ALL {
            let period = timing.flicker_period(slot);
            cancel(&mut self.handles.flicker[slot], &mut self.timers);
            self.handles.flicker[slot] =
                Some(self.timers.schedule_every(now + period, period, TimerKind::Flicker(slot)));
        }
        for slot in Slot::REVEAL_ORDER {
            cancel(&mut self.handles.reveal[slot], &mut self.timers);
            self.handles.reveal[slot] = Some(
                self.timers
                    .schedule_once(now + timing.reveal_after(slot), TimerKind::Reveal(slot)),
            );
        }

        self.record(
            now,
            EngineEventKind::PickStarted(PickStarted {
                pool: self.pool.clone(),
            }),
        );
        Ok(Transition::Applied)
    }

    /// Fires every timer due at or before `now`, in deadline order.
    /// Returns the number of timers fired.
    pub fn advance_to(&mut self, now: Duration, rng: &mut dyn DeterministicRng) -> usize {
        let mut fired = 0;
        while let Some((id, kind, at)) = self.timers.pop_due(now) {
            fired += 1;
            match kind {
                TimerKind::Shuffle => self.apply_shuffle(id, at, rng),
                TimerKind::Flicker(slot) => self.flicker(slot, rng),
                TimerKind::Reveal(slot) => self.reveal(slot, at),
            }
        }
        fired
    }

    fn apply_shuffle(&mut self, id: TimerId, at: Duration, rng: &mut dyn DeterministicRng) {
        if self.handles.shuffle != Some(id) || self.status != EngineStatus::Shuffling {
            return;
        }
        self.handles.shuffle = None;
        selection::shuffle(&mut self.pool, rng);
        self.status = EngineStatus::Idle;
        self.record(
            at,
            EngineEventKind::PoolShuffled(PoolShuffled {
                pool: self.pool.clone(),
            }),
        );
    }

    fn flicker(&mut self, slot: Slot, rng: &mut dyn DeterministicRng) {
        if self.status != EngineStatus::Picking || self.revealed[slot] || self.pool.is_empty() {
            return;
        }
        self.spin[slot] = Some(self.pool[rng.next_index(self.pool.len())]);
    }

    fn reveal(&mut self, slot: Slot, at: Duration) {
        let Some(winners) = self.winners else {
            return;
        };
        if self.status != EngineStatus::Picking {
            return;
        }

        cancel(&mut self.handles.flicker[slot], &mut self.timers);
        self.handles.reveal[slot] = None;

        let value = winners[slot];
        self.spin[slot] = Some(value);
        self.prizes[slot] = Some(value);
        self.revealed[slot] = true;
        self.record(at, EngineEventKind::SlotRevealed(SlotRevealed { slot, value }));

        if Slot::ALL.iter().all(|&s| self.revealed[s]) {
            self.status = EngineStatus::Picked;
            self.record(at, EngineEventKind::PrizesPicked(PrizesPicked { prizes: winners }));
        }
    }

    /// Returns the payload for the results sink once all prizes are
    /// revealed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PreconditionViolated` under the strict guard
    /// policy if the engine is not in `Picked` status.
    pub fn save_results(&self) -> Result<Option<DrawResults>, EngineError> {
        if !self.guard("save_results", EngineStatus::Picked)? {
            return Ok(None);
        }
        Ok(Some(DrawResults {
            prizes: self.prizes,
            pool: self.pool.clone(),
            prize_names: self.prizes.map(|_, value| {
                value.and_then(|n| self.config.prize_name(n).map(str::to_owned))
            }),
        }))
    }

    /// Cancels every timer, restores the initial pool and clears all
    /// results. Always succeeds, from any status.
    pub fn reset(&mut self, now: Duration) -> Transition {
        let cancelled_timers = self.handles.cancel_all(&mut self.timers);
        self.pool.clone_from(&self.config.initial_pool);
        self.prizes = PerSlot::default();
        self.spin = PerSlot::default();
        self.revealed = PerSlot::default();
        self.winners = None;
        self.status = EngineStatus::Idle;
        self.record(now, EngineEventKind::EngineReset(EngineReset { cancelled_timers }));
        Transition::Applied
    }

    /// Cancels every outstanding timer without touching results. Called
    /// when the host goes away.
    pub fn teardown(&mut self) {
        self.handles.cancel_all(&mut self.timers);
    }
}
