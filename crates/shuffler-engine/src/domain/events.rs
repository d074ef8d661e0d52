//! Domain events emitted by the selection engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shuffler_core::event::DomainEvent;
use shuffler_core::slot::{PerSlot, Slot};

/// Emitted when a shuffle starts its visual delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleStarted {
    /// When the shuffled pool will be applied, in engine time.
    pub applies_at_ms: u64,
}

/// Emitted when the shuffled order is applied to the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolShuffled {
    /// The pool in its new order.
    pub pool: Vec<i64>,
}

/// Emitted when a pick begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickStarted {
    /// The pool the winners are drawn from.
    pub pool: Vec<i64>,
}

/// Emitted when one slot freezes on its winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRevealed {
    /// The slot that was revealed.
    pub slot: Slot,
    /// The winning number.
    pub value: i64,
}

/// Emitted when the last slot is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizesPicked {
    /// The three winners.
    pub prizes: PerSlot<i64>,
}

/// Emitted when the engine is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReset {
    /// Number of outstanding timers that were cancelled.
    pub cancelled_timers: usize,
}

/// Event payload variants for the selection engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEventKind {
    /// A shuffle has started.
    ShuffleStarted(ShuffleStarted),
    /// The pool has been shuffled.
    PoolShuffled(PoolShuffled),
    /// A pick has started.
    PickStarted(PickStarted),
    /// A slot has been revealed.
    SlotRevealed(SlotRevealed),
    /// All prizes have been revealed.
    PrizesPicked(PrizesPicked),
    /// The engine has been reset.
    EngineReset(EngineReset),
}

/// Domain event envelope for the selection engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    /// Engine time at which the event occurred.
    pub occurred_at: Duration,
    /// Event-specific payload.
    pub kind: EngineEventKind,
}

impl DomainEvent for EngineEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            EngineEventKind::ShuffleStarted(_) => "shuffler.shuffle_started",
            EngineEventKind::PoolShuffled(_) => "shuffler.pool_shuffled",
            EngineEventKind::PickStarted(_) => "shuffler.pick_started",
            EngineEventKind::SlotRevealed(_) => "shuffler.slot_revealed",
            EngineEventKind::PrizesPicked(_) => "shuffler.prizes_picked",
            EngineEventKind::EngineReset(_) => "shuffler.engine_reset",
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("EngineEventKind serialization is infallible")
    }
}
