//! Query handlers for the selection engine.
//!
//! Turns the engine's render state into the read-only view consumed by the
//! display layer: one card per prize slot, with `?` standing in for an
//! unset value.

use serde::Serialize;
use shuffler_core::error::EngineError;
use shuffler_core::slot::{PerSlot, Slot};

use crate::application::service::EngineService;
use crate::domain::engine::{EngineStatus, SelectionEngine};

/// Placeholder shown for a slot with no value.
pub const UNSET_PLACEHOLDER: &str = "?";

/// Read-only view of one prize slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// The slot.
    pub slot: Slot,
    /// Card heading.
    pub label: &'static str,
    /// Text to render: the number, or `?`.
    pub display: String,
    /// The number being displayed, if any.
    pub value: Option<i64>,
    /// Whether the slot has been revealed in the current pick.
    pub revealed: bool,
    /// Catalog name of the revealed prize, if any.
    pub prize_name: Option<String>,
}

/// Read-only view of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineView {
    /// Current status.
    pub status: EngineStatus,
    /// Working pool in display order.
    pub pool: Vec<i64>,
    /// One entry per slot, in prize order.
    pub slots: Vec<SlotView>,
    /// Revealed winners.
    pub prizes: PerSlot<Option<i64>>,
    /// Whether the shuffle control is enabled.
    pub can_shuffle: bool,
    /// Whether the pick control is enabled.
    pub can_pick: bool,
    /// Whether the save control is enabled.
    pub can_save: bool,
}

fn label(slot: Slot) -> &'static str {
    match slot {
        Slot::First => "FIRST PRIZE",
        Slot::Second => "SECOND PRIZE",
        Slot::Third => "THIRD PRIZE",
    }
}

/// Renders a slot value, using `?` when unset.
#[must_use]
pub fn render_value(value: Option<i64>) -> String {
    value.map_or_else(|| UNSET_PLACEHOLDER.to_owned(), |n| n.to_string())
}

/// Builds the view of `engine`.
#[must_use]
pub fn view_of(engine: &SelectionEngine) -> EngineView {
    let snapshot = engine.snapshot();
    let slots = Slot::ALL
        .into_iter()
        .map(|slot| {
            let value = snapshot.display[slot];
            SlotView {
                slot,
                label: label(slot),
                display: render_value(value),
                value,
                revealed: snapshot.revealed[slot],
                prize_name: snapshot.prizes[slot]
                    .and_then(|n| engine.config().prize_name(n).map(str::to_owned)),
            }
        })
        .collect();

    EngineView {
        can_shuffle: snapshot.status == EngineStatus::Idle,
        can_pick: snapshot.status == EngineStatus::Idle && !snapshot.pool.is_empty(),
        can_save: snapshot.status == EngineStatus::Picked,
        status: snapshot.status,
        pool: snapshot.pool,
        slots,
        prizes: snapshot.prizes,
    }
}

/// Retrieves the current view of the running engine.
///
/// # Errors
///
/// Returns `EngineError::Infrastructure` if the engine lock is poisoned.
pub fn get_engine_view(service: &EngineService) -> Result<EngineView, EngineError> {
    service.read(view_of)
}
