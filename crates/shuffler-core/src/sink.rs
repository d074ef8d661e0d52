//! Results sink abstraction.
//!
//! Saving a finished draw is a fire-and-forget side effect owned by the
//! host. The engine produces the payload; a `ResultsSink` decides what to
//! do with it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::slot::PerSlot;

/// A completed draw as handed to a `ResultsSink`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedResults {
    /// Identifier of this save.
    pub draw_id: Uuid,
    /// When the results were saved.
    pub saved_at: DateTime<Utc>,
    /// The three winning numbers.
    pub prizes: PerSlot<Option<i64>>,
    /// The pool the winners were drawn from.
    pub pool: Vec<i64>,
    /// Prize names for the winning numbers, where a catalog entry exists.
    pub prize_names: PerSlot<Option<String>>,
}

/// Destination for saved draw results.
#[async_trait]
pub trait ResultsSink: Send + Sync {
    /// Persist a completed draw.
    async fn persist(&self, results: &SavedResults) -> Result<(), EngineError>;
}
