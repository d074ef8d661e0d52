//! Engine configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shuffler_core::error::EngineError;
use shuffler_core::slot::Slot;

/// Pool used when the host does not supply one.
pub const DEFAULT_POOL: [i64; 3] = [10, 20, 30];

/// Presentation timings. Only the relative order of the reveal schedule
/// matters for correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Visual delay between starting a shuffle and applying it.
    pub shuffle_delay: Duration,
    /// Offset from pick start at which the third prize is revealed.
    pub reveal_third: Duration,
    /// Offset from pick start at which the second prize is revealed.
    pub reveal_second: Duration,
    /// Offset from pick start at which the first prize is revealed.
    pub reveal_first: Duration,
    /// Flicker period of the first slot.
    pub flicker_base: Duration,
    /// Added to the flicker period for each subsequent slot.
    pub flicker_step: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            shuffle_delay: Duration::from_millis(600),
            reveal_third: Duration::from_millis(2000),
            reveal_second: Duration::from_millis(3500),
            reveal_first: Duration::from_millis(5000),
            flicker_base: Duration::from_millis(60),
            flicker_step: Duration::from_millis(30),
        }
    }
}

impl Timing {
    /// Reveal offset for `slot`, relative to pick start.
    #[must_use]
    pub fn reveal_after(&self, slot: Slot) -> Duration {
        match slot {
            Slot::First => self.reveal_first,
            Slot::Second => self.reveal_second,
            Slot::Third => self.reveal_third,
        }
    }

    /// Flicker period for `slot`.
    #[must_use]
    pub fn flicker_period(&self, slot: Slot) -> Duration {
        let steps = u32::try_from(slot.index()).unwrap_or(0);
        self.flicker_base + self.flicker_step * steps
    }

    /// Checks that the reveal schedule runs third, second, first and that
    /// flicker periods are non-zero.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` describing the first violation.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.reveal_third >= self.reveal_second || self.reveal_second >= self.reveal_first {
            return Err(EngineError::InvalidConfig(format!(
                "reveal schedule must be strictly increasing third < second < first, got {}ms / {}ms / {}ms",
                self.reveal_third.as_millis(),
                self.reveal_second.as_millis(),
                self.reveal_first.as_millis(),
            )));
        }
        if self.flicker_base.is_zero() {
            return Err(EngineError::InvalidConfig(
                "flicker period must be non-zero".to_owned(),
            ));
        }
        Ok(())
    }
}

/// How operations called in the wrong status are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardPolicy {
    /// Silently ignore the call, like a disabled button.
    #[default]
    Ignore,
    /// Reject the call with `EngineError::PreconditionViolated`.
    Strict,
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pool restored on every reset.
    pub initial_pool: Vec<i64>,
    /// Presentation timings.
    pub timing: Timing,
    /// Treatment of out-of-status calls.
    pub guard: GuardPolicy,
    /// Optional prize name for each winning number.
    pub prize_names: BTreeMap<i64, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_pool: DEFAULT_POOL.to_vec(),
            timing: Timing::default(),
            guard: GuardPolicy::default(),
            prize_names: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default timings for `initial_pool`.
    #[must_use]
    pub fn with_pool(initial_pool: Vec<i64>) -> Self {
        Self {
            initial_pool,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` if the timings are inconsistent.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.timing.validate()
    }

    /// Prize name for a winning number, if the catalog has one.
    #[must_use]
    pub fn prize_name(&self, number: i64) -> Option<&str> {
        self.prize_names.get(&number).map(String::as_str)
    }
}
