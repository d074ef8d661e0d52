//! Test sinks — mock `ResultsSink` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use shuffler_core::error::EngineError;
use shuffler_core::sink::{ResultsSink, SavedResults};

/// A results sink that records every persisted draw and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingResultsSink {
    saved: Mutex<Vec<SavedResults>>,
}

impl RecordingResultsSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all persisted draws.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved(&self) -> Vec<SavedResults> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultsSink for RecordingResultsSink {
    async fn persist(&self, results: &SavedResults) -> Result<(), EngineError> {
        self.saved.lock().unwrap().push(results.clone());
        Ok(())
    }
}

/// A results sink that always fails. Useful for testing that a failed save
/// leaves the engine untouched.
#[derive(Debug)]
pub struct FailingResultsSink;

#[async_trait]
impl ResultsSink for FailingResultsSink {
    async fn persist(&self, _results: &SavedResults) -> Result<(), EngineError> {
        Err(EngineError::Persistence("sink unavailable".into()))
    }
}
