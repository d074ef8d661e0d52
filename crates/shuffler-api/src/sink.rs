//! Default results sink: writes the saved draw to the log.

use async_trait::async_trait;
use shuffler_core::error::EngineError;
use shuffler_core::sink::{ResultsSink, SavedResults};
use tracing::info;

/// A results sink that records each saved draw as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogResultsSink;

#[async_trait]
impl ResultsSink for LogResultsSink {
    async fn persist(&self, results: &SavedResults) -> Result<(), EngineError> {
        let payload = serde_json::to_string(results)
            .map_err(|e| EngineError::Persistence(format!("results serialization failed: {e}")))?;
        info!(
            draw_id = %results.draw_id,
            saved_at = %results.saved_at,
            results = %payload,
            "save results"
        );
        Ok(())
    }
}
