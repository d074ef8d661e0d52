//! Command handlers for the selection engine.
//!
//! Each handler forwards the command to the running `EngineService` and
//! records the outcome at debug level under the command's correlation ID.

use shuffler_core::command::Command;
use shuffler_core::error::EngineError;
use shuffler_core::sink::SavedResults;
use tracing::debug;

use crate::application::service::EngineService;
use crate::domain::commands::{PickPrizes, Reset, SaveResults, ShuffleDisplay};
use crate::domain::engine::Transition;

fn log_transition(command: &dyn Command, transition: Transition) {
    debug!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        ?transition,
        "command handled"
    );
}

/// Handles the `ShuffleDisplay` command.
///
/// # Errors
///
/// Returns `EngineError::PreconditionViolated` under the strict guard
/// policy if the engine is busy.
pub fn handle_shuffle_display(
    command: &ShuffleDisplay,
    service: &EngineService,
) -> Result<Transition, EngineError> {
    let transition = service.shuffle_display()?;
    log_transition(command, transition);
    Ok(transition)
}

/// Handles the `PickPrizes` command.
///
/// # Errors
///
/// Returns `EngineError::EmptyPool` if there is nothing to draw from, or
/// `EngineError::PreconditionViolated` under the strict guard policy.
pub fn handle_pick_prizes(
    command: &PickPrizes,
    service: &EngineService,
) -> Result<Transition, EngineError> {
    let transition = service.pick_prizes()?;
    log_transition(command, transition);
    Ok(transition)
}

/// Handles the `SaveResults` command. Returns the saved draw, or `None`
/// if the prizes have not been picked yet.
///
/// # Errors
///
/// Returns `EngineError::Persistence` if the results sink fails.
pub async fn handle_save_results(
    command: &SaveResults,
    service: &EngineService,
) -> Result<Option<SavedResults>, EngineError> {
    let saved = service.save_results().await?;
    let transition = if saved.is_some() {
        Transition::Applied
    } else {
        Transition::Ignored
    };
    log_transition(command, transition);
    Ok(saved)
}

/// Handles the `Reset` command.
///
/// # Errors
///
/// Returns `EngineError::Infrastructure` if the engine lock is poisoned.
pub fn handle_reset(command: &Reset, service: &EngineService) -> Result<Transition, EngineError> {
    let transition = service.reset()?;
    log_transition(command, transition);
    Ok(transition)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use shuffler_test_support::{FixedClock, MockRng, RecordingResultsSink};
    use uuid::Uuid;

    use super::*;
    use crate::domain::config::{EngineConfig, GuardPolicy};
    use crate::domain::engine::EngineStatus;

    fn service(config: EngineConfig, sink: Arc<RecordingResultsSink>) -> EngineService {
        EngineService::spawn(
            config,
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())),
            Box::new(MockRng),
            sink,
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_draw_through_handlers() {
        let sink = Arc::new(RecordingResultsSink::new());
        let service = service(EngineConfig::default(), sink.clone());

        let shuffle = ShuffleDisplay { correlation_id: Uuid::new_v4() };
        assert_eq!(handle_shuffle_display(&shuffle, &service).unwrap(), Transition::Applied);
        tokio::time::sleep(Duration::from_millis(600)).await;

        let pick = PickPrizes { correlation_id: Uuid::new_v4() };
        assert_eq!(handle_pick_prizes(&pick, &service).unwrap(), Transition::Applied);
        tokio::time::sleep(Duration::from_millis(5000)).await;

        let save = SaveResults { correlation_id: Uuid::new_v4() };
        let saved = handle_save_results(&save, &service).await.unwrap();
        assert!(saved.is_some());
        assert_eq!(sink.saved().len(), 1);

        let reset = Reset { correlation_id: Uuid::new_v4() };
        assert_eq!(handle_reset(&reset, &service).unwrap(), Transition::Applied);
        assert_eq!(service.snapshot().unwrap().status, EngineStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_while_picking_is_ignored() {
        let service = service(EngineConfig::default(), Arc::new(RecordingResultsSink::new()));
        let pick = PickPrizes { correlation_id: Uuid::new_v4() };

        handle_pick_prizes(&pick, &service).unwrap();
        assert_eq!(handle_pick_prizes(&pick, &service).unwrap(), Transition::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_guard_surfaces_precondition_errors() {
        let config = EngineConfig {
            guard: GuardPolicy::Strict,
            ..EngineConfig::default()
        };
        let service = service(config, Arc::new(RecordingResultsSink::new()));
        let save = SaveResults { correlation_id: Uuid::new_v4() };

        let err = handle_save_results(&save, &service).await.unwrap_err();
        assert!(matches!(err, EngineError::PreconditionViolated { .. }));
    }
}
