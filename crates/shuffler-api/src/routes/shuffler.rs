//! Routes for the selection engine.

use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;
use shuffler_core::sink::SavedResults;
use tracing::{info, instrument};
use uuid::Uuid;

use shuffler_engine::application::command_handlers;
use shuffler_engine::application::query_handlers::{self, EngineView};
use shuffler_engine::domain::commands;
use shuffler_engine::domain::engine::Transition;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body returned after a control command is handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Whether the command changed engine state.
    pub outcome: Transition,
    /// The engine view right after the command.
    pub view: EngineView,
}

/// Response body returned by POST /save.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    /// Whether anything was saved.
    pub outcome: Transition,
    /// The saved draw, if any.
    pub results: Option<SavedResults>,
    /// Acknowledgement for the user.
    pub message: &'static str,
}

fn respond(state: &AppState, outcome: Transition) -> Result<Json<CommandResponse>, ApiError> {
    let view = query_handlers::get_engine_view(&state.engine)?;
    Ok(Json(CommandResponse { outcome, view }))
}

/// GET /
#[instrument(skip(state))]
async fn get_view(State(state): State<AppState>) -> Result<Json<EngineView>, ApiError> {
    Ok(Json(query_handlers::get_engine_view(&state.engine)?))
}

/// POST /shuffle
#[instrument(skip(state))]
async fn shuffle_display(
    State(state): State<AppState>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ShuffleDisplay {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling shuffle_display command");

    let outcome = command_handlers::handle_shuffle_display(&command, &state.engine)?;
    respond(&state, outcome)
}

/// POST /pick
#[instrument(skip(state))]
async fn pick_prizes(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::PickPrizes {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling pick_prizes command");

    let outcome = command_handlers::handle_pick_prizes(&command, &state.engine)?;
    respond(&state, outcome)
}

/// POST /save
#[instrument(skip(state))]
async fn save_results(State(state): State<AppState>) -> Result<Json<SaveResponse>, ApiError> {
    let command = commands::SaveResults {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling save_results command");

    let results = command_handlers::handle_save_results(&command, &state.engine).await?;
    let response = match results {
        Some(results) => SaveResponse {
            outcome: Transition::Applied,
            results: Some(results),
            message: "Results saved.",
        },
        None => SaveResponse {
            outcome: Transition::Ignored,
            results: None,
            message: "Nothing to save until prizes are picked.",
        },
    };
    Ok(Json(response))
}

/// POST /reset
#[instrument(skip(state))]
async fn reset(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::Reset {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling reset command");

    let outcome = command_handlers::handle_reset(&command, &state.engine)?;
    respond(&state, outcome)
}

/// Returns the router for the selection engine.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_view))
        .route("/shuffle", post(shuffle_display))
        .route("/pick", post(pick_prizes))
        .route("/save", post(save_results))
        .route("/reset", post(reset))
}
