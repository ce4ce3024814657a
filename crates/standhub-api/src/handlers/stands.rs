//! Stand REST handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;

use standhub_core::error::AppError;
use standhub_core::traits::StandUpdater;
use standhub_core::types::StandSnapshot;
use standhub_realtime::PatchCommand;
use standhub_realtime::message::validator::validate_patch;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /stands
pub async fn list_stands(State(state): State<AppState>) -> Result<Json<StandSnapshot>, ApiError> {
    Ok(Json(state.service.list_stands().await?))
}

/// PATCH /stands
///
/// Body is the same `{id, updateData}` object a websocket `PATCH` carries.
pub async fn patch_stand(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let command: PatchCommand = serde_json::from_slice(&body)
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;
    let patch = validate_patch(command).map_err(|e| AppError::validation(e.to_string()))?;

    state.service.update_stand(&patch.id, &patch.update).await?;
    Ok(StatusCode::NO_CONTENT)
}
