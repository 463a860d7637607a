use axum::extract::State;
use axum::Json;

use crate::controller::{ControlError, SessionStatus};
use crate::state::AppState;

pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<SessionStatus>, ControlError> {
    Ok(Json(state.controller.status().await?))
}
