use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::controller::ControlError;
use crate::state::AppState;
use giveaway_core::types::lines::parse_lines;

#[derive(Debug, Deserialize)]
pub struct ItemsRequest {
    /// One item per line; blank lines are ignored.
    #[serde(default)]
    pub items: String,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    loaded: usize,
}

pub async fn put_items(
    State(state): State<AppState>,
    Json(request): Json<ItemsRequest>,
) -> Result<Json<ItemsResponse>, ControlError> {
    let loaded = state
        .controller
        .load_items(parse_lines(&request.items))
        .await?;
    Ok(Json(ItemsResponse { loaded }))
}
