use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::controller::ControlError;
use crate::state::AppState;
use giveaway_core::types::post_url::PostUrl;

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    /// One post url per line; blank lines are ignored.
    #[serde(default)]
    pub urls: String,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    started: bool,
    urls: usize,
}

#[derive(Debug, Serialize)]
pub struct CommentersResponse {
    count: usize,
    names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    removed: usize,
}

/// Starts a background collection. `/v1/status` reports `collecting` while it
/// runs and the per-post outcomes under `last_collection` once it is merged.
pub async fn post_fetch(
    State(state): State<AppState>,
    Json(request): Json<FetchRequest>,
) -> Result<(StatusCode, Json<FetchResponse>), ControlError> {
    let urls = PostUrl::parse_list(&request.urls);
    let count = urls.len();
    state.controller.collect(urls).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(FetchResponse {
            started: true,
            urls: count,
        }),
    ))
}

pub async fn get_commenters(
    State(state): State<AppState>,
) -> Result<Json<CommentersResponse>, ControlError> {
    let names = state.controller.commenters().await?;
    Ok(Json(CommentersResponse {
        count: names.len(),
        names,
    }))
}

pub async fn delete_commenters(
    State(state): State<AppState>,
) -> Result<Json<ResetResponse>, ControlError> {
    let removed = state.controller.reset_commenters().await?;
    Ok(Json(ResetResponse { removed }))
}
