use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::controller::ControlError;
use crate::http::ErrorBody;
use crate::state::AppState;
use giveaway_infra::reddit::{RedditClient, RedditCredentials, RedditError};

#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    connected: bool,
}

#[derive(Debug, Error)]
pub enum ConnectApiError {
    #[error("reddit credentials are required")]
    MissingCredentials,
    #[error("reddit error: {0}")]
    Reddit(#[from] RedditError),
    #[error("{0}")]
    Control(#[from] ControlError),
}

pub async fn post_connect(
    State(state): State<AppState>,
    request: Option<Json<ConnectRequest>>,
) -> Result<Json<ConnectResponse>, ConnectApiError> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let credentials = resolve_credentials(request, state.config.reddit.as_ref())?;
    let client = RedditClient::new(state.http_client.clone(), credentials);
    if let Err(err) = client.verify().await {
        warn!(error = %err, "reddit connection failed");
        state.controller.disconnect().await?;
        return Err(err.into());
    }
    state.controller.connect(client).await?;
    Ok(Json(ConnectResponse { connected: true }))
}

/// Uses the request's credentials when it carries any, the configured ones
/// otherwise.
fn resolve_credentials(
    request: ConnectRequest,
    configured: Option<&RedditCredentials>,
) -> Result<RedditCredentials, ConnectApiError> {
    match (request.client_id, request.client_secret, request.user_agent) {
        (None, None, None) => configured
            .cloned()
            .ok_or(ConnectApiError::MissingCredentials),
        (client_id, client_secret, user_agent) => Ok(RedditCredentials::new(
            client_id.as_deref().unwrap_or_default(),
            client_secret.as_deref().unwrap_or_default(),
            user_agent.as_deref().unwrap_or_default(),
        )?),
    }
}

impl IntoResponse for ConnectApiError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        let status = match self {
            ConnectApiError::Control(err) => return err.into_response(),
            ConnectApiError::MissingCredentials
            | ConnectApiError::Reddit(RedditError::MissingCredentials(_)) => {
                StatusCode::BAD_REQUEST
            }
            ConnectApiError::Reddit(RedditError::OAuth(_)) => StatusCode::UNAUTHORIZED,
            ConnectApiError::Reddit(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
