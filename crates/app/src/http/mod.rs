pub mod router;
pub mod routes;

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::controller::ControlError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), HttpError> {
    let router = router::build(state);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

impl IntoResponse for ControlError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (control_status(&self), body).into_response()
    }
}

fn control_status(err: &ControlError) -> StatusCode {
    match err {
        ControlError::NotConnected => StatusCode::SERVICE_UNAVAILABLE,
        ControlError::NoPostUrls => StatusCode::BAD_REQUEST,
        ControlError::CollectionInProgress | ControlError::Session(_) => StatusCode::CONFLICT,
        ControlError::Closed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
