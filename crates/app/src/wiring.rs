use std::sync::Arc;

use reqwest::redirect::Policy;
use reqwest::Client;
use thiserror::Error;

use crate::config::AppConfig;
use crate::controller;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Builds shared state and starts the session controller task.
pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    // Redirects are surfaced to the reddit client, which treats them as
    // non-submission urls.
    let client = Client::builder()
        .timeout(config.request_timeout)
        .redirect(Policy::none())
        .build()?;
    let controller = controller::spawn();
    Ok(AppState {
        config: Arc::new(config),
        http_client: client,
        controller,
    })
}
