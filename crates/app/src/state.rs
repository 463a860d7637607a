use std::sync::Arc;

use reqwest::Client;

use crate::config::AppConfig;
use crate::controller::ControllerHandle;
use giveaway_infra::reddit::RedditClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http_client: Client,
    pub controller: ControllerHandle<RedditClient>,
}
