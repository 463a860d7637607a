use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::http::routes::{commenters, draw, health, items, reddit, status};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let cors = build_cors(&state.config.cors_allow_origins);
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/v1/status", get(status::get_status))
        .route("/v1/reddit/connect", post(reddit::post_connect))
        .route(
            "/v1/commenters",
            get(commenters::get_commenters).delete(commenters::delete_commenters),
        )
        .route("/v1/commenters/fetch", post(commenters::post_fetch))
        .route("/v1/items", put(items::put_items))
        .route("/v1/draw", post(draw::post_draw))
        .with_state(state);
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}

fn build_cors(allowed: &[String]) -> Option<CorsLayer> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    if allowed.iter().any(|origin| is_wildcard_origin(origin)) {
        return Some(
            CorsLayer::new()
                .allow_methods(methods)
                .allow_origin(Any)
                .allow_headers(Any),
        );
    }
    let origins = parse_origins(allowed);
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_methods(methods)
            .allow_origin(AllowOrigin::list(origins))
            .allow_headers([CONTENT_TYPE]),
    )
}

fn parse_origins(allowed: &[String]) -> Vec<HeaderValue> {
    allowed
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "invalid CORS origin ignored");
                None
            }
        })
        .collect()
}

fn is_wildcard_origin(origin: &str) -> bool {
    origin.trim() == "*"
}
