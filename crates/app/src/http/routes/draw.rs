use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::controller::ControlError;
use crate::state::AppState;
use giveaway_core::domain::draw::DrawResult;

#[derive(Debug, Default, Deserialize)]
pub struct DrawRequest {
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DrawResponse {
    seed: Option<u64>,
    summary: String,
    #[serde(flatten)]
    result: DrawResult,
}

pub async fn post_draw(
    State(state): State<AppState>,
    request: Option<Json<DrawRequest>>,
) -> Result<Json<DrawResponse>, ControlError> {
    let seed = request.and_then(|Json(request)| request.seed);
    let result = state.controller.draw(seed).await?;
    Ok(Json(DrawResponse {
        seed,
        summary: result.summary(),
        result,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::DrawResponse;
    use giveaway_core::domain::draw::{DrawResult, Pairing};

    #[test]
    fn draw_response_flattens_result() {
        let result = DrawResult {
            pairings: vec![Pairing {
                winner: "bob".to_string(),
                item: "Poster".to_string(),
            }],
            leftover_users: Default::default(),
            leftover_items: vec!["Pin".to_string()],
        };
        let response = DrawResponse {
            seed: Some(3),
            summary: result.summary(),
            result,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "seed": 3,
                "summary": "Giveaway complete! 1 winner(s) drawn. 1 items were not awarded.",
                "pairings": [{ "winner": "bob", "item": "Poster" }],
                "leftover_users": [],
                "leftover_items": ["Pin"]
            })
        );
    }
}
