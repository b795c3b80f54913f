use crate::app::{FightService, MonsterService, PlayerService};
use crate::error::GameError;
use crate::storage::{Repositories, Store};
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub monster_service: MonsterService,
    pub player_service: PlayerService,
    pub fight_service: FightService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(repos: Repositories) -> Self {
        Self {
            monster_service: MonsterService::new(repos.monsters.clone()),
            player_service: PlayerService::new(repos.players.clone()),
            fight_service: FightService::new(repos.fights.clone(), repos.monsters.clone()),
            store: repos.store,
        }
    }
}

/// Envelope used for health reports and every error body.
#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(ApiResponse::failure(self.user_message()))).into_response()
    }
}

/// Unwraps a JSON body, turning axum's rejection into a 422 `GameError`.
pub fn json_body<T>(
    request: Result<Json<T>, JsonRejection>,
    expected: &str,
) -> Result<T, GameError> {
    match request {
        Ok(Json(body)) => Ok(body),
        Err(e) => Err(GameError::MalformedBody(format!(
            "Invalid JSON body: {} (expected: {})",
            e, expected
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    #[tokio::test]
    async fn errors_render_the_failure_envelope() {
        let id = Uuid::nil();
        let response = GameError::not_found("Monster", id).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": format!("Monster not found with id: {}", id)
            })
        );
    }
}
