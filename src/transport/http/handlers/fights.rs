use crate::domain::model::{CreateFightRequest, Fight, FightState};
use crate::error::GameError;
use crate::transport::http::types::{json_body, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/fight",
    request_body = CreateFightRequest,
    responses(
        (status = 201, description = "Fight created", body = Fight),
        (status = 400, description = "Invalid teams", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_fight_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateFightRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Fight>), GameError> {
    let request = json_body(request, r#"{"teamA": [uuid, ...], "teamB": [uuid, ...]}"#)?;
    let fight = state.fight_service.create_fight(&request).await?;
    Ok((StatusCode::CREATED, Json(fight)))
}

#[utoipa::path(
    post,
    path = "/api/fight/{fight_id}",
    params(("fight_id" = Uuid, Path, description = "Fight id")),
    responses(
        (status = 200, description = "State after one exchange", body = FightState),
        (status = 404, description = "No fight with this id", body = ApiResponse)
    )
)]
pub async fn execute_exchange_handler(
    State(state): State<AppState>,
    Path(fight_id): Path<Uuid>,
) -> Result<Json<FightState>, GameError> {
    Ok(Json(state.fight_service.execute_exchange(fight_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/fight/{fight_id}",
    params(("fight_id" = Uuid, Path, description = "Fight id")),
    responses(
        (status = 200, description = "Current fight state", body = FightState),
        (status = 404, description = "No fight with this id", body = ApiResponse)
    )
)]
pub async fn fight_state_handler(
    State(state): State<AppState>,
    Path(fight_id): Path<Uuid>,
) -> Result<Json<FightState>, GameError> {
    Ok(Json(state.fight_service.get_fight_state(fight_id).await?))
}
