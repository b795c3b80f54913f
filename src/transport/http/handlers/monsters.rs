use crate::domain::model::{Monster, MonsterDraft};
use crate::error::GameError;
use crate::transport::http::types::{json_body, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

const MONSTER_BODY: &str = r#"{"name": "...", "attack": 0, "defence": 0, "health": 1}"#;

#[utoipa::path(
    get,
    path = "/api/monster",
    responses((status = 200, description = "All monsters", body = [Monster]))
)]
pub async fn list_monsters_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Monster>>, GameError> {
    Ok(Json(state.monster_service.get_all_monsters().await?))
}

#[utoipa::path(
    get,
    path = "/api/monster/{id}",
    params(("id" = Uuid, Path, description = "Monster id")),
    responses(
        (status = 200, description = "Monster found", body = Monster),
        (status = 404, description = "No monster with this id", body = ApiResponse)
    )
)]
pub async fn get_monster_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Monster>, GameError> {
    state
        .monster_service
        .get_monster_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| GameError::not_found("Monster", id))
}

#[utoipa::path(
    get,
    path = "/api/monster/name/{name}",
    params(("name" = String, Path, description = "Exact monster name")),
    responses((status = 200, description = "Monsters with this name", body = [Monster]))
)]
pub async fn monsters_by_name_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Monster>>, GameError> {
    Ok(Json(state.monster_service.get_monsters_by_name(&name).await?))
}

#[utoipa::path(
    post,
    path = "/api/monster",
    request_body = MonsterDraft,
    responses(
        (status = 201, description = "Monster created", body = Monster),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_monster_handler(
    State(state): State<AppState>,
    request: Result<Json<MonsterDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Monster>), GameError> {
    let draft = json_body(request, MONSTER_BODY)?;
    let monster = state.monster_service.create_monster(&draft).await?;
    Ok((StatusCode::CREATED, Json(monster)))
}

#[utoipa::path(
    put,
    path = "/api/monster/{id}",
    params(("id" = Uuid, Path, description = "Monster id")),
    request_body = MonsterDraft,
    responses(
        (status = 200, description = "Monster updated", body = Monster),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 404, description = "No monster with this id", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn update_monster_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Result<Json<MonsterDraft>, JsonRejection>,
) -> Result<Json<Monster>, GameError> {
    let draft = json_body(request, MONSTER_BODY)?;
    Ok(Json(state.monster_service.update_monster(id, &draft).await?))
}

#[utoipa::path(
    delete,
    path = "/api/monster/{id}",
    params(("id" = Uuid, Path, description = "Monster id")),
    responses(
        (status = 204, description = "Monster deleted"),
        (status = 404, description = "No monster with this id", body = ApiResponse),
        (status = 409, description = "Monster is still part of a fight", body = ApiResponse)
    )
)]
pub async fn delete_monster_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, GameError> {
    state.monster_service.delete_monster(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
