use crate::domain::model::{Monster, MonsterDraft, Player, PlayerDraft};
use crate::error::GameError;
use crate::transport::http::types::{json_body, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

const PLAYER_BODY: &str = r#"{"name": "...", "monsterBox": [...]}"#;
const MONSTER_BODY: &str = r#"{"name": "...", "attack": 0, "defence": 0, "health": 1}"#;

#[utoipa::path(
    get,
    path = "/api/player",
    responses((status = 200, description = "All players", body = [Player]))
)]
pub async fn list_players_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Player>>, GameError> {
    Ok(Json(state.player_service.get_all_players().await?))
}

#[utoipa::path(
    get,
    path = "/api/player/{id}",
    params(("id" = Uuid, Path, description = "Player id")),
    responses(
        (status = 200, description = "Player found", body = Player),
        (status = 404, description = "No player with this id", body = ApiResponse)
    )
)]
pub async fn get_player_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Player>, GameError> {
    state
        .player_service
        .get_player_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| GameError::not_found("Player", id))
}

#[utoipa::path(
    get,
    path = "/api/player/name/{name}",
    params(("name" = String, Path, description = "Player name")),
    responses(
        (status = 200, description = "Player found", body = Player),
        (status = 404, description = "No player with this name", body = ApiResponse)
    )
)]
pub async fn player_by_name_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Player>, GameError> {
    match state.player_service.get_player_by_name(&name).await? {
        Some(player) => Ok(Json(player)),
        None => Err(GameError::PlayerNameNotFound(name)),
    }
}

#[utoipa::path(
    post,
    path = "/api/player",
    request_body = PlayerDraft,
    responses(
        (status = 201, description = "Player created", body = Player),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 409, description = "Name already taken", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_player_handler(
    State(state): State<AppState>,
    request: Result<Json<PlayerDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Player>), GameError> {
    let draft = json_body(request, PLAYER_BODY)?;
    let player = state.player_service.create_player(&draft).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

#[utoipa::path(
    put,
    path = "/api/player/{id}",
    params(("id" = Uuid, Path, description = "Player id")),
    request_body = PlayerDraft,
    responses(
        (status = 200, description = "Player renamed", body = Player),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 404, description = "No player with this id", body = ApiResponse),
        (status = 409, description = "Name already taken", body = ApiResponse)
    )
)]
pub async fn update_player_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Result<Json<PlayerDraft>, JsonRejection>,
) -> Result<Json<Player>, GameError> {
    let draft = json_body(request, PLAYER_BODY)?;
    Ok(Json(state.player_service.update_player(id, &draft).await?))
}

#[utoipa::path(
    delete,
    path = "/api/player/{id}",
    params(("id" = Uuid, Path, description = "Player id")),
    responses(
        (status = 204, description = "Player and its monster box deleted"),
        (status = 404, description = "No player with this id", body = ApiResponse),
        (status = 409, description = "A boxed monster is still part of a fight", body = ApiResponse)
    )
)]
pub async fn delete_player_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, GameError> {
    state.player_service.delete_player(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/player/{id}/monsters",
    params(("id" = Uuid, Path, description = "Player id")),
    responses(
        (status = 200, description = "The player's monster box", body = [Monster]),
        (status = 404, description = "No player with this id", body = ApiResponse)
    )
)]
pub async fn player_monsters_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Monster>>, GameError> {
    Ok(Json(state.player_service.get_player_monsters(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/player/{id}/monsters",
    params(("id" = Uuid, Path, description = "Player id")),
    request_body = MonsterDraft,
    responses(
        (status = 200, description = "Monster added to the box", body = Player),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 404, description = "No player with this id", body = ApiResponse)
    )
)]
pub async fn add_monster_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Result<Json<MonsterDraft>, JsonRejection>,
) -> Result<Json<Player>, GameError> {
    let draft = json_body(request, MONSTER_BODY)?;
    Ok(Json(
        state.player_service.add_monster_to_player(id, &draft).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/player/{id}/monsters/{monster_id}",
    params(
        ("id" = Uuid, Path, description = "Player id"),
        ("monster_id" = Uuid, Path, description = "Monster id")
    ),
    responses(
        (status = 200, description = "Monster removed from the box", body = Player),
        (status = 404, description = "Player missing or monster not in its box", body = ApiResponse)
    )
)]
pub async fn remove_monster_handler(
    State(state): State<AppState>,
    Path((id, monster_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Player>, GameError> {
    Ok(Json(
        state
            .player_service
            .remove_monster_from_player(id, monster_id)
            .await?,
    ))
}
