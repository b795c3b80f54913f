use crate::domain::model::{
    CreateFightRequest, Fight, FightState, FightStatus, Monster, MonsterDraft, Player, PlayerDraft,
};
use crate::transport::http::handlers::{fights, health, monsters, players};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::routing::{delete, get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        monsters::list_monsters_handler,
        monsters::get_monster_handler,
        monsters::monsters_by_name_handler,
        monsters::create_monster_handler,
        monsters::update_monster_handler,
        monsters::delete_monster_handler,
        players::list_players_handler,
        players::get_player_handler,
        players::player_by_name_handler,
        players::create_player_handler,
        players::update_player_handler,
        players::delete_player_handler,
        players::player_monsters_handler,
        players::add_monster_handler,
        players::remove_monster_handler,
        fights::create_fight_handler,
        fights::execute_exchange_handler,
        fights::fight_state_handler
    ),
    components(schemas(
        ApiResponse,
        Monster,
        MonsterDraft,
        Player,
        PlayerDraft,
        Fight,
        FightState,
        FightStatus,
        CreateFightRequest
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/monster",
            get(monsters::list_monsters_handler).post(monsters::create_monster_handler),
        )
        .route(
            "/api/monster/:id",
            get(monsters::get_monster_handler)
                .put(monsters::update_monster_handler)
                .delete(monsters::delete_monster_handler),
        )
        .route("/api/monster/name/:name", get(monsters::monsters_by_name_handler))
        .route(
            "/api/player",
            get(players::list_players_handler).post(players::create_player_handler),
        )
        .route(
            "/api/player/:id",
            get(players::get_player_handler)
                .put(players::update_player_handler)
                .delete(players::delete_player_handler),
        )
        .route("/api/player/name/:name", get(players::player_by_name_handler))
        .route(
            "/api/player/:id/monsters",
            get(players::player_monsters_handler).post(players::add_monster_handler),
        )
        .route(
            "/api/player/:id/monsters/:monster_id",
            delete(players::remove_monster_handler),
        )
        .route("/api/fight", post(fights::create_fight_handler))
        .route(
            "/api/fight/:fight_id",
            get(fights::fight_state_handler).post(fights::execute_exchange_handler),
        )
        .with_state(app_state)
}
