pub mod fight_service;
pub mod monster_service;
pub mod player_service;

pub use fight_service::FightService;
pub use monster_service::MonsterService;
pub use player_service::PlayerService;
