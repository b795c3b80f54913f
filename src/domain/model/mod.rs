//! Domain model definitions for monsters, players and fights.

pub mod fight;
pub mod monster;
pub mod player;

pub use fight::{CreateFightRequest, Fight, FightState, FightStatus, Team};
pub use monster::{Monster, MonsterDraft};
pub use player::{Player, PlayerDraft};

/// Names (of monsters and players) may only contain ASCII letters, digits and spaces.
pub fn is_valid_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ')
}
