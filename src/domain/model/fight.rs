use crate::domain::model::Monster;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FightStatus {
    Ongoing,
    TeamAWon,
    TeamBWon,
}

impl FightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FightStatus::Ongoing => "ONGOING",
            FightStatus::TeamAWon => "TEAM_A_WON",
            FightStatus::TeamBWon => "TEAM_B_WON",
        }
    }

    pub fn is_finished(&self) -> bool {
        *self != FightStatus::Ongoing
    }
}

impl fmt::Display for FightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONGOING" => Ok(FightStatus::Ongoing),
            "TEAM_A_WON" => Ok(FightStatus::TeamAWon),
            "TEAM_B_WON" => Ok(FightStatus::TeamBWon),
            other => Err(format!("unknown fight status: {}", other)),
        }
    }
}

/// The two sides of a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn label(&self) -> &'static str {
        match self {
            Team::A => "Team A",
            Team::B => "Team B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fight {
    pub id: Uuid,
    pub team_a: Vec<Monster>,
    pub team_b: Vec<Monster>,
    pub active_monster_a: Uuid,
    pub active_monster_b: Uuid,
    pub status: FightStatus,
}

impl Fight {
    pub fn team(&self, team: Team) -> &[Monster] {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    pub fn active(&self, team: Team) -> Uuid {
        match team {
            Team::A => self.active_monster_a,
            Team::B => self.active_monster_b,
        }
    }

    pub fn state(&self) -> FightState {
        FightState {
            fight_id: self.id,
            active_monster_a: self.active_monster_a,
            active_monster_b: self.active_monster_b,
            team_a: self.team_a.clone(),
            team_b: self.team_b.clone(),
            status: self.status,
        }
    }
}

/// Snapshot of a fight returned after each exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FightState {
    pub fight_id: Uuid,
    pub active_monster_a: Uuid,
    pub active_monster_b: Uuid,
    pub team_a: Vec<Monster>,
    pub team_b: Vec<Monster>,
    pub status: FightStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFightRequest {
    #[serde(default)]
    pub team_a: Option<Vec<Uuid>>,
    #[serde(default)]
    pub team_b: Option<Vec<Uuid>>,
}
