use crate::domain::model::is_valid_name;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A monster as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub id: Uuid,
    pub name: String,
    pub attack: i32,
    pub defence: i32,
    pub health: i32,
}

impl Monster {
    /// Validates the draft and builds a monster with a fresh id.
    pub fn from_draft(draft: &MonsterDraft) -> Result<Self, GameError> {
        let (name, attack, defence, health) = draft.validated()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            attack,
            defence,
            health,
        })
    }

    /// Overwrites every mutable stat with the draft's values.
    pub fn apply(&mut self, draft: &MonsterDraft) -> Result<(), GameError> {
        let (name, attack, defence, health) = draft.validated()?;
        self.name = name;
        self.attack = attack;
        self.defence = defence;
        self.health = health;
        Ok(())
    }

    pub fn is_healthy(&self) -> bool {
        self.health > 0
    }
}

/// Request body for creating or replacing a monster.
///
/// Every field is optional on the wire so that a missing field is reported as a
/// validation error rather than a JSON rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonsterDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attack: Option<i32>,
    #[serde(default)]
    pub defence: Option<i32>,
    #[serde(default)]
    pub health: Option<i32>,
}

impl MonsterDraft {
    pub fn new(name: &str, attack: i32, defence: i32, health: i32) -> Self {
        Self {
            name: Some(name.to_string()),
            attack: Some(attack),
            defence: Some(defence),
            health: Some(health),
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        self.validated().map(|_| ())
    }

    fn validated(&self) -> Result<(String, i32, i32, i32), GameError> {
        let name = match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => return Err(invalid("Monster name cannot be null or empty")),
        };
        if !is_valid_name(name) {
            return Err(invalid(
                "Monster name may only contain letters, digits and spaces",
            ));
        }
        let attack = match self.attack {
            Some(a) if a >= 0 => a,
            _ => return Err(invalid("Monster attack must be non-negative")),
        };
        let defence = match self.defence {
            Some(d) if d >= 0 => d,
            _ => return Err(invalid("Monster defence must be non-negative")),
        };
        let health = match self.health {
            Some(h) if h > 0 => h,
            _ => return Err(invalid("Monster health must be positive")),
        };
        Ok((name.to_string(), attack, defence, health))
    }
}

fn invalid(message: &str) -> GameError {
    GameError::InvalidInput(message.to_string())
}
