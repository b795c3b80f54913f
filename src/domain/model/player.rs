use crate::domain::model::{is_valid_name, Monster, MonsterDraft};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A player and the monsters it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub monster_box: Vec<Monster>,
}

impl Player {
    pub fn from_draft(draft: &PlayerDraft) -> Result<Self, GameError> {
        let name = draft.validated_name()?;
        let monster_box = draft
            .monster_box
            .iter()
            .map(Monster::from_draft)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            monster_box,
        })
    }

    /// Removes a monster from the box, returning it if it was there.
    pub fn take_monster(&mut self, monster_id: Uuid) -> Option<Monster> {
        let idx = self.monster_box.iter().position(|m| m.id == monster_id)?;
        Some(self.monster_box.remove(idx))
    }
}

/// Request body for creating or renaming a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    #[serde(default)]
    pub name: Option<String>,
    /// Only honoured on creation; renames leave the box untouched.
    #[serde(default)]
    pub monster_box: Vec<MonsterDraft>,
}

impl PlayerDraft {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            monster_box: Vec::new(),
        }
    }

    pub fn validated_name(&self) -> Result<String, GameError> {
        let name = match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => {
                return Err(GameError::InvalidInput(
                    "Player name cannot be null or empty".to_string(),
                ))
            }
        };
        if !is_valid_name(name) {
            return Err(GameError::InvalidInput(
                "Player name may only contain letters, digits and spaces".to_string(),
            ));
        }
        Ok(name.to_string())
    }
}
