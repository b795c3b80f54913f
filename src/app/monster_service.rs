use crate::domain::model::{Monster, MonsterDraft};
use crate::error::GameError;
use crate::storage::{MonsterRepository, StorageError};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct MonsterService {
    monsters: Arc<dyn MonsterRepository>,
}

impl MonsterService {
    pub fn new(monsters: Arc<dyn MonsterRepository>) -> Self {
        Self { monsters }
    }

    pub async fn get_all_monsters(&self) -> Result<Vec<Monster>, GameError> {
        Ok(self.monsters.find_all().await?)
    }

    pub async fn get_monster_by_id(&self, id: Uuid) -> Result<Option<Monster>, GameError> {
        Ok(self.monsters.find_by_id(id).await?)
    }

    pub async fn get_monsters_by_name(&self, name: &str) -> Result<Vec<Monster>, GameError> {
        Ok(self.monsters.find_by_name(name).await?)
    }

    pub async fn create_monster(&self, draft: &MonsterDraft) -> Result<Monster, GameError> {
        let monster = Monster::from_draft(draft)?;
        let saved = self.monsters.save(&monster).await?;
        tracing::info!(monster_id = %saved.id, name = %saved.name, "monster created");
        Ok(saved)
    }

    pub async fn update_monster(
        &self,
        id: Uuid,
        draft: &MonsterDraft,
    ) -> Result<Monster, GameError> {
        let mut monster = self
            .monsters
            .find_by_id(id)
            .await?
            .ok_or_else(|| GameError::not_found("Monster", id))?;
        monster.apply(draft)?;
        Ok(self.monsters.save(&monster).await?)
    }

    pub async fn delete_monster(&self, id: Uuid) -> Result<(), GameError> {
        if !self.monsters.exists_by_id(id).await? {
            return Err(GameError::not_found("Monster", id));
        }
        match self.monsters.delete_by_id(id).await {
            Ok(()) => {
                tracing::info!(monster_id = %id, "monster deleted");
                Ok(())
            }
            Err(StorageError::ForeignKeyViolation { .. }) => Err(GameError::InUse { id }),
            Err(e) => Err(e.into()),
        }
    }
}
