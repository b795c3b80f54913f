use super::{monster_from_row, MONSTER_COLUMNS};
use crate::domain::model::Monster;
use crate::storage::{MonsterRepository, StorageError};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgMonsterRepository {
    pool: PgPool,
}

impl PgMonsterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MonsterRepository for PgMonsterRepository {
    async fn find_all(&self) -> Result<Vec<Monster>, StorageError> {
        let sql = format!("SELECT {} FROM monsters m ORDER BY m.name, m.id", MONSTER_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| monster_from_row(r).map_err(StorageError::from))
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Monster>, StorageError> {
        let sql = format!("SELECT {} FROM monsters m WHERE m.id = $1", MONSTER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(monster_from_row).transpose()?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Monster>, StorageError> {
        let sql = format!(
            "SELECT {} FROM monsters m WHERE m.name = $1 ORDER BY m.id",
            MONSTER_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(name).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| monster_from_row(r).map_err(StorageError::from))
            .collect()
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM monsters WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn save(&self, monster: &Monster) -> Result<Monster, StorageError> {
        sqlx::query(
            "INSERT INTO monsters (id, name, attack, defence, health) VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE
             SET name = EXCLUDED.name, attack = EXCLUDED.attack,
                 defence = EXCLUDED.defence, health = EXCLUDED.health",
        )
        .bind(monster.id)
        .bind(&monster.name)
        .bind(monster.attack)
        .bind(monster.defence)
        .bind(monster.health)
        .execute(&self.pool)
        .await?;
        tracing::debug!(monster_id = %monster.id, "monster saved");
        Ok(monster.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM monsters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
