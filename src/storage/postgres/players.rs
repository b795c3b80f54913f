use super::{monster_from_row, MONSTER_COLUMNS};
use crate::domain::model::{Monster, Player};
use crate::storage::{PlayerRepository, StorageError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgPlayerRepository {
    pool: PgPool,
}

impl PgPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_box(&self, player_id: Uuid) -> Result<Vec<Monster>, StorageError> {
        let sql = format!(
            "SELECT {} FROM monsters m WHERE m.player_id = $1 ORDER BY m.box_position, m.id",
            MONSTER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(player_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| monster_from_row(r).map_err(StorageError::from))
            .collect()
    }

    async fn hydrate(&self, id: Uuid, name: String) -> Result<Player, StorageError> {
        Ok(Player {
            id,
            name,
            monster_box: self.load_box(id).await?,
        })
    }
}

#[async_trait]
impl PlayerRepository for PgPlayerRepository {
    async fn find_all(&self) -> Result<Vec<Player>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM players ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        let mut players = Vec::with_capacity(rows.len());
        for row in rows {
            players.push(self.hydrate(row.try_get("id")?, row.try_get("name")?).await?);
        }
        Ok(players)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Player>, StorageError> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM players WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match name {
            Some(name) => Ok(Some(self.hydrate(id, name).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Player>, StorageError> {
        let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM players WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        match id {
            Some(id) => Ok(Some(self.hydrate(id, name.to_string()).await?)),
            None => Ok(None),
        }
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM players WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, StorageError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM players WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn save(&self, player: &Player) -> Result<Player, StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO players (id, name) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(player.id)
        .bind(&player.name)
        .execute(tx.as_mut())
        .await?;

        let keep: Vec<Uuid> = player.monster_box.iter().map(|m| m.id).collect();
        // Orphan removal: monsters that left the box are deleted.
        sqlx::query("DELETE FROM monsters WHERE player_id = $1 AND NOT (id = ANY($2))")
            .bind(player.id)
            .bind(&keep)
            .execute(tx.as_mut())
            .await?;

        // Existing monsters only change owner and position, never stats.
        for (position, monster) in player.monster_box.iter().enumerate() {
            sqlx::query(
                "INSERT INTO monsters (id, name, attack, defence, health, player_id, box_position)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (id) DO UPDATE
                 SET player_id = EXCLUDED.player_id, box_position = EXCLUDED.box_position",
            )
            .bind(monster.id)
            .bind(&monster.name)
            .bind(monster.attack)
            .bind(monster.defence)
            .bind(monster.health)
            .bind(player.id)
            .bind(position as i32)
            .execute(tx.as_mut())
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            player_id = %player.id,
            box_size = player.monster_box.len(),
            "player saved"
        );
        Ok(Player {
            id: player.id,
            name: player.name.clone(),
            monster_box: self.load_box(player.id).await?,
        })
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StorageError> {
        // Box monsters go with the player (ON DELETE CASCADE).
        sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
