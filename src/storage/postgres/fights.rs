use super::{monster_from_row, MONSTER_COLUMNS};
use crate::domain::model::{Fight, FightStatus, Monster, Team};
use crate::storage::{FightRepository, StorageError};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgFightRepository {
    pool: PgPool,
}

fn team_table(team: Team) -> &'static str {
    match team {
        Team::A => "fight_team_a",
        Team::B => "fight_team_b",
    }
}

impl PgFightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_team(&self, fight_id: Uuid, team: Team) -> Result<Vec<Monster>, StorageError> {
        let sql = format!(
            "SELECT {} FROM {} t JOIN monsters m ON m.id = t.monster_id
             WHERE t.fight_id = $1 ORDER BY t.position",
            MONSTER_COLUMNS,
            team_table(team)
        );
        let rows = sqlx::query(&sql)
            .bind(fight_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| monster_from_row(r).map_err(StorageError::from))
            .collect()
    }

    async fn hydrate(&self, row: &PgRow) -> Result<Fight, StorageError> {
        let id: Uuid = row.try_get("id")?;
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<FightStatus>()
            .map_err(|e| StorageError::Other(anyhow::anyhow!(e)))?;
        Ok(Fight {
            id,
            team_a: self.load_team(id, Team::A).await?,
            team_b: self.load_team(id, Team::B).await?,
            active_monster_a: row.try_get("active_monster_a")?,
            active_monster_b: row.try_get("active_monster_b")?,
            status,
        })
    }

    async fn write_header(
        tx: &mut Transaction<'_, Postgres>,
        fight: &Fight,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO fights (id, active_monster_a, active_monster_b, status)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE
             SET active_monster_a = EXCLUDED.active_monster_a,
                 active_monster_b = EXCLUDED.active_monster_b,
                 status = EXCLUDED.status",
        )
        .bind(fight.id)
        .bind(fight.active_monster_a)
        .bind(fight.active_monster_b)
        .bind(fight.status.as_str())
        .execute(tx.as_mut())
        .await?;
        Ok(())
    }

    async fn write_team(
        tx: &mut Transaction<'_, Postgres>,
        fight: &Fight,
        team: Team,
    ) -> Result<(), StorageError> {
        let table = team_table(team);
        sqlx::query(&format!("DELETE FROM {} WHERE fight_id = $1", table))
            .bind(fight.id)
            .execute(tx.as_mut())
            .await?;
        let insert = format!(
            "INSERT INTO {} (fight_id, monster_id, position) VALUES ($1, $2, $3)",
            table
        );
        for (position, monster) in fight.team(team).iter().enumerate() {
            sqlx::query(&insert)
                .bind(fight.id)
                .bind(monster.id)
                .bind(position as i32)
                .execute(tx.as_mut())
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl FightRepository for PgFightRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Fight>, StorageError> {
        let row = sqlx::query(
            "SELECT id, active_monster_a, active_monster_b, status FROM fights WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn save(&self, fight: &Fight) -> Result<Fight, StorageError> {
        let mut tx = self.pool.begin().await?;
        Self::write_header(&mut tx, fight).await?;
        Self::write_team(&mut tx, fight, Team::A).await?;
        Self::write_team(&mut tx, fight, Team::B).await?;
        tx.commit().await?;
        tracing::debug!(fight_id = %fight.id, status = %fight.status, "fight saved");
        Ok(fight.clone())
    }

    async fn record_exchange(
        &self,
        fight: &Fight,
        fighters: Vec<Monster>,
    ) -> Result<Fight, StorageError> {
        let mut tx = self.pool.begin().await?;
        for fighter in &fighters {
            let updated = sqlx::query("UPDATE monsters SET health = $2 WHERE id = $1")
                .bind(fighter.id)
                .bind(fighter.health)
                .execute(tx.as_mut())
                .await?;
            if updated.rows_affected() == 0 {
                return Err(StorageError::NotFound);
            }
        }
        let updated = sqlx::query(
            "UPDATE fights SET active_monster_a = $2, active_monster_b = $3, status = $4
             WHERE id = $1",
        )
        .bind(fight.id)
        .bind(fight.active_monster_a)
        .bind(fight.active_monster_b)
        .bind(fight.status.as_str())
        .execute(tx.as_mut())
        .await?;
        if updated.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        tx.commit().await?;
        Ok(fight.clone())
    }
}
