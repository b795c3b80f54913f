//! PostgreSQL storage backend.
//!
//! `PostgresStore::connect` opens the pool, creates the schema if needed and
//! (unless disabled) takes a session-level advisory lock so that only one game
//! server mutates the same database.

mod fights;
mod monsters;
mod players;

pub use fights::PgFightRepository;
pub use monsters::PgMonsterRepository;
pub use players::PgPlayerRepository;

use crate::domain::model::Monster;
use crate::infra::config::Config;
use crate::storage::{Store, StorageError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

/// Arbitrary constant lock ID (must be stable across instances).
const INSTANCE_LOCK_ID: i64 = 7_310_001;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS players (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS monsters (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        attack INTEGER NOT NULL CHECK (attack >= 0),
        defence INTEGER NOT NULL CHECK (defence >= 0),
        health INTEGER NOT NULL CHECK (health >= 0),
        player_id UUID REFERENCES players(id) ON DELETE CASCADE,
        box_position INTEGER
    )",
    "CREATE INDEX IF NOT EXISTS monsters_name_idx ON monsters (name)",
    "CREATE INDEX IF NOT EXISTS monsters_player_idx ON monsters (player_id)",
    "CREATE TABLE IF NOT EXISTS fights (
        id UUID PRIMARY KEY,
        active_monster_a UUID NOT NULL,
        active_monster_b UUID NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('ONGOING', 'TEAM_A_WON', 'TEAM_B_WON'))
    )",
    "CREATE TABLE IF NOT EXISTS fight_team_a (
        fight_id UUID NOT NULL REFERENCES fights(id) ON DELETE CASCADE,
        monster_id UUID NOT NULL REFERENCES monsters(id),
        position INTEGER NOT NULL,
        PRIMARY KEY (fight_id, position)
    )",
    "CREATE TABLE IF NOT EXISTS fight_team_b (
        fight_id UUID NOT NULL REFERENCES fights(id) ON DELETE CASCADE,
        monster_id UUID NOT NULL REFERENCES monsters(id),
        position INTEGER NOT NULL,
        PRIMARY KEY (fight_id, position)
    )",
];

pub struct PostgresStore {
    pool: PgPool,
    /// Held for the lifetime of the process to keep the advisory lock.
    #[allow(dead_code)]
    instance_lock: Option<sqlx::pool::PoolConnection<sqlx::Postgres>>,
}

impl PostgresStore {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for the postgres backend"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(database_url)
            .await?;
        tracing::info!(
            max_connections = config.db_max_connections,
            "connected to postgres"
        );

        Self::with_pool(pool, config.allow_multi_instance).await
    }

    /// Wraps an existing pool, creating the schema if needed.
    pub async fn with_pool(pool: PgPool, allow_multi_instance: bool) -> anyhow::Result<Self> {
        apply_schema(&pool).await?;

        let instance_lock = if allow_multi_instance {
            tracing::warn!("ALLOW_MULTI_INSTANCE set, skipping the instance lock");
            None
        } else {
            let mut conn = pool.acquire().await?;
            let locked: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
                .bind(INSTANCE_LOCK_ID)
                .fetch_one(&mut *conn)
                .await?;
            if !locked {
                return Err(anyhow::anyhow!(
                    "Another game server is already running against this Postgres (pg_advisory_lock). \
Set ALLOW_MULTI_INSTANCE=true to bypass (NOT recommended)."
                ));
            }
            Some(conn)
        };

        Ok(Self { pool, instance_lock })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(statements = SCHEMA.len(), "schema applied");
    Ok(())
}

pub(crate) const MONSTER_COLUMNS: &str = "m.id, m.name, m.attack, m.defence, m.health";

pub(crate) fn monster_from_row(row: &PgRow) -> Result<Monster, sqlx::Error> {
    Ok(Monster {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        attack: row.try_get("attack")?,
        defence: row.try_get("defence")?,
        health: row.try_get("health")?,
    })
}
