//! Repository traits and their storage backends.
//!
//! Services only see the traits; `Repositories` bundles one implementation of
//! each, backed either by PostgreSQL or by process memory.

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StorageError;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

use crate::domain::model::{Fight, Monster, Player};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MonsterRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Monster>, StorageError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Monster>, StorageError>;
    async fn find_by_name(&self, name: &str) -> Result<Vec<Monster>, StorageError>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StorageError>;
    /// Inserts or updates the monster's stats. Ownership is left untouched.
    async fn save(&self, monster: &Monster) -> Result<Monster, StorageError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StorageError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Player>, StorageError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Player>, StorageError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Player>, StorageError>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StorageError>;
    async fn exists_by_name(&self, name: &str) -> Result<bool, StorageError>;
    /// Upserts the player and makes its stored box match `monster_box`.
    /// New monsters are inserted, monsters already stored only change owner
    /// and box position (their stats are never rewritten from the snapshot),
    /// and monsters that left the box are deleted. Returns the stored player.
    async fn save(&self, player: &Player) -> Result<Player, StorageError>;
    /// Deletes the player together with every monster in its box.
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StorageError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FightRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Fight>, StorageError>;
    /// Stores the fight header and team line-ups (monster rows are not written).
    async fn save(&self, fight: &Fight) -> Result<Fight, StorageError>;
    /// Persists the result of one exchange atomically: the fighters' health
    /// plus the fight's active monsters and status.
    async fn record_exchange(
        &self,
        fight: &Fight,
        fighters: Vec<Monster>,
    ) -> Result<Fight, StorageError>;
}

/// Liveness probe for whatever sits behind the repositories.
#[async_trait]
pub trait Store: Send + Sync {
    fn backend(&self) -> &'static str;
    async fn ping(&self) -> Result<(), StorageError>;
}

#[derive(Clone)]
pub struct Repositories {
    pub store: Arc<dyn Store>,
    pub monsters: Arc<dyn MonsterRepository>,
    pub players: Arc<dyn PlayerRepository>,
    pub fights: Arc<dyn FightRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            store: store.clone(),
            monsters: store.clone(),
            players: store.clone(),
            fights: store,
        }
    }

    pub fn postgres(store: PostgresStore) -> Self {
        let pool = store.pool().clone();
        Self {
            store: Arc::new(store),
            monsters: Arc::new(postgres::PgMonsterRepository::new(pool.clone())),
            players: Arc::new(postgres::PgPlayerRepository::new(pool.clone())),
            fights: Arc::new(postgres::PgFightRepository::new(pool)),
        }
    }
}
