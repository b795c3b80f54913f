pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{FightService, MonsterService, PlayerService};
pub use error::GameError;
pub use infra::config::{Config, StorageBackend};
pub use storage::{InMemoryStore, PostgresStore, Repositories};
