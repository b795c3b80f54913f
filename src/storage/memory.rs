//! In-process storage backend.
//!
//! Mirrors the relational rules of the Postgres schema (unique player names,
//! monsters referenced by fights cannot be deleted) so that both backends
//! behave the same from the services' point of view.

use crate::domain::model::{Fight, FightStatus, Monster, Player};
use crate::storage::{FightRepository, MonsterRepository, PlayerRepository, Store, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
struct StoredMonster {
    monster: Monster,
    owner: Option<Uuid>,
}

#[derive(Clone)]
struct StoredPlayer {
    name: String,
    monster_box: Vec<Uuid>,
}

#[derive(Clone)]
struct StoredFight {
    team_a: Vec<Uuid>,
    team_b: Vec<Uuid>,
    active_monster_a: Uuid,
    active_monster_b: Uuid,
    status: FightStatus,
}

#[derive(Default)]
struct MemoryState {
    monsters: HashMap<Uuid, StoredMonster>,
    players: HashMap<Uuid, StoredPlayer>,
    fights: HashMap<Uuid, StoredFight>,
}

impl MemoryState {
    fn in_any_fight(&self, monster_id: Uuid) -> bool {
        self.fights
            .values()
            .any(|f| f.team_a.contains(&monster_id) || f.team_b.contains(&monster_id))
    }

    fn hydrate_monsters(&self, ids: &[Uuid]) -> Vec<Monster> {
        ids.iter()
            .filter_map(|id| self.monsters.get(id).map(|m| m.monster.clone()))
            .collect()
    }

    fn hydrate_player(&self, id: Uuid, stored: &StoredPlayer) -> Player {
        Player {
            id,
            name: stored.name.clone(),
            monster_box: self.hydrate_monsters(&stored.monster_box),
        }
    }

    fn hydrate_fight(&self, id: Uuid, stored: &StoredFight) -> Fight {
        Fight {
            id,
            team_a: self.hydrate_monsters(&stored.team_a),
            team_b: self.hydrate_monsters(&stored.team_b),
            active_monster_a: stored.active_monster_a,
            active_monster_b: stored.active_monster_b,
            status: stored.status,
        }
    }

    fn detach_from_box(&mut self, monster_id: Uuid) {
        let owner = self.monsters.get(&monster_id).and_then(|m| m.owner);
        if let Some(owner) = owner {
            if let Some(player) = self.players.get_mut(&owner) {
                player.monster_box.retain(|id| *id != monster_id);
            }
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
impl MonsterRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Monster>, StorageError> {
        let state = self.state.read().await;
        let mut all: Vec<Monster> = state.monsters.values().map(|m| m.monster.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Monster>, StorageError> {
        let state = self.state.read().await;
        Ok(state.monsters.get(&id).map(|m| m.monster.clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Monster>, StorageError> {
        let state = self.state.read().await;
        let mut found: Vec<Monster> = state
            .monsters
            .values()
            .filter(|m| m.monster.name == name)
            .map(|m| m.monster.clone())
            .collect();
        found.sort_by_key(|m| m.id);
        Ok(found)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.state.read().await.monsters.contains_key(&id))
    }

    async fn save(&self, monster: &Monster) -> Result<Monster, StorageError> {
        let mut state = self.state.write().await;
        state
            .monsters
            .entry(monster.id)
            .and_modify(|stored| stored.monster = monster.clone())
            .or_insert_with(|| StoredMonster {
                monster: monster.clone(),
                owner: None,
            });
        Ok(monster.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if state.in_any_fight(id) {
            return Err(StorageError::ForeignKeyViolation {
                constraint: Some("fight_team_monster_id_fkey".to_string()),
            });
        }
        state.detach_from_box(id);
        state.monsters.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl PlayerRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Player>, StorageError> {
        let state = self.state.read().await;
        let mut all: Vec<Player> = state
            .players
            .iter()
            .map(|(id, p)| state.hydrate_player(*id, p))
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Player>, StorageError> {
        let state = self.state.read().await;
        Ok(state.players.get(&id).map(|p| state.hydrate_player(id, p)))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Player>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .players
            .iter()
            .find(|(_, p)| p.name == name)
            .map(|(id, p)| state.hydrate_player(*id, p)))
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.state.read().await.players.contains_key(&id))
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.state.read().await.players.values().any(|p| p.name == name))
    }

    async fn save(&self, player: &Player) -> Result<Player, StorageError> {
        let mut state = self.state.write().await;

        if state
            .players
            .iter()
            .any(|(id, p)| *id != player.id && p.name == player.name)
        {
            return Err(StorageError::UniqueViolation {
                constraint: Some("players_name_key".to_string()),
            });
        }

        let keep: Vec<Uuid> = player.monster_box.iter().map(|m| m.id).collect();
        let orphans: Vec<Uuid> = state
            .monsters
            .iter()
            .filter(|(id, m)| m.owner == Some(player.id) && !keep.contains(*id))
            .map(|(id, _)| *id)
            .collect();
        if orphans.iter().any(|id| state.in_any_fight(*id)) {
            return Err(StorageError::ForeignKeyViolation {
                constraint: Some("fight_team_monster_id_fkey".to_string()),
            });
        }

        for id in &orphans {
            state.monsters.remove(id);
        }
        // Monsters already stored only change owner; their stats stay as stored.
        for monster in &player.monster_box {
            state.detach_from_box(monster.id);
            state
                .monsters
                .entry(monster.id)
                .and_modify(|stored| stored.owner = Some(player.id))
                .or_insert_with(|| StoredMonster {
                    monster: monster.clone(),
                    owner: Some(player.id),
                });
        }
        state.players.insert(
            player.id,
            StoredPlayer {
                name: player.name.clone(),
                monster_box: keep,
            },
        );

        Ok(state.hydrate_player(player.id, &state.players[&player.id]))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.players.get(&id).cloned() else {
            return Ok(());
        };
        if stored.monster_box.iter().any(|m| state.in_any_fight(*m)) {
            return Err(StorageError::ForeignKeyViolation {
                constraint: Some("fight_team_monster_id_fkey".to_string()),
            });
        }
        for monster_id in &stored.monster_box {
            state.monsters.remove(monster_id);
        }
        state.players.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl FightRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Fight>, StorageError> {
        let state = self.state.read().await;
        Ok(state.fights.get(&id).map(|f| state.hydrate_fight(id, f)))
    }

    async fn save(&self, fight: &Fight) -> Result<Fight, StorageError> {
        let mut state = self.state.write().await;
        let team_a: Vec<Uuid> = fight.team_a.iter().map(|m| m.id).collect();
        let team_b: Vec<Uuid> = fight.team_b.iter().map(|m| m.id).collect();
        if team_a
            .iter()
            .chain(team_b.iter())
            .any(|id| !state.monsters.contains_key(id))
        {
            return Err(StorageError::ForeignKeyViolation {
                constraint: Some("fight_team_monster_id_fkey".to_string()),
            });
        }
        state.fights.insert(
            fight.id,
            StoredFight {
                team_a,
                team_b,
                active_monster_a: fight.active_monster_a,
                active_monster_b: fight.active_monster_b,
                status: fight.status,
            },
        );
        Ok(state.hydrate_fight(fight.id, &state.fights[&fight.id]))
    }

    async fn record_exchange(
        &self,
        fight: &Fight,
        fighters: Vec<Monster>,
    ) -> Result<Fight, StorageError> {
        let mut state = self.state.write().await;
        if !state.fights.contains_key(&fight.id) {
            return Err(StorageError::NotFound);
        }
        if fighters.iter().any(|m| !state.monsters.contains_key(&m.id)) {
            return Err(StorageError::NotFound);
        }
        for fighter in fighters {
            if let Some(stored) = state.monsters.get_mut(&fighter.id) {
                stored.monster.health = fighter.health;
            }
        }
        if let Some(stored) = state.fights.get_mut(&fight.id) {
            stored.active_monster_a = fight.active_monster_a;
            stored.active_monster_b = fight.active_monster_b;
            stored.status = fight.status;
        }
        Ok(state.hydrate_fight(fight.id, &state.fights[&fight.id]))
    }
}
