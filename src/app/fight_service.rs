use crate::domain::combat;
use crate::domain::model::{CreateFightRequest, Fight, FightState, FightStatus, Monster, Team};
use crate::error::GameError;
use crate::storage::{FightRepository, MonsterRepository};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone)]
pub struct FightService {
    fights: Arc<dyn FightRepository>,
    monsters: Arc<dyn MonsterRepository>,
    /// One lock per fight with an exchange running or queued, so exchanges on
    /// the same fight never interleave.
    exchange_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl FightService {
    pub fn new(fights: Arc<dyn FightRepository>, monsters: Arc<dyn MonsterRepository>) -> Self {
        Self {
            fights,
            monsters,
            exchange_locks: Arc::new(DashMap::new()),
        }
    }

    pub async fn create_fight(&self, request: &CreateFightRequest) -> Result<Fight, GameError> {
        let team_a_ids = validate_team(request.team_a.as_deref(), Team::A)?;
        let team_b_ids = validate_team(request.team_b.as_deref(), Team::B)?;

        let mut seen = HashSet::new();
        if let Some(dup) = team_a_ids.iter().chain(team_b_ids).find(|id| !seen.insert(**id)) {
            return Err(GameError::InvalidInput(format!(
                "Monster {} appears more than once in the fight",
                dup
            )));
        }

        let team_a = self.find_team_monsters(team_a_ids).await?;
        let team_b = self.find_team_monsters(team_b_ids).await?;

        let active_a = healthy_lead(&team_a, Team::A)?;
        let active_b = healthy_lead(&team_b, Team::B)?;

        let fight = Fight {
            id: Uuid::new_v4(),
            team_a,
            team_b,
            active_monster_a: active_a,
            active_monster_b: active_b,
            status: FightStatus::Ongoing,
        };
        let saved = self.fights.save(&fight).await?;
        tracing::info!(
            fight_id = %saved.id,
            team_a = saved.team_a.len(),
            team_b = saved.team_b.len(),
            "fight created"
        );
        Ok(saved)
    }

    /// Resolves one exchange of an ongoing fight. Finished fights are returned as-is.
    pub async fn execute_exchange(&self, fight_id: Uuid) -> Result<FightState, GameError> {
        let lock = self
            .exchange_locks
            .entry(fight_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let result = {
            let _guard = lock.lock().await;
            self.exchange_locked(fight_id).await
        };
        // Only the map and `lock` reference it when nobody else is queued.
        self.exchange_locks
            .remove_if(&fight_id, |_, queued| Arc::strong_count(queued) <= 2);
        result
    }

    async fn exchange_locked(&self, fight_id: Uuid) -> Result<FightState, GameError> {
        let mut fight = self.find(fight_id).await?;
        let Some(report) = combat::resolve_exchange(&mut fight)? else {
            return Ok(fight.state());
        };

        tracing::info!(
            fight_id = %fight_id,
            damage_to_a = report.damage_to_a,
            damage_to_b = report.damage_to_b,
            health_a = report.fighters[0].health,
            health_b = report.fighters[1].health,
            status = %report.status,
            "exchange resolved"
        );
        if let Some(next) = report.switched_a {
            tracing::debug!(fight_id = %fight_id, monster_id = %next, "team A sends in next monster");
        }
        if let Some(next) = report.switched_b {
            tracing::debug!(fight_id = %fight_id, monster_id = %next, "team B sends in next monster");
        }

        let [fighter_a, fighter_b] = report.fighters;
        let stored = self
            .fights
            .record_exchange(&fight, vec![fighter_a, fighter_b])
            .await?;

        if stored.status.is_finished() {
            tracing::info!(fight_id = %fight_id, status = %stored.status, "fight finished");
        }
        Ok(stored.state())
    }

    pub async fn get_fight_state(&self, fight_id: Uuid) -> Result<FightState, GameError> {
        Ok(self.find(fight_id).await?.state())
    }

    async fn find(&self, fight_id: Uuid) -> Result<Fight, GameError> {
        self.fights
            .find_by_id(fight_id)
            .await?
            .ok_or_else(|| GameError::not_found("Fight", fight_id))
    }

    async fn find_team_monsters(&self, ids: &[Uuid]) -> Result<Vec<Monster>, GameError> {
        let mut team = Vec::with_capacity(ids.len());
        for id in ids {
            let monster = self.monsters.find_by_id(*id).await?.ok_or_else(|| {
                GameError::InvalidInput(format!("Monster not found with id: {}", id))
            })?;
            team.push(monster);
        }
        Ok(team)
    }
}

fn validate_team(ids: Option<&[Uuid]>, team: Team) -> Result<&[Uuid], GameError> {
    match ids {
        Some(ids) if !ids.is_empty() => Ok(ids),
        _ => Err(GameError::InvalidInput(format!(
            "{} cannot be null or empty",
            team.label()
        ))),
    }
}

fn healthy_lead(monsters: &[Monster], team: Team) -> Result<Uuid, GameError> {
    combat::first_healthy(monsters).ok_or_else(|| {
        GameError::InvalidInput(format!("{} has no healthy monsters", team.label()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MockFightRepository, MockMonsterRepository, StorageError};
    use mockall::predicate::eq;
    use std::collections::HashMap;

    fn monster(health: i32, attack: i32, defence: i32) -> Monster {
        Monster {
            id: Uuid::new_v4(),
            name: "Test Monster".to_string(),
            attack,
            defence,
            health,
        }
    }

    fn fight(team_a: Vec<Monster>, team_b: Vec<Monster>, status: FightStatus) -> Fight {
        Fight {
            id: Uuid::new_v4(),
            active_monster_a: team_a[0].id,
            active_monster_b: team_b[0].id,
            team_a,
            team_b,
            status,
        }
    }

    fn monsters_repo(known: Vec<Monster>) -> MockMonsterRepository {
        let by_id: HashMap<Uuid, Monster> = known.into_iter().map(|m| (m.id, m)).collect();
        let mut repo = MockMonsterRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(by_id.get(&id).cloned()));
        repo
    }

    fn service(fights: MockFightRepository, monsters: MockMonsterRepository) -> FightService {
        FightService::new(Arc::new(fights), Arc::new(monsters))
    }

    fn request(team_a: Option<Vec<Uuid>>, team_b: Option<Vec<Uuid>>) -> CreateFightRequest {
        CreateFightRequest { team_a, team_b }
    }

    #[tokio::test]
    async fn create_fight_picks_first_healthy_monsters() {
        let a1 = monster(0, 10, 5);
        let a2 = monster(80, 8, 4);
        let b1 = monster(90, 12, 6);
        let b2 = monster(70, 9, 3);
        let req = request(Some(vec![a1.id, a2.id]), Some(vec![b1.id, b2.id]));
        let (a2_id, b1_id) = (a2.id, b1.id);

        let mut fights = MockFightRepository::new();
        fights.expect_save().times(1).returning(|f| Ok(f.clone()));

        let created = service(fights, monsters_repo(vec![a1, a2, b1, b2]))
            .create_fight(&req)
            .await
            .unwrap();

        assert_eq!(created.status, FightStatus::Ongoing);
        assert_eq!(created.active_monster_a, a2_id);
        assert_eq!(created.active_monster_b, b1_id);
        assert_eq!(created.team_a.len(), 2);
        assert_eq!(created.team_b.len(), 2);
    }

    #[tokio::test]
    async fn create_fight_requires_both_teams() {
        let m = monster(100, 10, 5);
        let cases = vec![
            (request(None, Some(vec![m.id])), "Team A cannot be null or empty"),
            (request(Some(vec![]), Some(vec![m.id])), "Team A cannot be null or empty"),
            (request(Some(vec![m.id]), None), "Team B cannot be null or empty"),
            (request(Some(vec![m.id]), Some(vec![])), "Team B cannot be null or empty"),
        ];
        for (req, expected) in cases {
            let mut fights = MockFightRepository::new();
            fights.expect_save().never();
            let err = service(fights, MockMonsterRepository::new())
                .create_fight(&req)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn create_fight_with_unknown_monster_fails() {
        let known = monster(100, 10, 5);
        let ghost = Uuid::new_v4();
        let req = request(Some(vec![ghost]), Some(vec![known.id]));

        let mut fights = MockFightRepository::new();
        fights.expect_save().never();
        let err = service(fights, monsters_repo(vec![known]))
            .create_fight(&req)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Monster not found with id: {}", ghost));
    }

    #[tokio::test]
    async fn create_fight_rejects_monster_on_both_sides() {
        let m = monster(100, 10, 5);
        let req = request(Some(vec![m.id]), Some(vec![m.id]));

        let mut fights = MockFightRepository::new();
        fights.expect_save().never();
        let err = service(fights, monsters_repo(vec![m]))
            .create_fight(&req)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("appears more than once"));
    }

    #[tokio::test]
    async fn create_fight_without_healthy_monsters_fails() {
        let fainted = monster(0, 10, 5);
        let healthy = monster(100, 10, 5);

        let req = request(Some(vec![fainted.id]), Some(vec![healthy.id]));
        let err = service(MockFightRepository::new(), monsters_repo(vec![fainted.clone(), healthy.clone()]))
            .create_fight(&req)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Team A has no healthy monsters");

        let req = request(Some(vec![healthy.id]), Some(vec![fainted.id]));
        let err = service(MockFightRepository::new(), monsters_repo(vec![fainted, healthy]))
            .create_fight(&req)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Team B has no healthy monsters");
    }

    #[tokio::test]
    async fn execute_exchange_records_damage() {
        let f = fight(
            vec![monster(100, 10, 5)],
            vec![monster(90, 8, 4)],
            FightStatus::Ongoing,
        );
        let id = f.id;

        let mut fights = MockFightRepository::new();
        fights.expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(f.clone())));
        fights.expect_record_exchange()
            .withf(|_, fighters: &Vec<Monster>| {
                fighters.len() == 2 && fighters[0].health == 97 && fighters[1].health == 84
            })
            .times(1)
            .returning(|f, _| Ok(f.clone()));

        let state = service(fights, MockMonsterRepository::new())
            .execute_exchange(id)
            .await
            .unwrap();
        assert_eq!(state.fight_id, id);
        assert_eq!(state.status, FightStatus::Ongoing);
        assert_eq!(state.team_a[0].health, 97);
        assert_eq!(state.team_b[0].health, 84);
    }

    #[tokio::test]
    async fn execute_exchange_on_missing_fight_is_not_found() {
        let mut fights = MockFightRepository::new();
        fights.expect_find_by_id().returning(|_| Ok(None));
        fights.expect_record_exchange().never();
        let id = Uuid::new_v4();

        let err = service(fights, MockMonsterRepository::new())
            .execute_exchange(id)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Fight not found with id: {}", id));
    }

    #[tokio::test]
    async fn execute_exchange_on_finished_fight_changes_nothing() {
        let f = fight(
            vec![monster(100, 10, 5)],
            vec![monster(90, 8, 4)],
            FightStatus::TeamAWon,
        );
        let id = f.id;
        let mut fights = MockFightRepository::new();
        fights.expect_find_by_id()
            .returning(move |_| Ok(Some(f.clone())));
        fights.expect_record_exchange().never();

        let state = service(fights, MockMonsterRepository::new())
            .execute_exchange(id)
            .await
            .unwrap();
        assert_eq!(state.status, FightStatus::TeamAWon);
        assert_eq!(state.team_a[0].health, 100);
    }

    #[tokio::test]
    async fn execute_exchange_switches_and_declares_winner() {
        let a1 = monster(1, 10, 5);
        let a2 = monster(100, 8, 4);
        let a2_id = a2.id;
        let f = fight(vec![a1, a2], vec![monster(100, 15, 0)], FightStatus::Ongoing);
        let id = f.id;
        let mut fights = MockFightRepository::new();
        fights.expect_find_by_id()
            .returning(move |_| Ok(Some(f.clone())));
        fights.expect_record_exchange()
            .returning(|f, _| Ok(f.clone()));

        let state = service(fights, MockMonsterRepository::new())
            .execute_exchange(id)
            .await
            .unwrap();
        assert_eq!(state.active_monster_a, a2_id);
        assert_eq!(state.status, FightStatus::Ongoing);

        let lone = fight(vec![monster(1, 10, 5)], vec![monster(100, 15, 0)], FightStatus::Ongoing);
        let lone_id = lone.id;
        let mut fights = MockFightRepository::new();
        fights.expect_find_by_id()
            .returning(move |_| Ok(Some(lone.clone())));
        fights.expect_record_exchange()
            .returning(|f, _| Ok(f.clone()));

        let state = service(fights, MockMonsterRepository::new())
            .execute_exchange(lone_id)
            .await
            .unwrap();
        assert_eq!(state.status, FightStatus::TeamBWon);
    }

    #[tokio::test]
    async fn storage_failure_during_exchange_is_propagated() {
        let f = fight(vec![monster(100, 10, 5)], vec![monster(90, 8, 4)], FightStatus::Ongoing);
        let id = f.id;
        let mut fights = MockFightRepository::new();
        fights.expect_find_by_id()
            .returning(move |_| Ok(Some(f.clone())));
        fights.expect_record_exchange()
            .returning(|_, _| Err(StorageError::Other(anyhow::anyhow!("disk full"))));

        let err = service(fights, MockMonsterRepository::new())
            .execute_exchange(id)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Storage(_)));
    }

    #[tokio::test]
    async fn get_fight_state_mirrors_the_fight() {
        let f = fight(vec![monster(100, 10, 5)], vec![monster(90, 8, 4)], FightStatus::Ongoing);
        let expected = f.state();
        let id = f.id;
        let mut fights = MockFightRepository::new();
        fights.expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(move |_| Ok(Some(f.clone())));

        let state = service(fights, MockMonsterRepository::new())
            .get_fight_state(id)
            .await
            .unwrap();
        assert_eq!(state, expected);
    }

    #[tokio::test]
    async fn exchange_locks_do_not_outlive_their_requests() {
        let ongoing = fight(vec![monster(100, 10, 5)], vec![monster(90, 8, 4)], FightStatus::Ongoing);
        let ongoing_id = ongoing.id;
        let mut corrupt = fight(vec![monster(100, 10, 5)], vec![monster(90, 8, 4)], FightStatus::Ongoing);
        corrupt.active_monster_a = Uuid::new_v4();
        let corrupt_id = corrupt.id;

        let mut fights = MockFightRepository::new();
        fights.expect_find_by_id().returning(move |id| {
            Ok(if id == ongoing_id {
                Some(ongoing.clone())
            } else if id == corrupt_id {
                Some(corrupt.clone())
            } else {
                None
            })
        });
        fights.expect_record_exchange()
            .returning(|f, _| Ok(f.clone()));
        let service = service(fights, MockMonsterRepository::new());

        for _ in 0..100 {
            let err = service.execute_exchange(Uuid::new_v4()).await.unwrap_err();
            assert!(matches!(err, GameError::NotFound { .. }));
        }
        let err = service.execute_exchange(corrupt_id).await.unwrap_err();
        assert!(matches!(err, GameError::CorruptFight(_)));
        let state = service.execute_exchange(ongoing_id).await.unwrap();
        assert_eq!(state.status, FightStatus::Ongoing);

        assert!(service.exchange_locks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_exchanges_on_one_fight_are_serialised() {
        const EXCHANGES: i32 = 20;
        let repos = crate::storage::Repositories::in_memory();
        let a = monster(1_000, 10, 5);
        let b = monster(1_000, 8, 4);
        repos.monsters.save(&a).await.unwrap();
        repos.monsters.save(&b).await.unwrap();
        let service = FightService::new(repos.fights.clone(), repos.monsters.clone());
        let created = service
            .create_fight(&request(Some(vec![a.id]), Some(vec![b.id])))
            .await
            .unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..EXCHANGES {
            let service = service.clone();
            let fight_id = created.id;
            tasks.spawn(async move { service.execute_exchange(fight_id).await });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        // A deals 6 and takes 3 per exchange; none may be lost.
        let state = service.get_fight_state(created.id).await.unwrap();
        assert_eq!(state.team_a[0].health, 1_000 - 3 * EXCHANGES);
        assert_eq!(state.team_b[0].health, 1_000 - 6 * EXCHANGES);
        assert_eq!(state.status, FightStatus::Ongoing);
        assert!(service.exchange_locks.is_empty());
    }
}
