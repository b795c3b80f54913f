use crate::domain::model::{Monster, MonsterDraft, Player, PlayerDraft};
use crate::error::GameError;
use crate::storage::{PlayerRepository, StorageError};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct PlayerService {
    players: Arc<dyn PlayerRepository>,
}

impl PlayerService {
    pub fn new(players: Arc<dyn PlayerRepository>) -> Self {
        Self { players }
    }

    pub async fn get_all_players(&self) -> Result<Vec<Player>, GameError> {
        Ok(self.players.find_all().await?)
    }

    pub async fn get_player_by_id(&self, id: Uuid) -> Result<Option<Player>, GameError> {
        Ok(self.players.find_by_id(id).await?)
    }

    pub async fn get_player_by_name(&self, name: &str) -> Result<Option<Player>, GameError> {
        Ok(self.players.find_by_name(name).await?)
    }

    pub async fn create_player(&self, draft: &PlayerDraft) -> Result<Player, GameError> {
        let player = Player::from_draft(draft)?;
        if self.players.exists_by_name(&player.name).await? {
            return Err(GameError::NameTaken(player.name));
        }
        let saved = self.save(&player).await?;
        tracing::info!(player_id = %saved.id, name = %saved.name, "player created");
        Ok(saved)
    }

    /// Renames a player. The monster box is managed through its own operations.
    pub async fn update_player(&self, id: Uuid, draft: &PlayerDraft) -> Result<Player, GameError> {
        let mut player = self.find(id).await?;
        let name = draft.validated_name()?;
        if player.name != name && self.players.exists_by_name(&name).await? {
            return Err(GameError::NameTaken(name));
        }
        player.name = name;
        self.save(&player).await
    }

    pub async fn delete_player(&self, id: Uuid) -> Result<(), GameError> {
        if !self.players.exists_by_id(id).await? {
            return Err(GameError::not_found("Player", id));
        }
        self.players.delete_by_id(id).await?;
        tracing::info!(player_id = %id, "player deleted");
        Ok(())
    }

    pub async fn get_player_monsters(&self, id: Uuid) -> Result<Vec<Monster>, GameError> {
        Ok(self.find(id).await?.monster_box)
    }

    /// Creates a new monster directly inside the player's box.
    pub async fn add_monster_to_player(
        &self,
        id: Uuid,
        draft: &MonsterDraft,
    ) -> Result<Player, GameError> {
        let mut player = self.find(id).await?;
        let monster = Monster::from_draft(draft)?;
        tracing::debug!(player_id = %id, monster_id = %monster.id, "adding monster to box");
        player.monster_box.push(monster);
        self.save(&player).await
    }

    /// Removes a monster from the box. The monster itself is deleted.
    pub async fn remove_monster_from_player(
        &self,
        id: Uuid,
        monster_id: Uuid,
    ) -> Result<Player, GameError> {
        let mut player = self.find(id).await?;
        if player.take_monster(monster_id).is_none() {
            return Err(GameError::MissingFromBox {
                player_id: id,
                monster_id,
            });
        }
        match self.players.save(&player).await {
            Ok(saved) => Ok(saved),
            Err(StorageError::ForeignKeyViolation { .. }) => Err(GameError::InUse { id: monster_id }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, id: Uuid) -> Result<Player, GameError> {
        self.players
            .find_by_id(id)
            .await?
            .ok_or_else(|| GameError::not_found("Player", id))
    }

    async fn save(&self, player: &Player) -> Result<Player, GameError> {
        match self.players.save(player).await {
            Ok(saved) => Ok(saved),
            // Lost a race with another request claiming the same name.
            Err(StorageError::UniqueViolation { .. }) => {
                Err(GameError::NameTaken(player.name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockPlayerRepository;
    use mockall::predicate::eq;

    fn player(name: &str, monster_box: Vec<Monster>) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: name.to_string(),
            monster_box,
        }
    }

    fn monster(name: &str) -> Monster {
        Monster {
            id: Uuid::new_v4(),
            name: name.to_string(),
            attack: 7,
            defence: 3,
            health: 50,
        }
    }

    fn service(repo: MockPlayerRepository) -> PlayerService {
        PlayerService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn create_player_with_unique_name() {
        let mut repo = MockPlayerRepository::new();
        repo.expect_exists_by_name()
            .withf(|name: &str| name == "Ash")
            .returning(|_| Ok(false));
        repo.expect_save().times(1).returning(|p| Ok(p.clone()));

        let created = service(repo)
            .create_player(&PlayerDraft::named("Ash"))
            .await
            .unwrap();
        assert_eq!(created.name, "Ash");
        assert!(created.monster_box.is_empty());
    }

    #[tokio::test]
    async fn create_player_with_taken_name_fails() {
        let mut repo = MockPlayerRepository::new();
        repo.expect_exists_by_name().returning(|_| Ok(true));
        repo.expect_save().never();

        let err = service(repo)
            .create_player(&PlayerDraft::named("Ash"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Player with name 'Ash' already exists");
    }

    #[tokio::test]
    async fn concurrent_name_claim_surfaces_as_name_taken() {
        let mut repo = MockPlayerRepository::new();
        repo.expect_exists_by_name().returning(|_| Ok(false));
        repo.expect_save()
            .returning(|_| Err(StorageError::UniqueViolation { constraint: None }));

        let err = service(repo)
            .create_player(&PlayerDraft::named("Ash"))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::NameTaken(_)));
    }

    #[tokio::test]
    async fn update_player_keeps_own_name_without_uniqueness_check() {
        let mut repo = MockPlayerRepository::new();
        let existing = player("Gary", vec![]);
        let id = existing.id;
        repo.expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_exists_by_name().never();
        repo.expect_save().times(1).returning(|p| Ok(p.clone()));

        let updated = service(repo)
            .update_player(id, &PlayerDraft::named("Gary"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Gary");
    }

    #[tokio::test]
    async fn update_player_to_taken_name_fails() {
        let mut repo = MockPlayerRepository::new();
        let existing = player("Gary", vec![]);
        let id = existing.id;
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_exists_by_name()
            .withf(|name: &str| name == "Ash")
            .returning(|_| Ok(true));
        repo.expect_save().never();

        let err = service(repo)
            .update_player(id, &PlayerDraft::named("Ash"))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::NameTaken(_)));
    }

    #[tokio::test]
    async fn update_missing_player_is_not_found() {
        let mut repo = MockPlayerRepository::new();
        let id = Uuid::new_v4();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo)
            .update_player(id, &PlayerDraft::named("Ash"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Player not found with id: {}", id));
    }

    #[tokio::test]
    async fn delete_missing_player_is_not_found() {
        let mut repo = MockPlayerRepository::new();
        repo.expect_exists_by_id().returning(|_| Ok(false));
        repo.expect_delete_by_id().never();

        let err = service(repo).delete_player(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_player_monsters_returns_box() {
        let mut repo = MockPlayerRepository::new();
        let owner = player("Misty", vec![monster("Staryu"), monster("Psyduck")]);
        let id = owner.id;
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));

        let monsters = service(repo).get_player_monsters(id).await.unwrap();
        assert_eq!(monsters.len(), 2);
    }

    #[tokio::test]
    async fn add_monster_to_player_appends_new_monster() {
        let mut repo = MockPlayerRepository::new();
        let owner = player("Brock", vec![]);
        let id = owner.id;
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        repo.expect_save()
            .withf(|p: &Player| p.monster_box.len() == 1 && p.monster_box[0].name == "Geodude")
            .times(1)
            .returning(|p| Ok(p.clone()));

        let updated = service(repo)
            .add_monster_to_player(id, &MonsterDraft::new("Geodude", 8, 10, 40))
            .await
            .unwrap();
        assert_eq!(updated.monster_box.len(), 1);
    }

    #[tokio::test]
    async fn add_invalid_monster_is_rejected() {
        let mut repo = MockPlayerRepository::new();
        let owner = player("Brock", vec![]);
        let id = owner.id;
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        repo.expect_save().never();

        let err = service(repo)
            .add_monster_to_player(id, &MonsterDraft::new("Geodude", -8, 10, 40))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn remove_monster_from_player_drops_it_from_the_box() {
        let mut repo = MockPlayerRepository::new();
        let pet = monster("Vulpix");
        let pet_id = pet.id;
        let owner = player("Brock", vec![pet]);
        let id = owner.id;
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        repo.expect_save()
            .withf(|p: &Player| p.monster_box.is_empty())
            .times(1)
            .returning(|p| Ok(p.clone()));

        let updated = service(repo)
            .remove_monster_from_player(id, pet_id)
            .await
            .unwrap();
        assert!(updated.monster_box.is_empty());
    }

    #[tokio::test]
    async fn remove_unknown_monster_from_player_fails() {
        let mut repo = MockPlayerRepository::new();
        let owner = player("Brock", vec![monster("Vulpix")]);
        let id = owner.id;
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        repo.expect_save().never();

        let err = service(repo)
            .remove_monster_from_player(id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Monster not found in player's monster box");
    }
}
