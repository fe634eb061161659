use super::{GameId, GameRecord, GameStore, GameSummary, LegRecord, StoreData, StoreError};
use crate::game::rules::MatchRules;
use crate::model::player::{PlayerId, PlayerProfile};
use parking_lot::RwLock;

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<StoreData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryStore {
    fn list_players(&self) -> Result<Vec<PlayerProfile>, StoreError> {
        Ok(self.data.read().players.clone())
    }

    fn create_player(&self, name: &str, color: &str) -> Result<PlayerProfile, StoreError> {
        Ok(self.data.write().create_player(name, color))
    }

    fn update_player(&self, profile: &PlayerProfile) -> Result<(), StoreError> {
        self.data.write().update_player(profile)
    }

    fn delete_player(&self, id: PlayerId) -> Result<(), StoreError> {
        self.data.write().delete_player(id)
    }

    fn begin_game(&self, rules: &MatchRules, players: &[PlayerId]) -> Result<GameId, StoreError> {
        Ok(self.data.write().begin_game(rules, players))
    }

    fn record_leg(&self, game: GameId, leg: &LegRecord) -> Result<(), StoreError> {
        self.data.write().record_leg(game, leg)
    }

    fn retract_leg(&self, game: GameId, set: u32, leg: u32) -> Result<LegRecord, StoreError> {
        self.data.write().retract_leg(game, set, leg)
    }

    fn finish_game(&self, game: GameId, summary: &GameSummary) -> Result<(), StoreError> {
        self.data.write().finish_game(game, summary)
    }

    fn games(&self) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.data.read().games.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players_round_trip_through_store() {
        let store = InMemoryStore::new();
        let ada = store.create_player("Ada", "#e53935").unwrap();
        let mut renamed = ada.clone();
        renamed.name = "Ada L".into();
        store.update_player(&renamed).unwrap();

        let players = store.list_players().unwrap();
        assert_eq!(players, vec![renamed]);
        store.delete_player(ada.id).unwrap();
        assert!(store.list_players().unwrap().is_empty());
    }

    #[test]
    fn games_collect_legs() {
        let store = InMemoryStore::new();
        let id = store
            .begin_game(&MatchRules::default(), &[PlayerId(1), PlayerId(2)])
            .unwrap();
        store
            .record_leg(
                id,
                &LegRecord {
                    set: 1,
                    leg: 1,
                    winner: PlayerId(2),
                    darts: 12,
                    checkout: 81,
                },
            )
            .unwrap();
        let games = store.games().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].legs.len(), 1);
        assert!(!games[0].is_finished());
    }
}
