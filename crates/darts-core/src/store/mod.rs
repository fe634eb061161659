//! Persistence for players and finished games.
//!
//! The engine never depends on a store succeeding: callers log failures and keep
//! playing from local state.

pub mod json_file;
pub mod leaderboard;
pub mod memory;
pub mod roster;

use crate::game::rules::MatchRules;
use crate::model::player::{MatchPlayer, PlayerId, PlayerProfile};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegRecord {
    pub set: u32,
    pub leg: u32,
    pub winner: PlayerId,
    pub darts: u32,
    pub checkout: u16,
}

/// Final statistics for one player in one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub player_id: PlayerId,
    pub name: String,
    pub legs_won: u32,
    pub sets_won: u32,
    pub darts_thrown: u32,
    pub score_thrown: u32,
    pub average: f64,
    pub one_eighties: u32,
    pub ton_forties: u32,
    pub tons: u32,
    pub checkout_attempts: u32,
    pub checkout_successes: u32,
    pub highest_checkout: u16,
    pub best_leg_darts: Option<u32>,
    pub is_winner: bool,
}

impl ParticipantRecord {
    pub fn from_player(player: &MatchPlayer, winner: Option<PlayerId>) -> Self {
        Self {
            player_id: player.id,
            name: player.name.clone(),
            legs_won: player.total_legs_won,
            sets_won: player.sets_won,
            darts_thrown: player.darts_thrown,
            score_thrown: player.score_thrown,
            average: player.game_average,
            one_eighties: player.one_eighties,
            ton_forties: player.ton_forties,
            tons: player.tons,
            checkout_attempts: player.checkout_attempts,
            checkout_successes: player.checkout_successes,
            highest_checkout: player.highest_checkout,
            best_leg_darts: player.best_leg_darts,
            is_winner: winner == Some(player.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner: Option<PlayerId>,
    pub legs_played: u32,
    pub participants: Vec<ParticipantRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub rules: MatchRules,
    pub players: Vec<PlayerId>,
    #[serde(default)]
    pub legs: Vec<LegRecord>,
    #[serde(default)]
    pub summary: Option<GameSummary>,
}

impl GameRecord {
    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode store data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),
    #[error("no game with id {0}")]
    UnknownGame(GameId),
    #[error("game {0} is already finished")]
    GameClosed(GameId),
    #[error("game {game} has no record of set {set} leg {leg}")]
    UnknownLeg { game: GameId, set: u32, leg: u32 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence collaborator used by the roster and game sessions.
pub trait GameStore {
    fn list_players(&self) -> Result<Vec<PlayerProfile>, StoreError>;
    fn create_player(&self, name: &str, color: &str) -> Result<PlayerProfile, StoreError>;
    fn update_player(&self, profile: &PlayerProfile) -> Result<(), StoreError>;
    fn delete_player(&self, id: PlayerId) -> Result<(), StoreError>;

    fn begin_game(&self, rules: &MatchRules, players: &[PlayerId]) -> Result<GameId, StoreError>;
    fn record_leg(&self, game: GameId, leg: &LegRecord) -> Result<(), StoreError>;
    /// Take back a recorded leg. A finished game is reopened.
    fn retract_leg(&self, game: GameId, set: u32, leg: u32) -> Result<LegRecord, StoreError>;
    fn finish_game(&self, game: GameId, summary: &GameSummary) -> Result<(), StoreError>;
    fn games(&self) -> Result<Vec<GameRecord>, StoreError>;
}

impl<T: GameStore + ?Sized> GameStore for &T {
    fn list_players(&self) -> Result<Vec<PlayerProfile>, StoreError> {
        (**self).list_players()
    }

    fn create_player(&self, name: &str, color: &str) -> Result<PlayerProfile, StoreError> {
        (**self).create_player(name, color)
    }

    fn update_player(&self, profile: &PlayerProfile) -> Result<(), StoreError> {
        (**self).update_player(profile)
    }

    fn delete_player(&self, id: PlayerId) -> Result<(), StoreError> {
        (**self).delete_player(id)
    }

    fn begin_game(&self, rules: &MatchRules, players: &[PlayerId]) -> Result<GameId, StoreError> {
        (**self).begin_game(rules, players)
    }

    fn record_leg(&self, game: GameId, leg: &LegRecord) -> Result<(), StoreError> {
        (**self).record_leg(game, leg)
    }

    fn retract_leg(&self, game: GameId, set: u32, leg: u32) -> Result<LegRecord, StoreError> {
        (**self).retract_leg(game, set, leg)
    }

    fn finish_game(&self, game: GameId, summary: &GameSummary) -> Result<(), StoreError> {
        (**self).finish_game(game, summary)
    }

    fn games(&self) -> Result<Vec<GameRecord>, StoreError> {
        (**self).games()
    }
}

/// The whole persisted dataset. Shared by the in-memory and file stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    pub next_player_id: u32,
    pub next_game_id: u64,
    pub players: Vec<PlayerProfile>,
    pub games: Vec<GameRecord>,
}

impl StoreData {
    pub fn create_player(&mut self, name: &str, color: &str) -> PlayerProfile {
        self.next_player_id += 1;
        let profile = PlayerProfile::new(PlayerId(self.next_player_id), name, color);
        self.players.push(profile.clone());
        profile
    }

    pub fn update_player(&mut self, profile: &PlayerProfile) -> Result<(), StoreError> {
        let slot = self
            .players
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or(StoreError::UnknownPlayer(profile.id))?;
        *slot = profile.clone();
        Ok(())
    }

    pub fn delete_player(&mut self, id: PlayerId) -> Result<(), StoreError> {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        if self.players.len() == before {
            return Err(StoreError::UnknownPlayer(id));
        }
        Ok(())
    }

    pub fn begin_game(&mut self, rules: &MatchRules, players: &[PlayerId]) -> GameId {
        self.next_game_id += 1;
        let id = GameId(self.next_game_id);
        self.games.push(GameRecord {
            id,
            rules: *rules,
            players: players.to_vec(),
            legs: Vec::new(),
            summary: None,
        });
        id
    }

    fn open_game(&mut self, id: GameId) -> Result<&mut GameRecord, StoreError> {
        let game = self
            .games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(StoreError::UnknownGame(id))?;
        if game.is_finished() {
            return Err(StoreError::GameClosed(id));
        }
        Ok(game)
    }

    pub fn record_leg(&mut self, id: GameId, leg: &LegRecord) -> Result<(), StoreError> {
        self.open_game(id)?.legs.push(leg.clone());
        Ok(())
    }

    pub fn retract_leg(&mut self, id: GameId, set: u32, leg: u32) -> Result<LegRecord, StoreError> {
        let game = self
            .games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(StoreError::UnknownGame(id))?;
        let index = game
            .legs
            .iter()
            .rposition(|l| l.set == set && l.leg == leg)
            .ok_or(StoreError::UnknownLeg { game: id, set, leg })?;
        game.summary = None;
        Ok(game.legs.remove(index))
    }

    pub fn finish_game(&mut self, id: GameId, summary: &GameSummary) -> Result<(), StoreError> {
        self.open_game(id)?.summary = Some(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_ids_are_sequential() {
        let mut data = StoreData::default();
        let a = data.create_player("Ada", "#fff");
        let b = data.create_player("Bo", "#000");
        assert_eq!(a.id, PlayerId(1));
        assert_eq!(b.id, PlayerId(2));
        data.delete_player(a.id).unwrap();
        let c = data.create_player("Cy", "#111");
        assert_eq!(c.id, PlayerId(3));
    }

    #[test]
    fn finished_games_are_closed() {
        let mut data = StoreData::default();
        let id = data.begin_game(&MatchRules::default(), &[PlayerId(1)]);
        let summary = GameSummary {
            winner: Some(PlayerId(1)),
            legs_played: 1,
            participants: Vec::new(),
        };
        data.finish_game(id, &summary).unwrap();
        let leg = LegRecord {
            set: 1,
            leg: 2,
            winner: PlayerId(1),
            darts: 15,
            checkout: 40,
        };
        assert!(matches!(
            data.record_leg(id, &leg),
            Err(StoreError::GameClosed(_))
        ));
        assert!(matches!(
            data.record_leg(GameId(99), &leg),
            Err(StoreError::UnknownGame(GameId(99)))
        ));
    }

    #[test]
    fn retracting_a_leg_reopens_the_game() {
        let mut data = StoreData::default();
        let id = data.begin_game(&MatchRules::default(), &[PlayerId(1), PlayerId(2)]);
        let leg = LegRecord {
            set: 1,
            leg: 1,
            winner: PlayerId(1),
            darts: 9,
            checkout: 141,
        };
        data.record_leg(id, &leg).unwrap();
        let summary = GameSummary {
            winner: Some(PlayerId(1)),
            legs_played: 1,
            participants: Vec::new(),
        };
        data.finish_game(id, &summary).unwrap();

        assert_eq!(data.retract_leg(id, 1, 1).unwrap(), leg);
        assert!(data.games[0].legs.is_empty());
        assert!(!data.games[0].is_finished());
        assert!(matches!(
            data.retract_leg(id, 1, 1),
            Err(StoreError::UnknownLeg { set: 1, leg: 1, .. })
        ));

        let corrected = GameSummary {
            winner: Some(PlayerId(2)),
            ..summary
        };
        data.finish_game(id, &corrected).unwrap();
        assert_eq!(data.games[0].summary, Some(corrected));
    }

    #[test]
    fn unknown_players_are_reported() {
        let mut data = StoreData::default();
        let ghost = PlayerProfile::new(PlayerId(5), "Ghost", "#000");
        assert!(matches!(
            data.update_player(&ghost),
            Err(StoreError::UnknownPlayer(PlayerId(5)))
        ));
        assert!(data.delete_player(PlayerId(5)).is_err());
    }
}
