use super::{GameId, GameRecord, GameStore, GameSummary, LegRecord, StoreData, StoreError};
use crate::game::rules::MatchRules;
use crate::model::player::{PlayerId, PlayerProfile};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store backed by a single pretty-printed JSON document.
///
/// Every write rewrites the file; in-memory data only changes once the write succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                context: "reading store",
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw)?
        } else {
            StoreData::default()
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                context: "creating store directory",
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            context: "writing store",
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            context: "replacing store",
            path: self.path.clone(),
            source,
        })?;
        debug!(target: "darts_core::store", path = %self.path.display(), "store written");
        Ok(())
    }

    fn write<T>(
        &self,
        change: impl FnOnce(&mut StoreData) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.data.lock();
        let mut next = guard.clone();
        let value = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(value)
    }
}

impl GameStore for JsonFileStore {
    fn list_players(&self) -> Result<Vec<PlayerProfile>, StoreError> {
        Ok(self.data.lock().players.clone())
    }

    fn create_player(&self, name: &str, color: &str) -> Result<PlayerProfile, StoreError> {
        self.write(|data| Ok(data.create_player(name, color)))
    }

    fn update_player(&self, profile: &PlayerProfile) -> Result<(), StoreError> {
        self.write(|data| data.update_player(profile))
    }

    fn delete_player(&self, id: PlayerId) -> Result<(), StoreError> {
        self.write(|data| data.delete_player(id))
    }

    fn begin_game(&self, rules: &MatchRules, players: &[PlayerId]) -> Result<GameId, StoreError> {
        self.write(|data| Ok(data.begin_game(rules, players)))
    }

    fn record_leg(&self, game: GameId, leg: &LegRecord) -> Result<(), StoreError> {
        self.write(|data| data.record_leg(game, leg))
    }

    fn retract_leg(&self, game: GameId, set: u32, leg: u32) -> Result<LegRecord, StoreError> {
        self.write(|data| data.retract_leg(game, set, leg))
    }

    fn finish_game(&self, game: GameId, summary: &GameSummary) -> Result<(), StoreError> {
        self.write(|data| data.finish_game(game, summary))
    }

    fn games(&self) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.data.lock().games.clone())
    }
}
