use super::{GameStore, StoreError};
use crate::model::player::{PlayerId, PlayerProfile};
use thiserror::Error;
use tracing::warn;

pub const MAX_NAME_LEN: usize = 24;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Player name cannot be empty")]
    EmptyName,
    #[error("Player name must be at most 24 characters")]
    NameTooLong,
    #[error("A player named '{0}' already exists")]
    DuplicateName(String),
    #[error("No player with id {0}")]
    UnknownPlayer(PlayerId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The known players plus load state, kept for the lifetime of an app session.
#[derive(Debug, Default)]
pub struct PlayerRoster {
    players: Vec<PlayerProfile>,
    loading: bool,
    error: Option<String>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[PlayerProfile] {
        &self.players
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find(&self, id: PlayerId) -> Option<&PlayerProfile> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PlayerProfile> {
        let name = name.trim();
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Reload from the store. On failure the previous list is kept and the error recorded.
    pub fn load(&mut self, store: &dyn GameStore) -> Result<(), RosterError> {
        self.loading = true;
        let result = store.list_players();
        self.loading = false;
        match result {
            Ok(players) => {
                self.players = players;
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn add_player(
        &mut self,
        store: &dyn GameStore,
        name: &str,
        color: Option<&str>,
    ) -> Result<PlayerProfile, RosterError> {
        let name = self.validate_name(name, None)?;
        let color = color
            .map(str::to_string)
            .unwrap_or_else(|| PlayerProfile::default_color(self.players.len()).to_string());
        let profile = store
            .create_player(&name, &color)
            .map_err(|err| self.fail(err))?;
        self.players.push(profile.clone());
        self.error = None;
        Ok(profile)
    }

    pub fn rename_player(
        &mut self,
        store: &dyn GameStore,
        id: PlayerId,
        name: &str,
    ) -> Result<(), RosterError> {
        let name = self.validate_name(name, Some(id))?;
        let mut profile = self.find(id).cloned().ok_or(RosterError::UnknownPlayer(id))?;
        profile.name = name;
        store.update_player(&profile).map_err(|err| self.fail(err))?;
        if let Some(slot) = self.players.iter_mut().find(|p| p.id == id) {
            *slot = profile;
        }
        self.error = None;
        Ok(())
    }

    pub fn remove_player(&mut self, store: &dyn GameStore, id: PlayerId) -> Result<(), RosterError> {
        if self.find(id).is_none() {
            return Err(RosterError::UnknownPlayer(id));
        }
        store.delete_player(id).map_err(|err| self.fail(err))?;
        self.players.retain(|p| p.id != id);
        self.error = None;
        Ok(())
    }

    fn validate_name(&self, name: &str, except: Option<PlayerId>) -> Result<String, RosterError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(RosterError::NameTooLong);
        }
        if let Some(existing) = self.find_by_name(trimmed) {
            if Some(existing.id) != except {
                return Err(RosterError::DuplicateName(existing.name.clone()));
            }
        }
        Ok(trimmed.to_string())
    }

    fn fail(&mut self, err: StoreError) -> RosterError {
        warn!(target: "darts_core::roster", error = %err, "player store request failed");
        self.error = Some(err.to_string());
        RosterError::Store(err)
    }
}
