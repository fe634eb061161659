use crate::game::completion::Completion;
use crate::game::match_state::{SubmitError, SubmitOutcome, X01Match};
use crate::game::rules::{MatchRules, RulesError};
use crate::model::checkout::DartResolution;
use crate::model::player::{PlayerId, PlayerProfile};
use crate::store::{GameId, GameStore, GameSummary, LegRecord, ParticipantRecord, StoreError};
use tracing::{error, info};

/// An X01 match wired to a store.
///
/// Writes happen after the local state changed and never undo it. A failed
/// write is logged and kept in `last_error`; local play continues. Undoing a
/// finished leg retracts its record, and redo writes it again.
pub struct GameSession<S: GameStore> {
    game: X01Match,
    store: S,
    game_id: Option<GameId>,
    /// Written legs, keyed by the `legs_played` count they closed.
    saved_legs: Vec<(u32, LegRecord)>,
    retracted_legs: Vec<(u32, LegRecord)>,
    result_saved: bool,
    last_error: Option<String>,
}

impl<S: GameStore> GameSession<S> {
    pub fn start(
        store: S,
        profiles: &[PlayerProfile],
        rules: MatchRules,
    ) -> Result<Self, RulesError> {
        let game = X01Match::new(profiles, rules)?;
        let mut session = Self {
            game,
            store,
            game_id: None,
            saved_legs: Vec::new(),
            retracted_legs: Vec::new(),
            result_saved: false,
            last_error: None,
        };
        session.ensure_game_id();
        Ok(session)
    }

    pub fn game(&self) -> &X01Match {
        &self.game
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn game_id(&self) -> Option<GameId> {
        self.game_id
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn submit(&mut self, raw: &str) -> Result<SubmitOutcome, SubmitError> {
        let before = *self.game.progress();
        let outcome = self.game.submit(raw)?;
        self.persist_outcome(before.set, before.leg, &outcome);
        self.forget_retracted();
        Ok(outcome)
    }

    pub fn resolve_checkout(
        &mut self,
        resolution: DartResolution,
    ) -> Result<SubmitOutcome, SubmitError> {
        let before = *self.game.progress();
        let outcome = self.game.resolve_checkout(resolution)?;
        self.persist_outcome(before.set, before.leg, &outcome);
        self.forget_retracted();
        Ok(outcome)
    }

    pub fn cancel_checkout(&mut self) -> bool {
        self.game.cancel_checkout().is_some()
    }

    pub fn skip_turn(&mut self) -> Result<PlayerId, SubmitError> {
        let next = self.game.skip_turn()?;
        self.forget_retracted();
        Ok(next)
    }

    /// Step back one change. Legs the restored state has not played yet are
    /// retracted from the store, reopening a finished game.
    pub fn undo(&mut self) -> bool {
        if !self.game.undo() {
            return false;
        }
        self.retract_unplayed_legs();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.game.redo() {
            return false;
        }
        self.restore_replayed_legs();
        true
    }

    /// Final statistics for every player, in seating order.
    pub fn summary(&self) -> GameSummary {
        let winner = self.game.winner();
        GameSummary {
            winner,
            legs_played: self.game.progress().legs_played,
            participants: self
                .game
                .players()
                .iter()
                .map(|p| ParticipantRecord::from_player(p, winner))
                .collect(),
        }
    }

    fn ensure_game_id(&mut self) -> Option<GameId> {
        if self.game_id.is_none() {
            let players: Vec<PlayerId> = self.game.players().iter().map(|p| p.id).collect();
            match self.store.begin_game(self.game.rules(), &players) {
                Ok(id) => self.game_id = Some(id),
                Err(err) => self.record_failure("begin_game", err),
            }
        }
        self.game_id
    }

    fn persist_outcome(&mut self, set: u32, leg: u32, outcome: &SubmitOutcome) {
        let SubmitOutcome::Applied {
            turn,
            completion: Some(completion),
            ..
        } = outcome
        else {
            return;
        };
        let Some(game_id) = self.ensure_game_id() else {
            return;
        };

        let (winner, darts) = match *completion {
            Completion::LegWon { player, darts, .. }
            | Completion::SetWon { player, darts, .. }
            | Completion::MatchWon { player, darts } => (player, darts),
        };
        let record = LegRecord {
            set,
            leg,
            winner,
            darts,
            checkout: turn.scored,
        };
        match self.store.record_leg(game_id, &record) {
            Ok(()) => self
                .saved_legs
                .push((self.game.progress().legs_played, record)),
            Err(err) => self.record_failure("record_leg", err),
        }

        if completion.is_match_over() {
            self.save_result(game_id, winner);
        }
    }

    fn save_result(&mut self, game_id: GameId, winner: PlayerId) {
        let summary = self.summary();
        match self.store.finish_game(game_id, &summary) {
            Ok(()) => {
                self.result_saved = true;
                info!(
                    target: "darts_core::session",
                    game = %game_id,
                    winner = %winner,
                    legs = summary.legs_played,
                    "match result saved"
                );
            }
            Err(err) => self.record_failure("finish_game", err),
        }
    }

    fn retract_unplayed_legs(&mut self) {
        let Some(game_id) = self.game_id else {
            return;
        };
        let played = self.game.progress().legs_played;
        while self.saved_legs.last().is_some_and(|(closed, _)| *closed > played) {
            let Some((closed, record)) = self.saved_legs.pop() else {
                break;
            };
            match self.store.retract_leg(game_id, record.set, record.leg) {
                Ok(_) => {
                    self.result_saved = false;
                    info!(
                        target: "darts_core::session",
                        game = %game_id,
                        set = record.set,
                        leg = record.leg,
                        "leg retracted"
                    );
                    self.retracted_legs.push((closed, record));
                }
                Err(err) => self.record_failure("retract_leg", err),
            }
        }
    }

    fn restore_replayed_legs(&mut self) {
        let Some(game_id) = self.game_id else {
            return;
        };
        let played = self.game.progress().legs_played;
        while self
            .retracted_legs
            .last()
            .is_some_and(|(closed, _)| *closed <= played)
        {
            let Some((closed, record)) = self.retracted_legs.pop() else {
                break;
            };
            match self.store.record_leg(game_id, &record) {
                Ok(()) => self.saved_legs.push((closed, record)),
                Err(err) => self.record_failure("record_leg", err),
            }
        }
        if let Some(winner) = self.game.winner().filter(|_| !self.result_saved) {
            self.save_result(game_id, winner);
        }
    }

    /// A fresh change invalidates redo, so retracted legs will not come back.
    fn forget_retracted(&mut self) {
        if !self.game.can_redo() {
            self.retracted_legs.clear();
        }
    }

    fn record_failure(&mut self, operation: &'static str, err: StoreError) {
        error!(target: "darts_core::session", operation, error = %err, "persisting match data failed");
        self.last_error = Some(err.to_string());
    }
}
