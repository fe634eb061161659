use crate::game::completion::{Completion, MatchProgress, complete_leg};
use crate::game::history::UndoHistory;
use crate::game::rules::{MAX_PLAYERS, MIN_PLAYERS, MatchRules, RulesError};
use crate::model::checkout::DartResolution;
use crate::model::player::{MatchPlayer, PlayerId, PlayerProfile};
use crate::model::score::{Classification, PendingScore, ScoreError, classify, parse_score};
use crate::model::turn::{TurnRecord, apply_bust, apply_score};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Everything an undo restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFrame {
    pub players: Vec<MatchPlayer>,
    pub progress: MatchProgress,
    pub winner: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Applied {
        player: PlayerId,
        turn: TurnRecord,
        completion: Option<Completion>,
    },
    Bust {
        player: PlayerId,
        turn: TurnRecord,
    },
    CheckoutPending(PendingScore),
}

impl SubmitOutcome {
    pub fn completion(&self) -> Option<Completion> {
        match self {
            SubmitOutcome::Applied { completion, .. } => *completion,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("Enter the darts used for the pending checkout first")]
    CheckoutPending,
    #[error("There is no checkout waiting for darts")]
    NoPendingCheckout,
    #[error("{} darts with {} at a double is not possible for this turn", .0.darts_used, .0.darts_at_double)]
    InvalidResolution(DartResolution),
    #[error("The match is already over")]
    MatchFinished,
}

/// Live state of an X01 match and the transitions between turns.
#[derive(Debug, Clone)]
pub struct X01Match {
    rules: MatchRules,
    frame: MatchFrame,
    pending: Option<PendingScore>,
    history: UndoHistory<MatchFrame>,
}

impl X01Match {
    pub fn new(profiles: &[PlayerProfile], rules: MatchRules) -> Result<Self, RulesError> {
        rules.validate()?;
        validate_roster(profiles)?;

        let players = profiles
            .iter()
            .map(|profile| MatchPlayer::new(profile, rules.start_score))
            .collect();
        let mut state = Self {
            rules,
            frame: MatchFrame {
                players,
                progress: MatchProgress::new(),
                winner: None,
            },
            pending: None,
            history: UndoHistory::new(),
        };
        state.set_active(0);
        Ok(state)
    }

    /// Rebuild a match from a saved frame. Undo history starts empty.
    pub fn from_frame(
        rules: MatchRules,
        frame: MatchFrame,
        pending: Option<PendingScore>,
    ) -> Result<Self, RulesError> {
        rules.validate()?;
        let profiles: Vec<PlayerProfile> = frame.players.iter().map(MatchPlayer::profile).collect();
        validate_roster(&profiles)?;

        let mut state = Self {
            rules,
            frame,
            pending,
            history: UndoHistory::new(),
        };
        if state.frame.players.iter().filter(|p| p.is_active).count() != 1 {
            let starter = state.frame.progress.leg_starter % state.frame.players.len();
            state.set_active(starter);
        }
        if let Some(pending) = &state.pending {
            let score = state.active_player().score;
            if pending.previous_score != score || pending.scored > pending.previous_score {
                return Err(RulesError::StalePending {
                    scored: pending.scored,
                    previous_score: pending.previous_score,
                    score,
                });
            }
        }
        Ok(state)
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn frame(&self) -> &MatchFrame {
        &self.frame
    }

    pub fn players(&self) -> &[MatchPlayer] {
        &self.frame.players
    }

    pub fn progress(&self) -> &MatchProgress {
        &self.frame.progress
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.frame.winner
    }

    pub fn is_finished(&self) -> bool {
        self.frame.winner.is_some()
    }

    pub fn pending(&self) -> Option<&PendingScore> {
        self.pending.as_ref()
    }

    pub fn active_index(&self) -> usize {
        self.frame
            .players
            .iter()
            .position(|p| p.is_active)
            .unwrap_or(0)
    }

    pub fn active_player(&self) -> &MatchPlayer {
        &self.frame.players[self.active_index()]
    }

    pub fn player(&self, id: PlayerId) -> Option<&MatchPlayer> {
        self.frame.players.iter().find(|p| p.id == id)
    }

    pub fn can_undo(&self) -> bool {
        self.pending.is_some() || self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Submit a raw score entry for the active player.
    pub fn submit(&mut self, raw: &str) -> Result<SubmitOutcome, SubmitError> {
        self.ensure_accepting()?;
        let scored = parse_score(raw)?;
        self.submit_score(scored)
    }

    /// Submit an already parsed turn total for the active player.
    pub fn submit_score(&mut self, scored: u16) -> Result<SubmitOutcome, SubmitError> {
        self.ensure_accepting()?;
        let index = self.active_index();
        let classification = classify(scored, self.frame.players[index].score)?;

        match classification {
            Classification::Bust { scored, .. } => {
                self.history.record(self.frame.clone());
                let player = &mut self.frame.players[index];
                let turn = apply_bust(player, scored);
                let id = player.id;
                debug!(target: "darts_core::turn", player = %id, entered = scored, "bust");
                self.advance_turn();
                Ok(SubmitOutcome::Bust { player: id, turn })
            }
            Classification::NormalScore { scored, .. } => {
                Ok(self.apply_resolved(scored, DartResolution::FULL_VISIT))
            }
            Classification::Checkout(pending) => match pending.options.only() {
                Some(resolution) => Ok(self.apply_resolved(pending.scored, resolution)),
                None => {
                    debug!(
                        target: "darts_core::turn",
                        scored = pending.scored,
                        previous = pending.previous_score,
                        is_checkout = pending.is_checkout,
                        "awaiting dart count"
                    );
                    self.pending = Some(pending.clone());
                    Ok(SubmitOutcome::CheckoutPending(pending))
                }
            },
        }
    }

    /// Complete a pending checkout with the darts the player reports.
    pub fn resolve_checkout(
        &mut self,
        resolution: DartResolution,
    ) -> Result<SubmitOutcome, SubmitError> {
        let pending = self.pending.as_ref().ok_or(SubmitError::NoPendingCheckout)?;
        if !pending.options.allows(resolution) {
            return Err(SubmitError::InvalidResolution(resolution));
        }
        let scored = pending.scored;
        self.pending = None;
        Ok(self.apply_resolved(scored, resolution))
    }

    /// Drop a pending checkout without recording anything.
    pub fn cancel_checkout(&mut self) -> Option<PendingScore> {
        self.pending.take()
    }

    /// Pass the turn on without recording a visit.
    pub fn skip_turn(&mut self) -> Result<PlayerId, SubmitError> {
        self.ensure_accepting()?;
        self.history.record(self.frame.clone());
        self.advance_turn();
        Ok(self.active_player().id)
    }

    /// Restore the state before the last change. A pending checkout is discarded first.
    pub fn undo(&mut self) -> bool {
        if self.pending.take().is_some() {
            return true;
        }
        match self.history.undo(self.frame.clone()) {
            Some(previous) => {
                self.frame = previous;
                debug!(target: "darts_core::turn", "undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.pending = None;
        match self.history.redo(self.frame.clone()) {
            Some(next) => {
                self.frame = next;
                debug!(target: "darts_core::turn", "redo");
                true
            }
            None => false,
        }
    }

    fn ensure_accepting(&self) -> Result<(), SubmitError> {
        if self.is_finished() {
            return Err(SubmitError::MatchFinished);
        }
        if self.pending.is_some() {
            return Err(SubmitError::CheckoutPending);
        }
        Ok(())
    }

    fn apply_resolved(&mut self, scored: u16, resolution: DartResolution) -> SubmitOutcome {
        self.history.record(self.frame.clone());
        let index = self.active_index();
        let player = &mut self.frame.players[index];
        let turn = apply_score(player, scored, resolution);
        let id = player.id;
        debug!(
            target: "darts_core::turn",
            player = %id,
            scored,
            remaining = turn.remaining,
            darts = resolution.darts_used,
            "turn applied"
        );

        let completion = if turn.is_checkout() {
            let completion = complete_leg(
                &mut self.frame.players,
                index,
                &self.rules,
                &mut self.frame.progress,
            );
            if completion.is_match_over() {
                self.frame.winner = Some(id);
            } else {
                let starter = self.frame.progress.leg_starter;
                self.set_active(starter);
            }
            Some(completion)
        } else {
            self.advance_turn();
            None
        };

        SubmitOutcome::Applied {
            player: id,
            turn,
            completion,
        }
    }

    fn advance_turn(&mut self) {
        let next = (self.active_index() + 1) % self.frame.players.len();
        self.set_active(next);
    }

    fn set_active(&mut self, index: usize) {
        for (i, player) in self.frame.players.iter_mut().enumerate() {
            player.is_active = i == index;
        }
    }
}

fn validate_roster(profiles: &[PlayerProfile]) -> Result<(), RulesError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&profiles.len()) {
        return Err(RulesError::PlayerCount(profiles.len()));
    }
    let mut seen = HashSet::new();
    for profile in profiles {
        if !seen.insert(profile.id) {
            return Err(RulesError::DuplicatePlayer(profile.name.clone()));
        }
    }
    Ok(())
}
