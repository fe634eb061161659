use crate::game::history::UndoHistory;
use crate::game::rules::{MAX_PLAYERS, MIN_PLAYERS, RulesError};
use crate::model::dart::Dart;
use crate::model::player::{PlayerId, PlayerProfile};
use crate::stats::three_dart_average;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const TARGETS: [u8; 7] = [15, 16, 17, 18, 19, 20, 25];
pub const MARKS_TO_CLOSE: u8 = 3;

fn target_index(dart: Dart) -> Option<usize> {
    let number = dart.number()?;
    TARGETS.iter().position(|&t| t == number)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CricketPlayer {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub marks: [u8; 7],
    pub points: u32,
    pub darts_thrown: u32,
    pub marks_scored: u32,
    pub marks_per_round: f64,
    pub is_active: bool,
}

impl CricketPlayer {
    fn new(profile: &PlayerProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            color: profile.color.clone(),
            marks: [0; 7],
            points: 0,
            darts_thrown: 0,
            marks_scored: 0,
            marks_per_round: 0.0,
            is_active: false,
        }
    }

    pub fn marks_on(&self, target: u8) -> Option<u8> {
        TARGETS
            .iter()
            .position(|&t| t == target)
            .map(|i| self.marks[i])
    }

    pub fn has_closed_all(&self) -> bool {
        self.marks.iter().all(|&m| m >= MARKS_TO_CLOSE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CricketFrame {
    pub players: Vec<CricketPlayer>,
    pub round: u32,
    pub winner: Option<PlayerId>,
}

/// Result of one visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CricketTurn {
    pub player: PlayerId,
    pub marks: u32,
    pub points: u32,
    pub darts: u32,
    pub winner: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CricketError {
    #[error("a visit is at most three darts (got {0})")]
    TooManyDarts(usize),
    #[error("The match is already over")]
    MatchFinished,
    #[error(transparent)]
    Rules(#[from] RulesError),
}

#[derive(Debug, Clone)]
pub struct CricketMatch {
    frame: CricketFrame,
    history: UndoHistory<CricketFrame>,
}

impl CricketMatch {
    pub fn new(profiles: &[PlayerProfile]) -> Result<Self, CricketError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&profiles.len()) {
            return Err(RulesError::PlayerCount(profiles.len()).into());
        }
        let mut players: Vec<CricketPlayer> = profiles.iter().map(CricketPlayer::new).collect();
        for (i, player) in players.iter().enumerate() {
            if players[..i].iter().any(|p| p.id == player.id) {
                return Err(RulesError::DuplicatePlayer(player.name.clone()).into());
            }
        }
        players[0].is_active = true;

        Ok(Self {
            frame: CricketFrame {
                players,
                round: 1,
                winner: None,
            },
            history: UndoHistory::new(),
        })
    }

    pub fn players(&self) -> &[CricketPlayer] {
        &self.frame.players
    }

    pub fn frame(&self) -> &CricketFrame {
        &self.frame
    }

    pub fn round(&self) -> u32 {
        self.frame.round
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.frame.winner
    }

    pub fn is_finished(&self) -> bool {
        self.frame.winner.is_some()
    }

    pub fn active_index(&self) -> usize {
        self.frame
            .players
            .iter()
            .position(|p| p.is_active)
            .unwrap_or(0)
    }

    pub fn active_player(&self) -> &CricketPlayer {
        &self.frame.players[self.active_index()]
    }

    /// Score a visit for the active player. Fewer than three darts means the rest missed.
    pub fn submit_darts(&mut self, darts: &[Dart]) -> Result<CricketTurn, CricketError> {
        if self.is_finished() {
            return Err(CricketError::MatchFinished);
        }
        if darts.len() > 3 {
            return Err(CricketError::TooManyDarts(darts.len()));
        }

        self.history.record(self.frame.clone());
        let index = self.active_index();
        let mut turn = CricketTurn {
            player: self.frame.players[index].id,
            marks: 0,
            points: 0,
            darts: 3,
            winner: None,
        };

        for (thrown, dart) in darts.iter().enumerate() {
            let (marks, points) = self.score_dart(index, *dart);
            turn.marks += marks;
            turn.points += points;
            if self.has_won(index) {
                turn.darts = thrown as u32 + 1;
                turn.winner = Some(turn.player);
                break;
            }
        }

        let player = &mut self.frame.players[index];
        player.darts_thrown += turn.darts;
        player.marks_scored += turn.marks;
        player.marks_per_round = three_dart_average(player.marks_scored, player.darts_thrown);
        debug!(
            target: "darts_core::cricket",
            player = %turn.player,
            marks = turn.marks,
            points = turn.points,
            "cricket visit"
        );

        if let Some(winner) = turn.winner {
            self.frame.winner = Some(winner);
            info!(target: "darts_core::cricket", player = %winner, round = self.frame.round, "cricket match won");
        } else {
            self.advance_turn();
        }
        Ok(turn)
    }

    pub fn skip_turn(&mut self) -> Result<PlayerId, CricketError> {
        if self.is_finished() {
            return Err(CricketError::MatchFinished);
        }
        self.history.record(self.frame.clone());
        self.advance_turn();
        Ok(self.active_player().id)
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.frame.clone()) {
            Some(previous) => {
                self.frame = previous;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.frame.clone()) {
            Some(next) => {
                self.frame = next;
                true
            }
            None => false,
        }
    }

    /// Returns (marks that counted, points scored).
    fn score_dart(&mut self, index: usize, dart: Dart) -> (u32, u32) {
        let Some(target) = target_index(dart) else {
            return (0, 0);
        };
        let hits = dart.marks();
        let current = self.frame.players[index].marks[target];
        let closing = hits.min(MARKS_TO_CLOSE.saturating_sub(current));
        let extra = hits - closing;

        let opponent_open = self
            .frame
            .players
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && p.marks[target] < MARKS_TO_CLOSE);

        let player = &mut self.frame.players[index];
        player.marks[target] = current + closing;

        if extra > 0 && opponent_open {
            let points = u32::from(extra) * u32::from(TARGETS[target]);
            player.points += points;
            (u32::from(hits), points)
        } else {
            (u32::from(closing), 0)
        }
    }

    fn has_won(&self, index: usize) -> bool {
        let player = &self.frame.players[index];
        player.has_closed_all()
            && self
                .frame
                .players
                .iter()
                .enumerate()
                .all(|(i, p)| i == index || p.points <= player.points)
    }

    fn advance_turn(&mut self) {
        let next = (self.active_index() + 1) % self.frame.players.len();
        if next == 0 {
            self.frame.round += 1;
        }
        for (i, player) in self.frame.players.iter_mut().enumerate() {
            player.is_active = i == next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> CricketMatch {
        let profiles = vec![
            PlayerProfile::new(PlayerId(1), "Ada", "#e53935"),
            PlayerProfile::new(PlayerId(2), "Bo", "#1e88e5"),
        ];
        CricketMatch::new(&profiles).unwrap()
    }

    fn darts(notation: &[&str]) -> Vec<Dart> {
        notation.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn treble_closes_a_target() {
        let mut game = game();
        let turn = game.submit_darts(&darts(&["T20", "S3", "MISS"])).unwrap();
        assert_eq!(turn.marks, 3);
        assert_eq!(turn.points, 0);
        assert_eq!(game.players()[0].marks_on(20), Some(3));
        assert_eq!(game.players()[0].marks_per_round, 3.0);
        assert_eq!(game.active_index(), 1);
    }

    #[test]
    fn extra_marks_score_while_opponent_open() {
        let mut game = game();
        let turn = game.submit_darts(&darts(&["T20", "T20", "S20"])).unwrap();
        assert_eq!(turn.points, 80);
        assert_eq!(turn.marks, 7);
        assert_eq!(game.players()[0].points, 80);
    }

    #[test]
    fn no_points_once_everyone_closed() {
        let mut game = game();
        game.submit_darts(&darts(&["T19"])).unwrap();
        game.submit_darts(&darts(&["T19"])).unwrap();
        let turn = game.submit_darts(&darts(&["T19"])).unwrap();
        assert_eq!(turn.points, 0);
        assert_eq!(turn.marks, 0);
        assert_eq!(game.round(), 2);
    }

    #[test]
    fn bull_counts_as_one_or_two_marks() {
        let mut game = game();
        game.submit_darts(&darts(&["25", "BULL"])).unwrap();
        assert_eq!(game.players()[0].marks_on(25), Some(3));
    }

    #[test]
    fn closing_everything_with_lead_wins() {
        let mut game = game();
        let plan = [
            ["T20", "T19", "T18"],
            ["T17", "T16", "T15"],
        ];
        game.submit_darts(&darts(&plan[0])).unwrap();
        game.skip_turn().unwrap();
        game.submit_darts(&darts(&plan[1])).unwrap();
        game.skip_turn().unwrap();
        let turn = game.submit_darts(&darts(&["BULL", "25", "T20"])).unwrap();
        assert_eq!(turn.winner, Some(PlayerId(1)));
        assert_eq!(turn.darts, 2);
        assert!(game.is_finished());
        assert_eq!(
            game.submit_darts(&darts(&["T20"])),
            Err(CricketError::MatchFinished)
        );
    }

    #[test]
    fn undo_restores_marks() {
        let mut game = game();
        game.submit_darts(&darts(&["T20"])).unwrap();
        assert!(game.undo());
        assert_eq!(game.players()[0].marks_on(20), Some(0));
        assert_eq!(game.active_index(), 0);
        assert!(game.redo());
        assert_eq!(game.players()[0].marks_on(20), Some(3));
    }

    #[test]
    fn rejects_four_darts() {
        let mut game = game();
        assert_eq!(
            game.submit_darts(&darts(&["T20", "T20", "T20", "T20"])),
            Err(CricketError::TooManyDarts(4))
        );
    }
}
