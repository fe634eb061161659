use crate::model::turn::TurnRecord;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

pub const DEFAULT_COLORS: [&str; 8] = [
    "#e53935", "#1e88e5", "#43a047", "#fdd835", "#8e24aa", "#fb8c00", "#00acc1", "#6d4c41",
];

/// A persisted player, independent of any match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
}

impl PlayerProfile {
    pub fn new(id: PlayerId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }

    /// Palette color for the nth player when none was chosen.
    pub fn default_color(index: usize) -> &'static str {
        DEFAULT_COLORS[index % DEFAULT_COLORS.len()]
    }
}

/// A player's state inside an X01 match.
///
/// Turn lists are kept most-recent-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayer {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub score: u16,
    pub turns: VecDeque<TurnRecord>,
    pub leg_turns: VecDeque<TurnRecord>,
    pub darts_thrown: u32,
    pub darts_thrown_leg: u32,
    pub score_thrown: u32,
    pub score_thrown_leg: u32,
    pub checkout_attempts: u32,
    pub checkout_successes: u32,
    pub leg_average: f64,
    pub game_average: f64,
    pub legs_won: u32,
    pub sets_won: u32,
    pub total_legs_won: u32,
    pub one_eighties: u32,
    pub ton_forties: u32,
    pub tons: u32,
    pub highest_score: u16,
    pub highest_checkout: u16,
    pub best_leg_darts: Option<u32>,
    pub is_active: bool,
}

impl MatchPlayer {
    pub fn new(profile: &PlayerProfile, start_score: u16) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            color: profile.color.clone(),
            score: start_score,
            turns: VecDeque::new(),
            leg_turns: VecDeque::new(),
            darts_thrown: 0,
            darts_thrown_leg: 0,
            score_thrown: 0,
            score_thrown_leg: 0,
            checkout_attempts: 0,
            checkout_successes: 0,
            leg_average: 0.0,
            game_average: 0.0,
            legs_won: 0,
            sets_won: 0,
            total_legs_won: 0,
            one_eighties: 0,
            ton_forties: 0,
            tons: 0,
            highest_score: 0,
            highest_checkout: 0,
            best_leg_darts: None,
            is_active: false,
        }
    }

    pub fn profile(&self) -> PlayerProfile {
        PlayerProfile::new(self.id, self.name.clone(), self.color.clone())
    }

    /// Clear everything that only lives for one leg.
    pub fn reset_for_leg(&mut self, start_score: u16) {
        self.score = start_score;
        self.leg_turns.clear();
        self.darts_thrown_leg = 0;
        self.score_thrown_leg = 0;
        self.leg_average = 0.0;
    }

    pub fn checkout_percentage(&self) -> f64 {
        crate::stats::percentage(self.checkout_successes, self.checkout_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> PlayerProfile {
        PlayerProfile::new(PlayerId(7), "Ada", "#ffffff")
    }

    #[test]
    fn new_player_starts_at_start_score() {
        let player = MatchPlayer::new(&profile(), 501);
        assert_eq!(player.score, 501);
        assert!(player.turns.is_empty());
        assert!(!player.is_active);
        assert_eq!(player.profile(), profile());
    }

    #[test]
    fn leg_reset_keeps_match_totals() {
        let mut player = MatchPlayer::new(&profile(), 501);
        player.score = 40;
        player.darts_thrown = 30;
        player.darts_thrown_leg = 12;
        player.score_thrown_leg = 461;
        player.leg_average = 115.25;
        player.reset_for_leg(501);
        assert_eq!(player.score, 501);
        assert_eq!(player.darts_thrown, 30);
        assert_eq!(player.darts_thrown_leg, 0);
        assert_eq!(player.leg_average, 0.0);
    }

    #[test]
    fn default_colors_cycle() {
        assert_eq!(PlayerProfile::default_color(0), PlayerProfile::default_color(8));
        assert_eq!(PlayerId(3).to_string(), "P3");
    }
}
