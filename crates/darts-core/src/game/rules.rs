use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const START_SCORES: [u16; 5] = [101, 301, 501, 701, 901];
pub const MIN_PLAYERS: usize = 1;
pub const MAX_PLAYERS: usize = 8;

/// Format of an X01 match. Legs and sets are "first to".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRules {
    pub start_score: u16,
    pub legs_per_set: u32,
    pub sets_to_win: u32,
}

impl MatchRules {
    pub const fn new(start_score: u16, legs_per_set: u32, sets_to_win: u32) -> Self {
        Self {
            start_score,
            legs_per_set,
            sets_to_win,
        }
    }

    /// A single leg of 501.
    pub const fn single_leg() -> Self {
        Self::new(501, 1, 1)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if !START_SCORES.contains(&self.start_score) {
            return Err(RulesError::StartScore(self.start_score));
        }
        if self.legs_per_set == 0 {
            return Err(RulesError::ZeroLegs);
        }
        if self.sets_to_win == 0 {
            return Err(RulesError::ZeroSets);
        }
        Ok(())
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self::single_leg()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("start score {0} is not supported (use 101, 301, 501, 701 or 901)")]
    StartScore(u16),
    #[error("a set needs at least one leg")]
    ZeroLegs,
    #[error("a match needs at least one set")]
    ZeroSets,
    #[error("a match needs between 1 and 8 players (got {0})")]
    PlayerCount(usize),
    #[error("player {0} appears more than once")]
    DuplicatePlayer(String),
    #[error("pending score of {scored} from {previous_score} does not fit the active player on {score}")]
    StalePending {
        scored: u16,
        previous_score: u16,
        score: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_leg_501() {
        let rules = MatchRules::default();
        assert_eq!(rules.start_score, 501);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn rejects_odd_formats() {
        assert_eq!(
            MatchRules::new(500, 1, 1).validate(),
            Err(RulesError::StartScore(500))
        );
        assert_eq!(MatchRules::new(301, 0, 1).validate(), Err(RulesError::ZeroLegs));
        assert_eq!(MatchRules::new(301, 3, 0).validate(), Err(RulesError::ZeroSets));
    }
}
