use crate::model::checkout::{self, CheckoutOptions, MAX_TURN_SCORE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remaining scores at or below this may have seen darts thrown at a double.
pub const FINISH_ZONE: u16 = 50;

/// Rejections of a raw score entry. Display is the message shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("Please enter a number")]
    Empty,
    #[error("'{0}' is not a valid score")]
    NotANumber(String),
    #[error("Score must be between 0 and 180 (got {0})")]
    OutOfRange(u32),
    #[error("{0} cannot be scored with three darts")]
    Impossible(u16),
    #[error("{0} cannot be checked out")]
    NoCheckout(u16),
}

/// Parse a raw score entry into a turn total.
pub fn parse_score(raw: &str) -> Result<u16, ScoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScoreError::Empty);
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScoreError::NotANumber(trimmed.to_string()));
    }
    let value: u32 = trimmed
        .parse()
        .map_err(|_| ScoreError::OutOfRange(u32::MAX))?;
    if value > MAX_TURN_SCORE as u32 {
        return Err(ScoreError::OutOfRange(value));
    }
    let value = value as u16;
    if !checkout::is_possible_turn(value) {
        return Err(ScoreError::Impossible(value));
    }
    Ok(value)
}

/// A turn score waiting for the player to say how many darts it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingScore {
    pub scored: u16,
    pub previous_score: u16,
    pub is_checkout: bool,
    pub options: CheckoutOptions,
}

impl PendingScore {
    pub fn remaining(&self) -> u16 {
        self.previous_score.saturating_sub(self.scored)
    }
}

/// What a submitted score does to the active player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Bust { scored: u16, previous_score: u16 },
    Checkout(PendingScore),
    NormalScore { scored: u16, previous_score: u16 },
}

impl Classification {
    pub fn is_bust(&self) -> bool {
        matches!(self, Classification::Bust { .. })
    }
}

/// Classify a validated turn total against the player's current score.
pub fn classify(scored: u16, current_score: u16) -> Result<Classification, ScoreError> {
    let remaining = i32::from(current_score) - i32::from(scored);

    if remaining < 0 || remaining == 1 {
        return Ok(Classification::Bust {
            scored,
            previous_score: current_score,
        });
    }

    let remaining = remaining as u16;
    if remaining == 0 && !checkout::checkout_type(current_score).is_finishable() {
        return Err(ScoreError::NoCheckout(current_score));
    }

    if remaining <= FINISH_ZONE {
        return Ok(Classification::Checkout(PendingScore {
            scored,
            previous_score: current_score,
            is_checkout: remaining == 0,
            options: CheckoutOptions::for_turn(current_score, remaining),
        }));
    }

    Ok(Classification::NormalScore {
        scored,
        previous_score: current_score,
    })
}

/// Parse and classify a raw entry in one step.
pub fn classify_input(raw: &str, current_score: u16) -> Result<Classification, ScoreError> {
    let scored = parse_score(raw)?;
    classify(scored, current_score)
}
