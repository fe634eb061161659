use crate::model::checkout::DartResolution;
use crate::model::player::MatchPlayer;
use crate::stats::three_dart_average;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Scored,
    Bust,
    Checkout,
}

/// One visit to the oche as it was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Points that counted; zero for a bust.
    pub scored: u16,
    /// Points the player entered.
    pub entered: u16,
    pub remaining: u16,
    pub darts: u8,
    pub darts_at_double: u8,
    pub kind: TurnKind,
}

impl TurnRecord {
    pub fn is_bust(&self) -> bool {
        self.kind == TurnKind::Bust
    }

    pub fn is_checkout(&self) -> bool {
        self.kind == TurnKind::Checkout
    }
}

/// Apply a counted score to `player` and return the recorded turn.
///
/// The caller guarantees `scored <= player.score` and that the remainder is not 1.
pub fn apply_score(
    player: &mut MatchPlayer,
    scored: u16,
    resolution: DartResolution,
) -> TurnRecord {
    let remaining = player.score - scored;
    let kind = if remaining == 0 {
        TurnKind::Checkout
    } else {
        TurnKind::Scored
    };
    let record = TurnRecord {
        scored,
        entered: scored,
        remaining,
        darts: resolution.darts_used,
        darts_at_double: resolution.darts_at_double,
        kind,
    };

    player.score = remaining;
    player.checkout_attempts += u32::from(resolution.darts_at_double);
    if kind == TurnKind::Checkout {
        player.checkout_successes += 1;
        player.highest_checkout = player.highest_checkout.max(scored);
    }
    count_milestones(player, scored);
    push_turn(player, record);
    record
}

/// Record a bust: three darts, nothing counts, score unchanged.
pub fn apply_bust(player: &mut MatchPlayer, entered: u16) -> TurnRecord {
    let record = TurnRecord {
        scored: 0,
        entered,
        remaining: player.score,
        darts: 3,
        darts_at_double: 0,
        kind: TurnKind::Bust,
    };
    push_turn(player, record);
    record
}

fn count_milestones(player: &mut MatchPlayer, scored: u16) {
    match scored {
        180 => player.one_eighties += 1,
        140..=179 => player.ton_forties += 1,
        100..=139 => player.tons += 1,
        _ => {}
    }
    player.highest_score = player.highest_score.max(scored);
}

fn push_turn(player: &mut MatchPlayer, record: TurnRecord) {
    let darts = u32::from(record.darts);
    let scored = u32::from(record.scored);

    player.turns.push_front(record);
    player.leg_turns.push_front(record);
    player.darts_thrown += darts;
    player.darts_thrown_leg += darts;
    player.score_thrown += scored;
    player.score_thrown_leg += scored;
    recompute_averages(player);
}

pub fn recompute_averages(player: &mut MatchPlayer) {
    player.leg_average = three_dart_average(player.score_thrown_leg, player.darts_thrown_leg);
    player.game_average = three_dart_average(player.score_thrown, player.darts_thrown);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::{PlayerId, PlayerProfile};

    fn player(score: u16) -> MatchPlayer {
        MatchPlayer::new(&PlayerProfile::new(PlayerId(1), "Ada", "#fff"), score)
    }

    #[test]
    fn score_is_prepended_and_averaged() {
        let mut p = player(501);
        apply_score(&mut p, 100, DartResolution::FULL_VISIT);
        apply_score(&mut p, 60, DartResolution::FULL_VISIT);
        assert_eq!(p.score, 341);
        assert_eq!(p.turns.len(), 2);
        assert_eq!(p.turns[0].scored, 60);
        assert_eq!(p.turns[1].scored, 100);
        assert_eq!(p.leg_average, 80.0);
        assert_eq!(p.game_average, 80.0);
        assert_eq!(p.tons, 1);
        assert_eq!(p.highest_score, 100);
    }

    #[test]
    fn bust_costs_three_darts_and_keeps_score() {
        let mut p = player(40);
        let record = apply_bust(&mut p, 60);
        assert!(record.is_bust());
        assert_eq!(record.entered, 60);
        assert_eq!(p.score, 40);
        assert_eq!(p.darts_thrown_leg, 3);
        assert_eq!(p.leg_average, 0.0);
        assert_eq!(p.turns.len(), 1);
    }

    #[test]
    fn checkout_counts_success_and_fewer_darts() {
        let mut p = player(501);
        apply_score(&mut p, 180, DartResolution::FULL_VISIT);
        apply_score(&mut p, 180, DartResolution::FULL_VISIT);
        let record = apply_score(&mut p, 141, DartResolution::new(3, 1));
        assert!(record.is_checkout());
        assert_eq!(p.score, 0);
        assert_eq!(p.darts_thrown_leg, 9);
        assert_eq!(p.leg_average, 167.0);
        assert_eq!(p.checkout_successes, 1);
        assert_eq!(p.checkout_attempts, 1);
        assert_eq!(p.highest_checkout, 141);
        assert_eq!(p.one_eighties, 2);
        assert_eq!(p.ton_forties, 1);

        let mut q = player(40);
        apply_score(&mut q, 40, DartResolution::new(1, 1));
        assert_eq!(q.darts_thrown_leg, 1);
        assert_eq!(q.leg_average, 120.0);
    }

    #[test]
    fn missed_doubles_count_as_attempts() {
        let mut p = player(40);
        apply_score(&mut p, 20, DartResolution::new(3, 2));
        assert_eq!(p.checkout_attempts, 2);
        assert_eq!(p.checkout_successes, 0);
        assert_eq!(p.checkout_percentage(), 0.0);
    }

    #[test]
    fn leg_average_matches_formula_over_many_turns() {
        let mut p = player(501);
        let scores = [45u16, 26, 85, 60, 41];
        for s in scores {
            apply_score(&mut p, s, DartResolution::FULL_VISIT);
        }
        let total: u32 = scores.iter().map(|&s| u32::from(s)).sum();
        let expected = ((total as f64 / 15.0 * 3.0) * 100.0).round() / 100.0;
        assert_eq!(p.leg_average, expected);
    }
}
