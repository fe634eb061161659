use crate::game::rules::MatchRules;
use crate::model::player::{MatchPlayer, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where a match stands. Leg and set numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProgress {
    pub set: u32,
    pub leg: u32,
    pub legs_played: u32,
    pub leg_starter: usize,
}

impl MatchProgress {
    pub const fn new() -> Self {
        Self {
            set: 1,
            leg: 1,
            legs_played: 0,
            leg_starter: 0,
        }
    }
}

impl Default for MatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Completion {
    LegWon {
        player: PlayerId,
        set: u32,
        leg: u32,
        darts: u32,
    },
    SetWon {
        player: PlayerId,
        set: u32,
        darts: u32,
    },
    MatchWon {
        player: PlayerId,
        darts: u32,
    },
}

impl Completion {
    pub fn player(&self) -> PlayerId {
        match self {
            Completion::LegWon { player, .. }
            | Completion::SetWon { player, .. }
            | Completion::MatchWon { player, .. } => *player,
        }
    }

    pub fn is_match_over(&self) -> bool {
        matches!(self, Completion::MatchWon { .. })
    }
}

/// Run the leg/set/match cascade after `winner` checked out.
///
/// Per-leg state is reset for every player unless the match is over, in which
/// case the final leg is left in place for display.
pub fn complete_leg(
    players: &mut [MatchPlayer],
    winner: usize,
    rules: &MatchRules,
    progress: &mut MatchProgress,
) -> Completion {
    let darts = players[winner].darts_thrown_leg;
    let winner_id = players[winner].id;
    {
        let player = &mut players[winner];
        player.legs_won += 1;
        player.total_legs_won += 1;
        player.best_leg_darts = Some(player.best_leg_darts.map_or(darts, |best| best.min(darts)));
    }
    progress.legs_played += 1;

    let completion = if players[winner].legs_won >= rules.legs_per_set {
        players[winner].sets_won += 1;
        if players[winner].sets_won >= rules.sets_to_win {
            Completion::MatchWon {
                player: winner_id,
                darts,
            }
        } else {
            let set = progress.set;
            for player in players.iter_mut() {
                player.legs_won = 0;
            }
            progress.set += 1;
            progress.leg = 1;
            Completion::SetWon {
                player: winner_id,
                set,
                darts,
            }
        }
    } else {
        let (set, leg) = (progress.set, progress.leg);
        progress.leg += 1;
        Completion::LegWon {
            player: winner_id,
            set,
            leg,
            darts,
        }
    };

    if !completion.is_match_over() {
        for player in players.iter_mut() {
            player.reset_for_leg(rules.start_score);
        }
        progress.leg_starter = (progress.leg_starter + 1) % players.len();
    }

    info!(
        target: "darts_core::completion",
        player = %winner_id,
        set = progress.set,
        leg = progress.leg,
        darts,
        ?completion,
        "leg completed"
    );
    completion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::PlayerProfile;

    fn players(start: u16) -> Vec<MatchPlayer> {
        (0..2)
            .map(|i| {
                MatchPlayer::new(
                    &PlayerProfile::new(PlayerId(i), format!("p{i}"), "#000"),
                    start,
                )
            })
            .collect()
    }

    #[test]
    fn leg_win_resets_everyone_and_rotates_starter() {
        let rules = MatchRules::new(301, 2, 1);
        let mut progress = MatchProgress::new();
        let mut ps = players(301);
        ps[0].score = 0;
        ps[0].darts_thrown_leg = 18;
        ps[1].score = 120;

        let completion = complete_leg(&mut ps, 0, &rules, &mut progress);
        assert_eq!(
            completion,
            Completion::LegWon {
                player: PlayerId(0),
                set: 1,
                leg: 1,
                darts: 18
            }
        );
        assert_eq!(ps[0].legs_won, 1);
        assert_eq!(ps[0].best_leg_darts, Some(18));
        assert!(ps.iter().all(|p| p.score == 301 && p.darts_thrown_leg == 0));
        assert_eq!(progress.leg, 2);
        assert_eq!(progress.leg_starter, 1);
    }

    #[test]
    fn set_win_resets_legs() {
        let rules = MatchRules::new(301, 2, 2);
        let mut progress = MatchProgress::new();
        let mut ps = players(301);
        ps[1].legs_won = 1;
        ps[0].legs_won = 1;

        let completion = complete_leg(&mut ps, 1, &rules, &mut progress);
        assert!(matches!(completion, Completion::SetWon { set: 1, .. }));
        assert_eq!(ps[1].sets_won, 1);
        assert!(ps.iter().all(|p| p.legs_won == 0));
        assert_eq!(progress.set, 2);
        assert_eq!(progress.leg, 1);
    }

    #[test]
    fn match_win_keeps_final_leg() {
        let rules = MatchRules::new(301, 1, 1);
        let mut progress = MatchProgress::new();
        let mut ps = players(301);
        ps[0].score = 0;
        ps[1].score = 32;

        let completion = complete_leg(&mut ps, 0, &rules, &mut progress);
        assert!(completion.is_match_over());
        assert_eq!(completion.player(), PlayerId(0));
        assert_eq!(ps[1].score, 32);
        assert_eq!(progress.leg_starter, 0);
    }
}
