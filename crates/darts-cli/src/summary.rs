use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use darts_core::game::cricket::{CricketMatch, TARGETS};
use darts_core::game::match_state::X01Match;
use darts_core::store::leaderboard::LeaderboardEntry;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Markdown report for a replayed X01 match, followed by the standings.
pub fn x01_markdown(run_id: &str, game: &X01Match, leaderboard: &[LeaderboardEntry]) -> String {
    let rules = game.rules();
    let mut out = String::new();
    let _ = writeln!(out, "# Match Summary: {run_id}\n");
    let _ = writeln!(
        out,
        "{} · first to {} leg{} per set · first to {} set{}\n",
        rules.start_score,
        rules.legs_per_set,
        plural(rules.legs_per_set),
        rules.sets_to_win,
        plural(rules.sets_to_win)
    );
    match game.winner().and_then(|id| game.player(id)) {
        Some(winner) => {
            let _ = writeln!(out, "Winner: **{}**\n", winner.name);
        }
        None => {
            let progress = game.progress();
            let _ = writeln!(
                out,
                "In progress: set {}, leg {} ({} to throw)\n",
                progress.set,
                progress.leg,
                game.active_player().name
            );
        }
    }

    out.push_str("| Player | Sets | Legs | Remaining | Avg | 180s | 140+ | 100+ | High | Checkout | Checkout % | Best leg |\n");
    out.push_str("|--------|------|------|-----------|-----|------|------|------|------|----------|------------|----------|\n");
    for player in game.players() {
        let best_leg = player
            .best_leg_darts
            .map_or_else(|| "-".to_string(), |darts| format!("{darts} darts"));
        let _ = writeln!(
            out,
            "| {name} | {sets} | {legs} | {remaining} | {avg:.2} | {t180} | {t140} | {t100} | {high} | {checkout} | {pct:.1}% | {best_leg} |",
            name = player.name,
            sets = player.sets_won,
            legs = player.total_legs_won,
            remaining = player.score,
            avg = player.game_average,
            t180 = player.one_eighties,
            t140 = player.ton_forties,
            t100 = player.tons,
            high = player.highest_score,
            checkout = player.highest_checkout,
            pct = player.checkout_percentage(),
        );
    }

    if !leaderboard.is_empty() {
        out.push('\n');
        out.push_str(&leaderboard_markdown(leaderboard));
    }
    out
}

/// Markdown report for a replayed Cricket game.
pub fn cricket_markdown(run_id: &str, game: &CricketMatch) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Cricket Summary: {run_id}\n");
    match game
        .winner()
        .and_then(|id| game.players().iter().find(|p| p.id == id))
    {
        Some(winner) => {
            let _ = writeln!(out, "Winner: **{}**\n", winner.name);
        }
        None => {
            let _ = writeln!(
                out,
                "In progress: round {} ({} to throw)\n",
                game.round(),
                game.active_player().name
            );
        }
    }

    out.push_str("| Player | Points |");
    for target in TARGETS {
        let _ = write!(out, " {} |", target_label(target));
    }
    out.push_str(" Marks | MPR |\n|--------|--------|");
    for _ in TARGETS {
        out.push_str("----|");
    }
    out.push_str("-------|-----|\n");

    for player in game.players() {
        let _ = write!(out, "| {} | {} |", player.name, player.points);
        for marks in player.marks {
            let _ = write!(out, " {} |", marks_symbol(marks));
        }
        let _ = writeln!(
            out,
            " {} | {:.2} |",
            player.marks_scored, player.marks_per_round
        );
    }
    out
}

/// Standings across every finished game in the store.
pub fn leaderboard_markdown(entries: &[LeaderboardEntry]) -> String {
    let mut out = String::new();
    out.push_str("## Leaderboard\n\n");
    out.push_str("| # | Player | Played | Won | Win % | Avg | Best avg | 180s | Best checkout | Checkout % |\n");
    out.push_str("|---|--------|--------|-----|-------|-----|----------|------|---------------|------------|\n");
    for (rank, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {rank} | {name} | {played} | {won} | {win:.1}% | {avg:.2} | {best:.2} | {t180} | {checkout} | {pct:.1}% |",
            rank = rank + 1,
            name = entry.name,
            played = entry.games_played,
            won = entry.games_won,
            win = entry.win_rate,
            avg = entry.average,
            best = entry.best_game_average,
            t180 = entry.one_eighties,
            checkout = entry.best_checkout,
            pct = entry.checkout_percentage,
        );
    }
    out
}

pub fn write_markdown(path: impl AsRef<Path>, contents: &str) -> Result<(), SummaryError> {
    fs::write(path.as_ref(), contents).map_err(|source| SummaryError::Io {
        context: "writing summary markdown",
        source,
    })
}

fn plural(count: u32) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn target_label(target: u8) -> String {
    if target == 25 {
        "Bull".to_string()
    } else {
        target.to_string()
    }
}

fn marks_symbol(marks: u8) -> &'static str {
    match marks {
        0 => "",
        1 => "/",
        2 => "X",
        _ => "Ⓧ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darts_core::game::rules::MatchRules;
    use darts_core::model::dart::Dart;
    use darts_core::model::player::{PlayerId, PlayerProfile};

    fn profiles() -> Vec<PlayerProfile> {
        vec![
            PlayerProfile::new(PlayerId(1), "Ada", "#e53935"),
            PlayerProfile::new(PlayerId(2), "Bo", "#1e88e5"),
        ]
    }

    #[test]
    fn x01_summary_lists_players_and_progress() {
        let mut game = X01Match::new(&profiles(), MatchRules::new(301, 2, 1)).unwrap();
        game.submit("180").unwrap();
        game.submit("45").unwrap();

        let markdown = x01_markdown("night", &game, &[]);
        assert!(markdown.starts_with("# Match Summary: night"));
        assert!(markdown.contains("first to 2 legs per set · first to 1 set"));
        assert!(markdown.contains("In progress: set 1, leg 1 (Ada to throw)"));
        assert!(markdown.contains("| Ada | 0 | 0 | 121 | 180.00 | 1 |"));
        assert!(markdown.contains("| Bo | 0 | 0 | 256 |"));
        assert!(!markdown.contains("## Leaderboard"));
    }

    #[test]
    fn cricket_summary_draws_marks() {
        let mut game = CricketMatch::new(&profiles()).unwrap();
        game.submit_darts(&[Dart::Treble(20), Dart::Single(19), Dart::Double(18)])
            .unwrap();

        let markdown = cricket_markdown("c1", &game);
        assert!(markdown.contains("In progress: round 1 (Bo to throw)"));
        assert!(markdown.contains("| Bull |"));
        assert!(markdown.contains("| Ada | 0 |  |  |  | X | / | Ⓧ |  | 6 |"));
    }

    #[test]
    fn leaderboard_ranks_from_one() {
        let entry = LeaderboardEntry {
            player_id: PlayerId(1),
            name: "Ada".into(),
            games_played: 2,
            games_won: 1,
            win_rate: 50.0,
            average: 60.5,
            best_game_average: 70.25,
            mean_game_average: 60.0,
            one_eighties: 3,
            best_checkout: 121,
            checkout_percentage: 25.0,
        };
        let markdown = leaderboard_markdown(&[entry]);
        assert!(markdown.contains("| 1 | Ada | 2 | 1 | 50.0% | 60.50 | 70.25 | 3 | 121 | 25.0% |"));
    }
}
