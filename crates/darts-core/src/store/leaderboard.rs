use super::GameRecord;
use crate::model::player::PlayerId;
use crate::stats::{Average, percentage, round2, three_dart_average};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub games_played: u32,
    pub games_won: u32,
    pub win_rate: f64,
    pub average: f64,
    pub best_game_average: f64,
    pub mean_game_average: f64,
    pub one_eighties: u32,
    pub best_checkout: u16,
    pub checkout_percentage: f64,
}

#[derive(Debug, Default)]
struct Accumulator {
    name: String,
    games_played: u32,
    games_won: u32,
    darts: u32,
    score: u32,
    best_game_average: f64,
    game_averages: Average,
    one_eighties: u32,
    best_checkout: u16,
    checkout_attempts: u32,
    checkout_successes: u32,
}

/// Aggregate finished games into per-player standings.
///
/// Ordered by games won, then overall average, then name. Games still in
/// progress are ignored.
pub fn build_leaderboard(games: &[GameRecord]) -> Vec<LeaderboardEntry> {
    let mut players: BTreeMap<PlayerId, Accumulator> = BTreeMap::new();

    for summary in games.iter().filter_map(|g| g.summary.as_ref()) {
        for participant in &summary.participants {
            let acc = players.entry(participant.player_id).or_default();
            acc.name = participant.name.clone();
            acc.games_played += 1;
            acc.games_won += u32::from(participant.is_winner);
            acc.darts += participant.darts_thrown;
            acc.score += participant.score_thrown;
            acc.best_game_average = acc.best_game_average.max(participant.average);
            acc.game_averages.add(participant.average);
            acc.one_eighties += participant.one_eighties;
            acc.best_checkout = acc.best_checkout.max(participant.highest_checkout);
            acc.checkout_attempts += participant.checkout_attempts;
            acc.checkout_successes += participant.checkout_successes;
        }
    }

    let mut entries: Vec<LeaderboardEntry> = players
        .into_iter()
        .map(|(player_id, acc)| LeaderboardEntry {
            player_id,
            win_rate: percentage(acc.games_won, acc.games_played),
            average: three_dart_average(acc.score, acc.darts),
            mean_game_average: round2(acc.game_averages.mean().unwrap_or(0.0)),
            best_game_average: acc.best_game_average,
            checkout_percentage: percentage(acc.checkout_successes, acc.checkout_attempts),
            name: acc.name,
            games_played: acc.games_played,
            games_won: acc.games_won,
            one_eighties: acc.one_eighties,
            best_checkout: acc.best_checkout,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.games_won
            .cmp(&a.games_won)
            .then_with(|| b.average.total_cmp(&a.average))
            .then_with(|| a.name.cmp(&b.name))
    });
    entries
}
