use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use darts_core::game::completion::Completion;
use darts_core::game::cricket::{CricketError, CricketMatch};
use darts_core::game::match_state::SubmitOutcome;
use darts_core::game::rules::RulesError;
use darts_core::game::session::GameSession;
use darts_core::model::checkout::{self, DartResolution};
use darts_core::model::dart::Dart;
use darts_core::model::player::PlayerProfile;
use darts_core::store::leaderboard::build_leaderboard;
use darts_core::store::roster::{PlayerRoster, RosterError};
use darts_core::store::{GameStore, InMemoryStore, JsonFileStore, StoreError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{MatchConfig, PlayerConfig, ResolvedOutputs, ScriptStep, Variant};
use crate::summary::{self, SummaryError};

/// Replays a scripted match through the engine, one event row per step.
pub struct MatchRunner {
    config: MatchConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub steps_run: usize,
    pub rejected: usize,
    pub winner: Option<String>,
    pub events_path: PathBuf,
    pub summary_path: PathBuf,
    pub store_path: Option<PathBuf>,
    /// Last failed store write, if any. Play is not interrupted by these.
    pub store_error: Option<String>,
}

/// What a replay produced before it is written out.
struct Replay {
    markdown: String,
    winner: Option<String>,
    store_error: Option<String>,
}

impl MatchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: MatchConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Replay the script, streaming JSONL event rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.events_jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if let Some(store) = self.outputs.store_json.as_ref() {
            ensure_parent(store.parent())?;
        }

        let mut events = EventLog::create(&self.outputs.events_jsonl, &self.config.run_id)?;
        info!(
            target: "darts_cli::runner",
            run_id = %self.config.run_id,
            variant = ?self.config.game.variant,
            players = self.config.players.len(),
            steps = self.config.script.len(),
            "replaying match"
        );

        let replay = match (self.config.game.variant, self.outputs.store_json.as_ref()) {
            (Variant::X01, Some(path)) => self.replay_x01(&JsonFileStore::open(path)?, &mut events)?,
            (Variant::X01, None) => self.replay_x01(&InMemoryStore::new(), &mut events)?,
            (Variant::Cricket, Some(path)) => {
                self.replay_cricket(&JsonFileStore::open(path)?, &mut events)?
            }
            (Variant::Cricket, None) => self.replay_cricket(&InMemoryStore::new(), &mut events)?,
        };

        events.finish()?;
        summary::write_markdown(&self.outputs.summary_md, &replay.markdown)?;

        Ok(RunSummary {
            steps_run: events.rows,
            rejected: events.rejected,
            winner: replay.winner,
            events_path: self.outputs.events_jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            store_path: self.outputs.store_json.clone(),
            store_error: replay.store_error,
        })
    }

    fn replay_x01<S: GameStore>(
        &self,
        store: &S,
        events: &mut EventLog,
    ) -> Result<Replay, RunnerError> {
        let profiles = register_players(store, &self.config.players)?;
        let mut session = GameSession::start(store, &profiles, self.config.game.rules())?;

        for (index, step) in self.config.script.iter().enumerate() {
            let mut row = EventRow::new(index, step.label());
            row.player = Some(session.game().active_player().name.clone());
            apply_x01_step(&mut session, step, &mut row);
            if !session.game().is_finished() {
                let next = session.game().active_player();
                row.next_player = Some(next.name.clone());
                row.suggested_checkout = suggested_route(next.score);
            }
            events.write(row)?;
        }

        if let Some(err) = session.last_error() {
            warn!(target: "darts_cli::runner", error = err, "match data was not fully saved");
        }
        let leaderboard = build_leaderboard(&store.games()?);
        let game = session.game();
        Ok(Replay {
            markdown: summary::x01_markdown(&self.config.run_id, game, &leaderboard),
            winner: game
                .winner()
                .and_then(|id| game.player(id))
                .map(|p| p.name.clone()),
            store_error: session.last_error().map(str::to_string),
        })
    }

    fn replay_cricket<S: GameStore>(
        &self,
        store: &S,
        events: &mut EventLog,
    ) -> Result<Replay, RunnerError> {
        let profiles = register_players(store, &self.config.players)?;
        let mut game = CricketMatch::new(&profiles)?;

        for (index, step) in self.config.script.iter().enumerate() {
            let mut row = EventRow::new(index, step.label());
            row.player = Some(game.active_player().name.clone());
            apply_cricket_step(&mut game, step, &mut row);
            if !game.is_finished() {
                row.next_player = Some(game.active_player().name.clone());
            }
            events.write(row)?;
        }

        Ok(Replay {
            markdown: summary::cricket_markdown(&self.config.run_id, &game),
            winner: game
                .winner()
                .and_then(|id| game.players().iter().find(|p| p.id == id))
                .map(|p| p.name.clone()),
            store_error: None,
        })
    }
}

/// Standings from a store file, for printing without replaying anything.
pub fn leaderboard_report(store_path: &Path) -> Result<String, RunnerError> {
    let store = JsonFileStore::open(store_path)?;
    let entries = build_leaderboard(&store.games()?);
    Ok(summary::leaderboard_markdown(&entries))
}

/// Look players up by name, creating the ones the store has not seen.
fn register_players<S: GameStore>(
    store: &S,
    players: &[PlayerConfig],
) -> Result<Vec<PlayerProfile>, RosterError> {
    let mut roster = PlayerRoster::new();
    roster.load(store)?;

    let mut profiles = Vec::with_capacity(players.len());
    for player in players {
        let profile = match roster.find_by_name(&player.name) {
            Some(existing) => existing.clone(),
            None => roster.add_player(store, &player.name, player.color.as_deref())?,
        };
        debug!(target: "darts_cli::runner", player = %profile.id, name = %profile.name, "player registered");
        profiles.push(profile);
    }
    Ok(profiles)
}

fn apply_x01_step<S: GameStore>(
    session: &mut GameSession<S>,
    step: &ScriptStep,
    row: &mut EventRow,
) {
    match step {
        ScriptStep::Score(score) => {
            row.entered = Some(*score);
            match session.submit(&score.to_string()) {
                Ok(outcome) => row.describe(&outcome),
                Err(err) => row.reject(err),
            }
        }
        ScriptStep::Resolve {
            darts_used,
            darts_at_double,
        } => match session.resolve_checkout(DartResolution::new(*darts_used, *darts_at_double)) {
            Ok(outcome) => row.describe(&outcome),
            Err(err) => row.reject(err),
        },
        ScriptStep::Checkout {
            score,
            darts_used,
            darts_at_double,
        } => {
            row.entered = Some(*score);
            match session.submit(&score.to_string()) {
                Ok(SubmitOutcome::CheckoutPending(_)) => {
                    let resolution = DartResolution::new(*darts_used, *darts_at_double);
                    match session.resolve_checkout(resolution) {
                        Ok(outcome) => row.describe(&outcome),
                        Err(err) => {
                            session.cancel_checkout();
                            row.reject(err);
                        }
                    }
                }
                Ok(outcome) => {
                    row.describe(&outcome);
                    row.message = Some("dart counts were not needed for this score".to_string());
                }
                Err(err) => row.reject(err),
            }
        }
        ScriptStep::Cancel => {
            row.outcome = if session.cancel_checkout() {
                "cancelled"
            } else {
                "nothing_pending"
            };
        }
        ScriptStep::Skip => match session.skip_turn() {
            Ok(_) => row.outcome = "skipped",
            Err(err) => row.reject(err),
        },
        ScriptStep::Undo => row.outcome = undo_label(session.undo()),
        ScriptStep::Redo => row.outcome = redo_label(session.redo()),
        ScriptStep::Darts(_) => row.reject("dart-by-dart entry is only used in Cricket"),
    }
}

fn apply_cricket_step(game: &mut CricketMatch, step: &ScriptStep, row: &mut EventRow) {
    match step {
        ScriptStep::Darts(darts) => match game.submit_darts(darts) {
            Ok(turn) => {
                row.outcome = if turn.winner.is_some() {
                    "won"
                } else {
                    "scored"
                };
                row.darts = Some(turn.darts);
                row.marks = Some(turn.marks);
                row.points = Some(turn.points);
                row.thrown = Some(darts.clone());
            }
            Err(err) => row.reject(err),
        },
        ScriptStep::Skip => match game.skip_turn() {
            Ok(_) => row.outcome = "skipped",
            Err(err) => row.reject(err),
        },
        ScriptStep::Undo => row.outcome = undo_label(game.undo()),
        ScriptStep::Redo => row.outcome = redo_label(game.redo()),
        other => row.reject(format!("'{}' is only used in X01", other.label())),
    }
}

fn undo_label(done: bool) -> &'static str {
    if done { "undone" } else { "nothing_to_undo" }
}

fn redo_label(done: bool) -> &'static str {
    if done { "redone" } else { "nothing_to_redo" }
}

fn suggested_route(score: u16) -> Option<String> {
    let route = checkout::checkout_route(score)?;
    Some(
        route
            .iter()
            .map(Dart::to_string)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Default, Serialize)]
struct EventRow {
    run_id: String,
    step: usize,
    action: &'static str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entered: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scored: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    darts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thrown: Option<Vec<Dart>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completion: Option<Completion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Vec<DartResolution>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggested_checkout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl EventRow {
    fn new(step: usize, action: &'static str) -> Self {
        Self {
            step,
            action,
            ..Self::default()
        }
    }

    fn describe(&mut self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Applied {
                turn, completion, ..
            } => {
                self.outcome = if turn.is_checkout() {
                    "checkout"
                } else {
                    "scored"
                };
                self.scored = Some(turn.scored);
                self.remaining = Some(turn.remaining);
                self.darts = Some(u32::from(turn.darts));
                self.completion = *completion;
            }
            SubmitOutcome::Bust { turn, .. } => {
                self.outcome = "bust";
                self.scored = Some(turn.scored);
                self.remaining = Some(turn.remaining);
                self.darts = Some(u32::from(turn.darts));
            }
            SubmitOutcome::CheckoutPending(pending) => {
                self.outcome = "awaiting_darts";
                self.scored = Some(pending.scored);
                self.remaining = Some(pending.remaining());
                self.options = Some(pending.options.resolutions().to_vec());
            }
        }
    }

    fn reject(&mut self, reason: impl ToString) {
        self.outcome = "rejected";
        self.message = Some(reason.to_string());
    }
}

struct EventLog {
    writer: BufWriter<File>,
    run_id: String,
    rows: usize,
    rejected: usize,
}

impl EventLog {
    fn create(path: &Path, run_id: &str) -> Result<Self, RunnerError> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            run_id: run_id.to_string(),
            rows: 0,
            rejected: 0,
        })
    }

    fn write(&mut self, mut row: EventRow) -> Result<(), RunnerError> {
        row.run_id.clone_from(&self.run_id);
        if row.outcome == "rejected" {
            self.rejected += 1;
            warn!(
                target: "darts_cli::runner",
                step = row.step,
                action = row.action,
                reason = row.message.as_deref().unwrap_or_default(),
                "step rejected"
            );
        } else {
            debug!(
                target: "darts_cli::runner",
                step = row.step,
                action = row.action,
                outcome = row.outcome,
                "step applied"
            );
        }
        serde_json::to_writer(&mut self.writer, &row)?;
        self.writer.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RunnerError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize event row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("player setup failed: {0}")]
    Roster(#[from] RosterError),
    #[error("invalid match setup: {0}")]
    Rules(#[from] RulesError),
    #[error("invalid cricket setup: {0}")]
    Cricket(#[from] CricketError),
    #[error("summary failed: {0}")]
    Summary(#[from] SummaryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_are_suggested_only_within_range() {
        assert_eq!(suggested_route(170).as_deref(), Some("T20 T20 BULL"));
        assert_eq!(suggested_route(171), None);
        assert_eq!(suggested_route(169), None);
    }

    #[test]
    fn pending_rows_list_the_options() {
        let mut row = EventRow::new(0, "score");
        let pending = match darts_core::model::score::classify_input("61", 61).unwrap() {
            darts_core::model::score::Classification::Checkout(pending) => pending,
            other => panic!("expected checkout, got {other:?}"),
        };
        row.describe(&SubmitOutcome::CheckoutPending(pending));
        assert_eq!(row.outcome, "awaiting_darts");
        assert_eq!(row.remaining, Some(0));
        let options = row.options.unwrap();
        assert!(options.contains(&DartResolution::new(2, 1)));
        assert!(options.contains(&DartResolution::new(3, 2)));
    }
}
