use darts_core::game::rules::{MAX_PLAYERS, MIN_PLAYERS, MatchRules, RulesError};
use darts_core::model::dart::Dart;
use darts_core::store::roster::MAX_NAME_LEN;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// A scripted match loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatchConfig {
    pub run_id: String,
    #[serde(default)]
    pub game: GameConfig,
    pub players: Vec<PlayerConfig>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MatchConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: MatchConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.game.validate()?;
        validate_players(&mut self.players)?;
        validate_script(self.game.variant, &self.script)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve `{run_id}` placeholders into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            events_jsonl: resolve_template(&self.run_id, &self.outputs.events_jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            store_json: self
                .outputs
                .store_json
                .as_deref()
                .map(|template| resolve_template(&self.run_id, template)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    X01,
    Cricket,
}

/// Game format block. Legs and sets are ignored for Cricket.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GameConfig {
    #[serde(default)]
    pub variant: Variant,
    #[serde(default = "default_start_score")]
    pub start_score: u16,
    #[serde(default = "default_one")]
    pub legs_per_set: u32,
    #[serde(default = "default_one")]
    pub sets_to_win: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            variant: Variant::X01,
            start_score: default_start_score(),
            legs_per_set: 1,
            sets_to_win: 1,
        }
    }
}

impl GameConfig {
    pub fn rules(&self) -> MatchRules {
        MatchRules::new(self.start_score, self.legs_per_set, self.sets_to_win)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.variant == Variant::Cricket {
            return Ok(());
        }
        self.rules().validate().map_err(|err| {
            let field = match err {
                RulesError::StartScore(_) => "game.start_score",
                RulesError::ZeroLegs => "game.legs_per_set",
                RulesError::ZeroSets => "game.sets_to_win",
                RulesError::PlayerCount(_) | RulesError::DuplicatePlayer(_) => "players",
                RulesError::StalePending { .. } => "game",
            };
            ValidationError::InvalidField {
                field: field.to_string(),
                message: err.to_string(),
            }
        })
    }
}

fn default_start_score() -> u16 {
    501
}

fn default_one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlayerConfig {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// One entry at the scoreboard, replayed in order.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    /// A three-dart total typed in for the active X01 player.
    Score(u32),
    /// Dart counts for a score waiting on them.
    Resolve { darts_used: u8, darts_at_double: u8 },
    /// A score and its dart counts in one step.
    Checkout {
        score: u32,
        darts_used: u8,
        darts_at_double: u8,
    },
    /// Drop a score waiting on dart counts.
    Cancel,
    /// A Cricket visit, dart by dart.
    Darts(Vec<Dart>),
    Skip,
    Undo,
    Redo,
}

impl ScriptStep {
    pub fn label(&self) -> &'static str {
        match self {
            ScriptStep::Score(_) => "score",
            ScriptStep::Resolve { .. } => "resolve",
            ScriptStep::Checkout { .. } => "checkout",
            ScriptStep::Cancel => "cancel",
            ScriptStep::Darts(_) => "darts",
            ScriptStep::Skip => "skip",
            ScriptStep::Undo => "undo",
            ScriptStep::Redo => "redo",
        }
    }

    fn supports(&self, variant: Variant) -> bool {
        match self {
            ScriptStep::Score(_)
            | ScriptStep::Resolve { .. }
            | ScriptStep::Checkout { .. }
            | ScriptStep::Cancel => variant == Variant::X01,
            ScriptStep::Darts(_) => variant == Variant::Cricket,
            ScriptStep::Skip | ScriptStep::Undo | ScriptStep::Redo => true,
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub events_jsonl: String,
    pub summary_md: String,
    /// Player and game history. Kept in memory for the run when unset.
    #[serde(default)]
    pub store_json: Option<String>,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        let mut paths = vec![
            ("outputs.events_jsonl", &self.events_jsonl),
            ("outputs.summary_md", &self.summary_md),
        ];
        if let Some(store) = self.store_json.as_ref() {
            paths.push(("outputs.store_json", store));
        }

        for (label, value) in paths {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to compact stderr output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_players(players: &mut [PlayerConfig]) -> Result<(), ValidationError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
        return Err(ValidationError::InvalidField {
            field: "players".to_string(),
            message: format!(
                "between {MIN_PLAYERS} and {MAX_PLAYERS} players are required (got {})",
                players.len()
            ),
        });
    }

    let mut seen = HashSet::new();
    for (index, player) in players.iter_mut().enumerate() {
        player.name = player.name.trim().to_string();
        if player.name.is_empty() {
            return Err(ValidationError::InvalidField {
                field: format!("players[{index}].name"),
                message: "player name must not be empty".to_string(),
            });
        }

        if player.name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::InvalidField {
                field: format!("players[{index}].name"),
                message: format!("player name must be at most {MAX_NAME_LEN} characters"),
            });
        }

        if !seen.insert(player.name.to_lowercase()) {
            return Err(ValidationError::InvalidField {
                field: "players".to_string(),
                message: format!("player '{}' listed more than once", player.name),
            });
        }
    }

    Ok(())
}

fn validate_script(variant: Variant, script: &[ScriptStep]) -> Result<(), ValidationError> {
    for (index, step) in script.iter().enumerate() {
        let field = || format!("script[{index}]");
        if !step.supports(variant) {
            return Err(ValidationError::InvalidField {
                field: field(),
                message: format!("'{}' steps are not used in {variant:?} games", step.label()),
            });
        }

        match step {
            ScriptStep::Resolve {
                darts_used,
                darts_at_double,
            }
            | ScriptStep::Checkout {
                darts_used,
                darts_at_double,
                ..
            } => {
                if !(1..=3).contains(darts_used) || darts_at_double > darts_used {
                    return Err(ValidationError::InvalidField {
                        field: field(),
                        message: format!(
                            "{darts_used} darts with {darts_at_double} at a double is not a valid visit"
                        ),
                    });
                }
            }
            ScriptStep::Darts(darts) if darts.len() > 3 => {
                return Err(ValidationError::InvalidField {
                    field: field(),
                    message: format!("a visit is at most three darts (got {})", darts.len()),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub events_jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub store_json: Option<PathBuf>,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r##"
run_id: "league_night"
game:
  variant: x01
  start_score: 301
  legs_per_set: 2
players:
  - name: "Ada"
    color: "#e53935"
  - name: "Bo"
script:
  - score: 180
  - score: 26
  - checkout:
      score: 121
      darts_used: 3
      darts_at_double: 1
  - undo
  - redo
outputs:
  events_jsonl: "out/{run_id}/events.jsonl"
  summary_md: "out/{run_id}/summary.md"
  store_json: "out/darts.json"
logging:
  enable_structured: true
  tracing_level: "debug"
"##;

    fn parse(yaml: &str) -> MatchConfig {
        serde_yaml::from_str(yaml).expect("parse yaml")
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg = parse(BASIC_YAML);
        cfg.validate().expect("validate");

        assert_eq!(cfg.game.rules(), MatchRules::new(301, 2, 1));
        assert_eq!(cfg.players[1].color, None);
        assert_eq!(cfg.script.len(), 5);
        assert_eq!(cfg.script[0], ScriptStep::Score(180));
        assert_eq!(cfg.script[3], ScriptStep::Undo);
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.events_jsonl,
            PathBuf::from("out/league_night/events.jsonl")
        );
        assert_eq!(outputs.store_json, Some(PathBuf::from("out/darts.json")));
    }

    #[test]
    fn game_block_defaults_to_single_leg_501() {
        let yaml = BASIC_YAML.replace(
            "game:\n  variant: x01\n  start_score: 301\n  legs_per_set: 2\n",
            "",
        );
        let mut cfg = parse(&yaml);
        cfg.validate().expect("validate");
        assert_eq!(cfg.game.variant, Variant::X01);
        assert_eq!(cfg.game.rules(), MatchRules::single_leg());
    }

    #[test]
    fn rejects_unsupported_start_score() {
        let mut cfg = parse(&BASIC_YAML.replace("start_score: 301", "start_score: 401"));
        let err = cfg.validate().expect_err("401 is not a start score");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "game.start_score"
        ));
    }

    #[test]
    fn rejects_duplicate_players() {
        let mut cfg = parse(&BASIC_YAML.replace("name: \"Bo\"", "name: \" ada \""));
        let err = cfg.validate().expect_err("duplicate players");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "players"
        ));
    }

    #[test]
    fn rejects_cricket_steps_in_x01() {
        let yaml = BASIC_YAML.replace("  - undo\n", "  - darts: [T20, S19]\n");
        let mut cfg = parse(&yaml);
        let err = cfg.validate().expect_err("darts step in x01");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "script[3]"
        ));
    }

    #[test]
    fn rejects_impossible_dart_counts() {
        let yaml = BASIC_YAML.replace("darts_at_double: 1", "darts_at_double: 4");
        let mut cfg = parse(&yaml);
        let err = cfg.validate().expect_err("more doubles than darts");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "script[2]"
        ));
    }

    #[test]
    fn cricket_scripts_parse_dart_notation() {
        let yaml = r#"
run_id: "cricket"
game:
  variant: cricket
players:
  - name: "Ada"
  - name: "Bo"
script:
  - darts: [T20, D19, BULL]
  - skip
outputs:
  events_jsonl: "events.jsonl"
  summary_md: "summary.md"
"#;
        let mut cfg = parse(yaml);
        cfg.validate().expect("validate");
        assert_eq!(
            cfg.script[0],
            ScriptStep::Darts(vec![Dart::Treble(20), Dart::Double(19), Dart::InnerBull])
        );
        assert_eq!(cfg.resolved_outputs().store_json, None);
    }

    #[test]
    fn rejects_invalid_run_id() {
        let mut cfg = parse(&BASIC_YAML.replace("league_night", "league night"));
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }
}
