use super::match_state::{MatchFrame, X01Match};
use crate::game::rules::{MatchRules, RulesError};
use crate::model::score::PendingScore;
use serde::{Deserialize, Serialize};

/// Saved form of a match in progress, used to resume after a restart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub rules: MatchRules,
    #[serde(flatten)]
    pub frame: MatchFrame,
    #[serde(default)]
    pub pending: Option<PendingScore>,
}

impl MatchSnapshot {
    pub fn capture(state: &X01Match) -> Self {
        MatchSnapshot {
            rules: *state.rules(),
            frame: state.frame().clone(),
            pending: state.pending().cloned(),
        }
    }

    pub fn restore(self) -> Result<X01Match, RulesError> {
        X01Match::from_frame(self.rules, self.frame, self.pending)
    }

    pub fn to_json(state: &X01Match) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::MatchSnapshot;
    use crate::game::match_state::X01Match;
    use crate::game::rules::{MatchRules, RulesError};
    use crate::model::player::{PlayerId, PlayerProfile};

    fn profiles() -> Vec<PlayerProfile> {
        vec![
            PlayerProfile::new(PlayerId(1), "Ada", "#e53935"),
            PlayerProfile::new(PlayerId(2), "Bo", "#1e88e5"),
        ]
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut state = X01Match::new(&profiles(), MatchRules::default()).unwrap();
        state.submit("100").unwrap();
        let json = MatchSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"start_score\": 501"));
        assert!(json.contains("\"score\": 401"));
        assert!(json.contains("\"pending\": null"));
    }

    #[test]
    fn snapshot_restores_scores_and_turn_order() {
        let mut state = X01Match::new(&profiles(), MatchRules::new(301, 3, 1)).unwrap();
        state.submit("60").unwrap();
        state.submit("45").unwrap();
        state.submit("100").unwrap();

        let json = MatchSnapshot::to_json(&state).unwrap();
        let restored = MatchSnapshot::from_json(&json).unwrap().restore().unwrap();
        assert_eq!(restored.players(), state.players());
        assert_eq!(restored.active_index(), 1);
        assert_eq!(restored.rules(), state.rules());
        assert!(!restored.can_undo());
    }

    #[test]
    fn pending_checkout_survives_restore() {
        let mut state = X01Match::new(&profiles(), MatchRules::new(301, 1, 1)).unwrap();
        state.submit("180").unwrap();
        state.submit("0").unwrap();
        state.submit("81").unwrap();
        assert!(state.pending().is_some());

        let snapshot = MatchSnapshot::capture(&state);
        let restored = snapshot.clone().restore().unwrap();
        assert_eq!(restored.pending(), snapshot.pending.as_ref());
    }

    #[test]
    fn restore_rejects_a_pending_score_for_another_total() {
        let mut state = X01Match::new(&profiles(), MatchRules::new(301, 1, 1)).unwrap();
        state.submit("180").unwrap();
        state.submit("0").unwrap();
        state.submit("81").unwrap();

        let mut snapshot = MatchSnapshot::capture(&state);
        snapshot.frame.players[0].score = 40;
        assert!(matches!(
            snapshot.restore(),
            Err(RulesError::StalePending {
                scored: 81,
                previous_score: 121,
                score: 40,
            })
        ));
    }

    #[test]
    fn restore_repairs_missing_active_player() {
        let state = X01Match::new(&profiles(), MatchRules::default()).unwrap();
        let mut snapshot = MatchSnapshot::capture(&state);
        for player in &mut snapshot.frame.players {
            player.is_active = false;
        }
        let restored = snapshot.restore().unwrap();
        assert_eq!(restored.players().iter().filter(|p| p.is_active).count(), 1);
    }
}
