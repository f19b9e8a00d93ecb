//! JSON view of engine snapshots and events
//!
//! One message per line, each tagged with `type`. Colours and shapes are sent
//! by name; the receiving side resolves them against its own pool.

use serde::{Deserialize, Serialize};

use color_attack_engine::{EngineSnapshot, GameEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotType {
    #[serde(rename = "snapshot")]
    Snapshot,
}

impl Default for SnapshotType {
    fn default() -> Self {
        Self::Snapshot
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivesView {
    pub current: u32,
    pub max: u32,
}

/// Serializable form of [`EngineSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: SnapshotType,
    pub mode: String,
    pub phase: String,
    pub session: u32,
    pub grid_colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grid_shapes: Vec<String>,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_color: Option<String>,
    pub switch_on: bool,
    pub score: i32,
    pub round: u32,
    pub is_game_over: bool,
    pub remaining_tap_ms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_game_ms: Option<u32>,
    /// Absent for modes without lives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lives: Option<LivesView>,
    pub actions_taken: u8,
    pub required_actions: u8,
}

impl From<&EngineSnapshot> for SnapshotMessage {
    fn from(s: &EngineSnapshot) -> Self {
        Self {
            msg_type: SnapshotType::Snapshot,
            mode: s.mode.as_str().to_string(),
            phase: s.phase.as_str().to_string(),
            session: s.session,
            grid_colors: s.grid_colors.iter().map(|c| c.name.to_string()).collect(),
            grid_shapes: s
                .grid_shapes
                .iter()
                .map(|shape| shape.as_str().to_string())
                .collect(),
            prompt: s.prompt.text.clone(),
            display_color: s.prompt.display_color.map(|c| c.name.to_string()),
            switch_on: s.switch_on,
            score: s.score,
            round: s.round,
            is_game_over: s.is_game_over,
            remaining_tap_ms: s.remaining_tap_ms,
            remaining_game_ms: s.remaining_game_ms,
            lives: s.uses_lives.then_some(LivesView {
                current: s.lives_current,
                max: s.lives_max,
            }),
            actions_taken: s.actions_taken,
            required_actions: s.required_actions,
        }
    }
}

impl SnapshotMessage {
    /// One JSON line, without the trailing newline
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Serializable form of a [`GameEvent`], printed next to snapshot lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventMessage {
    SessionStarted {
        session: u32,
    },
    RoundStarted {
        round: u32,
    },
    RoundFinished {
        round: u32,
        correct: bool,
        score_delta: i32,
        life_lost: bool,
        timed_out: bool,
    },
    GameOver {
        session: u32,
        score: i32,
        round: u32,
    },
}

impl From<&GameEvent> for EventMessage {
    fn from(event: &GameEvent) -> Self {
        match *event {
            GameEvent::SessionStarted { session } => EventMessage::SessionStarted { session },
            GameEvent::RoundStarted { round } => EventMessage::RoundStarted { round },
            GameEvent::RoundFinished(o) => EventMessage::RoundFinished {
                round: o.round,
                correct: o.correct,
                score_delta: o.score_delta,
                life_lost: o.life_lost,
                timed_out: o.timed_out,
            },
            GameEvent::GameOver {
                session,
                score,
                round,
            } => EventMessage::GameOver {
                session,
                score,
                round,
            },
        }
    }
}

impl EventMessage {
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_attack_core::RulesTuning;
    use color_attack_engine::types::GameMode;
    use color_attack_engine::{GameEngine, RoundOutcome};

    #[test]
    fn test_snapshot_message_fields() {
        let mut engine = GameEngine::for_mode(GameMode::Classic, &RulesTuning::default(), 8);
        engine.start();
        let msg = SnapshotMessage::from(&engine.snapshot());

        assert_eq!(msg.mode, "classic");
        assert_eq!(msg.phase, "round_active");
        assert_eq!(msg.grid_colors.len(), 3);
        assert!(msg.grid_shapes.is_empty());
        assert_eq!(msg.lives, Some(LivesView { current: 3, max: 3 }));

        let line = msg.to_line().unwrap();
        assert!(line.starts_with("{\"type\":\"snapshot\""));
        assert!(!line.contains("grid_shapes"));
        let back: SnapshotMessage = serde_json::from_str(&line).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_rapid_snapshot_has_clock_not_lives() {
        let mut engine = GameEngine::for_mode(GameMode::Rapid, &RulesTuning::default(), 8);
        engine.start();
        let msg = SnapshotMessage::from(&engine.snapshot());
        assert_eq!(msg.lives, None);
        assert_eq!(msg.remaining_game_ms, Some(30_000));
    }

    #[test]
    fn test_event_message_tagging() {
        let event = GameEvent::RoundFinished(RoundOutcome {
            round: 3,
            correct: false,
            score_delta: -5,
            life_lost: false,
            timed_out: true,
        });
        let value = serde_json::to_value(EventMessage::from(&event)).unwrap();
        assert_eq!(value["type"], "round_finished");
        assert_eq!(value["score_delta"], -5);
        assert_eq!(value["timed_out"], true);
    }
}
