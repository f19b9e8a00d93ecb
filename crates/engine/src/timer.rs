//! Timer tokens, effects and events
//!
//! The engine never sleeps or spawns anything. Every operation queues
//! [`Effect`]s for whatever drives it (the tokio runtime, or the
//! [`VirtualScheduler`](crate::scheduler::VirtualScheduler) in tests), and the
//! driver feeds timer ticks back through
//! [`GameEngine::on_timer`](crate::engine::GameEngine::on_timer).

use std::fmt;

/// Which of the engine's timers a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Per-round tap countdown (100ms cadence)
    RoundCountdown,
    /// Total game countdown for timed modes (500ms cadence)
    GameCountdown,
    /// One-shot pause between rounds
    RoundTransition,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::RoundCountdown => "round",
            TimerKind::GameCountdown => "game",
            TimerKind::RoundTransition => "transition",
        }
    }
}

/// Identity of one timer instance.
///
/// Ids are never reused within an engine, so a tick carrying a token the engine
/// no longer holds is stale and gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub id: u64,
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.as_str(), self.id)
    }
}

/// Final score handed to the leaderboard service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub session: u32,
    pub score: i32,
    pub leaderboard_id: String,
}

/// What became of a submission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionResult {
    Submitted,
    /// No authenticated player; nothing was sent
    Skipped,
    Failed,
}

/// Result of one finalized round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round: u32,
    pub correct: bool,
    pub score_delta: i32,
    pub life_lost: bool,
    pub timed_out: bool,
}

/// Notable transitions, for observers that want more than snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    SessionStarted { session: u32 },
    RoundStarted { round: u32 },
    RoundFinished(RoundOutcome),
    GameOver { session: u32, score: i32, round: u32 },
}

/// Work the engine asks its driver to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tick every `tick_ms` with the remaining time until it reaches zero
    StartTimer {
        token: TimerToken,
        duration_ms: u32,
        tick_ms: u32,
    },
    CancelTimer(TimerToken),
    SubmitScore(ScoreSubmission),
    Emit(GameEvent),
}
