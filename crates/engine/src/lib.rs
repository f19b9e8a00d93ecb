//! Round engine - the game's state machine, free of clocks and I/O
//!
//! [`GameEngine`] runs one mode's sessions: it starts rounds, scores taps,
//! takes lives and ends the game. It never waits on anything. Timers,
//! score submission and observer notifications leave the engine as
//! [`Effect`]s; timer ticks come back through [`GameEngine::on_timer`].
//!
//! # State machine
//!
//! ```text
//! Idle --start--> RoundActive --finalize--> RoundTransition --250ms--> RoundActive
//!                      |                            |
//!                      +------ lives out / game clock expired ------> GameOver
//! ```
//!
//! `stop()` returns to `Idle` from anywhere; `start()` from anywhere begins a
//! new session.
//!
//! # Example
//!
//! ```
//! use color_attack_engine::{GameEngine, Phase, VirtualScheduler};
//! use color_attack_engine::types::GameMode;
//! use color_attack_core::RulesTuning;
//!
//! let mut engine = GameEngine::for_mode(GameMode::Classic, &RulesTuning::default(), 42);
//! let mut sched = VirtualScheduler::new();
//!
//! engine.start();
//! assert_eq!(engine.round(), 1);
//!
//! // Nobody taps: three timed-out rounds use up Classic's three lives
//! assert!(sched.run_until_game_over(&mut engine, 60_000));
//! assert_eq!(engine.phase(), Phase::GameOver);
//! assert_eq!(sched.take_submissions().len(), 1);
//! ```

pub mod engine;
pub mod planner;
pub mod scheduler;
pub mod snapshot;
pub mod timer;

pub use color_attack_core::types;

pub use engine::{GameEngine, Phase};
pub use planner::{apply_plan, plan, Plan, PlanError};
pub use scheduler::VirtualScheduler;
pub use snapshot::EngineSnapshot;
pub use timer::{
    Effect, GameEvent, RoundOutcome, ScoreSubmission, SubmissionResult, TimerKind, TimerToken,
};
