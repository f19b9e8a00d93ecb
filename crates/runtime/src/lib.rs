//! Async runtime - drives a [`GameEngine`] with real timers
//!
//! The engine is single-writer: one tokio task owns it and processes a single
//! command queue. Timer ticks and leaderboard results are posted into that
//! same queue, so nothing else ever touches engine state.
//!
//! # Channels
//!
//! | Channel | Kind | Carries |
//! |---------|------|---------|
//! | commands | `mpsc` | handle requests, timer ticks, submission results |
//! | snapshots | `watch` | latest [`EngineSnapshot`] after every change |
//! | events | `broadcast` | [`GameEvent`]s as they happen |
//!
//! # Environment Variables
//!
//! - `COLOR_ATTACK_SEED`: RNG seed (default: derived from the clock)
//! - `COLOR_ATTACK_CHAOS_MIN_TAP_MS`: Chaos tap window floor (default: 2000)
//! - `COLOR_ATTACK_OFF_GRID_ROUND`: round Classic off-grid prompts unlock at
//! - `COLOR_ATTACK_COMMAND_BUFFER`: command queue capacity (default: 32)
//! - `COLOR_ATTACK_EVENT_BUFFER`: event channel capacity (default: 64)
//!
//! [`GameEngine`]: color_attack_engine::GameEngine
//! [`EngineSnapshot`]: color_attack_engine::EngineSnapshot
//! [`GameEvent`]: color_attack_engine::GameEvent

pub mod config;
pub mod error;
pub mod handle;
pub mod protocol;
pub mod runtime;
pub mod services;

pub use color_attack_engine as engine;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError, ScoreError};
pub use handle::RuntimeHandle;
pub use protocol::{EventMessage, LivesView, SnapshotMessage};
pub use runtime::{Command, GameRuntime};
pub use services::{AudioService, InMemoryScoreService, ScoreService, Services, SilentAudio};
