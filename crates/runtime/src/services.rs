//! External collaborators: leaderboard and audio.
//!
//! The runtime only ever calls these fire-and-forget from spawned tasks, so
//! implementations must be `Send + Sync`. The in-memory and silent versions
//! back the binary and the tests.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::ScoreError;

/// Platform leaderboard
#[async_trait]
pub trait ScoreService: Send + Sync {
    async fn is_player_authenticated(&self) -> bool;

    async fn submit_score(&self, score: i32, leaderboard_id: &str) -> Result<(), ScoreError>;

    async fn load_best_score(&self, leaderboard_id: &str) -> Result<i32, ScoreError>;
}

/// Background music and effects
pub trait AudioService: Send + Sync {
    fn play_music(&self, track: &str, volume: f32, looped: bool);

    fn stop(&self);

    fn set_muted(&self, muted: bool);
}

/// The pair of services a runtime talks to
#[derive(Clone)]
pub struct Services {
    pub score: Arc<dyn ScoreService>,
    pub audio: Arc<dyn AudioService>,
}

impl Services {
    pub fn new(score: Arc<dyn ScoreService>, audio: Arc<dyn AudioService>) -> Self {
        Self { score, audio }
    }

    /// Authenticated in-memory leaderboard with silent audio
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryScoreService::new()),
            Arc::new(SilentAudio::default()),
        )
    }
}

#[derive(Debug, Default)]
struct Leaderboards {
    authenticated: bool,
    failures_pending: u32,
    best: HashMap<String, i32>,
    submitted: Vec<(String, i32)>,
}

/// Leaderboard kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryScoreService {
    state: Mutex<Leaderboards>,
}

impl InMemoryScoreService {
    /// A service with a signed-in player
    pub fn new() -> Self {
        let service = Self::default();
        service.set_authenticated(true);
        service
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.lock().authenticated = authenticated;
    }

    /// Make the next `n` submissions fail with [`ScoreError::Unavailable`]
    pub fn fail_next(&self, n: u32) {
        self.lock().failures_pending = n;
    }

    /// Every accepted `(leaderboard, score)` pair, oldest first
    pub fn submissions(&self) -> Vec<(String, i32)> {
        self.lock().submitted.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Leaderboards> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ScoreService for InMemoryScoreService {
    async fn is_player_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    async fn submit_score(&self, score: i32, leaderboard_id: &str) -> Result<(), ScoreError> {
        let mut boards = self.lock();
        if !boards.authenticated {
            return Err(ScoreError::NotAuthenticated);
        }
        if boards.failures_pending > 0 {
            boards.failures_pending -= 1;
            return Err(ScoreError::Unavailable);
        }

        boards.submitted.push((leaderboard_id.to_string(), score));
        let best = boards.best.entry(leaderboard_id.to_string()).or_insert(score);
        *best = (*best).max(score);
        debug!(leaderboard_id, score, "score recorded");
        Ok(())
    }

    async fn load_best_score(&self, leaderboard_id: &str) -> Result<i32, ScoreError> {
        let boards = self.lock();
        if !boards.authenticated {
            return Err(ScoreError::NotAuthenticated);
        }
        Ok(boards.best.get(leaderboard_id).copied().unwrap_or(0))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct AudioState {
    track: Option<String>,
    volume: f32,
    looped: bool,
    muted: bool,
}

/// Audio sink that only logs what it was asked to play
#[derive(Debug, Default)]
pub struct SilentAudio {
    state: Mutex<AudioState>,
}

impl SilentAudio {
    pub fn current_track(&self) -> Option<String> {
        self.lock().track.clone()
    }

    pub fn is_muted(&self) -> bool {
        self.lock().muted
    }

    fn lock(&self) -> MutexGuard<'_, AudioState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AudioService for SilentAudio {
    fn play_music(&self, track: &str, volume: f32, looped: bool) {
        info!(track, volume, looped, "play music");
        let mut state = self.lock();
        state.track = Some(track.to_string());
        state.volume = volume;
        state.looped = looped;
    }

    fn stop(&self) {
        debug!("stop music");
        self.lock().track = None;
    }

    fn set_muted(&self, muted: bool) {
        debug!(muted, "mute");
        self.lock().muted = muted;
    }
}
