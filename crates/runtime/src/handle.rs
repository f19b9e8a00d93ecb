//! Cloneable front for a running [`GameRuntime`](crate::runtime::GameRuntime).
//!
//! [`RuntimeHandle`] hides the channel plumbing. Commands are queued in order,
//! so a `snapshot()` issued after a `tap()` always observes the tap.
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use color_attack_engine::types::{GameMode, PlayerAction};
use color_attack_engine::{EngineSnapshot, GameEvent};

use crate::error::{Result, RuntimeError};
use crate::runtime::Command;
use crate::services::Services;

/// Volume used for background music on mode entry
pub const MUSIC_VOLUME: f32 = 0.5;

#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<EngineSnapshot>,
    event_tx: broadcast::Sender<GameEvent>,
    services: Services,
    mode: GameMode,
    leaderboard_id: String,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        snapshot_rx: watch::Receiver<EngineSnapshot>,
        event_tx: broadcast::Sender<GameEvent>,
        services: Services,
        mode: GameMode,
        leaderboard_id: String,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            command_tx,
            snapshot_rx,
            event_tx,
            services,
            mode,
            leaderboard_id,
            join: Arc::new(Mutex::new(Some(join))),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn start(&self) -> Result<()> {
        self.send(Command::Start).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    pub async fn restart(&self) -> Result<()> {
        self.send(Command::Restart).await
    }

    /// Deliver a player action. Resolves to whether the engine accepted it.
    pub async fn tap(&self, action: PlayerAction) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Tap {
            action,
            reply: Some(reply_tx),
        })
        .await?;
        reply_rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn retry_score_submission(&self) -> Result<()> {
        self.send(Command::RetrySubmission).await
    }

    /// Snapshot taken after every previously queued command was applied
    pub async fn snapshot(&self) -> Result<EngineSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Most recently published snapshot, without a round trip
    pub fn latest(&self) -> EngineSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }

    /// Best score on this mode's leaderboard
    pub async fn best_score(&self) -> Result<i32> {
        Ok(self
            .services
            .score
            .load_best_score(&self.leaderboard_id)
            .await?)
    }

    /// Mode entry: start the mode's music and read the best score once.
    ///
    /// A best score that cannot be loaded reads as 0.
    pub async fn enter_mode(&self) -> i32 {
        self.services
            .audio
            .play_music(self.mode.music_track(), MUSIC_VOLUME, true);
        match self.best_score().await {
            Ok(best) => best,
            Err(e) => {
                debug!(error = %e, "best score unavailable");
                0
            }
        }
    }

    /// Stop the engine and end the event loop
    pub async fn shutdown(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Shutdown { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RuntimeError::ChannelClosed)?;

        let join = self
            .join
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(join) = join {
            let _ = join.await;
        }
        self.services.audio.stop();
        Ok(())
    }
}
