//! The event loop that owns a [`GameEngine`].
//!
//! Everything that can change engine state arrives as a [`Command`] on one
//! mpsc queue: handle requests, timer ticks and submission results. The loop
//! applies it, then carries out the effects the engine queued. Timer tasks
//! and submission tasks never touch the engine; they only post commands back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use color_attack_engine::types::{GameMode, PlayerAction};
use color_attack_engine::{
    Effect, EngineSnapshot, GameEngine, GameEvent, ScoreSubmission, SubmissionResult, TimerToken,
};

use crate::config::RuntimeConfig;
use crate::handle::RuntimeHandle;
use crate::services::{ScoreService, Services};

/// Input to the event loop
#[derive(Debug)]
pub enum Command {
    Start,
    Stop,
    Restart,
    Tap {
        action: PlayerAction,
        reply: Option<oneshot::Sender<bool>>,
    },
    RetrySubmission,
    Snapshot {
        reply: oneshot::Sender<EngineSnapshot>,
    },
    Timer {
        token: TimerToken,
        remaining_ms: u32,
    },
    Submission {
        session: u32,
        result: SubmissionResult,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Owner of the engine while the loop runs
pub struct GameRuntime {
    engine: GameEngine,
    services: Services,
    command_tx: mpsc::WeakSender<Command>,
    snapshot_tx: watch::Sender<EngineSnapshot>,
    event_tx: broadcast::Sender<GameEvent>,
    timers: HashMap<TimerToken, JoinHandle<()>>,
}

impl GameRuntime {
    /// Spawn the event loop on the current tokio runtime
    pub fn spawn(engine: GameEngine, services: Services, config: &RuntimeConfig) -> RuntimeHandle {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));

        let mode = engine.mode();
        let leaderboard_id = engine.config().leaderboard_id.clone();

        let runtime = GameRuntime {
            engine,
            services: services.clone(),
            command_tx: command_tx.downgrade(),
            snapshot_tx,
            event_tx: event_tx.clone(),
            timers: HashMap::new(),
        };
        let join = tokio::spawn(runtime.run(command_rx));

        RuntimeHandle::new(
            command_tx,
            snapshot_rx,
            event_tx,
            services,
            mode,
            leaderboard_id,
            join,
        )
    }

    /// Build the mode's engine from `config` and spawn it
    pub fn spawn_mode(mode: GameMode, services: Services, config: &RuntimeConfig) -> RuntimeHandle {
        let engine = GameEngine::for_mode(mode, &config.tuning, config.seed);
        Self::spawn(engine, services, config)
    }

    async fn run(mut self, mut command_rx: mpsc::Receiver<Command>) {
        info!(mode = self.engine.mode().as_str(), "runtime started");
        while let Some(command) = command_rx.recv().await {
            if let Command::Shutdown { reply } = command {
                self.engine.stop();
                self.drain_effects();
                self.publish_snapshot();
                self.abort_timers();
                let _ = reply.send(());
                break;
            }
            self.handle(command);
            self.drain_effects();
            self.publish_snapshot();
        }
        self.abort_timers();
        info!("runtime stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start => self.engine.start(),
            Command::Stop => self.engine.stop(),
            Command::Restart => self.engine.restart(),
            Command::Tap { action, reply } => {
                let accepted = self.engine.handle_tap(action);
                if let Some(reply) = reply {
                    let _ = reply.send(accepted);
                }
            }
            Command::RetrySubmission => {
                if !self.engine.retry_score_submission() {
                    debug!("retry ignored: nothing to submit");
                }
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Timer {
                token,
                remaining_ms,
            } => {
                if remaining_ms == 0 {
                    self.timers.remove(&token);
                }
                self.engine.on_timer(token, remaining_ms);
            }
            Command::Submission { session, result } => {
                self.engine.on_score_submitted(session, result)
            }
            Command::Shutdown { .. } => {}
        }
    }

    fn drain_effects(&mut self) {
        for effect in self.engine.take_effects() {
            match effect {
                Effect::StartTimer {
                    token,
                    duration_ms,
                    tick_ms,
                } => self.start_timer(token, duration_ms, tick_ms),
                Effect::CancelTimer(token) => {
                    if let Some(task) = self.timers.remove(&token) {
                        task.abort();
                    }
                }
                Effect::SubmitScore(submission) => self.submit(submission),
                Effect::Emit(event) => {
                    // No subscribers is fine
                    let _ = self.event_tx.send(event);
                }
            }
        }
    }

    fn publish_snapshot(&self) {
        let engine = &self.engine;
        self.snapshot_tx.send_if_modified(|current| {
            let next = engine.snapshot();
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn start_timer(&mut self, token: TimerToken, duration_ms: u32, tick_ms: u32) {
        let Some(tx) = self.command_tx.upgrade() else {
            return;
        };
        let task = tokio::spawn(run_timer(tx, token, duration_ms, tick_ms));
        if let Some(previous) = self.timers.insert(token, task) {
            previous.abort();
        }
    }

    fn submit(&self, submission: ScoreSubmission) {
        let Some(tx) = self.command_tx.upgrade() else {
            return;
        };
        let score = Arc::clone(&self.services.score);
        tokio::spawn(async move {
            let session = submission.session;
            let result = submit_score(score.as_ref(), &submission).await;
            let _ = tx.send(Command::Submission { session, result }).await;
        });
    }

    fn abort_timers(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}

/// Tick every `tick_ms` until the remaining time reaches zero
async fn run_timer(
    tx: mpsc::Sender<Command>,
    token: TimerToken,
    duration_ms: u32,
    tick_ms: u32,
) {
    let tick_ms = tick_ms.max(1);
    let period = Duration::from_millis(u64::from(tick_ms));
    let mut interval = interval_at(Instant::now() + period, period);
    let mut elapsed_ms = 0u32;

    loop {
        interval.tick().await;
        elapsed_ms = elapsed_ms.saturating_add(tick_ms);
        let remaining_ms = duration_ms.saturating_sub(elapsed_ms);
        if tx
            .send(Command::Timer {
                token,
                remaining_ms,
            })
            .await
            .is_err()
        {
            break;
        }
        if remaining_ms == 0 {
            break;
        }
    }
}

/// Submit once, translating the outcome for the engine
pub async fn submit_score(
    service: &dyn ScoreService,
    submission: &ScoreSubmission,
) -> SubmissionResult {
    if !service.is_player_authenticated().await {
        info!(
            session = submission.session,
            "player not authenticated; score not submitted"
        );
        return SubmissionResult::Skipped;
    }

    match service
        .submit_score(submission.score, &submission.leaderboard_id)
        .await
    {
        Ok(()) => SubmissionResult::Submitted,
        Err(e) => {
            warn!(
                session = submission.session,
                score = submission.score,
                leaderboard = %submission.leaderboard_id,
                error = %e,
                "score submission failed"
            );
            SubmissionResult::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryScoreService;

    fn submission() -> ScoreSubmission {
        ScoreSubmission {
            session: 1,
            score: 30,
            leaderboard_id: "board".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_score_outcomes() {
        let service = InMemoryScoreService::new();
        assert_eq!(
            submit_score(&service, &submission()).await,
            SubmissionResult::Submitted
        );

        service.fail_next(1);
        assert_eq!(
            submit_score(&service, &submission()).await,
            SubmissionResult::Failed
        );

        service.set_authenticated(false);
        assert_eq!(
            submit_score(&service, &submission()).await,
            SubmissionResult::Skipped
        );
        assert_eq!(service.submissions(), vec![("board".to_string(), 30)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_task_counts_down() {
        use color_attack_engine::TimerKind;

        let (tx, mut rx) = mpsc::channel(16);
        let token = TimerToken {
            kind: TimerKind::RoundTransition,
            id: 1,
        };
        tokio::spawn(run_timer(tx, token, 250, 250));

        match rx.recv().await {
            Some(Command::Timer {
                token: got,
                remaining_ms,
            }) => {
                assert_eq!(got, token);
                assert_eq!(remaining_ms, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
        // Single shot: the task ends and drops its sender
        assert!(rx.recv().await.is_none());
    }
}
