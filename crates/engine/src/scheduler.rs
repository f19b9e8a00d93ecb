//! Virtual-time timer driver
//!
//! Applies the engine's timer effects against a millisecond counter instead of
//! a wall clock. A timer started at `t` with tick `k` fires at `t + k`,
//! `t + 2k`, ... and reports `duration - elapsed` each time; the tick that
//! reaches zero completes it. Timers due at the same instant fire in the order
//! they were started.

use crate::engine::GameEngine;
use crate::timer::{Effect, GameEvent, ScoreSubmission, TimerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    token: TimerToken,
    started_at_ms: u64,
    duration_ms: u32,
    tick_ms: u32,
    ticks: u32,
}

impl PendingTimer {
    fn next_due_ms(&self) -> u64 {
        self.started_at_ms + u64::from(self.ticks + 1) * u64::from(self.tick_ms.max(1))
    }

    fn remaining_after(&self, ticks: u32) -> u32 {
        let elapsed = u64::from(ticks) * u64::from(self.tick_ms.max(1));
        u64::from(self.duration_ms).saturating_sub(elapsed) as u32
    }
}

/// Deterministic scheduler used by tests, benches and headless simulation
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    now_ms: u64,
    timers: Vec<PendingTimer>,
    submissions: Vec<ScoreSubmission>,
    events: Vec<GameEvent>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.timers.iter().any(|t| t.token == token)
    }

    /// Apply a batch of effects. Submissions and events are collected for
    /// the caller to take.
    pub fn apply(&mut self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            match effect {
                Effect::StartTimer {
                    token,
                    duration_ms,
                    tick_ms,
                } => self.timers.push(PendingTimer {
                    token,
                    started_at_ms: self.now_ms,
                    duration_ms,
                    tick_ms,
                    ticks: 0,
                }),
                Effect::CancelTimer(token) => self.timers.retain(|t| t.token != token),
                Effect::SubmitScore(submission) => self.submissions.push(submission),
                Effect::Emit(event) => self.events.push(event),
            }
        }
    }

    /// Drain and apply the engine's queued effects
    pub fn pump(&mut self, engine: &mut GameEngine) {
        let effects = engine.take_effects();
        self.apply(effects);
    }

    /// Time at which the next timer fires
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.iter().map(PendingTimer::next_due_ms).min()
    }

    /// Fire the earliest due timer. Returns false when nothing is pending.
    pub fn step(&mut self, engine: &mut GameEngine) -> bool {
        self.pump(engine);

        let Some(index) = self.earliest() else {
            return false;
        };

        let timer = &mut self.timers[index];
        self.now_ms = self.now_ms.max(timer.next_due_ms());
        timer.ticks += 1;
        let token = timer.token;
        let remaining_ms = timer.remaining_after(timer.ticks);
        if remaining_ms == 0 {
            self.timers.remove(index);
        }

        engine.on_timer(token, remaining_ms);
        self.pump(engine);
        true
    }

    /// Fire everything due within the next `ms` milliseconds
    pub fn advance(&mut self, engine: &mut GameEngine, ms: u64) {
        self.pump(engine);
        let target = self.now_ms + ms;
        while self.next_due_ms().is_some_and(|due| due <= target) {
            self.step(engine);
        }
        self.now_ms = target;
    }

    /// Step until the game ends or `limit_ms` of virtual time passes.
    ///
    /// Returns whether the game ended.
    pub fn run_until_game_over(&mut self, engine: &mut GameEngine, limit_ms: u64) -> bool {
        self.pump(engine);
        let deadline = self.now_ms + limit_ms;
        while !engine.is_game_over() {
            match self.next_due_ms() {
                Some(due) if due <= deadline => {
                    self.step(engine);
                }
                _ => break,
            }
        }
        self.pump(engine);
        engine.is_game_over()
    }

    pub fn take_submissions(&mut self) -> Vec<ScoreSubmission> {
        std::mem::take(&mut self.submissions)
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn earliest(&self) -> Option<usize> {
        // `min_by_key` keeps the first of equal keys: start order breaks ties
        self.timers
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| t.next_due_ms())
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Phase;
    use crate::timer::{RoundOutcome, TimerKind};
    use color_attack_core::types::{GameMode, ROUND_TRANSITION_MS};
    use color_attack_core::RulesTuning;

    #[test]
    fn test_round_countdown_ticks_down() {
        let mut engine = GameEngine::for_mode(GameMode::Classic, &RulesTuning::default(), 1);
        let mut sched = VirtualScheduler::new();
        engine.start();

        sched.advance(&mut engine, 100);
        assert_eq!(engine.remaining_tap_ms(), 2400);
        sched.advance(&mut engine, 1000);
        assert_eq!(engine.remaining_tap_ms(), 1400);
        assert_eq!(engine.phase(), Phase::RoundActive);
    }

    #[test]
    fn test_timeout_then_transition() {
        let mut engine = GameEngine::for_mode(GameMode::Classic, &RulesTuning::default(), 1);
        let mut sched = VirtualScheduler::new();
        engine.start();

        sched.advance(&mut engine, 2500);
        assert_eq!(engine.remaining_tap_ms(), 0);
        assert_eq!(engine.lives_current(), 2);
        assert_eq!(engine.phase(), Phase::RoundTransition);

        sched.advance(&mut engine, u64::from(ROUND_TRANSITION_MS));
        assert_eq!(engine.round(), 2);
        assert_eq!(engine.phase(), Phase::RoundActive);

        let events = sched.take_events();
        assert!(events.contains(&GameEvent::RoundFinished(RoundOutcome {
            round: 1,
            correct: false,
            score_delta: 0,
            life_lost: true,
            timed_out: true,
        })));
    }

    #[test]
    fn test_run_until_game_over_picks_up_start_timers() {
        let mut engine = GameEngine::for_mode(GameMode::Chaos, &RulesTuning::default(), 9);
        let mut sched = VirtualScheduler::new();
        engine.start();
        assert_eq!(sched.pending_timers(), 0);

        // Not enough time for five timeouts, but the round timer must run
        assert!(!sched.run_until_game_over(&mut engine, 5_000));
        assert!(engine.round() > 1);
        assert!(engine.lives_current() < 5);
        assert!(sched.pending_timers() > 0);
    }

    #[test]
    fn test_idle_classic_game_ends_after_three_timeouts() {
        let mut engine = GameEngine::for_mode(GameMode::Classic, &RulesTuning::default(), 1);
        let mut sched = VirtualScheduler::new();
        engine.start();

        assert!(sched.run_until_game_over(&mut engine, 60_000));
        // 3 * 2500ms rounds + 2 transitions
        assert_eq!(sched.now_ms(), 3 * 2500 + 2 * 250);
        assert_eq!(engine.round(), 3);
        assert_eq!(sched.pending_timers(), 0);
        assert_eq!(sched.take_submissions().len(), 1);
    }

    #[test]
    fn test_rapid_ends_on_game_clock() {
        let mut engine = GameEngine::for_mode(GameMode::Rapid, &RulesTuning::default(), 1);
        let mut sched = VirtualScheduler::new();
        engine.start();

        sched.advance(&mut engine, 29_500);
        assert_eq!(engine.remaining_game_ms(), Some(500));
        assert!(!engine.is_game_over());

        assert!(sched.run_until_game_over(&mut engine, 1_000));
        assert_eq!(sched.now_ms(), 30_000);
        assert_eq!(engine.round(), 1);
        assert_eq!(sched.pending_timers(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut engine = GameEngine::for_mode(GameMode::Classic, &RulesTuning::default(), 1);
        let mut sched = VirtualScheduler::new();
        engine.start();
        sched.pump(&mut engine);
        let token = engine.active_timer(TimerKind::RoundCountdown).unwrap();
        assert!(sched.is_pending(token));

        engine.stop();
        sched.pump(&mut engine);
        assert!(!sched.is_pending(token));
        assert!(!sched.step(&mut engine));
        assert_eq!(engine.lives_current(), 3);
    }
}
