//! Scripted player for headless runs and benchmarks.
//!
//! The bot reads the typed prompt rule, waits a fixed reaction time, and then
//! answers correctly with probability `accuracy`. Games run in virtual time
//! on a [`VirtualScheduler`], so a full game takes microseconds.

use crate::core::GameRng;
use crate::engine::{apply_plan, plan, EngineSnapshot, GameEngine, Phase, Plan, VirtualScheduler};

/// Default delay between a prompt appearing and the bot tapping
pub const DEFAULT_REACTION_MS: u32 = 400;

/// Virtual-time cap for one simulated game (10 minutes)
pub const DEFAULT_GAME_LIMIT_MS: u64 = 600_000;

/// How one simulated game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub session: u32,
    pub score: i32,
    pub round: u32,
    pub lives_left: u32,
    pub elapsed_ms: u64,
    /// False when the game hit the time cap before ending
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct Autoplayer {
    accuracy: f64,
    reaction_ms: u32,
    rng: GameRng,
}

impl Autoplayer {
    pub fn new(accuracy: f64, seed: u64) -> Self {
        Self {
            accuracy: accuracy.clamp(0.0, 1.0),
            reaction_ms: DEFAULT_REACTION_MS,
            rng: GameRng::new(seed),
        }
    }

    pub fn with_reaction_ms(mut self, reaction_ms: u32) -> Self {
        self.reaction_ms = reaction_ms;
        self
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn reaction_ms(&self) -> u32 {
        self.reaction_ms
    }

    /// Actions for the snapshot's current round
    pub fn choose(&mut self, snapshot: &EngineSnapshot) -> Plan {
        let correct = self.rng.chance(self.accuracy);
        plan(
            &snapshot.prompt.rule,
            &snapshot.grid_colors,
            &snapshot.grid_shapes,
            correct,
        )
    }

    /// Start a session and play it to the end (or `limit_ms` of virtual time)
    pub fn play_game(
        &mut self,
        engine: &mut GameEngine,
        sched: &mut VirtualScheduler,
        limit_ms: u64,
    ) -> GameSummary {
        let started_at = sched.now_ms();
        let deadline = started_at + limit_ms;

        engine.start();
        sched.pump(engine);

        while !engine.is_game_over() && sched.now_ms() < deadline {
            match engine.phase() {
                Phase::RoundActive => {
                    let round = engine.round();
                    let wake_at = sched.now_ms() + u64::from(self.reaction_ms);
                    let waiting =
                        |e: &GameEngine| e.phase() == Phase::RoundActive && e.round() == round;

                    while waiting(&*engine)
                        && sched.next_due_ms().is_some_and(|due| due <= wake_at)
                    {
                        sched.step(engine);
                    }
                    // The round may have timed out while "thinking"
                    if waiting(&*engine) {
                        sched.advance(engine, wake_at - sched.now_ms());
                        let correct = self.rng.chance(self.accuracy);
                        let _ = apply_plan(engine, correct);
                        sched.pump(engine);
                    }
                }
                Phase::RoundTransition => {
                    if !sched.step(engine) {
                        break;
                    }
                }
                Phase::Idle | Phase::GameOver => break,
            }
        }

        GameSummary {
            session: engine.session(),
            score: engine.score(),
            round: engine.round(),
            lives_left: engine.lives_current(),
            elapsed_ms: sched.now_ms() - started_at,
            finished: engine.is_game_over(),
        }
    }
}
