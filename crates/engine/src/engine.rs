//! Round engine - the per-session state machine
//!
//! The engine owns all session state and is the only writer. It is driven by
//! three kinds of input: player operations (`start`, `stop`, `restart`,
//! `handle_tap`), timer ticks (`on_timer`) and score submission results
//! (`on_score_submitted`). Anything it needs done outside itself is queued as
//! an [`Effect`] and drained with [`GameEngine::take_effects`].

use color_attack_core::types::{
    ColorToken, GameMode, ModeConfig, PlayerAction, Prompt, DEFAULT_COLOR_POOL, GAME_TICK_MS,
    ROUND_TICK_MS, ROUND_TRANSITION_MS,
};
use color_attack_core::{
    GameRng, Grid, Lives, ModeRules, RoundContext, Rules, RulesTuning, ShapeLayout,
};
use tracing::{debug, info};

use crate::snapshot::EngineSnapshot;
use crate::timer::{
    Effect, GameEvent, RoundOutcome, ScoreSubmission, SubmissionResult, TimerKind, TimerToken,
};

/// Where the state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Not started, or stopped
    #[default]
    Idle,
    /// Prompt shown, collecting actions
    RoundActive,
    /// Feedback pause between a finalized round and the next one
    RoundTransition,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::RoundActive => "round_active",
            Phase::RoundTransition => "round_transition",
            Phase::GameOver => "game_over",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Phase::RoundActive | Phase::RoundTransition)
    }
}

/// Complete engine state for one mode
#[derive(Debug, Clone)]
pub struct GameEngine {
    mode: GameMode,
    config: ModeConfig,
    rules: Rules,
    lives: Lives,
    pool: Vec<ColorToken>,
    rng: GameRng,
    phase: Phase,
    /// Monotonic session id (increments on every start).
    session: u32,
    grid_colors: Grid,
    grid_shapes: ShapeLayout,
    prompt: Prompt,
    switch_on: bool,
    score: i32,
    round: u32,
    game_over: bool,
    remaining_tap_ms: u32,
    remaining_game_ms: Option<u32>,
    required_actions: u8,
    actions_taken: u8,
    all_correct: bool,
    round_timer: Option<TimerToken>,
    game_timer: Option<TimerToken>,
    transition_timer: Option<TimerToken>,
    next_timer_id: u64,
    /// A submission for this session was requested and has not failed.
    score_submitted: bool,
    effects: Vec<Effect>,
}

impl GameEngine {
    /// Create an idle engine with explicit configuration
    pub fn new(
        config: ModeConfig,
        rules: Rules,
        max_lives: u32,
        pool: Vec<ColorToken>,
        seed: u64,
    ) -> Self {
        let remaining_tap_ms = config.tap_time_limit_ms;
        let remaining_game_ms = config.total_game_time_limit_ms;
        Self {
            mode: rules.mode(),
            config,
            rules,
            lives: Lives::new(max_lives),
            pool,
            rng: GameRng::new(seed),
            phase: Phase::Idle,
            session: 0,
            grid_colors: Grid::new(),
            grid_shapes: ShapeLayout::new(),
            prompt: Prompt::placeholder(),
            switch_on: false,
            score: 0,
            round: 0,
            game_over: false,
            remaining_tap_ms,
            remaining_game_ms,
            required_actions: 1,
            actions_taken: 0,
            all_correct: true,
            round_timer: None,
            game_timer: None,
            transition_timer: None,
            next_timer_id: 0,
            score_submitted: false,
            effects: Vec::new(),
        }
    }

    /// Create an idle engine with the mode's preset config and the default pool
    pub fn for_mode(mode: GameMode, tuning: &RulesTuning, seed: u64) -> Self {
        Self::new(
            mode.config(),
            Rules::for_mode(mode, tuning),
            mode.max_lives(),
            DEFAULT_COLOR_POOL.to_vec(),
            seed,
        )
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn pool(&self) -> &[ColorToken] {
        &self.pool
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> u32 {
        self.session
    }

    pub fn grid_colors(&self) -> &[ColorToken] {
        &self.grid_colors
    }

    pub fn grid_shapes(&self) -> &ShapeLayout {
        &self.grid_shapes
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt.text
    }

    pub fn switch_on(&self) -> bool {
        self.switch_on
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn remaining_tap_ms(&self) -> u32 {
        self.remaining_tap_ms
    }

    pub fn remaining_game_ms(&self) -> Option<u32> {
        self.remaining_game_ms
    }

    pub fn lives(&self) -> &Lives {
        &self.lives
    }

    pub fn lives_current(&self) -> u32 {
        self.lives.current()
    }

    pub fn required_actions(&self) -> u8 {
        self.required_actions
    }

    pub fn actions_taken(&self) -> u8 {
        self.actions_taken
    }

    pub fn score_submitted(&self) -> bool {
        self.score_submitted
    }

    /// Token of the running timer of `kind`, if any
    pub fn active_timer(&self, kind: TimerKind) -> Option<TimerToken> {
        match kind {
            TimerKind::RoundCountdown => self.round_timer,
            TimerKind::GameCountdown => self.game_timer,
            TimerKind::RoundTransition => self.transition_timer,
        }
    }

    /// Take every effect queued since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn snapshot_into(&self, out: &mut EngineSnapshot) {
        out.mode = self.mode;
        out.phase = self.phase;
        out.session = self.session;
        out.grid_colors.clear();
        out.grid_colors.extend(self.grid_colors.iter().copied());
        out.grid_shapes.clear();
        out.grid_shapes.extend(self.grid_shapes.iter().copied());
        out.prompt.clone_from(&self.prompt);
        out.switch_on = self.switch_on;
        out.score = self.score;
        out.round = self.round;
        out.is_game_over = self.game_over;
        out.remaining_tap_ms = self.remaining_tap_ms;
        out.remaining_game_ms = self.remaining_game_ms;
        out.lives_current = self.lives.current();
        out.lives_max = self.lives.max();
        out.uses_lives = self.config.uses_lives;
        out.actions_taken = self.actions_taken;
        out.required_actions = self.required_actions;
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let mut s = EngineSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Begin a fresh session at round 1.
    ///
    /// Callable from any phase; a running session is torn down first.
    pub fn start(&mut self) {
        self.cancel_all_timers();

        self.session = self.session.wrapping_add(1);
        self.score = 0;
        self.round = 0;
        self.game_over = false;
        self.score_submitted = false;
        self.lives.reset();
        self.rules.reset();
        self.grid_colors.clear();
        self.grid_shapes.clear();
        self.prompt = Prompt::placeholder();
        self.switch_on = false;
        self.actions_taken = 0;
        self.all_correct = true;
        self.remaining_tap_ms = self.config.tap_time_limit_ms;
        self.remaining_game_ms = self.config.total_game_time_limit_ms;

        info!(
            session = self.session,
            mode = self.mode.as_str(),
            seed = self.rng.seed(),
            "session started"
        );
        self.effects.push(Effect::Emit(GameEvent::SessionStarted {
            session: self.session,
        }));

        if let Some(total_ms) = self.config.total_game_time_limit_ms {
            let token = self.start_timer(TimerKind::GameCountdown, total_ms, GAME_TICK_MS);
            self.game_timer = Some(token);
        }

        self.next_round();
    }

    /// Cancel every timer and go idle. Score, lives and the game-over flag
    /// are left as they are.
    pub fn stop(&mut self) {
        self.cancel_all_timers();
        if self.phase != Phase::Idle {
            debug!(session = self.session, round = self.round, "engine stopped");
        }
        self.phase = Phase::Idle;
    }

    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }

    /// Apply a player action to the active round.
    ///
    /// Returns false when the action was ignored (no active round or game over).
    pub fn handle_tap(&mut self, action: PlayerAction) -> bool {
        if self.game_over || self.phase != Phase::RoundActive {
            debug!(phase = self.phase.as_str(), ?action, "stale tap ignored");
            return false;
        }

        let ctx = RoundContext {
            round: self.round,
            score: self.score,
            grid: &self.grid_colors,
            pool: &self.pool,
        };
        let correct = self
            .rules
            .is_correct(&action, &self.prompt, self.switch_on, &ctx);

        self.all_correct &= correct;
        self.actions_taken = self.actions_taken.saturating_add(1);
        debug!(
            round = self.round,
            ?action,
            correct,
            taken = self.actions_taken,
            required = self.required_actions,
            "tap"
        );

        if self.actions_taken >= self.required_actions {
            self.finalize_round(false);
        }
        true
    }

    /// Deliver a timer tick. `remaining_ms` reaching zero completes the timer.
    ///
    /// Returns false for stale tokens (cancelled or from an earlier session).
    pub fn on_timer(&mut self, token: TimerToken, remaining_ms: u32) -> bool {
        if self.active_timer(token.kind) != Some(token) {
            debug!(%token, "stale timer tick ignored");
            return false;
        }

        match token.kind {
            TimerKind::RoundCountdown => {
                self.remaining_tap_ms = remaining_ms;
                if remaining_ms == 0 {
                    self.round_timer = None;
                    self.finalize_round(true);
                }
            }
            TimerKind::GameCountdown => {
                self.remaining_game_ms = Some(remaining_ms);
                if remaining_ms == 0 {
                    self.game_timer = None;
                    info!(session = self.session, "game time expired");
                    self.enter_game_over();
                }
            }
            TimerKind::RoundTransition => {
                if remaining_ms == 0 {
                    self.transition_timer = None;
                    self.next_round();
                }
            }
        }
        true
    }

    /// Record what happened to a submission request.
    ///
    /// Results for an earlier session are ignored. `Skipped` and `Failed`
    /// clear the submitted flag so a retry is possible.
    pub fn on_score_submitted(&mut self, session: u32, result: SubmissionResult) {
        if session != self.session {
            debug!(session, current = self.session, "submission result for old session");
            return;
        }
        match result {
            SubmissionResult::Submitted => {
                info!(session, score = self.score, "score submitted");
            }
            SubmissionResult::Skipped | SubmissionResult::Failed => {
                debug!(session, ?result, "score not submitted; retry allowed");
                self.score_submitted = false;
            }
        }
    }

    /// Ask for the final score to be submitted again.
    ///
    /// Only valid after game over when no submission is pending or done.
    pub fn retry_score_submission(&mut self) -> bool {
        if !self.game_over || self.score_submitted {
            return false;
        }
        self.request_submission();
        true
    }

    fn next_round(&mut self) {
        if self.config.uses_lives && self.lives.is_empty() {
            self.enter_game_over();
            return;
        }

        self.round = self.round.saturating_add(1);
        self.actions_taken = 0;
        self.all_correct = true;
        self.required_actions = self.rules.required_actions();

        // First round of a session always builds a grid
        if self.round == 1 || self.rules.should_reshuffle(self.round, self.score) {
            self.grid_colors = self.rules.make_grid(
                &self.pool,
                self.config.cards_per_grid,
                self.round,
                self.score,
                &mut self.rng,
            );
            if let Some(layout) =
                self.rules
                    .shape_layout(self.round, &self.grid_shapes, &mut self.rng)
            {
                self.grid_shapes = layout;
            }
        }

        let ctx = RoundContext {
            round: self.round,
            score: self.score,
            grid: &self.grid_colors,
            pool: &self.pool,
        };
        let next = self.rules.make_prompt(&ctx, &mut self.rng);
        self.prompt = next.prompt;
        self.switch_on = next.switch_on;

        let limit_ms = self
            .rules
            .tap_time_limit_ms(self.round)
            .unwrap_or(self.config.tap_time_limit_ms);
        self.remaining_tap_ms = limit_ms;
        self.phase = Phase::RoundActive;

        let token = self.start_timer(TimerKind::RoundCountdown, limit_ms, ROUND_TICK_MS);
        self.round_timer = Some(token);

        debug!(
            round = self.round,
            prompt = %self.prompt.text.replace('\n', " | "),
            switch_on = self.switch_on,
            limit_ms,
            "round started"
        );
        self.effects
            .push(Effect::Emit(GameEvent::RoundStarted { round: self.round }));
    }

    fn finalize_round(&mut self, timed_out: bool) {
        if let Some(token) = self.round_timer.take() {
            self.effects.push(Effect::CancelTimer(token));
        }

        // Missing actions on timeout count as wrong
        if timed_out && self.actions_taken < self.required_actions {
            self.all_correct = false;
        }

        let correct = self.all_correct;
        let score_delta = self.rules.score_delta(correct);
        self.score = self.score.saturating_add(score_delta);

        let life_lost = !correct && self.config.uses_lives && self.lives.lose();

        let outcome = RoundOutcome {
            round: self.round,
            correct,
            score_delta,
            life_lost,
            timed_out,
        };
        debug!(
            round = self.round,
            correct,
            score_delta,
            score = self.score,
            lives = self.lives.current(),
            timed_out,
            "round finalized"
        );
        self.effects
            .push(Effect::Emit(GameEvent::RoundFinished(outcome)));

        if self.config.uses_lives && self.lives.is_empty() {
            self.enter_game_over();
        } else {
            self.phase = Phase::RoundTransition;
            let token = self.start_timer(
                TimerKind::RoundTransition,
                ROUND_TRANSITION_MS,
                ROUND_TRANSITION_MS,
            );
            self.transition_timer = Some(token);
        }
    }

    fn enter_game_over(&mut self) {
        self.cancel_all_timers();
        self.game_over = true;
        self.phase = Phase::GameOver;

        info!(
            session = self.session,
            score = self.score,
            round = self.round,
            "game over"
        );
        self.effects.push(Effect::Emit(GameEvent::GameOver {
            session: self.session,
            score: self.score,
            round: self.round,
        }));
        self.request_submission();
    }

    fn request_submission(&mut self) {
        if self.score_submitted {
            return;
        }
        self.score_submitted = true;
        self.effects.push(Effect::SubmitScore(ScoreSubmission {
            session: self.session,
            score: self.score,
            leaderboard_id: self.config.leaderboard_id.clone(),
        }));
    }

    fn start_timer(&mut self, kind: TimerKind, duration_ms: u32, tick_ms: u32) -> TimerToken {
        self.next_timer_id += 1;
        let token = TimerToken {
            kind,
            id: self.next_timer_id,
        };
        self.effects.push(Effect::StartTimer {
            token,
            duration_ms,
            tick_ms,
        });
        token
    }

    fn cancel_all_timers(&mut self) {
        for token in [
            self.round_timer.take(),
            self.game_timer.take(),
            self.transition_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.effects.push(Effect::CancelTimer(token));
        }
    }
}
