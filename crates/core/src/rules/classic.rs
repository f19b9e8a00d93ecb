//! Classic mode rulebook
//!
//! - Starts simple ("TAP RED") on a 3-card grid
//! - Introduces "DON'T TAP" from round 5
//! - Grows the grid to 6 cards at round 4 and 9 cards at round 15
//! - Adds a Stroop colour mismatch from round 15
//! - Shrinks the tap window every 8 rounds

use super::{
    decayed_limit_ms, pick_excluding, same_color, sample_grid, Grid, ModeRules, RoundContext,
    RoundPrompt,
};
use crate::rng::GameRng;
use crate::types::{ColorLine, ColorToken, Instruction, PlayerAction, Prompt, PromptRule};

/// Round the grid grows from 3 to 6 cards
const FIRST_STEP: u32 = 4;
/// Round the grid grows from 6 to 9 cards
const DIFFICULTY_STEP: u32 = 15;

const SWITCH_START_ROUND: u32 = 5;
const SWITCH_CHANCE: f64 = 0.3;

const STROOP_START_ROUND: u32 = 15;
const STROOP_CHANCE: f64 = 0.4;

/// Chance a "DON'T TAP" names a colour that is not on the grid, once unlocked
const OFF_GRID_CHANCE: f64 = 0.3;

const START_TAP_MS: u32 = 2500;
const MIN_TAP_MS: u32 = 800;
const DECAY_EVERY: u32 = 8;
const DECAY_MS: u32 = 100;

const CORRECT_POINTS: i32 = 10;

#[derive(Debug, Clone)]
pub struct ClassicRules {
    off_grid_start_round: u32,
    last_target: Option<ColorToken>,
}

impl ClassicRules {
    pub fn new(off_grid_start_round: u32) -> Self {
        Self {
            off_grid_start_round,
            last_target: None,
        }
    }

    /// Cards on screen for a given round
    pub fn grid_size(round: u32) -> usize {
        match round {
            r if r < FIRST_STEP => 3,
            r if r < DIFFICULTY_STEP => 6,
            _ => 9,
        }
    }

    pub fn last_target(&self) -> Option<ColorToken> {
        self.last_target
    }
}

impl ModeRules for ClassicRules {
    fn make_grid(
        &self,
        pool: &[ColorToken],
        _cards_per_grid: usize,
        round: u32,
        _score: i32,
        rng: &mut GameRng,
    ) -> Grid {
        sample_grid(pool, Self::grid_size(round), rng)
    }

    fn make_prompt(&mut self, ctx: &RoundContext<'_>, rng: &mut GameRng) -> RoundPrompt {
        let switch_on = ctx.round >= SWITCH_START_ROUND && rng.chance(SWITCH_CHANCE);

        let use_off_grid =
            switch_on && ctx.round >= self.off_grid_start_round && rng.chance(OFF_GRID_CHANCE);

        let off_grid: Vec<ColorToken> = if use_off_grid {
            ctx.pool
                .iter()
                .copied()
                .filter(|c| !ctx.grid.iter().any(|g| same_color(g, c)))
                .collect()
        } else {
            Vec::new()
        };

        // Every pool colour already on the grid: stay on-grid
        let candidates: &[ColorToken] = if off_grid.is_empty() {
            ctx.grid
        } else {
            &off_grid
        };

        let Some(target) = pick_excluding(candidates, self.last_target, same_color, rng) else {
            return RoundPrompt::placeholder();
        };
        self.last_target = Some(target);

        let instruction = if switch_on {
            Instruction::DontTap
        } else {
            Instruction::Tap
        };
        let text = format!("{} {}", instruction.verb(), target.upper_name());

        let display_color = if ctx.round >= STROOP_START_ROUND && rng.chance(STROOP_CHANCE) {
            let others: Vec<ColorToken> = ctx
                .pool
                .iter()
                .copied()
                .filter(|c| !same_color(c, &target))
                .collect();
            rng.pick(&others)
        } else {
            None
        };

        RoundPrompt {
            prompt: Prompt {
                text,
                display_color,
                rule: PromptRule::Single(ColorLine {
                    instruction,
                    target,
                }),
            },
            switch_on,
        }
    }

    fn is_correct(
        &self,
        action: &PlayerAction,
        prompt: &Prompt,
        switch_on: bool,
        _ctx: &RoundContext<'_>,
    ) -> bool {
        match action {
            PlayerAction::ColorTap(tapped) => {
                let is_target = match prompt.rule {
                    PromptRule::Single(line) => same_color(tapped, &line.target),
                    // Nothing is the "?" placeholder
                    PromptRule::Unresolved | PromptRule::Dual { .. } => false,
                };
                if switch_on {
                    !is_target
                } else {
                    is_target
                }
            }
            PlayerAction::NoTap => switch_on,
            PlayerAction::ShapeTap(_) => false,
        }
    }

    fn score_delta(&self, correct: bool) -> i32 {
        if correct {
            CORRECT_POINTS
        } else {
            0
        }
    }

    fn should_reshuffle(&self, round: u32, _score: i32) -> bool {
        match round {
            r if r < 10 => r % 8 == 0,
            r if r < 20 => r % 4 == 0,
            r => r % 2 == 0,
        }
    }

    fn tap_time_limit_ms(&self, round: u32) -> Option<u32> {
        Some(decayed_limit_ms(
            round,
            START_TAP_MS,
            DECAY_EVERY,
            DECAY_MS,
            MIN_TAP_MS,
        ))
    }

    fn reset(&mut self) {
        self.last_target = None;
    }
}
