//! Rapid mode rulebook
//!
//! Fixed grid, always "tap the called colour", +10 / -5. Difficulty comes
//! from the total game time budget rather than a shrinking tap window.

use super::{pick_excluding, same_color, sample_grid, Grid, ModeRules, RoundContext, RoundPrompt};
use crate::rng::GameRng;
use crate::types::{ColorLine, ColorToken, Instruction, PlayerAction, Prompt, PromptRule};

const CORRECT_POINTS: i32 = 10;
const WRONG_POINTS: i32 = -5;

#[derive(Debug, Clone, Default)]
pub struct RapidRules {
    last_target: Option<ColorToken>,
}

impl RapidRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_target(&self) -> Option<ColorToken> {
        self.last_target
    }
}

impl ModeRules for RapidRules {
    fn make_grid(
        &self,
        pool: &[ColorToken],
        cards_per_grid: usize,
        _round: u32,
        _score: i32,
        rng: &mut GameRng,
    ) -> Grid {
        sample_grid(pool, cards_per_grid, rng)
    }

    fn make_prompt(&mut self, ctx: &RoundContext<'_>, rng: &mut GameRng) -> RoundPrompt {
        let Some(target) = pick_excluding(ctx.grid, self.last_target, same_color, rng) else {
            return RoundPrompt::placeholder();
        };
        self.last_target = Some(target);

        RoundPrompt {
            prompt: Prompt {
                text: target.name.to_string(),
                display_color: None,
                rule: PromptRule::Single(ColorLine {
                    instruction: Instruction::Tap,
                    target,
                }),
            },
            switch_on: false,
        }
    }

    fn is_correct(
        &self,
        action: &PlayerAction,
        prompt: &Prompt,
        _switch_on: bool,
        _ctx: &RoundContext<'_>,
    ) -> bool {
        match (action, prompt.rule) {
            (PlayerAction::ColorTap(tapped), PromptRule::Single(line)) => {
                same_color(tapped, &line.target)
            }
            // Timeouts and no-taps are misses
            _ => false,
        }
    }

    fn score_delta(&self, correct: bool) -> i32 {
        if correct {
            CORRECT_POINTS
        } else {
            WRONG_POINTS
        }
    }

    fn should_reshuffle(&self, _round: u32, _score: i32) -> bool {
        false
    }

    fn reset(&mut self) {
        self.last_target = None;
    }
}
