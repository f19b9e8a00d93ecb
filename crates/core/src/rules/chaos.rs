//! Chaos mode rulebook
//!
//! Every round carries two instructions, one for colours and one for shapes,
//! and needs two actions. Either line may flip to "DON'T TAP" from round 5.
//! A round is worth 20 only when both actions were right.

use super::{
    decayed_limit_ms, pick_excluding, same_color, sample_grid, Grid, ModeRules, RoundContext,
    RoundPrompt, ShapeLayout,
};
use crate::rng::GameRng;
use crate::types::{
    ColorLine, ColorToken, Instruction, PlayerAction, Prompt, PromptRule, ShapeLine, ShapeToken,
};

const GRID_CARDS: usize = 6;

const DONT_TAP_START_ROUND: u32 = 5;
const DONT_TAP_CHANCE: f64 = 0.5;

const START_TAP_MS: u32 = 4500;
const DECAY_EVERY: u32 = 6;
const DECAY_MS: u32 = 200;

/// Shape layout stays put before this round
const SHAPE_SHUFFLE_START: u32 = 10;
/// Shape layout shuffles every round from this round on
const SHAPE_SHUFFLE_ALWAYS: u32 = 20;

const CORRECT_POINTS: i32 = 20;

#[derive(Debug, Clone)]
pub struct ChaosRules {
    min_tap_ms: u32,
    last_color: Option<ColorToken>,
    last_shape: Option<ShapeToken>,
}

impl ChaosRules {
    pub fn new(min_tap_ms: u32) -> Self {
        Self {
            min_tap_ms,
            last_color: None,
            last_shape: None,
        }
    }

    pub fn last_targets(&self) -> (Option<ColorToken>, Option<ShapeToken>) {
        (self.last_color, self.last_shape)
    }

    fn roll(round: u32, rng: &mut GameRng) -> Instruction {
        if round >= DONT_TAP_START_ROUND && rng.chance(DONT_TAP_CHANCE) {
            Instruction::DontTap
        } else {
            Instruction::Tap
        }
    }
}

fn line_allows(instruction: Instruction, is_target: bool) -> bool {
    match instruction {
        Instruction::Tap => is_target,
        Instruction::DontTap => !is_target,
    }
}

impl ModeRules for ChaosRules {
    fn make_grid(
        &self,
        pool: &[ColorToken],
        _cards_per_grid: usize,
        _round: u32,
        _score: i32,
        rng: &mut GameRng,
    ) -> Grid {
        sample_grid(pool, GRID_CARDS, rng)
    }

    fn make_prompt(&mut self, ctx: &RoundContext<'_>, rng: &mut GameRng) -> RoundPrompt {
        let Some(color) = pick_excluding(ctx.grid, self.last_color, same_color, rng) else {
            return RoundPrompt::placeholder();
        };
        self.last_color = Some(color);

        let Some(shape) = pick_excluding(&ShapeToken::ALL, self.last_shape, |a, b| a == b, rng)
        else {
            return RoundPrompt::placeholder();
        };
        self.last_shape = Some(shape);

        let color_line = ColorLine {
            instruction: Self::roll(ctx.round, rng),
            target: color,
        };
        let shape_line = ShapeLine {
            instruction: Self::roll(ctx.round, rng),
            target: shape,
        };

        let text = format!(
            "COLOR: {} {}\nSHAPE: {} {}",
            color_line.instruction.verb(),
            color.upper_name(),
            shape_line.instruction.verb(),
            shape.upper_name()
        );
        let rule = PromptRule::Dual {
            color: color_line,
            shape: shape_line,
        };

        RoundPrompt {
            switch_on: rule.is_negated(),
            prompt: Prompt {
                text,
                display_color: None,
                rule,
            },
        }
    }

    fn is_correct(
        &self,
        action: &PlayerAction,
        prompt: &Prompt,
        _switch_on: bool,
        _ctx: &RoundContext<'_>,
    ) -> bool {
        let PromptRule::Dual { color, shape } = prompt.rule else {
            return false;
        };
        match action {
            PlayerAction::ColorTap(tapped) => {
                line_allows(color.instruction, same_color(tapped, &color.target))
            }
            PlayerAction::ShapeTap(tapped) => line_allows(shape.instruction, *tapped == shape.target),
            PlayerAction::NoTap => prompt.rule.is_negated(),
        }
    }

    fn score_delta(&self, correct: bool) -> i32 {
        if correct {
            CORRECT_POINTS
        } else {
            0
        }
    }

    fn should_reshuffle(&self, _round: u32, _score: i32) -> bool {
        true
    }

    fn tap_time_limit_ms(&self, round: u32) -> Option<u32> {
        Some(decayed_limit_ms(
            round,
            START_TAP_MS,
            DECAY_EVERY,
            DECAY_MS,
            self.min_tap_ms,
        ))
    }

    fn required_actions(&self) -> u8 {
        2
    }

    fn shape_layout(
        &self,
        round: u32,
        current: &ShapeLayout,
        rng: &mut GameRng,
    ) -> Option<ShapeLayout> {
        let shuffle = match round {
            r if r < SHAPE_SHUFFLE_START => false,
            r if r < SHAPE_SHUFFLE_ALWAYS => r % 3 == 0,
            _ => true,
        };

        if shuffle {
            let mut layout: ShapeLayout = ShapeToken::ALL.into_iter().collect();
            rng.shuffle(&mut layout);
            Some(layout)
        } else if current.is_empty() {
            Some(ShapeToken::ALL.into_iter().collect())
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.last_color = None;
        self.last_shape = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DEFAULT_CHAOS_MIN_TAP_MS;
    use crate::types::DEFAULT_COLOR_POOL;

    fn rules() -> ChaosRules {
        ChaosRules::new(DEFAULT_CHAOS_MIN_TAP_MS)
    }

    fn ctx(round: u32, grid: &[ColorToken]) -> RoundContext<'_> {
        RoundContext {
            round,
            score: 0,
            grid,
            pool: &DEFAULT_COLOR_POOL,
        }
    }

    fn dual(color: ColorLine, shape: ShapeLine) -> Prompt {
        Prompt {
            text: String::new(),
            display_color: None,
            rule: PromptRule::Dual { color, shape },
        }
    }

    #[test]
    fn test_grid_is_always_six() {
        let rules = rules();
        let mut rng = GameRng::new(1);
        for round in [0, 1, 30] {
            assert_eq!(
                rules.make_grid(&DEFAULT_COLOR_POOL, 3, round, 0, &mut rng).len(),
                6
            );
        }
    }

    #[test]
    fn test_prompt_lines_before_round_five_are_tap() {
        let mut rules = rules();
        let mut rng = GameRng::new(2);
        let grid = &DEFAULT_COLOR_POOL[..6];
        for round in 0..5 {
            let rp = rules.make_prompt(&ctx(round, grid), &mut rng);
            let PromptRule::Dual { color, shape } = rp.prompt.rule else {
                panic!("chaos prompts are dual");
            };
            assert_eq!(color.instruction, Instruction::Tap);
            assert_eq!(shape.instruction, Instruction::Tap);
            assert_eq!(
                rp.prompt.text,
                format!(
                    "COLOR: TAP {}\nSHAPE: TAP {}",
                    color.target.upper_name(),
                    shape.target.upper_name()
                )
            );
            assert!(!rp.switch_on);
        }
    }

    #[test]
    fn test_targets_never_repeat_back_to_back() {
        let mut rules = rules();
        let mut rng = GameRng::new(3);
        let grid = &DEFAULT_COLOR_POOL[..6];
        let mut last = (None, None);
        for round in 0..200 {
            rules.make_prompt(&ctx(round, grid), &mut rng);
            let now = rules.last_targets();
            if let (Some(prev), Some(cur)) = (last.0, now.0) {
                assert_ne!(prev, cur);
            }
            if let (Some(prev), Some(cur)) = (last.1, now.1) {
                assert_ne!(prev, cur);
            }
            assert!(grid.contains(&now.0.unwrap()));
            last = now;
        }
    }

    #[test]
    fn test_dont_tap_lines_roll_independently() {
        let mut rules = rules();
        let mut rng = GameRng::new(4);
        let grid = &DEFAULT_COLOR_POOL[..6];
        let mut mixed = 0;
        let mut both = 0;
        for _ in 0..200 {
            let rp = rules.make_prompt(&ctx(12, grid), &mut rng);
            let PromptRule::Dual { color, shape } = rp.prompt.rule else {
                unreachable!()
            };
            if color.instruction != shape.instruction {
                mixed += 1;
            }
            if rp.switch_on {
                both += 1;
                assert!(rp.prompt.text.contains("COLOR: DON'T TAP"));
                assert!(rp.prompt.text.contains("SHAPE: DON'T TAP"));
            }
        }
        assert!(mixed > 0);
        assert!(both > 0);
    }

    #[test]
    fn test_correctness_per_line() {
        let rules = rules();
        let grid = &DEFAULT_COLOR_POOL[..6];
        let c = ctx(6, grid);
        let red = DEFAULT_COLOR_POOL[0];
        let blue = DEFAULT_COLOR_POOL[1];

        let prompt = dual(
            ColorLine {
                instruction: Instruction::Tap,
                target: red,
            },
            ShapeLine {
                instruction: Instruction::DontTap,
                target: ShapeToken::Star,
            },
        );

        assert!(rules.is_correct(&PlayerAction::ColorTap(red), &prompt, false, &c));
        assert!(!rules.is_correct(&PlayerAction::ColorTap(blue), &prompt, false, &c));
        assert!(!rules.is_correct(&PlayerAction::ShapeTap(ShapeToken::Star), &prompt, false, &c));
        assert!(rules.is_correct(&PlayerAction::ShapeTap(ShapeToken::Heart), &prompt, false, &c));
        // Only one line is negated
        assert!(!rules.is_correct(&PlayerAction::NoTap, &prompt, false, &c));
    }

    #[test]
    fn test_no_tap_needs_both_lines_negated() {
        let rules = rules();
        let grid = &DEFAULT_COLOR_POOL[..6];
        let c = ctx(6, grid);
        let prompt = dual(
            ColorLine {
                instruction: Instruction::DontTap,
                target: DEFAULT_COLOR_POOL[0],
            },
            ShapeLine {
                instruction: Instruction::DontTap,
                target: ShapeToken::Bolt,
            },
        );
        assert!(rules.is_correct(&PlayerAction::NoTap, &prompt, true, &c));
    }

    #[test]
    fn test_placeholder_prompt_is_never_correct() {
        let rules = rules();
        let c = ctx(1, &[]);
        let prompt = Prompt::placeholder();
        assert!(!rules.is_correct(
            &PlayerAction::ColorTap(DEFAULT_COLOR_POOL[0]),
            &prompt,
            false,
            &c
        ));
        assert!(!rules.is_correct(&PlayerAction::NoTap, &prompt, false, &c));
    }

    #[test]
    fn test_scoring_law() {
        let rules = rules();
        assert_eq!(rules.score_delta(true), 20);
        assert_eq!(rules.score_delta(false), 0);
        assert_eq!(rules.required_actions(), 2);
        assert!(rules.should_reshuffle(7, 0));
    }

    #[test]
    fn test_tap_time_decay_and_floor() {
        let rules = rules();
        assert_eq!(rules.tap_time_limit_ms(0), Some(4500));
        assert_eq!(rules.tap_time_limit_ms(5), Some(4500));
        assert_eq!(rules.tap_time_limit_ms(6), Some(4300));
        assert_eq!(rules.tap_time_limit_ms(1000), Some(2000));

        let alternate = ChaosRules::new(1800);
        assert_eq!(alternate.tap_time_limit_ms(1000), Some(1800));
    }

    #[test]
    fn test_shape_layout_schedule() {
        let rules = rules();
        let mut rng = GameRng::new(5);
        let empty = ShapeLayout::new();
        let canonical: ShapeLayout = ShapeToken::ALL.into_iter().collect();

        // Early rounds: canonical layout once, then kept
        assert_eq!(rules.shape_layout(1, &empty, &mut rng), Some(canonical.clone()));
        assert_eq!(rules.shape_layout(9, &canonical, &mut rng), None);

        // [10, 20): every third round
        assert_eq!(rules.shape_layout(10, &canonical, &mut rng), None);
        assert!(rules.shape_layout(12, &canonical, &mut rng).is_some());

        // 20+: always
        for round in 20..30 {
            let layout = rules.shape_layout(round, &canonical, &mut rng).unwrap();
            assert_eq!(layout.len(), 6);
        }
    }
}
