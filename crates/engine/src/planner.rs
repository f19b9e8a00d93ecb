//! Answer planner
//!
//! Turns a typed prompt rule into the concrete taps that answer it, either
//! correctly or deliberately wrong. Used by bots, the simulator and tests.

use arrayvec::ArrayVec;
use color_attack_core::types::{
    ColorLine, ColorToken, Instruction, PlayerAction, PromptRule, ShapeLine, ShapeToken,
};

use crate::engine::GameEngine;

/// Most actions any round needs
pub const MAX_PLANNED_ACTIONS: usize = 2;

pub type Plan = ArrayVec<PlayerAction, MAX_PLANNED_ACTIONS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    NotPlayable,
    NoPrompt,
}

impl PlanError {
    pub fn code(self) -> &'static str {
        match self {
            PlanError::NotPlayable => "not_playable",
            PlanError::NoPrompt => "no_prompt",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlanError::NotPlayable => "no round is accepting taps",
            PlanError::NoPrompt => "round has no resolvable prompt",
        }
    }
}

/// Colour action answering one colour line
pub fn color_line_action(line: &ColorLine, grid: &[ColorToken], correct: bool) -> PlayerAction {
    let other = grid.iter().copied().find(|c| !c.is_named(line.target.name));
    let wants_target = matches!(
        (line.instruction, correct),
        (Instruction::Tap, true) | (Instruction::DontTap, false)
    );

    if wants_target {
        PlayerAction::ColorTap(line.target)
    } else {
        // Nothing else on the grid: a no-tap is the only way to avoid the target
        other.map_or(PlayerAction::NoTap, PlayerAction::ColorTap)
    }
}

/// Shape action answering one shape line
pub fn shape_line_action(line: &ShapeLine, shapes: &[ShapeToken], correct: bool) -> PlayerAction {
    let shapes = if shapes.is_empty() {
        &ShapeToken::ALL[..]
    } else {
        shapes
    };
    let wants_target = matches!(
        (line.instruction, correct),
        (Instruction::Tap, true) | (Instruction::DontTap, false)
    );

    if wants_target {
        PlayerAction::ShapeTap(line.target)
    } else {
        shapes
            .iter()
            .copied()
            .find(|s| *s != line.target)
            .map_or(PlayerAction::NoTap, PlayerAction::ShapeTap)
    }
}

/// Actions answering a whole prompt.
///
/// A wrong dual-line plan gets only the colour line wrong.
pub fn plan(rule: &PromptRule, grid: &[ColorToken], shapes: &[ShapeToken], correct: bool) -> Plan {
    let mut out = Plan::new();
    match rule {
        PromptRule::Single(line) => out.push(color_line_action(line, grid, correct)),
        PromptRule::Dual { color, shape } => {
            out.push(color_line_action(color, grid, correct));
            out.push(shape_line_action(shape, shapes, true));
        }
        PromptRule::Unresolved => out.push(PlayerAction::NoTap),
    }
    out
}

/// Plan against the engine's current round and apply every action.
///
/// Returns how many taps the engine accepted.
pub fn apply_plan(engine: &mut GameEngine, correct: bool) -> Result<usize, PlanError> {
    if engine.is_game_over() || !engine.phase().is_running() {
        return Err(PlanError::NotPlayable);
    }
    if engine.prompt().rule == PromptRule::Unresolved {
        return Err(PlanError::NoPrompt);
    }

    let actions = plan(
        &engine.prompt().rule,
        engine.grid_colors(),
        engine.grid_shapes(),
        correct,
    );
    Ok(actions
        .into_iter()
        .filter(|action| engine.handle_tap(*action))
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Phase;
    use color_attack_core::types::{GameMode, DEFAULT_COLOR_POOL};
    use color_attack_core::{ModeRules, RoundContext, Rules, RulesTuning};

    #[test]
    fn test_color_line_actions() {
        let grid = &DEFAULT_COLOR_POOL[..3];
        let red = grid[0];
        let tap = ColorLine {
            instruction: Instruction::Tap,
            target: red,
        };
        let dont = ColorLine {
            instruction: Instruction::DontTap,
            target: red,
        };

        assert_eq!(color_line_action(&tap, grid, true), PlayerAction::ColorTap(red));
        assert_eq!(
            color_line_action(&tap, grid, false),
            PlayerAction::ColorTap(grid[1])
        );
        assert_eq!(
            color_line_action(&dont, grid, true),
            PlayerAction::ColorTap(grid[1])
        );
        assert_eq!(color_line_action(&dont, grid, false), PlayerAction::ColorTap(red));

        // Single-card grid
        assert_eq!(color_line_action(&dont, &grid[..1], true), PlayerAction::NoTap);
    }

    #[test]
    fn test_plans_agree_with_rules() {
        let tuning = RulesTuning::default();
        for mode in GameMode::ALL {
            let mut rules = Rules::for_mode(mode, &tuning);
            let mut rng = color_attack_core::GameRng::new(99);
            let grid = rules.make_grid(&DEFAULT_COLOR_POOL, 6, 12, 0, &mut rng);
            for round in 1..200 {
                let ctx = RoundContext {
                    round,
                    score: 0,
                    grid: &grid,
                    pool: &DEFAULT_COLOR_POOL,
                };
                let rp = rules.make_prompt(&ctx, &mut rng);
                for correct in [true, false] {
                    let actions = plan(&rp.prompt.rule, &grid, &ShapeToken::ALL, correct);
                    assert_eq!(actions.len(), usize::from(rules.required_actions()));
                    let all = actions
                        .iter()
                        .all(|a| rules.is_correct(a, &rp.prompt, rp.switch_on, &ctx));
                    assert_eq!(all, correct, "{:?} round {} {:?}", mode, round, rp.prompt);
                }
            }
        }
    }

    #[test]
    fn test_apply_plan_requires_running_round() {
        let mut engine = GameEngine::for_mode(GameMode::Classic, &RulesTuning::default(), 4);
        assert_eq!(apply_plan(&mut engine, true), Err(PlanError::NotPlayable));

        engine.start();
        assert_eq!(apply_plan(&mut engine, true), Ok(1));
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.phase(), Phase::RoundTransition);
        // Transition taps are dropped by the engine
        assert_eq!(apply_plan(&mut engine, true), Ok(0));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(PlanError::NotPlayable.code(), "not_playable");
        assert_eq!(PlanError::NoPrompt.code(), "no_prompt");
        assert!(!PlanError::NoPrompt.message().is_empty());
    }
}
