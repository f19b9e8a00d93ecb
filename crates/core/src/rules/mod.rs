//! Mode rule strategies
//!
//! Each mode decides five things for the round engine: how the grid is built,
//! what the prompt says, whether an action is correct, how much a round is
//! worth, and when the grid is reshuffled. Classic and Chaos also override the
//! tap time limit per round.
//!
//! The strategies implement [`ModeRules`]. The engine holds them through the
//! [`Rules`] tag enum so dispatch is an exhaustive `match` on the mode rather
//! than a runtime type check.

mod chaos;
mod classic;
mod rapid;

pub use chaos::ChaosRules;
pub use classic::ClassicRules;
pub use rapid::RapidRules;

use arrayvec::ArrayVec;

use crate::rng::GameRng;
use crate::types::{
    ColorToken, GameMode, PlayerAction, Prompt, ShapeToken, MAX_GRID_CARDS, SHAPE_COUNT,
};

/// Colour cards currently on screen
pub type Grid = ArrayVec<ColorToken, MAX_GRID_CARDS>;

/// Shape card layout (Chaos)
pub type ShapeLayout = ArrayVec<ShapeToken, SHAPE_COUNT>;

/// Round the Classic off-grid prompt unlocks at by default (effectively never)
pub const DEFAULT_OFF_GRID_START_ROUND: u32 = 1_000_000_000;

/// Default Chaos tap time floor. An alternate revision used 1800ms.
pub const DEFAULT_CHAOS_MIN_TAP_MS: u32 = 2000;

/// Tunable knobs that differ between revisions of the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulesTuning {
    pub classic_off_grid_start_round: u32,
    pub chaos_min_tap_ms: u32,
}

impl Default for RulesTuning {
    fn default() -> Self {
        Self {
            classic_off_grid_start_round: DEFAULT_OFF_GRID_START_ROUND,
            chaos_min_tap_ms: DEFAULT_CHAOS_MIN_TAP_MS,
        }
    }
}

/// Read-only view of the round a rule is asked about
#[derive(Debug, Clone, Copy)]
pub struct RoundContext<'a> {
    pub round: u32,
    pub score: i32,
    pub grid: &'a [ColorToken],
    pub pool: &'a [ColorToken],
}

/// A freshly generated prompt plus its negation flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPrompt {
    pub prompt: Prompt,
    pub switch_on: bool,
}

impl RoundPrompt {
    pub fn placeholder() -> Self {
        Self {
            prompt: Prompt::placeholder(),
            switch_on: false,
        }
    }
}

/// Capability set every mode provides
pub trait ModeRules {
    fn make_grid(
        &self,
        pool: &[ColorToken],
        cards_per_grid: usize,
        round: u32,
        score: i32,
        rng: &mut GameRng,
    ) -> Grid;

    fn make_prompt(&mut self, ctx: &RoundContext<'_>, rng: &mut GameRng) -> RoundPrompt;

    fn is_correct(
        &self,
        action: &PlayerAction,
        prompt: &Prompt,
        switch_on: bool,
        ctx: &RoundContext<'_>,
    ) -> bool;

    fn score_delta(&self, correct: bool) -> i32;

    fn should_reshuffle(&self, round: u32, score: i32) -> bool;

    /// Per-round tap limit. None means "use the mode config".
    fn tap_time_limit_ms(&self, _round: u32) -> Option<u32> {
        None
    }

    /// Actions needed to complete a round
    fn required_actions(&self) -> u8 {
        1
    }

    /// New shape layout for this round, None to keep the current one
    fn shape_layout(
        &self,
        _round: u32,
        _current: &ShapeLayout,
        _rng: &mut GameRng,
    ) -> Option<ShapeLayout> {
        None
    }

    /// Forget per-session memory (previous targets)
    fn reset(&mut self) {}
}

/// The active mode's strategy, selected once per engine
#[derive(Debug, Clone)]
pub enum Rules {
    Classic(ClassicRules),
    Rapid(RapidRules),
    Chaos(ChaosRules),
}

impl Rules {
    pub fn for_mode(mode: GameMode, tuning: &RulesTuning) -> Self {
        match mode {
            GameMode::Classic => {
                Rules::Classic(ClassicRules::new(tuning.classic_off_grid_start_round))
            }
            GameMode::Rapid => Rules::Rapid(RapidRules::new()),
            GameMode::Chaos => Rules::Chaos(ChaosRules::new(tuning.chaos_min_tap_ms)),
        }
    }

    pub fn mode(&self) -> GameMode {
        match self {
            Rules::Classic(_) => GameMode::Classic,
            Rules::Rapid(_) => GameMode::Rapid,
            Rules::Chaos(_) => GameMode::Chaos,
        }
    }

    fn inner(&self) -> &dyn ModeRules {
        match self {
            Rules::Classic(r) => r,
            Rules::Rapid(r) => r,
            Rules::Chaos(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ModeRules {
        match self {
            Rules::Classic(r) => r,
            Rules::Rapid(r) => r,
            Rules::Chaos(r) => r,
        }
    }
}

impl ModeRules for Rules {
    fn make_grid(
        &self,
        pool: &[ColorToken],
        cards_per_grid: usize,
        round: u32,
        score: i32,
        rng: &mut GameRng,
    ) -> Grid {
        self.inner()
            .make_grid(pool, cards_per_grid, round, score, rng)
    }

    fn make_prompt(&mut self, ctx: &RoundContext<'_>, rng: &mut GameRng) -> RoundPrompt {
        self.inner_mut().make_prompt(ctx, rng)
    }

    fn is_correct(
        &self,
        action: &PlayerAction,
        prompt: &Prompt,
        switch_on: bool,
        ctx: &RoundContext<'_>,
    ) -> bool {
        self.inner().is_correct(action, prompt, switch_on, ctx)
    }

    fn score_delta(&self, correct: bool) -> i32 {
        self.inner().score_delta(correct)
    }

    fn should_reshuffle(&self, round: u32, score: i32) -> bool {
        self.inner().should_reshuffle(round, score)
    }

    fn tap_time_limit_ms(&self, round: u32) -> Option<u32> {
        self.inner().tap_time_limit_ms(round)
    }

    fn required_actions(&self) -> u8 {
        self.inner().required_actions()
    }

    fn shape_layout(
        &self,
        round: u32,
        current: &ShapeLayout,
        rng: &mut GameRng,
    ) -> Option<ShapeLayout> {
        self.inner().shape_layout(round, current, rng)
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }
}

/// Random grid of `size` distinct pool colours, capped at [`MAX_GRID_CARDS`]
pub(crate) fn sample_grid(pool: &[ColorToken], size: usize, rng: &mut GameRng) -> Grid {
    rng.sample(pool, size.min(MAX_GRID_CARDS))
        .into_iter()
        .collect()
}

/// Pick a candidate other than `last` when more than one candidate exists.
///
/// Starvation (every candidate excluded) falls back to an unfiltered pick.
pub(crate) fn pick_excluding<T, F>(
    candidates: &[T],
    last: Option<T>,
    same: F,
    rng: &mut GameRng,
) -> Option<T>
where
    T: Copy,
    F: Fn(&T, &T) -> bool,
{
    if let Some(last) = last {
        if candidates.len() > 1 {
            let filtered: Vec<T> = candidates
                .iter()
                .copied()
                .filter(|c| !same(c, &last))
                .collect();
            if let Some(choice) = rng.pick(&filtered) {
                return Some(choice);
            }
        }
    }
    rng.pick(candidates)
}

/// Name-based token identity, the way prompts refer to colours
pub(crate) fn same_color(a: &ColorToken, b: &ColorToken) -> bool {
    a.is_named(b.name)
}

/// `start - step * (round / every)`, never below `floor`
pub(crate) fn decayed_limit_ms(round: u32, start: u32, every: u32, step: u32, floor: u32) -> u32 {
    let steps = round / every.max(1);
    start.saturating_sub(steps.saturating_mul(step)).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_COLOR_POOL;

    #[test]
    fn test_pick_excluding_avoids_last() {
        let mut rng = GameRng::new(7);
        let grid = &DEFAULT_COLOR_POOL[..3];
        let last = grid[1];
        for _ in 0..100 {
            let pick = pick_excluding(grid, Some(last), same_color, &mut rng).unwrap();
            assert_ne!(pick.name, last.name);
        }
    }

    #[test]
    fn test_pick_excluding_single_candidate_repeats() {
        let mut rng = GameRng::new(7);
        let grid = &DEFAULT_COLOR_POOL[..1];
        let pick = pick_excluding(grid, Some(grid[0]), same_color, &mut rng);
        assert_eq!(pick, Some(grid[0]));
    }

    #[test]
    fn test_pick_excluding_starvation_falls_back() {
        let mut rng = GameRng::new(7);
        // Two candidates with the same name: the filter removes both
        let red = DEFAULT_COLOR_POOL[0];
        let twin = ColorToken::new(42, "Red", red.visual);
        let pick = pick_excluding(&[red, twin], Some(red), same_color, &mut rng);
        assert!(pick.is_some());
    }

    #[test]
    fn test_pick_excluding_empty() {
        let mut rng = GameRng::new(7);
        let empty: [ColorToken; 0] = [];
        assert_eq!(pick_excluding(&empty, None, same_color, &mut rng), None);
    }

    #[test]
    fn test_decayed_limit() {
        assert_eq!(decayed_limit_ms(0, 2500, 8, 100, 800), 2500);
        assert_eq!(decayed_limit_ms(7, 2500, 8, 100, 800), 2500);
        assert_eq!(decayed_limit_ms(8, 2500, 8, 100, 800), 2400);
        assert_eq!(decayed_limit_ms(10_000, 2500, 8, 100, 800), 800);
    }

    #[test]
    fn test_rules_for_mode() {
        let tuning = RulesTuning::default();
        for mode in GameMode::ALL {
            assert_eq!(Rules::for_mode(mode, &tuning).mode(), mode);
        }
        assert_eq!(Rules::for_mode(GameMode::Chaos, &tuning).required_actions(), 2);
        assert_eq!(Rules::for_mode(GameMode::Rapid, &tuning).required_actions(), 1);
        assert_eq!(Rules::for_mode(GameMode::Rapid, &tuning).tap_time_limit_ms(3), None);
    }

    #[test]
    fn test_sample_grid_caps_at_max() {
        let mut rng = GameRng::new(1);
        let grid = sample_grid(&DEFAULT_COLOR_POOL, 50, &mut rng);
        assert_eq!(grid.len(), MAX_GRID_CARDS);
    }
}
