//! Copy-out view of the engine for presentation layers

use color_attack_core::types::{GameMode, Prompt};
use color_attack_core::{Grid, ShapeLayout};

use crate::engine::Phase;

/// Everything a presentation layer may observe, copied out after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub mode: GameMode,
    pub phase: Phase,
    pub session: u32,
    pub grid_colors: Grid,
    pub grid_shapes: ShapeLayout,
    pub prompt: Prompt,
    pub switch_on: bool,
    pub score: i32,
    pub round: u32,
    pub is_game_over: bool,
    pub remaining_tap_ms: u32,
    pub remaining_game_ms: Option<u32>,
    pub lives_current: u32,
    pub lives_max: u32,
    pub uses_lives: bool,
    pub actions_taken: u8,
    pub required_actions: u8,
}

impl EngineSnapshot {
    pub fn prompt_text(&self) -> &str {
        &self.prompt.text
    }

    /// Accepting taps right now
    pub fn playable(&self) -> bool {
        !self.is_game_over && self.phase == Phase::RoundActive
    }

    pub fn clear(&mut self) {
        self.mode = GameMode::Classic;
        self.phase = Phase::Idle;
        self.session = 0;
        self.grid_colors.clear();
        self.grid_shapes.clear();
        self.prompt = Prompt::placeholder();
        self.switch_on = false;
        self.score = 0;
        self.round = 0;
        self.is_game_over = false;
        self.remaining_tap_ms = 0;
        self.remaining_game_ms = None;
        self.lives_current = 0;
        self.lives_max = 0;
        self.uses_lives = false;
        self.actions_taken = 0;
        self.required_actions = 0;
    }
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            phase: Phase::Idle,
            session: 0,
            grid_colors: Grid::new(),
            grid_shapes: ShapeLayout::new(),
            prompt: Prompt::placeholder(),
            switch_on: false,
            score: 0,
            round: 0,
            is_game_over: false,
            remaining_tap_ms: 0,
            remaining_game_ms: None,
            lives_current: 0,
            lives_max: 0,
            uses_lives: false,
            actions_taken: 0,
            required_actions: 0,
        }
    }
}
