//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the game.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (rule strategies, the round engine, the async runtime).
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `ROUND_TICK_MS` | 100 | Tap countdown cadence (~10 Hz) |
//! | `GAME_TICK_MS` | 500 | Total game countdown cadence (~2 Hz) |
//! | `ROUND_TRANSITION_MS` | 250 | Feedback pause between rounds |
//!
//! # Modes
//!
//! | Mode | Lives | Tap limit | Game limit | Actions per round |
//! |------|-------|-----------|------------|-------------------|
//! | Classic | 3 | 2500ms, decaying | - | 1 |
//! | Rapid | - | 120000ms | 30000ms | 1 |
//! | Chaos | 5 | 4500ms, decaying | - | 2 |
//!
//! # Examples
//!
//! ```
//! use color_attack_types::{GameMode, PlayerAction, ShapeToken, DEFAULT_COLOR_POOL};
//!
//! // Parse a mode (case-insensitive)
//! let mode = GameMode::from_str("chaos").unwrap();
//! assert_eq!(mode.config().cards_per_grid, 6);
//!
//! // Shapes are a closed set
//! assert_eq!(ShapeToken::from_str("STAR"), Some(ShapeToken::Star));
//!
//! // Actions carry the tapped token
//! let red = DEFAULT_COLOR_POOL[0];
//! assert_eq!(PlayerAction::ColorTap(red), PlayerAction::ColorTap(red));
//! ```

use std::fmt;

/// Tap countdown tick cadence (100ms ≈ 10 Hz)
pub const ROUND_TICK_MS: u32 = 100;

/// Total game countdown tick cadence (500ms ≈ 2 Hz)
pub const GAME_TICK_MS: u32 = 500;

/// Pause between a finalized round and the next one (250ms)
pub const ROUND_TRANSITION_MS: u32 = 250;

/// Largest grid any mode builds (Classic late game)
pub const MAX_GRID_CARDS: usize = 9;

/// Number of shape tokens
pub const SHAPE_COUNT: usize = 6;

/// Prompt text shown when no target could be chosen
pub const PLACEHOLDER_PROMPT: &str = "?";


/// Opaque display colour of a token (sRGB, 8 bits per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A selectable colour card
///
/// Immutable once constructed. Tokens are compared by `id`, `name` and `visual`
/// together; a pool never contains two tokens with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorToken {
    pub id: u8,
    pub name: &'static str,
    pub visual: Rgb,
}

impl ColorToken {
    pub const fn new(id: u8, name: &'static str, visual: Rgb) -> Self {
        Self { id, name, visual }
    }

    /// Upper-case name as it appears in prompt text
    pub fn upper_name(&self) -> String {
        self.name.to_uppercase()
    }

    /// Case-insensitive name match
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Saturated colours that stay distinct on a dark background
pub const DEFAULT_COLOR_POOL: [ColorToken; 9] = [
    ColorToken::new(0, "Red", Rgb::new(230, 64, 64)),
    ColorToken::new(1, "Blue", Rgb::new(64, 128, 242)),
    ColorToken::new(2, "Yellow", Rgb::new(204, 173, 0)),
    ColorToken::new(3, "Green", Rgb::new(77, 191, 102)),
    ColorToken::new(4, "Orange", Rgb::new(242, 140, 51)),
    ColorToken::new(5, "Purple", Rgb::new(166, 102, 217)),
    ColorToken::new(6, "Brown", Rgb::new(153, 102, 64)),
    ColorToken::new(7, "Black", Rgb::new(38, 38, 46)),
    ColorToken::new(8, "Pink", Rgb::new(242, 115, 153)),
];

/// The six shape cards used by Chaos mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeToken {
    Circle,
    Square,
    Triangle,
    Star,
    Heart,
    Bolt,
}

impl ShapeToken {
    /// Every shape in canonical layout order
    pub const ALL: [ShapeToken; SHAPE_COUNT] = [
        ShapeToken::Circle,
        ShapeToken::Square,
        ShapeToken::Triangle,
        ShapeToken::Star,
        ShapeToken::Heart,
        ShapeToken::Bolt,
    ];

    /// Parse shape from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use color_attack_types::ShapeToken;
    ///
    /// assert_eq!(ShapeToken::from_str("circle"), Some(ShapeToken::Circle));
    /// assert_eq!(ShapeToken::from_str("Heart"), Some(ShapeToken::Heart));
    /// assert_eq!(ShapeToken::from_str("hexagon"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "circle" => Some(ShapeToken::Circle),
            "square" => Some(ShapeToken::Square),
            "triangle" => Some(ShapeToken::Triangle),
            "star" => Some(ShapeToken::Star),
            "heart" => Some(ShapeToken::Heart),
            "bolt" => Some(ShapeToken::Bolt),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeToken::Circle => "circle",
            ShapeToken::Square => "square",
            ShapeToken::Triangle => "triangle",
            ShapeToken::Star => "star",
            ShapeToken::Heart => "heart",
            ShapeToken::Bolt => "bolt",
        }
    }

    /// Display symbol name
    pub fn symbol(&self) -> &'static str {
        match self {
            ShapeToken::Circle => "circle.fill",
            ShapeToken::Square => "square.fill",
            ShapeToken::Triangle => "triangle.fill",
            ShapeToken::Star => "star.fill",
            ShapeToken::Heart => "heart.fill",
            ShapeToken::Bolt => "bolt.fill",
        }
    }

    pub fn upper_name(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for ShapeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three ways a round can be resolved by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    NoTap,
    ColorTap(ColorToken),
    ShapeTap(ShapeToken),
}

impl PlayerAction {
    /// Parse a typed command against a colour pool.
    ///
    /// `pass`/`none`/`notap` map to [`PlayerAction::NoTap`]; otherwise shape names
    /// win over colour names (the sets are disjoint in the default pool).
    pub fn parse(s: &str, pool: &[ColorToken]) -> Option<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "pass" | "none" | "notap" | "-" => return Some(PlayerAction::NoTap),
            _ => {}
        }
        if let Some(shape) = ShapeToken::from_str(s) {
            return Some(PlayerAction::ShapeTap(shape));
        }
        pool.iter()
            .find(|c| c.is_named(s))
            .map(|c| PlayerAction::ColorTap(*c))
    }
}

/// Whether a prompt line asks for the target or forbids it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Tap,
    DontTap,
}

impl Instruction {
    pub fn verb(&self) -> &'static str {
        match self {
            Instruction::Tap => "TAP",
            Instruction::DontTap => "DON'T TAP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorLine {
    pub instruction: Instruction,
    pub target: ColorToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeLine {
    pub instruction: Instruction,
    pub target: ShapeToken,
}

/// Typed form of what the prompt text says
///
/// Correctness is decided from this, never by re-reading `Prompt::text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptRule {
    /// One colour instruction (Classic, Rapid)
    Single(ColorLine),
    /// A colour line and a shape line (Chaos)
    Dual { color: ColorLine, shape: ShapeLine },
    /// No target could be chosen; the `?` placeholder
    Unresolved,
}

impl PromptRule {
    /// True when every line of the prompt is a "DON'T TAP"
    pub fn is_negated(&self) -> bool {
        match self {
            PromptRule::Single(line) => line.instruction == Instruction::DontTap,
            PromptRule::Dual { color, shape } => {
                color.instruction == Instruction::DontTap
                    && shape.instruction == Instruction::DontTap
            }
            PromptRule::Unresolved => false,
        }
    }
}

/// Instruction shown to the player for one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    /// Stroop render hint: draw the text in this colour. Never affects correctness.
    pub display_color: Option<ColorToken>,
    pub rule: PromptRule,
}

impl Prompt {
    pub fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER_PROMPT.to_string(),
            display_color: None,
            rule: PromptRule::Unresolved,
        }
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Fixed per-mode settings, immutable for the life of an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeConfig {
    pub cards_per_grid: usize,
    pub tap_time_limit_ms: u32,
    pub uses_lives: bool,
    pub total_game_time_limit_ms: Option<u32>,
    pub leaderboard_id: String,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            cards_per_grid: 6,
            tap_time_limit_ms: 1000,
            uses_lives: true,
            total_game_time_limit_ms: None,
            leaderboard_id: String::new(),
        }
    }
}

/// Game mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    Classic,
    Rapid,
    Chaos,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Classic, GameMode::Rapid, GameMode::Chaos];

    /// Parse mode from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "rapid" => Some(GameMode::Rapid),
            "chaos" => Some(GameMode::Chaos),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Rapid => "rapid",
            GameMode::Chaos => "chaos",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameMode::Classic => "CLASSIC",
            GameMode::Rapid => "RAPID",
            GameMode::Chaos => "CHAOS",
        }
    }

    /// Lives pool size (Rapid carries one, unused)
    pub fn max_lives(&self) -> u32 {
        match self {
            GameMode::Classic => 3,
            GameMode::Rapid => 1,
            GameMode::Chaos => 5,
        }
    }

    /// Background music track played on mode entry
    pub fn music_track(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic Theme",
            GameMode::Rapid => "Rapid Theme",
            GameMode::Chaos => "Chaos Theme",
        }
    }

    pub fn config(&self) -> ModeConfig {
        match self {
            GameMode::Classic => ModeConfig {
                cards_per_grid: 6,
                tap_time_limit_ms: 2500,
                uses_lives: true,
                total_game_time_limit_ms: None,
                leaderboard_id: "com.example.ColorAttack.Classic".to_string(),
            },
            GameMode::Rapid => ModeConfig {
                cards_per_grid: 6,
                tap_time_limit_ms: 120_000,
                uses_lives: false,
                total_game_time_limit_ms: Some(30_000),
                leaderboard_id: "com.example.ColorAttack.Rapid".to_string(),
            },
            GameMode::Chaos => ModeConfig {
                cards_per_grid: 6,
                tap_time_limit_ms: 2500,
                uses_lives: true,
                total_game_time_limit_ms: None,
                leaderboard_id: "com.example.ColorAttack.Chaos".to_string(),
            },
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
