//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the pieces the round engine is assembled from: the lives
//! counter, the seeded RNG, and the three mode rule strategies. It has **zero
//! dependencies** on timers, UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical grids and prompts
//! - **Testable**: Every rule is a plain function of its inputs and the RNG
//! - **Portable**: Usable from the engine, benchmarks, or a headless simulator
//!
//! # Module Structure
//!
//! - [`lives`]: bounded life counter with reset
//! - [`rng`]: PCG-backed RNG used for every random decision
//! - [`rules`]: Classic / Rapid / Chaos strategies behind [`ModeRules`]
//!
//! # Mode Rules
//!
//! | | Classic | Rapid | Chaos |
//! |-|---------|-------|-------|
//! | Grid | 3 / 6 / 9 by round | config | 6 |
//! | "DON'T TAP" | round 5+, p=0.3 | never | round 5+, p=0.5 per line |
//! | Correct / wrong | +10 / 0 | +10 / -5 | +20 / 0 (both actions) |
//! | Reshuffle | every 8 / 4 / 2 rounds | never | every round |
//! | Tap window | 2.5s, -0.1s per 8 rounds, floor 0.8s | config | 4.5s, -0.2s per 6 rounds, floor 2.0s |
//!
//! # Example
//!
//! ```
//! use color_attack_core::{GameRng, ModeRules, RoundContext, Rules, RulesTuning};
//! use color_attack_core::types::{GameMode, PlayerAction, DEFAULT_COLOR_POOL};
//!
//! let mut rng = GameRng::new(12345);
//! let mut rules = Rules::for_mode(GameMode::Classic, &RulesTuning::default());
//!
//! let grid = rules.make_grid(&DEFAULT_COLOR_POOL, 6, 0, 0, &mut rng);
//! assert_eq!(grid.len(), 3);
//!
//! let ctx = RoundContext { round: 1, score: 0, grid: &grid, pool: &DEFAULT_COLOR_POOL };
//! let round = rules.make_prompt(&ctx, &mut rng);
//! assert!(round.prompt.text.starts_with("TAP "));
//!
//! // A no-tap on a plain "TAP" round is wrong
//! assert!(!rules.is_correct(&PlayerAction::NoTap, &round.prompt, round.switch_on, &ctx));
//! ```

pub mod lives;
pub mod rng;
pub mod rules;

pub use color_attack_types as types;

// Re-export commonly used types for convenience
pub use lives::Lives;
pub use rng::GameRng;
pub use rules::{
    ChaosRules, ClassicRules, Grid, ModeRules, RapidRules, RoundContext, RoundPrompt, Rules,
    RulesTuning, ShapeLayout,
};
