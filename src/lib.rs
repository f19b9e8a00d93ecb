//! Color Attack (workspace facade crate).
//!
//! Re-exports the implementation crates under `color_attack::{types,core,engine,runtime}`
//! and adds the scripted [`autoplay::Autoplayer`] used by the binary and benchmarks.

pub mod autoplay;

pub use color_attack_core as core;
pub use color_attack_engine as engine;
pub use color_attack_runtime as runtime;
pub use color_attack_types as types;
