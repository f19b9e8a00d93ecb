use std::time::{SystemTime, UNIX_EPOCH};

use color_attack_core::rules::{DEFAULT_CHAOS_MIN_TAP_MS, DEFAULT_OFF_GRID_START_ROUND};
use color_attack_core::RulesTuning;

/// Default capacity of the runtime command queue
pub const DEFAULT_COMMAND_BUFFER: usize = 32;

/// Default capacity of the game event broadcast channel
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub seed: u64,
    pub tuning: RulesTuning,
    pub command_buffer: usize,
    pub event_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: clock_seed(),
            tuning: RulesTuning::default(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl RuntimeConfig {
    /// Create from environment variables. Unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
            value.and_then(|s| s.trim().parse().ok())
        }

        let seed = parsed(lookup("COLOR_ATTACK_SEED")).unwrap_or_else(clock_seed);
        let chaos_min_tap_ms =
            parsed(lookup("COLOR_ATTACK_CHAOS_MIN_TAP_MS")).unwrap_or(DEFAULT_CHAOS_MIN_TAP_MS);
        let classic_off_grid_start_round =
            parsed(lookup("COLOR_ATTACK_OFF_GRID_ROUND")).unwrap_or(DEFAULT_OFF_GRID_START_ROUND);
        let command_buffer = parsed(lookup("COLOR_ATTACK_COMMAND_BUFFER"))
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_COMMAND_BUFFER);
        let event_buffer = parsed(lookup("COLOR_ATTACK_EVENT_BUFFER"))
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_EVENT_BUFFER);

        Self {
            seed,
            tuning: RulesTuning {
                classic_off_grid_start_round,
                chaos_min_tap_ms,
            },
            command_buffer,
            event_buffer,
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
