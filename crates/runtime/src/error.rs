//! Error types surfaced by the runtime.
//!
//! Game logic itself has no failure modes; only channel plumbing and the
//! external score service can fail.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Failures reported by a [`ScoreService`](crate::services::ScoreService)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("no authenticated player")]
    NotAuthenticated,

    #[error("leaderboard service unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime command channel closed")]
    ChannelClosed,

    #[error(transparent)]
    Score(#[from] ScoreError),
}
