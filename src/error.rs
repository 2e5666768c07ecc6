//! The error type returned across this crate's library boundary.
//!
//! Move legality is checked at runtime rather than enforced by a
//! typestate, so callers need a real `std::error::Error` to match on.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoupError {
    #[error("move is not legal in the current state")]
    IllegalMove,

    #[error("operation would violate a game invariant")]
    InvariantViolation,

    #[error("ismcts called on a terminal state")]
    EmptySearch,

    #[error("player count must be between 2 and 6, got {0}")]
    InvalidPlayerCount(u8),
}
