//! Error types for the galaxy simulation.
//!
//! The hot paths deliberately do not raise: pathfinding reports
//! unreachable as an empty route, waypoint validation reports "no
//! change", and unknown ids degrade to `None` lookups. [`GameError`]
//! exists for the collaborator seam, where a caller hands this core a
//! request that cannot be interpreted at all.

use thiserror::Error;

use crate::galaxy::{CarrierId, PlayerId, StarId};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all galaxy simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Referenced star does not exist in the galaxy.
    #[error("Star not found: {0}")]
    StarNotFound(StarId),

    /// Referenced carrier does not exist in the galaxy.
    #[error("Carrier not found: {0}")]
    CarrierNotFound(CarrierId),

    /// Referenced player does not exist in the galaxy.
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// Invalid galaxy state detected by validation.
    #[error("Invalid galaxy state: {0}")]
    InvalidState(String),
}
