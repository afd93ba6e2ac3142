//! # Helios Locks
//!
//! Async consistency layer for the Helios game server.
//!
//! Everything that mutates a game document or a player document does so
//! under a keyed lock from this crate. The primitives are cooperative:
//! waiting suspends the task, never a thread, and the releasing party
//! resumes the next waiter in FIFO order.
//!
//! ## Crate Structure
//!
//! - [`registry`] - The keyed mutex primitive and its ticket protocol
//! - [`services`] - Game-level and player-set lock services built on it
//!
//! ## Caller contract
//!
//! Locks here carry no timeout and no re-entrancy. A task that acquires
//! a key it already holds deadlocks with itself; a holder that never
//! releases stalls every later waiter on that key. Callers needing
//! bounded waits wrap acquisition in `tokio::time::timeout`, and every
//! exit path (including error paths) must release what it acquired.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod registry;
pub mod services;

pub use registry::{LockRegistry, LockTicket};
pub use services::{GameLocks, PlayerLocks};
