//! # Helios Core
//!
//! Deterministic simulation core for the Helios strategy game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! It covers the parts of the game that need real invariant reasoning:
//! derived hyperspace connectivity, shortest-route search, waypoint
//! re-validation, and combat group partitioning. Locking lives in the
//! `helios_locks` crate; persistence and transport are collaborator
//! concerns and never appear here.
//!
//! ## Crate Structure
//!
//! - [`galaxy`] - Stars, carriers, players, and the diplomacy relation
//! - [`starlane`] - Derived hyperspace edges and tick costs
//! - [`route`] - Cost-ordered best-first route search
//! - [`waypoints`] - Waypoint queue re-validation and truncation
//! - [`combat_groups`] - Alliance-closure battle partitioning
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat_groups;
pub mod error;
pub mod galaxy;
pub mod math;
pub mod route;
pub mod starlane;
pub mod waypoints;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat_groups::{partition_battles, Battle, BattleGroup};
    pub use crate::error::{GameError, Result};
    pub use crate::galaxy::{
        Carrier, CarrierDrive, CarrierId, Galaxy, Player, PlayerId, Star, StarId, Waypoint,
        WaypointAction,
    };
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::route::{find_route, route_ticks};
    pub use crate::waypoints::{can_loop, cull_waypoints_by_hyperspace, ScanningCull};
}
