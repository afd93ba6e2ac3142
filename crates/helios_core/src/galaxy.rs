//! Galaxy data model.
//!
//! Stars, carriers, and players are pure data with no behavior. The
//! derived facts (hyperspace connectivity, travel costs, battle
//! partitions) live in their own modules and read this state without
//! mutating it; only the waypoint engine writes back, through the
//! explicit `_mut` accessors.
//!
//! Absence is data here: looking up an unknown id yields `None`, never
//! a fault.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a star (celestial body).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct StarId(pub u32);

/// Unique identifier for a carrier (fleet).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct CarrierId(pub u32);

/// Unique identifier for a player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for StarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "star:{}", self.0)
    }
}

impl std::fmt::Display for CarrierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "carrier:{}", self.0)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player:{}", self.0)
    }
}

// ============================================================================
// Stars
// ============================================================================

/// A celestial body.
///
/// Only `location`, `wormhole` and `dead` affect hyperspace
/// connectivity. Ownership matters for warp-gate speed and scanning
/// visibility, never for whether a lane exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    /// Star identity.
    pub id: StarId,
    /// Position in galactic coordinates.
    pub location: Vec2Fixed,
    /// Wormhole partner, if this star is one end of a wormhole.
    ///
    /// A pair only exists when both ends name each other; a dangling
    /// one-sided link is ignored.
    pub wormhole: Option<StarId>,
    /// Current owner. `None` for unclaimed stars.
    pub owner: Option<PlayerId>,
    /// Dead stars contribute no scanning visibility but remain valid
    /// path nodes.
    pub dead: bool,
    /// Whether a warp gate has been built here.
    pub warp_gate: bool,
}

impl Star {
    /// Create a live, unowned star with no wormhole or gate.
    #[must_use]
    pub const fn new(id: StarId, location: Vec2Fixed) -> Self {
        Self {
            id,
            location,
            wormhole: None,
            owner: None,
            dead: false,
            warp_gate: false,
        }
    }
}

// ============================================================================
// Carriers
// ============================================================================

/// Order attached to a waypoint, executed on arrival.
///
/// Opaque to the consistency core: truncation carries actions through
/// untouched and never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WaypointAction {
    /// Arrive and hold.
    #[default]
    DoNothing,
    /// Collect all ships garrisoned at the destination.
    CollectAll,
    /// Drop all ships at the destination.
    DropAll,
    /// Collect a set number of ships.
    Collect,
    /// Drop a set number of ships.
    Drop,
    /// Garrison the carrier at the destination.
    Garrison,
}

/// A single leg of a carrier's queued route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Star the leg departs from.
    pub source: StarId,
    /// Star the leg arrives at.
    pub destination: StarId,
    /// Order executed on arrival.
    pub action: WaypointAction,
    /// Ticks to wait at the destination before departing again.
    pub delay_ticks: u32,
}

impl Waypoint {
    /// Create a waypoint with no action and no delay.
    #[must_use]
    pub const fn travel(source: StarId, destination: StarId) -> Self {
        Self {
            source,
            destination,
            action: WaypointAction::DoNothing,
            delay_ticks: 0,
        }
    }
}

/// Effective travel characteristics of a carrier.
///
/// These are the already-resolved per-fleet values: tech level,
/// specialist effects and game settings have been folded in by the
/// caller before this core sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierDrive {
    /// Maximum direct-lane distance without a wormhole.
    #[serde(with = "fixed_serde")]
    pub hyperspace_range: Fixed,
    /// Base distance covered per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Specialist speed multiplier (1 when no specialist applies).
    #[serde(with = "fixed_serde")]
    pub speed_multiplier: Fixed,
    /// Instant drives cross any valid lane in a single tick.
    pub instant: bool,
}

impl CarrierDrive {
    /// Create a drive with the given range and speed, no modifiers.
    #[must_use]
    pub fn new(hyperspace_range: Fixed, speed: Fixed) -> Self {
        Self {
            hyperspace_range,
            speed,
            speed_multiplier: Fixed::ONE,
            instant: false,
        }
    }
}

/// A fleet of ships moving between stars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    /// Carrier identity.
    pub id: CarrierId,
    /// Owning player.
    pub owner: PlayerId,
    /// Star the carrier is orbiting, or `None` while in transit (the
    /// first waypoint is then the in-flight leg).
    pub orbiting: Option<StarId>,
    /// Queued route, in travel order.
    pub waypoints: Vec<Waypoint>,
    /// Whether the route repeats once the last waypoint is reached.
    pub looped: bool,
    /// Effective travel characteristics.
    pub drive: CarrierDrive,
}

impl Carrier {
    /// Create a stationary carrier with an empty route.
    #[must_use]
    pub fn new(id: CarrierId, owner: PlayerId, orbiting: StarId, drive: CarrierDrive) -> Self {
        Self {
            id,
            owner,
            orbiting: Some(orbiting),
            waypoints: Vec::new(),
            looped: false,
            drive,
        }
    }
}

// ============================================================================
// Players and diplomacy
// ============================================================================

/// A player and their one-sided diplomatic declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player identity.
    pub id: PlayerId,
    /// Players this player has declared as allies. One-sided: the
    /// pair is only *allied* when both declarations exist.
    pub allies: BTreeSet<PlayerId>,
    /// Scanning range, measured from each owned live star.
    #[serde(with = "fixed_serde")]
    pub scanning_range: Fixed,
}

impl Player {
    /// Create a player with no declarations.
    #[must_use]
    pub fn new(id: PlayerId, scanning_range: Fixed) -> Self {
        Self {
            id,
            allies: BTreeSet::new(),
            scanning_range,
        }
    }
}

// ============================================================================
// Galaxy
// ============================================================================

/// The full in-memory game state this core reads and (for waypoint
/// queues only) mutates.
///
/// Backed by ordered maps so iteration order is deterministic across
/// processes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Galaxy {
    stars: BTreeMap<StarId, Star>,
    carriers: BTreeMap<CarrierId, Carrier>,
    players: BTreeMap<PlayerId, Player>,
}

impl Galaxy {
    /// Create an empty galaxy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a star, replacing any star with the same id.
    pub fn insert_star(&mut self, star: Star) {
        self.stars.insert(star.id, star);
    }

    /// Insert a carrier, replacing any carrier with the same id.
    pub fn insert_carrier(&mut self, carrier: Carrier) {
        self.carriers.insert(carrier.id, carrier);
    }

    /// Insert a player, replacing any player with the same id.
    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    /// Look up a star.
    #[must_use]
    pub fn star(&self, id: StarId) -> Option<&Star> {
        self.stars.get(&id)
    }

    /// Look up a star for mutation.
    #[must_use]
    pub fn star_mut(&mut self, id: StarId) -> Option<&mut Star> {
        self.stars.get_mut(&id)
    }

    /// Look up a carrier.
    #[must_use]
    pub fn carrier(&self, id: CarrierId) -> Option<&Carrier> {
        self.carriers.get(&id)
    }

    /// Look up a carrier for mutation.
    #[must_use]
    pub fn carrier_mut(&mut self, id: CarrierId) -> Option<&mut Carrier> {
        self.carriers.get_mut(&id)
    }

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Look up a player for mutation.
    #[must_use]
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Iterate all stars in id order.
    pub fn stars(&self) -> impl Iterator<Item = &Star> {
        self.stars.values()
    }

    /// Iterate all carriers in id order.
    pub fn carriers(&self) -> impl Iterator<Item = &Carrier> {
        self.carriers.values()
    }

    /// Iterate all players in id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Look up a star, erroring on absence.
    ///
    /// For collaborator seams that treat a missing id as caller misuse
    /// rather than data; the algorithms in this crate use [`Galaxy::star`]
    /// and degrade instead.
    pub fn require_star(&self, id: StarId) -> Result<&Star> {
        self.star(id).ok_or(GameError::StarNotFound(id))
    }

    /// Look up a carrier, erroring on absence.
    pub fn require_carrier(&self, id: CarrierId) -> Result<&Carrier> {
        self.carrier(id).ok_or(GameError::CarrierNotFound(id))
    }

    /// Look up a player, erroring on absence.
    pub fn require_player(&self, id: PlayerId) -> Result<&Player> {
        self.player(id).ok_or(GameError::PlayerNotFound(id))
    }

    /// Check referential integrity, reporting the first problem found.
    ///
    /// Every wormhole partner, owner, orbit and waypoint endpoint must
    /// name something that exists, and a stationary carrier's queue
    /// must depart from the star it orbits. Meant for ingest seams and
    /// debug validation; the algorithms themselves tolerate dangling
    /// ids by degrading.
    pub fn validate(&self) -> Result<()> {
        for star in self.stars.values() {
            if let Some(partner) = star.wormhole {
                self.require_star(partner)?;
            }
            if let Some(owner) = star.owner {
                self.require_player(owner)?;
            }
        }

        for carrier in self.carriers.values() {
            self.require_player(carrier.owner)?;
            if let Some(orbiting) = carrier.orbiting {
                self.require_star(orbiting)?;
                if let Some(first) = carrier.waypoints.first() {
                    if first.source != orbiting {
                        return Err(GameError::InvalidState(format!(
                            "{} departs from {} but orbits {orbiting}",
                            carrier.id, first.source
                        )));
                    }
                }
            }
            for waypoint in &carrier.waypoints {
                self.require_star(waypoint.source)?;
                self.require_star(waypoint.destination)?;
            }
        }

        Ok(())
    }

    /// Whether two players are allied.
    ///
    /// Requires *mutual* declaration: `a` must have declared `b` and
    /// `b` must have declared `a`. Every player is allied with itself.
    /// Unknown players are allied with nobody.
    #[must_use]
    pub fn allied(&self, a: PlayerId, b: PlayerId) -> bool {
        if a == b {
            return true;
        }

        let (Some(pa), Some(pb)) = (self.players.get(&a), self.players.get(&b)) else {
            return false;
        };

        pa.allies.contains(&b) && pb.allies.contains(&a)
    }
}
