//! Test fixtures and helpers.
//!
//! Pre-built galaxies and a builder for assembling small scenarios
//! without repeating insert boilerplate in every test.

use fixed::types::I32F32;

use helios_core::galaxy::{
    Carrier, CarrierDrive, CarrierId, Galaxy, Player, PlayerId, Star, StarId, Waypoint,
};
use helios_core::math::Vec2Fixed;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a waypoint with no action and no delay.
#[must_use]
pub fn leg(source: u32, destination: u32) -> Waypoint {
    Waypoint::travel(StarId(source), StarId(destination))
}

/// Builder for small test galaxies.
#[derive(Debug, Default)]
pub struct GalaxyBuilder {
    galaxy: Galaxy,
}

impl GalaxyBuilder {
    /// Start from an empty galaxy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live, unowned star at integer coordinates.
    #[must_use]
    pub fn star(mut self, id: u32, x: i32, y: i32) -> Self {
        self.galaxy
            .insert_star(Star::new(StarId(id), Vec2Fixed::new(fixed(x), fixed(y))));
        self
    }

    /// Link two existing stars as a wormhole pair (both directions).
    ///
    /// # Panics
    ///
    /// Panics if either star was not added first.
    #[must_use]
    pub fn wormhole(mut self, a: u32, b: u32) -> Self {
        self.galaxy
            .star_mut(StarId(a))
            .expect("wormhole endpoint missing")
            .wormhole = Some(StarId(b));
        self.galaxy
            .star_mut(StarId(b))
            .expect("wormhole endpoint missing")
            .wormhole = Some(StarId(a));
        self
    }

    /// Add a player with the given scanning range.
    #[must_use]
    pub fn player(mut self, id: u32, scanning_range: i32) -> Self {
        self.galaxy
            .insert_player(Player::new(PlayerId(id), fixed(scanning_range)));
        self
    }

    /// Declare a mutual alliance between two existing players.
    ///
    /// # Panics
    ///
    /// Panics if either player was not added first.
    #[must_use]
    pub fn alliance(mut self, a: u32, b: u32) -> Self {
        self.galaxy
            .player_mut(PlayerId(a))
            .expect("ally missing")
            .allies
            .insert(PlayerId(b));
        self.galaxy
            .player_mut(PlayerId(b))
            .expect("ally missing")
            .allies
            .insert(PlayerId(a));
        self
    }

    /// Add a stationary carrier with the given range and speed.
    #[must_use]
    pub fn carrier(mut self, id: u32, owner: u32, at: u32, range: i32, speed: i32) -> Self {
        self.galaxy.insert_carrier(Carrier::new(
            CarrierId(id),
            PlayerId(owner),
            StarId(at),
            CarrierDrive::new(fixed(range), fixed(speed)),
        ));
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Galaxy {
        self.galaxy
    }
}
