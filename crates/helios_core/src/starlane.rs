//! Derived hyperspace connectivity and travel costs.
//!
//! Lanes are never stored: whether two stars are connected is a pure
//! function of their positions, their wormhole link, and the traveling
//! carrier's drive. The same pair of stars can be connected for one
//! carrier and disconnected for another, so every query here takes the
//! carrier as an argument.

use crate::galaxy::{Carrier, Galaxy, Star, StarId};
use crate::math::Fixed;

/// Speed multiplier applied when traveling between two friendly warp
/// gates.
pub const WARP_SPEED_MULTIPLIER: Fixed = Fixed::const_from_int(3);

/// Sentinel cost for a crossing no finite number of ticks completes
/// (unknown stars, non-positive drive speed). Pathfinding treats it as
/// "do not relax through this lane".
pub const UNREACHABLE_TICKS: u32 = u32::MAX;

/// Whether two stars form a wormhole pair.
///
/// Requires both ends to name each other; a dangling one-sided link
/// does not connect anything. A star is never a pair with itself.
#[must_use]
pub fn is_wormhole_pair(galaxy: &Galaxy, a: StarId, b: StarId) -> bool {
    if a == b {
        return false;
    }

    let (Some(sa), Some(sb)) = (galaxy.star(a), galaxy.star(b)) else {
        return false;
    };

    sa.wormhole == Some(b) && sb.wormhole == Some(a)
}

/// Whether a direct lane exists between two stars for this carrier.
///
/// A wormhole pair is always connected; otherwise the Euclidean
/// distance must be within the carrier's hyperspace range. Dead stars
/// are valid lane endpoints. Unknown stars connect to nothing.
#[must_use]
pub fn is_lane(galaxy: &Galaxy, carrier: &Carrier, a: StarId, b: StarId) -> bool {
    if a == b {
        return false;
    }

    if is_wormhole_pair(galaxy, a, b) {
        return true;
    }

    let (Some(sa), Some(sb)) = (galaxy.star(a), galaxy.star(b)) else {
        return false;
    };

    let range = carrier.drive.hyperspace_range;
    sa.location.distance_squared(sb.location) <= range.saturating_mul(range)
}

/// Ticks needed for this carrier to cross the lane from `a` to `b`.
///
/// Wormhole crossings and instant drives take a single tick. Everything
/// else is distance over effective speed, rounded up, with a one-tick
/// floor. Effective speed folds in the specialist multiplier and, when
/// both endpoints hold friendly warp gates, [`WARP_SPEED_MULTIPLIER`].
///
/// Does not test lane validity: callers check [`is_lane`] first.
/// Returns [`UNREACHABLE_TICKS`] for unknown stars or a drive that
/// cannot move.
#[must_use]
pub fn lane_ticks(galaxy: &Galaxy, carrier: &Carrier, a: StarId, b: StarId) -> u32 {
    let (Some(sa), Some(sb)) = (galaxy.star(a), galaxy.star(b)) else {
        return UNREACHABLE_TICKS;
    };

    if carrier.drive.instant || is_wormhole_pair(galaxy, a, b) {
        return 1;
    }

    let mut speed = carrier.drive.speed * carrier.drive.speed_multiplier;
    if is_warp_lane(galaxy, carrier, sa, sb) {
        speed *= WARP_SPEED_MULTIPLIER;
    }

    if speed <= Fixed::ZERO {
        return UNREACHABLE_TICKS;
    }

    let distance = sa.location.distance(sb.location);
    let ticks: i64 = (distance / speed).ceil().to_num();
    u32::try_from(ticks).map_or(UNREACHABLE_TICKS, |t| t.max(1))
}

/// Whether the warp multiplier applies: gates at both ends, each end
/// owned by the carrier's owner or a mutual ally.
fn is_warp_lane(galaxy: &Galaxy, carrier: &Carrier, a: &Star, b: &Star) -> bool {
    if !a.warp_gate || !b.warp_gate {
        return false;
    }

    [a, b].iter().all(|star| {
        star.owner
            .is_some_and(|owner| galaxy.allied(owner, carrier.owner))
    })
}
