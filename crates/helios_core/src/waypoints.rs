//! Waypoint queue re-validation.
//!
//! A carrier's queued route is only as good as the graph it was
//! plotted against: research changes hyperspace range, stars change
//! hands, specialist effects expire. Whenever that happens the queue
//! is walked again and cut at the first leg that is no longer a valid
//! lane, together with everything after it. A truncated route that was
//! set to loop gets its loop flag re-checked, and cleared if the
//! shortened queue can no longer close.
//!
//! The in-flight leg of a carrier in transit is never retroactively
//! invalidated; validation starts at the second queued leg.
//!
//! Both culling modes mutate the carrier in place and return the
//! surviving queue only when something changed (`None` means "nothing
//! changed", `Some(vec![])` means "changed to empty"), so callers know
//! whether there is anything to persist.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::galaxy::{Carrier, CarrierId, Galaxy, PlayerId, StarId, Waypoint};
use crate::starlane::{is_lane, is_wormhole_pair};

/// Whether a carrier's queue can loop: the return leg from the last
/// destination back to the first source must itself be a valid lane
/// (or zero-length). An empty queue cannot loop.
#[must_use]
pub fn can_loop(galaxy: &Galaxy, carrier: &Carrier) -> bool {
    loop_closes(galaxy, carrier, &carrier.waypoints)
}

fn loop_closes(galaxy: &Galaxy, carrier: &Carrier, waypoints: &[Waypoint]) -> bool {
    let (Some(first), Some(last)) = (waypoints.first(), waypoints.last()) else {
        return false;
    };

    last.destination == first.source
        || is_lane(galaxy, carrier, last.destination, first.source)
}

/// Index of the first leg to validate: 0 for an orbiting carrier, 1
/// for one in transit (the in-flight leg stands).
fn first_checked_leg(carrier: &Carrier) -> usize {
    usize::from(carrier.orbiting.is_none())
}

/// Cut the queue at `cut`, clear the loop flag if the shortened queue
/// no longer closes, and report the surviving queue.
fn truncate_at(galaxy: &mut Galaxy, carrier_id: CarrierId, cut: usize) -> Option<Vec<Waypoint>> {
    let carrier = galaxy.carrier(carrier_id)?;
    let keeps_loop = !carrier.looped || loop_closes(galaxy, carrier, &carrier.waypoints[..cut]);
    let dropped = carrier.waypoints.len() - cut;

    let carrier = galaxy.carrier_mut(carrier_id)?;
    carrier.waypoints.truncate(cut);
    if !keeps_loop {
        carrier.looped = false;
    }

    debug!(
        carrier = %carrier_id,
        dropped,
        remaining = carrier.waypoints.len(),
        loop_cleared = !keeps_loop,
        "truncated waypoint queue"
    );

    Some(carrier.waypoints.clone())
}

/// Re-validate a carrier's route against current hyperspace ranges.
///
/// Every checked leg must be a valid lane for the carrier, and a
/// stationary carrier's first leg must depart from the star it orbits.
/// The queue is cut at the first violation. Unknown carrier ids report
/// "nothing changed".
pub fn cull_waypoints_by_hyperspace(
    galaxy: &mut Galaxy,
    carrier_id: CarrierId,
) -> Option<Vec<Waypoint>> {
    let carrier = galaxy.carrier(carrier_id)?;
    let start = first_checked_leg(carrier);

    // A stationary carrier whose queue departs from somewhere it is
    // not invalidates the whole queue.
    if let (Some(orbiting), Some(first)) = (carrier.orbiting, carrier.waypoints.first()) {
        if first.source != orbiting {
            return truncate_at(galaxy, carrier_id, 0);
        }
    }

    let cut = (start..carrier.waypoints.len()).find(|&i| {
        let leg = carrier.waypoints[i];
        !is_lane(galaxy, carrier, leg.source, leg.destination)
    })?;

    truncate_at(galaxy, carrier_id, cut)
}

/// Scanning-visibility culling with a per-player visibility cache.
///
/// The second validation mode: a leg is valid only while the owning
/// player can still scan its destination. Computing scanning coverage
/// walks every owned star against every star, so the coverage set is
/// built once per player and reused across that player's carriers for
/// the lifetime of this value. Build a fresh [`ScanningCull`] per tick
/// or whenever ownership, death, or scanning ranges change.
#[derive(Debug, Default)]
pub struct ScanningCull {
    in_range: HashMap<PlayerId, BTreeSet<StarId>>,
}

impl ScanningCull {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The set of stars `player` can currently scan.
    ///
    /// Coverage radiates from each live owned star out to the player's
    /// scanning range, then extends through wormholes: the partner of
    /// a scannable star is scannable. Dead stars are owned husks; they
    /// contribute no coverage (but can themselves be scanned from
    /// elsewhere). Unknown players scan nothing.
    pub fn scannable(&mut self, galaxy: &Galaxy, player_id: PlayerId) -> &BTreeSet<StarId> {
        self.in_range
            .entry(player_id)
            .or_insert_with(|| Self::compute_scannable(galaxy, player_id))
    }

    fn compute_scannable(galaxy: &Galaxy, player_id: PlayerId) -> BTreeSet<StarId> {
        let Some(player) = galaxy.player(player_id) else {
            return BTreeSet::new();
        };

        let range = player.scanning_range;
        let mut visible = BTreeSet::new();

        for source in galaxy
            .stars()
            .filter(|s| s.owner == Some(player_id) && !s.dead)
        {
            visible.insert(source.id);
            for target in galaxy.stars() {
                if source.location.distance_squared(target.location)
                    <= range.saturating_mul(range)
                {
                    visible.insert(target.id);
                }
            }
        }

        // Wormhole partners of anything scannable are scannable too.
        let through_wormholes: Vec<StarId> = visible
            .iter()
            .filter_map(|&id| galaxy.star(id).and_then(|s| s.wormhole))
            .filter(|&partner| {
                !visible.contains(&partner)
                    && visible
                        .iter()
                        .any(|&id| is_wormhole_pair(galaxy, id, partner))
            })
            .collect();
        visible.extend(through_wormholes);

        visible
    }

    /// Re-validate a carrier's route against its owner's scanning
    /// coverage, cutting at the first destination the owner can no
    /// longer see. Same mutation and return contract as
    /// [`cull_waypoints_by_hyperspace`].
    pub fn cull_waypoints(
        &mut self,
        galaxy: &mut Galaxy,
        carrier_id: CarrierId,
    ) -> Option<Vec<Waypoint>> {
        let carrier = galaxy.carrier(carrier_id)?;
        let start = first_checked_leg(carrier);
        let owner = carrier.owner;

        let waypoints = carrier.waypoints.clone();
        let visible = self.scannable(galaxy, owner);
        let cut = (start..waypoints.len()).find(|&i| !visible.contains(&waypoints[i].destination))?;

        truncate_at(galaxy, carrier_id, cut)
    }
}
