//! Cost-ordered best-first route search over the star graph.
//!
//! This is A* without the heuristic: nodes are expanded in order of
//! cost-from-start only. A straight-line heuristic toward the
//! destination would bias the search toward geometric neighbors and
//! miss cheaper wormhole detours, so none is used.
//!
//! Search state lives in a per-call arena indexed by a dense star
//! index. Neighbor lists are computed lazily, once per expanded node,
//! into the arena; shared star data is never mutated.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::galaxy::{Carrier, Galaxy, StarId};
use crate::starlane::{is_lane, lane_ticks, UNREACHABLE_TICKS};

/// Entry in the open set. Min-ordered by cost-from-start, then by
/// insertion sequence so equal-cost pops follow queue order and the
/// search stays deterministic.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct OpenEntry {
    cost: u32,
    seq: u64,
    node: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so comparisons are reversed for
        // min-heap behavior.
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ord => ord,
        }
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-call search arena over a dense star index.
struct SearchArena {
    ids: Vec<StarId>,
    index: HashMap<StarId, usize>,
    /// Lazily computed adjacency, filled on first expansion of a node.
    neighbors: Vec<Option<Vec<usize>>>,
    cost: Vec<u32>,
    parent: Vec<Option<usize>>,
    closed: Vec<bool>,
}

impl SearchArena {
    fn new(galaxy: &Galaxy) -> Self {
        let ids: Vec<StarId> = galaxy.stars().map(|s| s.id).collect();
        let index = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let len = ids.len();
        Self {
            ids,
            index,
            neighbors: vec![None; len],
            cost: vec![UNREACHABLE_TICKS; len],
            parent: vec![None; len],
            closed: vec![false; len],
        }
    }

    /// Neighbor indices of `node`, computing them on first visit.
    fn neighbors_of(&mut self, galaxy: &Galaxy, carrier: &Carrier, node: usize) -> &[usize] {
        if self.neighbors[node].is_none() {
            let from = self.ids[node];
            let adjacent: Vec<usize> = self
                .ids
                .iter()
                .enumerate()
                .filter(|&(other, &to)| other != node && is_lane(galaxy, carrier, from, to))
                .map(|(other, _)| other)
                .collect();
            self.neighbors[node] = Some(adjacent);
        }

        self.neighbors[node].as_deref().unwrap_or(&[])
    }
}

/// Find the minimum-tick route for `carrier` from `source` to
/// `destination`, inclusive of both endpoints.
///
/// Returns an empty route when either endpoint is unknown or no chain
/// of valid lanes connects them; unreachable is data here, not an
/// error. `source == destination` yields a single-star route.
#[must_use]
pub fn find_route(
    galaxy: &Galaxy,
    carrier: &Carrier,
    source: StarId,
    destination: StarId,
) -> Vec<StarId> {
    let mut arena = SearchArena::new(galaxy);

    let (Some(&start), Some(&goal)) = (arena.index.get(&source), arena.index.get(&destination))
    else {
        return Vec::new();
    };

    if start == goal {
        return vec![source];
    }

    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;

    arena.cost[start] = 0;
    open.push(OpenEntry {
        cost: 0,
        seq,
        node: start,
    });

    while let Some(current) = open.pop() {
        if current.node == goal {
            return reconstruct(&arena, goal);
        }

        // Stale entry: a cheaper path to this node was already expanded.
        if arena.closed[current.node] || current.cost > arena.cost[current.node] {
            continue;
        }
        arena.closed[current.node] = true;

        let from = arena.ids[current.node];
        let adjacent = arena.neighbors_of(galaxy, carrier, current.node).to_vec();

        for next in adjacent {
            if arena.closed[next] {
                continue;
            }

            let crossing = lane_ticks(galaxy, carrier, from, arena.ids[next]);
            if crossing == UNREACHABLE_TICKS {
                continue;
            }

            let tentative = current.cost.saturating_add(crossing);
            if tentative < arena.cost[next] {
                arena.cost[next] = tentative;
                arena.parent[next] = Some(current.node);
                seq += 1;
                open.push(OpenEntry {
                    cost: tentative,
                    seq,
                    node: next,
                });
            }
        }
    }

    Vec::new()
}

/// Walk parent pointers back from the goal.
fn reconstruct(arena: &SearchArena, goal: usize) -> Vec<StarId> {
    let mut route = vec![arena.ids[goal]];
    let mut current = goal;

    while let Some(prev) = arena.parent[current] {
        route.push(arena.ids[prev]);
        current = prev;
    }

    route.reverse();
    route
}

/// Total crossing cost of a route, in ticks.
///
/// Sums [`lane_ticks`] over consecutive pairs; a route of one star (or
/// none) costs zero.
#[must_use]
pub fn route_ticks(galaxy: &Galaxy, carrier: &Carrier, route: &[StarId]) -> u32 {
    route
        .windows(2)
        .map(|leg| lane_ticks(galaxy, carrier, leg[0], leg[1]))
        .fold(0, u32::saturating_add)
}
