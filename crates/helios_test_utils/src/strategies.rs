//! Property-based testing strategies.
//!
//! Generators for small random galaxies and alliance relations, sized
//! so exhaustive reference checks (brute-force shortest path, pairwise
//! closure validation) stay cheap inside proptest runs.

use proptest::prelude::*;

/// Strategy for a set of star positions scattered in a bounded box.
///
/// Positions are integer-valued so distances are reproducible in
/// fixed-point; star count stays small enough for exhaustive route
/// enumeration in reference checks.
pub fn scattered_positions(max_stars: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((0..60i32, 0..60i32), 2..=max_stars)
}

/// Strategy for an undirected alliance relation over `players` players.
///
/// Yields mutual pairs `(a, b)` with `a < b`; players not mentioned are
/// allied with nobody.
pub fn alliance_pairs(players: u32) -> impl Strategy<Value = Vec<(u32, u32)>> {
    let pairs: Vec<(u32, u32)> = (1..=players)
        .flat_map(|a| ((a + 1)..=players).map(move |b| (a, b)))
        .collect();

    prop::collection::vec(prop::bool::ANY, pairs.len()).prop_map(move |mask| {
        pairs
            .iter()
            .zip(mask)
            .filter_map(|(&pair, keep)| keep.then_some(pair))
            .collect()
    })
}
