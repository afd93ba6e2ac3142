//! Alliance-closure battle partitioning.
//!
//! Given the carriers simultaneously present at one location, this
//! module splits them into independent battles: one battle per maximal
//! cluster of players connected through chains of mutual alliance. A
//! battle holds its fleets as sub-groups (one per mutually-allied
//! cluster), so the external battle resolver consumes "no combat",
//! "combat among N" and "lone fleet" through one shape.
//!
//! The caller guarantees all carriers come from a single location;
//! this module does not (and cannot) check that, and mixed-location
//! input produces meaningless partitions.

use tracing::warn;

use crate::galaxy::{CarrierId, Galaxy, PlayerId};

/// One side of a battle: a mutually-allied cluster of players and
/// their carriers, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleGroup {
    /// Players in this group.
    pub players: Vec<PlayerId>,
    /// Carriers belonging to those players.
    pub carriers: Vec<CarrierId>,
}

/// An independent battle: groups that interact with each other and
/// with nobody outside the battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battle {
    /// Sides of the battle.
    pub groups: Vec<BattleGroup>,
}

/// Partition the carriers at one location into independent battles.
///
/// Output order follows input player order (first appearance across
/// `carriers`); it carries no gameplay meaning. Carriers with unknown
/// owners cluster as if their owner were allied with nobody. An empty
/// input yields no battles; a lone carrier yields one battle with one
/// single-carrier group.
#[must_use]
pub fn partition_battles(galaxy: &Galaxy, carriers: &[CarrierId]) -> Vec<Battle> {
    let involved = involved_players(galaxy, carriers);
    if involved.is_empty() {
        return Vec::new();
    }

    // Fast path: everyone is mutually allied with everyone, nobody
    // fights. One battle, one group, all carriers.
    let all_allied = involved
        .iter()
        .enumerate()
        .all(|(i, &a)| involved[i + 1..].iter().all(|&b| galaxy.allied(a, b)));
    if all_allied {
        return vec![Battle {
            groups: vec![group_for(galaxy, carriers, &involved)],
        }];
    }

    let clusters = alliance_clusters(galaxy, &involved);

    clusters
        .into_iter()
        .map(|cluster| Battle {
            groups: vec![group_for(galaxy, carriers, &cluster)],
        })
        .collect()
}

/// Players present, deduplicated, in order of first appearance.
fn involved_players(galaxy: &Galaxy, carriers: &[CarrierId]) -> Vec<PlayerId> {
    let mut players = Vec::new();
    for &id in carriers {
        let Some(carrier) = galaxy.carrier(id) else {
            continue;
        };
        if !players.contains(&carrier.owner) {
            players.push(carrier.owner);
        }
    }
    players
}

/// Transitive closure of `player`'s mutual allies, restricted to the
/// involved set. Depth-first, deduplicated, always contains the player
/// itself.
fn ally_closure(galaxy: &Galaxy, involved: &[PlayerId], player: PlayerId) -> Vec<PlayerId> {
    let mut closure = vec![player];
    let mut pending = vec![player];

    while let Some(current) = pending.pop() {
        for &other in involved {
            if !closure.contains(&other) && galaxy.allied(current, other) {
                closure.push(other);
                pending.push(other);
            }
        }
    }

    closure
}

/// Peel the involved players into alliance clusters, in input order.
///
/// Each player joins the cluster that already holds one of its
/// (transitive) allies, or seeds a new one. Because closures are
/// transitive, a player can never match two clusters; if that
/// invariant breaks anyway the clusters are merged rather than the
/// player dropped.
fn alliance_clusters(galaxy: &Galaxy, involved: &[PlayerId]) -> Vec<Vec<PlayerId>> {
    let mut clusters: Vec<Vec<PlayerId>> = Vec::new();

    for &player in involved {
        let closure = ally_closure(galaxy, involved, player);

        let matching: Vec<usize> = clusters
            .iter()
            .enumerate()
            .filter(|(_, cluster)| cluster.iter().any(|p| closure.contains(p)))
            .map(|(i, _)| i)
            .collect();

        match matching.as_slice() {
            [] => clusters.push(vec![player]),
            [single] => clusters[*single].push(player),
            [first, rest @ ..] => {
                debug_assert!(
                    false,
                    "player {player} matched {} clusters; alliance closure should make this impossible",
                    matching.len()
                );
                warn!(
                    player = %player,
                    clusters = matching.len(),
                    "ambiguous cluster join, merging"
                );
                // Merge back-to-front so indices stay valid.
                let first = *first;
                for &i in rest.iter().rev() {
                    let merged = clusters.remove(i);
                    clusters[first].extend(merged);
                }
                clusters[first].push(player);
            }
        }
    }

    clusters
}

/// Expand a player cluster back into a battle group, carriers in input
/// order.
fn group_for(galaxy: &Galaxy, carriers: &[CarrierId], players: &[PlayerId]) -> BattleGroup {
    let members: Vec<CarrierId> = carriers
        .iter()
        .copied()
        .filter(|&id| {
            galaxy
                .carrier(id)
                .is_some_and(|c| players.contains(&c.owner))
        })
        .collect();

    BattleGroup {
        players: players.to_vec(),
        carriers: members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{Carrier, CarrierDrive, Player, StarId};
    use crate::math::Fixed;

    fn setup(players: &[u32], alliances: &[(u32, u32)], carrier_owners: &[u32]) -> Galaxy {
        let mut galaxy = Galaxy::new();
        for &p in players {
            galaxy.insert_player(Player::new(PlayerId(p), Fixed::from_num(10)));
        }
        for &(a, b) in alliances {
            galaxy
                .player_mut(PlayerId(a))
                .unwrap()
                .allies
                .insert(PlayerId(b));
            galaxy
                .player_mut(PlayerId(b))
                .unwrap()
                .allies
                .insert(PlayerId(a));
        }
        for (i, &owner) in carrier_owners.iter().enumerate() {
            galaxy.insert_carrier(Carrier::new(
                CarrierId(i as u32 + 1),
                PlayerId(owner),
                StarId(1),
                CarrierDrive::new(Fixed::from_num(10), Fixed::ONE),
            ));
        }
        galaxy
    }

    fn carrier_ids(n: u32) -> Vec<CarrierId> {
        (1..=n).map(CarrierId).collect()
    }

    fn group_players(battle: &Battle) -> Vec<Vec<PlayerId>> {
        battle.groups.iter().map(|g| g.players.clone()).collect()
    }

    #[test]
    fn test_lone_carrier_is_one_battle_one_group() {
        let galaxy = setup(&[1], &[], &[1]);
        let battles = partition_battles(&galaxy, &carrier_ids(1));

        assert_eq!(battles.len(), 1);
        assert_eq!(battles[0].groups.len(), 1);
        assert_eq!(battles[0].groups[0].players, vec![PlayerId(1)]);
        assert_eq!(battles[0].groups[0].carriers, vec![CarrierId(1)]);
    }

    #[test]
    fn test_empty_input_is_no_battles() {
        let galaxy = setup(&[], &[], &[]);
        assert!(partition_battles(&galaxy, &[]).is_empty());
    }

    #[test]
    fn test_all_allied_fast_path() {
        let galaxy = setup(&[1, 2, 3], &[(1, 2), (2, 3), (1, 3)], &[1, 2, 3]);
        let battles = partition_battles(&galaxy, &carrier_ids(3));

        assert_eq!(battles.len(), 1);
        assert_eq!(
            group_players(&battles[0]),
            vec![vec![PlayerId(1), PlayerId(2), PlayerId(3)]]
        );
        assert_eq!(battles[0].groups[0].carriers, carrier_ids(3));
    }

    #[test]
    fn test_allied_pair_and_isolated_player_split_into_two_battles() {
        // P1-P2 allied, P3 enemy of both, all at one star.
        let galaxy = setup(&[1, 2, 3], &[(1, 2)], &[1, 2, 3]);
        let battles = partition_battles(&galaxy, &carrier_ids(3));

        assert_eq!(battles.len(), 2);
        assert_eq!(
            group_players(&battles[0]),
            vec![vec![PlayerId(1), PlayerId(2)]]
        );
        assert_eq!(group_players(&battles[1]), vec![vec![PlayerId(3)]]);
        assert_eq!(
            battles[0].groups[0].carriers,
            vec![CarrierId(1), CarrierId(2)]
        );
        assert_eq!(battles[1].groups[0].carriers, vec![CarrierId(3)]);
    }

    #[test]
    fn test_transitive_alliance_spans_one_cluster() {
        // P1-P2 and P2-P3 allied, P1-P3 not: transitively one cluster,
        // but the pairwise fast path must not fire.
        let galaxy = setup(&[1, 2, 3], &[(1, 2), (2, 3)], &[1, 2, 3]);
        let battles = partition_battles(&galaxy, &carrier_ids(3));

        assert_eq!(battles.len(), 1);
        assert_eq!(
            group_players(&battles[0]),
            vec![vec![PlayerId(1), PlayerId(2), PlayerId(3)]]
        );
    }

    #[test]
    fn test_transitive_link_found_out_of_order() {
        // Bridge player P2 appears last in input: P1 and P3 must still
        // cluster together through it.
        let galaxy = setup(&[1, 2, 3], &[(1, 2), (2, 3)], &[1, 3, 2]);
        let battles = partition_battles(&galaxy, &carrier_ids(3));

        assert_eq!(battles.len(), 1);
        assert_eq!(battles[0].groups[0].carriers, carrier_ids(3));
    }

    #[test]
    fn test_two_hostile_pairs() {
        let galaxy = setup(&[1, 2, 3, 4], &[(1, 2), (3, 4)], &[1, 2, 3, 4]);
        let battles = partition_battles(&galaxy, &carrier_ids(4));

        assert_eq!(battles.len(), 2);
        assert_eq!(
            group_players(&battles[0]),
            vec![vec![PlayerId(1), PlayerId(2)]]
        );
        assert_eq!(
            group_players(&battles[1]),
            vec![vec![PlayerId(3), PlayerId(4)]]
        );
    }

    #[test]
    fn test_one_sided_declaration_does_not_cluster() {
        let mut galaxy = setup(&[1, 2], &[], &[1, 2]);
        // P1 declares P2 but not vice versa: still enemies.
        galaxy
            .player_mut(PlayerId(1))
            .unwrap()
            .allies
            .insert(PlayerId(2));

        let battles = partition_battles(&galaxy, &carrier_ids(2));
        assert_eq!(battles.len(), 2);
    }

    #[test]
    fn test_multiple_carriers_per_player_stay_with_owner() {
        let galaxy = setup(&[1, 2], &[], &[1, 1, 2, 1]);
        let battles = partition_battles(&galaxy, &carrier_ids(4));

        assert_eq!(battles.len(), 2);
        assert_eq!(
            battles[0].groups[0].carriers,
            vec![CarrierId(1), CarrierId(2), CarrierId(4)]
        );
        assert_eq!(battles[1].groups[0].carriers, vec![CarrierId(3)]);
    }

    #[test]
    fn test_unknown_carriers_are_skipped() {
        let galaxy = setup(&[1], &[], &[1]);
        let battles = partition_battles(&galaxy, &[CarrierId(1), CarrierId(99)]);

        assert_eq!(battles.len(), 1);
        assert_eq!(battles[0].groups[0].carriers, vec![CarrierId(1)]);
    }

    /// Every pair in a group must be chain-connected inside the group,
    /// and no mutual-ally edge may cross group boundaries.
    #[test]
    fn test_alliance_closure_soundness() {
        let galaxy = setup(
            &[1, 2, 3, 4, 5, 6],
            &[(1, 2), (2, 3), (4, 5)],
            &[1, 2, 3, 4, 5, 6],
        );
        let battles = partition_battles(&galaxy, &carrier_ids(6));

        let groups: Vec<Vec<PlayerId>> = battles
            .iter()
            .flat_map(|b| b.groups.iter().map(|g| g.players.clone()))
            .collect();

        for group in &groups {
            for &inside in group {
                for other_group in &groups {
                    if std::ptr::eq(group, other_group) {
                        continue;
                    }
                    for &outside in other_group {
                        assert!(
                            !galaxy.allied(inside, outside),
                            "{inside} and {outside} are allied across groups"
                        );
                    }
                }
            }
        }
    }
}
