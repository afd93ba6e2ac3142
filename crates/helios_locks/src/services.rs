//! Game-level and player-set lock services.
//!
//! Two specializations over [`LockRegistry`], one per document class
//! the game server mutates:
//!
//! - [`GameLocks`] guards the top-level game document.
//! - [`PlayerLocks`] guards a set of player documents within one game.
//!
//! # Ordering convention
//!
//! Multi-player requests for the same game are totally ordered by a
//! transient pass through the game lock: acquire it, let it go, and
//! only then request the player keys. Two requests for `{A, B}` and
//! `{B, A}` would otherwise be able to grab one key each and wait on
//! the other forever (classic circular wait); the barrier, combined
//! with the registry's atomic multi-key enqueue, forces one request's
//! whole key set ahead of the other's on every shared key.
//!
//! Releasing player locks deliberately never touches the game lock:
//! a releasing holder that needed it could deadlock against a fresh
//! request holding it for its own acquisition pass.

use std::sync::Arc;

use tracing::debug;

use crate::registry::{LockRegistry, LockTicket};

fn game_key(game_id: &str) -> String {
    format!("game/{game_id}")
}

fn player_key(game_id: &str, player_id: &str) -> String {
    format!("game/{game_id}/player/{player_id}")
}

/// Lock service for top-level game documents.
#[derive(Debug, Clone)]
pub struct GameLocks {
    registry: Arc<LockRegistry>,
}

impl GameLocks {
    /// Create a service over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<LockRegistry>) -> Self {
        Self { registry }
    }

    /// Acquire the lock for one game, suspending until free.
    pub async fn acquire(&self, game_id: &str) -> LockTicket {
        self.registry.acquire(game_key(game_id)).await
    }

    /// Release a game lock. Unknown or stale tickets are ignored.
    pub fn release(&self, ticket: LockTicket) {
        self.registry.release(ticket);
    }
}

/// Lock service for sets of player documents within one game.
#[derive(Debug, Clone)]
pub struct PlayerLocks {
    registry: Arc<LockRegistry>,
    games: GameLocks,
}

impl PlayerLocks {
    /// Create a service over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<LockRegistry>) -> Self {
        Self {
            games: GameLocks::new(Arc::clone(&registry)),
            registry,
        }
    }

    /// Acquire locks for every listed player in `game_id`.
    ///
    /// Passes through the game lock as a serialization barrier, then
    /// requests all player keys in one atomic registry pass. Duplicate
    /// player ids are collapsed (acquiring the same key twice in one
    /// request would self-deadlock). An empty list acquires nothing.
    ///
    /// Tickets come back in (deduplicated) input order.
    pub async fn acquire(&self, game_id: &str, player_ids: &[&str]) -> Vec<LockTicket> {
        if player_ids.is_empty() {
            return Vec::new();
        }

        let mut keys: Vec<String> = Vec::with_capacity(player_ids.len());
        for player_id in player_ids {
            let key = player_key(game_id, player_id);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        // Transient barrier: held only long enough to order this
        // request's acquisition pass against every other multi-player
        // request for the same game.
        let barrier = self.games.acquire(game_id).await;
        self.games.release(barrier);

        debug!(game = game_id, players = keys.len(), "acquiring player lock set");
        self.registry.acquire_many(&keys).await
    }

    /// Release a set of player locks.
    ///
    /// Never takes the game lock. Releasing an empty set is a no-op;
    /// unknown or stale tickets are ignored individually.
    pub fn release(&self, tickets: Vec<LockTicket>) {
        for ticket in tickets {
            self.registry.release(ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_game_lock_round_trip() {
        let registry = Arc::new(LockRegistry::new());
        let games = GameLocks::new(Arc::clone(&registry));

        let ticket = games.acquire("g1").await;
        assert!(registry.is_held("game/g1"));
        games.release(ticket);
        assert!(!registry.is_held("game/g1"));
    }

    #[tokio::test]
    async fn test_player_set_keys_and_order() {
        let registry = Arc::new(LockRegistry::new());
        let players = PlayerLocks::new(Arc::clone(&registry));

        let tickets = players.acquire("g1", &["p1", "p2"]).await;
        assert_eq!(
            tickets.iter().map(LockTicket::key).collect::<Vec<_>>(),
            ["game/g1/player/p1", "game/g1/player/p2"]
        );
        // The barrier was transient: the game key is free again.
        assert!(!registry.is_held("game/g1"));

        players.release(tickets);
        assert!(!registry.is_held("game/g1/player/p1"));
    }

    #[tokio::test]
    async fn test_empty_player_set_is_noop() {
        let registry = Arc::new(LockRegistry::new());
        let players = PlayerLocks::new(Arc::clone(&registry));

        let tickets = players.acquire("g1", &[]).await;
        assert!(tickets.is_empty());
        players.release(tickets);
        // No barrier pass for an empty request.
        assert!(!registry.is_held("game/g1"));
    }

    #[tokio::test]
    async fn test_duplicate_player_ids_collapse() {
        let registry = Arc::new(LockRegistry::new());
        let players = PlayerLocks::new(Arc::clone(&registry));

        let tickets = players.acquire("g1", &["p1", "p1", "p2"]).await;
        assert_eq!(tickets.len(), 2);
        players.release(tickets);
    }

    #[tokio::test]
    async fn test_same_player_in_different_games_is_independent() {
        let registry = Arc::new(LockRegistry::new());
        let players = PlayerLocks::new(Arc::clone(&registry));

        let in_g1 = players.acquire("g1", &["p1"]).await;
        // Must not block: different game, different key space.
        let in_g2 = players.acquire("g2", &["p1"]).await;

        players.release(in_g1);
        players.release(in_g2);
    }
}
