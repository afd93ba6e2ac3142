//! Cross-task contention tests: FIFO fairness and the multi-player
//! lock ordering guarantee.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use helios_locks::{LockRegistry, PlayerLocks};
use proptest::prelude::*;
use tokio::time::timeout;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Releases must occur in the order acquisition was requested.
#[tokio::test]
async fn fifo_fairness_across_waiters() {
    init_tracing();
    let registry = Arc::new(LockRegistry::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    let holder = registry.acquire("game/1").await;

    let mut waiters = Vec::new();
    for i in 0..8usize {
        let task_registry = Arc::clone(&registry);
        let order = Arc::clone(&order);
        waiters.push(tokio::spawn(async move {
            let ticket = task_registry.acquire("game/1").await;
            order.lock().expect("order mutex poisoned").push(i);
            task_registry.release(ticket);
        }));
        // Make sure waiter i is queued before spawning waiter i + 1,
        // so request order is well defined.
        while registry.waiter_count("game/1") <= i {
            tokio::task::yield_now().await;
        }
    }

    registry.release(holder);
    for waiter in waiters {
        timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter stalled")
            .expect("waiter panicked");
    }

    let order = order.lock().expect("order mutex poisoned");
    assert_eq!(*order, (0..8).collect::<Vec<_>>());
}

/// Two requests for overlapping player sets in opposite order must
/// both complete: the game-lock barrier plus atomic multi-key enqueue
/// rules out the circular wait.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposed_player_sets_never_deadlock() {
    let registry = Arc::new(LockRegistry::new());
    let players = PlayerLocks::new(Arc::clone(&registry));

    for _ in 0..200 {
        let forward = {
            let players = players.clone();
            tokio::spawn(async move {
                let tickets = players.acquire("g1", &["a", "b"]).await;
                tokio::task::yield_now().await;
                players.release(tickets);
            })
        };
        let reverse = {
            let players = players.clone();
            tokio::spawn(async move {
                let tickets = players.acquire("g1", &["b", "a"]).await;
                tokio::task::yield_now().await;
                players.release(tickets);
            })
        };

        timeout(Duration::from_secs(5), async {
            forward.await.expect("forward task panicked");
            reverse.await.expect("reverse task panicked");
        })
        .await
        .expect("player lock requests deadlocked");
    }
}

/// Requests for disjoint player sets do not serialize behind a holder:
/// while one request's locks are held, another for different players
/// in the same game still completes.
#[tokio::test]
async fn disjoint_player_sets_proceed_in_parallel() {
    let registry = Arc::new(LockRegistry::new());
    let players = PlayerLocks::new(Arc::clone(&registry));

    let held = players.acquire("g1", &["a", "b"]).await;

    let other = timeout(Duration::from_secs(5), players.acquire("g1", &["c", "d"]))
        .await
        .expect("disjoint request blocked behind unrelated holder");

    players.release(other);
    players.release(held);
}

/// Fuzzed interleavings: arbitrary spawn orders, overlap patterns and
/// yield points must never produce a permanent stall.
#[test]
fn fuzzed_interleavings_always_complete() {
    proptest!(ProptestConfig::with_cases(64), |(
        sets in prop::collection::vec(
            prop::collection::vec(0..4u32, 1..4),
            2..6,
        ),
        yields in prop::collection::vec(0..3usize, 2..6),
    )| {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .build()
            .expect("runtime build failed");

        runtime.block_on(async move {
            let registry = Arc::new(LockRegistry::new());
            let players = PlayerLocks::new(Arc::clone(&registry));

            let mut tasks = Vec::new();
            for (i, set) in sets.iter().enumerate() {
                let players = players.clone();
                let ids: Vec<String> = set.iter().map(|p| format!("p{p}")).collect();
                let pauses = yields[i % yields.len()];
                tasks.push(tokio::spawn(async move {
                    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
                    let tickets = players.acquire("g1", &refs).await;
                    for _ in 0..pauses {
                        tokio::task::yield_now().await;
                    }
                    players.release(tickets);
                }));
            }

            timeout(Duration::from_secs(5), async {
                for task in tasks {
                    task.await.expect("lock task panicked");
                }
            })
            .await
            .expect("interleaved lock requests deadlocked");
        });
    });
}
