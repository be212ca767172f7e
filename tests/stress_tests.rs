//! Stress tests: concurrent producers against the state store and large
//! observer sets against the broadcast hub.

use server::detect;
use server::hub::ObserverHub;
use server::state::PlayerStateStore;
use shared::{BlockBreakEvent, BlockKind, Position, MINING_TRAIL_CAP};
use std::sync::Arc;
use tokio::sync::mpsc;

/// STATE STORE UNDER LOAD
mod state_stress {
    use super::*;

    /// Fifty qualifying breaks never push the trail past its cap, and the
    /// oldest entries are the ones evicted.
    #[test]
    fn mining_trail_bounded_after_fifty_breaks() {
        let store = PlayerStateStore::new();

        let mut last_trail = Vec::new();
        for i in 0..50 {
            last_trail =
                store.record_mining_location("Digger", Position::new(i as f64, 12.0, 0.0));
            assert!(last_trail.len() <= MINING_TRAIL_CAP);
        }

        assert_eq!(last_trail.len(), MINING_TRAIL_CAP);
        let xs: Vec<f64> = last_trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, (40..50).map(|i| i as f64).collect::<Vec<f64>>());
    }

    /// The detector path sees the same bound.
    #[test]
    fn detector_keeps_trail_bounded() {
        let store = PlayerStateStore::new();

        for i in 0..50 {
            let ev = BlockBreakEvent {
                player: "Digger".to_string(),
                block: BlockKind::DiamondOre,
                // Spread breaks far apart so no alert fires.
                location: Position::new(i as f64 * 100.0, 12.0, 0.0),
                bypass: false,
            };
            assert!(detect::check_block_break(&store, &ev).is_none());
        }

        let trail = store.record_mining_location("Digger", Position::new(0.0, 50.0, 0.0));
        assert_eq!(trail.len(), MINING_TRAIL_CAP);
    }

    /// Many producers hammering different player keys concurrently: every
    /// player's window stays internally consistent and no entries leak
    /// between players.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_different_players() {
        let store = Arc::new(PlayerStateStore::new());
        let mut handles = Vec::new();

        for p in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let player = format!("Player{}", p);
                for i in 0..200u64 {
                    // All timestamps inside one window: size must equal the
                    // number of this player's own events so far.
                    let window = store.record_attack(&player, 1_000 + i);
                    assert_eq!(window, (i + 1) as usize);
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.tracked_players(), 8);
    }

    /// Concurrent mining producers never corrupt each other's trails.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_mining_trails_stay_isolated() {
        let store = Arc::new(PlayerStateStore::new());
        let mut handles = Vec::new();

        for p in 0..6 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let player = format!("Miner{}", p);
                let mut trail = Vec::new();
                for i in 0..30 {
                    trail = store
                        .record_mining_location(&player, Position::new(i as f64, p as f64, 0.0));
                }
                // The final trail holds only this player's y level.
                assert_eq!(trail.len(), MINING_TRAIL_CAP);
                assert!(trail.iter().all(|pos| pos.y == p as f64));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }
}

/// BROADCAST FAN-OUT UNDER LOAD
mod hub_stress {
    use super::*;

    #[test]
    fn broadcast_to_many_observers() {
        let hub = ObserverHub::new();
        let mut receivers = Vec::new();

        for _ in 0..50 {
            let (tx, rx) = mpsc::unbounded_channel();
            let id = hub.register(tx);
            hub.mark_open(id);
            receivers.push(rx);
        }

        assert_eq!(hub.broadcast("STATUS:0||0"), 50);
        for rx in &mut receivers {
            assert_eq!(rx.try_recv().unwrap(), "STATUS:0||0");
        }
    }

    #[test]
    fn broadcast_survives_a_batch_of_dead_observers() {
        let hub = ObserverHub::new();
        let mut alive = Vec::new();

        for i in 0..50 {
            let (tx, rx) = mpsc::unbounded_channel();
            let id = hub.register(tx);
            hub.mark_open(id);
            // Every fifth observer is dead: its receiver is dropped.
            if i % 5 == 0 {
                drop(rx);
            } else {
                alive.push(rx);
            }
        }

        assert_eq!(hub.broadcast("alert"), 40);
        assert_eq!(hub.len(), 40);
        for rx in &mut alive {
            assert_eq!(rx.try_recv().unwrap(), "alert");
        }

        // A second broadcast sees a clean set.
        assert_eq!(hub.broadcast("again"), 40);
    }

    /// Broadcasts from several tasks at once: each open observer receives
    /// every line exactly once.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_broadcasts_deliver_everything() {
        let hub = Arc::new(ObserverHub::new());
        let mut receivers = Vec::new();

        for _ in 0..10 {
            let (tx, rx) = mpsc::unbounded_channel();
            let id = hub.register(tx);
            hub.mark_open(id);
            receivers.push(rx);
        }

        let mut handles = Vec::new();
        for t in 0..4 {
            let hub = Arc::clone(&hub);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    hub.broadcast(&format!("line-{}-{}", t, i));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for rx in &mut receivers {
            let mut count = 0;
            while rx.try_recv().is_ok() {
                count += 1;
            }
            assert_eq!(count, 100);
        }
    }
}
