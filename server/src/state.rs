//! Concurrent per-player sliding-window state.
//!
//! One [`PlayerState`] exists per player name, created lazily on the first
//! relevant event and kept until process end. The store is sharded by key:
//! events for different players never contend on a common lock, while two
//! events for the same player are serialized by the entry lock so a window
//! or trail is never corrupted by interleaving.

use dashmap::DashMap;
use shared::{Position, ATTACK_WINDOW_MS, MINING_TRAIL_CAP};
use std::collections::VecDeque;

/// Sliding-window state for one player.
#[derive(Debug, Default)]
pub struct PlayerState {
    /// Last observed coordinate; updated on every non-exempt movement event.
    last_position: Option<Position>,
    /// Attack timestamps inside the trailing window, pruned lazily on append.
    attack_times: Vec<u64>,
    /// Recent diamond-ore break locations, FIFO, at most `MINING_TRAIL_CAP`.
    mining_trail: VecDeque<Position>,
}

/// Repository of per-player state, safe for concurrent producers.
#[derive(Debug, Default)]
pub struct PlayerStateStore {
    players: DashMap<String, PlayerState>,
}

impl PlayerStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `pos` as the player's last position and returns the previous
    /// one, creating the state entry on first access.
    pub fn update_position(&self, player: &str, pos: Position) -> Option<Position> {
        let mut state = self.players.entry(player.to_string()).or_default();
        state.last_position.replace(pos)
    }

    /// Last recorded position without mutating anything.
    pub fn last_position(&self, player: &str) -> Option<Position> {
        self.players.get(player).and_then(|s| s.last_position)
    }

    /// Appends an attack timestamp, prunes everything older than the
    /// trailing window relative to `now_ms`, and returns the window size.
    /// Pruning retains entries at exactly `now - window`; only strictly
    /// older ones are dropped.
    pub fn record_attack(&self, player: &str, now_ms: u64) -> usize {
        let mut state = self.players.entry(player.to_string()).or_default();
        state.attack_times.push(now_ms);

        let cutoff = now_ms.saturating_sub(ATTACK_WINDOW_MS);
        state.attack_times.retain(|&t| t >= cutoff);
        state.attack_times.len()
    }

    /// Appends a mining location, evicting the oldest entry once the trail
    /// would exceed its cap, and returns a snapshot of the trail in order
    /// from oldest to newest.
    pub fn record_mining_location(&self, player: &str, pos: Position) -> Vec<Position> {
        let mut state = self.players.entry(player.to_string()).or_default();
        state.mining_trail.push_back(pos);
        if state.mining_trail.len() > MINING_TRAIL_CAP {
            state.mining_trail.pop_front();
        }
        state.mining_trail.iter().copied().collect()
    }

    /// Number of players with tracked state.
    pub fn tracked_players(&self) -> usize {
        self.players.len()
    }
}
