//! Seams to the host game engine: player roster/inventory lookup and the
//! game's own chat channel. The detection core and broadcast layer only see
//! these traits; the standalone binary and the tests plug in the in-memory
//! implementations below.

use dashmap::DashMap;
use log::info;

/// One roster row as the status ticker consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub latency_ms: u32,
}

/// Player lookup capability supplied by the host engine.
pub trait PlayerDirectory: Send + Sync {
    /// Currently online players, in a stable order.
    fn online_players(&self) -> Vec<RosterEntry>;

    /// Non-empty inventory slot names for an online player; `None` when the
    /// player is not online. A miss is not an error.
    fn inventory_of(&self, player: &str) -> Option<Vec<String>>;
}

/// Outlet into the game's own chat system.
pub trait ChatSink: Send + Sync {
    fn broadcast_message(&self, message: &str);
}

#[derive(Debug, Clone, Default)]
struct SessionPlayer {
    latency_ms: u32,
    inventory: Vec<String>,
}

/// In-memory roster backing the standalone server and the simulator.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    players: DashMap<String, SessionPlayer>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, name: &str, latency_ms: u32) {
        self.players.insert(
            name.to_string(),
            SessionPlayer {
                latency_ms,
                inventory: Vec::new(),
            },
        );
    }

    pub fn leave(&self, name: &str) {
        self.players.remove(name);
    }

    pub fn set_inventory(&self, name: &str, items: Vec<String>) {
        if let Some(mut player) = self.players.get_mut(name) {
            player.inventory = items;
        }
    }
}

impl PlayerDirectory for SessionDirectory {
    fn online_players(&self) -> Vec<RosterEntry> {
        let mut roster: Vec<RosterEntry> = self
            .players
            .iter()
            .map(|entry| RosterEntry {
                name: entry.key().clone(),
                latency_ms: entry.latency_ms,
            })
            .collect();
        // Map iteration order is arbitrary; status lines should be stable.
        roster.sort_by(|a, b| a.name.cmp(&b.name));
        roster
    }

    fn inventory_of(&self, player: &str) -> Option<Vec<String>> {
        self.players.get(player).map(|p| p.inventory.clone())
    }
}

/// Chat sink for running without a host engine: lines go to the server log.
#[derive(Debug, Default)]
pub struct LogChat;

impl ChatSink for LogChat {
    fn broadcast_message(&self, message: &str) {
        info!("[game-chat] {}", message);
    }
}
