//! Types shared between the anomaly-detection server and observer clients:
//! world coordinates, the gameplay event model consumed by the dispatcher,
//! alert events, and the text wire protocol in [`protocol`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub mod protocol;

/// Trailing window length for the rapid-attack heuristic.
pub const ATTACK_WINDOW_MS: u64 = 1_000;
/// Attacks per window above which a combat anomaly is flagged.
pub const MAX_ATTACKS_PER_SECOND: usize = 6;
/// Maximum pairwise distance between consecutive ore finds in a flagged trail.
pub const MAX_MINING_DISTANCE: f64 = 5.0;
/// Maximum legitimate vertical gain per movement event while airborne.
pub const MAX_VERTICAL_SPEED: f64 = 1.0;
/// Mining trail capacity; oldest entries are evicted first.
pub const MINING_TRAIL_CAP: usize = 10;

/// A world coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Coordinate string in the wire format: `<x>, <y>, <z>`.
    pub fn coords(&self) -> String {
        format!("{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Heuristic verdict categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCategory {
    Flight,
    CombatAnomaly,
    MiningPattern,
}

impl AlertCategory {
    /// Category name as sent on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            AlertCategory::Flight => "Fly",
            AlertCategory::CombatAnomaly => "KillAura",
            AlertCategory::MiningPattern => "X-Ray",
        }
    }
}

/// A single detection verdict. Constructed by a detector, consumed once by
/// the broadcast hub; never retried or deduplicated.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub player: String,
    pub category: AlertCategory,
    pub location: Position,
    pub at: chrono::NaiveDateTime,
}

impl AlertEvent {
    /// Builds an alert stamped with the current local time.
    pub fn now(player: String, category: AlertCategory, location: Position) -> Self {
        Self {
            player,
            category,
            location,
            at: chrono::Local::now().naive_local(),
        }
    }
}

/// Block kinds the event feed distinguishes. Only diamond ore is relevant to
/// the mining heuristic; everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Stone,
    Dirt,
    CoalOre,
    IronOre,
    DiamondOre,
}

/// Per-event capability flags that make a movement legitimate or exempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementExemptions {
    pub can_fly: bool,
    pub gliding: bool,
    pub levitating: bool,
    pub creative_or_spectator: bool,
    pub bypass: bool,
}

impl MovementExemptions {
    pub fn any(&self) -> bool {
        self.can_fly
            || self.gliding
            || self.levitating
            || self.creative_or_spectator
            || self.bypass
    }
}

#[derive(Debug, Clone)]
pub struct MovementEvent {
    pub player: String,
    pub from: Position,
    pub to: Position,
    pub exemptions: MovementExemptions,
    /// Whether the mover has solid footing at the destination.
    pub on_ground: bool,
    /// Whether the block directly beneath the destination is air.
    pub block_below_empty: bool,
}

#[derive(Debug, Clone)]
pub struct AttackEvent {
    /// Attacker name, `None` when the attacker is not a player.
    pub attacker: Option<String>,
    /// Defender name, `None` when the defender is not a player.
    pub defender: Option<String>,
    pub bypass: bool,
    /// Observation time in milliseconds; the window is pruned against this.
    pub timestamp_ms: u64,
    /// Attacker location, used for the alert payload.
    pub location: Position,
}

#[derive(Debug, Clone)]
pub struct BlockBreakEvent {
    pub player: String,
    pub block: BlockKind,
    pub location: Position,
    pub bypass: bool,
}

#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub player: String,
    pub message: String,
}

/// Tagged union of the gameplay events the dispatcher accepts. The host
/// engine (or the built-in simulator) produces these; the core has no
/// dependency on any particular callback mechanism.
#[derive(Debug, Clone)]
pub enum GameEvent {
    Movement(MovementEvent),
    Attack(AttackEvent),
    BlockBreak(BlockBreakEvent),
    Chat(ChatEvent),
}

/// Current wall-clock time in milliseconds.
pub fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}
