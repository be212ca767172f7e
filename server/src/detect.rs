//! The three behavioral heuristics: flight, rapid attack, mining pattern.
//!
//! Each check reads and updates one player's state through the store and
//! returns a verdict. None of them performs I/O or blocks; a player whose
//! bypass capability is set never produces a verdict from any of them.

use crate::state::PlayerStateStore;
use shared::{
    AlertCategory, AlertEvent, AttackEvent, BlockBreakEvent, BlockKind, MovementEvent,
    MAX_ATTACKS_PER_SECOND, MAX_MINING_DISTANCE, MAX_VERTICAL_SPEED,
};

/// The block kind the mining heuristic tracks; all others are ignored.
pub const TARGET_BLOCK: BlockKind = BlockKind::DiamondOre;

/// Trail length from which the linearity check runs.
const MIN_PATTERN_LEN: usize = 3;

/// Flight check: an airborne ascent with no footing beneath it whose
/// vertical gain against the *stored* last position exceeds the legitimate
/// maximum. Exempt movement modes skip detection entirely, including the
/// last-position update, so an exempt flight never becomes the baseline for
/// the next comparison. Re-triggers on every qualifying event.
pub fn check_movement(store: &PlayerStateStore, ev: &MovementEvent) -> Option<AlertEvent> {
    if ev.exemptions.any() {
        return None;
    }

    let prev = store.update_position(&ev.player, ev.to)?;

    if ev.to.y <= ev.from.y {
        return None;
    }

    let vertical_delta = ev.to.y - prev.y;
    if vertical_delta > MAX_VERTICAL_SPEED && !ev.on_ground && ev.block_below_empty {
        Some(AlertEvent::now(
            ev.player.clone(),
            AlertCategory::Flight,
            ev.to,
        ))
    } else {
        None
    }
}

/// Rapid-attack check over a trailing one-second window. Attacks involving
/// non-player entities on either side are ignored. The window is pruned
/// lazily on each event; once its size exceeds the threshold, every further
/// above-rate attack re-triggers until the rate drops.
pub fn check_attack(store: &PlayerStateStore, ev: &AttackEvent) -> Option<AlertEvent> {
    let attacker = ev.attacker.as_deref()?;
    ev.defender.as_deref()?;
    if ev.bypass {
        return None;
    }

    let window = store.record_attack(attacker, ev.timestamp_ms);
    if window > MAX_ATTACKS_PER_SECOND {
        Some(AlertEvent::now(
            attacker.to_string(),
            AlertCategory::CombatAnomaly,
            ev.location,
        ))
    } else {
        None
    }
}

/// X-Ray-style mining check. Only target-block breaks enter the trail. From
/// the third entry onward the most recent three are examined pairwise: a
/// verdict fires when both adjacent pairs are closer than the distance
/// threshold *and* on the same vertical level, i.e. three recent finds on a
/// short flat line.
pub fn check_block_break(store: &PlayerStateStore, ev: &BlockBreakEvent) -> Option<AlertEvent> {
    if ev.bypass || ev.block != TARGET_BLOCK {
        return None;
    }

    let trail = store.record_mining_location(&ev.player, ev.location);
    if trail.len() < MIN_PATTERN_LEN {
        return None;
    }

    let recent = &trail[trail.len() - MIN_PATTERN_LEN..];
    let suspicious = recent
        .windows(2)
        .all(|pair| pair[0].distance(&pair[1]) < MAX_MINING_DISTANCE && pair[0].y == pair[1].y);

    if suspicious {
        Some(AlertEvent::now(
            ev.player.clone(),
            AlertCategory::MiningPattern,
            ev.location,
        ))
    } else {
        None
    }
}
