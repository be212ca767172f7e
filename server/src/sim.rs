//! Randomized session simulator, a development harness for running the
//! server without a host engine: it seeds a small roster and feeds a mix of
//! ordinary and anomalous gameplay events through the dispatcher so
//! connected observers see live STATUS/ANTICHEAT/CHAT traffic.

use crate::directory::SessionDirectory;
use crate::dispatch::Dispatcher;
use log::info;
use rand::Rng;
use shared::{
    current_millis, AttackEvent, BlockBreakEvent, BlockKind, ChatEvent, GameEvent, MovementEvent,
    MovementExemptions, Position,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

const NAMES: [&str; 4] = ["Alice", "Bob", "Mallory", "Trent"];
const CHAT_LINES: [&str; 4] = [
    "anyone near spawn?",
    "found a cave system",
    "trading iron for food",
    "heading back to base",
];

/// Seeds the roster and emits one random event burst every few hundred
/// milliseconds. Anomalous patterns (steep ascents, attack bursts, flat ore
/// lines) are mixed in at a low rate so alerts show up without flooding.
pub async fn run_session_simulator(dispatcher: Arc<Dispatcher>, directory: Arc<SessionDirectory>) {
    for (i, name) in NAMES.iter().enumerate() {
        directory.join(name, 20 + i as u32 * 15);
        directory.set_inventory(
            name,
            vec!["STONE_PICKAXE".to_string(), "TORCH".to_string(), "BREAD".to_string()],
        );
    }
    info!("Session simulator running with {} players", NAMES.len());

    let mut timer = interval(Duration::from_millis(250));
    let mut altitudes = [64.0_f64; NAMES.len()];
    // Advancing x per player so "flat line" breaks form consecutive trails.
    let mut ore_lines = [0.0_f64; NAMES.len()];

    loop {
        timer.tick().await;

        let events = {
            let mut rng = rand::thread_rng();
            let who = rng.gen_range(0..NAMES.len());
            let name = NAMES[who];

            match rng.gen_range(0..4) {
                0 => {
                    let cheating = rng.gen_bool(0.2);
                    let climb = if cheating { 2.5 } else { 0.4 };
                    let from = Position::new(rng.gen_range(-50.0..50.0), altitudes[who], 0.0);
                    let to = Position::new(from.x + 1.0, from.y + climb, from.z + 1.0);
                    altitudes[who] = to.y.min(120.0);

                    vec![GameEvent::Movement(MovementEvent {
                        player: name.to_string(),
                        from,
                        to,
                        exemptions: MovementExemptions::default(),
                        on_ground: !cheating,
                        block_below_empty: cheating,
                    })]
                }
                1 => {
                    let burst = if rng.gen_bool(0.15) { 8 } else { 2 };
                    let base = current_millis();
                    (0..burst)
                        .map(|i| {
                            GameEvent::Attack(AttackEvent {
                                attacker: Some(name.to_string()),
                                defender: Some(NAMES[(who + 1) % NAMES.len()].to_string()),
                                bypass: false,
                                timestamp_ms: base + i * 50,
                                location: Position::new(0.0, 64.0, 0.0),
                            })
                        })
                        .collect()
                }
                2 => {
                    let flat_line = rng.gen_bool(0.15);
                    let (x, y) = if flat_line {
                        ore_lines[who] += 2.0;
                        (ore_lines[who], 12.0)
                    } else {
                        (
                            rng.gen_range(-100.0_f64..100.0).round(),
                            rng.gen_range(5.0_f64..40.0).round(),
                        )
                    };

                    vec![GameEvent::BlockBreak(BlockBreakEvent {
                        player: name.to_string(),
                        block: BlockKind::DiamondOre,
                        location: Position::new(x, y, 0.0),
                        bypass: false,
                    })]
                }
                _ => vec![GameEvent::Chat(ChatEvent {
                    player: name.to_string(),
                    message: CHAT_LINES[rng.gen_range(0..CHAT_LINES.len())].to_string(),
                })],
            }
        };

        for event in events {
            dispatcher.handle(event);
        }
    }
}
