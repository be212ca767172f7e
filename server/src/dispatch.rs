//! Event dispatcher: the single entry point through which the host engine
//! (or the simulator) feeds gameplay events into the detection core.
//!
//! Events for the same player must arrive here in observation order; the
//! store's per-key locking preserves that order into the sliding windows.
//! Verdicts fan out to the observer hub and into the game's own chat;
//! delivery is fire-and-forget.

use crate::detect;
use crate::directory::ChatSink;
use crate::hub::ObserverHub;
use crate::state::PlayerStateStore;
use log::info;
use shared::protocol::OutboundMessage;
use shared::{AlertEvent, GameEvent};
use std::sync::Arc;

pub struct Dispatcher {
    store: PlayerStateStore,
    hub: Arc<ObserverHub>,
    chat: Arc<dyn ChatSink>,
}

impl Dispatcher {
    pub fn new(hub: Arc<ObserverHub>, chat: Arc<dyn ChatSink>) -> Self {
        Self {
            store: PlayerStateStore::new(),
            hub,
            chat,
        }
    }

    /// The player state repository this dispatcher mutates.
    pub fn store(&self) -> &PlayerStateStore {
        &self.store
    }

    /// Routes one event to the matching detector or relay. Never blocks and
    /// never fails: a verdict is published, everything else is a no-op.
    pub fn handle(&self, event: GameEvent) {
        match event {
            GameEvent::Movement(ev) => self.publish(detect::check_movement(&self.store, &ev)),
            GameEvent::Attack(ev) => self.publish(detect::check_attack(&self.store, &ev)),
            GameEvent::BlockBreak(ev) => {
                self.publish(detect::check_block_break(&self.store, &ev))
            }
            GameEvent::Chat(ev) => {
                let line = OutboundMessage::Chat {
                    player: ev.player,
                    message: ev.message,
                }
                .to_line();
                self.hub.broadcast(&line);
            }
        }
    }

    fn publish(&self, alert: Option<AlertEvent>) {
        let Some(alert) = alert else { return };

        info!(
            "{} flagged for {} at {}",
            alert.player,
            alert.category.wire_name(),
            alert.location.coords()
        );
        self.hub.broadcast(&OutboundMessage::Alert(alert.clone()).to_line());
        self.chat.broadcast_message(&format!(
            "[Anticheat] {} is using {} at {}!",
            alert.player,
            alert.category.wire_name(),
            alert.location.coords()
        ));
    }
}
