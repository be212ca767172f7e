//! Text wire protocol for observer connections.
//!
//! Every message is one line: a colon-terminated type tag followed by
//! pipe-delimited fields. Outbound lines are produced by the server
//! (`STATUS:`, `ANTICHEAT:`, `INVENTORY:`, `CHAT:`); inbound lines are
//! observer queries (`INVENTORY:<name>`) and chat relay requests
//! (`CHAT:<sender>|<text>`). Anything else is a protocol error the caller
//! drops without closing the connection.

use crate::AlertEvent;
use thiserror::Error;

/// Reasons an inbound line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unrecognized message prefix")]
    UnknownPrefix,
    #[error("missing `{0}` field")]
    MissingField(&'static str),
}

/// Messages the server sends to observers.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    /// Periodic session snapshot: player count, names, average latency.
    Status {
        names: Vec<String>,
        avg_latency_ms: u64,
    },
    /// A detection verdict.
    Alert(AlertEvent),
    /// Reply to an inventory query; `None` means the player is offline.
    Inventory {
        player: String,
        items: Option<Vec<String>>,
    },
    /// In-game chat relayed to all observers.
    Chat { player: String, message: String },
}

impl OutboundMessage {
    /// Encodes the message as a single protocol line (no trailing newline).
    pub fn to_line(&self) -> String {
        match self {
            OutboundMessage::Status {
                names,
                avg_latency_ms,
            } => format!(
                "STATUS:{}|{}|{}",
                names.len(),
                names.join(", "),
                avg_latency_ms
            ),
            OutboundMessage::Alert(alert) => format!(
                "ANTICHEAT:{}|{}|{}|{}",
                alert.player,
                alert.category.wire_name(),
                alert.location.coords(),
                alert.at.format("%Y-%m-%d %H:%M:%S")
            ),
            OutboundMessage::Inventory { player, items } => {
                let payload = match items {
                    Some(items) => items.join(", "),
                    None => "Player not found".to_string(),
                };
                format!("INVENTORY:{}|{}", player, payload)
            }
            OutboundMessage::Chat { player, message } => {
                format!("CHAT:{}|{}", player, message)
            }
        }
    }
}

/// Messages observers send to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Inventory lookup, answered on the originating connection only.
    InventoryQuery { player: String },
    /// Relay a chat line into the game's own chat; never echoed on sockets.
    ChatRelay { sender: String, text: String },
}

impl InboundMessage {
    /// Parses one inbound line. Field counts are validated up front so a
    /// malformed relay payload is a parse error, not an indexing fault.
    pub fn parse(line: &str) -> Result<InboundMessage, ProtocolError> {
        if let Some(player) = line.strip_prefix("INVENTORY:") {
            if player.is_empty() {
                return Err(ProtocolError::MissingField("player"));
            }
            return Ok(InboundMessage::InventoryQuery {
                player: player.to_string(),
            });
        }

        if let Some(payload) = line.strip_prefix("CHAT:") {
            let (sender, text) = payload
                .split_once('|')
                .ok_or(ProtocolError::MissingField("text"))?;
            if sender.is_empty() {
                return Err(ProtocolError::MissingField("sender"));
            }
            return Ok(InboundMessage::ChatRelay {
                sender: sender.to_string(),
                text: text.to_string(),
            });
        }

        Err(ProtocolError::UnknownPrefix)
    }
}
