//! Observer transport: line-framed TCP connections.
//!
//! One reader task and one writer task per connection. The writer drains the
//! connection's queue so one slow observer never stalls a broadcast; the
//! reader parses inbound queries and relay requests. A malformed line is
//! dropped and logged, a transport error closes only that connection.

use crate::directory::{ChatSink, PlayerDirectory};
use crate::hub::ObserverHub;
use log::{debug, error, info};
use shared::protocol::{InboundMessage, OutboundMessage};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Accepts observer connections and services them until shutdown.
pub struct ObserverServer {
    listener: TcpListener,
    hub: Arc<ObserverHub>,
    directory: Arc<dyn PlayerDirectory>,
    chat: Arc<dyn ChatSink>,
}

impl ObserverServer {
    pub async fn bind(
        addr: &str,
        hub: Arc<ObserverHub>,
        directory: Arc<dyn PlayerDirectory>,
        chat: Arc<dyn ChatSink>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Observer server listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            hub,
            directory,
            chat,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop; each connection runs on its own tasks.
    pub async fn run(self) -> std::io::Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let hub = Arc::clone(&self.hub);
            let directory = Arc::clone(&self.directory);
            let chat = Arc::clone(&self.chat);

            tokio::spawn(async move {
                handle_connection(stream, addr, hub, directory, chat).await;
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    hub: Arc<ObserverHub>,
    directory: Arc<dyn PlayerDirectory>,
    chat: Arc<dyn ChatSink>,
) {
    let (reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel::<String>();

    let id = hub.register(tx);
    info!("Observer {} connected from {}", id, addr);

    let writer_task = tokio::spawn(write_lines(id, writer, rx, Arc::clone(&hub)));
    hub.mark_open(id);

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim_end();
                if !line.is_empty() {
                    handle_inbound(id, line, &hub, directory.as_ref(), chat.as_ref());
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Observer {}: read failed: {}", id, e);
                break;
            }
        }
    }

    hub.mark_closed(id);
    hub.remove(id);
    writer_task.abort();
}

/// Drains one connection's outbound queue onto its socket. On a write error
/// the connection is closed out of the broadcast set; other connections are
/// unaffected.
async fn write_lines(
    id: u64,
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<String>,
    hub: Arc<ObserverHub>,
) {
    while let Some(line) = rx.recv().await {
        let framed = format!("{}\n", line);
        if let Err(e) = writer.write_all(framed.as_bytes()).await {
            error!("Observer {}: write failed: {}", id, e);
            hub.mark_closed(id);
            hub.remove(id);
            break;
        }
    }
}

/// Handles one inbound line. Parse failures are isolated to the line: they
/// are logged and dropped, the connection stays open.
fn handle_inbound(
    id: u64,
    line: &str,
    hub: &ObserverHub,
    directory: &dyn PlayerDirectory,
    chat: &dyn ChatSink,
) {
    match InboundMessage::parse(line) {
        Ok(InboundMessage::InventoryQuery { player }) => {
            let items = directory.inventory_of(&player);
            let reply = OutboundMessage::Inventory { player, items }.to_line();
            hub.send_to(id, &reply);
        }
        Ok(InboundMessage::ChatRelay { sender, text }) => {
            chat.broadcast_message(&format!("[{}]: {}", sender, text));
        }
        Err(e) => {
            debug!("Observer {}: dropping inbound line ({}): {:?}", id, e, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::SessionDirectory;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingChat {
        lines: Mutex<Vec<String>>,
    }

    impl ChatSink for RecordingChat {
        fn broadcast_message(&self, message: &str) {
            self.lines.lock().unwrap().push(message.to_string());
        }
    }

    fn observer(hub: &ObserverHub) -> (u64, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = hub.register(tx);
        hub.mark_open(id);
        (id, rx)
    }

    #[test]
    fn test_inventory_query_replies_on_same_connection_only() {
        let hub = ObserverHub::new();
        let (id1, mut rx1) = observer(&hub);
        let (_id2, mut rx2) = observer(&hub);

        let directory = SessionDirectory::new();
        directory.join("Alice", 25);
        directory.set_inventory("Alice", vec!["DIAMOND_SWORD".to_string(), "TORCH".to_string()]);
        let chat = RecordingChat::default();

        handle_inbound(id1, "INVENTORY:Alice", &hub, &directory, &chat);

        assert_eq!(
            rx1.try_recv().unwrap(),
            "INVENTORY:Alice|DIAMOND_SWORD, TORCH"
        );
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_inventory_query_offline_player() {
        let hub = ObserverHub::new();
        let (id, mut rx) = observer(&hub);
        let directory = SessionDirectory::new();
        let chat = RecordingChat::default();

        handle_inbound(id, "INVENTORY:Ghost", &hub, &directory, &chat);

        assert_eq!(rx.try_recv().unwrap(), "INVENTORY:Ghost|Player not found");
    }

    #[test]
    fn test_chat_relay_goes_to_game_chat_not_sockets() {
        let hub = ObserverHub::new();
        let (id, mut rx) = observer(&hub);
        let directory = SessionDirectory::new();
        let chat = RecordingChat::default();

        handle_inbound(id, "CHAT:Watcher|hello players", &hub, &directory, &chat);

        assert!(rx.try_recv().is_err());
        assert_eq!(
            chat.lines.lock().unwrap().as_slice(),
            ["[Watcher]: hello players"]
        );
    }

    #[test]
    fn test_malformed_lines_keep_connection_open() {
        let hub = ObserverHub::new();
        let (id, mut rx) = observer(&hub);
        let directory = SessionDirectory::new();
        directory.join("Alice", 25);
        let chat = RecordingChat::default();

        handle_inbound(id, "CHAT:missing-delimiter", &hub, &directory, &chat);
        handle_inbound(id, "GIBBERISH", &hub, &directory, &chat);
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.len(), 1);

        // The connection still answers queries afterwards.
        handle_inbound(id, "INVENTORY:Alice", &hub, &directory, &chat);
        assert_eq!(rx.try_recv().unwrap(), "INVENTORY:Alice|");
    }
}
