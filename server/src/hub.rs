//! Observer connection set and broadcast fan-out.
//!
//! The hub owns every observer connection's outbound queue and nothing
//! else; transport I/O lives in the network layer. Each connection walks
//! `Connecting -> Open -> Closed`: it is registered as `Connecting`, marked
//! `Open` once its writer task is running, and removed on disconnect or
//! error. Delivery failures are isolated per connection: a dead observer is
//! dropped from the set without affecting the rest of a broadcast.

use dashmap::DashMap;
use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Lifecycle of one observer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug)]
struct Observer {
    state: ConnectionState,
    sender: mpsc::UnboundedSender<String>,
}

/// Concurrent registry of observer connections.
#[derive(Debug, Default)]
pub struct ObserverHub {
    observers: DashMap<u64, Observer>,
    next_id: AtomicU64,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection in `Connecting` state and returns its id.
    /// `sender` is the head of the connection's outbound line queue.
    pub fn register(&self, sender: mpsc::UnboundedSender<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.observers.insert(
            id,
            Observer {
                state: ConnectionState::Connecting,
                sender,
            },
        );
        id
    }

    /// Moves a connection to `Open`; it now participates in broadcasts.
    pub fn mark_open(&self, id: u64) {
        if let Some(mut observer) = self.observers.get_mut(&id) {
            observer.state = ConnectionState::Open;
            info!("Observer {} is open", id);
        }
    }

    /// Moves a connection to `Closed`. It stops receiving broadcasts
    /// immediately even if removal is still pending on another task.
    pub fn mark_closed(&self, id: u64) {
        if let Some(mut observer) = self.observers.get_mut(&id) {
            observer.state = ConnectionState::Closed;
        }
    }

    /// Removes a connection from the set. Idempotent; returns whether the
    /// connection was still present.
    pub fn remove(&self, id: u64) -> bool {
        if self.observers.remove(&id).is_some() {
            info!("Observer {} disconnected", id);
            true
        } else {
            false
        }
    }

    /// Sends a line to every `Open` observer and returns the delivery count.
    /// A failed send marks that observer dead and drops it; the remaining
    /// observers still receive the line.
    pub fn broadcast(&self, line: &str) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for entry in self.observers.iter() {
            if entry.state != ConnectionState::Open {
                continue;
            }
            if entry.sender.send(line.to_string()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*entry.key());
            }
        }

        for id in dead {
            warn!("Observer {} unreachable, dropping from broadcast set", id);
            self.observers.remove(&id);
        }

        delivered
    }

    /// Sends a line to a single observer, for query replies. The observer is
    /// dropped if its queue is gone.
    pub fn send_to(&self, id: u64, line: &str) -> bool {
        let failed = match self.observers.get(&id) {
            Some(observer) => observer.sender.send(line.to_string()).is_err(),
            None => return false,
        };

        if failed {
            warn!("Observer {} unreachable, dropping", id);
            self.observers.remove(&id);
            return false;
        }
        true
    }

    /// Number of registered connections (any state).
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
