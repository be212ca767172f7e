//! Periodic session status broadcast.

use crate::directory::PlayerDirectory;
use crate::hub::ObserverHub;
use log::debug;
use shared::protocol::OutboundMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Broadcasts a `STATUS:` line every `period`, starting immediately. Runs
/// independently of detector activity and never consults player state.
pub async fn run_status_ticker(
    hub: Arc<ObserverHub>,
    directory: Arc<dyn PlayerDirectory>,
    period: Duration,
) {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        timer.tick().await;
        let line = status_line(directory.as_ref());
        let delivered = hub.broadcast(&line);
        debug!("Status tick delivered to {} observers", delivered);
    }
}

/// Formats the current session snapshot: player count, names, and the
/// integer average latency (zero for an empty roster).
pub fn status_line(directory: &dyn PlayerDirectory) -> String {
    let roster = directory.online_players();
    let avg_latency_ms = if roster.is_empty() {
        0
    } else {
        roster.iter().map(|p| u64::from(p.latency_ms)).sum::<u64>() / roster.len() as u64
    };

    OutboundMessage::Status {
        names: roster.into_iter().map(|p| p.name).collect(),
        avg_latency_ms,
    }
    .to_line()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::SessionDirectory;

    #[test]
    fn test_status_line_averages_latency() {
        let directory = SessionDirectory::new();
        directory.join("Alice", 20);
        directory.join("Bob", 61);

        // Integer division: (20 + 61) / 2 = 40.
        assert_eq!(status_line(&directory), "STATUS:2|Alice, Bob|40");
    }

    #[test]
    fn test_status_line_empty_session() {
        let directory = SessionDirectory::new();
        assert_eq!(status_line(&directory), "STATUS:0||0");
    }

    #[tokio::test]
    async fn test_ticker_broadcasts_periodically() {
        let hub = Arc::new(ObserverHub::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let id = hub.register(tx);
        hub.mark_open(id);

        let directory = Arc::new(SessionDirectory::new());
        directory.join("Alice", 10);

        let ticker = tokio::spawn(run_status_ticker(
            Arc::clone(&hub),
            directory as Arc<dyn PlayerDirectory>,
            Duration::from_millis(10),
        ));

        // The first tick fires immediately, further ones on the interval.
        let first = tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("no status line before timeout")
            .unwrap();
        assert_eq!(first, "STATUS:1|Alice|10");

        let second = tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("no second status line")
            .unwrap();
        assert_eq!(second, "STATUS:1|Alice|10");

        ticker.abort();
    }
}
