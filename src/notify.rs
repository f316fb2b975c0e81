// User-facing status messages
//
// Operations report progress through a Notifier. The CLI prints them through
// tracing; a front-end can subscribe to a ChannelNotifier instead.

use std::sync::Mutex;
use tokio::sync::broadcast;

/// Receives human-readable status strings. Side-effect only.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Emits every message as an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(target: "yuzu_manager::notify", "{}", message);
    }
}

/// Broadcasts messages to any number of subscribers.
pub struct ChannelNotifier {
    tx: broadcast::Sender<String>,
}

impl ChannelNotifier {
    /// Create a notifier buffering up to `capacity` undelivered messages
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str) {
        // No subscribers is fine
        let _ = self.tx.send(message.to_string());
    }
}

/// Keeps every message in memory. Handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_delivers() {
        let notifier = ChannelNotifier::new(8);
        let mut rx = notifier.subscribe();
        notifier.notify("Downloading eden...");
        assert_eq!(rx.try_recv().unwrap(), "Downloading eden...");
    }

    #[test]
    fn test_channel_notifier_without_subscribers() {
        let notifier = ChannelNotifier::new(1);
        notifier.notify("nobody listens");
    }

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify("a");
        notifier.notify("b");
        assert_eq!(notifier.messages(), vec!["a", "b"]);
    }
}
