//! In-process signal bus.
//!
//! Services emit a [`Signal`] after every successful storage write so that
//! views derived from the profile (cart badge, dashboard, server-sent event
//! streams) can re-read what changed instead of being handed the new state.
//!
//! Delivery is fan-out over a bounded `tokio::sync::broadcast` channel.
//! A subscriber that falls more than the buffer size behind receives
//! [`Signal::Resync`] and is expected to re-read everything it shows.

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

/// Number of signals buffered per subscriber before it is considered lagging.
const DEFAULT_CAPACITY: usize = 256;

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "kebab-case")]
pub enum Signal {
    /// The cart changed (line added, removed, re-quantified or cleared).
    CartUpdated,
    /// The session or the seller application inside it changed.
    UserUpdated,
    /// A storage key was written or removed.
    StorageChanged { key: String },
    /// Signals were dropped; re-read everything.
    Resync,
}

impl Signal {
    /// The wire name used for server-sent events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CartUpdated => "cart-updated",
            Self::UserUpdated => "user-updated",
            Self::StorageChanged { .. } => "storage-changed",
            Self::Resync => "resync",
        }
    }

    /// Whether this signal concerns the given storage key.
    ///
    /// [`Signal::Resync`] concerns every key.
    #[must_use]
    pub fn touches(&self, key: &str) -> bool {
        match self {
            Self::StorageChanged { key: changed } => changed == key,
            Self::Resync => true,
            Self::CartUpdated | Self::UserUpdated => false,
        }
    }
}

/// Publish/subscribe hub for [`Signal`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Signal>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus buffering `capacity` signals per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a signal to every current subscriber.
    ///
    /// Returns how many subscribers it was delivered to; having none is fine.
    pub fn emit(&self, signal: Signal) -> usize {
        tracing::trace!(signal = signal.name(), "emit");
        self.tx.send(signal).unwrap_or(0)
    }

    /// Receive every signal emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Run `callback` on a background task for each signal passing `filter`.
    ///
    /// [`Signal::Resync`] always passes. Dropping the returned handle
    /// unsubscribes. Must be called from within a tokio runtime.
    pub fn listen<P, F>(&self, filter: P, callback: F) -> ListenerHandle
    where
        P: Fn(&Signal) -> bool + Send + 'static,
        F: FnMut(Signal) + Send + 'static,
    {
        self.subscribe().listen(filter, callback)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live subscription; dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<Signal>,
}

impl Subscription {
    /// Wait for the next signal. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Signal> {
        match self.rx.recv().await {
            Ok(signal) => Some(signal),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Subscriber lagged, requesting resync");
                Some(Signal::Resync)
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Take the next pending signal without waiting.
    pub fn try_recv(&mut self) -> Option<Signal> {
        match self.rx.try_recv() {
            Ok(signal) => Some(signal),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Subscriber lagged, requesting resync");
                Some(Signal::Resync)
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    /// Consume the subscription as a stream, turning lag into [`Signal::Resync`].
    pub fn into_stream(self) -> impl Stream<Item = Signal> + Send + 'static {
        BroadcastStream::new(self.rx).map(|item| item.unwrap_or(Signal::Resync))
    }

    /// Hand the subscription to a background task running `callback`.
    ///
    /// See [`EventBus::listen`].
    pub fn listen<P, F>(mut self, filter: P, mut callback: F) -> ListenerHandle
    where
        P: Fn(&Signal) -> bool + Send + 'static,
        F: FnMut(Signal) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(signal) = self.recv().await {
                if signal == Signal::Resync || filter(&signal) {
                    callback(signal);
                }
            }
        });
        ListenerHandle { task }
    }
}

/// Owner of a background listener; dropping it stops the listener.
#[derive(Debug)]
pub struct ListenerHandle {
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Whether the listener task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(Signal::CartUpdated), 0);
    }

    #[test]
    fn test_subscribers_only_see_later_signals() {
        let bus = EventBus::new();
        bus.emit(Signal::UserUpdated);

        let mut sub = bus.subscribe();
        assert_eq!(bus.emit(Signal::CartUpdated), 1);
        assert_eq!(sub.try_recv(), Some(Signal::CartUpdated));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_lagging_subscriber_gets_resync() {
        let bus = EventBus::with_capacity(2);
        let mut sub = bus.subscribe();
        for _ in 0..5 {
            bus.emit(Signal::CartUpdated);
        }
        assert_eq!(sub.try_recv(), Some(Signal::Resync));
    }

    #[test]
    fn test_signal_names_and_touches() {
        let changed = Signal::StorageChanged {
            key: "cart".to_string(),
        };
        assert_eq!(changed.name(), "storage-changed");
        assert!(changed.touches("cart"));
        assert!(!changed.touches("user"));
        assert!(Signal::Resync.touches("user"));
        assert!(!Signal::CartUpdated.touches("cart"));
        assert_eq!(
            serde_json::to_value(&changed).unwrap(),
            serde_json::json!({"signal": "storage-changed", "key": "cart"})
        );
    }

    #[tokio::test]
    async fn test_listen_filters_and_stops_on_drop() {
        let bus = EventBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = bus.listen(
            |signal| *signal == Signal::CartUpdated,
            move |signal| {
                let _ = tx.send(signal);
            },
        );

        bus.emit(Signal::UserUpdated);
        bus.emit(Signal::CartUpdated);
        let got = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(got, Some(Signal::CartUpdated));

        drop(handle);
        for _ in 0..10 {
            if bus.subscriber_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(bus.subscriber_count(), 0);
    }
}
