//! Mock realtime transport.
//!
//! Never opens a socket: `connect` fakes the OPEN event after a fixed delay and
//! `send` only measures and logs what would have been transmitted.

mod registry;

pub use registry::ListenerId;

use serde::Serialize;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio_util::sync::CancellationToken;

use registry::ListenerRegistry;

pub const CONNECT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ConnectionEvent {
    Open,
    Close,
}

/// `{ "type": kind, ...payload }`
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl OutboundMessage {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: serde_json::Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendStats {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub last_sent_bytes: usize,
}

struct ConnectionInner {
    connected: AtomicBool,
    listeners: ListenerRegistry,
    stats: Mutex<SendStats>,
    shutdown: CancellationToken,
}

impl ConnectionInner {
    fn notify(&self, event: ConnectionEvent) {
        for listener in self.listeners.snapshot() {
            listener(&event);
        }
    }
}

/// Explicitly constructed and shared through `Arc`; call [`Connection::shutdown`]
/// when the owning session ends.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                connected: AtomicBool::new(false),
                listeners: ListenerRegistry::default(),
                stats: Mutex::new(SendStats::default()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Must be called from within a tokio runtime. Duplicate calls each schedule their own OPEN.
    pub fn connect(&self, url: &str) {
        log::info!("[MockConnection] Connecting to {url}...");

        let inner = Arc::clone(&self.inner);
        let url = url.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(CONNECT_DELAY) => {
                    inner.connected.store(true, Ordering::SeqCst);
                    log::info!("[MockConnection] Connected successfully to {url}");
                    inner.notify(ConnectionEvent::Open);
                }
                _ = inner.shutdown.cancelled() => {
                    log::debug!("[MockConnection] connect to {url} abandoned on shutdown");
                }
            }
        });
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Returns the serialized size, or `None` when not connected.
    pub fn send(&self, message: &OutboundMessage) -> Option<usize> {
        if !self.is_connected() {
            log::warn!("[MockConnection] Cannot send: Not connected.");
            return None;
        }

        let size = match serde_json::to_string(message) {
            Ok(serialized) => serialized.len(),
            Err(err) => {
                log::warn!("[MockConnection] Cannot serialize {} message: {err}", message.kind);
                return None;
            }
        };

        {
            let mut stats = self
                .inner
                .stats
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            stats.messages_sent += 1;
            stats.bytes_sent += size as u64;
            stats.last_sent_bytes = size;
        }

        log::info!("[MockConnection] Sending message: {} ({size} bytes)", message.kind);
        Some(size)
    }

    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&ConnectionEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.insert(Arc::new(callback))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    pub fn disconnect(&self) {
        if self.inner.connected.swap(false, Ordering::SeqCst) {
            log::info!("[MockConnection] Disconnecting...");
            self.inner.notify(ConnectionEvent::Close);
        }
    }

    pub fn stats(&self) -> SendStats {
        *self
            .inner
            .stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Abandons pending connects, disconnects, and drops every listener.
    /// A shut down connection never opens again.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.disconnect();
        self.inner.listeners.clear();
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(connection: &Connection) -> (ListenerId, Arc<Mutex<Vec<ConnectionEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let id = connection.subscribe(move |event| sink.lock().unwrap().push(*event));
        (id, events)
    }

    fn frame_message() -> OutboundMessage {
        OutboundMessage::new("FRAME").with("studentId", "S1").with("bytes", 1024)
    }

    #[tokio::test(start_paused = true)]
    async fn send_before_open_changes_nothing() {
        let connection = Connection::new();
        let (_, events) = recorder(&connection);

        connection.connect("ws://localhost:8000/ws/student");
        assert_eq!(connection.send(&frame_message()), None);
        assert_eq!(connection.stats(), SendStats::default());
        assert!(events.lock().unwrap().is_empty());
        assert!(!connection.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn opens_after_delay_and_measures_sends() {
        let connection = Connection::new();
        let (_, events) = recorder(&connection);

        connection.connect("ws://localhost:8000/ws/student");
        tokio::time::sleep(CONNECT_DELAY + Duration::from_millis(1)).await;

        assert!(connection.is_connected());
        assert_eq!(*events.lock().unwrap(), vec![ConnectionEvent::Open]);

        let message = frame_message();
        let expected = serde_json::to_string(&message).unwrap().len();
        assert_eq!(connection.send(&message), Some(expected));

        let stats = connection.stats();
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.last_sent_bytes, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_notifies_once() {
        let connection = Connection::new();
        let (_, events) = recorder(&connection);

        connection.disconnect();
        assert!(events.lock().unwrap().is_empty());

        connection.connect("ws://test");
        tokio::time::sleep(CONNECT_DELAY * 2).await;
        connection.disconnect();
        connection.disconnect();

        assert_eq!(
            *events.lock().unwrap(),
            vec![ConnectionEvent::Open, ConnectionEvent::Close]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribed_listeners_stop_receiving() {
        let connection = Connection::new();
        let (first, first_events) = recorder(&connection);
        let (_, second_events) = recorder(&connection);

        assert!(connection.unsubscribe(first));
        assert!(!connection.unsubscribe(first));
        assert_eq!(connection.listener_count(), 1);

        connection.connect("ws://test");
        tokio::time::sleep(CONNECT_DELAY * 2).await;

        assert!(first_events.lock().unwrap().is_empty());
        assert_eq!(*second_events.lock().unwrap(), vec![ConnectionEvent::Open]);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_abandons_pending_connect() {
        let connection = Connection::new();
        let (_, events) = recorder(&connection);

        connection.connect("ws://test");
        connection.shutdown();
        tokio::time::sleep(CONNECT_DELAY * 2).await;

        assert!(!connection.is_connected());
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(connection.listener_count(), 0);
    }

    #[test]
    fn message_flattens_payload_next_to_type() {
        let value = serde_json::to_value(frame_message()).unwrap();
        assert_eq!(value["type"], "FRAME");
        assert_eq!(value["studentId"], "S1");
        assert_eq!(value["bytes"], 1024);
    }
}
