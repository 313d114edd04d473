//! Real-time update channel abstraction.
//!
//! The store consumes server-pushed events through this seam; the actual
//! transport (a WebSocket in production) lives outside this crate. Events
//! arrive as raw JSON and are validated into typed records by the consumer.
//!
//! [`LocalChannel`] is an in-process implementation backed by tokio
//! broadcast channels, used by embedders that bridge their own transport
//! and by the integration tests.

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{broadcast, watch};

/// Event name for server-side reservation updates.
pub const RESERVA_ACTUALIZADA: &str = "reserva_actualizada";

const EVENT_BUFFER: usize = 64;

pub trait RealtimeChannel: Send + Sync {
    /// Subscribe to a named event.
    fn subscribe(&self, event: &str) -> broadcast::Receiver<Value>;

    /// Connection state. Subscribers created before a disconnect may be
    /// closed by the transport; consumers re-subscribe on a false→true edge.
    fn connected(&self) -> watch::Receiver<bool>;
}

pub struct LocalChannel {
    topics: DashMap<String, broadcast::Sender<Value>>,
    connected_tx: watch::Sender<bool>,
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalChannel {
    /// A channel that starts connected.
    pub fn new() -> Self {
        let (connected_tx, _) = watch::channel(true);
        Self {
            topics: DashMap::new(),
            connected_tx,
        }
    }

    fn sender(&self, event: &str) -> broadcast::Sender<Value> {
        self.topics
            .entry(event.to_owned())
            .or_insert_with(|| broadcast::channel(EVENT_BUFFER).0)
            .clone()
    }

    /// Publish a payload to every subscriber of `event`.
    /// Returns the number of receivers the payload reached.
    pub fn publish(&self, event: &str, payload: Value) -> usize {
        self.sender(event).send(payload).unwrap_or(0)
    }

    /// Flip the connection state; subscribers observe the edge via
    /// [`RealtimeChannel::connected`].
    pub fn set_connected(&self, up: bool) {
        self.connected_tx.send_replace(up);
    }
}

impl RealtimeChannel for LocalChannel {
    fn subscribe(&self, event: &str) -> broadcast::Receiver<Value> {
        self.sender(event).subscribe()
    }

    fn connected(&self) -> watch::Receiver<bool> {
        self.connected_tx.subscribe()
    }
}
