use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dto::{sse::ServerEvent, ws::ViewerOutboundMessage};

#[derive(Clone)]
struct ViewerConnection {
    id: Uuid,
    tx: mpsc::UnboundedSender<Message>,
}

/// Fan-out point for everything viewers receive.
///
/// WebSocket viewers are registered individually; SSE viewers subscribe to a
/// lossy broadcast channel. Publishing never waits on either.
pub struct ViewerHub {
    sse: broadcast::Sender<ServerEvent>,
    sockets: DashMap<Uuid, ViewerConnection>,
}

impl ViewerHub {
    /// Construct a hub whose SSE channel buffers `sse_capacity` events per subscriber.
    pub fn new(sse_capacity: usize) -> Self {
        let (sse, _receiver) = broadcast::channel(sse_capacity);
        Self {
            sse,
            sockets: DashMap::new(),
        }
    }

    /// Register a new SSE subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sse.subscribe()
    }

    /// Register a WebSocket viewer and return its connection id.
    pub fn register(&self, tx: mpsc::UnboundedSender<Message>) -> Uuid {
        let id = Uuid::new_v4();
        self.sockets.insert(id, ViewerConnection { id, tx });
        id
    }

    /// Queue `first` on `tx`, then register it as a WebSocket viewer.
    ///
    /// Returns `None`, leaving the hub untouched, when the writer is already closed.
    pub fn register_with(
        &self,
        tx: mpsc::UnboundedSender<Message>,
        first: &ViewerOutboundMessage,
    ) -> Option<Uuid> {
        match serde_json::to_string(first) {
            Ok(payload) => tx.send(Message::Text(payload.into())).ok()?,
            Err(err) => warn!(error = %err, "failed to serialize first viewer frame"),
        }
        Some(self.register(tx))
    }

    /// Forget a WebSocket viewer.
    pub fn unregister(&self, id: &Uuid) {
        self.sockets.remove(id);
    }

    /// Number of registered WebSocket viewers.
    pub fn socket_count(&self) -> usize {
        self.sockets.len()
    }

    /// Number of live SSE subscribers.
    pub fn sse_count(&self) -> usize {
        self.sse.receiver_count()
    }

    /// Send `message` to every viewer on both transports.
    pub fn publish(&self, message: &ViewerOutboundMessage) {
        match to_server_event(message) {
            Ok(event) => {
                let _ = self.sse.send(event);
            }
            Err(err) => warn!(error = %err, "failed to serialize SSE payload"),
        }

        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to serialize viewer frame");
                return;
            }
        };

        let mut closed = Vec::new();
        for connection in self.sockets.iter() {
            if connection
                .tx
                .send(Message::Text(payload.clone().into()))
                .is_err()
            {
                closed.push(connection.id);
            }
        }

        // Removal must wait until the iterator above releases its shard locks.
        for id in closed {
            debug!(viewer = %id, "dropping viewer with closed writer");
            self.sockets.remove(&id);
        }
    }
}

/// Encode a viewer frame as an SSE event named after its `type`.
pub fn to_server_event(message: &ViewerOutboundMessage) -> serde_json::Result<ServerEvent> {
    match message {
        ViewerOutboundMessage::State(snapshot) => {
            ServerEvent::json(Some("state".to_string()), snapshot)
        }
        ViewerOutboundMessage::StartEffect => Ok(ServerEvent::new(
            Some("start-effect".to_string()),
            "{}".to_string(),
        )),
        ViewerOutboundMessage::PrankEffect => Ok(ServerEvent::new(
            Some("prank-effect".to_string()),
            "{}".to_string(),
        )),
        ViewerOutboundMessage::Ack(ack) => ServerEvent::json(Some("ack".to_string()), ack),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dto::timer::TimerSnapshot, state::timer::TimerState};

    fn text(message: Message) -> String {
        match message {
            Message::Text(text) => text.as_str().to_owned(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[test]
    fn publish_reaches_every_socket_and_subscriber() {
        let hub = ViewerHub::new(8);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        hub.register(tx_a);
        hub.register(tx_b);
        let mut sse = hub.subscribe();

        hub.publish(&ViewerOutboundMessage::PrankEffect);

        assert_eq!(text(rx_a.try_recv().unwrap()), r#"{"type":"prank-effect"}"#);
        assert_eq!(text(rx_b.try_recv().unwrap()), r#"{"type":"prank-effect"}"#);
        let event = sse.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("prank-effect"));
    }

    #[test]
    fn publish_drops_closed_sockets() {
        let hub = ViewerHub::new(8);
        let (tx_open, _rx_open) = mpsc::unbounded_channel();
        let (tx_closed, rx_closed) = mpsc::unbounded_channel();
        hub.register(tx_open);
        hub.register(tx_closed);
        drop(rx_closed);
        assert_eq!(hub.socket_count(), 2);

        hub.publish(&ViewerOutboundMessage::StartEffect);
        assert_eq!(hub.socket_count(), 1);
    }

    #[test]
    fn publish_without_listeners_is_harmless() {
        let hub = ViewerHub::new(8);
        hub.publish(&ViewerOutboundMessage::State(TimerSnapshot::capture(
            &TimerState::new(),
            0,
        )));
        assert_eq!(hub.socket_count(), 0);
        assert_eq!(hub.sse_count(), 0);
    }

    #[test]
    fn register_with_queues_first_frame_before_broadcasts() {
        let hub = ViewerHub::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register_with(tx, &ViewerOutboundMessage::StartEffect).unwrap();
        hub.publish(&ViewerOutboundMessage::PrankEffect);

        assert_eq!(text(rx.try_recv().unwrap()), r#"{"type":"start-effect"}"#);
        assert_eq!(text(rx.try_recv().unwrap()), r#"{"type":"prank-effect"}"#);
    }

    #[test]
    fn register_with_skips_closed_writer() {
        let hub = ViewerHub::new(8);
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        assert!(hub.register_with(tx, &ViewerOutboundMessage::StartEffect).is_none());
        assert_eq!(hub.socket_count(), 0);
    }

    #[test]
    fn unregister_forgets_socket() {
        let hub = ViewerHub::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx);
        hub.unregister(&id);
        hub.publish(&ViewerOutboundMessage::StartEffect);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn state_event_carries_snapshot_json() {
        let snapshot = TimerSnapshot::capture(&TimerState::new(), 7);
        let event = to_server_event(&ViewerOutboundMessage::State(snapshot)).unwrap();
        assert_eq!(event.event.as_deref(), Some("state"));
        assert!(event.data.contains(r#""serverTimeEpochMs":7"#));
    }
}
