use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    dto::{command::ControllerMessage, ws::ViewerOutboundMessage},
    services::timer_service,
    state::SharedState,
};

/// Failure to queue a frame for a socket.
#[derive(Debug, Error)]
pub enum SendError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Handle the full lifecycle of a viewer WebSocket connection.
///
/// Every socket is a viewer; any text frame it sends is treated as a controller
/// command whose acknowledgement goes back to this socket only.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let Some(viewer_id) = state.connect_viewer(outbound_tx.clone()).await else {
        info!("connection closed before initial snapshot");
        finalize(writer_task, outbound_tx).await;
        return;
    };
    info!(viewer = %viewer_id, "viewer connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let command = ControllerMessage::from_json_str(&text).unwrap_or_else(|err| {
                    warn!(viewer = %viewer_id, error = %err, "unparsable controller message");
                    ControllerMessage::default()
                });
                let outcome = timer_service::handle_command(&state, &command).await;
                let ack = ViewerOutboundMessage::Ack(outcome.ack());
                if send_message_to_websocket(&outbound_tx, &ack).is_err() {
                    info!(viewer = %viewer_id, "connection closed while acknowledging, terminating");
                    break;
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(viewer = %viewer_id, "viewer closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(viewer = %viewer_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.unregister_viewer(&viewer_id);
    info!(viewer = %viewer_id, "viewer disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Serialize a payload and push it onto the provided WebSocket sender.
///
/// Serialization failures are logged and swallowed; only a closed writer is
/// reported back.
pub fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), SendError>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| SendError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
