//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{LanderSpec, SessionChannels, TickScheduler};
use crate::ws::protocol::OutboundFrame;

/// Frames buffered from the socket before the tick loop folds them in
const INBOUND_CAPACITY: usize = 256;
/// Frames buffered for the socket writer before new ones are dropped
const OUTBOUND_CAPACITY: usize = 64;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (ws_sink, ws_stream) = socket.split();

    let (inbound_tx, inbound_rx) = mpsc::channel::<String>(INBOUND_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::channel::<OutboundFrame>(OUTBOUND_CAPACITY);

    let scheduler = TickScheduler::new(
        state.store.clone(),
        state.registry.clone(),
        LanderSpec::default(),
        state.config.time_acceleration,
        SessionChannels {
            inbound: inbound_rx,
            outbound: outbound_tx,
        },
    );
    let session_id = scheduler.session_id();
    info!(session_id = %session_id, "Client connected");

    let writer_handle = tokio::spawn(write_frames(session_id, ws_sink, outbound_rx));
    let reader_handle = tokio::spawn(read_frames(session_id, ws_stream, inbound_tx));

    // The tick loop runs on this task and returns once the client is gone
    let exit = scheduler.run().await;

    reader_handle.abort();
    // Writer drains what is queued, then stops because the loop dropped its sender
    if let Err(e) = writer_handle.await {
        debug!(session_id = %exit.session_id, error = %e, "Writer task ended abnormally");
    }

    info!(
        session_id = %exit.session_id,
        ticks = exit.ticks,
        phase = exit.state.phase.as_str(),
        "WebSocket connection closed"
    );
}

/// Reader loop: WebSocket -> tick loop
async fn read_frames(
    session_id: Uuid,
    mut ws_stream: SplitStream<WebSocket>,
    inbound_tx: mpsc::Sender<String>,
) {
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if inbound_tx.send(text).await.is_err() {
                    debug!(session_id = %session_id, "Inbound channel closed");
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(session_id = %session_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(session_id = %session_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(session_id = %session_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }
    // Dropping the sender is the disconnect signal for the tick loop
}

/// Writer loop: tick loop -> WebSocket
async fn write_frames(
    session_id: Uuid,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<OutboundFrame>,
) {
    while let Some(frame) = outbound_rx.recv().await {
        let text = match frame.into_text() {
            Ok(text) => text,
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Failed to encode frame");
                continue;
            }
        };

        if let Err(e) = ws_sink.send(Message::Text(text)).await {
            debug!(session_id = %session_id, error = %e, "WebSocket send failed");
            break;
        }
    }

    if let Err(e) = ws_sink.close().await {
        debug!(session_id = %session_id, error = %e, "WebSocket close failed");
    }
}
