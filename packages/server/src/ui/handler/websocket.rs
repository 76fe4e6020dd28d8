//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    domain::{Connection, ConnectionId},
    infrastructure::dto::{
        handshake::{HandshakeQuery, resolve_credential},
        http::ErrorDto,
    },
    ui::state::AppState,
    usecase::AdmitError,
};

/// Handshake: authenticate, join groups, then upgrade.
///
/// The connection is registered before the upgrade completes, so a rejected
/// credential never reaches the broker and never sees a frame.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<HandshakeQuery>,
    headers: HeaderMap,
) -> Response {
    let (tx, rx) = mpsc::unbounded_channel();

    let credential = resolve_credential(&headers, &query);
    let connection = match state.admit_connection_usecase.execute(credential, tx) {
        Ok(connection) => connection,
        Err(AdmitError::Unauthorized(e)) => {
            tracing::warn!("Rejected WebSocket handshake: {}", e);
            return (StatusCode::UNAUTHORIZED, Json(ErrorDto::new(e))).into_response();
        }
        Err(AdmitError::Registration(e)) => {
            tracing::error!("Failed to register connection: {}", e);
            return (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorDto::new(e))).into_response();
        }
    };

    tracing::info!(
        connection_id = %connection.id(),
        identity = %connection.identity().key(),
        "Connection admitted"
    );

    let failed_state = state.clone();
    let failed_connection_id = connection.id().clone();
    ws.on_failed_upgrade(move |e| {
        tracing::warn!(
            connection_id = %failed_connection_id,
            "WebSocket upgrade failed: {}",
            e
        );
        failed_state
            .disconnect_connection_usecase
            .execute(&failed_connection_id);
    })
    .on_upgrade(move |socket| handle_socket(socket, state, connection, rx))
}

/// Spawns a task that drains this connection's outbound channel into the socket.
///
/// Also sends a ping every `heartbeat_interval`. The task ends when the
/// channel closes (the broker dropped the connection) or the socket fails.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    heartbeat_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut heartbeat =
            tokio::time::interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else {
                        break;
                    };
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = sender.close().await;
    })
}

/// Spawns a task that reads inbound frames until close, error or idle timeout.
///
/// Clients never send application data. Any inbound frame, pongs included,
/// only proves the peer is alive.
fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    connection_id: ConnectionId,
    idle_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let msg = match tokio::time::timeout(idle_timeout, receiver.next()).await {
                Err(_) => {
                    tracing::info!(
                        connection_id = %connection_id,
                        "No inbound frame for {:?}, closing idle connection",
                        idle_timeout
                    );
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    tracing::warn!(connection_id = %connection_id, "WebSocket error: {}", e);
                    break;
                }
                Ok(Some(Ok(msg))) => msg,
            };

            match msg {
                Message::Close(_) => {
                    tracing::info!(connection_id = %connection_id, "Client requested close");
                    break;
                }
                Message::Text(text) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Ignoring inbound text frame ({} bytes)",
                        text.len()
                    );
                }
                _ => {}
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection: Connection,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, receiver) = socket.split();

    let mut send_task = pusher_loop(rx, sender, state.heartbeat_interval);
    let mut recv_task = receive_loop(receiver, connection.id().clone(), state.idle_timeout);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if state
        .disconnect_connection_usecase
        .execute(connection.id())
        .is_some()
    {
        tracing::info!(
            connection_id = %connection.id(),
            identity = %connection.identity().key(),
            "Connection closed and unregistered"
        );
    }
}
