// WebSocket endpoint that streams a user's realtime events as JSON text frames.
//
// Browsers can't set headers on a WebSocket handshake, so the token rides in
// the query string and is verified before upgrading.

use super::api_error::{ApiError, ApiQuery};
use super::dto::SocketQuery;
use super::AppState;
use crate::core::social::{RecordStore, UserId};
use crate::infra::realtime::RealtimeHub;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use axum_extra::extract::WithRejection;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn socket_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    WithRejection(Query(query), _): ApiQuery<SocketQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let user_id = state.auth.verify(&query.token)?;
    let hub = state.hub.clone();
    Ok(ws.on_upgrade(move |socket| run_socket(socket, hub, user_id)))
}

async fn run_socket(socket: WebSocket, hub: Arc<RealtimeHub>, user_id: UserId) {
    let (mut sender, mut receiver) = socket.split();
    let (conn_id, mut events) = hub.connect(user_id);
    info!(
        user_id,
        conn_id,
        connections = hub.connection_count(user_id),
        "Realtime client connected"
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize realtime event");
                    continue;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound frames are ignored; we only watch for the close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(frame)) = receiver.next().await {
            if matches!(frame, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.disconnect(user_id, conn_id);
    info!(user_id, conn_id, "Realtime client disconnected");
}
