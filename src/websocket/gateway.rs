use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    state::AppState,
    websocket::{
        presence::PresenceEntry,
        router::{DeliveryEvent, Participants},
        types::{ClientSignal, ErrorPayload, WsMessage},
    },
};

use super::presence::WsSender;

/// Connection lifecycle. A socket starts unauthenticated and must announce
/// an identity before any other signal is accepted; Closed is reached when
/// the transport ends and the receive loop exits.
enum ConnectionPhase {
    Connecting,
    Authenticated {
        user_id: Uuid,
        connection_id: Uuid,
    },
}

/// WebSocket upgrade handler. Deliberately not behind the request-auth
/// middleware: the live channel authenticates itself via its first signal.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one live connection from open to close.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    // Drain outbound frames into the socket sink
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut phase = ConnectionPhase::Connecting;

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => {
                if let Err(e) = process_signal(&text, &mut phase, &state, &tx) {
                    tracing::error!("Error processing signal: {:?}", e);
                    let _ = tx.send(WsMessage::Error(ErrorPayload {
                        message: e.to_string(),
                    }));
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();

    if let ConnectionPhase::Authenticated {
        user_id,
        connection_id,
    } = phase
    {
        // stale-guarded: a newer registration for the same user survives this
        state.presence.unregister(user_id, connection_id);
    }
}

/// Dispatch one inbound signal according to the connection phase.
fn process_signal(
    text: &str,
    phase: &mut ConnectionPhase,
    state: &AppState,
    tx: &WsSender,
) -> Result<()> {
    let signal: ClientSignal = serde_json::from_str(text)
        .map_err(|e| AppError::BadRequest(format!("Invalid signal format: {}", e)))?;

    match signal {
        ClientSignal::Authenticate(payload) => {
            if let ConnectionPhase::Authenticated { .. } = phase {
                // the first authenticate wins; repeats are ignored
                return Ok(());
            }
            // The asserted id is trusted as-is; the live channel carries no
            // token. Known gap, see DESIGN.md.
            let connection_id = Uuid::new_v4();
            state.presence.register(
                payload.user_id,
                PresenceEntry {
                    connection_id,
                    sender: tx.clone(),
                },
            );
            *phase = ConnectionPhase::Authenticated {
                user_id: payload.user_id,
                connection_id,
            };
            tracing::debug!("{} users online", state.presence.online_count());
            Ok(())
        }
        ClientSignal::Typing(payload) => {
            let user_id = authenticated_user(phase)?;
            state.delivery_router.route(
                DeliveryEvent::TypingStarted {
                    sender_id: user_id,
                    receiver_id: payload.receiver,
                },
                Participants::one(payload.receiver),
            );
            Ok(())
        }
        ClientSignal::StoppedTyping(payload) => {
            let user_id = authenticated_user(phase)?;
            state.delivery_router.route(
                DeliveryEvent::TypingStopped {
                    sender_id: user_id,
                    receiver_id: payload.receiver,
                },
                Participants::one(payload.receiver),
            );
            Ok(())
        }
    }
}

fn authenticated_user(phase: &ConnectionPhase) -> Result<Uuid> {
    match phase {
        ConnectionPhase::Authenticated { user_id, .. } => Ok(*user_id),
        ConnectionPhase::Connecting => Err(AppError::Unauthorized(
            "Authenticate before sending signals".to_string(),
        )),
    }
}
