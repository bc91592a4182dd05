use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::{chatdb::ChatExt, userdb::UserExt},
    dtos::chatdtos::{WsClientEvent, WsServerEvent},
    error::{ErrorMessage, HttpError},
    utils::token,
    AppState,
};

const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct WsConnectQuery {
    pub token: String,
}

pub fn ws_handler() -> Router {
    Router::new().route("/", get(ws_upgrade))
}

/// Browsers cannot set headers on a websocket handshake, so the JWT rides in
/// as a query parameter instead of the usual cookie or Authorization header.
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(query): Query<WsConnectQuery>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = token::decode_token(query.token, app_state.env.jwt_secret.as_bytes())
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user_id = Uuid::parse_str(&user_id)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user = app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    Ok(ws.on_upgrade(move |socket| chat_session(socket, app_state, user.id)))
}

async fn chat_session(socket: WebSocket, app_state: Arc<AppState>, user_id: Uuid) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<WsServerEvent>();

    app_state.presence.register(user_id, tx.clone()).await;
    let session_tx = tx.clone();

    // Pump queued server events out to the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!("Failed to serialize websocket event: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let recv_state = app_state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = ws_receiver.next().await {
            match message {
                Message::Text(text) => {
                    handle_client_event(&recv_state, user_id, &tx, &text).await;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Either side finishing tears the session down.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    app_state.presence.unregister(user_id, &session_tx).await;
}

async fn handle_client_event(
    app_state: &Arc<AppState>,
    user_id: Uuid,
    tx: &tokio::sync::mpsc::UnboundedSender<WsServerEvent>,
    text: &str,
) {
    let event: WsClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            let _ = tx.send(WsServerEvent::MessageError {
                error: format!("Unrecognized event: {}", e),
            });
            return;
        }
    };

    match event {
        WsClientEvent::Register => {
            let _ = tx.send(WsServerEvent::Registered { user_id });
        }
        WsClientEvent::SendMessage {
            receiver_id,
            message,
            property_id,
            image,
        } => {
            let trimmed = message.trim();
            if trimmed.is_empty() && image.is_none() {
                let _ = tx.send(WsServerEvent::MessageError {
                    error: "Message cannot be empty".to_string(),
                });
                return;
            }
            if trimmed.len() > MAX_MESSAGE_LENGTH {
                let _ = tx.send(WsServerEvent::MessageError {
                    error: "Message is too long".to_string(),
                });
                return;
            }
            if receiver_id == user_id {
                let _ = tx.send(WsServerEvent::MessageError {
                    error: "You cannot message yourself".to_string(),
                });
                return;
            }

            let saved = app_state
                .db_client
                .save_message(user_id, receiver_id, property_id, trimmed.to_string(), image)
                .await;

            match saved {
                Ok(chat_message) => {
                    app_state
                        .presence
                        .send_to(
                            receiver_id,
                            WsServerEvent::ReceiveMessage {
                                message: chat_message.clone(),
                            },
                        )
                        .await;
                    let _ = tx.send(WsServerEvent::MessageSent {
                        message: chat_message,
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to persist chat message: {}", e);
                    let _ = tx.send(WsServerEvent::MessageError {
                        error: "Failed to send message".to_string(),
                    });
                }
            }
        }
        WsClientEvent::Typing {
            receiver_id,
            is_typing,
        } => {
            // Transient signal: nothing is persisted, offline receivers miss it.
            app_state
                .presence
                .send_to(
                    receiver_id,
                    WsServerEvent::UserTyping {
                        sender_id: user_id,
                        is_typing,
                    },
                )
                .await;
        }
        WsClientEvent::MarkSeen { sender_id } => {
            match app_state
                .db_client
                .mark_messages_seen(sender_id, user_id)
                .await
            {
                Ok(_) => {
                    app_state
                        .presence
                        .send_to(
                            sender_id,
                            WsServerEvent::MessagesSeen {
                                receiver_id: user_id,
                            },
                        )
                        .await;
                }
                Err(e) => {
                    tracing::error!("Failed to mark messages seen: {}", e);
                    let _ = tx.send(WsServerEvent::MessageError {
                        error: "Failed to mark messages as seen".to_string(),
                    });
                }
            }
        }
    }
}
