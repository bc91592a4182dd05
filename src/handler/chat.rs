use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{chatdb::ChatExt, userdb::UserExt},
    dtos::{
        chatdtos::{ConversationDto, SendMessageDto, WsServerEvent},
        userdtos::FilterUserDto,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route("/send", post(send_message))
        .route("/conversations", get(get_conversations))
        .route("/:user_id", get(get_conversation_history))
        .route("/:user_id/seen", put(mark_conversation_seen))
}

/// REST fallback for clients without a live websocket. Persists the message
/// and relays it to the receiver's socket when they are connected.
pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.receiver_id == auth.user.id {
        return Err(HttpError::bad_request(
            "You cannot message yourself".to_string(),
        ));
    }

    let receiver = app_state
        .db_client
        .get_user(Some(body.receiver_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if receiver.is_none() {
        return Err(HttpError::not_found("Receiver not found".to_string()));
    }

    let message = app_state
        .db_client
        .save_message(
            auth.user.id,
            body.receiver_id,
            body.property_id,
            body.message,
            body.image,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let receiver_online = app_state.presence.is_online(body.receiver_id).await;
    if receiver_online {
        app_state
            .presence
            .send_to(
                body.receiver_id,
                WsServerEvent::ReceiveMessage {
                    message: message.clone(),
                },
            )
            .await;
    }

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "receiver_online": receiver_online,
            "data": message,
        })),
    ))
}

pub async fn get_conversations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let partners = app_state
        .db_client
        .get_conversation_partners(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut conversations = Vec::with_capacity(partners.len());
    for (partner_id, last_message, unread_count) in partners {
        let partner = app_state
            .db_client
            .get_user(Some(partner_id), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        // Partners whose accounts were removed are skipped rather than
        // surfacing a dangling conversation.
        if let Some(partner) = partner {
            conversations.push(ConversationDto {
                user: FilterUserDto::filter_user(&partner),
                last_message,
                unread_count,
            });
        }
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": conversations.len(),
        "data": conversations,
    })))
}

pub async fn get_conversation_history(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state
        .db_client
        .get_messages_between(auth.user.id, user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "results": messages.len(),
        "data": messages,
    })))
}

pub async fn mark_conversation_seen(
    Path(user_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state
        .db_client
        .mark_messages_seen(user_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Messages marked as seen",
        "updated": updated,
    })))
}
