use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::userdtos::FilterUserDto;
use crate::models::chatmodel::ChatMessage;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageDto {
    pub receiver_id: Uuid,

    #[validate(length(min = 1, max = 5000, message = "Message must be between 1 and 5000 characters"))]
    pub message: String,

    pub property_id: Option<Uuid>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversationDto {
    pub user: FilterUserDto,
    pub last_message: ChatMessage,
    pub unread_count: i64,
}

/// Events the client sends over the websocket, tagged by `event`.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WsClientEvent {
    Register,
    SendMessage {
        receiver_id: Uuid,
        message: String,
        property_id: Option<Uuid>,
        image: Option<String>,
    },
    Typing {
        receiver_id: Uuid,
        is_typing: bool,
    },
    MarkSeen {
        sender_id: Uuid,
    },
}

/// Events the server pushes to connected clients, tagged by `event`.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WsServerEvent {
    Registered {
        user_id: Uuid,
    },
    ReceiveMessage {
        message: ChatMessage,
    },
    MessageSent {
        message: ChatMessage,
    },
    UserTyping {
        sender_id: Uuid,
        is_typing: bool,
    },
    MessagesSeen {
        receiver_id: Uuid,
    },
    MessageError {
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_parse_by_tag() {
        let raw = serde_json::json!({
            "event": "send_message",
            "receiver_id": Uuid::new_v4(),
            "message": "Is the flat still available?",
        });

        let parsed: WsClientEvent = serde_json::from_value(raw).unwrap();
        assert!(matches!(parsed, WsClientEvent::SendMessage { .. }));
    }

    #[test]
    fn server_events_serialize_with_tag() {
        let event = WsServerEvent::MessagesSeen {
            receiver_id: Uuid::new_v4(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "messages_seen");
    }
}
