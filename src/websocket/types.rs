use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::message_models::{MessageResponse, MessageStatus};

/// Server-to-client frames. Tag names are the wire event names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WsMessage {
    NewMessage(MessageResponse),
    MessageUpdated(MessageResponse),
    MessageDeleted(MessageDeletedPayload),
    MessageStatusUpdate(MessageStatusPayload),
    Typing(TypingPayload),
    StoppedTyping(TypingPayload),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletedPayload {
    pub message_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageStatusPayload {
    pub message_id: Uuid,
    pub status: MessageStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingPayload {
    pub sender: Uuid,
    pub receiver: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

// Client-to-server signals
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientSignal {
    Authenticate(AuthenticatePayload),
    Typing(TypingPayload),
    StoppedTyping(TypingPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatePayload {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_server_frame_tags() {
        let frame = WsMessage::MessageDeleted(MessageDeletedPayload {
            message_id: Uuid::new_v4(),
        });
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&frame).unwrap()).unwrap();
        assert_eq!(json["type"], "message-deleted");

        let frame = WsMessage::MessageStatusUpdate(MessageStatusPayload {
            message_id: Uuid::new_v4(),
            status: MessageStatus::Read,
        });
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&frame).unwrap()).unwrap();
        assert_eq!(json["type"], "message-status-update");
        assert_eq!(json["status"], "read");
    }

    #[test]
    fn test_new_message_frame_carries_full_record() {
        let frame = WsMessage::NewMessage(MessageResponse {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            content: "hi".to_string(),
            status: MessageStatus::Sent,
            created_at: Utc::now(),
        });
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&frame).unwrap()).unwrap();
        assert_eq!(json["type"], "new-message");
        assert_eq!(json["content"], "hi");
        assert_eq!(json["status"], "sent");
    }

    #[test]
    fn test_client_signal_parsing() {
        let user_id = Uuid::new_v4();
        let signal: ClientSignal = serde_json::from_str(&format!(
            r#"{{"type":"authenticate","user_id":"{}"}}"#,
            user_id
        ))
        .unwrap();
        assert!(matches!(
            signal,
            ClientSignal::Authenticate(AuthenticatePayload { user_id: id }) if id == user_id
        ));

        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let signal: ClientSignal = serde_json::from_str(&format!(
            r#"{{"type":"stopped-typing","sender":"{}","receiver":"{}"}}"#,
            sender, receiver
        ))
        .unwrap();
        assert!(matches!(
            signal,
            ClientSignal::StoppedTyping(TypingPayload { receiver: r, .. }) if r == receiver
        ));
    }

    #[test]
    fn test_unknown_signal_is_rejected() {
        let result: Result<ClientSignal, _> =
            serde_json::from_str(r#"{"type":"shutdown-server"}"#);
        assert!(result.is_err());
    }
}
