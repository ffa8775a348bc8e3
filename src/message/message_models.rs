use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "message_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    /// Status only moves forward: sent -> delivered -> read, and
    /// delivered may be skipped. A read message never regresses.
    pub fn can_transition_to(self, next: MessageStatus) -> bool {
        use MessageStatus::*;
        matches!(
            (self, next),
            (Sent, Delivered) | (Sent, Read) | (Delivered, Read)
        )
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            status: message.status,
            created_at: message.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(MessageStatus::Sent.to_string(), "sent");
        assert_eq!(MessageStatus::Delivered.to_string(), "delivered");
        assert_eq!(MessageStatus::Read.to_string(), "read");
    }

    #[test]
    fn test_status_moves_forward() {
        assert!(MessageStatus::Sent.can_transition_to(MessageStatus::Delivered));
        assert!(MessageStatus::Sent.can_transition_to(MessageStatus::Read));
        assert!(MessageStatus::Delivered.can_transition_to(MessageStatus::Read));
    }

    #[test]
    fn test_status_never_regresses() {
        assert!(!MessageStatus::Read.can_transition_to(MessageStatus::Sent));
        assert!(!MessageStatus::Read.can_transition_to(MessageStatus::Delivered));
        assert!(!MessageStatus::Delivered.can_transition_to(MessageStatus::Sent));
        assert!(!MessageStatus::Read.can_transition_to(MessageStatus::Read));
        assert!(!MessageStatus::Sent.can_transition_to(MessageStatus::Sent));
    }
}
