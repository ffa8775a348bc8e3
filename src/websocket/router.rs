use uuid::Uuid;

use crate::message::message_models::{Message, MessageResponse, MessageStatus};

use super::{
    presence::PresenceRegistry,
    types::{MessageDeletedPayload, MessageStatusPayload, TypingPayload, WsMessage},
};

/// An event produced by a completed durable mutation, or an ephemeral typing
/// signal. Carries only what a client needs to update its view.
#[derive(Debug, Clone)]
pub enum DeliveryEvent {
    MessageCreated(Message),
    MessageUpdated(Message),
    MessageDeleted {
        message_id: Uuid,
    },
    StatusChanged {
        message_id: Uuid,
        status: MessageStatus,
    },
    TypingStarted {
        sender_id: Uuid,
        receiver_id: Uuid,
    },
    TypingStopped {
        sender_id: Uuid,
        receiver_id: Uuid,
    },
}

impl From<DeliveryEvent> for WsMessage {
    fn from(event: DeliveryEvent) -> Self {
        match event {
            DeliveryEvent::MessageCreated(message) => {
                WsMessage::NewMessage(MessageResponse::from(message))
            }
            DeliveryEvent::MessageUpdated(message) => {
                WsMessage::MessageUpdated(MessageResponse::from(message))
            }
            DeliveryEvent::MessageDeleted { message_id } => {
                WsMessage::MessageDeleted(MessageDeletedPayload { message_id })
            }
            DeliveryEvent::StatusChanged { message_id, status } => {
                WsMessage::MessageStatusUpdate(MessageStatusPayload { message_id, status })
            }
            DeliveryEvent::TypingStarted {
                sender_id,
                receiver_id,
            } => WsMessage::Typing(TypingPayload {
                sender: sender_id,
                receiver: receiver_id,
            }),
            DeliveryEvent::TypingStopped {
                sender_id,
                receiver_id,
            } => WsMessage::StoppedTyping(TypingPayload {
                sender: sender_id,
                receiver: receiver_id,
            }),
        }
    }
}

/// Who a routed event may reach. The primary target is always attempted;
/// the secondary only when present. Offline targets are skipped silently:
/// the durable record is the source of truth for anyone not connected.
#[derive(Debug, Clone, Copy)]
pub struct Participants {
    pub primary: Uuid,
    pub secondary: Option<Uuid>,
}

impl Participants {
    pub fn one(primary: Uuid) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn pair(primary: Uuid, secondary: Uuid) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }
}

/// Fans a delivery event out to the live connections of its participants.
/// The caller has already persisted the mutation; routing never fails the
/// request.
#[derive(Clone)]
pub struct DeliveryRouter {
    presence: PresenceRegistry,
}

impl DeliveryRouter {
    pub fn new(presence: PresenceRegistry) -> Self {
        Self { presence }
    }

    pub fn route(&self, event: DeliveryEvent, participants: Participants) {
        let frame = WsMessage::from(event);
        self.emit(participants.primary, frame.clone());
        if let Some(secondary) = participants.secondary {
            // a self-conversation has one connection; emit once
            if secondary != participants.primary {
                self.emit(secondary, frame);
            }
        }
    }

    fn emit(&self, user_id: Uuid, frame: WsMessage) {
        if let Some(sender) = self.presence.lookup(user_id) {
            if sender.send(frame).is_err() {
                tracing::warn!("Dropped frame for user {}: connection already closed", user_id);
            }
        }
    }
}
