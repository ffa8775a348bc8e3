use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    message::{
        message_dto::PaginatedMessages,
        message_models::{Message, MessageResponse, MessageStatus},
        message_repository::MessageRepository,
    },
    websocket::router::{DeliveryEvent, DeliveryRouter, Participants},
};

/// Identical repeated sends inside this window are rejected to absorb
/// client-side double-submission. Not a general rate limiter.
const DUPLICATE_WINDOW_MS: i64 = 1_000;

/// Which participant a mutation must come from. Update and delete belong to
/// the sender; mark-read belongs to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipRole {
    Sender,
    Receiver,
}

fn ensure_role(message: &Message, user_id: Uuid, role: OwnershipRole) -> Result<()> {
    let owner = match role {
        OwnershipRole::Sender => message.sender_id,
        OwnershipRole::Receiver => message.receiver_id,
    };
    if owner != user_id {
        return Err(AppError::Forbidden(
            "Not allowed to modify this message".to_string(),
        ));
    }
    Ok(())
}

/// Orchestrates the message lifecycle: persists through the repository first,
/// then fans the resulting event out to live connections. A store failure
/// aborts the request before any live emission.
#[derive(Clone)]
pub struct ConversationService {
    repo: MessageRepository,
    router: DeliveryRouter,
}

impl ConversationService {
    pub fn new(repo: MessageRepository, router: DeliveryRouter) -> Self {
        Self { repo, router }
    }

    pub async fn send(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Message content must not be empty".to_string(),
            ));
        }

        // Check-then-write: a racing identical send can slip through the
        // window. The probe is a double-submit heuristic, not a guarantee.
        let cutoff = Utc::now() - Duration::milliseconds(DUPLICATE_WINDOW_MS);
        if self
            .repo
            .find_recent_duplicate(sender_id, receiver_id, content, cutoff)
            .await?
            .is_some()
        {
            return Err(AppError::RateLimited(
                "Duplicate message suppressed".to_string(),
            ));
        }

        let message = self.repo.create(sender_id, receiver_id, content).await?;

        self.router.route(
            DeliveryEvent::MessageCreated(message.clone()),
            Participants::pair(sender_id, receiver_id),
        );

        Ok(message)
    }

    /// Messages between the requester and the other user, in either
    /// direction, newest first. Read-only.
    pub async fn list_conversation(
        &self,
        requester_id: Uuid,
        other_user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedMessages> {
        let page = page.max(1);
        let offset = ((page - 1) * limit) as i64;

        let messages = self
            .repo
            .find_conversation(requester_id, other_user_id, limit as i64, offset)
            .await?;
        let total = self
            .repo
            .count_conversation(requester_id, other_user_id)
            .await?;

        let data: Vec<MessageResponse> = messages.into_iter().map(MessageResponse::from).collect();
        Ok(PaginatedMessages::new(data, total, page, limit))
    }

    pub async fn update(
        &self,
        requester_id: Uuid,
        message_id: Uuid,
        new_content: &str,
    ) -> Result<Message> {
        let new_content = new_content.trim();
        if new_content.is_empty() {
            return Err(AppError::Validation(
                "Message content must not be empty".to_string(),
            ));
        }

        let message = self
            .repo
            .find_by_id(message_id)
            .await?
            .ok_or(AppError::NotFound("Message not found".to_string()))?;
        ensure_role(&message, requester_id, OwnershipRole::Sender)?;

        let updated = self.repo.update_content(message_id, new_content).await?;

        self.router.route(
            DeliveryEvent::MessageUpdated(updated.clone()),
            Participants::pair(updated.sender_id, updated.receiver_id),
        );

        Ok(updated)
    }

    pub async fn delete(&self, requester_id: Uuid, message_id: Uuid) -> Result<()> {
        let message = self
            .repo
            .find_by_id(message_id)
            .await?
            .ok_or(AppError::NotFound("Message not found".to_string()))?;
        ensure_role(&message, requester_id, OwnershipRole::Sender)?;

        self.repo.delete(message_id).await?;

        self.router.route(
            DeliveryEvent::MessageDeleted { message_id },
            Participants::pair(message.sender_id, message.receiver_id),
        );

        Ok(())
    }

    /// Only the receiver may mark a message read. The sender is notified
    /// over its live connection; the receiver already knows.
    pub async fn mark_read(&self, requester_id: Uuid, message_id: Uuid) -> Result<Message> {
        let message = self
            .repo
            .find_by_id(message_id)
            .await?
            .ok_or(AppError::NotFound("Message not found".to_string()))?;
        ensure_role(&message, requester_id, OwnershipRole::Receiver)?;

        if !message.status.can_transition_to(MessageStatus::Read) {
            // already read; nothing to persist or announce
            return Ok(message);
        }

        let updated = self.repo.update_status(message_id, MessageStatus::Read).await?;

        self.router.route(
            DeliveryEvent::StatusChanged {
                message_id: updated.id,
                status: updated.status,
            },
            Participants::one(updated.sender_id),
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(sender_id: Uuid, receiver_id: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            content: "hi".to_string(),
            status: MessageStatus::Sent,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sender_role_rejects_receiver() {
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let msg = message(sender, receiver);

        assert!(ensure_role(&msg, sender, OwnershipRole::Sender).is_ok());
        assert!(matches!(
            ensure_role(&msg, receiver, OwnershipRole::Sender),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_receiver_role_rejects_sender() {
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let msg = message(sender, receiver);

        assert!(ensure_role(&msg, receiver, OwnershipRole::Receiver).is_ok());
        assert!(matches!(
            ensure_role(&msg, sender, OwnershipRole::Receiver),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_stranger_is_rejected_for_either_role() {
        let msg = message(Uuid::new_v4(), Uuid::new_v4());
        let stranger = Uuid::new_v4();

        assert!(ensure_role(&msg, stranger, OwnershipRole::Sender).is_err());
        assert!(ensure_role(&msg, stranger, OwnershipRole::Receiver).is_err());
    }
}
