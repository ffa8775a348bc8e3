use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    message::message_models::{Message, MessageStatus},
};

/// Durable store for message records. All queries are single-document
/// mutations; the service layer sequences them against live delivery.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (sender_id, receiver_id, content)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn find_by_id(&self, message_id: Uuid) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    pub async fn find_conversation(
        &self,
        user_id: Uuid,
        other_user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE (sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(other_user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn count_conversation(&self, user_id: Uuid, other_user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages
             WHERE (sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1)",
        )
        .bind(user_id)
        .bind(other_user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Most recent identical (sender, receiver, content) record created after
    /// the cutoff. Used by the duplicate-send suppression window.
    pub async fn find_recent_duplicate(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE sender_id = $1 AND receiver_id = $2 AND content = $3
               AND created_at > $4
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn update_content(&self, message_id: Uuid, content: &str) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            "UPDATE messages
             SET content = $2
             WHERE id = $1
             RETURNING *",
        )
        .bind(message_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn update_status(&self, message_id: Uuid, status: MessageStatus) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            "UPDATE messages
             SET status = $2
             WHERE id = $1
             RETURNING *",
        )
        .bind(message_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn delete(&self, message_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
