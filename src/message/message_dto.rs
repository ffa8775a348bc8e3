use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::message::message_models::MessageResponse;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateMessageRequest {
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedMessages {
    pub data: Vec<MessageResponse>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl PaginatedMessages {
    pub fn new(data: Vec<MessageResponse>, total: i64, page: u32, limit: u32) -> Self {
        Self {
            data,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
            has_more: has_more(total, page, limit),
        }
    }
}

fn total_pages(total: i64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    ((total as f64) / (limit as f64)).ceil() as u32
}

fn has_more(total: i64, page: u32, limit: u32) -> bool {
    (page as i64) * (limit as i64) < total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
        assert_eq!(total_pages(101, 50), 3);
    }

    #[test]
    fn test_has_more() {
        assert!(!has_more(0, 1, 50));
        assert!(!has_more(50, 1, 50));
        assert!(has_more(51, 1, 50));
        assert!(has_more(101, 2, 50));
        assert!(!has_more(100, 2, 50));
    }
}
