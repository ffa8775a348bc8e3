pub mod conversation_service;
pub mod message_dto;
pub mod message_handlers;
pub mod message_models;
pub mod message_repository;

pub use conversation_service::ConversationService;
pub use message_dto::{ConversationQuery, PaginatedMessages, SendMessageRequest, UpdateMessageRequest};
pub use message_handlers::{
    delete_message, get_conversation, mark_message_read, send_message, update_message,
};
pub use message_models::{Message, MessageResponse, MessageStatus};
pub use message_repository::MessageRepository;
