use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::Result,
    message::{
        message_dto::{ConversationQuery, PaginatedMessages, SendMessageRequest, UpdateMessageRequest},
        message_models::MessageResponse,
    },
    middleware::AuthUser,
    state::AppState,
};

/// Send a message to another user
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent successfully", body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 429, description = "Duplicate send suppressed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let message = state
        .conversation_service
        .send(user_id, payload.receiver_id, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Paginated conversation with another user, newest first
#[utoipa::path(
    get,
    path = "/api/messages/conversation/{other_user_id}",
    tag = "messages",
    params(
        ("other_user_id" = Uuid, Path, description = "The other participant"),
        ("page" = Option<u32>, Query, description = "Page number, 1-based"),
        ("limit" = Option<u32>, Query, description = "Messages per page")
    ),
    responses(
        (status = 200, description = "Conversation page", body = PaginatedMessages),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_conversation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(other_user_id): Path<Uuid>,
    Query(query): Query<ConversationQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(50);

    let response = state
        .conversation_service
        .list_conversation(user_id, other_user_id, page, limit)
        .await?;

    Ok((StatusCode::OK, Json(response)))
}

/// Edit a sent message's content (sender only)
#[utoipa::path(
    put,
    path = "/api/messages/{id}",
    tag = "messages",
    request_body = UpdateMessageRequest,
    params(
        ("id" = Uuid, Path, description = "Message id")
    ),
    responses(
        (status = 200, description = "Message updated", body = MessageResponse),
        (status = 403, description = "Not the sender"),
        (status = 404, description = "Message not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<UpdateMessageRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let message = state
        .conversation_service
        .update(user_id, message_id, &payload.content)
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::from(message))))
}

/// Delete a message (sender only)
#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    tag = "messages",
    params(
        ("id" = Uuid, Path, description = "Message id")
    ),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, description = "Not the sender"),
        (status = 404, description = "Message not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.conversation_service.delete(user_id, message_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Mark a received message as read (receiver only)
#[utoipa::path(
    patch,
    path = "/api/messages/{id}/read",
    tag = "messages",
    params(
        ("id" = Uuid, Path, description = "Message id")
    ),
    responses(
        (status = 200, description = "Message marked read", body = MessageResponse),
        (status = 403, description = "Not the receiver"),
        (status = 404, description = "Message not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_message_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let message = state
        .conversation_service
        .mark_read(user_id, message_id)
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::from(message))))
}
