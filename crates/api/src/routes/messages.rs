//! Event message routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateMessageRequest, CreateMessageResponse, DeliveryState, ListMessagesQuery,
    ListMessagesResponse, MarkReadRequest, Message, UnreadCountResponse,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_fanout_failures, record_messages_created};

/// Create a message for an event.
///
/// POST /api/v1/events/:event_id/messages
///
/// The body names exactly one recipient mode: `attendee_id`, `invite_id`,
/// or an `audience` (defaulting to `all`). Broadcast fan-out is best-effort;
/// the response reports how many records were delivered, queued or failed.
pub async fn create_message(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<CreateMessageResponse>), ApiError> {
    let outcome = state.broadcasts.create_broadcast(event_id, request).await?;

    record_messages_created(DeliveryState::Delivered, outcome.delivered);
    record_messages_created(DeliveryState::Queued, outcome.queued);
    record_fanout_failures(outcome.failed);

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// List delivered messages of an event, newest first.
///
/// GET /api/v1/events/:event_id/messages
///
/// Queued messages are never returned.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<ListMessagesResponse>, ApiError> {
    let page = state.visibility.list_visible_page(event_id, &query).await?;

    Ok(Json(ListMessagesResponse {
        data: page.messages,
        next_cursor: page.next_cursor,
    }))
}

/// Mark a delivered message as read.
///
/// POST /api/v1/events/:event_id/messages/:message_id/read
pub async fn mark_message_read(
    State(state): State<AppState>,
    Path((event_id, message_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<MarkReadRequest>,
) -> Result<Json<Message>, ApiError> {
    let message = state
        .visibility
        .mark_message_read(event_id, message_id, request.attendee_id)
        .await?;

    Ok(Json(message))
}

/// Count unread delivered messages for an attendee.
///
/// GET /api/v1/events/:event_id/attendees/:attendee_id/messages/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Path((event_id, attendee_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread = state.visibility.unread_count(event_id, attendee_id).await?;

    Ok(Json(UnreadCountResponse {
        attendee_id,
        unread,
    }))
}
