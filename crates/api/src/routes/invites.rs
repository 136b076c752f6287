//! Invite acceptance callback.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{PromoteQueuedRequest, PromoteQueuedResponse};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_messages_promoted;

/// Release messages queued for an accepted invite.
///
/// POST /api/v1/invites/:invite_id/promote
///
/// Called by the acceptance workflow once the invitee's attendee record
/// exists. Safe to repeat: later calls report `promoted: 0`.
pub async fn promote_queued_messages(
    State(state): State<AppState>,
    Path(invite_id): Path<Uuid>,
    Json(request): Json<PromoteQueuedRequest>,
) -> Result<Json<PromoteQueuedResponse>, ApiError> {
    let promoted = state
        .promotion
        .promote_queued_messages(invite_id, request.attendee_id)
        .await?;

    record_messages_promoted(promoted);

    Ok(Json(PromoteQueuedResponse {
        invite_id,
        attendee_id: request.attendee_id,
        promoted,
    }))
}
