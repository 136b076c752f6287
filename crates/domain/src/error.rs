//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use crate::services::store::StoreError;

/// Errors surfaced by the messaging services.
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid recipient specification: {0}")]
    InvalidRecipientSpecification(String),

    #[error("Invite {0} has not been accepted")]
    InviteNotAccepted(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<validator::ValidationErrors> for MessagingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();

        MessagingError::Validation(messages.join(", "))
    }
}

impl From<shared::pagination::CursorError> for MessagingError {
    fn from(err: shared::pagination::CursorError) -> Self {
        MessagingError::Validation(err.to_string())
    }
}
