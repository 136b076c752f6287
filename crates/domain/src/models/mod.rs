//! Domain models for event messaging.

pub mod attendee;
pub mod invite;
pub mod message;

pub use attendee::Attendee;
pub use invite::{Invite, InviteStatus};
pub use message::{
    AudienceSelector, CreateMessageRequest, CreateMessageResponse, DeliveryState,
    ListMessagesQuery, ListMessagesResponse, MarkReadRequest, Message, MessageContent,
    MessageStatus, NewMessage, PromoteQueuedRequest, PromoteQueuedResponse, Recipient,
    RecipientTarget, UnreadCountResponse,
};
