//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod attendee;
pub mod invite;
pub mod message;

pub use attendee::AttendeeEntity;
pub use invite::{InviteEntity, InviteStatusDb};
pub use message::{DeliveryStateDb, MessageEntity, MessageStatusDb};
