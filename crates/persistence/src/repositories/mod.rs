//! Repository implementations for database operations.

pub mod attendee;
pub mod event;
pub mod invite;
pub mod message;

pub use attendee::AttendeeRepository;
pub use event::EventRepository;
pub use invite::InviteRepository;
pub use message::{MessageInput, MessageListQuery, MessageRepository};
