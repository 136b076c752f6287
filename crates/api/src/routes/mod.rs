//! HTTP route handlers.

pub mod health;
pub mod invites;
pub mod messages;
