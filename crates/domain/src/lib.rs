//! Domain layer for the event messaging backend.
//!
//! This crate contains:
//! - Domain models (Attendee, Invite, Message)
//! - The record store abstraction and an in-memory implementation
//! - Messaging services: audience resolution, fan-out, promotion, visibility
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::MessagingError;
