//! Shared utilities and common types for the event messaging backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cursor-based pagination for message listings
//! - Common validation logic (emails, attachment references)

pub mod pagination;
pub mod validation;
