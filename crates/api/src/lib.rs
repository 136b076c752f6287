//! HTTP surface of the event messaging backend.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
