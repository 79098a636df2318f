//! Library crate for saw-timer, exposing modules for binaries and tests.

/// Runtime configuration.
pub mod config;
mod dto;
mod error;
/// HTTP, WebSocket and SSE endpoints.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Timer state, its rules and the viewer hub.
pub mod state;
