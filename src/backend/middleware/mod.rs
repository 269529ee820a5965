//! Middleware for request processing

/// Session verification
pub mod auth;

pub use auth::require_session;
