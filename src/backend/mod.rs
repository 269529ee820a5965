//! Backend Module
//!
//! Server-side code for the task server: an axum HTTP API over the task and
//! user stores, cookie sessions, and a live-update channel that pushes every
//! task mutation to connected clients.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - State, configuration loading, initialization
//! - **`routes`** - Route table (with per-route session switch) and router
//! - **`tasks`** - Task service and handlers
//! - **`auth`** - Session tokens, cookies, user endpoints
//! - **`realtime`** - Broadcast Hub, WebSocket and SSE transports
//! - **`middleware`** - Session verification
//! - **`store`** - Persistence traits, memory and PostgreSQL stores
//! - **`error`** - Backend error type and JSON error responses
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Binary entry point
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── tasks/          - Task service and handlers
//! ├── auth/           - Sessions and users
//! ├── realtime/       - Broadcast hub and transports
//! ├── middleware/     - Request middleware
//! ├── store/          - Persistence
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! ```text
//! request → [require_session] → handler → TaskService → TaskStore
//!                                              │
//!                                              └→ BroadcastHub → subscribers
//! ```
//!
//! The response does not wait for subscribers: `BroadcastHub::broadcast`
//! only queues.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Task service and handlers
pub mod tasks;

/// Real-time update system
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Persistence
pub mod store;

pub use error::BackendError;
pub use realtime::BroadcastHub;
pub use server::{create_app, AppState};
pub use tasks::TaskService;
