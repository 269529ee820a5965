//! Taskhub - Main Library
//!
//! A task-management backend: authenticated task CRUD over HTTP with
//! cookie sessions, and a live-update channel that fans every task change
//! out to connected clients.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types usable by clients and server
//!   - Tasks, users, live messages
//!   - Configuration
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, route table, session middleware
//!   - Task service and Broadcast Hub
//!   - Memory and PostgreSQL stores
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables `backend` and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use taskhub::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(load_config()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
