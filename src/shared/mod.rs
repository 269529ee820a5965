//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and its clients. Everything here is plain serde data and
//! compiles without the `ssr` feature.

/// Task records and request payloads
pub mod task;

/// User records
pub mod user;

/// Live-update events
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use task::{Task, TaskCategory, TaskId, TaskPatch, NewTask, TaskFilter};
pub use user::{User, NewUser, UserRole};
pub use event::{ChangeEvent, ChangeKind, LiveMessage};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, HubConfig, OverflowPolicy, RouteAuthTable};
