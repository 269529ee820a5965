//! Task Module
//!
//! - **`service`** - `TaskService`, the CRUD contract plus change-event emission
//! - **`handlers`** - axum handlers for the `/tasks` routes

pub mod service;

pub mod handlers;

pub use service::TaskService;
