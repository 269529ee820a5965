//! Backend Error Module
//!
//! `BackendError` covers validation, session, store and consistency failures
//! for the task and user endpoints.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse and the rejection-mapping extractors
//! ```
//!
//! Errors stop at the handler boundary: every variant becomes a status code
//! and a `{ "error": ... }` body. Broadcast failures never reach this type;
//! the hub logs and drops them.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
pub use conversion::{ValidJson, ValidPath, ValidQuery, ValidUpgrade};
