//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Response types
//! ├── token.rs    - POST /jwt, POST /logout
//! └── users.rs    - POST /users, GET /users/role/{email}
//! ```

/// Response types
pub mod types;

/// Session cookie handlers
pub mod token;

/// User record handlers
pub mod users;

pub use token::{issue_token, logout};
pub use types::SuccessResponse;
pub use users::{create_user, user_role};
