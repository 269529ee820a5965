//! Authentication Module
//!
//! Session tokens, the session cookie, and the user record endpoints.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── sessions.rs     - JWT issue/verify, cookie values, credential lookup
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Session Flow
//!
//! 1. **Issue**: client posts its claims to `/jwt` → token signed → cookie set
//! 2. **Use**: every guarded route runs `middleware::require_session`, which
//!    verifies the cookie and attaches a `Principal`
//! 3. **Logout**: `/logout` expires the cookie
//!
//! Tokens are HS256 and expire after the configured session lifetime (one
//! day by default). Every credential failure yields the same 401 body.

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{create_user, issue_token, logout, user_role};
pub use sessions::{Claims, Principal, SessionManager};
