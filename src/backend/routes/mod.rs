//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs      - Module exports and documentation
//! ├── table.rs    - Every route with its path, handler and session switch
//! └── router.rs   - Router assembly, tracing and CORS layers
//! ```
//!
//! Whether a route needs a session is decided only by
//! `table::RouteId::requires_auth`, which reads the configured
//! `RouteAuthTable`.

/// Route table
pub mod table;

/// Main router creation
pub mod router;

pub use router::create_router;
pub use table::RouteId;
