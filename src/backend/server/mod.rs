//! Server Module
//!
//! Application state, configuration loading and initialization.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs      - Module exports and documentation
//! ├── state.rs    - AppState and FromRef impls
//! ├── config.rs   - Config file + environment loading, store selection
//! └── init.rs     - State assembly and router creation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use taskhub::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let app = create_app(config).await;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{build_state, create_app};
pub use state::AppState;
