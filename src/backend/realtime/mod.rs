//! Real-time Update Module
//!
//! Fan-out of task change events to connected clients.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── hub.rs          - Subscriber registry and broadcast
//! ├── websocket.rs    - WebSocket transport (GET /ws)
//! └── subscription.rs - Server-Sent Events transport (GET /events)
//! ```
//!
//! Both transports read from a hub `Subscription`, so a client sees the same
//! `{ "type", "data" }` messages in the same order whichever one it uses.
//! Only the WebSocket transport accepts client frames, which it echoes.

/// Subscriber registry and broadcast
pub mod hub;

/// WebSocket transport
pub mod websocket;

/// Server-Sent Events transport
pub mod subscription;

pub use hub::{BroadcastHub, BroadcastReport, Liveness, SubscriberId, Subscription};
pub use subscription::handle_live_events;
pub use websocket::handle_live_socket;
