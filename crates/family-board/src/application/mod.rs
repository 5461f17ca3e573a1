//! Application layer for family-board.
//!
//! The application layer orchestrates the business logic: it knows *what* to
//! do with a command, but delegates *how* frames arrive and *how* records hit
//! disk to the infrastructure layer.
//!
//! # Responsibilities
//!
//! - Routing decoded commands to the handler registered for their type string
//! - Running each command's schema validation before its handler body
//! - The config gateway: the `family_board/config/get` / `set` handlers
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or listening for connections (that is infrastructure)
//! - Reading or writing files (the record store is infrastructure)
//! - WebSocket framing (handled by tokio-tungstenite)

pub mod config_gateway;
pub mod router;
pub mod schema;

// Re-export the primary entry points so `main.rs` and the integration tests
// can call them concisely.
pub use config_gateway::register_commands;
pub use router::{CommandHandler, CommandRouter};
pub use schema::SchemaError;
