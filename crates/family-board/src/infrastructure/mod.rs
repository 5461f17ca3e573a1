//! Infrastructure layer for family-board.
//!
//! The infrastructure layer handles all I/O: accepting WebSocket connections
//! from browsers and persisting the configuration record to disk.
//!
//! # Responsibilities
//!
//! - Binding a TCP listener for browser WebSocket connections
//! - Performing the WebSocket HTTP upgrade handshake
//! - Reading command frames and writing response frames
//! - Spawning per-session Tokio tasks
//! - Handling the graceful shutdown signal
//! - Loading and saving the key/version-addressed JSON record
//!
//! # What does NOT belong here?
//!
//! - Command dispatch and validation (that is the application layer)
//! - Message type definitions (that is the domain layer)
//! - Configuration parsing (that is done in `main.rs`)

pub mod record_store;
pub mod ws_server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use record_store::{platform_storage_dir, RecordStore, StoreError};
pub use ws_server::run_server;
