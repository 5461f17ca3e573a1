//! family-board library crate.
//!
//! This crate provides the configuration service backing the Family Board
//! dashboard: browsers connect over WebSocket and read or replace the board's
//! configuration with JSON commands.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser (JSON over WebSocket)
//!         ↕
//! [family-board]
//!   ├── domain/           Pure types: command envelopes, ServiceConfig
//!   ├── application/      Command router, schema checks, config gateway
//!   └── infrastructure/
//!         ├── ws_server/    WebSocket accept loop (tokio-tungstenite)
//!         └── record_store/ Key/version-addressed JSON persistence
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `application` depends on `domain` plus the record store handle.
//! - `infrastructure` depends on all other layers plus `tokio` and `tungstenite`.
//!
//! Separating *what the service does* (domain + application) from *how it does
//! it* (infrastructure) keeps the command handling testable without a real
//! network, and keeps the transport swappable without touching the gateway
//! logic.

/// Domain layer: pure business-logic types (no I/O).
pub mod domain;

/// Application layer: command routing and the config gateway.
pub mod application;

/// Infrastructure layer: WebSocket server and record persistence.
pub mod infrastructure;
